use thiserror::Error;

#[derive(Error, Debug)]
pub enum Wiki2VidError {
    #[error("Not a valid Wikipedia article URL: {url}")]
    InvalidUrl { url: String },

    #[error("No video URL available for checking status")]
    NoVideo,

    #[error("A {operation} request is already in flight")]
    AlreadyInFlight { operation: &'static str },

    #[error("Request to {endpoint} failed with HTTP {status}")]
    RequestFailed { endpoint: String, status: u16 },

    #[error("Response is missing the \"{field}\" field: {body}")]
    MissingField { field: String, body: String },

    #[error("Invalid configuration for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Wiki2VidError>;
