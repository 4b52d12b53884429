use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, info};

use crate::{
    config::ApiConfig,
    error::{Result, Wiki2VidError},
};

const FALLBACK_VIDEO_NAME: &str = "video.mp4";

/// The two calls the video-generation backend answers.
#[async_trait]
pub trait VideoBackend: Send + Sync {
    /// Ask the backend to build a video for an article; returns the video location
    async fn create_video(&self, article_url: &str) -> Result<String>;

    /// Processing status for a previously returned video location
    async fn video_status(&self, video_location: &str) -> Result<String>;
}

#[derive(Serialize)]
struct CreateVideoRequest<'a> {
    url: &'a str,
}

pub struct HttpBackend {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpBackend {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Fetch a generated video into `dest_dir`, returning the written path
    pub async fn download_video(&self, video_location: &str, dest_dir: &Path) -> Result<PathBuf> {
        let url = self.config.resolve_video(video_location)?;
        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_VIDEO_NAME)
            .to_string();

        debug!(%url, "downloading video");
        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(Wiki2VidError::RequestFailed {
                endpoint: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        let bytes = response.bytes().await?;

        fs::create_dir_all(dest_dir).await?;
        let path = dest_dir.join(file_name);
        fs::write(&path, &bytes).await?;
        info!(path = %path.display(), bytes = bytes.len(), "video saved");

        Ok(path)
    }

    async fn read_json(response: reqwest::Response, endpoint: &str) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            return Err(Wiki2VidError::RequestFailed {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl VideoBackend for HttpBackend {
    async fn create_video(&self, article_url: &str) -> Result<String> {
        let endpoint = self.config.generate_endpoint()?;
        debug!(%endpoint, article_url, "requesting video generation");

        let response = self
            .client
            .post(endpoint.clone())
            .json(&CreateVideoRequest { url: article_url })
            .send()
            .await?;
        let body = Self::read_json(response, endpoint.as_str()).await?;

        extract_field(&body, &self.config.video_field)
    }

    async fn video_status(&self, video_location: &str) -> Result<String> {
        let endpoint = self.config.status_endpoint(video_location)?;
        debug!(%endpoint, "requesting video status");

        let response = self.client.get(endpoint.clone()).send().await?;
        let body = Self::read_json(response, endpoint.as_str()).await?;

        extract_field(&body, &self.config.status_field)
    }
}

/// Pull a string field out of a JSON response body
pub fn extract_field(body: &Value, field: &str) -> Result<String> {
    body[field]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Wiki2VidError::MissingField {
            field: field.to_string(),
            body: body.to_string(),
        })
}

/// Where saved videos land by default
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}
