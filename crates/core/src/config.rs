use std::time::Duration;

use url::Url;

use crate::error::{Result, Wiki2VidError};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/";
pub const DEFAULT_GENERATE_PATH: &str = "create_video_from_url/";
pub const DEFAULT_STATUS_PATH: &str = "api/video-status/{video}";
pub const DEFAULT_VIDEO_FIELD: &str = "video_url";
pub const DEFAULT_STATUS_FIELD: &str = "Status";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Placeholder in the status path replaced by the video location
pub const VIDEO_PLACEHOLDER: &str = "{video}";

pub const ENV_API_URL: &str = "WIKI2VID_API_URL";
pub const ENV_GENERATE_PATH: &str = "WIKI2VID_GENERATE_PATH";
pub const ENV_STATUS_PATH: &str = "WIKI2VID_STATUS_PATH";
pub const ENV_VIDEO_FIELD: &str = "WIKI2VID_VIDEO_FIELD";
pub const ENV_STATUS_FIELD: &str = "WIKI2VID_STATUS_FIELD";
pub const ENV_TIMEOUT_SECS: &str = "WIKI2VID_TIMEOUT_SECS";

/// Backend contract: where the endpoints live and which response fields to read.
///
/// Every endpoint is derived from `base_url`, so one value decides the
/// deployment topology.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: Url,
    pub generate_path: String,
    pub status_path: String,
    pub video_field: String,
    pub status_field: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            generate_path: DEFAULT_GENERATE_PATH.to_string(),
            status_path: DEFAULT_STATUS_PATH.to_string(),
            video_field: DEFAULT_VIDEO_FIELD.to_string(),
            status_field: DEFAULT_STATUS_FIELD.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ApiConfig {
    /// Defaults overlaid with `WIKI2VID_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base) = lookup(ENV_API_URL) {
            config = config.with_base_url(&base)?;
        }
        if let Some(path) = lookup(ENV_GENERATE_PATH) {
            check_path_template(&path, ENV_GENERATE_PATH, false)?;
            config.generate_path = path;
        }
        if let Some(path) = lookup(ENV_STATUS_PATH) {
            check_path_template(&path, ENV_STATUS_PATH, true)?;
            config.status_path = path;
        }
        if let Some(field) = lookup(ENV_VIDEO_FIELD) {
            config.video_field = field;
        }
        if let Some(field) = lookup(ENV_STATUS_FIELD) {
            config.status_field = field;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            config = config.with_timeout_secs(&secs, ENV_TIMEOUT_SECS)?;
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base: &str) -> Result<Self> {
        let invalid = |reason: String| Wiki2VidError::InvalidConfig {
            key: ENV_API_URL.to_string(),
            reason,
        };

        let mut url = Url::parse(base.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot be a base".to_string()));
        }
        // endpoints are joined below the base path
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        self.base_url = url;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn with_timeout_secs(self, secs: &str, key: &str) -> Result<Self> {
        let secs: u64 = secs
            .trim()
            .parse()
            .map_err(|_| Wiki2VidError::InvalidConfig {
                key: key.to_string(),
                reason: format!("expected whole seconds, got {:?}", secs),
            })?;
        if secs == 0 {
            return Err(Wiki2VidError::InvalidConfig {
                key: key.to_string(),
                reason: "timeout must be positive".to_string(),
            });
        }
        Ok(self.with_timeout(Duration::from_secs(secs)))
    }

    pub fn generate_endpoint(&self) -> Result<Url> {
        self.endpoint(&self.generate_path, None)
    }

    pub fn status_endpoint(&self, video_location: &str) -> Result<Url> {
        self.endpoint(&self.status_path, Some(video_location))
    }

    /// Absolute URL of a video location; relative locations hang off the base URL
    pub fn resolve_video(&self, video_location: &str) -> Result<Url> {
        self.base_url
            .join(video_location)
            .map_err(|e| Wiki2VidError::InvalidConfig {
                key: "video location".to_string(),
                reason: format!("{}: {}", video_location, e),
            })
    }

    fn endpoint(&self, template: &str, video_location: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments =
                url.path_segments_mut()
                    .map_err(|_| Wiki2VidError::InvalidConfig {
                        key: ENV_API_URL.to_string(),
                        reason: "URL cannot be a base".to_string(),
                    })?;
            segments.pop_if_empty();
            for segment in template.trim_start_matches('/').split('/') {
                match video_location {
                    Some(location) if segment == VIDEO_PLACEHOLDER => {
                        segments.push(location);
                    }
                    _ => {
                        segments.push(segment);
                    }
                }
            }
        }
        Ok(url)
    }
}

/// Templates are plain path segments; `{video}` may only stand as a whole segment.
fn check_path_template(template: &str, key: &str, needs_video: bool) -> Result<()> {
    let invalid = |reason: String| {
        Err(Wiki2VidError::InvalidConfig {
            key: key.to_string(),
            reason,
        })
    };

    if let Some(c) = template.chars().find(|c| matches!(c, '?' | '#')) {
        return invalid(format!("{:?} is not allowed in a path template", c));
    }

    let mut has_video = false;
    for segment in template.trim_start_matches('/').split('/') {
        if segment == VIDEO_PLACEHOLDER {
            has_video = true;
        } else if segment.contains(VIDEO_PLACEHOLDER) {
            return invalid(format!(
                "{} must be a whole path segment, got {:?}",
                VIDEO_PLACEHOLDER, segment
            ));
        }
    }

    match (needs_video, has_video) {
        (true, false) => invalid(format!("missing {} placeholder", VIDEO_PLACEHOLDER)),
        (false, true) => invalid(format!("unexpected {} placeholder", VIDEO_PLACEHOLDER)),
        _ => Ok(()),
    }
}
