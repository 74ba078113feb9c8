use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use luma_api::api::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
use luma_core::polling::PollConfig;

use crate::error::{NodeError, NodeResult};

/// Default location of the optional key/value config file.
pub const DEFAULT_CONFIG_FILE: &str = "config.env";

/// Default directory generated assets are written under.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Node runtime configuration.
///
/// Values come from an optional config file first and the process
/// environment second; an empty value counts as absent. Nothing is
/// written back into the environment.
#[derive(Clone)]
pub struct Settings {
    /// Luma API key, if configured.
    pub api_key: Option<String>,
    /// ImgBB API key, if configured.
    pub imgbb_api_key: Option<String>,
    /// Luma API base URL.
    pub base_url: String,
    /// Root directory for persisted assets.
    pub output_dir: PathBuf,
    /// HTTP request timeout for a single API call.
    pub request_timeout: Duration,
    /// Polling policy for video jobs.
    pub video_poll: PollConfig,
    /// Polling policy for image jobs.
    pub image_poll: PollConfig,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("imgbb_api_key", &self.imgbb_api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("output_dir", &self.output_dir)
            .field("request_timeout", &self.request_timeout)
            .field("video_poll", &self.video_poll)
            .field("image_poll", &self.image_poll)
            .finish()
    }
}

impl Settings {
    /// Load from the config file and environment.
    ///
    /// | Key                         | Default                                      |
    /// |-----------------------------|----------------------------------------------|
    /// | `LUMA_CONFIG_FILE`          | `config.env` (environment only)              |
    /// | `LUMAAI_API_KEY`            | none                                         |
    /// | `IMGBB_API_KEY`             | none                                         |
    /// | `LUMAAI_BASE_URL`           | `https://api.lumalabs.ai/dream-machine/v1`   |
    /// | `LUMA_OUTPUT_DIR`           | `output`                                     |
    /// | `LUMA_REQUEST_TIMEOUT_SECS` | `60`                                         |
    /// | `LUMA_VIDEO_POLL_SECS`      | `3`                                          |
    /// | `LUMA_IMAGE_POLL_SECS`      | `1`                                          |
    /// | `LUMA_MAX_WAIT_SECS`        | preset bound; `0` waits forever              |
    pub fn load() -> NodeResult<Self> {
        let path = std::env::var("LUMA_CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
        let file = read_config_file(Path::new(&path))?;
        Self::from_sources(&file, |key| std::env::var(key).ok())
    }

    /// Build from an already-read config file and an environment lookup.
    pub fn from_sources<F>(file: &HashMap<String, String>, env: F) -> NodeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| -> Option<String> {
            file.get(key)
                .cloned()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| env(key).filter(|v| !v.trim().is_empty()))
                .map(|v| v.trim().to_string())
        };

        let secs = |key: &str| -> NodeResult<Option<u64>> {
            lookup(key)
                .map(|v| {
                    v.parse::<u64>().map_err(|_| {
                        NodeError::Config(format!("{key} must be a whole number of seconds, got '{v}'"))
                    })
                })
                .transpose()
        };

        let mut video_poll = PollConfig::video();
        let mut image_poll = PollConfig::image();

        if let Some(s) = secs("LUMA_VIDEO_POLL_SECS")? {
            video_poll.interval = Duration::from_secs(s);
        }
        if let Some(s) = secs("LUMA_IMAGE_POLL_SECS")? {
            image_poll.interval = Duration::from_secs(s);
        }
        if let Some(s) = secs("LUMA_MAX_WAIT_SECS")? {
            let max_wait = (s > 0).then(|| Duration::from_secs(s));
            video_poll.max_wait = max_wait;
            image_poll.max_wait = max_wait;
        }
        for poll in [&mut video_poll, &mut image_poll] {
            poll.max_interval = poll.max_interval.max(poll.interval);
            poll.validate()?;
        }

        let request_timeout = secs("LUMA_REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        Ok(Self {
            api_key: lookup("LUMAAI_API_KEY"),
            imgbb_api_key: lookup("IMGBB_API_KEY"),
            base_url: lookup("LUMAAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            output_dir: lookup("LUMA_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            request_timeout,
            video_poll,
            image_poll,
        })
    }

    /// Pick the Luma key: explicit node input, then configuration.
    pub fn resolve_api_key(&self, explicit: &str) -> NodeResult<String> {
        resolve(explicit, self.api_key.as_deref()).ok_or(NodeError::MissingApiKey)
    }

    /// Pick the ImgBB key: explicit node input, then configuration.
    pub fn resolve_imgbb_api_key(&self, explicit: &str) -> Option<String> {
        resolve(explicit, self.imgbb_api_key.as_deref())
    }
}

fn resolve(explicit: &str, configured: Option<&str>) -> Option<String> {
    let explicit = explicit.trim();
    if !explicit.is_empty() {
        return Some(explicit.to_string());
    }
    configured.map(str::to_string)
}

/// Read `KEY=value` pairs from `path` without touching the environment.
///
/// A missing file yields no entries. INI-style section headers such as
/// `[API]` are skipped, so a sectioned file reads as one flat namespace.
pub fn read_config_file(path: &Path) -> NodeResult<HashMap<String, String>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using environment only");
        return Ok(HashMap::new());
    }

    let text = std::fs::read_to_string(path)
        .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
    let body = text
        .lines()
        .filter(|line| !is_section_header(line))
        .collect::<Vec<_>>()
        .join("\n");

    let entries = dotenvy::from_read_iter(body.as_bytes())
        .collect::<Result<HashMap<_, _>, _>>()
        .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;

    if entries.get("LUMAAI_API_KEY").is_some_and(|v| v.trim().is_empty()) {
        tracing::warn!(path = %path.display(), "LUMAAI_API_KEY is empty in config file");
    }
    Ok(entries)
}

fn is_section_header(line: &str) -> bool {
    let line = line.trim();
    line.starts_with('[') && line.ends_with(']')
}
