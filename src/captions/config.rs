// Caption source configuration
//
// Layers, lowest precedence first:
// - built-in defaults
// - JSON file at <config dir>/youtube-captions/config.json
// - CAPTIONS_* environment variables
// - explicit overrides from the caller (CLI flags)

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ENV_PYTHON: &str = "CAPTIONS_PYTHON";
pub const ENV_PROXY: &str = "CAPTIONS_PROXY";
pub const ENV_TIMEOUT: &str = "CAPTIONS_TIMEOUT";

/// Which caption library revision to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionPreference {
    /// Probe the installed library
    #[default]
    Auto,
    /// Force the instance-based `YouTubeTranscriptApi().list/fetch` surface
    Client,
    /// Force the static `list_transcripts/get_transcript` surface
    Static,
}

impl fmt::Display for RevisionPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Client => write!(f, "client"),
            Self::Static => write!(f, "static"),
        }
    }
}

impl FromStr for RevisionPreference {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "client" | "new" => Ok(Self::Client),
            "static" | "old" => Ok(Self::Static),
            other => Err(anyhow::anyhow!("Invalid revision: {}", other)),
        }
    }
}

/// Configuration for talking to the caption library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Python interpreter; discovered automatically when unset
    pub python: Option<String>,
    /// Per-call timeout in seconds
    pub timeout_seconds: u64,
    /// HTTP(S) proxy handed to the caption library
    pub proxy: Option<String>,
    pub revision: RevisionPreference,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            python: None,
            timeout_seconds: 30,
            proxy: None,
            revision: RevisionPreference::Auto,
        }
    }
}

impl SourceConfig {
    pub fn with_python(mut self, python: Option<String>) -> Self {
        if python.is_some() {
            self.python = python;
        }
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        if proxy.is_some() {
            self.proxy = proxy;
        }
        self
    }

    pub fn with_timeout(mut self, seconds: Option<u64>) -> Self {
        if let Some(seconds) = seconds {
            self.timeout_seconds = seconds;
        }
        self
    }

    pub fn with_revision(mut self, revision: Option<RevisionPreference>) -> Self {
        if let Some(revision) = revision {
            self.revision = revision;
        }
        self
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("youtube-captions").join("config.json"))
    }

    /// Load from a JSON file. A missing file yields defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("[Config] No config file at {}", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;

        debug!("[Config] Loaded {}", path.display());
        Ok(config)
    }

    /// Apply `CAPTIONS_*` overrides from an environment lookup
    pub fn apply_env<F>(self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout = lookup(ENV_TIMEOUT)
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("{} must be a number of seconds, got {:?}", ENV_TIMEOUT, raw))
            })
            .transpose()?;

        let config = self
            .with_python(lookup(ENV_PYTHON).filter(|v| !v.is_empty()))
            .with_proxy(lookup(ENV_PROXY).filter(|v| !v.is_empty()))
            .with_timeout(timeout);
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the config file (`path` or the default location),
    /// then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        base.apply_env(|key| std::env::var(key).ok())
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            anyhow::bail!("timeout_seconds must be greater than zero");
        }
        if let Some(proxy) = &self.proxy {
            url::Url::parse(proxy).with_context(|| format!("Invalid proxy URL: {}", proxy))?;
        }
        Ok(())
    }
}
