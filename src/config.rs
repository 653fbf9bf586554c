//! Configuration file parser for epg-sift.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`,
//! which reproduces the reference setup: the moveonjoy grab name, the twelve
//! epgshare01 feed URLs, and gzip output enabled. Unknown keys are silently
//! ignored by serde, though we log a warning when the file contains
//! potential typos.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Feed URLs of the reference configuration, merged in this order.
const DEFAULT_URLS: [&str; 12] = [
    "https://epgshare01.online/epgshare01/epg_ripper_US1.xml.gz",
    "https://epgshare01.online/epgshare01/epg_ripper_US_LOCALS2.xml.gz",
    "https://epgshare01.online/epgshare01/epg_ripper_CA1.xml.gz",
    "https://epgshare01.online/epgshare01/epg_ripper_UK1.xml.gz",
    "https://epgshare01.online/epgshare01/epg_ripper_AU1.xml.gz",
    "https://epgshare01.online/epgshare01/epg_ripper_IE1.xml.gz",
    "https://epgshare01.online/epgshare01/epg_ripper_DE1.xml.gz",
    "https://epgshare01.online/epgshare01/epg_ripper_ZA1.xml.gz",
    "https://epgshare01.online/epgshare01/epg_ripper_DUMMY_CHANNELS.xml.gz",
    "https://epgshare01.online/epgshare01/epg_ripper_US_SPORTS1.xml.gz",
    "https://epgshare01.online/epgshare01/epg_ripper_FANDUEL1.xml.gz",
    "https://epgshare01.online/epgshare01/epg_ripper_PLEX1.xml.gz",
];

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified. Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Grab name, used to derive the allow-list and output filenames.
    pub name: String,

    /// Remote feed URLs, fetched and merged in this order. URLs ending
    /// in `.gz` are decompressed before parsing.
    pub urls: Vec<String>,

    /// Path to the allow-list file. Defaults to `<name>-tvg-ids.txt` in
    /// the working directory.
    pub allowlist: Option<PathBuf>,

    /// Directory the merged guide is written into, created if missing.
    pub output_dir: PathBuf,

    /// Whether to also write a gzip-compressed copy of the output.
    pub save_gzip: bool,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum accepted feed body size in megabytes, before decompression.
    pub max_feed_size_mb: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "moveonjoy".to_string(),
            urls: DEFAULT_URLS.iter().map(|u| u.to_string()).collect(),
            allowlist: None,
            output_dir: PathBuf::from("epgs"),
            save_gzip: true,
            timeout_secs: 30,
            max_feed_size_mb: 100,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "name",
                "urls",
                "allowlist",
                "output_dir",
                "save_gzip",
                "timeout_secs",
                "max_feed_size_mb",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            name = %config.name,
            feeds = config.urls.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// The allow-list file path: configured explicitly or derived from
    /// the grab name.
    pub fn allowlist_path(&self) -> PathBuf {
        self.allowlist
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}-tvg-ids.txt", self.name)))
    }

    /// The plain XML output path inside the output directory.
    pub fn xml_output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}-epg.xml", self.name))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn max_feed_size(&self) -> usize {
        (self.max_feed_size_mb as usize) * 1024 * 1024
    }
}

// ============================================================================
// Tests
// ============================================================================
