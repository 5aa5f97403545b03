//! Configuration management for cipherpath
//!
//! Settings are fixed at mount time and shared read-only by every resolver.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default case cache time-to-live in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 1;

/// Supported case cache time-to-live values in seconds (0 = never expire)
pub const CACHE_TTL_PRESETS: [u64; 16] = [
    0, 1, 2, 5, 10, 15, 30, 45, 60, 90, 120, 300, 600, 900, 1800, 3600,
];

/// Name of the config descriptor exposed in reverse mode
pub const CONFIG_NAME: &str = "gocryptfs.conf";

/// On-disk name of the reverse mode config inside the root directory
pub const REVERSE_CONFIG_NAME: &str = ".gocryptfs.reverse.conf";

/// Per-directory IV file injected into every directory in reverse mode
pub const DIR_IV_NAME: &str = "gocryptfs.diriv";

/// Prefix of long-name companion files
pub const LONGNAME_PREFIX: &str = "gocryptfs.longname.";

/// Suffix of long-name companion files
pub const LONGNAME_SUFFIX: &str = ".name";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Mount configuration
    pub mount: MountConfig,

    /// Case cache configuration
    pub cache: CaseCacheConfig,

    /// Synthetic file names
    pub names: NameConfig,
}

/// Mount configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    /// Root storage directory
    pub root_dir: String,

    /// Reverse (export) mode
    pub reverse: bool,
}

/// Case cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseCacheConfig {
    /// Resolve names case-insensitively
    pub case_insensitive: bool,

    /// Entry time-to-live in seconds (0 = never expire)
    pub ttl_secs: u64,
}

/// Synthetic names recognized in reverse mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameConfig {
    /// Config descriptor name as seen by export consumers
    pub config_name: String,

    /// Config file name inside the root directory
    pub reverse_config_name: String,

    /// Per-directory IV listing name
    pub dir_iv_name: String,

    /// Long-name companion file prefix
    pub longname_prefix: String,

    /// Long-name companion file suffix
    pub longname_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        let root_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cipherpath")
            .to_string_lossy()
            .into_owned();

        Config {
            mount: MountConfig {
                root_dir,
                reverse: false,
            },
            cache: CaseCacheConfig::default(),
            names: NameConfig::default(),
        }
    }
}

impl Default for CaseCacheConfig {
    fn default() -> Self {
        CaseCacheConfig {
            case_insensitive: false,
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl CaseCacheConfig {
    /// Time-to-live as a duration (zero = never expire)
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for NameConfig {
    fn default() -> Self {
        NameConfig {
            config_name: CONFIG_NAME.to_string(),
            reverse_config_name: REVERSE_CONFIG_NAME.to_string(),
            dir_iv_name: DIR_IV_NAME.to_string(),
            longname_prefix: LONGNAME_PREFIX.to_string(),
            longname_suffix: LONGNAME_SUFFIX.to_string(),
        }
    }
}

impl Config {
    /// Create a configuration for the given root directory
    pub fn with_root(root_dir: impl Into<String>) -> Self {
        let mut config = Config::default();
        config.mount.root_dir = root_dir.into();
        config
    }

    /// Load configuration from a file, with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!("Failed to read config file: {}", e))
        })?;

        let mut config: Config = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse config file: {}", e))
        })?;

        config.apply_env_overrides();

        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("CIPHERPATH_ROOT_DIR") {
            let root = root.trim().to_string();
            if !root.is_empty() {
                self.mount.root_dir = root;
            }
        }

        if let Ok(reverse) = std::env::var("CIPHERPATH_REVERSE") {
            if let Some(flag) = parse_flag(&reverse) {
                self.mount.reverse = flag;
            }
        }

        if let Ok(ci) = std::env::var("CIPHERPATH_CASE_INSENSITIVE") {
            if let Some(flag) = parse_flag(&ci) {
                self.cache.case_insensitive = flag;
            }
        }

        if let Ok(ttl) = std::env::var("CIPHERPATH_CACHE_TTL") {
            if let Ok(secs) = ttl.trim().parse::<u64>() {
                self.cache.ttl_secs = secs;
            }
        }
    }

    /// Save configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            Error::Serialization(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path.as_ref(), content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.mount.root_dir.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "Root storage directory is required".to_string(),
            ));
        }

        if !CACHE_TTL_PRESETS.contains(&self.cache.ttl_secs) {
            return Err(Error::InvalidConfig(format!(
                "Unsupported cache TTL: {} seconds",
                self.cache.ttl_secs
            )));
        }

        let names = [
            ("config_name", &self.names.config_name),
            ("reverse_config_name", &self.names.reverse_config_name),
            ("dir_iv_name", &self.names.dir_iv_name),
            ("longname_prefix", &self.names.longname_prefix),
            ("longname_suffix", &self.names.longname_suffix),
        ];
        for (field, value) in names {
            if value.is_empty() {
                return Err(Error::InvalidConfig(format!("{} must not be empty", field)));
            }
            if value.contains(['\\', '/', ':']) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be a bare file name: {}",
                    field, value
                )));
            }
        }

        Ok(())
    }
}

/// Human-readable label for a cache TTL preset
pub fn ttl_label(secs: u64) -> String {
    match secs {
        0 => "infinite".to_string(),
        1 => "1 second".to_string(),
        s if s < 120 => format!("{} seconds", s),
        3600 => "1 hour".to_string(),
        s if s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{} seconds", s),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
