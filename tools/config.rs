use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use library::sources::DEFAULT_THUMBNAIL_SIZE;
use library::IndexerOptions;
use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub version: u32,
    pub music_root: String,
    /// Folder holding `MediaLibrary.cache`. Empty means the OS temp dir.
    pub cache_dir: String,
    pub thumbnail_size: u32,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            music_root: "".to_string(),
            cache_dir: "".to_string(),
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
        }
    }
}

impl IndexerConfig {
    pub fn indexer_options(&self, config_path: &Path) -> IndexerOptions {
        let mut options = match self.cache_dir.trim() {
            "" => IndexerOptions::default(),
            dir => IndexerOptions::with_cache_dir(&resolve_path(config_path, dir)),
        };
        options.thumbnail_size = self.thumbnail_size;
        options
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {}", err),
            ConfigError::Yaml(err) => write!(f, "yaml error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err)
    }
}

pub fn config_path_from_env() -> PathBuf {
    match env::var("MEDIA_INDEX_CONFIG") {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => default_config_path(),
    }
}

fn default_config_path() -> PathBuf {
    match env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(|dir| dir.join("index_scan.yaml"))
            .unwrap_or_else(|| PathBuf::from("index_scan.yaml")),
        Err(_) => PathBuf::from("index_scan.yaml"),
    }
}

pub fn load_or_create_config(path: &Path) -> Result<(IndexerConfig, bool), ConfigError> {
    if path.exists() {
        let contents = fs::read_to_string(path)?;
        let mut config: IndexerConfig = serde_yaml::from_str(&contents)?;
        if config.version < CONFIG_VERSION {
            config.version = CONFIG_VERSION;
        }
        if config.thumbnail_size == 0 {
            config.thumbnail_size = DEFAULT_THUMBNAIL_SIZE;
        }
        return Ok((config, false));
    }

    let config = IndexerConfig::default();
    save_config(path, &config)?;
    Ok((config, true))
}

pub fn save_config(path: &Path, config: &IndexerConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_yaml::to_string(config)?;
    fs::write(path, contents)?;
    Ok(())
}

pub fn resolve_path(config_path: &Path, value: &str) -> PathBuf {
    let raw = PathBuf::from(value);
    if raw.is_absolute() {
        return raw;
    }
    let base = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    base.join(raw)
}

pub fn resolve_music_root(config_path: &Path, value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(resolve_path(config_path, trimmed))
    }
}
