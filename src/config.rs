// Configuration for the artwork client
//
// Holds the process-wide settings (most importantly the cache directory) and
// reads them from a JSON configuration document.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use lazy_static::lazy_static;
use log::{debug, info, warn};
use serde_json::Value;

/// Discogs API root
pub const DEFAULT_API_URL: &str = "https://api.discogs.com";

/// Name of the cache directory created in the user's home directory
pub const DEFAULT_DIRECTORY_NAME: &str = ".covers";

pub const DEFAULT_USER_AGENT: &str = concat!("discogs-artwork/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where downloaded images are stored
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CacheDirectory {
    /// `~/.covers`
    #[default]
    Default,
    /// An explicitly configured directory, created when missing
    Path(PathBuf),
    /// The process's current working directory
    WorkingDirectory,
}

impl CacheDirectory {
    /// Build from an explicit setting. `None` or an empty string selects the
    /// working directory, a leading `~` is expanded to the home directory.
    pub fn from_setting(setting: Option<&str>) -> Self {
        match setting {
            None => CacheDirectory::WorkingDirectory,
            Some(s) if s.trim().is_empty() => CacheDirectory::WorkingDirectory,
            Some(s) => CacheDirectory::Path(expand_home(s)),
        }
    }

    /// Resolve to the directory that files are read from and written to
    pub fn resolve(&self) -> PathBuf {
        match self {
            CacheDirectory::Default => match dirs::home_dir() {
                Some(home) => home.join(DEFAULT_DIRECTORY_NAME),
                None => {
                    warn!("Could not determine home directory, using working directory for artwork");
                    PathBuf::from(".")
                }
            },
            CacheDirectory::Path(path) => path.clone(),
            CacheDirectory::WorkingDirectory => PathBuf::from("."),
        }
    }

    /// Whether the directory is managed by us and may be created on demand
    pub fn is_managed(&self) -> bool {
        !matches!(self, CacheDirectory::WorkingDirectory)
    }
}

/// Which kind of Discogs record the search is restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchType {
    /// Master releases group all versions of an album
    #[default]
    Master,
    Release,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Master => "master",
            SearchType::Release => "release",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "master" => Some(SearchType::Master),
            "release" => Some(SearchType::Release),
            _ => None,
        }
    }
}

/// Settings of the artwork client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkConfig {
    pub directory: CacheDirectory,
    pub api_url: String,
    pub search_type: SearchType,
    pub user_agent: String,
    /// Discogs personal access token
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            directory: CacheDirectory::Default,
            api_url: DEFAULT_API_URL.to_string(),
            search_type: SearchType::Master,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ArtworkConfig {
    /// Read the settings from a service configuration object
    ///
    /// Missing keys keep their defaults. `"directory": null` selects the
    /// working directory, an absent key keeps `~/.covers`.
    pub fn from_service_config(service: &Value) -> Self {
        let mut config = ArtworkConfig::default();

        if let Some(directory) = service.get("directory") {
            config.directory = match directory {
                Value::Null => CacheDirectory::WorkingDirectory,
                Value::String(s) => CacheDirectory::from_setting(Some(s)),
                other => {
                    warn!("Ignoring invalid artwork directory setting: {}", other);
                    CacheDirectory::Default
                }
            };
        }

        if let Some(url) = service.get("api_url").and_then(|v| v.as_str()) {
            config.api_url = url.trim_end_matches('/').to_string();
        }

        if let Some(search_type) = service.get("search_type").and_then(|v| v.as_str()) {
            match SearchType::parse(search_type) {
                Some(t) => config.search_type = t,
                None => warn!("Unknown Discogs search type '{}', using '{}'", search_type, config.search_type.as_str()),
            }
        }

        if let Some(agent) = service.get("user_agent").and_then(|v| v.as_str()) {
            config.user_agent = agent.to_string();
        }

        if let Some(token) = service.get("token").and_then(|v| v.as_str()) {
            if !token.is_empty() {
                debug!("Discogs token found in config");
                config.token = Some(token.to_string());
            }
        }

        if let Some(timeout) = service.get("timeout_secs").and_then(|v| v.as_u64()) {
            config.timeout_secs = timeout;
        }

        config
    }

    /// Read the settings from a full configuration document
    pub fn from_config(config: &Value) -> Self {
        match get_service_config(config, "discogs") {
            Some(service) => Self::from_service_config(service),
            None => {
                debug!("No discogs configuration found, using defaults");
                ArtworkConfig::default()
            }
        }
    }
}

/// Helper function to get service configuration with backward compatibility
///
/// Looks in the "services" section first and falls back to a top-level key.
pub fn get_service_config<'a>(config: &'a Value, service_name: &str) -> Option<&'a Value> {
    if let Some(service_config) = config.get("services").and_then(|s| s.get(service_name)) {
        debug!("Found {} configuration in services section", service_name);
        return Some(service_config);
    }

    if let Some(service_config) = config.get(service_name) {
        debug!("Found {} configuration at top level", service_name);
        return Some(service_config);
    }

    None
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    Path::new(path).to_path_buf()
}

lazy_static! {
    static ref ARTWORK_CONFIG: Mutex<ArtworkConfig> = Mutex::new(ArtworkConfig::default());
}

fn global() -> MutexGuard<'static, ArtworkConfig> {
    ARTWORK_CONFIG.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Initialize the process-wide settings from a configuration document
pub fn initialize_from_config(config: &Value) {
    let artwork_config = ArtworkConfig::from_config(config);
    info!("Artwork cache directory: {}", artwork_config.directory.resolve().display());
    *global() = artwork_config;
}

/// Replace the process-wide settings
pub fn set_config(config: ArtworkConfig) {
    *global() = config;
}

/// Snapshot of the process-wide settings
pub fn current() -> ArtworkConfig {
    global().clone()
}

/// Set the process-wide cache directory
pub fn set_cache_directory(directory: CacheDirectory) {
    debug!("Artwork cache directory set to {:?}", directory);
    global().directory = directory;
}

pub fn cache_directory() -> CacheDirectory {
    global().directory.clone()
}
