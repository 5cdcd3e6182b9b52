use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use log::{debug, LevelFilter};
use serde::{Deserialize, Serialize};
use env_logger::{Builder, Target, WriteStyle};

/// Parts of the library that can get their own log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingSubsystem {
    /// Library root and tools
    Main,
    /// Discogs API client
    Discogs,
    /// HTTP transport
    Http,
    /// Disk cache
    Cache,
    /// Background workers and retrieval strategies
    Worker,
    /// Configuration loading
    Config,
}

impl LoggingSubsystem {
    /// Module paths whose records belong to this subsystem
    pub fn modules(&self) -> &'static [&'static str] {
        match self {
            LoggingSubsystem::Main => &["discogs_artwork"],
            LoggingSubsystem::Discogs => &["discogs_artwork::helpers::discogs"],
            LoggingSubsystem::Http => &["discogs_artwork::helpers::http_client", "ureq"],
            LoggingSubsystem::Cache => &["discogs_artwork::helpers::imagecache"],
            LoggingSubsystem::Worker => &["discogs_artwork::artwork", "discogs_artwork::helpers::retry"],
            LoggingSubsystem::Config => &["discogs_artwork::config"],
        }
    }

    pub fn parse(name: &str) -> Option<LoggingSubsystem> {
        serde_json::from_value(serde_json::Value::String(name.to_lowercase())).ok()
    }
}

/// Where log records are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    Stdout,
    #[default]
    Stderr,
}

/// Logger settings, usually read from a JSON file
///
/// ```json
/// { "level": "info", "subsystems": { "http": "debug" } }
/// ```
///
/// Subsystem keys that are not known subsystem names are used as module
/// paths. `RUST_LOG` overrides everything configured here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub target: LogTarget,
    pub timestamps: bool,
    pub colors: bool,
    pub subsystems: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            target: LogTarget::Stderr,
            timestamps: true,
            colors: true,
            subsystems: BTreeMap::new(),
        }
    }
}

fn level_filter(level: &str) -> LevelFilter {
    level.parse().unwrap_or_else(|_| {
        eprintln!("Warning: unknown log level '{}', using info", level);
        LevelFilter::Info
    })
}

impl LoggingConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read logging config {}: {}", path.display(), e))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid logging config: {}", e))
    }

    /// (module, level) pairs; the global level comes first with no module
    fn module_filters(&self) -> Vec<(Option<String>, LevelFilter)> {
        let mut filters = vec![(None, level_filter(&self.level))];
        for (name, level) in &self.subsystems {
            let level = level_filter(level);
            match LoggingSubsystem::parse(name) {
                Some(subsystem) => {
                    filters.extend(subsystem.modules().iter().map(|m| (Some(m.to_string()), level)));
                }
                None => filters.push((Some(name.clone()), level)),
            }
        }
        filters
    }

    /// The configured filters in `RUST_LOG` syntax
    pub fn build_filter_string(&self) -> String {
        self.module_filters()
            .into_iter()
            .map(|(module, level)| {
                let level = level.to_string().to_lowercase();
                match module {
                    Some(module) => format!("{}={}", module, level),
                    None => level,
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Install the global logger
    ///
    /// Fails if a logger has already been installed.
    pub fn initialize_logger(&self) -> Result<(), String> {
        let mut builder = Builder::new();
        for (module, level) in self.module_filters() {
            builder.filter(module.as_deref(), level);
        }
        builder.parse_env("RUST_LOG");

        builder.write_style(if self.colors { WriteStyle::Auto } else { WriteStyle::Never });
        builder.target(match self.target {
            LogTarget::Stdout => Target::Stdout,
            LogTarget::Stderr => Target::Stderr,
        });

        let timestamps = self.timestamps;
        builder.format(move |buf, record| {
            if timestamps {
                write!(buf, "[{}] ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
            }
            writeln!(buf, "{}:{}", record.level(), record.args())
        });

        builder.try_init().map_err(|e| format!("logger already initialized: {}", e))?;
        debug!("logging filter: {}", self.build_filter_string());
        Ok(())
    }
}

pub fn initialize_logging_from_file<P: AsRef<Path>>(config_path: P) -> Result<(), String> {
    LoggingConfig::from_file(config_path)?.initialize_logger()
}

pub fn initialize_default_logging() -> Result<(), String> {
    LoggingConfig::default().initialize_logger()
}
