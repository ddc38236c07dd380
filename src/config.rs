//! Configuration management for lodcensus using the prefer crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http_client::HttpClient;
use crate::repository::{AsyncSqlitePool, DieselEndpointRepository};
use crate::sparql::QueryError;

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "lodcensus.db";

/// Where the LOD Cloud publishes its dataset registry.
pub const DEFAULT_MANIFEST_URL: &str = "https://lod-cloud.net/lod-data.json";

const DUMPS_SUBDIR: &str = "dumps";
const MANIFEST_FILENAME: &str = "lod-data.json";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename inside `data_dir`.
    pub database_filename: String,
    /// Directory receiving JSON dumps.
    pub dumps_dir: PathBuf,
    /// Local copy of the LOD Cloud manifest.
    pub manifest_file: PathBuf,
    pub manifest_url: String,
    /// User agent for HTTP requests (None = built-in default).
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Delay after every request in milliseconds.
    pub request_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        // Documents dir -> Home dir -> Current dir
        let data_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lodcensus");
        Self::with_data_dir(data_dir)
    }
}

impl Settings {
    /// Create settings rooted at a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            dumps_dir: data_dir.join(DUMPS_SUBDIR),
            manifest_file: data_dir.join(MANIFEST_FILENAME),
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            user_agent: None,
            request_timeout: 60,
            request_delay_ms: 250,
        }
    }

    /// Get the full path to the database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    pub fn database_url(&self) -> String {
        format!("sqlite:{}", self.database_path().display())
    }

    /// Check if the database appears to be initialized.
    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }

    /// Ensure the data and dumps directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.dumps_dir)?;
        Ok(())
    }

    pub fn create_pool(&self) -> AsyncSqlitePool {
        AsyncSqlitePool::new(&self.database_url())
    }

    /// Open the endpoint store, creating its tables if needed.
    pub async fn open_store(&self) -> anyhow::Result<DieselEndpointRepository> {
        self.ensure_directories()?;
        let pool = self.create_pool();
        pool.init_schema().await?;
        Ok(DieselEndpointRepository::new(pool))
    }

    pub fn create_http_client(&self) -> Result<HttpClient, QueryError> {
        HttpClient::with_user_agent(
            Duration::from_secs(self.request_timeout),
            Duration::from_millis(self.request_delay_ms),
            self.user_agent.as_deref(),
        )
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Dumps directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dumps_dir: Option<String>,
    /// Local manifest path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_url: Option<String>,
    /// User agent string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Delay after every request in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_delay_ms: Option<u64>,
    /// File this config was read from.
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer for discovery.
    pub async fn load() -> Self {
        match prefer::load("lodcensus").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await.unwrap_or_else(|e| {
                    tracing::warn!("{}", e);
                    Self::default()
                }),
                None => Self::default(),
            },
            // No config file found
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// JSON, TOML or YAML is chosen by file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Directory of the config file, if it came from one.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// A leading `~` is expanded to the home directory.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    ///
    /// Dumps and manifest locations follow a configured data dir unless
    /// they are configured too.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            let data_dir = self.resolve_path(data_dir, base_dir);
            settings.dumps_dir = data_dir.join(DUMPS_SUBDIR);
            settings.manifest_file = data_dir.join(MANIFEST_FILENAME);
            settings.data_dir = data_dir;
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
        if let Some(ref dumps_dir) = self.dumps_dir {
            settings.dumps_dir = self.resolve_path(dumps_dir, base_dir);
        }
        if let Some(ref manifest_file) = self.manifest_file {
            settings.manifest_file = self.resolve_path(manifest_file, base_dir);
        }
        if let Some(ref url) = self.manifest_url {
            settings.manifest_url = url.clone();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(delay) = self.request_delay_ms {
            settings.request_delay_ms = delay;
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Data directory (--data-dir flag).
    pub data_dir: Option<PathBuf>,
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Load settings: defaults, then the config file, then command line flags.
pub async fn load_settings_with_options(options: LoadOptions) -> anyhow::Result<(Settings, Config)> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path)
            .await
            .map_err(anyhow::Error::msg)?,
        None => Config::load().await,
    };

    let mut settings = Settings::default();
    let base_dir = config.base_dir().unwrap_or_else(current_dir);
    config.apply_to_settings(&mut settings, &base_dir);

    // --data-dir takes precedence over the config file
    if let Some(data_dir) = options.data_dir {
        let data_dir = if data_dir.is_absolute() {
            data_dir
        } else {
            current_dir().join(data_dir)
        };
        if config.dumps_dir.is_none() {
            settings.dumps_dir = data_dir.join(DUMPS_SUBDIR);
        }
        if config.manifest_file.is_none() {
            settings.manifest_file = data_dir.join(MANIFEST_FILENAME);
        }
        settings.data_dir = data_dir;
    }

    tracing::debug!("Using data directory {}", settings.data_dir.display());
    Ok((settings, config))
}
