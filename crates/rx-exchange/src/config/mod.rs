use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::workflows::catalog::SearchSettings;
use crate::workflows::listing::validation::DEFAULT_MAX_PHOTO_BYTES;
use crate::workflows::listing::{BoardSettings, PhotoPolicy, WizardSettings};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub marketplace: MarketplaceConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            marketplace: MarketplaceConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Search, board, and upload tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplaceConfig {
    pub search_debounce: Duration,
    pub search_limit: usize,
    pub board_page_size: usize,
    pub max_photo_bytes: usize,
    pub storage_base_url: String,
    /// Optional catalog export loaded at startup.
    pub catalog_csv: Option<PathBuf>,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        let search = SearchSettings::default();
        Self {
            search_debounce: search.debounce,
            search_limit: search.limit,
            board_page_size: BoardSettings::default().page_size,
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
            storage_base_url: "memory://listing-images".to_string(),
            catalog_csv: None,
        }
    }
}

impl MarketplaceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let debounce_ms = read_number(
            "MARKET_SEARCH_DEBOUNCE_MS",
            defaults.search_debounce.as_millis() as u64,
        )?;

        Ok(Self {
            search_debounce: Duration::from_millis(debounce_ms),
            search_limit: read_number("MARKET_SEARCH_LIMIT", defaults.search_limit)?,
            board_page_size: read_number("MARKET_BOARD_PAGE_SIZE", defaults.board_page_size)?,
            max_photo_bytes: read_number("MARKET_MAX_PHOTO_BYTES", defaults.max_photo_bytes)?,
            storage_base_url: env::var("MARKET_STORAGE_BASE_URL")
                .unwrap_or(defaults.storage_base_url),
            catalog_csv: env::var("MARKET_CATALOG_CSV")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            debounce: self.search_debounce,
            limit: self.search_limit,
        }
    }

    pub fn wizard_settings(&self) -> WizardSettings {
        WizardSettings {
            search: self.search_settings(),
            photos: PhotoPolicy {
                max_bytes: self.max_photo_bytes,
                ..PhotoPolicy::default()
            },
        }
    }

    pub fn board_settings(&self) -> BoardSettings {
        BoardSettings {
            page_size: self.board_page_size,
            ..BoardSettings::default()
        }
    }
}

fn read_number<T: std::str::FromStr>(variable: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { variable }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable } => {
                write!(f, "{variable} must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
