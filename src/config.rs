use clap::Parser;
use thiserror::Error;
use validator::Validate;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_RATE_LIMIT_PER_SECOND: u32 = 5;
pub const DEFAULT_OPENWEATHERMAP_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_UNIT_OF_MEASUREMENT: &str = "imperial";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Application configuration, fixed at startup and shared read-only afterwards
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct AppConfig {
    #[validate(range(min = 1))]
    pub port: u16,

    /// Global request budget; admission interval is one second divided by this
    #[validate(range(min = 1))]
    pub rate_limit_per_second: u32,

    #[validate(url)]
    pub openweathermap_api_url: String,

    /// `metric`, `standard` or `imperial`; passed through to OpenWeatherMap as `units`
    #[validate(length(min = 1))]
    pub unit_of_measurement: String,
}

impl AppConfig {
    /// Build a configuration; zero or empty values fall back to the defaults.
    pub fn new(
        port: u16,
        rate_limit_per_second: u32,
        openweathermap_api_url: impl Into<String>,
        unit_of_measurement: impl Into<String>,
    ) -> Self {
        let openweathermap_api_url = openweathermap_api_url.into();
        let unit_of_measurement = unit_of_measurement.into();

        Self {
            port: if port == 0 { DEFAULT_PORT } else { port },
            rate_limit_per_second: if rate_limit_per_second == 0 {
                DEFAULT_RATE_LIMIT_PER_SECOND
            } else {
                rate_limit_per_second
            },
            openweathermap_api_url: if openweathermap_api_url.is_empty() {
                DEFAULT_OPENWEATHERMAP_URL.to_string()
            } else {
                openweathermap_api_url
            },
            unit_of_measurement: if unit_of_measurement.is_empty() {
                DEFAULT_UNIT_OF_MEASUREMENT.to_string()
            } else {
                unit_of_measurement
            },
        }
    }

    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(0, 0, "", "")
    }
}

/// Command line and environment surface of the gateway binary
#[derive(Debug, Parser)]
#[command(name = "weather-gateway", version, about)]
pub struct Cli {
    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Global requests-per-second budget
    #[arg(long, env = "RATE_LIMIT_PER_SECOND")]
    pub rate_limit: Option<u32>,

    /// OpenWeatherMap current-weather endpoint
    #[arg(long, env = "OPENWEATHERMAP_API_URL")]
    pub api_url: Option<String>,

    /// Unit of measurement requested from OpenWeatherMap
    #[arg(long, env = "UNITS_OF_MEASUREMENT")]
    pub units: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn app_config(&self) -> AppConfig {
        AppConfig::new(
            self.port.unwrap_or_default(),
            self.rate_limit.unwrap_or_default(),
            self.api_url.clone().unwrap_or_default(),
            self.units.clone().unwrap_or_default(),
        )
    }
}
