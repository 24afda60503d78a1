use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::middleware::ApiKey;
use crate::model::WeatherData;
use crate::url_builder::{build_openweathermap_url, UrlBuildError};

/// Upper bound on a single OpenWeatherMap exchange, body included
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Failures produced while talking to OpenWeatherMap
#[derive(Debug, Error)]
pub enum WeatherApiError {
    #[error("bad request to OpenWeather API: {0}")]
    BadRequest(String),

    #[error("invalid OpenWeatherMap API key")]
    InvalidApiKey,

    #[error("OpenWeather API service is unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("request to OpenWeather API timed out")]
    Timeout,

    #[error("unexpected status code from OpenWeather API: {0}")]
    UnexpectedStatusCode(u16),

    #[error("error decoding response from OpenWeather API: {0}")]
    Decoding(String),
}

impl From<UrlBuildError> for WeatherApiError {
    fn from(err: UrlBuildError) -> Self {
        WeatherApiError::BadRequest(err.to_string())
    }
}

/// Source of current weather conditions for a coordinate pair
#[async_trait]
pub trait WeatherApi: Send + Sync {
    async fn fetch_weather_data(
        &self,
        api_key: &ApiKey,
        lat: &str,
        lon: &str,
        base_url: &str,
        unit_of_measurement: &str,
    ) -> Result<WeatherData, WeatherApiError>;
}

/// OpenWeatherMap client; one attempt per call, no retries.
///
/// Dropping the returned future (for example when the inbound connection goes away)
/// aborts the in-flight upstream request.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: Client,
    timeout: Duration,
}

impl OpenWeatherClient {
    pub fn new() -> Self {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            timeout,
        }
    }

    async fn execute(&self, url: &str) -> Result<WeatherData, WeatherApiError> {
        let response = self.http.get(url).send().await.map_err(classify_transport_error)?;

        let status = response.status();
        match status {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => return Err(WeatherApiError::InvalidApiKey),
            StatusCode::BAD_REQUEST => {
                return Err(WeatherApiError::BadRequest(
                    "upstream rejected the request".to_string(),
                ))
            }
            StatusCode::SERVICE_UNAVAILABLE => {
                return Err(WeatherApiError::ServiceUnavailable(
                    "upstream returned 503".to_string(),
                ))
            }
            other => return Err(WeatherApiError::UnexpectedStatusCode(other.as_u16())),
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                WeatherApiError::Timeout
            } else {
                WeatherApiError::Decoding(e.without_url().to_string())
            }
        })?;

        serde_json::from_slice(&body).map_err(|e| WeatherApiError::Decoding(e.to_string()))
    }
}

impl Default for OpenWeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Error text never carries the request URL, which holds the caller's `appid`.
fn classify_transport_error(err: reqwest::Error) -> WeatherApiError {
    let err = err.without_url();
    if err.is_timeout() {
        WeatherApiError::Timeout
    } else if err.is_builder() {
        WeatherApiError::BadRequest(err.to_string())
    } else {
        WeatherApiError::ServiceUnavailable(err.to_string())
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    async fn fetch_weather_data(
        &self,
        api_key: &ApiKey,
        lat: &str,
        lon: &str,
        base_url: &str,
        unit_of_measurement: &str,
    ) -> Result<WeatherData, WeatherApiError> {
        if api_key.is_empty() {
            return Err(WeatherApiError::BadRequest(
                "API key not provided".to_string(),
            ));
        }

        let url = build_openweathermap_url(
            base_url,
            api_key.expose(),
            lat,
            lon,
            unit_of_measurement,
        )?;

        let result = match tokio::time::timeout(self.timeout, self.execute(&url)).await {
            Ok(result) => result,
            Err(_) => Err(WeatherApiError::Timeout),
        };

        match &result {
            Ok(_) => debug!(lat, lon, "Fetched weather data from OpenWeather API"),
            Err(e) => warn!(lat, lon, error = %e, "OpenWeather API request failed"),
        }

        result
    }
}
