use axum::extract::{RawQuery, State};
use axum::Json;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::middleware::ApiKey;
use crate::model::WeatherResponse;
use crate::weather_api::WeatherApi;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub weather_api: Arc<dyn WeatherApi>,
}

impl AppState {
    pub fn new(config: AppConfig, weather_api: Arc<dyn WeatherApi>) -> Self {
        Self {
            config: Arc::new(config),
            weather_api,
        }
    }
}

/// Coordinates exactly as the caller sent them; numeric format is left to the upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub lat: String,
    pub lon: String,
}

impl Coordinates {
    /// First occurrence of each parameter wins; missing or empty values are rejected.
    pub fn from_query(query: Option<&str>) -> Result<Self, ApiError> {
        let mut lat = None;
        let mut lon = None;

        for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "lat" if lat.is_none() => lat = Some(value.into_owned()),
                "lon" if lon.is_none() => lon = Some(value.into_owned()),
                _ => {}
            }
        }

        match (lat, lon) {
            (Some(lat), Some(lon)) if !lat.is_empty() && !lon.is_empty() => Ok(Self { lat, lon }),
            _ => Err(ApiError::MissingCoordinates),
        }
    }
}

/// `GET /api/v1/weather?lat=..&lon=..`
pub async fn get_weather(
    State(state): State<AppState>,
    api_key: ApiKey,
    RawQuery(query): RawQuery,
) -> Result<Json<WeatherResponse>, ApiError> {
    let coordinates = Coordinates::from_query(query.as_deref())?;
    let config = &state.config;

    let data = state
        .weather_api
        .fetch_weather_data(
            &api_key,
            &coordinates.lat,
            &coordinates.lon,
            &config.openweathermap_api_url,
            &config.unit_of_measurement,
        )
        .await?;

    Ok(Json(WeatherResponse::from_weather_data(
        &data,
        &config.unit_of_measurement,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MainInfo, WeatherCondition, WeatherData};
    use crate::weather_api::WeatherApiError;
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubWeatherApi {
        calls: AtomicUsize,
        seen: Mutex<Vec<(String, String, String, String)>>,
        respond: Box<dyn Fn() -> Result<WeatherData, WeatherApiError> + Send + Sync>,
    }

    impl StubWeatherApi {
        fn new(
            respond: impl Fn() -> Result<WeatherData, WeatherApiError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
                respond: Box::new(respond),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherApi for StubWeatherApi {
        async fn fetch_weather_data(
            &self,
            api_key: &ApiKey,
            lat: &str,
            lon: &str,
            base_url: &str,
            _unit_of_measurement: &str,
        ) -> Result<WeatherData, WeatherApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push((
                api_key.expose().to_string(),
                lat.to_string(),
                lon.to_string(),
                base_url.to_string(),
            ));
            (self.respond)()
        }
    }

    fn test_config() -> AppConfig {
        AppConfig::new(0, 0, "http://example.com", "standard")
    }

    async fn call(stub: Arc<StubWeatherApi>, query: Option<&str>) -> (StatusCode, String) {
        let state = AppState::new(test_config(), stub);
        let response: Response = get_weather(
            State(state),
            ApiKey::new("test-api-key"),
            RawQuery(query.map(str::to_string)),
        )
        .await
        .into_response();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_coordinates_from_query() {
        assert_eq!(
            Coordinates::from_query(Some("lat=35.6895&lon=139.6917")).unwrap(),
            Coordinates {
                lat: "35.6895".to_string(),
                lon: "139.6917".to_string()
            }
        );

        let first_wins = Coordinates::from_query(Some("lat=1&lat=2&lon=3")).unwrap();
        assert_eq!(first_wins.lat, "1");

        for query in [None, Some(""), Some("lon=139"), Some("lat=35"), Some("lat=&lon=139")] {
            assert!(
                matches!(Coordinates::from_query(query), Err(ApiError::MissingCoordinates)),
                "query {:?}",
                query
            );
        }
    }

    #[tokio::test]
    async fn test_get_weather_success() {
        let stub = StubWeatherApi::new(|| {
            Ok(WeatherData {
                main: MainInfo { temp: 280.32 },
                weather: vec![WeatherCondition {
                    main: "Clear".to_string(),
                }],
            })
        });

        let (status, body) = call(Arc::clone(&stub), Some("lat=35&lon=139")).await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"weatherCondition": "Clear", "tempCategory": "Cold"})
        );

        let seen = stub.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            (
                "test-api-key".to_string(),
                "35".to_string(),
                "139".to_string(),
                "http://example.com".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_get_weather_missing_params_skips_upstream() {
        for query in [Some("lon=139"), Some("lat=35"), None] {
            let stub = StubWeatherApi::new(|| Ok(WeatherData::default()));
            let (status, body) = call(Arc::clone(&stub), query).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, "Missing required query parameters: lat and/or lon\n");
            assert_eq!(stub.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_get_weather_fetch_error() {
        let stub = StubWeatherApi::new(|| {
            Err(WeatherApiError::ServiceUnavailable("down".to_string()))
        });

        let (status, body) = call(stub, Some("lat=35&lon=139")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("OpenWeather API service is unavailable"));
    }

    #[tokio::test]
    async fn test_get_weather_timeout_maps_to_generic_error() {
        let stub = StubWeatherApi::new(|| Err(WeatherApiError::Timeout));

        let (status, body) = call(stub, Some("lat=35&lon=139")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "An unexpected error occurred.\n");
    }
}
