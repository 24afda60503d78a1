use axum::http::header::{HeaderValue, CONTENT_TYPE, RETRY_AFTER, X_CONTENT_TYPE_OPTIONS};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::weather_api::WeatherApiError;

/// Everything the gateway can answer with besides a weather summary.
///
/// `Display` is for logs; clients only ever see [`ApiError::client_message`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing lat and/or lon query parameter")]
    MissingCoordinates,

    #[error("missing X-API-Key header")]
    MissingApiKey,

    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error(transparent)]
    Upstream(#[from] WeatherApiError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingCoordinates | ApiError::MissingApiKey => StatusCode::BAD_REQUEST,
            ApiError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(err) => match err {
                WeatherApiError::InvalidApiKey => StatusCode::UNAUTHORIZED,
                WeatherApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
                WeatherApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                WeatherApiError::UnexpectedStatusCode(_)
                | WeatherApiError::Decoding(_)
                | WeatherApiError::Timeout => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Fixed single-line message; never carries upstream detail
    pub fn client_message(&self) -> String {
        let message = match self {
            ApiError::MissingCoordinates => "Missing required query parameters: lat and/or lon",
            ApiError::MissingApiKey => {
                "Missing 'X-API-Key' header. Include your OpenWeatherMap API key in the 'X-API-Key' header. See documentation for more details."
            }
            ApiError::RateLimitExceeded { retry_after_secs } => {
                return format!(
                    "Rate limit exceeded. Please wait {} seconds before retrying.",
                    retry_after_secs
                );
            }
            ApiError::Upstream(err) => match err {
                WeatherApiError::InvalidApiKey => "Invalid API key.",
                WeatherApiError::BadRequest(_) => "Bad request to OpenWeather API.",
                WeatherApiError::ServiceUnavailable(_) => "OpenWeather API service is unavailable.",
                WeatherApiError::UnexpectedStatusCode(_) | WeatherApiError::Decoding(_) => {
                    "An error occurred while processing your request."
                }
                // Timeouts share the generic branch rather than 503/504.
                WeatherApiError::Timeout => "An unexpected error occurred.",
            },
        };
        message.to_string()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status_code(), format!("{}\n", self.client_message())).into_response();

        let headers = response.headers_mut();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));

        if let ApiError::RateLimitExceeded { retry_after_secs } = self {
            headers.insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }

        response
    }
}
