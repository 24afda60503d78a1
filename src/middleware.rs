use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::rate_limiter::{Admission, RateLimiter};

/// Header carrying the caller's OpenWeatherMap API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Caller-supplied OpenWeatherMap credential.
///
/// Forwarded upstream as `appid` and nowhere else; `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(Arc<str>);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Arc::from(key.into()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Hands the key stored by [`api_key_middleware`] to the handler
#[async_trait]
impl<S> FromRequestParts<S> for ApiKey
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ApiKey>()
            .cloned()
            .ok_or(ApiError::MissingApiKey)
    }
}

/// Global throttle; rejects with 429 and `Retry-After` while inside the admission interval
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    match limiter.check() {
        Admission::Admitted => next.run(request).await,
        Admission::Rejected { retry_after_secs } => {
            debug!(
                target: "weather_gateway::middleware",
                method = %request.method(),
                path = %request.uri().path(),
                retry_after_secs,
                "Request rejected by rate limiter"
            );
            ApiError::RateLimitExceeded { retry_after_secs }.into_response()
        }
    }
}

/// Requires a non-empty `X-API-Key` header and stores it for the handler.
///
/// Any UTF-8 value is forwarded as-is; bytes that are not UTF-8 are rejected like a missing header.
pub async fn api_key_middleware(mut request: Request, next: Next) -> Response {
    let api_key = match request.headers().get(API_KEY_HEADER) {
        None => None,
        Some(value) => match std::str::from_utf8(value.as_bytes()) {
            Ok(key) if !key.is_empty() => Some(ApiKey::new(key)),
            Ok(_) => None,
            Err(_) => {
                debug!(
                    target: "weather_gateway::middleware",
                    method = %request.method(),
                    path = %request.uri().path(),
                    "X-API-Key header is not valid UTF-8, treating it as missing"
                );
                None
            }
        },
    };

    match api_key {
        Some(api_key) => {
            request.extensions_mut().insert(api_key);
            next.run(request).await
        }
        None => ApiError::MissingApiKey.into_response(),
    }
}

/// Access log: one line per request with the final status and wall-clock duration
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    info!(
        target: "weather_gateway::middleware",
        request_id = %request_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Request completed"
    );

    response
}
