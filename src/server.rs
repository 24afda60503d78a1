use crate::config::AppConfig;
use crate::handlers::{get_weather, AppState};
use crate::middleware::{api_key_middleware, logging_middleware, rate_limit_middleware};
use crate::rate_limiter::RateLimiter;
use crate::weather_api::WeatherApi;
use axum::routing::get;
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Assemble the router. Matched requests pass, outermost first, through tracing,
/// the global rate limiter, the API key gate and the access logger.
pub fn create_app(config: AppConfig, weather_api: Arc<dyn WeatherApi>) -> Router {
    let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit_per_second));
    let state = AppState::new(config, weather_api);

    Router::new()
        .route("/api/v1/weather", get(get_weather))
        .with_state(state)
        .route_layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(
                    rate_limiter,
                    rate_limit_middleware,
                ))
                .layer(middleware::from_fn(api_key_middleware))
                .layer(middleware::from_fn(logging_middleware)),
        )
}

pub struct Server {
    app: Router,
    addr: SocketAddr,
}

impl Server {
    pub fn new(config: AppConfig, weather_api: Arc<dyn WeatherApi>) -> Self {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let app = create_app(config, weather_api);

        Self { app, addr }
    }

    pub async fn run(self) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;

        tracing::info!("Starting server on {}", self.addr);
        tracing::info!("Weather endpoint available at /api/v1/weather");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}
