pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod rate_limiter;
pub mod server;
pub mod temperature;
pub mod url_builder;
pub mod weather_api;

pub use config::AppConfig;
pub use error::ApiError;
pub use model::{WeatherData, WeatherResponse};
pub use server::create_app;
pub use weather_api::{OpenWeatherClient, WeatherApi, WeatherApiError};
