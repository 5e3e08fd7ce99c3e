//! Current conditions and forecasts from an OpenWeatherMap style API.

pub mod models;
pub mod service;

pub use models::{City, Condition, Forecast, MainData, WeatherSnapshot, Wind};
pub use service::{OpenWeatherClient, WeatherError, WeatherService};
