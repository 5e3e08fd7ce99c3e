use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::models::{Forecast, WeatherSnapshot};
use crate::config::WeatherConfig;

#[derive(thiserror::Error, Debug)]
pub enum WeatherError {
    #[error("Please enter a city name.")]
    BlankCity,
    #[error("No weather found for '{0}'.")]
    CityNotFound(String),
    #[error("The weather service answered {0}.")]
    Status(reqwest::StatusCode),
    #[error("Could not reach the weather service: {0}")]
    Network(#[from] reqwest::Error),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherService: Send + Sync {
    /// Current conditions for a city.
    async fn current(&self, city: &str) -> Result<WeatherSnapshot, WeatherError>;

    /// Forecast in three hour steps for a city.
    async fn forecast(&self, city: &str) -> Result<Forecast, WeatherError>;
}

/// [`WeatherService`] over HTTP, against OpenWeatherMap or anything speaking its API.
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    config: WeatherConfig,
}

impl OpenWeatherClient {
    pub fn new(config: WeatherConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: &str, city: &str) -> Result<T, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::BlankCity);
        }
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let units: &'static str = self.config.units.into();
        tracing::debug!("Fetching {} for {}", url, city);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.config.api_key.as_str()),
                ("units", units),
                ("lang", self.config.lang.as_str()),
            ])
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Err(WeatherError::CityNotFound(city.to_string()))
        } else {
            Err(WeatherError::Status(status))
        }
    }
}

#[async_trait]
impl WeatherService for OpenWeatherClient {
    async fn current(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        self.fetch("weather", city).await
    }

    async fn forecast(&self, city: &str) -> Result<Forecast, WeatherError> {
        self.fetch("forecast", city).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_city_never_reaches_the_network() {
        let mut config = WeatherConfig::new("key");
        // Nothing listens here, so a request would fail differently
        config.base_url = "http://127.0.0.1:9".into();
        let client = OpenWeatherClient::new(config);
        assert!(matches!(
            client.current("   ").await,
            Err(WeatherError::BlankCity)
        ));
        assert!(matches!(
            client.forecast("").await,
            Err(WeatherError::BlankCity)
        ));
        assert!(matches!(
            client.current("Paris").await,
            Err(WeatherError::Network(_))
        ));
    }
}
