use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn/";

/// One observation, current or forecast. Fields the provider leaves out keep their defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WeatherSnapshot {
    pub name: String,
    pub main: MainData,
    pub weather: Vec<Condition>,
    pub wind: Wind,
    /// Unix time of the observation
    pub dt: Option<i64>,
}

impl WeatherSnapshot {
    /// The provider lists the dominant condition first
    pub fn condition(&self) -> Option<&Condition> {
        self.weather.first()
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.dt.and_then(|dt| DateTime::from_timestamp(dt, 0))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MainData {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Condition {
    /// Short title, like "Clouds"
    pub main: String,
    pub description: String,
    /// Icon code, like "04d"
    pub icon: String,
}

impl Condition {
    pub fn icon_url(&self) -> Option<String> {
        if self.icon.is_empty() {
            None
        } else {
            Some(format!("{}{}@2x.png", ICON_BASE_URL, self.icon))
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Wind {
    pub speed: f64,
    /// Direction in degrees
    pub deg: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Forecast {
    pub list: Vec<WeatherSnapshot>,
    pub city: City,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct City {
    pub name: String,
    pub country: String,
    /// Offset from UTC in seconds
    pub timezone: i64,
}
