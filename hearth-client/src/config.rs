use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Longest accepted refresh interval, one day.
pub const MAX_REFRESH_MINUTES: u64 = 24 * 60;

/// Unit system understood by the weather provider.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, strum::EnumString, strum::IntoStaticStr, strum::Display,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn temperature_suffix(self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }
}

/// Weather provider settings, from flags or the environment.
#[derive(clap::Args, Debug, Clone)]
pub struct WeatherConfig {
    /// API key for the weather provider
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: String,
    /// Base URL of an OpenWeatherMap compatible API
    #[arg(long, env = "OPENWEATHER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
    /// metric, imperial or standard
    #[arg(long, env = "OPENWEATHER_UNITS", default_value = "metric")]
    pub units: Units,
    /// Language of the condition descriptions
    #[arg(long, env = "OPENWEATHER_LANG", default_value = "fr")]
    pub lang: String,
    /// Minutes between automatic refreshes
    #[arg(
        long,
        env = "OPENWEATHER_REFRESH_MINUTES",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..=MAX_REFRESH_MINUTES)
    )]
    pub refresh_minutes: u64,
}

impl WeatherConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            units: Units::default(),
            lang: "fr".into(),
            refresh_minutes: 10,
        }
    }

    /// Time between automatic refreshes, never shorter than a minute.
    pub fn refresh_interval(&self) -> Duration {
        let minutes = self.refresh_minutes.clamp(1, MAX_REFRESH_MINUTES);
        Duration::from_secs(minutes * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Cli {
        #[command(flatten)]
        weather: WeatherConfig,
    }

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(
            ["meteo", "--api-key", "key"]
                .iter()
                .chain(args.iter()),
        )
    }

    #[test]
    fn units_parse_loosely() {
        assert_eq!("Imperial".parse::<Units>().unwrap(), Units::Imperial);
        assert_eq!(<&'static str>::from(Units::Metric), "metric");
        assert!("kelvin".parse::<Units>().is_err());
    }

    #[test]
    fn default_refresh_is_ten_minutes() {
        assert_eq!(
            WeatherConfig::new("key").refresh_interval(),
            Duration::from_secs(600)
        );
    }

    #[test]
    fn zero_refresh_minutes_is_refused() {
        let err = parse(&["--refresh-minutes", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(parse(&["--refresh-minutes", "1441"]).is_err());
    }

    #[test]
    fn refresh_minutes_flag_sets_interval() {
        let cli = parse(&["--refresh-minutes", "15"]).unwrap();
        assert_eq!(cli.weather.refresh_interval(), Duration::from_secs(900));
    }

    #[test]
    fn out_of_range_interval_is_clamped() {
        let mut config = WeatherConfig::new("key");
        config.refresh_minutes = 0;
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
        config.refresh_minutes = u64::MAX / 30;
        assert_eq!(
            config.refresh_interval(),
            Duration::from_secs(MAX_REFRESH_MINUTES * 60)
        );
    }
}
