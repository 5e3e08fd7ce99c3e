use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use hearth_client::{
    config::WeatherConfig,
    refresh::AutoRefresh,
    view_model::{Property, WeatherViewModel},
    weather::OpenWeatherClient,
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Show the weather for a city and keep it fresh.
///
/// Type another city name to switch, or `?` for the forecast of the current one.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// City to show first
    city: Option<String>,
    #[command(flatten)]
    weather: WeatherConfig,
}

fn render(view_model: &WeatherViewModel, property: Property, config: &WeatherConfig) {
    match property {
        Property::IsBusy if view_model.is_busy() => println!("Loading..."),
        Property::CurrentWeather => {
            if let Some(weather) = view_model.current_weather() {
                let suffix = config.units.temperature_suffix();
                println!(
                    "{}: {:.1}{} (feels like {:.1}{}), humidity {}%, wind {:.1} m/s at {:.0}°",
                    weather.name,
                    weather.main.temp,
                    suffix,
                    weather.main.feels_like,
                    suffix,
                    weather.main.humidity,
                    weather.wind.speed,
                    weather.wind.deg,
                );
                if let Some(condition) = weather.condition() {
                    println!("  {} ({})", condition.description, condition.main);
                }
                if let Some(at) = weather.observed_at() {
                    println!("  observed {}", at.with_timezone(&chrono::Local).format("%a %-d %B %H:%M"));
                }
            }
        }
        Property::Forecast => {
            if let Some(forecast) = view_model.forecast() {
                println!("Forecast for {}, {}:", forecast.city.name, forecast.city.country);
                for entry in &forecast.list {
                    let when = entry
                        .observed_at()
                        .map(|at| at.with_timezone(&chrono::Local).format("%a %-d %B %H:%M").to_string())
                        .unwrap_or_default();
                    let description = entry
                        .condition()
                        .map(|c| c.description.as_str())
                        .unwrap_or_default();
                    println!("  {:<22} {:>6.1}  {}", when, entry.main.temp, description);
                }
            }
        }
        Property::ErrorMessage => {
            if let Some(message) = view_model.error_message() {
                eprintln!("{}", message);
            }
        }
        _ => {}
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();
    let interval = args.weather.refresh_interval();

    let service = Arc::new(OpenWeatherClient::new(args.weather.clone()));
    let view_model = Arc::new(WeatherViewModel::new(service));

    // Property changes arrive on whatever task made them; print them from here
    let (tx, mut changes) = tokio::sync::mpsc::unbounded_channel();
    view_model.subscribe(move |property| {
        let _ = tx.send(property);
    });

    let refresh = AutoRefresh::new();
    if let Some(city) = &args.city {
        view_model.set_city_name(city.as_str());
        refresh.start(view_model.clone(), interval);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(property) = changes.recv() => render(&view_model, property, &args.weather),
            line = lines.next_line() => match line? {
                Some(line) if line.trim() == "?" => {
                    let view_model = view_model.clone();
                    tokio::spawn(async move { view_model.load_forecast().await });
                }
                Some(city) if !city.trim().is_empty() => {
                    view_model.set_city_name(city.trim());
                    refresh.start(view_model.clone(), interval);
                }
                Some(_) => {}
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    refresh.stop();
    Ok(())
}
