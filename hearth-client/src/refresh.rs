use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::view_model::WeatherViewModel;

/// Periodically re-runs [`WeatherViewModel::search`]. At most one loop runs at a time.
#[derive(Default)]
pub struct AutoRefresh {
    current: Mutex<Option<CancellationToken>>,
}

impl AutoRefresh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start refreshing now and then every `interval`, replacing any running loop.
    pub fn start(&self, view_model: Arc<WeatherViewModel>, interval: Duration) {
        let token = CancellationToken::new();
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        tracing::info!("Refreshing the weather every {:?}", interval);
        tokio::spawn(refresh_loop(view_model, interval, token));
    }

    pub fn stop(&self) {
        if let Some(token) = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn refresh_loop(view_model: Arc<WeatherViewModel>, interval: Duration, token: CancellationToken) {
    loop {
        if token.is_cancelled() {
            break;
        }
        if view_model.is_busy() {
            tracing::debug!("Skipping refresh, a lookup is already running");
        } else if view_model.city_name().trim().is_empty() {
            tracing::debug!("Skipping refresh, no city");
        } else {
            // Failures are reported through the view model and never end the loop
            tokio::select! {
                _ = token.cancelled() => break,
                _ = view_model.search() => {}
            }
        }
        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    tracing::debug!("Weather refresh stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::service::MockWeatherService;
    use crate::weather::{WeatherError, WeatherSnapshot};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TEN_MINUTES: Duration = Duration::from_secs(600);

    fn counting_service(calls: Arc<AtomicUsize>) -> MockWeatherService {
        let mut service = MockWeatherService::new();
        service.expect_current().returning(move |_| {
            // Every other lookup fails; the loop has to survive that
            if calls.fetch_add(1, Ordering::SeqCst) % 2 == 1 {
                Err(WeatherError::Status(reqwest::StatusCode::BAD_GATEWAY))
            } else {
                Ok(WeatherSnapshot::default())
            }
        });
        service
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_on_every_tick_until_stopped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let view_model = Arc::new(WeatherViewModel::new(Arc::new(counting_service(
            calls.clone(),
        ))));
        view_model.set_city_name("Paris");
        let refresh = AutoRefresh::new();
        refresh.start(view_model.clone(), TEN_MINUTES);
        assert!(refresh.is_running());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        tokio::time::sleep(TEN_MINUTES).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(view_model.error_message().is_some());
        tokio::time::sleep(TEN_MINUTES).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(view_model.error_message().is_none());

        refresh.stop();
        assert!(!refresh.is_running());
        tokio::time::sleep(TEN_MINUTES * 6).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_replaces_the_loop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let view_model = Arc::new(WeatherViewModel::new(Arc::new(counting_service(
            calls.clone(),
        ))));
        view_model.set_city_name("Paris");
        let refresh = AutoRefresh::new();
        refresh.start(view_model.clone(), TEN_MINUTES);
        tokio::time::sleep(Duration::from_secs(1)).await;
        refresh.start(view_model.clone(), TEN_MINUTES);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Only the second loop is left to tick
        tokio::time::sleep(TEN_MINUTES).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_city_is_skipped() {
        let mut service = MockWeatherService::new();
        service.expect_current().never();
        let view_model = Arc::new(WeatherViewModel::new(Arc::new(service)));
        let refresh = AutoRefresh::new();
        refresh.start(view_model.clone(), TEN_MINUTES);
        tokio::time::sleep(TEN_MINUTES * 3).await;
        assert!(refresh.is_running());
        assert!(view_model.current_weather().is_none());
    }
}
