use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::observable::{PropertyNotifier, Subscription};
use crate::weather::{Forecast, WeatherService, WeatherSnapshot};

/// Observable properties of [`WeatherViewModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Property {
    CityName,
    CurrentWeather,
    Forecast,
    IsBusy,
    HasWeatherData,
    HasNoWeatherData,
    ErrorMessage,
}

#[derive(Debug, Default)]
struct State {
    city_name: String,
    current_weather: Option<WeatherSnapshot>,
    forecast: Option<Forecast>,
    is_busy: bool,
    has_weather_data: bool,
    error_message: Option<String>,
}

/// Presentation state of the weather screen.
///
/// State lives behind a lock that is never held across an await, and listeners are called
/// after it is released, so they are free to read the properties back.
pub struct WeatherViewModel {
    service: Arc<dyn WeatherService>,
    state: RwLock<State>,
    notifier: PropertyNotifier<Property>,
}

/// Clears the busy flag however the fetch ends, including being dropped mid-flight.
struct BusyGuard<'a> {
    view_model: &'a WeatherViewModel,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.view_model.set(Property::IsBusy, |s| &mut s.is_busy, false);
    }
}

impl WeatherViewModel {
    pub fn new(service: Arc<dyn WeatherService>) -> Self {
        Self {
            service,
            state: RwLock::new(State::default()),
            notifier: PropertyNotifier::new(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `value` and publish `property`, unless nothing changed.
    fn set<T: PartialEq>(
        &self,
        property: Property,
        field: impl FnOnce(&mut State) -> &mut T,
        value: T,
    ) -> bool {
        let changed = {
            let mut state = self.write();
            let slot = field(&mut state);
            if *slot == value {
                false
            } else {
                *slot = value;
                true
            }
        };
        if changed {
            self.notifier.publish(property);
        }
        changed
    }

    pub fn subscribe(&self, listener: impl Fn(Property) + Send + Sync + 'static) -> Subscription {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.notifier.unsubscribe(subscription)
    }

    pub fn city_name(&self) -> String {
        self.read().city_name.clone()
    }

    pub fn set_city_name(&self, city_name: impl Into<String>) {
        self.set(Property::CityName, |s| &mut s.city_name, city_name.into());
    }

    pub fn current_weather(&self) -> Option<WeatherSnapshot> {
        self.read().current_weather.clone()
    }

    fn set_current_weather(&self, weather: Option<WeatherSnapshot>) {
        self.set(Property::CurrentWeather, |s| &mut s.current_weather, weather);
    }

    pub fn forecast(&self) -> Option<Forecast> {
        self.read().forecast.clone()
    }

    fn set_forecast(&self, forecast: Option<Forecast>) {
        self.set(Property::Forecast, |s| &mut s.forecast, forecast);
    }

    pub fn is_busy(&self) -> bool {
        self.read().is_busy
    }

    pub fn has_weather_data(&self) -> bool {
        self.read().has_weather_data
    }

    pub fn has_no_weather_data(&self) -> bool {
        !self.has_weather_data()
    }

    fn set_has_weather_data(&self, value: bool) {
        if self.set(Property::HasWeatherData, |s| &mut s.has_weather_data, value) {
            self.notifier.publish(Property::HasNoWeatherData);
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.read().error_message.clone()
    }

    fn set_error_message(&self, message: Option<String>) {
        self.set(Property::ErrorMessage, |s| &mut s.error_message, message);
    }

    /// Check and set the busy flag in one step. None if a fetch is already running.
    fn begin(&self) -> Option<BusyGuard<'_>> {
        {
            let mut state = self.write();
            if state.is_busy {
                return None;
            }
            state.is_busy = true;
        }
        self.notifier.publish(Property::IsBusy);
        Some(BusyGuard { view_model: self })
    }

    /// Fetch the current weather for the city name. Does nothing while another fetch runs.
    pub async fn search(&self) {
        let Some(_busy) = self.begin() else {
            return;
        };
        self.set_current_weather(None);
        self.set_error_message(None);
        let city = self.city_name();
        match self.service.current(&city).await {
            Ok(snapshot) => {
                self.set_current_weather(Some(snapshot));
                self.set_has_weather_data(true);
            }
            Err(err) => {
                tracing::warn!("Weather lookup for '{}' failed: {}", city, err);
                self.set_has_weather_data(false);
                self.set_error_message(Some(err.to_string()));
            }
        }
    }

    /// Fetch the forecast for the city name, with the same busy rules as [`Self::search`].
    pub async fn load_forecast(&self) {
        let Some(_busy) = self.begin() else {
            return;
        };
        self.set_forecast(None);
        self.set_error_message(None);
        let city = self.city_name();
        match self.service.forecast(&city).await {
            Ok(forecast) => self.set_forecast(Some(forecast)),
            Err(err) => {
                tracing::warn!("Forecast lookup for '{}' failed: {}", city, err);
                self.set_error_message(Some(err.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::service::MockWeatherService;
    use crate::weather::{City, WeatherError};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    fn recorder(view_model: &WeatherViewModel) -> Arc<Mutex<Vec<Property>>> {
        let heard = Arc::new(Mutex::new(vec![]));
        let sink = heard.clone();
        view_model.subscribe(move |p| sink.lock().unwrap().push(p));
        heard
    }

    #[tokio::test]
    async fn search_stores_the_snapshot() {
        let mut service = MockWeatherService::new();
        service
            .expect_current()
            .withf(|city| city == "TestVille")
            .times(1)
            .returning(|_| {
                Ok(WeatherSnapshot {
                    name: "TestVille".into(),
                    ..Default::default()
                })
            });
        let view_model = WeatherViewModel::new(Arc::new(service));
        view_model.set_city_name("TestVille");
        let heard = recorder(&view_model);

        view_model.search().await;

        assert_eq!(view_model.current_weather().unwrap().name, "TestVille");
        assert!(!view_model.is_busy());
        assert!(view_model.has_weather_data());
        assert!(!view_model.has_no_weather_data());
        assert!(view_model.error_message().is_none());
        assert_eq!(
            *heard.lock().unwrap(),
            vec![
                Property::IsBusy,
                Property::CurrentWeather,
                Property::HasWeatherData,
                Property::HasNoWeatherData,
                Property::IsBusy,
            ]
        );
    }

    #[tokio::test]
    async fn unknown_city_sets_an_error() {
        let mut service = MockWeatherService::new();
        service
            .expect_current()
            .returning(|city| Err(WeatherError::CityNotFound(city.to_string())));
        let view_model = WeatherViewModel::new(Arc::new(service));
        view_model.set_city_name("Atlantis");

        view_model.search().await;

        assert!(view_model.current_weather().is_none());
        assert!(!view_model.is_busy());
        assert!(view_model.has_no_weather_data());
        assert_eq!(
            view_model.error_message().as_deref(),
            Some("No weather found for 'Atlantis'.")
        );
    }

    #[tokio::test]
    async fn forecast_is_stored() {
        let mut service = MockWeatherService::new();
        service.expect_forecast().returning(|_| {
            Ok(Forecast {
                list: vec![WeatherSnapshot::default(); 3],
                city: City {
                    name: "Lyon".into(),
                    country: "FR".into(),
                    timezone: 3600,
                },
            })
        });
        let view_model = WeatherViewModel::new(Arc::new(service));
        view_model.set_city_name("Lyon");
        view_model.load_forecast().await;
        let forecast = view_model.forecast().unwrap();
        assert_eq!(forecast.list.len(), 3);
        assert_eq!(forecast.city.country, "FR");
        assert!(!view_model.is_busy());
    }

    #[test]
    fn unchanged_values_are_not_published() {
        let view_model = WeatherViewModel::new(Arc::new(MockWeatherService::new()));
        let heard = recorder(&view_model);
        view_model.set_city_name("Paris");
        view_model.set_city_name("Paris");
        view_model.set_city_name("Nice");
        assert_eq!(
            *heard.lock().unwrap(),
            vec![Property::CityName, Property::CityName]
        );
    }

    /// Holds every lookup until released.
    struct GatedService {
        gate: Notify,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl WeatherService for GatedService {
        async fn current(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
            *self.calls.lock().unwrap() += 1;
            self.gate.notified().await;
            Ok(WeatherSnapshot {
                name: city.to_string(),
                ..Default::default()
            })
        }

        async fn forecast(&self, _city: &str) -> Result<Forecast, WeatherError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn overlapping_searches_are_ignored() {
        let service = Arc::new(GatedService {
            gate: Notify::new(),
            calls: Mutex::new(0),
        });
        let view_model = Arc::new(WeatherViewModel::new(service.clone()));
        view_model.set_city_name("Paris");

        let first = tokio::spawn({
            let view_model = view_model.clone();
            async move { view_model.search().await }
        });
        while !view_model.is_busy() {
            tokio::task::yield_now().await;
        }
        // Returns at once without calling the service
        view_model.search().await;
        view_model.load_forecast().await;
        assert_eq!(*service.calls.lock().unwrap(), 1);

        service.gate.notify_one();
        first.await.unwrap();
        assert!(!view_model.is_busy());
        assert_eq!(view_model.current_weather().unwrap().name, "Paris");
    }
}
