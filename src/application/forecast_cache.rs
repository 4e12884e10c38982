// In-memory cache of the latest upstream responses with update notifications
use crate::application::forecast_repository::Pm25Reading;
use crate::domain::time_series::TimeSeries;
use tokio::sync::{RwLock, broadcast};

const UPDATE_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSource {
    Uv,
    AirQuality,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEvent {
    pub source: UpdateSource,
    pub fetched_at_ms: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub value: T,
    pub fetched_at_ms: i64,
}

impl<T> Cached<T> {
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.fetched_at_ms
    }
}

pub struct ForecastCache {
    uv: RwLock<Option<Cached<TimeSeries>>>,
    air_quality: RwLock<Option<Cached<Pm25Reading>>>,
    updates: broadcast::Sender<UpdateEvent>,
}

impl ForecastCache {
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            uv: RwLock::new(None),
            air_quality: RwLock::new(None),
            updates,
        }
    }

    pub async fn uv_forecast(&self) -> Option<Cached<TimeSeries>> {
        self.uv.read().await.clone()
    }

    pub async fn air_quality(&self) -> Option<Cached<Pm25Reading>> {
        self.air_quality.read().await.clone()
    }

    /// Replace the cached forecast wholesale and notify subscribers.
    pub async fn store_uv_forecast(&self, series: TimeSeries, fetched_at_ms: i64) {
        *self.uv.write().await = Some(Cached {
            value: series,
            fetched_at_ms,
        });
        self.notify(UpdateSource::Uv, fetched_at_ms);
    }

    pub async fn store_air_quality(&self, reading: Pm25Reading, fetched_at_ms: i64) {
        *self.air_quality.write().await = Some(Cached {
            value: reading,
            fetched_at_ms,
        });
        self.notify(UpdateSource::AirQuality, fetched_at_ms);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UpdateEvent> {
        self.updates.subscribe()
    }

    fn notify(&self, source: UpdateSource, fetched_at_ms: i64) {
        // Err only means nobody is listening right now
        let receivers = self
            .updates
            .send(UpdateEvent {
                source,
                fetched_at_ms,
            })
            .unwrap_or(0);
        tracing::debug!("Published {:?} update to {} subscribers", source, receivers);
    }
}

impl Default for ForecastCache {
    fn default() -> Self {
        Self::new()
    }
}
