// src/pipeline/aggregate.rs
//! ResultAggregator: drain each source channel until it closes.

use tokio::sync::mpsc;

use crate::photo::{LocationResult, PoiResult, WeatherResult};

/// Results of one article in arrival order.
#[derive(Debug, Default, Clone)]
pub struct Aggregated {
    pub locations: Vec<LocationResult>,
    pub weather: Vec<WeatherResult>,
    pub pois: Vec<PoiResult>,
}

impl Aggregated {
    /// True when at least one source produced nothing.
    pub fn any_empty(&self) -> bool {
        self.locations.is_empty() || self.weather.is_empty() || self.pois.is_empty()
    }
}

pub async fn drain<T>(rx: &mut mpsc::Receiver<T>) -> Vec<T> {
    let mut out = Vec::new();
    while let Some(v) = rx.recv().await {
        out.push(v);
    }
    out
}

/// Drains the three channels concurrently so no sender stays blocked on a
/// channel nobody reads. Returns once all three are closed.
pub async fn gather(
    location: &mut mpsc::Receiver<LocationResult>,
    weather: &mut mpsc::Receiver<WeatherResult>,
    poi: &mut mpsc::Receiver<PoiResult>,
) -> Aggregated {
    let (locations, weather, pois) = tokio::join!(drain(location), drain(weather), drain(poi));
    Aggregated {
        locations,
        weather,
        pois,
    }
}
