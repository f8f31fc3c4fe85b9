// src/enrich/mod.rs
//! Enrichment collaborators: one capability per source.
//!
//! Contract for every capability: for one photo, send exactly one result on
//! the matching bundle channel, or exactly one message on the error channel.

pub mod here;
pub mod http;
pub mod location;
pub mod poi;
pub mod weather;

use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

use crate::config::Setup;
use crate::photo::PhotoRecord;
use crate::pipeline::ChannelBundle;

pub use location::HereLocationClient;
pub use poi::SimulatedPoiClient;
pub use weather::{date_to_season, SimulatedWeatherClient};

#[async_trait]
pub trait LocationLookup: Send + Sync {
    async fn enhance_with_location(&self, photo: &PhotoRecord, bundle: &ChannelBundle);
}

#[async_trait]
pub trait WeatherLookup: Send + Sync {
    async fn enhance_with_weather(&self, photo: &PhotoRecord, bundle: &ChannelBundle);
}

#[async_trait]
pub trait PoiLookup: Send + Sync {
    async fn enhance_with_places_of_interest(&self, photo: &PhotoRecord, bundle: &ChannelBundle);
}

/// The three collaborators used by one run.
#[derive(Clone)]
pub struct Enrichers {
    pub location: Arc<dyn LocationLookup>,
    pub weather: Arc<dyn WeatherLookup>,
    pub poi: Arc<dyn PoiLookup>,
}

impl Enrichers {
    pub fn new(
        location: Arc<dyn LocationLookup>,
        weather: Arc<dyn WeatherLookup>,
        poi: Arc<dyn PoiLookup>,
    ) -> Self {
        Self {
            location,
            weather,
            poi,
        }
    }

    /// Build the production collaborators.
    /// With `rng_seed` set, the simulated sources are reproducible.
    pub fn from_setup(cfg: &Setup) -> Result<Self> {
        let location = HereLocationClient::new(&cfg.here_url, &cfg.here_api_key)?;
        let weather = SimulatedWeatherClient::new(&cfg.weather_url, seeded_rng(cfg.rng_seed, 1));
        let poi = SimulatedPoiClient::new(&cfg.google_places_url, seeded_rng(cfg.rng_seed, 2));
        Ok(Self::new(Arc::new(location), Arc::new(weather), Arc::new(poi)))
    }
}

fn seeded_rng(seed: Option<u64>, salt: u64) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s.wrapping_add(salt)),
        None => StdRng::from_os_rng(),
    }
}
