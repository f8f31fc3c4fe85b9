// src/photo.rs
//! Photo records read from an article file and the per-photo enrichment results
//! produced by the location, weather and points-of-interest sources.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Latitude/longitude exactly as they appear in the article row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatLon {
    pub latitude: String,
    pub longitude: String,
}

impl LatLon {
    /// `lat,lon` form used by reverse geocoding queries.
    pub fn to_at(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// One row of an article. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub article_id: String,
    /// 1-based row number.
    pub index: usize,
    pub timestamp: String,
    pub lat_lon: LatLon,
}

impl fmt::Display for PhotoRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{} ({} @ {})",
            self.article_id,
            self.index,
            self.timestamp,
            self.lat_lon.to_at()
        )
    }
}

/// The three independent enrichment kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Location,
    Weather,
    Poi,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Location, SourceKind::Weather, SourceKind::Poi];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Location => "location",
            SourceKind::Weather => "weather",
            SourceKind::Poi => "poi",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationResult {
    pub article_id: String,
    pub photo_index: usize,
    pub country: String,
    pub city: String,
}

/// Calendar facts derived from a photo timestamp.
/// All fields are empty when the timestamp could not be parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInfo {
    pub weekday: String,
    pub month: String,
    pub season: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub article_id: String,
    pub photo_index: usize,
    pub weather: String,
    pub time_info: TimeInfo,
}

/// Example: `{"Restaurants": 10, "Bars": 12, "Swimming Pools": 4}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoiResult {
    pub article_id: String,
    pub photo_index: usize,
    pub categories: HashMap<String, u32>,
}

/// Identifies which photo a result belongs to.
pub trait PhotoKeyed {
    fn photo_key(&self) -> (&str, usize);
}

impl PhotoKeyed for LocationResult {
    fn photo_key(&self) -> (&str, usize) {
        (&self.article_id, self.photo_index)
    }
}

impl PhotoKeyed for WeatherResult {
    fn photo_key(&self) -> (&str, usize) {
        (&self.article_id, self.photo_index)
    }
}

impl PhotoKeyed for PoiResult {
    fn photo_key(&self) -> (&str, usize) {
        (&self.article_id, self.photo_index)
    }
}
