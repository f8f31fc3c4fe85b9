// src/enrich/weather.rs
//! Historical weather (simulated) and calendar facts for a photo timestamp.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Weekday};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use std::sync::Mutex;

use super::WeatherLookup;
use crate::photo::{PhotoRecord, TimeInfo, WeatherResult};
use crate::pipeline::ChannelBundle;

pub const WEATHER_DESCRIPTORS: [&str; 11] = [
    "rainy",
    "wet",
    "boiling hot",
    "sunny",
    "stormy",
    "drizzly",
    "hazy",
    "scorching",
    "hot",
    "unbearably hot",
    "miserably cold",
];

const ALT_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Picks a descriptor at random instead of calling the weather endpoint.
pub struct SimulatedWeatherClient {
    endpoint: String,
    rng: Mutex<StdRng>,
}

impl SimulatedWeatherClient {
    pub fn new(endpoint: &str, rng: StdRng) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            rng: Mutex::new(rng),
        }
    }

    fn pick_descriptor(&self) -> &'static str {
        let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
        WEATHER_DESCRIPTORS
            .choose(&mut *rng)
            .copied()
            .unwrap_or("sunny")
    }
}

#[async_trait]
impl WeatherLookup for SimulatedWeatherClient {
    async fn enhance_with_weather(&self, photo: &PhotoRecord, bundle: &ChannelBundle) {
        tracing::trace!(endpoint = %self.endpoint, photo = photo.index, "simulated weather lookup");

        let time_info = match date_to_season(&photo.timestamp) {
            Ok(ti) => ti,
            Err(e) => {
                tracing::warn!(error = %e, photo = %photo, "timestamp not understood");
                TimeInfo::default()
            }
        };

        let result = WeatherResult {
            article_id: photo.article_id.clone(),
            photo_index: photo.index,
            weather: self.pick_descriptor().to_string(),
            time_info,
        };
        if let Err(e) = bundle.send_weather(result).await {
            tracing::warn!(error = %e, photo = photo.index, "weather result dropped");
        }
    }
}

/// Weekday, month and season of a timestamp.
///
/// Accepts RFC 3339 (`2019-10-29T11:11:59Z`) or `2019-12-29 11:11:59`.
/// Seasons: Mar-May Spring, Jun-Aug Summer, Sep-Nov Autumn, otherwise Winter.
pub fn date_to_season(ts: &str) -> Result<TimeInfo> {
    let date: NaiveDate = match DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => dt.date_naive(),
        Err(_) => NaiveDateTime::parse_from_str(ts, ALT_LAYOUT)
            .with_context(|| format!("unsupported timestamp {ts:?}"))?
            .date(),
    };

    let month = date.month();
    let season = match month {
        3..=5 => "Spring",
        6..=8 => "Summer",
        9..=11 => "Autumn",
        _ => "Winter",
    };

    Ok(TimeInfo {
        weekday: weekday_name(date.weekday()).to_string(),
        month: MONTHS[(month - 1) as usize].to_string(),
        season: season.to_string(),
    })
}

fn weekday_name(w: Weekday) -> &'static str {
    match w {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
