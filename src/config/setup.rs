// src/config/setup.rs
//! Third-party endpoints, the geocoder key and runtime knobs.
//!
//! Layers, lowest priority first:
//! 1) built-in defaults
//! 2) TOML file: `$TRAVEL_HEADINGS_CONFIG`, else `config/headings.toml` if present
//! 3) environment variables (a `.env` file is loaded by the binary)

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::{DispatchDelay, PipelineConfig};

pub const ENV_CONFIG_PATH: &str = "TRAVEL_HEADINGS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/headings.toml";

pub const DEFAULT_DIRECTORY: &str = "data4testing";
pub const DEFAULT_HERE_URL: &str = "https://revgeocode.search.hereapi.com/v1/revgeocode";
pub const DEFAULT_GOOGLE_PLACES_URL: &str =
    "https://maps.googleapis.com/maps/api/place/findplacefromtext/json";
pub const DEFAULT_WEATHER_URL: &str = "https://weather.com/historical/json";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Setup {
    /// Directory holding one CSV file per article.
    pub directory: PathBuf,
    pub here_url: String,
    /// Required. Empty means "not configured".
    pub here_api_key: String,
    pub google_places_url: String,
    pub weather_url: String,
    pub location_delay_min_ms: u64,
    pub location_delay_span_ms: u64,
    pub rng_seed: Option<u64>,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            here_url: DEFAULT_HERE_URL.to_string(),
            here_api_key: String::new(),
            google_places_url: DEFAULT_GOOGLE_PLACES_URL.to_string(),
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            location_delay_min_ms: 100,
            location_delay_span_ms: 190,
            rng_seed: None,
        }
    }
}

impl Setup {
    /// Load all layers from the process environment and validate.
    pub fn load() -> Result<Self> {
        let mut cfg = match config_file_path()? {
            Some(p) => Self::load_from_file(&p)?,
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a TOML file. Missing keys keep their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Overlay environment variables. `lookup` is injectable for tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("TRAVEL_ARTICLES_DIR") {
            self.directory = PathBuf::from(v);
        }
        if let Some(v) = get("HERE_URL") {
            self.here_url = v;
        }
        if let Some(v) = get("HERE_API_KEY") {
            self.here_api_key = v;
        }
        if let Some(v) = get("GOOGLE_PLACES_URL") {
            self.google_places_url = v;
        }
        if let Some(v) = get("WEATHER_URL") {
            self.weather_url = v;
        }
        if let Some(v) = get("LOCATION_DELAY_MIN_MS") {
            self.location_delay_min_ms = parse_u64("LOCATION_DELAY_MIN_MS", &v)?;
        }
        if let Some(v) = get("LOCATION_DELAY_SPAN_MS") {
            self.location_delay_span_ms = parse_u64("LOCATION_DELAY_SPAN_MS", &v)?;
        }
        if let Some(v) = get("HEADINGS_RNG_SEED") {
            self.rng_seed = Some(parse_u64("HEADINGS_RNG_SEED", &v)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.here_api_key.trim().is_empty() {
            bail!("HERE_API_KEY is required (env var or `here_api_key` in config)");
        }
        for (name, url) in [
            ("here_url", &self.here_url),
            ("google_places_url", &self.google_places_url),
            ("weather_url", &self.weather_url),
        ] {
            reqwest::Url::parse(url).with_context(|| format!("invalid {name}: {url}"))?;
        }
        Ok(())
    }

    /// Runtime knobs for the article pipeline.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            location_delay: DispatchDelay::new(
                self.location_delay_min_ms,
                self.location_delay_span_ms,
            ),
            rng_seed: self.rng_seed,
        }
    }
}

fn config_file_path() -> Result<Option<PathBuf>> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(Some(pb));
        }
        return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_PATH);
    Ok(default.exists().then_some(default))
}

fn parse_u64(name: &str, raw: &str) -> Result<u64> {
    raw.parse::<u64>()
        .with_context(|| format!("{name} must be a non-negative integer, got {raw:?}"))
}
