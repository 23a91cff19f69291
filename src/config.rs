//! YAML configuration loading.
//!
//! A run is driven by a single YAML file:
//!
//! ```yaml
//! country: Germany          # ROW export query selector
//! # states: [Texas]         # optional: per-state North America queries
//! mode: fetch               # fetch | dump | load
//! decimal: comma            # comma | point
//! tg_list: BM               # talk-group list for digital channels
//! zones:                    # declaration order drives output order
//!   Rhein-Main:
//!     latitude: 50.1
//!     longitude: 8.68
//!     max_distance: 50      # radius in km
//! ```
//!
//! Keep zone radii modest: the device holds 1024 channels total, and a
//! generous radius in a dense region fills that during CPS import.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, ZoneGenError};
use crate::geo::Coordinate;
use crate::zone::Zone;

/// Where repeater records come from for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Query RepeaterBook, keep nothing on disk.
    Fetch,
    /// Query RepeaterBook and store the raw result as a snapshot file.
    /// RepeaterBook rate-limits exports; dump once, then iterate offline.
    Dump,
    /// Read the snapshot file, never touch the network.
    Load,
}

/// Decimal separator used in the generated CSV fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DecimalStyle {
    /// Decimal point, e.g. `438.775`.
    Point,
    /// Decimal comma, e.g. `438,775` (German-localized CPS).
    Comma,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Country selector for the ROW export query.
    pub country: String,

    /// When present, the North America endpoint is queried once per listed
    /// state instead of one ROW query per band.
    #[serde(default)]
    pub states: Option<Vec<String>>,

    pub mode: SourceMode,

    #[serde(default = "default_decimal")]
    pub decimal: DecimalStyle,

    /// Talk-group list assigned to digital channels.
    #[serde(default = "default_tg_list")]
    pub tg_list: String,

    /// Ordered zone mapping; converted to typed zones via [`Config::zones`].
    zones: serde_yaml_ng::Mapping,
}

fn default_decimal() -> DecimalStyle {
    DecimalStyle::Comma
}

fn default_tg_list() -> String {
    "BM".to_string()
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ZoneGenError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&text).map_err(|e| match e {
            ZoneGenError::Config(msg) => {
                ZoneGenError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse configuration text. Fails fast, before any fetch happens.
    pub fn parse(text: &str) -> Result<Self> {
        let config: Config = serde_yaml_ng::from_str(text)
            .map_err(|e| ZoneGenError::Config(e.to_string()))?;
        if config.zones.is_empty() {
            return Err(ZoneGenError::Config("no zones configured".to_string()));
        }
        // Surface zone-entry problems now rather than after the fetch.
        config.zones()?;
        Ok(config)
    }

    /// The configured zones, in declaration order.
    pub fn zones(&self) -> Result<Vec<Zone>> {
        let mut zones = Vec::with_capacity(self.zones.len());
        for (key, value) in &self.zones {
            let name = key.as_str().ok_or_else(|| {
                ZoneGenError::Config(format!("zone name must be a string, got {key:?}"))
            })?;
            zones.push(Zone {
                name: name.to_string(),
                center: Coordinate::new(
                    number_field(name, value, "latitude")?,
                    number_field(name, value, "longitude")?,
                ),
                radius_km: number_field(name, value, "max_distance")?,
            });
        }
        Ok(zones)
    }
}

fn number_field(zone: &str, value: &serde_yaml_ng::Value, field: &str) -> Result<f64> {
    value
        .get(field)
        .and_then(serde_yaml_ng::Value::as_f64)
        .ok_or_else(|| {
            ZoneGenError::Config(format!("zone '{zone}': missing or non-numeric '{field}'"))
        })
}
