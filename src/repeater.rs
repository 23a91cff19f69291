//! Raw repeater records as served by the RepeaterBook export API.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::geo::Coordinate;

/// One repeater row from the export payload.
///
/// RF fields are kept as the upstream strings; nothing here parses
/// frequencies or tones, so a corrupt numeric field flows through to the
/// output tables instead of failing the batch. Only the coordinates are
/// parsed, and only when a zone-membership decision needs them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRepeater {
    #[serde(rename = "Callsign")]
    pub callsign: String,

    #[serde(rename = "Nearest City")]
    pub nearest_city: String,

    /// Repeater transmit frequency in MHz; becomes the channel RX side.
    #[serde(rename = "Frequency")]
    pub output_freq: String,

    /// Repeater receive frequency in MHz; becomes the channel TX side.
    #[serde(rename = "Input Freq")]
    pub input_freq: String,

    #[serde(rename = "Lat", deserialize_with = "de_lenient_string")]
    pub latitude: String,

    #[serde(rename = "Long", deserialize_with = "de_lenient_string")]
    pub longitude: String,

    /// Uplink CTCSS tone, or "CSQ" for carrier squelch.
    #[serde(rename = "PL")]
    pub pl_tone: String,

    /// Downlink CTCSS tone; empty when the repeater transmits without one.
    #[serde(rename = "TSQ")]
    pub tsq: String,

    #[serde(rename = "FM Analog")]
    pub fm_analog: String,

    /// E.g. "12.5 kHz"; null for digital-only machines.
    #[serde(rename = "FM Bandwidth", deserialize_with = "de_lenient_opt")]
    pub fm_bandwidth: Option<String>,

    #[serde(rename = "DMR")]
    pub dmr: String,

    #[serde(rename = "DMR Color Code", deserialize_with = "de_lenient_opt")]
    pub dmr_color_code: Option<String>,

    #[serde(rename = "Operational Status")]
    pub operational_status: String,

    #[serde(rename = "Use")]
    pub use_class: String,

    /// Everything else the export carries (nodes, coverage notes, other
    /// digital modes); kept for snapshot fidelity, otherwise unused.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl RawRepeater {
    pub fn has_analog(&self) -> bool {
        self.fm_analog == "Yes"
    }

    pub fn has_dmr(&self) -> bool {
        self.dmr == "Yes"
    }

    /// Source-side eligibility filter: on-air and at least one mode we can
    /// build a channel for. Projection re-checks the capability flags, so a
    /// stray ineligible record downstream costs nothing.
    pub fn is_eligible(&self) -> bool {
        self.operational_status == "On-air" && (self.has_analog() || self.has_dmr())
    }

    /// Parsed position, or `None` when either ordinate is malformed.
    pub fn coordinate(&self) -> Option<Coordinate> {
        let latitude = self.latitude.trim().parse().ok()?;
        let longitude = self.longitude.trim().parse().ok()?;
        Some(Coordinate::new(latitude, longitude))
    }
}

fn de_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(de_lenient_opt(deserializer)?.unwrap_or_default())
}

/// The ROW export serves these fields as strings while the North America
/// export serves bare numbers for some of them; accept both.
fn de_lenient_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
