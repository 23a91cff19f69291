//! Repeater record acquisition: live RepeaterBook queries and local
//! snapshots.
//!
//! The export API serves full country (or state) listings filtered by an
//! output-frequency prefix; one query per band is all a run ever needs.
//! Downloads are rate-limited upstream, so the `dump`/`load` modes persist a
//! raw snapshot for offline iteration on zone parameters.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{Config, SourceMode};
use crate::error::{Result, ZoneGenError};
use crate::repeater::RawRepeater;

/// ROW export endpoint (everywhere outside North America).
const ROW_EXPORT_URL: &str = "https://www.repeaterbook.com/api/exportROW.php";
/// North America export endpoint, queried per state.
const NA_EXPORT_URL: &str = "https://www.repeaterbook.com/api/export.php";

const USER_AGENT: &str = concat!("zonegen/", env!("CARGO_PKG_VERSION"));

/// Frequency bands queried for every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    TwoMeter,
    SeventyCentimeter,
}

impl Band {
    pub const ALL: [Band; 2] = [Band::TwoMeter, Band::SeventyCentimeter];

    /// Prefix match the export API applies to the output frequency.
    fn frequency_query(self) -> &'static str {
        match self {
            Band::TwoMeter => "14%",
            Band::SeventyCentimeter => "43%",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Band::TwoMeter => "2m",
            Band::SeventyCentimeter => "70cm",
        }
    }
}

/// Supplies the run's full record set, fetched or replayed.
pub trait RepeaterSource {
    fn repeaters(&mut self) -> Result<Vec<RawRepeater>>;
}

#[derive(Debug, Deserialize)]
struct ExportPayload {
    #[serde(default)]
    results: Vec<RawRepeater>,
}

/// Live queries against the RepeaterBook export API.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    country: String,
    states: Option<Vec<String>>,
}

impl HttpSource {
    pub fn new(country: &str, states: Option<Vec<String>>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            country: country.to_string(),
            states,
        })
    }

    fn fetch(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<RawRepeater>> {
        let response = self.client.get(url).query(query).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ZoneGenError::Source(format!(
                "{url} returned {status}; RepeaterBook rate-limits exports, retry later or rerun with mode 'load'",
            )));
        }

        let payload: ExportPayload = response
            .json()
            .map_err(|e| ZoneGenError::Source(format!("unparseable export payload: {e}")))?;

        let total = payload.results.len();
        let eligible: Vec<RawRepeater> = payload
            .results
            .into_iter()
            .filter(RawRepeater::is_eligible)
            .collect();
        log::info!("{} of {} records eligible", eligible.len(), total);
        Ok(eligible)
    }
}

impl RepeaterSource for HttpSource {
    fn repeaters(&mut self) -> Result<Vec<RawRepeater>> {
        let mut all = Vec::new();
        for band in Band::ALL {
            if let Some(states) = &self.states {
                for state in states {
                    log::info!("querying {} repeaters for {}", band.label(), state);
                    all.extend(self.fetch(
                        NA_EXPORT_URL,
                        &[("state", state.as_str()), ("frequency", band.frequency_query())],
                    )?);
                }
            } else {
                log::info!("querying {} repeaters for {}", band.label(), self.country);
                all.extend(self.fetch(
                    ROW_EXPORT_URL,
                    &[
                        ("country", self.country.as_str()),
                        ("frequency", band.frequency_query()),
                    ],
                )?);
            }
        }
        Ok(all)
    }
}

/// Raw fetch result persisted between runs.
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub fetched_at: DateTime<Utc>,
    pub repeaters: Vec<RawRepeater>,
}

impl Snapshot {
    pub fn store<P: AsRef<Path>>(path: P, repeaters: &[RawRepeater]) -> Result<()> {
        let path = path.as_ref();
        let snapshot = Snapshot {
            fetched_at: Utc::now(),
            repeaters: repeaters.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| ZoneGenError::Snapshot(format!("cannot serialize snapshot: {e}")))?;
        fs::write(path, json)?;
        log::info!(
            "stored {} records to {}",
            snapshot.repeaters.len(),
            path.display()
        );
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Snapshot> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            ZoneGenError::Snapshot(format!(
                "cannot read {}: {} (run with mode 'dump' first)",
                path.display(),
                e
            ))
        })?;
        let snapshot: Snapshot = serde_json::from_slice(&bytes).map_err(|e| {
            ZoneGenError::Snapshot(format!("corrupt snapshot {}: {}", path.display(), e))
        })?;
        log::info!(
            "loaded {} records fetched {}",
            snapshot.repeaters.len(),
            snapshot.fetched_at.format("%Y-%m-%d %H:%M UTC")
        );
        Ok(snapshot)
    }
}

/// Replays a stored snapshot instead of querying the network.
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl RepeaterSource for SnapshotSource {
    fn repeaters(&mut self) -> Result<Vec<RawRepeater>> {
        Ok(Snapshot::load(&self.path)?.repeaters)
    }
}

/// Acquire the run's record set per the configured mode.
pub fn acquire(config: &Config, snapshot_path: &Path) -> Result<Vec<RawRepeater>> {
    match config.mode {
        SourceMode::Load => SnapshotSource::new(snapshot_path).repeaters(),
        SourceMode::Fetch | SourceMode::Dump => {
            let mut source = HttpSource::new(&config.country, config.states.clone())?;
            let repeaters = source.repeaters()?;
            if config.mode == SourceMode::Dump {
                Snapshot::store(snapshot_path, &repeaters)?;
            }
            Ok(repeaters)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_payload_filtering() {
        let payload: ExportPayload = serde_json::from_str(
            r#"{"count": 3, "results": [
                {"Callsign": "DB0FT", "Operational Status": "On-air", "FM Analog": "Yes", "DMR": "No"},
                {"Callsign": "DB0OFF", "Operational Status": "Off-air", "FM Analog": "Yes", "DMR": "No"},
                {"Callsign": "DB0NONE", "Operational Status": "On-air", "FM Analog": "No", "DMR": "No"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(payload.results.len(), 3);

        let eligible: Vec<RawRepeater> = payload
            .results
            .into_iter()
            .filter(RawRepeater::is_eligible)
            .collect();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].callsign, "DB0FT");
    }

    #[test]
    fn test_empty_payload() {
        let payload: ExportPayload = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(payload.results.is_empty());
    }

    #[test]
    fn test_snapshot_serde_round_trip() {
        let snapshot = Snapshot {
            fetched_at: Utc::now(),
            repeaters: vec![RawRepeater {
                callsign: "DB0FT".to_string(),
                ..Default::default()
            }],
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.repeaters.len(), 1);
        assert_eq!(back.repeaters[0].callsign, "DB0FT");
        assert_eq!(back.fetched_at, snapshot.fetched_at);
    }

    #[test]
    fn test_band_queries() {
        assert_eq!(Band::TwoMeter.frequency_query(), "14%");
        assert_eq!(Band::SeventyCentimeter.frequency_query(), "43%");
    }
}
