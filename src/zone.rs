//! Zone assignment: bucket repeaters into configured zones by distance.
//!
//! Each zone collects the repeaters inside its radius, expands them into
//! typed channels, orders them nearest-first and cuts the list at the
//! device's per-zone capacity. Zones are processed independently in
//! declaration order; the analogue bucket of a zone always precedes its
//! digital bucket in every output.

use crate::channel::{Channel, ChannelProjector, ChannelType};
use crate::geo;
use crate::repeater::RawRepeater;

/// Maximum channels the target device holds per zone; nearest-first entries
/// beyond this are dropped, never spilled into another zone.
pub const ZONE_CAPACITY: usize = 80;

/// A named geographic region used to bucket nearby repeaters.
#[derive(Debug, Clone)]
pub struct Zone {
    pub name: String,
    pub center: geo::Coordinate,
    pub radius_km: f64,
}

/// Ordered, capacity-capped channel-name list for one zone/type combination.
///
/// Names are not unique and are deliberately not deduplicated; the entry
/// order (ascending distance) is what keeps this list index-aligned with the
/// channel table.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneBucket {
    /// Plain zone name for analogue, `"<name> DMR"` for digital.
    pub key: String,
    /// (channel name, distance to zone center in km), nearest first.
    pub entries: Vec<(String, f64)>,
}

pub struct ZoneAssigner {
    projector: ChannelProjector,
}

impl ZoneAssigner {
    pub fn new(projector: ChannelProjector) -> Self {
        Self { projector }
    }

    /// Assign repeaters to zones.
    ///
    /// Returns the not-yet-numbered global channel sequence (zone declaration
    /// order, analogue before digital within each zone) and the per-zone
    /// buckets in the same order. A zone with no qualifying repeaters still
    /// contributes two empty buckets.
    pub fn assign(
        &self,
        zones: &[Zone],
        repeaters: &[RawRepeater],
    ) -> (Vec<Channel>, Vec<ZoneBucket>) {
        let mut sequence = Vec::new();
        let mut buckets = Vec::with_capacity(zones.len() * 2);

        for zone in zones {
            let (analog, digital) = self.assign_zone(zone, repeaters);
            log::debug!(
                "zone '{}': {} analogue, {} digital channels",
                zone.name,
                analog.len(),
                digital.len()
            );

            buckets.push(bucket_of(zone.name.clone(), &analog));
            buckets.push(bucket_of(format!("{} DMR", zone.name), &digital));
            sequence.extend(analog);
            sequence.extend(digital);
        }

        (sequence, buckets)
    }

    fn assign_zone(&self, zone: &Zone, repeaters: &[RawRepeater]) -> (Vec<Channel>, Vec<Channel>) {
        let mut analog = Vec::new();
        let mut digital = Vec::new();

        for rep in repeaters {
            let Some(position) = rep.coordinate() else {
                log::warn!(
                    "skipping {} ({}): unparseable coordinates",
                    rep.callsign,
                    rep.nearest_city
                );
                continue;
            };

            // Boundary repeaters are members: the comparison is inclusive.
            let dist = geo::distance_km(position, zone.center);
            if dist > zone.radius_km {
                continue;
            }

            for mut channel in self.projector.project(rep) {
                channel.distance_km = dist;
                match channel.ty {
                    ChannelType::Analogue => analog.push(channel),
                    ChannelType::Digital => digital.push(channel),
                }
            }
        }

        // Nearest first; the stable sort keeps fetch order on ties. Each
        // channel sorts on its own distance, digital included.
        analog.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        digital.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        analog.truncate(ZONE_CAPACITY);
        digital.truncate(ZONE_CAPACITY);

        (analog, digital)
    }
}

fn bucket_of(key: String, channels: &[Channel]) -> ZoneBucket {
    ZoneBucket {
        key,
        entries: channels
            .iter()
            .map(|c| (c.name.clone(), c.distance_km))
            .collect(),
    }
}
