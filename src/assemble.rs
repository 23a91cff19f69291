//! Final table assembly: global channel numbering and padded zone rows.

use crate::channel::Channel;
use crate::zone::{ZONE_CAPACITY, ZoneBucket};

/// A channel with its final 1-based position in the master list.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberedChannel {
    pub number: usize,
    pub channel: Channel,
}

/// One zone-table row: zone key plus exactly `ZONE_CAPACITY` name columns,
/// empty-padded so every row has the same width.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRow {
    pub name: String,
    pub channels: Vec<String>,
}

/// Number the master channel sequence and build the padded zone table.
///
/// Order is preserved exactly as the assigner produced it: zone declaration
/// order, analogue before digital within a zone. Numbers are contiguous
/// 1..=N.
pub fn assemble(
    channels: Vec<Channel>,
    buckets: &[ZoneBucket],
) -> (Vec<NumberedChannel>, Vec<ZoneRow>) {
    let numbered = channels
        .into_iter()
        .enumerate()
        .map(|(i, channel)| NumberedChannel {
            number: i + 1,
            channel,
        })
        .collect();

    let rows = buckets
        .iter()
        .map(|bucket| {
            let mut names: Vec<String> = bucket
                .entries
                .iter()
                .map(|(name, _)| name.clone())
                .collect();
            names.resize(ZONE_CAPACITY, String::new());
            ZoneRow {
                name: bucket.key.clone(),
                channels: names,
            }
        })
        .collect();

    (numbered, rows)
}
