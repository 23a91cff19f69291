//! Delimited-text serialization of the channel and zone tables.
//!
//! The CPS imports `;`-delimited CSV with a fixed column layout; column
//! order and the zone-row padding width must survive exactly as assembled.

use std::io::Write;

use crate::assemble::{NumberedChannel, ZoneRow};
use crate::error::Result;
use crate::zone::ZONE_CAPACITY;

/// Channel-table column layout expected by the CPS import.
pub const CHANNEL_COLUMNS: [&str; 28] = [
    "Channel Number",
    "Channel Name",
    "Channel Type",
    "Rx Frequency",
    "Tx Frequency",
    "Bandwidth (kHz)",
    "Colour Code",
    "Timeslot",
    "Contact",
    "TG List",
    "DMR ID",
    "TS1_TA_Tx",
    "TS2_TA_Tx ID",
    "RX Tone",
    "TX Tone",
    "Squelch",
    "Power",
    "Rx Only",
    "Zone Skip",
    "All Skip",
    "TOT",
    "VOX",
    "No Beep",
    "No Eco",
    "APRS",
    "Latitude",
    "Longitude",
    "Use location",
];

pub fn write_channels<W: Write>(writer: W, channels: &[NumberedChannel]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
    csv.write_record(CHANNEL_COLUMNS)?;
    for entry in channels {
        csv.write_record(channel_record(entry))?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_zones<W: Write>(writer: W, rows: &[ZoneRow]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);

    let mut header = Vec::with_capacity(ZONE_CAPACITY + 1);
    header.push("Zone Name".to_string());
    header.extend((1..=ZONE_CAPACITY).map(|i| format!("Channel{i}")));
    csv.write_record(&header)?;

    for row in rows {
        let mut record = Vec::with_capacity(ZONE_CAPACITY + 1);
        record.push(row.name.clone());
        record.extend(row.channels.iter().cloned());
        csv.write_record(&record)?;
    }
    csv.flush()?;
    Ok(())
}

fn channel_record(entry: &NumberedChannel) -> Vec<String> {
    let c = &entry.channel;
    let fm = c.fm.as_ref();
    let dmr = c.dmr.as_ref();

    vec![
        entry.number.to_string(),
        c.name.clone(),
        c.ty.label().to_string(),
        c.rx_frequency.clone(),
        c.tx_frequency.clone(),
        c.bandwidth_khz.clone().unwrap_or_default(),
        dmr.map(|d| d.colour_code.clone()).unwrap_or_default(),
        dmr.map(|d| d.timeslot.clone()).unwrap_or_default(),
        dmr.map(|d| d.contact.clone()).unwrap_or_default(),
        dmr.map(|d| d.tg_list.clone()).unwrap_or_default(),
        dmr.map(|d| d.dmr_id.clone()).unwrap_or_default(),
        dmr.map(|d| d.ts1_ta_tx.clone()).unwrap_or_default(),
        dmr.map(|d| d.ts2_ta_tx_id.clone()).unwrap_or_default(),
        fm.map(|f| f.rx_tone.clone()).unwrap_or_default(),
        fm.map(|f| f.tx_tone.clone()).unwrap_or_default(),
        fm.map(|f| f.squelch.clone()).unwrap_or_default(),
        "Master".to_string(),
        "No".to_string(),
        "No".to_string(),
        "No".to_string(),
        "495".to_string(),
        "Off".to_string(),
        "No".to_string(),
        "No".to_string(),
        "None".to_string(),
        c.latitude.clone(),
        c.longitude.clone(),
        "Yes".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble;
    use crate::channel::ChannelProjector;
    use crate::config::DecimalStyle;
    use crate::repeater::RawRepeater;
    use crate::zone::ZoneBucket;

    fn numbered() -> Vec<NumberedChannel> {
        let projector = ChannelProjector::new(DecimalStyle::Comma, "BM");
        let rep = RawRepeater {
            callsign: "DB0FT".to_string(),
            nearest_city: "Schmitten".to_string(),
            output_freq: "438.775".to_string(),
            input_freq: "431.175".to_string(),
            pl_tone: "CSQ".to_string(),
            fm_analog: "Yes".to_string(),
            fm_bandwidth: Some("12.5 kHz".to_string()),
            dmr: "Yes".to_string(),
            dmr_color_code: Some("1".to_string()),
            operational_status: "On-air".to_string(),
            latitude: "50.2323".to_string(),
            longitude: "8.4568".to_string(),
            ..Default::default()
        };
        let (channels, _) = assemble(projector.project(&rep), &[]);
        channels
    }

    #[test]
    fn test_channel_rows_match_header_width() {
        for entry in &numbered() {
            assert_eq!(channel_record(entry).len(), CHANNEL_COLUMNS.len());
        }
    }

    #[test]
    fn test_mode_specific_columns() {
        let channels = numbered();
        let analog = channel_record(&channels[0]);
        let digital = channel_record(&channels[1]);

        // Colour Code is column 6, Squelch column 15.
        assert_eq!(analog[6], "");
        assert_eq!(analog[15], "Disabled");
        assert_eq!(digital[6], "1");
        assert_eq!(digital[15], "");
        // Both carry the localized common fields.
        assert_eq!(analog[3], "438,775");
        assert_eq!(digital[3], "438,775");
    }

    #[test]
    fn test_channels_csv_shape() {
        let mut buf = Vec::new();
        write_channels(&mut buf, &numbered()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("Channel Number;Channel Name;Channel Type"));
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn test_zones_csv_shape() {
        let buckets = [ZoneBucket {
            key: "Home".to_string(),
            entries: vec![("#DB0FT Schmitte".to_string(), 6.5)],
        }];
        let (_, rows) = assemble(Vec::new(), &buckets);

        let mut buf = Vec::new();
        write_zones(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        let header = lines.next().unwrap();
        assert_eq!(header.split(';').count(), ZONE_CAPACITY + 1);
        assert!(header.starts_with("Zone Name;Channel1;Channel2"));

        let row = lines.next().unwrap();
        assert_eq!(row.split(';').count(), ZONE_CAPACITY + 1);
        assert!(row.starts_with("Home;#DB0FT Schmitte;"));
    }
}
