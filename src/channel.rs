//! Channel projection: one repeater record into typed OpenGD77 channel drafts.
//!
//! A repeater that is both FM and DMR capable expands into exactly two
//! channels, one per mode. Mode-specific parameters live in their own structs
//! (`FmParams`, `DmrParams`) so an analogue channel can never carry a colour
//! code and a digital one can never carry a CTCSS tone.

use crate::config::DecimalStyle;
use crate::repeater::RawRepeater;

/// Maximum channel name length the CPS accepts.
pub const CHANNEL_NAME_LEN: usize = 15;

/// Input frequencies above this are 70cm; their names get a `#` marker so
/// the band is visible in the channel list.
const BAND_MARKER_THRESHOLD_MHZ: f64 = 146.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelType {
    Analogue,
    Digital,
}

impl ChannelType {
    pub fn label(self) -> &'static str {
        match self {
            ChannelType::Analogue => "Analogue",
            ChannelType::Digital => "Digital",
        }
    }
}

/// Analogue (FM) channel parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FmParams {
    pub rx_tone: String,
    pub tx_tone: String,
    pub squelch: String,
}

/// Digital (DMR) channel parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DmrParams {
    pub colour_code: String,
    pub timeslot: String,
    pub contact: String,
    pub tg_list: String,
    pub dmr_id: String,
    pub ts1_ta_tx: String,
    pub ts2_ta_tx_id: String,
}

/// One usable radio configuration derived from a repeater for one mode.
///
/// Exactly one of `fm`/`dmr` is populated, matching `ty`.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub name: String,
    pub ty: ChannelType,
    pub rx_frequency: String,
    pub tx_frequency: String,
    pub bandwidth_khz: Option<String>,
    pub latitude: String,
    pub longitude: String,
    pub fm: Option<FmParams>,
    pub dmr: Option<DmrParams>,
    /// Distance to the zone center that admitted this channel. Sort key
    /// only; never written to the output tables.
    pub distance_km: f64,
}

/// Maps raw repeater records to channel drafts, applying the configured
/// decimal style and talk-group list.
pub struct ChannelProjector {
    decimal: DecimalStyle,
    tg_list: String,
}

impl ChannelProjector {
    pub fn new(decimal: DecimalStyle, tg_list: impl Into<String>) -> Self {
        Self {
            decimal,
            tg_list: tg_list.into(),
        }
    }

    /// Expand one repeater into drafts, one per capability flag.
    ///
    /// Pure transform: missing upstream fields become empty strings, and a
    /// malformed numeric string passes through to the output unchanged.
    pub fn project(&self, rep: &RawRepeater) -> Vec<Channel> {
        let mut drafts = Vec::with_capacity(2);
        if rep.has_analog() {
            drafts.push(self.draft(rep, ChannelType::Analogue));
        }
        if rep.has_dmr() {
            drafts.push(self.draft(rep, ChannelType::Digital));
        }
        drafts
    }

    fn draft(&self, rep: &RawRepeater, ty: ChannelType) -> Channel {
        let (fm, dmr) = match ty {
            ChannelType::Analogue => (Some(self.fm_params(rep)), None),
            ChannelType::Digital => (None, Some(self.dmr_params(rep))),
        };

        Channel {
            name: display_name(rep, ty),
            ty,
            rx_frequency: self.localize(&rep.output_freq),
            tx_frequency: self.localize(&rep.input_freq),
            bandwidth_khz: rep
                .fm_bandwidth
                .as_deref()
                .map(|b| self.localize(b.trim_end_matches(" kHz"))),
            latitude: self.localize(&rep.latitude),
            longitude: self.localize(&rep.longitude),
            fm,
            dmr,
            distance_km: 0.0,
        }
    }

    fn fm_params(&self, rep: &RawRepeater) -> FmParams {
        FmParams {
            // PL is what the repeater listens for, so it is our TX tone;
            // TSQ is what it transmits, our RX tone.
            tx_tone: if rep.pl_tone == "CSQ" {
                "None".to_string()
            } else {
                self.localize(&rep.pl_tone)
            },
            rx_tone: if rep.tsq.is_empty() {
                "None".to_string()
            } else {
                self.localize(&rep.tsq)
            },
            squelch: "Disabled".to_string(),
        }
    }

    fn dmr_params(&self, rep: &RawRepeater) -> DmrParams {
        DmrParams {
            colour_code: rep.dmr_color_code.clone().unwrap_or_default(),
            timeslot: "1".to_string(),
            contact: "None".to_string(),
            tg_list: self.tg_list.clone(),
            // Leave the radio's global ID in charge unless the operator
            // maintains per-channel IDs by hand.
            dmr_id: "None".to_string(),
            ts1_ta_tx: "Text".to_string(),
            ts2_ta_tx_id: "Text".to_string(),
        }
    }

    fn localize(&self, value: &str) -> String {
        match self.decimal {
            DecimalStyle::Point => value.to_string(),
            DecimalStyle::Comma => value.replace('.', ","),
        }
    }
}

/// Band marker + callsign + nearest city, truncated to the CPS limit.
/// Digital variants replace spaces with dots so the mode is visible even
/// when two channels share a truncated name.
fn display_name(rep: &RawRepeater, ty: ChannelType) -> String {
    let marker = if rep
        .input_freq
        .parse::<f64>()
        .map(|f| f > BAND_MARKER_THRESHOLD_MHZ)
        .unwrap_or(false)
    {
        '#'
    } else {
        ' '
    };

    let name: String = format!("{}{} {}", marker, rep.callsign, rep.nearest_city)
        .chars()
        .take(CHANNEL_NAME_LEN)
        .collect();

    match ty {
        ChannelType::Analogue => name,
        ChannelType::Digital => name.replace(' ', "."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_repeater() -> RawRepeater {
        RawRepeater {
            callsign: "DB0FT".to_string(),
            nearest_city: "Grosser Feldberg".to_string(),
            output_freq: "438.775".to_string(),
            input_freq: "431.175".to_string(),
            latitude: "50.2323".to_string(),
            longitude: "8.4568".to_string(),
            pl_tone: "CSQ".to_string(),
            tsq: String::new(),
            fm_analog: "Yes".to_string(),
            fm_bandwidth: Some("12.5 kHz".to_string()),
            dmr: "Yes".to_string(),
            dmr_color_code: Some("1".to_string()),
            operational_status: "On-air".to_string(),
            use_class: "OPEN".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_dual_capability_yields_two_drafts() {
        let projector = ChannelProjector::new(DecimalStyle::Point, "BM");
        let drafts = projector.project(&sample_repeater());
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].ty, ChannelType::Analogue);
        assert_eq!(drafts[1].ty, ChannelType::Digital);
        assert!(drafts[0].fm.is_some() && drafts[0].dmr.is_none());
        assert!(drafts[1].dmr.is_some() && drafts[1].fm.is_none());
    }

    #[test]
    fn test_analog_only_yields_one_draft() {
        let mut rep = sample_repeater();
        rep.dmr = "No".to_string();
        let projector = ChannelProjector::new(DecimalStyle::Point, "BM");
        let drafts = projector.project(&rep);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].ty, ChannelType::Analogue);
    }

    #[test]
    fn test_name_marker_and_truncation() {
        let projector = ChannelProjector::new(DecimalStyle::Point, "BM");
        let drafts = projector.project(&sample_repeater());
        // 70cm input frequency gets the '#' marker; 15 chars total.
        assert_eq!(drafts[0].name, "#DB0FT Grosser ");
        assert_eq!(drafts[1].name, "#DB0FT.Grosser.");
    }

    #[test]
    fn test_2m_name_keeps_space_marker() {
        let mut rep = sample_repeater();
        rep.input_freq = "145.000".to_string();
        rep.dmr = "No".to_string();
        let projector = ChannelProjector::new(DecimalStyle::Point, "BM");
        let drafts = projector.project(&rep);
        assert_eq!(drafts[0].name, " DB0FT Grosser ");
    }

    #[test]
    fn test_tone_defaults() {
        let projector = ChannelProjector::new(DecimalStyle::Point, "BM");
        let drafts = projector.project(&sample_repeater());
        let fm = drafts[0].fm.as_ref().unwrap();
        // CSQ uplink and empty downlink both render as "None".
        assert_eq!(fm.tx_tone, "None");
        assert_eq!(fm.rx_tone, "None");
        assert_eq!(fm.squelch, "Disabled");
    }

    #[test]
    fn test_tones_localized() {
        let mut rep = sample_repeater();
        rep.pl_tone = "67.0".to_string();
        rep.tsq = "67.0".to_string();
        let projector = ChannelProjector::new(DecimalStyle::Comma, "BM");
        let drafts = projector.project(&rep);
        let fm = drafts[0].fm.as_ref().unwrap();
        assert_eq!(fm.tx_tone, "67,0");
        assert_eq!(fm.rx_tone, "67,0");
    }

    #[test]
    fn test_comma_locale_applies_to_frequencies_and_position() {
        let projector = ChannelProjector::new(DecimalStyle::Comma, "BM");
        let drafts = projector.project(&sample_repeater());
        assert_eq!(drafts[0].rx_frequency, "438,775");
        assert_eq!(drafts[0].tx_frequency, "431,175");
        assert_eq!(drafts[0].latitude, "50,2323");
        assert_eq!(drafts[0].longitude, "8,4568");
        assert_eq!(drafts[0].bandwidth_khz.as_deref(), Some("12,5"));
    }

    #[test]
    fn test_dmr_params() {
        let projector = ChannelProjector::new(DecimalStyle::Point, "Brandmeister");
        let drafts = projector.project(&sample_repeater());
        let dmr = drafts[1].dmr.as_ref().unwrap();
        assert_eq!(dmr.colour_code, "1");
        assert_eq!(dmr.timeslot, "1");
        assert_eq!(dmr.contact, "None");
        assert_eq!(dmr.tg_list, "Brandmeister");
        assert_eq!(dmr.dmr_id, "None");
    }

    #[test]
    fn test_missing_bandwidth_stays_none() {
        let mut rep = sample_repeater();
        rep.fm_bandwidth = None;
        let projector = ChannelProjector::new(DecimalStyle::Comma, "BM");
        let drafts = projector.project(&rep);
        assert!(drafts[0].bandwidth_khz.is_none());
    }

    #[test]
    fn test_malformed_frequency_passes_through() {
        let mut rep = sample_repeater();
        rep.input_freq = "43x.175".to_string();
        rep.dmr = "No".to_string();
        let projector = ChannelProjector::new(DecimalStyle::Point, "BM");
        let drafts = projector.project(&rep);
        // No parse failure; the corrupt value lands in the table as-is and
        // the band marker falls back to the 2m space.
        assert_eq!(drafts[0].tx_frequency, "43x.175");
        assert!(drafts[0].name.starts_with(' '));
    }
}
