use super::types::CarInfo;
use std::fmt;

/// What the card shows, derived fresh from the store on every render
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeView {
    pub car: CarInfo,

    /// Displayed SOC; `None` means indeterminate
    pub soc: Option<u8>,

    pub status: ViewStatus,

    pub timestamp: Option<ViewTimestamp>,
}

/// Subtitle state of the card
#[derive(Debug, Clone, PartialEq)]
pub enum ViewStatus {
    /// A session is active
    Charging { start_soc: u8, kwh_added: f64 },
    /// No session, but a last known SOC exists
    LastKnown,
    /// No session and nothing known
    NoData,
}

/// Time shown under the subtitle while charging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTimestamp {
    Updated(i64),
    Started(i64),
}

impl ChargeView {
    pub const fn is_active(&self) -> bool {
        matches!(self.status, ViewStatus::Charging { .. })
    }

    /// `"45%"`, or `"--%"` when indeterminate
    pub fn soc_label(&self) -> String {
        self.soc
            .map_or_else(|| "--%".to_string(), |soc| format!("{soc}%"))
    }

    /// Fill of the gauge bar in percent
    pub fn gauge_percent(&self) -> u8 {
        self.soc.unwrap_or(0)
    }

    pub fn subtitle(&self) -> String {
        self.status.to_string()
    }
}

impl fmt::Display for ViewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Charging {
                start_soc,
                kwh_added,
            } => write!(f, "Start {start_soc}% · +{kwh_added} kWh"),
            Self::LastKnown => f.write_str("Last known SOC"),
            Self::NoData => f.write_str("Tap actions below"),
        }
    }
}

impl ViewTimestamp {
    /// Epoch millis
    pub const fn millis(self) -> i64 {
        match self {
            Self::Updated(ts) | Self::Started(ts) => ts,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Updated(_) => "Updated",
            Self::Started(_) => "Started",
        }
    }
}
