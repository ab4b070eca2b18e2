use crate::config::VehicleDefaults;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Usable battery capacity used to turn added energy into percentage points
pub const BATTERY_CAPACITY_KWH: f64 = 80.0;

/// Starting SOC assumed when nothing better is known
pub const DEFAULT_START_SOC: u8 = 20;

/// Round and clamp a percentage into 0..=100; non-finite input is 0
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_percent(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// Estimated SOC after adding `kwh_added` to a battery that started at `start_soc`
pub fn soc_from_energy(start_soc: u8, kwh_added: f64) -> u8 {
    clamp_percent(f64::from(start_soc) + (kwh_added / BATTERY_CAPACITY_KWH) * 100.0)
}

/// The active charging session record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// SOC when the session started; fixed for the session's lifetime
    #[serde(rename = "startSOC", deserialize_with = "de_percent")]
    pub start_soc: u8,

    /// Latest user-entered total energy added (replaced, not accumulated)
    #[serde(rename = "kwhAdded", default, deserialize_with = "de_energy")]
    pub kwh_added: f64,

    /// Creation time (epoch millis)
    #[serde(rename = "tsStart", default)]
    pub ts_start: i64,

    /// Time of the last energy update (epoch millis)
    #[serde(
        rename = "tsUpdate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ts_update: Option<i64>,
}

impl SessionRecord {
    pub const fn new(start_soc: u8, ts_start: i64) -> Self {
        Self {
            start_soc,
            kwh_added: 0.0,
            ts_start,
            ts_update: None,
        }
    }

    /// Derived current SOC
    pub fn estimated_soc(&self) -> u8 {
        soc_from_energy(self.start_soc, self.kwh_added)
    }
}

fn de_percent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_percent(raw))
}

/// Any non-number, negative or non-finite energy reads as 0
fn de_energy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(raw
        .as_f64()
        .filter(|k| k.is_finite() && *k >= 0.0)
        .unwrap_or(0.0))
}

/// Vehicle shown on the card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarInfo {
    pub model: String,
    pub reg: String,
}

impl From<&VehicleDefaults> for CarInfo {
    fn from(defaults: &VehicleDefaults) -> Self {
        Self {
            model: defaults.model.clone(),
            reg: defaults.reg.clone(),
        }
    }
}

impl fmt::Display for CarInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} · {}", self.model, self.reg)
    }
}

/// Outcome of one completed session; never modified once written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(deserialize_with = "de_percent")]
    pub start: u8,
    #[serde(deserialize_with = "de_percent")]
    pub end: u8,
    #[serde(default, deserialize_with = "de_energy")]
    pub kwh: f64,
    #[serde(default)]
    pub ts: i64,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}% → {}% (kWh: {})", self.start, self.end, self.kwh)
    }
}

/// Car, last known SOC and completed-session history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub car: CarInfo,

    #[serde(rename = "lastSOC", skip_serializing_if = "Option::is_none")]
    pub last_soc: Option<u8>,

    /// Most recent first
    pub history: Vec<HistoryEntry>,
}

impl Metadata {
    /// Metadata with only the default car
    pub fn with_defaults(defaults: &VehicleDefaults) -> Self {
        Self {
            car: CarInfo::from(defaults),
            last_soc: None,
            history: Vec::new(),
        }
    }

    /// Decode a stored record field by field; whatever is missing or
    /// malformed takes its default without discarding the other fields
    pub fn from_value(value: Option<&Value>, defaults: &VehicleDefaults) -> Self {
        let mut meta = Self::with_defaults(defaults);
        let Some(value) = value else {
            return meta;
        };

        let car = value.get("car");
        if let Some(model) = non_empty_str(car.and_then(|c| c.get("model"))) {
            meta.car.model = model;
        }
        if let Some(reg) = non_empty_str(car.and_then(|c| c.get("reg"))) {
            meta.car.reg = reg;
        }

        meta.last_soc = value
            .get("lastSOC")
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
            .map(clamp_percent);

        if let Some(entries) = value.get("history").and_then(Value::as_array) {
            meta.history = entries
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect();
        }

        meta
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
