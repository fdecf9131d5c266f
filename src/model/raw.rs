//! Typed raw shapes of the Wialon unit record
//!
//! The vendor delivers a compact, flag-gated JSON schema (`nm`, `pos`,
//! `cfl`, ...) whose sub-objects appear or disappear depending on the
//! request bitmask, and a few of which change shape between firmware
//! generations. Each sub-object gets one explicit struct here with named
//! optional fields, so the normalizer consumes typed inputs instead of
//! repeating ad-hoc key lookups.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One unit record as returned by `core/search_items` / `core/search_item`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUnit {
    /// Unit id
    pub id: u64,

    /// Unit name
    #[serde(rename = "nm", default)]
    pub name: Option<String>,

    /// Last position
    #[serde(default)]
    pub pos: Option<RawPosition>,

    /// Counters; legacy devices report a bare scalar here
    #[serde(default)]
    pub cfl: Option<RawCounters>,

    /// Custom fields keyed by field index
    #[serde(default, deserialize_with = "lenient_map")]
    pub flds: HashMap<String, RawCustomField>,

    /// Configured sensors keyed by sensor id
    #[serde(default, deserialize_with = "lenient_map")]
    pub sens: HashMap<String, RawSensor>,

    /// Message parameters keyed by parameter name
    #[serde(default, deserialize_with = "lenient_map")]
    pub prms: HashMap<String, RawParameter>,

    /// Last message
    #[serde(default)]
    pub lmsg: Option<RawLastMessage>,

    /// Activation status: 0 inactive, 1 active
    #[serde(default)]
    pub act: Option<i64>,

    /// Hardware (tracker) type
    #[serde(default, deserialize_with = "lenient_string")]
    pub hw: String,

    /// Device phone number
    #[serde(default, deserialize_with = "lenient_string")]
    pub ph: String,

    /// Secondary device phone number
    #[serde(default, deserialize_with = "lenient_string")]
    pub ph2: String,

    /// Device unique identifier
    #[serde(default, deserialize_with = "lenient_string")]
    pub uid: String,

    /// Secondary device unique identifier
    #[serde(default, deserialize_with = "lenient_string")]
    pub uid2: String,

    /// Icon resource path
    #[serde(default, deserialize_with = "lenient_string")]
    pub uri: String,
}

impl RawUnit {
    /// Decode one search result item
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Unit name with the vendor's placeholder for unnamed units
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => "Unknown".to_string(),
        }
    }
}

/// `pos` sub-object: last known fix
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPosition {
    /// Fix timestamp (epoch seconds); 0 means no fix recorded
    #[serde(default)]
    pub t: i64,
    /// Latitude
    #[serde(default)]
    pub y: Option<f64>,
    /// Longitude
    #[serde(default)]
    pub x: Option<f64>,
    /// Speed
    #[serde(default)]
    pub s: f64,
    /// Course
    #[serde(default)]
    pub c: f64,
    /// Altitude
    #[serde(default)]
    pub z: f64,
    /// Satellite count
    #[serde(default)]
    pub sc: u32,
}

/// `cfl` sub-object: mileage / engine-hour counters.
///
/// Older firmware reports a bare scalar instead of the counter table; the
/// scalar form carries no breakdown, so both counters read as zero.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCounters {
    Detailed {
        /// Mileage counter
        #[serde(default)]
        cnm: f64,
        /// Engine hours counter
        #[serde(default)]
        cneh: f64,
    },
    Legacy(Value),
}

impl RawCounters {
    /// (mileage, engine_hours) with the legacy-scalar shim applied
    pub fn values(&self) -> (f64, f64) {
        match self {
            RawCounters::Detailed { cnm, cneh } => (*cnm, *cneh),
            RawCounters::Legacy(_) => (0.0, 0.0),
        }
    }
}

/// One `flds` entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCustomField {
    /// Field name
    #[serde(default)]
    pub n: String,
    /// Field value
    #[serde(default, deserialize_with = "lenient_string")]
    pub v: String,
}

/// One `sens` entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSensor {
    /// Sensor id
    #[serde(default)]
    pub id: Option<i64>,
    /// Sensor name
    #[serde(default)]
    pub n: String,
    /// Sensor type tag
    #[serde(default)]
    pub t: String,
    /// Telemetry parameter the sensor reads
    #[serde(default)]
    pub p: String,
    /// Description
    #[serde(default)]
    pub d: String,
    /// Display unit (metric)
    #[serde(default)]
    pub m: String,
    /// JSON-encoded configuration string
    #[serde(default)]
    pub c: Option<String>,
    /// Validation type
    #[serde(default)]
    pub vt: i64,
    /// Validator sensor id (same unit)
    #[serde(default)]
    pub vs: i64,
    /// Calibration table
    #[serde(default)]
    pub tbl: Vec<RawCalibrationPoint>,
    /// Creation timestamp (epoch seconds)
    #[serde(default)]
    pub ct: i64,
    /// Modification timestamp (epoch seconds)
    #[serde(default)]
    pub mt: i64,
}

/// One calibration table row
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RawCalibrationPoint {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub a: f64,
    #[serde(default)]
    pub b: f64,
}

/// One `prms` entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawParameter {
    /// Current value
    #[serde(default)]
    pub v: Value,
    /// Change timestamp (epoch seconds)
    #[serde(default)]
    pub ct: Option<i64>,
    /// Availability timestamp (epoch seconds)
    #[serde(default)]
    pub at: Option<i64>,
}

/// `lmsg` sub-object: last message received from the device
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLastMessage {
    /// Message timestamp (epoch seconds)
    #[serde(default)]
    pub t: i64,
    /// Raw telemetry parameters
    #[serde(default, deserialize_with = "lenient_map")]
    pub p: HashMap<String, Value>,
}

impl RawLastMessage {
    /// Numeric telemetry parameter, 0.0 when absent or non-numeric
    pub fn numeric_param(&self, name: &str) -> f64 {
        self.p.get(name).and_then(Value::as_f64).unwrap_or(0.0)
    }
}

/// `core/search_items` response payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItemsPayload {
    #[serde(default)]
    pub items: Vec<Value>,
}

/// `core/search_item` response payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItemPayload {
    #[serde(default)]
    pub item: Option<Value>,
}

/// Deserialize a map field, substituting an empty map when the vendor sends
/// a degenerate shape (array, scalar, null) and skipping entries that do not
/// decode. Mirrors the defensive per-entry handling of the upstream schema.
fn lenient_map<'de, D, T>(deserializer: D) -> Result<HashMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let mut out = HashMap::new();
    if let Value::Object(map) = value {
        for (key, entry) in map {
            match serde_json::from_value::<T>(entry) {
                Ok(parsed) => {
                    out.insert(key, parsed);
                }
                Err(_) => continue,
            }
        }
    }
    Ok(out)
}

/// Deserialize a string-ish field, coercing numbers and substituting an
/// empty string for anything else. The vendor mixes string and numeric
/// encodings for identifiers across hardware generations.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counters_table_form_yields_both_values() {
        let unit = RawUnit::from_value(json!({
            "id": 1, "cfl": {"cnm": 1234.5, "cneh": 67.8}
        }))
        .unwrap();
        assert_eq!(unit.cfl.unwrap().values(), (1234.5, 67.8));
    }

    #[test]
    fn counters_legacy_scalar_yields_zeroes() {
        let unit = RawUnit::from_value(json!({"id": 1, "cfl": 257})).unwrap();
        assert_eq!(unit.cfl.unwrap().values(), (0.0, 0.0));
    }

    #[test]
    fn degenerate_field_map_becomes_empty() {
        // some accounts deliver flds as an array when no fields are set
        let unit = RawUnit::from_value(json!({"id": 1, "flds": []})).unwrap();
        assert!(unit.flds.is_empty());
    }

    #[test]
    fn numeric_uid_is_coerced_to_string() {
        let unit = RawUnit::from_value(json!({"id": 1, "uid": 357093061111i64, "hw": 112}))
            .unwrap();
        assert_eq!(unit.uid, "357093061111");
        assert_eq!(unit.hw, "112");
    }

    #[test]
    fn missing_name_uses_placeholder() {
        let unit = RawUnit::from_value(json!({"id": 1})).unwrap();
        assert_eq!(unit.display_name(), "Unknown");
    }
}
