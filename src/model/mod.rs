//! Normalized domain models served by the gateway
//!
//! All entities here are value objects: rebuilt from scratch on every
//! request, never cached or mutated after construction.

pub mod raw;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// One tracked vehicle as returned by the unit list operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSummary {
    /// Unit id
    pub id: u64,
    /// Unit name
    pub name: String,
    /// Last known latitude
    pub latitude: Option<f64>,
    /// Last known longitude
    pub longitude: Option<f64>,
    /// Speed in km/h
    pub speed: f64,
    /// Course in degrees
    pub course: f64,
    /// Altitude in meters
    pub altitude: f64,
    /// Satellite count of the last fix
    pub satellites: u32,
    /// Last fix timestamp (ISO-8601 UTC), absent when the unit never reported
    pub last_time: Option<String>,
    /// Derived online flag (fix younger than the online threshold)
    pub is_online: bool,
    /// Mileage counter
    pub mileage: f64,
    /// Engine hours counter
    pub engine_hours: f64,
    /// Flattened custom fields (name -> value)
    pub custom_fields: HashMap<String, String>,
    /// Classified vehicle type label
    pub unit_type: String,
    /// Tracker hardware family label
    pub tracker_type: String,
    /// Navigation system reported via message parameters
    pub navigation_system: String,
    /// Inputs expander status (reserved, always 0)
    pub inputs_expander_status: i64,
    /// Activation flag (act == 1)
    pub is_activated: bool,
}

/// Unit summary plus device identity, sensors and parameter readings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDetail {
    #[serde(flatten)]
    pub summary: UnitSummary,
    /// Hardware type label
    pub device_type: String,
    /// Device phone number
    pub phone: String,
    /// Secondary device phone number
    pub phone2: String,
    /// Device unique identifier
    pub uid: String,
    /// Secondary device unique identifier
    pub uid2: String,
    /// Configured sensors, ordered by name
    pub sensors: Vec<SensorInfo>,
    /// Last reported parameters, ordered by name
    pub parameters: Vec<ParameterReading>,
    /// Icon resource path
    pub icon: String,
}

/// A configured measurement channel on a unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorInfo {
    /// Sensor id
    pub id: Option<i64>,
    /// Sensor name
    pub name: String,
    /// Sensor type tag
    #[serde(rename = "type")]
    pub sensor_type: String,
    /// Telemetry parameter the sensor reads
    pub param: String,
    /// Free-text description
    pub description: String,
    /// Display unit (metric)
    pub unit: String,
}

/// A named telemetry value last reported by a unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterReading {
    /// Parameter name
    pub name: String,
    /// Current value (any scalar)
    pub value: Value,
    /// Last update rendered as "DD.MM.YYYY, HH:MM:SS" UTC
    pub last_update: Option<String>,
}

/// One point of a sensor calibration table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub x: f64,
    pub a: f64,
    pub b: f64,
}

/// An engine/ignition sensor with its calibration and validator linkage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnitionSensorRecord {
    /// Owning unit id
    pub unit_id: u64,
    /// Owning unit name
    pub unit_name: String,
    /// Sensor id
    pub sensor_id: i64,
    /// Sensor name
    pub name: String,
    /// Sensor type tag
    #[serde(rename = "type")]
    pub sensor_type: String,
    /// Free-text description
    pub description: String,
    /// Telemetry parameter the sensor reads
    pub parameter: String,
    /// Display unit (metric)
    pub metric: String,
    /// Calibration table
    pub calibration_table: Vec<CalibrationPoint>,
    /// Validation type tag
    pub validator_type: i64,
    /// Id of the sibling sensor used to validate readings
    pub validator_sensor_id: i64,
    /// Resolved name of the validator sensor (same unit only)
    pub validator_sensor_name: String,
    /// Raw sensor configuration (empty object when unparsable)
    pub config: Value,
    /// Creation timestamp (epoch seconds)
    pub created: i64,
    /// Modification timestamp (epoch seconds)
    pub modified: i64,
}

/// Ignition sensor scan result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnitionReport {
    pub total: usize,
    pub sensors: Vec<IgnitionSensorRecord>,
}

/// Raw vendor record for one unit, untouched by normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUnitRecord {
    /// Requested unit id
    pub unit_id: u64,
    /// Flag bitmask the record was fetched with
    pub flags_used: u64,
    /// Same bitmask in hex notation
    pub flags_hex: String,
    /// The vendor record as delivered
    pub raw_data: Value,
}

/// One documented data flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagDescriptor {
    pub value: u64,
    pub hex: String,
    pub description: String,
}

/// A named union of data flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagCombination {
    pub value: u64,
    pub description: String,
}

/// Static documentation of the vendor flag bitmask and raw field codes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagsInfo {
    pub flags: BTreeMap<String, FlagDescriptor>,
    pub common_combinations: BTreeMap<String, FlagCombination>,
    pub response_fields: BTreeMap<String, String>,
}
