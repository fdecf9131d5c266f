//! Pure transforms from raw Wialon records to domain models
//!
//! Everything in this module is stateless and does no I/O; raw records go
//! in, normalized value objects come out.

use crate::model::raw::{RawCounters, RawSensor, RawUnit};
use crate::model::{
    CalibrationPoint, IgnitionSensorRecord, ParameterReading, SensorInfo, UnitDetail, UnitSummary,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

/// A unit is online while its last fix is younger than this
pub const ONLINE_THRESHOLD_SECS: i64 = 600;

/// Custom field that overrides name-based vehicle classification
const TYPE_OVERRIDE_FIELD: &str = "Тип";

/// Tracker label used when the hardware search matched nothing
pub const DEFAULT_TRACKER_TYPE: &str = "Avtograph";

const TRACTOR_KEYWORDS: &[&str] = &[
    "case",
    "john deere",
    "claas",
    "new holland",
    "fendt",
    "massey",
    "agrotron",
    "deutz",
    "magnum",
    "puma",
    "farmall",
    "maxxum",
    "axion",
    "xerion",
    "arion",
    "quadtrac",
    "steiger",
    "challenger",
    "versatile",
    "valtra",
];

const LOADER_KEYWORDS: &[&str] = &[
    "bobcat",
    "jcb",
    "loader",
    "навантажувач",
    "погрузчик",
    "manitou",
    "merlo",
    "telehandler",
];

const HARVESTER_KEYWORDS: &[&str] = &["combine", "комбайн", "harvester", "lexion", "tucano"];

const SPRAYER_KEYWORDS: &[&str] = &["sprayer", "обприскувач", "patriot", "berthoud", "raptor"];

/// Classify a vehicle by its name.
///
/// The lower-cased name is tested against the keyword sets in fixed
/// priority order; the first category with a match wins.
pub fn classify_vehicle_type(name: &str) -> &'static str {
    let name = name.to_lowercase();
    let matches = |keywords: &[&str]| keywords.iter().any(|kw| name.contains(kw));

    if matches(TRACTOR_KEYWORDS) {
        "Трактор"
    } else if matches(LOADER_KEYWORDS) {
        "Навантажувач"
    } else if matches(HARVESTER_KEYWORDS) {
        "Комбайн"
    } else if matches(SPRAYER_KEYWORDS) {
        "Обприскувач"
    } else {
        "Інше"
    }
}

/// Vehicle type with the explicit custom-field override applied first
pub fn resolve_unit_type(name: &str, custom_fields: &HashMap<String, String>) -> String {
    match custom_fields.get(TYPE_OVERRIDE_FIELD) {
        Some(explicit) if !explicit.is_empty() => explicit.clone(),
        _ => classify_vehicle_type(name).to_string(),
    }
}

/// Online iff a fix exists and is strictly younger than the threshold
pub fn is_online(last_fix: Option<i64>, now: i64) -> bool {
    match last_fix {
        Some(t) => now - t < ONLINE_THRESHOLD_SECS,
        None => false,
    }
}

/// (mileage, engine_hours) from the counters sub-object
pub fn counter_values(counters: Option<&RawCounters>) -> (f64, f64) {
    counters.map(RawCounters::values).unwrap_or((0.0, 0.0))
}

/// Flatten the raw custom-field map into name -> value pairs
fn custom_fields(raw: &RawUnit) -> HashMap<String, String> {
    raw.flds
        .values()
        .map(|field| (field.n.clone(), field.v.clone()))
        .collect()
}

/// Fix timestamp of the position sub-object; 0 counts as absent
fn last_fix(raw: &RawUnit) -> Option<i64> {
    raw.pos.as_ref().map(|pos| pos.t).filter(|&t| t > 0)
}

/// Render an epoch as ISO-8601 UTC
fn format_iso_timestamp(epoch: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(epoch, 0).map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}

/// Render an epoch in the fixed parameter display format, UTC
pub fn format_param_timestamp(epoch: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(epoch, 0)
        .map(|dt| dt.format("%d.%m.%Y, %H:%M:%S").to_string())
}

/// Build a unit summary from one raw list item.
///
/// `tracker_types` is the pre-built unit id -> hardware family map;
/// `now` is the epoch the online flag is evaluated against.
pub fn build_unit_summary(
    raw: &RawUnit,
    tracker_types: &HashMap<u64, String>,
    now: i64,
) -> UnitSummary {
    let pos = raw.pos.clone().unwrap_or_default();
    let fix = last_fix(raw);
    let (mileage, engine_hours) = counter_values(raw.cfl.as_ref());
    let fields = custom_fields(raw);
    let name = raw.display_name();

    let unit_type = resolve_unit_type(&name, &fields);
    let tracker_type = tracker_types
        .get(&raw.id)
        .cloned()
        .unwrap_or_else(|| DEFAULT_TRACKER_TYPE.to_string());

    let navigation_system = raw
        .prms
        .get("navigation_system")
        .and_then(|param| param.v.as_str())
        .unwrap_or_default()
        .to_string();

    UnitSummary {
        id: raw.id,
        name,
        latitude: pos.y,
        longitude: pos.x,
        speed: pos.s,
        course: pos.c,
        altitude: pos.z,
        satellites: pos.sc,
        last_time: fix.and_then(format_iso_timestamp),
        is_online: is_online(fix, now),
        mileage,
        engine_hours,
        custom_fields: fields,
        unit_type,
        tracker_type,
        navigation_system,
        inputs_expander_status: 0,
        is_activated: raw.act.unwrap_or(0) == 1,
    }
}

/// Build the full unit detail from one raw item.
///
/// Counters of zero fall back to the equivalent last-message telemetry
/// parameters; sensors and parameters are sorted by name. The detail path
/// issues no hardware searches, so the tracker label stays at its default.
pub fn build_unit_detail(raw: &RawUnit, now: i64) -> UnitDetail {
    let mut summary = build_unit_summary(raw, &HashMap::new(), now);

    if let Some(lmsg) = raw.lmsg.as_ref() {
        if summary.mileage == 0.0 {
            summary.mileage = lmsg.numeric_param("mileage");
        }
        if summary.engine_hours == 0.0 {
            summary.engine_hours = lmsg.numeric_param("engine_hours");
        }
    }

    let mut sensors: Vec<SensorInfo> = raw
        .sens
        .values()
        .map(|sensor| SensorInfo {
            id: sensor.id,
            name: sensor.n.clone(),
            sensor_type: sensor.t.clone(),
            param: sensor.p.clone(),
            description: sensor.d.clone(),
            unit: sensor.m.clone(),
        })
        .collect();
    sensors.sort_by(|a, b| a.name.cmp(&b.name));

    let mut parameters: Vec<ParameterReading> = raw
        .prms
        .iter()
        .map(|(name, param)| ParameterReading {
            name: name.clone(),
            value: param.v.clone(),
            last_update: param.ct.and_then(format_param_timestamp),
        })
        .collect();
    parameters.sort_by(|a, b| a.name.cmp(&b.name));

    UnitDetail {
        summary,
        device_type: raw.hw.clone(),
        phone: raw.ph.clone(),
        phone2: raw.ph2.clone(),
        uid: raw.uid.clone(),
        uid2: raw.uid2.clone(),
        sensors,
        parameters,
        icon: raw.uri.clone(),
    }
}

/// Whether a sensor's type tag marks it as engine/ignition monitoring
fn is_ignition_sensor(sensor: &RawSensor) -> bool {
    let tag = sensor.t.to_lowercase();
    tag.contains("engine") || tag.contains("ignition")
}

/// Parse the embedded configuration string of a sensor.
///
/// Malformed per-sensor metadata degrades to an empty object rather than
/// failing the whole scan.
fn sensor_config(sensor: &RawSensor) -> Value {
    sensor
        .c
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_else(|| Value::Object(Default::default()))
}

/// Sensor id, falling back to the map key the vendor indexed it under
fn sensor_id(key: &str, sensor: &RawSensor) -> i64 {
    sensor.id.unwrap_or_else(|| key.parse().unwrap_or(0))
}

/// Extract engine/ignition sensors from a batch of raw units.
///
/// Validator references are resolved against sibling sensors of the same
/// unit only; cross-unit lookups are never attempted.
pub fn build_ignition_records(units: &[RawUnit]) -> Vec<IgnitionSensorRecord> {
    let mut records = Vec::new();

    for unit in units {
        let unit_name = unit.display_name();

        for (key, sensor) in &unit.sens {
            if !is_ignition_sensor(sensor) {
                continue;
            }

            let validator_sensor_name = unit
                .sens
                .iter()
                .find(|&(sibling_key, sibling)| {
                    sensor.vs != 0 && sensor_id(sibling_key, sibling) == sensor.vs
                })
                .map(|(_, sibling)| sibling.n.clone())
                .unwrap_or_default();

            records.push(IgnitionSensorRecord {
                unit_id: unit.id,
                unit_name: unit_name.clone(),
                sensor_id: sensor_id(key, sensor),
                name: sensor.n.clone(),
                sensor_type: sensor.t.clone(),
                description: sensor.d.clone(),
                parameter: sensor.p.clone(),
                metric: sensor.m.clone(),
                calibration_table: sensor
                    .tbl
                    .iter()
                    .map(|point| CalibrationPoint {
                        x: point.x,
                        a: point.a,
                        b: point.b,
                    })
                    .collect(),
                validator_type: sensor.vt,
                validator_sensor_id: sensor.vs,
                validator_sensor_name,
                config: sensor_config(sensor),
                created: sensor.ct,
                modified: sensor.mt,
            });
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::raw::RawUnit;
    use serde_json::json;

    fn unit(value: serde_json::Value) -> RawUnit {
        RawUnit::from_value(value).unwrap()
    }

    #[test]
    fn classifies_known_vehicle_names() {
        assert_eq!(classify_vehicle_type("John Deere 8R"), "Трактор");
        assert_eq!(classify_vehicle_type("JCB 411"), "Навантажувач");
        assert_eq!(classify_vehicle_type("CLAAS Lexion 760"), "Трактор");
        assert_eq!(classify_vehicle_type("Комбайн Tucano"), "Комбайн");
        assert_eq!(classify_vehicle_type("Обприскувач Berthoud"), "Обприскувач");
        assert_eq!(classify_vehicle_type("XYZ-9"), "Інше");
    }

    #[test]
    fn type_override_field_always_wins() {
        let mut fields = HashMap::new();
        fields.insert("Тип".to_string(), "Сівалка".to_string());
        assert_eq!(resolve_unit_type("John Deere 8R", &fields), "Сівалка");

        fields.insert("Тип".to_string(), String::new());
        assert_eq!(resolve_unit_type("John Deere 8R", &fields), "Трактор");
    }

    #[test]
    fn online_threshold_is_strict() {
        let now = 1_700_000_000;
        assert!(is_online(Some(now - 599), now));
        assert!(!is_online(Some(now - 600), now));
        assert!(!is_online(None, now));
    }

    #[test]
    fn summary_without_position_is_offline_with_no_fix_time() {
        let raw = unit(json!({"id": 3, "nm": "Unit"}));
        let summary = build_unit_summary(&raw, &HashMap::new(), 1_700_000_000);
        assert!(!summary.is_online);
        assert!(summary.last_time.is_none());
        assert_eq!(summary.latitude, None);
        assert_eq!(summary.longitude, None);
    }

    #[test]
    fn summary_maps_position_counters_and_activation() {
        let now = 1_700_000_000;
        let raw = unit(json!({
            "id": 7,
            "nm": "Fendt 936",
            "act": 1,
            "pos": {"t": now - 10, "y": 49.84, "x": 24.03, "s": 12.5, "c": 90.0, "z": 210.0, "sc": 11},
            "cfl": {"cnm": 5230.0, "cneh": 812.0},
            "flds": {"1": {"n": "Поле", "v": "Південь"}},
            "prms": {"navigation_system": {"v": "GPS+GLONASS", "ct": now - 10}}
        }));

        let summary = build_unit_summary(&raw, &HashMap::new(), now);
        assert!(summary.is_online);
        assert!(summary.is_activated);
        assert_eq!(summary.latitude, Some(49.84));
        assert_eq!(summary.longitude, Some(24.03));
        assert_eq!(summary.satellites, 11);
        assert_eq!(summary.mileage, 5230.0);
        assert_eq!(summary.engine_hours, 812.0);
        assert_eq!(summary.unit_type, "Трактор");
        assert_eq!(summary.navigation_system, "GPS+GLONASS");
        assert_eq!(summary.custom_fields["Поле"], "Південь");
        assert_eq!(summary.tracker_type, DEFAULT_TRACKER_TYPE);
    }

    #[test]
    fn detail_sorts_sensors_and_parameters_by_name() {
        let raw = unit(json!({
            "id": 7,
            "nm": "Unit",
            "sens": {
                "1": {"id": 1, "n": "B", "t": "", "p": "", "d": "", "m": ""},
                "2": {"id": 2, "n": "A", "t": "", "p": "", "d": "", "m": ""}
            },
            "prms": {
                "rpm": {"v": 1400, "ct": 1700000000},
                "adc1": {"v": 3.2, "ct": 1700000000}
            }
        }));

        let detail = build_unit_detail(&raw, 1_700_000_100);
        let sensor_names: Vec<&str> = detail.sensors.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(sensor_names, ["A", "B"]);
        let param_names: Vec<&str> = detail.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(param_names, ["adc1", "rpm"]);
    }

    #[test]
    fn detail_falls_back_to_last_message_counters() {
        let raw = unit(json!({
            "id": 7,
            "nm": "Unit",
            "cfl": 257,
            "lmsg": {"t": 1700000000, "p": {"mileage": 1500.5, "engine_hours": 320.0}}
        }));

        let detail = build_unit_detail(&raw, 1_700_000_100);
        assert_eq!(detail.summary.mileage, 1500.5);
        assert_eq!(detail.summary.engine_hours, 320.0);
    }

    #[test]
    fn param_timestamps_render_in_fixed_utc_format() {
        // 2023-11-14 22:13:20 UTC
        assert_eq!(
            format_param_timestamp(1_700_000_000).as_deref(),
            Some("14.11.2023, 22:13:20")
        );
    }

    #[test]
    fn ignition_scan_keeps_engine_and_ignition_type_tags_only() {
        let units = vec![unit(json!({
            "id": 10,
            "nm": "Case Magnum",
            "sens": {
                "1": {"id": 1, "n": "Ignition", "t": "engine operation", "p": "in1", "d": "", "m": "On/Off"},
                "2": {"id": 2, "n": "Fuel", "t": "fuel level", "p": "adc1", "d": "", "m": "l"}
            }
        }))];

        let records = build_ignition_records(&units);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Ignition");
        assert_eq!(records[0].unit_name, "Case Magnum");
    }

    #[test]
    fn ignition_config_parse_failure_degrades_to_empty_object() {
        let units = vec![unit(json!({
            "id": 10,
            "nm": "Unit",
            "sens": {
                "1": {"id": 1, "n": "Ignition", "t": "ignition", "p": "in1",
                       "d": "", "m": "", "c": "{not valid json"}
            }
        }))];

        let records = build_ignition_records(&units);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].config, json!({}));
    }

    #[test]
    fn validator_resolution_stays_within_the_unit() {
        let units = vec![
            unit(json!({
                "id": 10,
                "nm": "Unit A",
                "sens": {
                    "1": {"id": 1, "n": "Ignition", "t": "engine operation",
                           "p": "in1", "d": "", "m": "", "vt": 1, "vs": 2},
                    "2": {"id": 2, "n": "Power", "t": "voltage", "p": "pwr_ext",
                           "d": "", "m": "V"}
                }
            })),
            unit(json!({
                "id": 11,
                "nm": "Unit B",
                "sens": {
                    "1": {"id": 1, "n": "Ignition B", "t": "ignition",
                           "p": "in1", "d": "", "m": "", "vt": 1, "vs": 9}
                }
            })),
        ];

        let records = build_ignition_records(&units);
        let a = records.iter().find(|r| r.unit_id == 10).unwrap();
        assert_eq!(a.validator_sensor_name, "Power");

        // sensor 9 exists nowhere on unit B, and unit A's sensors are not consulted
        let b = records.iter().find(|r| r.unit_id == 11).unwrap();
        assert_eq!(b.validator_sensor_name, "");
    }

    #[test]
    fn ignition_calibration_table_is_carried_over() {
        let units = vec![unit(json!({
            "id": 10,
            "nm": "Unit",
            "sens": {
                "1": {"id": 1, "n": "Ignition", "t": "engine operation", "p": "in1",
                       "d": "", "m": "", "tbl": [{"x": 0.0, "a": 1.0, "b": 0.0}],
                       "ct": 1600000000, "mt": 1650000000}
            }
        }))];

        let records = build_ignition_records(&units);
        assert_eq!(records[0].calibration_table.len(), 1);
        assert_eq!(records[0].calibration_table[0].a, 1.0);
        assert_eq!(records[0].created, 1_600_000_000);
        assert_eq!(records[0].modified, 1_650_000_000);
    }
}
