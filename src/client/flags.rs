//! Wialon data-retrieval flags
//!
//! Unit search/fetch calls take a bitmask selecting which raw sub-objects
//! the vendor includes in its response. Bits combine by bitwise OR.
//! Reference: https://sdk.wialon.com/wiki/en/sidebar/remoteapi/apiref/format/unit

use crate::model::{FlagCombination, FlagDescriptor, FlagsInfo};
use std::collections::BTreeMap;

/// 1 - base info (id, name)
pub const BASE: u64 = 0x0000_0001;
/// 2 - custom properties
pub const CUSTOM_PROPS: u64 = 0x0000_0002;
/// 4 - billing info
pub const BILLING: u64 = 0x0000_0004;
/// 8 - custom fields
pub const CUSTOM_FIELDS: u64 = 0x0000_0008;
/// 16 - image
pub const IMAGE: u64 = 0x0000_0010;
/// 32 - messages params
pub const MESSAGES: u64 = 0x0000_0020;
/// 64 - GUID
pub const GUID: u64 = 0x0000_0040;
/// 128 - admin fields
pub const ADMIN_FIELDS: u64 = 0x0000_0080;
/// 256 - activation status (act field)
pub const ACTIVATION: u64 = 0x0000_0100;
/// 1024 - last message and position
pub const LAST_MSG: u64 = 0x0000_0400;
/// 4096 - sensors
pub const SENSORS: u64 = 0x0000_1000;
/// 8192 - counters (mileage, engine hours)
pub const COUNTERS: u64 = 0x0000_2000;
/// 32768 - maintenance
pub const MAINTENANCE: u64 = 0x0000_8000;
/// 524288 - commands
pub const COMMANDS: u64 = 0x0008_0000;
/// 1048576 - message params
pub const MSG_PARAMS: u64 = 0x0010_0000;
/// 2097152 - connection state
pub const CONNECTION: u64 = 0x0020_0000;
/// 4194304 - position
pub const POSITION: u64 = 0x0040_0000;

/// All bits set - maximum detail the vendor will return
pub const ALL: u64 = 0xffff_ffff;

/// Flag union used by the unit list operation
pub const LIST_FLAGS: u64 =
    BASE | CUSTOM_FIELDS | ACTIVATION | LAST_MSG | COUNTERS | MSG_PARAMS;

/// Flag union used by the unit detail operation
pub const DETAIL_FLAGS: u64 = BASE
    | CUSTOM_PROPS
    | CUSTOM_FIELDS
    | IMAGE
    | LAST_MSG
    | SENSORS
    | COUNTERS
    | CONNECTION
    | POSITION;

/// Flag union used when scanning units for ignition sensors
pub const IGNITION_FLAGS: u64 = BASE | SENSORS;

/// Static reference table of every documented flag bit, in bit order
const FLAG_TABLE: &[(&str, u64, &str)] = &[
    ("base", BASE, "Base info: unit id and name"),
    ("custom_props", CUSTOM_PROPS, "Custom properties"),
    ("billing", BILLING, "Billing / subscription info"),
    ("custom_fields", CUSTOM_FIELDS, "Custom fields (name/value pairs)"),
    ("image", IMAGE, "Unit image / icon"),
    ("messages", MESSAGES, "Messages parameters"),
    ("guid", GUID, "Globally unique identifier"),
    ("admin_fields", ADMIN_FIELDS, "Admin fields (restricted custom fields)"),
    ("activation", ACTIVATION, "Activation status (act field)"),
    ("last_msg", LAST_MSG, "Last message and last position"),
    ("sensors", SENSORS, "Configured sensors"),
    ("counters", COUNTERS, "Counters: mileage and engine hours"),
    ("maintenance", MAINTENANCE, "Maintenance / service intervals"),
    ("commands", COMMANDS, "Available commands"),
    ("msg_params", MSG_PARAMS, "Last message parameters (telemetry values)"),
    ("connection", CONNECTION, "Connection state"),
    ("position", POSITION, "Position sub-object"),
];

/// Descriptions of the compact field codes appearing in raw unit records
const RESPONSE_FIELD_TABLE: &[(&str, &str)] = &[
    ("id", "Unit id"),
    ("nm", "Unit name"),
    ("uid", "Device unique identifier"),
    ("uid2", "Secondary device unique identifier"),
    ("ph", "Device phone number"),
    ("ph2", "Secondary device phone number"),
    ("hw", "Hardware (tracker) type"),
    ("act", "Activation status: 0 inactive, 1 active"),
    ("uri", "Icon resource path"),
    ("pos", "Last position: y latitude, x longitude, s speed, c course, z altitude, sc satellites, t fix time"),
    ("lmsg", "Last message; p holds raw telemetry parameters"),
    ("prms", "Message parameters: name -> {v value, ct change time}"),
    ("flds", "Custom fields: index -> {n name, v value}"),
    ("sens", "Sensors: id -> {n name, t type, p parameter, d description, m metric, c configuration}"),
    ("cfl", "Counters: {cnm mileage, cneh engine hours}; legacy scalar form carries no breakdown"),
    ("cnm", "Mileage counter value"),
    ("cneh", "Engine hours counter value"),
];

/// Build the static flag documentation structure served by the gateway.
///
/// Pure lookup data - no vendor call is involved.
pub fn flags_info() -> FlagsInfo {
    let flags = FLAG_TABLE
        .iter()
        .map(|&(name, value, description)| {
            (
                name.to_string(),
                FlagDescriptor {
                    value,
                    hex: format!("0x{value:08X}"),
                    description: description.to_string(),
                },
            )
        })
        .collect::<BTreeMap<_, _>>();

    let mut common_combinations = BTreeMap::new();
    common_combinations.insert(
        "unit_list".to_string(),
        FlagCombination {
            value: LIST_FLAGS,
            description: "Unit list: base, custom fields, activation, last message, counters, message params".to_string(),
        },
    );
    common_combinations.insert(
        "unit_detail".to_string(),
        FlagCombination {
            value: DETAIL_FLAGS,
            description: "Unit detail: identity, custom data, image, last message, sensors, counters, connection, position".to_string(),
        },
    );
    common_combinations.insert(
        "ignition_scan".to_string(),
        FlagCombination {
            value: IGNITION_FLAGS,
            description: "Ignition sensor scan: base info and sensors".to_string(),
        },
    );
    common_combinations.insert(
        "all".to_string(),
        FlagCombination {
            value: ALL,
            description: "Every documented sub-object (maximum detail)".to_string(),
        },
    );

    let response_fields = RESPONSE_FIELD_TABLE
        .iter()
        .map(|&(code, description)| (code.to_string(), description.to_string()))
        .collect::<BTreeMap<_, _>>();

    FlagsInfo {
        flags,
        common_combinations,
        response_fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_unions_match_documented_values() {
        // 1 + 8 + 256 + 1024 + 8192 + 1048576
        assert_eq!(LIST_FLAGS, 1_058_057);
        // 1 + 2 + 8 + 16 + 1024 + 4096 + 8192 + 2097152 + 4194304
        assert_eq!(DETAIL_FLAGS, 6_304_795);
        assert_eq!(IGNITION_FLAGS, 4_097);
    }

    #[test]
    fn flags_info_lists_every_documented_bit() {
        let info = flags_info();
        assert_eq!(info.flags.len(), FLAG_TABLE.len());
        assert_eq!(info.flags["counters"].value, 8192);
        assert_eq!(info.flags["position"].hex, "0x00400000");
        assert!(info.response_fields.contains_key("cfl"));
    }
}
