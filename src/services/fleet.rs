//! Fleet operations over the Wialon session client
//!
//! Thin async operations composing the session client with the pure
//! normalizer: search parameters go up, normalized value objects come back.
//! Nothing here caches - every call hits the upstream.

use crate::client::{flags, SessionClient};
use crate::error::{Result, WialonError};
use crate::model::raw::{RawUnit, SearchItemPayload, SearchItemsPayload};
use crate::model::{FlagsInfo, IgnitionReport, RawUnitRecord, UnitDetail, UnitSummary};
use crate::services::normalizer;
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Hardware family patterns resolved into tracker type labels.
///
/// The first entry is a literal name, the rest carry a trailing wildcard.
/// Iteration order matters: when two patterns match the same unit the later
/// one overwrites the earlier (kept as observed upstream behavior).
const TRACKER_PATTERNS: &[&str] = &[
    "Avtograph",
    "Teltonika*",
    "BCE*",
    "Xirgo*",
    "Wialon*",
    "Queclink*",
    "Galileo*",
    "Bitrek*",
];

/// Core gateway operations over one configured upstream credential
pub struct FleetService {
    client: Arc<SessionClient>,
}

impl FleetService {
    /// Create a service over an explicitly constructed session client
    pub fn new(client: Arc<SessionClient>) -> Self {
        Self { client }
    }

    /// Search all units with the given data flags
    async fn search_units(&self, flags: u64) -> Result<Value> {
        let params = json!({
            "spec": {
                "itemsType": "avl_unit",
                "propName": "sys_name",
                "propValueMask": "*",
                "sortType": "sys_name"
            },
            "force": 1,
            "flags": flags,
            "from": 0,
            "to": 0
        });
        self.client.authenticated_call("core/search_items", &params).await
    }

    /// Fetch one unit by id with the given data flags
    async fn search_item(&self, unit_id: u64, flags: u64) -> Result<Value> {
        let params = json!({ "id": unit_id, "flags": flags });
        self.client.authenticated_call("core/search_item", &params).await
    }

    /// Decode search items into raw units, skipping records that do not parse
    fn decode_units(result: Value) -> Result<Vec<RawUnit>> {
        let payload: SearchItemsPayload = serde_json::from_value(result)?;
        let mut units = Vec::with_capacity(payload.items.len());
        for item in payload.items {
            match RawUnit::from_value(item) {
                Ok(unit) => units.push(unit),
                Err(e) => warn!("Skipping undecodable unit record: {e}"),
            }
        }
        Ok(units)
    }

    /// Map of unit id -> tracker hardware family label.
    ///
    /// One upstream search per pattern; assignments are last-write-wins in
    /// pattern order. A vendor-side failure on one pattern skips it.
    pub async fn tracker_type_map(&self) -> Result<HashMap<u64, String>> {
        let mut tracker_map = HashMap::new();

        for pattern in TRACKER_PATTERNS {
            let params = json!({
                "spec": {
                    "itemsType": "avl_unit",
                    "propName": "rel_hw_type_name",
                    "propValueMask": pattern,
                    "sortType": "sys_name"
                },
                "force": 1,
                "flags": flags::BASE,
                "from": 0,
                "to": 0
            });

            let result = match self.client.authenticated_call("core/search_items", &params).await {
                Ok(result) => result,
                Err(e) if e.is_vendor_side() => {
                    warn!("Tracker search for {pattern} failed upstream: {e}");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let label = pattern.trim_end_matches('*').to_string();
            for unit in Self::decode_units(result)? {
                tracker_map.insert(unit.id, label.clone());
            }
        }

        Ok(tracker_map)
    }

    /// List all units as normalized summaries.
    ///
    /// Vendor-side failures degrade to an empty list; transport failures
    /// propagate. The asymmetry with `unit_detail` is long-standing caller
    /// contract.
    pub async fn list_units(&self) -> Result<Vec<UnitSummary>> {
        let tracker_types = match self.tracker_type_map().await {
            Ok(map) => map,
            Err(e) if e.is_vendor_side() => {
                warn!("Tracker type mapping unavailable: {e}");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let result = match self.search_units(flags::LIST_FLAGS).await {
            Ok(result) => result,
            Err(e) if e.is_vendor_side() => {
                warn!("Unit search failed upstream: {e}");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let now = Utc::now().timestamp();
        let units = Self::decode_units(result)?
            .iter()
            .map(|unit| normalizer::build_unit_summary(unit, &tracker_types, now))
            .collect();
        Ok(units)
    }

    /// Full detail for one unit
    pub async fn unit_detail(&self, unit_id: u64) -> Result<UnitDetail> {
        let result = match self.search_item(unit_id, flags::DETAIL_FLAGS).await {
            Ok(result) => result,
            Err(WialonError::Vendor { code, reason }) => {
                debug!("Unit {unit_id} detail fetch failed upstream ({code}: {reason})");
                return Err(WialonError::not_found(format!("unit {unit_id}")));
            }
            Err(e) => return Err(e),
        };

        let payload: SearchItemPayload = serde_json::from_value(result)?;
        let item = payload
            .item
            .ok_or_else(|| WialonError::not_found(format!("unit {unit_id}")))?;

        let raw = RawUnit::from_value(item)?;
        Ok(normalizer::build_unit_detail(&raw, Utc::now().timestamp()))
    }

    /// Raw vendor record for one unit, fetched with every flag bit set
    pub async fn unit_raw(&self, unit_id: u64) -> Result<RawUnitRecord> {
        let result = match self.search_item(unit_id, flags::ALL).await {
            Ok(result) => result,
            Err(WialonError::Vendor { code, reason }) => {
                debug!("Unit {unit_id} raw fetch failed upstream ({code}: {reason})");
                return Err(WialonError::not_found(format!("unit {unit_id}")));
            }
            Err(e) => return Err(e),
        };

        let payload: SearchItemPayload = serde_json::from_value(result)?;
        let raw_data = payload
            .item
            .ok_or_else(|| WialonError::not_found(format!("unit {unit_id}")))?;

        Ok(RawUnitRecord {
            unit_id,
            flags_used: flags::ALL,
            flags_hex: format!("0x{:X}", flags::ALL),
            raw_data,
        })
    }

    /// Scan every unit for engine/ignition sensors
    pub async fn ignition_sensors(&self) -> Result<IgnitionReport> {
        let result = self.search_units(flags::IGNITION_FLAGS).await?;
        let units = Self::decode_units(result)?;
        let sensors = normalizer::build_ignition_records(&units);
        Ok(IgnitionReport {
            total: sensors.len(),
            sensors,
        })
    }

    /// Static flag and field documentation; involves no upstream call
    pub fn flags_info(&self) -> FlagsInfo {
        flags::flags_info()
    }
}
