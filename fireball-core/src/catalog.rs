use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::constants::{FIELD_DATE, FIELD_ENERGY, FIELD_LAT, FIELD_LON, UNKNOWN_COORD};
use crate::error::{FireballError, Result};
use crate::range::round1;

/// A decoded catalog document plus the SHA-256 of the bytes it came from.
#[derive(Debug, Clone)]
pub struct RawCatalog {
    pub document: Value,
    pub sha256: String,
}

impl RawCatalog {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let document =
            serde_json::from_slice(bytes).map_err(|e| FireballError::Decode(e.to_string()))?;
        let sha256 = hex::encode(Sha256::digest(bytes));
        Ok(RawCatalog { document, sha256 })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub energy: f64,
    pub date: Option<String>,
}

impl CatalogRecord {
    /// Normalizes one positional catalog row.
    ///
    /// Null or missing coordinates become `UNKNOWN_COORD`. A missing or
    /// non-numeric energy is a schema violation.
    pub fn from_row(row_index: usize, row: &[Value]) -> Result<Self> {
        let energy = match row.get(FIELD_ENERGY).map(coerce_f64) {
            Some(Ok(Some(v))) if v.is_finite() => v,
            Some(Ok(Some(_))) => return Err(violation(row_index, "energy is not finite")),
            Some(Ok(None)) | None => return Err(violation(row_index, "energy is missing")),
            Some(Err(reason)) => return Err(violation(row_index, &format!("energy {}", reason))),
        };
        let latitude = coordinate_field(row_index, row, FIELD_LAT, "latitude")?;
        let longitude = coordinate_field(row_index, row, FIELD_LON, "longitude")?;
        let date = row
            .get(FIELD_DATE)
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(CatalogRecord {
            latitude,
            longitude,
            energy,
            date,
        })
    }

    pub fn is_unlocated(&self) -> bool {
        self.latitude == UNKNOWN_COORD && self.longitude == UNKNOWN_COORD
    }
}

fn coordinate_field(row_index: usize, row: &[Value], field: usize, name: &str) -> Result<f64> {
    match row.get(field).map(coerce_f64) {
        Some(Ok(Some(v))) if v.is_finite() => Ok(round1(v)),
        Some(Ok(Some(_))) => Err(violation(row_index, &format!("{} is not finite", name))),
        Some(Ok(None)) | None => Ok(UNKNOWN_COORD),
        Some(Err(reason)) => Err(violation(row_index, &format!("{} {}", name, reason))),
    }
}

// Ok(None) means null.
fn coerce_f64(value: &Value) -> std::result::Result<Option<f64>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| format!("{} is out of range", n)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| format!("{:?} is not a number", s)),
        other => Err(format!("has unexpected type {}", json_type(other))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn violation(row: usize, reason: &str) -> FireballError {
    FireballError::SchemaViolation {
        row,
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessedCatalog {
    pub records: Vec<CatalogRecord>,
    pub skipped: usize,
    pub sha256: Option<String>,
}

pub trait Processor {
    fn process(&self, raw: &RawCatalog) -> ProcessedCatalog;
}

/// Reads the `data` rows of the JPL fireball API.
#[derive(Debug, Clone, Copy, Default)]
pub struct FireballProcessor;

impl Processor for FireballProcessor {
    fn process(&self, raw: &RawCatalog) -> ProcessedCatalog {
        let mut out = ProcessedCatalog {
            sha256: Some(raw.sha256.clone()),
            ..ProcessedCatalog::default()
        };
        let Some(rows) = raw.document.get("data").and_then(Value::as_array) else {
            warn!("catalog has no data array");
            return out;
        };
        for (i, row) in rows.iter().enumerate() {
            let parsed = match row.as_array() {
                Some(fields) => CatalogRecord::from_row(i, fields),
                None => Err(violation(i, "row is not an array")),
            };
            match parsed {
                Ok(rec) => out.records.push(rec),
                Err(err) => {
                    warn!("{}", err);
                    out.skipped += 1;
                }
            }
        }
        debug!(
            "catalog {}: {} records, {} skipped",
            raw.sha256,
            out.records.len(),
            out.skipped
        );
        out
    }
}
