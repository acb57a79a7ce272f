//! Sample normalization.
//!
//! Converts the sparse, timestamp-keyed intraday payload into typed
//! [`IntradaySample`]s. Each recognized field is extracted independently:
//! a malformed value drops only that field, never the rest of the record
//! and never the run. Unrecognized fields are ignored.

use log::warn;
use serde_json::Value;

use crate::IntradaySample;

/// Normalize an intraday series object into typed samples, sorted by
/// instant.
///
/// The payload maps epoch-second keys (numeric strings, as the upstream API
/// serializes object keys) to partial field records. Records with a
/// non-numeric key are dropped with a warning.
///
/// # Example
/// ```
/// use serde_json::json;
/// use trackweave::normalize_series;
///
/// let series = json!({
///     "1000": { "heart_rate": 112, "steps": "24", "duration": 20 },
///     "1060": { "heart_rate": "garbage", "steps": 30, "duration": 20 }
/// });
/// let samples = normalize_series(&series);
///
/// assert_eq!(samples.len(), 2);
/// assert_eq!(samples[0].heart_rate, Some(112));
/// assert_eq!(samples[0].steps, Some(24));
/// // The malformed heart rate is dropped; the rest of the record survives.
/// assert_eq!(samples[1].heart_rate, None);
/// assert_eq!(samples[1].steps, Some(30));
/// ```
pub fn normalize_series(series: &Value) -> Vec<IntradaySample> {
    let Some(map) = series.as_object() else {
        warn!("[Normalize] Intraday series is not an object, nothing to normalize");
        return Vec::new();
    };

    let mut samples: Vec<IntradaySample> = map
        .iter()
        .filter_map(|(key, record)| {
            let instant = match key.trim().parse::<i64>() {
                Ok(t) => t,
                Err(_) => {
                    warn!("[Normalize] Dropping record with non-numeric instant key {:?}", key);
                    return None;
                }
            };
            Some(IntradaySample {
                instant,
                heart_rate: field_u32(record, "heart_rate", instant),
                duration: field_u32(record, "duration", instant),
                steps: field_u32(record, "steps", instant),
                distance: field_f64(record, "distance", instant),
                elevation: field_f64(record, "elevation", instant),
                calories: field_f64(record, "calories", instant),
            })
        })
        .collect();

    samples.sort_by_key(|s| s.instant);
    samples
}

/// Extract an unsigned integer field; absent, null, or malformed values
/// resolve to `None`.
fn field_u32(record: &Value, name: &str, instant: i64) -> Option<u32> {
    let value = record.get(name)?;
    if value.is_null() {
        return None;
    }
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    if parsed.is_none() {
        warn!(
            "[Normalize] Dropping malformed field '{}' at instant {}: {}",
            name, instant, value
        );
    }
    parsed
}

/// Extract a float field; absent, null, or malformed values resolve to
/// `None`.
fn field_f64(record: &Value, name: &str, instant: i64) -> Option<f64> {
    let value = record.get(name)?;
    if value.is_null() {
        return None;
    }
    let parsed = match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    };
    if parsed.is_none() {
        warn!(
            "[Normalize] Dropping malformed field '{}' at instant {}: {}",
            name, instant, value
        );
    }
    parsed
}
