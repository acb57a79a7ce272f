//! # Trackweave
//!
//! Dense workout timeline reconstruction and TCX assembly from sparse,
//! irregularly-timed intraday activity samples.
//!
//! This library provides:
//! - Normalization of loosely-structured intraday sample payloads
//! - 1 Hz timeline resampling over the workout interval
//! - Time-weighted interpolation of heart rate, cadence, and distance
//! - Optional GPS track fusion with geodesic distance computation
//! - Assembly (and rendering) of a TrainingCenterDatabase v2 document tree
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use trackweave::{reconstruct, BuildInfo, WorkoutSummary};
//!
//! let summary: WorkoutSummary = serde_json::from_value(json!({
//!     "id": 42,
//!     "category": 2,
//!     "model": 55,
//!     "attrib": 0,
//!     "startdate": 1_700_000_000,
//!     "enddate": 1_700_000_060,
//!     "data": { "calories": 35.0, "hr_average": 128, "hr_max": 150 }
//! }))
//! .unwrap();
//!
//! let series = json!({
//!     "1700000010": { "heart_rate": 120, "steps": 18, "duration": 15, "distance": 21.5 },
//!     "1700000040": { "heart_rate": 140, "steps": 20, "duration": 15, "distance": 24.0 }
//! });
//!
//! let build = BuildInfo::new("2024-01-01T00:00:00Z", "trackweave");
//! let doc = reconstruct(&summary, &series, None, &build).unwrap();
//!
//! // One trackpoint per whole second of the workout, inclusive bounds.
//! assert_eq!(doc.activity.lap.track.len(), 61);
//! ```

use log::info;
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{ReconError, Result};

// Sample normalization (sparse JSON series -> typed samples)
pub mod normalize;
pub use normalize::normalize_series;

// Timeline resampling (1 Hz grid merged with real sample instants)
pub mod timeline;
pub use timeline::{build_timeline, TimelinePoint};

// Per-field interpolation with edge-fill policies
pub mod interpolate;
pub use interpolate::{interpolate_fields, summarize, TimelineStats};

// GPS track alignment and geodesic distance
pub mod gps;
pub use gps::{fuse_track, trim_track};

// Controlled vocabularies (device models, sport categories, attributions)
pub mod vocab;
pub use vocab::Sport;

// TCX document tree and assembler
pub mod tcx;
pub use tcx::{assemble, TcxActivity, TcxDocument, TcxLap, TcxTrackpoint};

// TCX tree -> XML rendering
pub mod xml;
pub use xml::render_tcx;

// ============================================================================
// Core Types
// ============================================================================

/// One exercise session as reported by the upstream workout API.
///
/// Instants are epoch seconds; the interval is inclusive on both ends as
/// reported by the source. The record is a read-only input — reconstruction
/// never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSummary {
    /// Workout identifier
    pub id: i64,
    /// Identifier of the capturing device, when known
    #[serde(default, alias = "deviceid")]
    pub device_id: Option<String>,
    /// Device model code
    #[serde(default)]
    pub model: u32,
    /// Sport category code
    pub category: u32,
    /// Attribution code (how the workout was captured/confirmed)
    #[serde(default)]
    pub attrib: u32,
    /// Start instant (epoch seconds)
    #[serde(alias = "startdate")]
    pub start: i64,
    /// End instant (epoch seconds, inclusive)
    #[serde(alias = "enddate")]
    pub end: i64,
    /// Aggregate measurements reported for the whole session
    #[serde(default)]
    pub data: WorkoutData,
}

impl WorkoutSummary {
    /// Elapsed workout time in seconds.
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// True when the workout was autodetected by a device and has not been
    /// confirmed by the user. Callers use this to filter summaries before
    /// reconstruction; the engine itself treats all summaries alike.
    pub fn is_autodetected(&self) -> bool {
        self.attrib == vocab::ATTRIB_AUTODETECTED
    }
}

/// Aggregate data block of a [`WorkoutSummary`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutData {
    /// Total distance in meters
    #[serde(default)]
    pub distance: Option<f64>,
    /// Calories burned
    #[serde(default)]
    pub calories: Option<f64>,
    /// Average heart rate (bpm)
    #[serde(default)]
    pub hr_average: Option<u32>,
    /// Minimum heart rate (bpm)
    #[serde(default)]
    pub hr_min: Option<u32>,
    /// Maximum heart rate (bpm)
    #[serde(default)]
    pub hr_max: Option<u32>,
    /// Total step count
    #[serde(default)]
    pub steps: Option<u32>,
}

/// A sparse, timestamped partial measurement taken during a workout.
///
/// Absence of a field means "not measured at this instant", never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntradaySample {
    /// Instant of the measurement (epoch seconds)
    pub instant: i64,
    /// Heart rate in bpm
    pub heart_rate: Option<u32>,
    /// Seconds of activity covered by this sample
    pub duration: Option<u32>,
    /// Steps taken over the covered duration
    pub steps: Option<u32>,
    /// Distance delta in meters
    pub distance: Option<f64>,
    /// Elevation delta in meters
    pub elevation: Option<f64>,
    /// Calories delta
    pub calories: Option<f64>,
}

impl IntradaySample {
    /// Create a sample with no measured fields at the given instant.
    pub fn new(instant: i64) -> Self {
        Self {
            instant,
            heart_rate: None,
            duration: None,
            steps: None,
            distance: None,
            elevation: None,
            calories: None,
        }
    }
}

/// One instant of the dense reconstructed timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructedPoint {
    /// Instant (epoch seconds)
    pub instant: i64,
    /// True if this point was inserted to complete the 1 Hz grid rather
    /// than coming from a real sample
    pub synthetic: bool,
    /// Interpolated heart rate, unset when no heart-rate sample exists
    /// anywhere in the interval
    pub heart_rate: Option<f64>,
    /// Interpolated cadence in steps per minute (0 when underivable)
    pub cadence: f64,
    /// Cumulative distance in meters, non-decreasing along the timeline
    pub distance: f64,
    /// Latitude in degrees, set by GPS fusion
    pub latitude: Option<f64>,
    /// Longitude in degrees, set by GPS fusion
    pub longitude: Option<f64>,
    /// Elevation in meters, set by GPS fusion
    pub elevation: Option<f64>,
}

impl ReconstructedPoint {
    /// Check if the point carries a complete position.
    pub fn has_position(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// A timestamped GPS fix from an external track source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    /// Instant of the fix (epoch seconds)
    pub time: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in meters, when the source recorded one
    pub elevation: Option<f64>,
}

impl GpsFix {
    /// Create a new fix.
    pub fn new(time: i64, latitude: f64, longitude: f64, elevation: Option<f64>) -> Self {
        Self {
            time,
            latitude,
            longitude,
            elevation,
        }
    }

    /// Check if the fix has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Build metadata stamped into the document's author block, supplied by the
/// caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildInfo {
    /// Build timestamp string (RFC 3339)
    pub time: String,
    /// Builder identifier
    pub builder: String,
}

impl BuildInfo {
    /// Create build metadata.
    pub fn new(time: &str, builder: &str) -> Self {
        Self {
            time: time.to_string(),
            builder: builder.to_string(),
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Reconstruct one workout into a complete TCX document tree.
///
/// Chains normalization, timeline resampling, field interpolation, optional
/// GPS fusion, and document assembly. The inputs are read-only; the returned
/// tree is an independent value.
///
/// # Errors
/// Returns [`ReconError::InvalidInterval`] when the summary's end instant
/// precedes its start instant. Data-quality problems never fail the run.
pub fn reconstruct(
    summary: &WorkoutSummary,
    series: &serde_json::Value,
    track: Option<&[GpsFix]>,
    build: &BuildInfo,
) -> Result<TcxDocument> {
    let samples = normalize_series(series);
    info!(
        "[Recon] Workout {}: {} intraday samples over [{}, {}]",
        summary.id,
        samples.len(),
        summary.start,
        summary.end
    );

    let slots = build_timeline(summary.start, summary.end, &samples)?;
    let mut points = interpolate_fields(&slots);
    let mut stats = summarize(&points);

    if let Some(track) = track {
        stats.total_distance = fuse_track(&mut points, track, summary.start, summary.end);
        info!(
            "[Recon] Fused {} GPS fixes, geodesic distance {:.1} m",
            track.len(),
            stats.total_distance
        );
    }

    Ok(assemble(summary, &points, &stats, build))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_from_api_shape() {
        let summary: WorkoutSummary = serde_json::from_value(json!({
            "id": 7,
            "category": 6,
            "model": 93,
            "attrib": 7,
            "startdate": 1000,
            "enddate": 1600,
            "deviceid": "12345",
            "data": { "calories": 210.5, "hr_average": 131, "hr_max": 162, "steps": 0 }
        }))
        .unwrap();

        assert_eq!(summary.device_id.as_deref(), Some("12345"));
        assert_eq!(summary.start, 1000);
        assert_eq!(summary.duration(), 600);
        assert_eq!(summary.data.hr_average, Some(131));
        assert!(!summary.is_autodetected());
    }

    #[test]
    fn test_summary_missing_optionals() {
        let summary: WorkoutSummary = serde_json::from_value(json!({
            "id": 8,
            "category": 36,
            "startdate": 0,
            "enddate": 10
        }))
        .unwrap();

        assert_eq!(summary.model, 0);
        assert!(summary.device_id.is_none());
        assert!(summary.data.distance.is_none());
    }

    #[test]
    fn test_autodetected_flag() {
        let mut summary: WorkoutSummary = serde_json::from_value(json!({
            "id": 9,
            "category": 2,
            "startdate": 0,
            "enddate": 10
        }))
        .unwrap();

        summary.attrib = vocab::ATTRIB_AUTODETECTED;
        assert!(summary.is_autodetected());
    }

    #[test]
    fn test_gps_fix_validation() {
        assert!(GpsFix::new(0, 51.5074, -0.1278, None).is_valid());
        assert!(!GpsFix::new(0, 91.0, 0.0, None).is_valid());
        assert!(!GpsFix::new(0, 0.0, 181.0, None).is_valid());
        assert!(!GpsFix::new(0, f64::NAN, 0.0, None).is_valid());
    }
}
