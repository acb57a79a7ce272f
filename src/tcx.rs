//! TCX document tree and assembler.
//!
//! The assembler is a pure mapping stage: given the workout summary, the
//! interpolated timeline, and its derived stats, it produces the
//! TrainingCenterDatabase v2 tree — one activity, one lap, one track, one
//! trackpoint per timeline instant — with no numeric derivation of its own.
//! Serialization of the tree is handled by [`crate::xml`]; writing bytes to
//! storage stays with the caller.

use chrono::{SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::interpolate::TimelineStats;
use crate::vocab::{self, Sport};
use crate::{BuildInfo, ReconstructedPoint, WorkoutSummary};

/// Complete in-memory training-log document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcxDocument {
    pub activity: TcxActivity,
    pub author: TcxAuthor,
}

/// One exercise activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcxActivity {
    /// Coarse sport category
    pub sport: Sport,
    /// Activity identifier: the start instant in RFC 3339
    pub id: String,
    /// Human-readable category and attribution
    pub notes: String,
    /// The single lap covering the whole workout interval
    pub lap: TcxLap,
    /// Capturing device metadata
    pub creator: TcxCreator,
}

/// Lap-level aggregates and the trackpoint sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcxLap {
    /// Lap start instant (RFC 3339)
    pub start_time: String,
    /// Elapsed time in seconds
    pub total_time_seconds: f64,
    /// Total distance in meters
    pub distance_meters: f64,
    /// Calories burned
    pub calories: u32,
    /// Average heart rate, present only when greater than zero
    pub average_heart_rate: Option<u32>,
    /// Maximum heart rate, present only when greater than zero
    pub maximum_heart_rate: Option<u32>,
    /// Fixed intensity marker
    pub intensity: String,
    /// Average cadence, present only when greater than zero
    pub cadence: Option<u32>,
    /// Fixed trigger marker
    pub trigger_method: String,
    /// One trackpoint per timeline instant
    pub track: Vec<TcxTrackpoint>,
}

/// A position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TcxPosition {
    pub latitude_degrees: f64,
    pub longitude_degrees: f64,
}

/// One second of the reconstructed track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcxTrackpoint {
    /// Instant (RFC 3339)
    pub time: String,
    /// Position, when GPS fusion covered this instant
    pub position: Option<TcxPosition>,
    /// Elevation in meters, when known
    pub altitude_meters: Option<f64>,
    /// Cumulative distance in meters
    pub distance_meters: f64,
    /// Heart rate, when measured anywhere in the interval
    pub heart_rate_bpm: Option<u32>,
    /// Cadence in steps per minute
    pub cadence: u32,
    /// Fixed sensor marker
    pub sensor_state: String,
}

/// Fixed four-part version block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcxVersion {
    pub major: u32,
    pub minor: u32,
    pub build_major: u32,
    pub build_minor: u32,
}

impl Default for TcxVersion {
    fn default() -> Self {
        Self {
            major: 1,
            minor: 0,
            build_major: 0,
            build_minor: 0,
        }
    }
}

/// Capturing-device block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcxCreator {
    /// Device model display name
    pub name: String,
    /// Device unit identifier (0 when unknown)
    pub unit_id: u64,
    /// Device model code
    pub product_id: u32,
    pub version: TcxVersion,
}

/// Authoring-application block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcxAuthor {
    /// Builder identifier supplied by the caller
    pub name: String,
    pub version: TcxVersion,
    /// Build timestamp supplied by the caller
    pub build_time: String,
    pub lang_id: String,
    pub part_number: String,
}

/// Format an epoch-second instant as an RFC 3339 UTC timestamp.
pub fn format_instant(epoch: i64) -> String {
    Utc.timestamp_opt(epoch, 0)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| epoch.to_string())
}

/// Assemble the document tree from the summary, the interpolated timeline,
/// and its derived stats.
pub fn assemble(
    summary: &WorkoutSummary,
    points: &[ReconstructedPoint],
    stats: &TimelineStats,
    build: &BuildInfo,
) -> TcxDocument {
    let start_time = format_instant(summary.start);
    let cadence = stats.average_cadence.round() as u32;

    TcxDocument {
        activity: TcxActivity {
            sport: vocab::sport_for_category(summary.category),
            id: start_time.clone(),
            notes: format!(
                "{} ({})",
                vocab::category_name(summary.category),
                vocab::attrib_description(summary.attrib)
            ),
            lap: TcxLap {
                start_time,
                total_time_seconds: summary.duration() as f64,
                distance_meters: stats.total_distance,
                calories: summary.data.calories.map(|c| c.round() as u32).unwrap_or(0),
                average_heart_rate: summary.data.hr_average.filter(|&hr| hr > 0),
                maximum_heart_rate: summary.data.hr_max.filter(|&hr| hr > 0),
                intensity: "Active".to_string(),
                cadence: (cadence > 0).then_some(cadence),
                trigger_method: "Manual".to_string(),
                track: points.iter().map(trackpoint).collect(),
            },
            creator: TcxCreator {
                name: vocab::device_model_name(summary.model).to_string(),
                unit_id: summary
                    .device_id
                    .as_deref()
                    .and_then(|id| id.trim().parse().ok())
                    .unwrap_or(0),
                product_id: summary.model,
                version: TcxVersion::default(),
            },
        },
        author: TcxAuthor {
            name: build.builder.clone(),
            version: TcxVersion::default(),
            build_time: build.time.clone(),
            lang_id: "en".to_string(),
            part_number: "000-00000-00".to_string(),
        },
    }
}

fn trackpoint(point: &ReconstructedPoint) -> TcxTrackpoint {
    TcxTrackpoint {
        time: format_instant(point.instant),
        position: match (point.latitude, point.longitude) {
            (Some(lat), Some(lon)) => Some(TcxPosition {
                latitude_degrees: lat,
                longitude_degrees: lon,
            }),
            _ => None,
        },
        altitude_meters: point.elevation,
        distance_meters: point.distance,
        heart_rate_bpm: point.heart_rate.map(|hr| hr.round() as u32),
        cadence: point.cadence.round() as u32,
        sensor_state: "Present".to_string(),
    }
}
