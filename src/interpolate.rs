//! Per-field interpolation over the merged timeline.
//!
//! Three independent passes resolve heart rate, cadence, and cumulative
//! distance for every timeline instant. All passes share a time-weighted
//! linear interpolation core and differ only in how the sparse real series
//! is derived and which edge-fill policy applies:
//!
//! - heart rate: measured values, nearest-value clamp at both edges; unset
//!   everywhere when no measurement exists in the interval
//! - cadence: `60 * steps / duration` per real sample, same policy as heart
//!   rate, zero everywhere when underivable
//! - distance: running sum of real deltas, zero before the first delta and
//!   forward-filled after the last (distance not yet traveled is never
//!   fabricated)

use log::debug;
use serde::{Deserialize, Serialize};

use crate::timeline::TimelinePoint;
use crate::ReconstructedPoint;

/// Edge-fill policy applied outside the span of real measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeFill {
    /// Clamp to the nearest real value on both sides.
    Clamp,
    /// Zero before the first real value, clamp after the last.
    ZeroStart,
    /// Leave instants outside the measured span unset.
    None,
}

/// Time-weighted linear interpolation of a sparse series onto `instants`.
///
/// `knots` must be sorted ascending by instant, as must `instants`. With no
/// knots at all, every output is `None` regardless of policy.
pub(crate) fn interpolate_series(
    instants: &[i64],
    knots: &[(i64, f64)],
    edge: EdgeFill,
) -> Vec<Option<f64>> {
    if knots.is_empty() {
        return vec![None; instants.len()];
    }

    let (first_t, first_v) = knots[0];
    let (last_t, last_v) = knots[knots.len() - 1];

    let mut out = Vec::with_capacity(instants.len());
    let mut idx = 0usize;

    for &t in instants {
        if t < first_t {
            out.push(match edge {
                EdgeFill::Clamp => Some(first_v),
                EdgeFill::ZeroStart => Some(0.0),
                EdgeFill::None => None,
            });
        } else if t > last_t {
            out.push(match edge {
                EdgeFill::Clamp | EdgeFill::ZeroStart => Some(last_v),
                EdgeFill::None => None,
            });
        } else {
            while idx + 1 < knots.len() && knots[idx + 1].0 < t {
                idx += 1;
            }
            let (t0, v0) = knots[idx];
            if t <= t0 {
                out.push(Some(v0));
            } else {
                let (t1, v1) = knots[idx + 1];
                let w = (t - t0) as f64 / (t1 - t0) as f64;
                out.push(Some(v0 + w * (v1 - v0)));
            }
        }
    }

    out
}

/// Measured heart-rate series over the real samples.
fn heart_rate_knots(timeline: &[TimelinePoint]) -> Vec<(i64, f64)> {
    timeline
        .iter()
        .filter_map(|p| p.sample.as_ref())
        .filter_map(|s| s.heart_rate.map(|hr| (s.instant, f64::from(hr))))
        .collect()
}

/// Instantaneous cadence series derived per real sample as
/// `60 * steps / duration` (steps per minute). Samples without both fields
/// or with a zero duration contribute nothing.
fn cadence_knots(timeline: &[TimelinePoint]) -> Vec<(i64, f64)> {
    timeline
        .iter()
        .filter_map(|p| p.sample.as_ref())
        .filter_map(|s| match (s.steps, s.duration) {
            (Some(steps), Some(duration)) if duration > 0 => {
                Some((s.instant, 60.0 * f64::from(steps) / f64::from(duration)))
            }
            _ => None,
        })
        .collect()
}

/// Cumulative distance series over the real samples. Synthetic points
/// contribute no delta; negative deltas would break monotonicity and are
/// clamped to zero.
fn distance_knots(timeline: &[TimelinePoint]) -> Vec<(i64, f64)> {
    let mut cumulative = 0.0;
    timeline
        .iter()
        .filter_map(|p| p.sample.as_ref())
        .filter_map(|s| {
            s.distance.map(|delta| {
                cumulative += delta.max(0.0);
                (s.instant, cumulative)
            })
        })
        .collect()
}

/// Resolve heart rate, cadence, and cumulative distance for every timeline
/// instant.
///
/// # Example
/// ```
/// use trackweave::{build_timeline, interpolate_fields, IntradaySample};
///
/// let mut sample = IntradaySample::new(105);
/// sample.steps = Some(72);
/// sample.duration = Some(60);
///
/// let timeline = build_timeline(100, 110, &[sample]).unwrap();
/// let points = interpolate_fields(&timeline);
///
/// // A single 72-steps-over-60s sample pins cadence at 72 spm everywhere.
/// assert!(points.iter().all(|p| p.cadence == 72.0));
/// // No heart-rate sample anywhere: the field stays unset.
/// assert!(points.iter().all(|p| p.heart_rate.is_none()));
/// ```
pub fn interpolate_fields(timeline: &[TimelinePoint]) -> Vec<ReconstructedPoint> {
    let instants: Vec<i64> = timeline.iter().map(|p| p.instant).collect();

    let hr_knots = heart_rate_knots(timeline);
    let cad_knots = cadence_knots(timeline);
    let dist_knots = distance_knots(timeline);
    debug!(
        "[Interpolate] {} instants, knots: hr={} cadence={} distance={}",
        instants.len(),
        hr_knots.len(),
        cad_knots.len(),
        dist_knots.len()
    );

    let heart_rate = interpolate_series(&instants, &hr_knots, EdgeFill::Clamp);
    let cadence = interpolate_series(&instants, &cad_knots, EdgeFill::Clamp);
    let distance = interpolate_series(&instants, &dist_knots, EdgeFill::ZeroStart);

    timeline
        .iter()
        .enumerate()
        .map(|(i, slot)| ReconstructedPoint {
            instant: slot.instant,
            synthetic: slot.synthetic,
            heart_rate: heart_rate[i],
            cadence: cadence[i].unwrap_or(0.0),
            distance: distance[i].unwrap_or(0.0),
            latitude: None,
            longitude: None,
            elevation: None,
        })
        .collect()
}

/// Aggregates derived from the interpolated timeline for the lap summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineStats {
    /// Final cumulative distance in meters
    pub total_distance: f64,
    /// Mean cadence across all points, steps per minute
    pub average_cadence: f64,
}

/// Summarize the interpolated timeline.
pub fn summarize(points: &[ReconstructedPoint]) -> TimelineStats {
    let total_distance = points.last().map(|p| p.distance).unwrap_or(0.0);
    let average_cadence = if points.is_empty() {
        0.0
    } else {
        points.iter().map(|p| p.cadence).sum::<f64>() / points.len() as f64
    };
    TimelineStats {
        total_distance,
        average_cadence,
    }
}
