//! Timeline resampling.
//!
//! Builds the dense 1 Hz instant grid spanning the workout interval and
//! merges it with the real sample instants. Real samples always win over
//! synthetic placeholders; the output is sorted, strictly increasing, and
//! free of duplicate instants.

use std::collections::BTreeMap;

use log::debug;

use crate::error::{ReconError, Result};
use crate::IntradaySample;

/// One slot of the merged timeline before interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelinePoint {
    /// Instant (epoch seconds)
    pub instant: i64,
    /// True for grid placeholders, false for real sample instants
    pub synthetic: bool,
    /// The real sample at this instant, if any
    pub sample: Option<IntradaySample>,
}

/// Build the merged timeline for the inclusive interval `[start, end]`.
///
/// The grid contains one synthetic point per whole second; sample instants
/// replace their grid placeholder (and extend the timeline if they fall
/// outside the grid). When several samples share an instant, the later one
/// in input order wins, consistent with a mapping keyed by instant.
///
/// # Errors
/// Returns [`ReconError::InvalidInterval`] when `end < start`.
pub fn build_timeline(start: i64, end: i64, samples: &[IntradaySample]) -> Result<Vec<TimelinePoint>> {
    if end < start {
        return Err(ReconError::InvalidInterval { start, end });
    }

    let mut merged: BTreeMap<i64, TimelinePoint> = (start..=end)
        .map(|instant| {
            (
                instant,
                TimelinePoint {
                    instant,
                    synthetic: true,
                    sample: None,
                },
            )
        })
        .collect();

    for sample in samples {
        merged.insert(
            sample.instant,
            TimelinePoint {
                instant: sample.instant,
                synthetic: false,
                sample: Some(sample.clone()),
            },
        );
    }

    debug!(
        "[Timeline] {} instants over [{}, {}], {} real",
        merged.len(),
        start,
        end,
        merged.values().filter(|p| !p.synthetic).count()
    );

    Ok(merged.into_values().collect())
}
