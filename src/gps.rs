//! GPS track alignment and geodesic distance.
//!
//! Fuses an independently-recorded GPS track into the reconstructed
//! timeline: the track is trimmed to one bracketing fix on each side of the
//! workout interval, positions are time-interpolated onto the timeline with
//! no edge fill (instants outside the true GPS coverage stay unpositioned),
//! and a cumulative geodesic distance series replaces the sample-derived
//! one.

use geo::{Distance, Haversine, Point};
use log::{debug, warn};

use crate::interpolate::{interpolate_series, EdgeFill};
use crate::{GpsFix, ReconstructedPoint};

/// Trim a track to the workout interval plus one bracketing fix per side.
///
/// Keeps the single closest fix before `start` and the single closest fix
/// after `end` (when they exist) together with every fix inside
/// `[start, end]`, so interpolation has coverage at both boundaries.
/// Invalid fixes are discarded; fixes sharing an instant keep the first
/// occurrence in input order.
pub fn trim_track(track: &[GpsFix], start: i64, end: i64) -> Vec<GpsFix> {
    let mut sorted: Vec<GpsFix> = track.iter().filter(|f| f.is_valid()).copied().collect();
    sorted.sort_by_key(|f| f.time);
    sorted.dedup_by_key(|f| f.time);

    let before = sorted.iter().rfind(|f| f.time < start).copied();
    let after = sorted.iter().find(|f| f.time > end).copied();

    let mut trimmed = Vec::new();
    trimmed.extend(before);
    trimmed.extend(sorted.iter().filter(|f| f.time >= start && f.time <= end));
    trimmed.extend(after);
    trimmed
}

/// Great-circle distance between two positioned points, in meters. When
/// both points carry an elevation the climb is folded in.
fn step_distance(a: &ReconstructedPoint, b: &ReconstructedPoint) -> f64 {
    let (Some(lat_a), Some(lon_a)) = (a.latitude, a.longitude) else {
        return 0.0;
    };
    let (Some(lat_b), Some(lon_b)) = (b.latitude, b.longitude) else {
        return 0.0;
    };

    let flat = Haversine::distance(Point::new(lon_a, lat_a), Point::new(lon_b, lat_b));
    match (a.elevation, b.elevation) {
        (Some(ele_a), Some(ele_b)) => (flat * flat + (ele_b - ele_a) * (ele_b - ele_a)).sqrt(),
        _ => flat,
    }
}

/// Fuse a GPS track into the reconstructed timeline.
///
/// Positions and elevations are time-interpolated onto every timeline
/// instant; the cumulative distance of each point is replaced by the
/// geodesic series, with unpositioned pairs contributing zero. Returns the
/// final total distance for the lap summary.
///
/// In-range fixes land on grid instants (fix times are epoch seconds), so
/// interpolation at those instants reproduces the raw fix, which is how the
/// merge keeps real fixes authoritative over interpolated positions.
pub fn fuse_track(
    points: &mut [ReconstructedPoint],
    track: &[GpsFix],
    start: i64,
    end: i64,
) -> f64 {
    let trimmed = trim_track(track, start, end);
    if trimmed.is_empty() {
        warn!(
            "[Gps] No usable fixes for [{}, {}]; timeline stays unpositioned",
            start, end
        );
    } else {
        let (first, last) = (trimmed[0].time, trimmed[trimmed.len() - 1].time);
        if first > start || last < end {
            warn!(
                "[Gps] Track covers [{}, {}] of workout [{}, {}]; uncovered edges stay unpositioned",
                first, last, start, end
            );
        }
    }

    let instants: Vec<i64> = points.iter().map(|p| p.instant).collect();
    let lat_knots: Vec<(i64, f64)> = trimmed.iter().map(|f| (f.time, f.latitude)).collect();
    let lon_knots: Vec<(i64, f64)> = trimmed.iter().map(|f| (f.time, f.longitude)).collect();
    let ele_knots: Vec<(i64, f64)> = trimmed
        .iter()
        .filter_map(|f| f.elevation.map(|e| (f.time, e)))
        .collect();

    let latitudes = interpolate_series(&instants, &lat_knots, EdgeFill::None);
    let longitudes = interpolate_series(&instants, &lon_knots, EdgeFill::None);
    let elevations = interpolate_series(&instants, &ele_knots, EdgeFill::None);

    for (i, point) in points.iter_mut().enumerate() {
        point.latitude = latitudes[i];
        point.longitude = longitudes[i];
        point.elevation = elevations[i];
    }

    let mut cumulative = 0.0;
    if let Some(first) = points.first_mut() {
        first.distance = 0.0;
    }
    for i in 1..points.len() {
        cumulative += step_distance(&points[i - 1], &points[i]);
        points[i].distance = cumulative;
    }

    debug!(
        "[Gps] {} of {} points positioned, geodesic distance {:.1} m",
        points.iter().filter(|p| p.has_position()).count(),
        points.len(),
        cumulative
    );
    cumulative
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_timeline, interpolate_fields};

    fn fix(time: i64, lat: f64, lon: f64) -> GpsFix {
        GpsFix::new(time, lat, lon, None)
    }

    fn bare_points(start: i64, end: i64) -> Vec<ReconstructedPoint> {
        interpolate_fields(&build_timeline(start, end, &[]).unwrap())
    }

    #[test]
    fn test_trim_keeps_brackets() {
        let track = vec![
            fix(90, 51.500, -0.120),
            fix(100, 51.501, -0.121),
            fix(110, 51.502, -0.122),
            fix(200, 51.503, -0.123),
            fix(210, 51.504, -0.124),
        ];
        let trimmed = trim_track(&track, 100, 200);
        let times: Vec<i64> = trimmed.iter().map(|f| f.time).collect();

        assert_eq!(times, vec![90, 100, 110, 200, 210]);
    }

    #[test]
    fn test_trim_without_brackets() {
        let track = vec![fix(100, 51.5, -0.1), fix(150, 51.6, -0.2)];
        let trimmed = trim_track(&track, 100, 200);
        let times: Vec<i64> = trimmed.iter().map(|f| f.time).collect();

        assert_eq!(times, vec![100, 150]);
    }

    #[test]
    fn test_trim_sorts_and_drops_invalid() {
        let track = vec![
            fix(150, 51.6, -0.2),
            fix(100, 51.5, -0.1),
            fix(120, 91.0, -0.1), // invalid latitude
        ];
        let trimmed = trim_track(&track, 100, 200);
        let times: Vec<i64> = trimmed.iter().map(|f| f.time).collect();

        assert_eq!(times, vec![100, 150]);
    }

    #[test]
    fn test_trim_duplicate_instant_first_wins() {
        let track = vec![fix(100, 51.5, -0.1), fix(100, 40.0, -74.0)];
        let trimmed = trim_track(&track, 100, 200);

        assert_eq!(trimmed.len(), 1);
        assert_eq!(trimmed[0].latitude, 51.5);
    }

    #[test]
    fn test_fuse_positions_and_interpolates() {
        let mut points = bare_points(100, 104);
        let track = vec![fix(100, 51.500, -0.100), fix(104, 51.504, -0.104)];
        fuse_track(&mut points, &track, 100, 104);

        assert!(points.iter().all(|p| p.has_position()));
        // Midpoint of a 4-second gap, time-weighted
        let mid = &points[2];
        assert!((mid.latitude.unwrap() - 51.502).abs() < 1e-9);
        assert!((mid.longitude.unwrap() - -0.102).abs() < 1e-9);
    }

    #[test]
    fn test_fuse_leaves_uncovered_edges_unpositioned() {
        let mut points = bare_points(100, 110);
        // Coverage only starts at 105; no fix precedes the workout.
        let track = vec![fix(105, 51.5, -0.1), fix(110, 51.6, -0.2)];
        fuse_track(&mut points, &track, 100, 110);

        assert!(!points[0].has_position());
        assert!(!points[4].has_position());
        assert!(points[5].has_position());
        assert!(points[10].has_position());
    }

    #[test]
    fn test_fuse_distance_monotonic_and_total() {
        let mut points = bare_points(100, 110);
        let track = vec![fix(100, 51.500, -0.100), fix(110, 51.510, -0.100)];
        let total = fuse_track(&mut points, &track, 100, 110);

        assert!(total > 0.0);
        assert_eq!(points.last().unwrap().distance, total);
        for pair in points.windows(2) {
            assert!(pair[1].distance >= pair[0].distance);
        }
        // ~0.01 degrees of latitude is roughly 1.1 km
        assert!(total > 1000.0 && total < 1300.0);
    }

    #[test]
    fn test_fuse_unpositioned_pairs_contribute_zero() {
        let mut points = bare_points(100, 110);
        let track = vec![fix(104, 51.500, -0.100), fix(106, 51.501, -0.100)];
        let total = fuse_track(&mut points, &track, 100, 110);

        // Distance accrues only across the positioned span
        assert_eq!(points[3].distance, 0.0);
        assert_eq!(points.last().unwrap().distance, total);
        assert!(total > 0.0);
    }

    #[test]
    fn test_fuse_elevation_missing_on_one_side() {
        let mut points = bare_points(100, 102);
        let track = vec![
            GpsFix::new(100, 51.500, -0.100, Some(20.0)),
            GpsFix::new(102, 51.501, -0.100, None),
        ];
        // Must not fail; the pair falls back to the flat distance.
        let total = fuse_track(&mut points, &track, 100, 102);
        assert!(total > 0.0);
    }

    #[test]
    fn test_fuse_empty_track_zeroes_distance() {
        let mut points = bare_points(100, 105);
        let total = fuse_track(&mut points, &[], 100, 105);

        assert_eq!(total, 0.0);
        assert!(points.iter().all(|p| !p.has_position()));
        assert!(points.iter().all(|p| p.distance == 0.0));
    }

    #[test]
    fn test_step_distance_3d_exceeds_flat() {
        let mut a = bare_points(0, 0).remove(0);
        a.latitude = Some(51.500);
        a.longitude = Some(-0.100);
        let mut b = a.clone();
        b.latitude = Some(51.501);

        let flat = step_distance(&a, &b);
        a.elevation = Some(0.0);
        b.elevation = Some(50.0);
        let climb = step_distance(&a, &b);

        assert!(climb > flat);
    }
}
