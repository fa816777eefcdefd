//! Track geometry simplification.
//!
//! Removes points where the track is nearly straight while keeping points
//! where direction changes, so exported files stay small without losing the
//! shape of the path. Points are projected to planar Web Mercator meters
//! before comparison so a tolerance in meters means the same thing at every
//! latitude; the retained output points are the original, unprojected inputs.

use crate::geo::{mercator_x, mercator_y};
use crate::position::Position;

/// A projected point carrying the index of the input it came from.
#[derive(Clone, Copy)]
struct PlanarPoint {
    x: f64,
    y: f64,
    index: usize,
}

fn sq_dist(a: &PlanarPoint, b: &PlanarPoint) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Squared distance from `p` to the segment `a`-`b`, clamped to the
/// segment endpoints.
fn sq_seg_dist(p: &PlanarPoint, a: &PlanarPoint, b: &PlanarPoint) -> f64 {
    let mut x = a.x;
    let mut y = a.y;
    let mut dx = b.x - x;
    let mut dy = b.y - y;

    if dx != 0.0 || dy != 0.0 {
        let t = ((p.x - x) * dx + (p.y - y) * dy) / (dx * dx + dy * dy);
        if t > 1.0 {
            x = b.x;
            y = b.y;
        } else if t > 0.0 {
            x += dx * t;
            y += dy * t;
        }
    }

    dx = p.x - x;
    dy = p.y - y;
    dx * dx + dy * dy
}

/// Distance-based pre-pass: drop points radially closer than the tolerance
/// to the previously kept point. Always keeps the final point.
fn simplify_radial(points: &[PlanarPoint], sq_tolerance: f64) -> Vec<PlanarPoint> {
    let mut prev = points[0];
    let mut kept = vec![prev];

    for point in &points[1..] {
        if sq_dist(point, &prev) > sq_tolerance {
            kept.push(*point);
            prev = *point;
        }
    }

    if let Some(last) = points.last() {
        if prev.index != last.index {
            kept.push(*last);
        }
    }

    kept
}

fn douglas_peucker_step(
    points: &[PlanarPoint],
    first: usize,
    last: usize,
    sq_tolerance: f64,
    kept: &mut Vec<PlanarPoint>,
) {
    let mut max_sq_dist = sq_tolerance;
    let mut split = first;

    for i in (first + 1)..last {
        let d = sq_seg_dist(&points[i], &points[first], &points[last]);
        if d > max_sq_dist {
            split = i;
            max_sq_dist = d;
        }
    }

    if max_sq_dist > sq_tolerance {
        if split - first > 1 {
            douglas_peucker_step(points, first, split, sq_tolerance, kept);
        }
        kept.push(points[split]);
        if last - split > 1 {
            douglas_peucker_step(points, split, last, sq_tolerance, kept);
        }
    }
}

fn simplify_douglas_peucker(points: &[PlanarPoint], sq_tolerance: f64) -> Vec<PlanarPoint> {
    let last = points.len() - 1;
    let mut kept = vec![points[0]];
    douglas_peucker_step(points, 0, last, sq_tolerance, &mut kept);
    kept.push(points[last]);
    kept
}

/// Reduce `points` to a subsequence whose shape deviates from the input by
/// at most `tolerance_m` meters. A non-positive tolerance disables
/// simplification and returns the input unchanged, as do inputs of fewer
/// than three points. With `high_quality` the radial pre-pass is skipped
/// and only Douglas-Peucker runs.
pub fn simplify_track(points: &[Position], tolerance_m: f64, high_quality: bool) -> Vec<Position> {
    if tolerance_m <= 0.0 || points.len() < 3 {
        return points.to_vec();
    }

    let projected: Vec<PlanarPoint> = points
        .iter()
        .enumerate()
        .map(|(index, p)| PlanarPoint {
            x: mercator_x(p.longitude),
            y: mercator_y(p.latitude),
            index,
        })
        .collect();

    let sq_tolerance = tolerance_m * tolerance_m;

    let reduced = if high_quality {
        simplify_douglas_peucker(&projected, sq_tolerance)
    } else {
        let radial = simplify_radial(&projected, sq_tolerance);
        if radial.len() < 3 {
            radial
        } else {
            simplify_douglas_peucker(&radial, sq_tolerance)
        }
    };

    reduced.iter().map(|p| points[p.index].clone()).collect()
}
