//! Geometry functions shared by trajectory generation and the segment
//! controller.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Deserialize;

// Internal
use super::TrajError;
use crate::loc::Pose;
use util::maths::norm_angle_deg;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Lengths (and twice the areas) below this are treated as zero.
const GEOM_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Policy deciding how far the Bézier control points of a curve are pushed
/// away from the triangle's sides.
///
/// The offset is `base + scale * height / (chord + 1)`, clamped to
/// `[min_m, max_m]`, where `chord` is the length of the triangle's base and
/// `height` the distance of its apex from the base.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
pub struct OffsetPolicy {
    pub base: f64,
    pub scale: f64,
    pub min_m: f64,
    pub max_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OffsetPolicy {
    /// Compute the offset for the base chord `a -> b` and the apex `apex`.
    pub fn offset(
        &self,
        a: &Vector2<f64>,
        b: &Vector2<f64>,
        apex: &Vector2<f64>,
    ) -> Result<f64, TrajError> {
        let chord_m = distance(a, b);
        let height_m = point_line_distance(apex, a, b)?;

        Ok((self.base + self.scale * height_m / (chord_m + 1.0))
            .max(self.min_m)
            .min(self.max_m))
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Euclidean distance between two points.
pub fn distance(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    (b - a).norm()
}

/// Heading error between the robot and a target point.
///
/// This is the bearing of the target as seen from the robot minus the
/// robot's heading, in degrees, normalised into [-180, 180). Positive errors
/// mean the target is to the left.
pub fn heading_error_deg(target_m: &Vector2<f64>, pose: &Pose) -> f64 {
    let diff = target_m - pose.position2();
    let bearing_deg = norm_angle_deg(diff[1].atan2(diff[0]).to_degrees());

    norm_angle_deg(bearing_deg - norm_angle_deg(pose.heading_deg))
}

/// Unit left normal of a vector, i.e. the vector rotated by +90 degrees and
/// scaled to unit length.
pub fn unit_normal(v: &Vector2<f64>) -> Result<Vector2<f64>, TrajError> {
    let len = v.norm();

    if len < GEOM_EPSILON {
        return Err(TrajError::DegenerateChord);
    }

    Ok(Vector2::new(-v[1], v[0]) / len)
}

/// Perpendicular distance of `p` from the infinite line through `a` and `b`.
pub fn point_line_distance(
    p: &Vector2<f64>,
    a: &Vector2<f64>,
    b: &Vector2<f64>,
) -> Result<f64, TrajError> {
    let ab = b - a;
    let len = ab.norm();

    if len < GEOM_EPSILON {
        return Err(TrajError::DegenerateChord);
    }

    let ap = p - a;
    Ok((ab[0] * ap[1] - ab[1] * ap[0]).abs() / len)
}

/// Compute the two Bézier control points of a curve through `start`, `mid`
/// and `end`.
///
/// `CP1 = start + k (mid - start) + offset n(mid - start)` and
/// `CP2 = mid + k (end - mid) + offset n(end - mid)`, where `n` is the unit
/// left normal and the offset is evaluated on the chord `start -> end` with
/// `mid` as the apex.
pub fn control_points(
    start: &Vector2<f64>,
    mid: &Vector2<f64>,
    end: &Vector2<f64>,
    k: f64,
    policy: &OffsetPolicy,
) -> Result<(Vector2<f64>, Vector2<f64>), TrajError> {
    let first = mid - start;
    let second = end - mid;

    let offset = policy.offset(start, end, mid)?;

    let cp1 = start + k * first + offset * unit_normal(&first)?;
    let cp2 = mid + k * second + offset * unit_normal(&second)?;

    Ok((cp1, cp2))
}

/// Circumcentre of the triangle `a`, `b`, `c`.
pub fn circumcenter(
    a: &Vector2<f64>,
    b: &Vector2<f64>,
    c: &Vector2<f64>,
) -> Result<Vector2<f64>, TrajError> {
    let d = 2.0 * (a[0] * (b[1] - c[1]) + b[0] * (c[1] - a[1]) + c[0] * (a[1] - b[1]));

    if d.abs() < GEOM_EPSILON {
        return Err(TrajError::CollinearPoints(
            a[0], a[1], b[0], b[1], c[0], c[1],
        ));
    }

    let a2 = a.norm_squared();
    let b2 = b.norm_squared();
    let c2 = c.norm_squared();

    Ok(Vector2::new(
        (a2 * (b[1] - c[1]) + b2 * (c[1] - a[1]) + c2 * (a[1] - b[1])) / d,
        (a2 * (c[0] - b[0]) + b2 * (a[0] - c[0]) + c2 * (b[0] - a[0])) / d,
    ))
}
