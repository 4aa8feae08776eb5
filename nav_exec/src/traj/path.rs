//! # Waypoint sequences
//!
//! This module builds the sequence of waypoints followed on a segment.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::{
    bezier::sample_cubic,
    geom::{circumcenter, control_points, unit_normal, OffsetPolicy},
    CurveStyle, Params, TrajError,
};
use crate::route::Segment;
use util::maths::round_dp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The sequence of waypoints followed on a segment.
///
/// Once built the sequence is never modified.
#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct Waypoints {
    pub points_m: Vec<Vector2<f64>>,
}

/// Position of a segment in the route, as far as trajectory generation cares.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct LegContext {
    /// The segment is the first one of the route
    pub first_segment: bool,

    /// The segment is the last one of a route which returns to its origin
    pub closing_leg: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoints {
    /// Build the waypoints for the given segment.
    pub fn for_segment(
        segment: &Segment,
        ctx: LegContext,
        params: &Params,
    ) -> Result<Self, TrajError> {
        let waypoints = match segment {
            Segment::Linear { start_m, end_m } => {
                let mut wps = build_linear_path(
                    start_m,
                    end_m,
                    params.line_checkpoints,
                    params.line_round_decimals,
                );

                if let (true, Some(factor)) = (ctx.first_segment, params.line_lead_in_factor) {
                    wps.points_m
                        .insert(0, start_m - factor * (end_m - start_m));
                }

                wps
            }
            Segment::Curved {
                start_m,
                mid_m,
                end_m,
            } => match params.curve_style {
                CurveStyle::Simple => build_curved_path(
                    start_m,
                    mid_m,
                    end_m,
                    params.curve_samples,
                    params.control_point_const,
                    &params.offset,
                )?,
                CurveStyle::Softened if ctx.closing_leg => Self {
                    points_m: vec![*start_m, *mid_m, *end_m],
                },
                CurveStyle::Softened => build_softened_curved_path(start_m, mid_m, end_m, params)?,
            },
        };

        debug!(
            "Built {} waypoints for {:?} segment ({:?})",
            waypoints.len(),
            segment.kind(),
            ctx
        );

        Ok(waypoints)
    }

    /// A sequence made of a single point.
    pub fn single(point_m: Vector2<f64>) -> Self {
        Self {
            points_m: vec![point_m],
        }
    }

    pub fn len(&self) -> usize {
        self.points_m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points_m.is_empty()
    }

    /// Get the waypoint at the given index, if it exists.
    pub fn get(&self, index: usize) -> Option<&Vector2<f64>> {
        self.points_m.get(index)
    }

    /// Index of the last waypoint, `None` if the sequence is empty.
    pub fn last_index(&self) -> Option<usize> {
        self.points_m.len().checked_sub(1)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build a linear path from `start` to `end` with `num_interior` evenly spaced
/// points in between.
///
/// The interior points sit at `i / (num_interior + 1)` along the segment and
/// are rounded to `decimals` decimal places. The path holds
/// `num_interior + 2` points.
pub fn build_linear_path(
    start_m: &Vector2<f64>,
    end_m: &Vector2<f64>,
    num_interior: usize,
    decimals: u32,
) -> Waypoints {
    let delta = (end_m - start_m) / (num_interior + 1) as f64;

    let mut points_m = Vec::with_capacity(num_interior + 2);
    points_m.push(*start_m);

    for i in 1..=num_interior {
        let p = start_m + i as f64 * delta;
        points_m.push(Vector2::new(
            round_dp(p[0], decimals),
            round_dp(p[1], decimals),
        ));
    }

    points_m.push(*end_m);

    Waypoints { points_m }
}

/// Build a curved path through `start`, `mid` and `end`.
///
/// The path is made of the arcs `start -> CP1 -> CP1 -> mid` and
/// `mid -> CP2 -> CP2 -> end`, each sampled `num_samples` times.
pub fn build_curved_path(
    start_m: &Vector2<f64>,
    mid_m: &Vector2<f64>,
    end_m: &Vector2<f64>,
    num_samples: usize,
    control_point_const: f64,
    offset: &OffsetPolicy,
) -> Result<Waypoints, TrajError> {
    let (cp1, cp2) = control_points(start_m, mid_m, end_m, control_point_const, offset)?;

    let mut points_m = sample_cubic(start_m, &cp1, &cp1, mid_m, num_samples);
    points_m.extend(sample_cubic(mid_m, &cp2, &cp2, end_m, num_samples));

    Ok(Waypoints { points_m })
}

/// Build a softened curved path through `start`, `mid` and `end`.
///
/// The mid point is pushed `mid_shift_m` away from the chord `start -> end`.
/// The circumcentre of the triangle gives a radial direction at `end`, along
/// which the approach points are placed. The second arc finishes on the
/// furthest approach point, the remaining ones and `end` follow.
pub fn build_softened_curved_path(
    start_m: &Vector2<f64>,
    mid_m: &Vector2<f64>,
    end_m: &Vector2<f64>,
    params: &Params,
) -> Result<Waypoints, TrajError> {
    let shifted_mid_m = mid_m + params.mid_shift_m * unit_normal(&(end_m - start_m))?;

    let centre_m = circumcenter(start_m, mid_m, end_m)?;
    let radial = unit_normal(&(end_m - centre_m))?;

    let [far_m, near_m, nearest_m] = params.approach_dists_m;
    let arc_end_m = end_m + far_m * radial;

    let mut wps = build_curved_path(
        start_m,
        &shifted_mid_m,
        &arc_end_m,
        params.curve_samples,
        params.control_point_const,
        &params.offset,
    )?;

    wps.points_m.push(end_m + near_m * radial);
    wps.points_m.push(end_m + nearest_m * radial);
    wps.points_m.push(*end_m);

    Ok(wps)
}
