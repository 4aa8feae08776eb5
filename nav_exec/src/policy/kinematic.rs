//! Closed form kinematic velocity law

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Deserialize;

// Internal
use super::*;
use util::maths::{lin_map, norm_angle_deg};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the kinematic law
#[derive(Deserialize, Debug, Copy, Clone)]
pub struct KinematicParams {
    /// Gain applied to the heading error (after the angular acceleration) to
    /// get the turn rate.
    pub angular_gain: f64,

    /// Extra turn rate gain on curved segments
    pub curve_angular_gain: f64,

    /// Heading errors strictly above this switch to reverse driving.
    ///
    /// Units: degrees
    pub reverse_threshold_deg: f64,

    /// Linear segments: speed gain used while heading for the first waypoint
    pub speed_const: f64,

    /// Linear segments: degrees of heading error tolerated per meter of
    /// distance while heading for the first waypoint.
    pub distance_turn_const: f64,

    /// Linear segments: heading error under which the robot drives.
    ///
    /// Units: degrees
    pub max_angle_deg: f64,

    /// Linear segments: speed used past the first waypoint
    ///
    /// Units: meters/second
    pub cruise_speed_ms: f64,

    /// Curved segments: speed gain
    pub curve_speed: f64,

    /// Curved segments: speed multiplier on the last segment of the route
    pub final_leg_mult: f64,

    /// Curved segments: speed multiplier on other segments
    pub leg_mult: f64,
}

/// Velocity policy based on the robot's kinematic limits.
pub struct KinematicPolicy {
    params: KinematicParams,
    limits: RobotLimits,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl KinematicPolicy {
    pub fn new(params: KinematicParams, limits: RobotLimits) -> Self {
        Self { params, limits }
    }

    /// Turn rate for the given (possibly reverse remapped) heading error.
    fn turn_rate_rads(&self, head_err_deg: f64, kind: SegmentKind) -> f64 {
        let max = self.limits.max_turn_rate_rads;

        let turn = (head_err_deg.to_radians() * self.limits.angular_accel * self.params.angular_gain)
            .max(-max)
            .min(max);

        match kind {
            SegmentKind::Linear => turn,
            SegmentKind::Curved => (turn * self.params.curve_angular_gain).max(-max).min(max),
        }
    }

    /// Speed magnitude for the given (possibly reverse remapped) heading error.
    fn speed_ms(&self, head_err_deg: f64, input: &PolicyInput) -> f64 {
        let p = &self.params;
        let err_abs_deg = head_err_deg.abs();

        match input.segment_kind {
            SegmentKind::Linear => {
                let budget_deg = (input.distance_m * p.distance_turn_const).max(p.max_angle_deg);

                if input.checkpoint_index == 0 && err_abs_deg < budget_deg {
                    (input.distance_m * self.limits.linear_accel * p.speed_const)
                        .min(self.limits.max_speed_ms)
                } else if input.checkpoint_index != 0 && err_abs_deg < p.max_angle_deg {
                    p.cruise_speed_ms
                } else {
                    0.0
                }
            }
            SegmentKind::Curved => {
                let heading_factor = lin_map((0.0, 90.0), (1.0, 0.0), err_abs_deg).max(0.0);
                let leg_mult = if input.final_leg {
                    p.final_leg_mult
                } else {
                    p.leg_mult
                };

                (input.distance_m
                    * self.limits.linear_accel
                    * p.curve_speed
                    * heading_factor
                    * leg_mult)
                    .min(self.limits.max_speed_ms)
            }
        }
    }
}

impl VelocityPolicy for KinematicPolicy {
    fn compute(&self, input: &PolicyInput) -> Result<PolicyOutput, PolicyError> {
        // Drive backwards towards targets behind the robot
        let (mode, head_err_deg) = if input.head_err_deg.abs() > self.params.reverse_threshold_deg {
            (MoveMode::Reverse, norm_angle_deg(input.head_err_deg - 180.0))
        } else {
            (MoveMode::Forward, input.head_err_deg)
        };

        let output = PolicyOutput {
            speed_ms: self.speed_ms(head_err_deg, input),
            turn_rate_rads: self.turn_rate_rads(head_err_deg, input.segment_kind),
            mode,
        };

        trace!(
            "Kinematic policy: err {:.2} deg -> {:?} {:.3} m/s, {:.3} rad/s",
            head_err_deg,
            output.mode,
            output.speed_ms,
            output.turn_rate_rads
        );

        Ok(output)
    }
}
