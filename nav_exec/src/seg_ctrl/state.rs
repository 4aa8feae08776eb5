//! Segment control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use serde::Serialize;

// Internal
use super::*;
use crate::{
    loc::Pose,
    policy::{
        fuzzy::RuleBase, FuzzyError, FuzzyPolicy, KinematicPolicy, MoveMode, PolicyError,
        PolicyInput, PolicyKind, RobotLimits, VelocityPolicy,
    },
    route::{RouteConfig, Segment},
    traj::{
        geom::{distance, heading_error_deg},
        ParamsError, TrajError, Waypoints,
    },
};
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct SegCtrl {
    params: Params,

    /// The velocity policy selected by the parameters
    policy: Box<dyn VelocityPolicy>,

    /// The goal segment assigned by the last call to `set_goal`
    segment: Option<Segment>,

    tracker: CheckpointTracker,

    report: StatusReport,
}

/// A velocity command for the robot.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct VelocityCmd {
    /// Signed linear speed, negative when reversing
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Units: radians/second, counter-clockwise positive
    pub turn_rate_rads: f64,
}

/// The status report containing the progress and the quantities computed in
/// the last cycle.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct StatusReport {
    pub segment_index: usize,
    pub checkpoint_index: usize,
    pub state: CheckpointState,

    pub target_x_m: f64,
    pub target_y_m: f64,

    /// Distance to the target waypoint
    pub distance_m: f64,

    /// Heading error to the target waypoint, before any reverse remapping
    pub head_err_deg: f64,

    pub speed_ms: f64,
    pub turn_rate_rads: f64,
    pub mode: MoveMode,

    /// True if the speed was reduced by braking this cycle
    pub braking: bool,

    pub goal_reached: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during processing of the module.
#[derive(Debug, thiserror::Error)]
pub enum SegCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(params::LoadError),

    #[error("The {0:?} policy is selected but its parameters are missing")]
    MissingPolicyParams(PolicyKind),

    #[error("Could not build the fuzzy rule base: {0}")]
    RuleBaseError(FuzzyError),

    #[error("Invalid trajectory parameters: {0}")]
    TrajParamsError(ParamsError),

    #[error("Could not build the trajectory: {0}")]
    TrajError(#[from] TrajError),

    #[error("Velocity policy failed: {0}")]
    PolicyError(#[from] PolicyError),

    /// Attempted to drive a segment before one was set with `set_goal`.
    #[error("No goal segment has been set")]
    NoGoal,

    /// The return leg was reached without the origin being captured.
    #[error("The origin of the route has not been captured")]
    NoOrigin,

    #[error("The waypoints of the current leg have not been built")]
    NoWaypoints,

    #[error("Checkpoint {index} is out of range for a sequence of {len} waypoints")]
    CheckpointOutOfRange { index: usize, len: usize },

    #[error("The route is already complete")]
    RouteDone,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SegCtrl {
    /// Initialise the SegCtrl module.
    ///
    /// Expected init data is a path to the parameter file, relative to the
    /// params directory, and the configuration of the route to follow.
    pub fn init(params_path: &str, route: RouteConfig) -> Result<Self, SegCtrlError> {
        // Load the parameters
        let params = match params::load(params_path) {
            Ok(p) => p,
            Err(e) => return Err(SegCtrlError::ParamLoadError(e)),
        };

        Self::new(params, route)
    }

    /// Build the module from already loaded parameters, using the policy they
    /// select.
    pub fn new(params: Params, route: RouteConfig) -> Result<Self, SegCtrlError> {
        params.traj.validate().map_err(|e| {
            warn!("Invalid trajectory parameters: {}", e);
            SegCtrlError::TrajParamsError(e)
        })?;

        let policy: Box<dyn VelocityPolicy> = match params.policy {
            PolicyKind::Kinematic => {
                let kin = params
                    .kinematic
                    .ok_or(SegCtrlError::MissingPolicyParams(PolicyKind::Kinematic))?;

                Box::new(KinematicPolicy::new(kin, params.limits))
            }
            PolicyKind::Fuzzy => {
                let rb_params = params
                    .fuzzy
                    .clone()
                    .ok_or(SegCtrlError::MissingPolicyParams(PolicyKind::Fuzzy))?;

                let rule_base = RuleBase::new(rb_params).map_err(|e| {
                    warn!("Invalid fuzzy rule base: {}", e);
                    SegCtrlError::RuleBaseError(e)
                })?;

                Box::new(FuzzyPolicy::new(rule_base))
            }
        };

        info!(
            "SegCtrl initialised with the {:?} policy for {} segments (return to origin: {})",
            params.policy, route.total_segments, route.return_to_origin
        );

        Ok(Self::with_policy(params, route, policy))
    }

    /// Build the module with a custom velocity policy.
    pub fn with_policy(
        params: Params,
        route: RouteConfig,
        policy: Box<dyn VelocityPolicy>,
    ) -> Self {
        let tracker = CheckpointTracker::new(params.checkpoints, route);

        Self {
            params,
            policy,
            segment: None,
            report: StatusReport::new(&tracker),
            tracker,
        }
    }

    /// Assign the goal segment.
    ///
    /// This clears the goal reached flag. Assigning a different segment from
    /// the one being driven restarts from its first waypoint.
    pub fn set_goal(&mut self, segment: Segment) {
        let changed = self.segment.map_or(true, |s| s != segment);

        if changed {
            info!(
                "New {:?} goal segment (type {}) from ({:.3}, {:.3}) to ({:.3}, {:.3})",
                segment.kind(),
                segment.kind().type_id(),
                segment.start()[0],
                segment.start()[1],
                segment.end()[0],
                segment.end()[1]
            );
        }

        self.segment = Some(segment);
        self.tracker.new_goal(changed);
        self.report.goal_reached = false;
    }

    /// True once the terminal checkpoint of the goal segment has been
    /// reached.
    pub fn is_goal_reached(&self) -> bool {
        self.tracker.is_goal_reached()
    }

    /// True once every leg of the route, including the return leg, is
    /// complete.
    pub fn is_route_done(&self) -> bool {
        self.tracker.is_route_done()
    }

    /// Decide the velocity command for this cycle.
    ///
    /// Once the route is done a zero command is returned and nothing changes.
    /// If an error occurs the progress is left as it was.
    pub fn decide(&mut self, pose: &Pose) -> Result<VelocityCmd, SegCtrlError> {
        if self.tracker.is_route_done() {
            self.report = StatusReport::new(&self.tracker);
            return Ok(VelocityCmd::default());
        }

        let target = self
            .tracker
            .resolve_target(self.segment.as_ref(), &self.params.traj)?;

        let head_err_deg = heading_error_deg(&target.point_m, pose);
        let distance_m = distance(&pose.position2(), &target.point_m);

        let output = self.policy.compute(&PolicyInput {
            distance_m,
            head_err_deg,
            segment_kind: target.kind,
            checkpoint_index: target.index,
            final_leg: target.final_leg,
        })?;

        let transition = self.tracker.update(distance_m)?;

        let braking = transition == Transition::Hold
            && self.params.braking_enabled
            && target.is_last;

        let speed_ms = if braking {
            brake_speed(output.speed_ms, distance_m, self.params.limits.linear_accel)
        } else {
            output.speed_ms
        };

        let cmd = VelocityCmd {
            speed_ms: speed_ms * output.mode.sign(),
            turn_rate_rads: output.turn_rate_rads,
        };

        trace!(
            "Target {} ({:.3}, {:.3}): dist {:.3} m, err {:.2} deg, cmd {:?} {:?}",
            target.index,
            target.point_m[0],
            target.point_m[1],
            distance_m,
            head_err_deg,
            cmd,
            transition
        );

        self.report = StatusReport {
            segment_index: self.tracker.segment_index(),
            checkpoint_index: self.tracker.checkpoint_index(),
            state: self.tracker.state(),
            target_x_m: target.point_m[0],
            target_y_m: target.point_m[1],
            distance_m,
            head_err_deg,
            speed_ms: cmd.speed_ms,
            turn_rate_rads: cmd.turn_rate_rads,
            mode: output.mode,
            braking,
            goal_reached: self.tracker.is_goal_reached(),
        };

        Ok(cmd)
    }

    /// Status report of the last cycle.
    pub fn report(&self) -> StatusReport {
        self.report
    }

    pub fn segment_index(&self) -> usize {
        self.tracker.segment_index()
    }

    pub fn checkpoint_index(&self) -> usize {
        self.tracker.checkpoint_index()
    }

    /// Kinematic limits of the robot
    pub fn limits(&self) -> &RobotLimits {
        &self.params.limits
    }

    /// Waypoints of the leg being driven, if built.
    pub fn waypoints(&self) -> Option<&Waypoints> {
        self.tracker.waypoints()
    }
}

impl StatusReport {
    fn new(tracker: &CheckpointTracker) -> Self {
        Self {
            segment_index: tracker.segment_index(),
            checkpoint_index: tracker.checkpoint_index(),
            state: tracker.state(),
            target_x_m: 0.0,
            target_y_m: 0.0,
            distance_m: 0.0,
            head_err_deg: 0.0,
            speed_ms: 0.0,
            turn_rate_rads: 0.0,
            mode: MoveMode::Forward,
            braking: false,
            goal_reached: tracker.is_goal_reached(),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Reduce the speed proportionally once within the stopping distance.
///
/// The stopping distance is `speed^2 / (2 accel)`, inside it the speed is
/// scaled by `distance / stopping distance`.
pub fn brake_speed(speed_ms: f64, distance_m: f64, linear_accel: f64) -> f64 {
    let stop_dist_m = speed_ms.powi(2) / (2.0 * linear_accel);

    if stop_dist_m > 0.0 && distance_m <= stop_dist_m {
        speed_ms * distance_m / stop_dist_m
    } else {
        speed_ms
    }
}
