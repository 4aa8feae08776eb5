//! Segment control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::checkpoint::CheckpointParams;
use crate::{
    policy::{fuzzy::RuleBaseParams, KinematicParams, PolicyKind, RobotLimits},
    traj,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for segment control
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// The velocity policy to use
    pub policy: PolicyKind,

    /// If true the speed is reduced proportionally to the remaining distance
    /// once the robot is within its stopping distance of the last waypoint of
    /// a segment.
    pub braking_enabled: bool,

    /// Kinematic limits of the robot
    pub limits: RobotLimits,

    pub checkpoints: CheckpointParams,

    pub traj: traj::Params,

    /// Required when `policy` is `kinematic`
    pub kinematic: Option<KinematicParams>,

    /// Required when `policy` is `fuzzy`
    pub fuzzy: Option<RuleBaseParams>,
}
