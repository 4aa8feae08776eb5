//! # Velocity policies
//!
//! A velocity policy turns the geometry between the robot and its current
//! target (distance and heading error) into speed and turn rate demands. Two
//! policies are provided:
//!
//! - [`KinematicPolicy`], a closed form law based on the robot's acceleration
//!   limits, which drives in reverse when the target is behind the robot.
//! - [`FuzzyPolicy`], which defers to a fuzzy inference engine.
//!
//! The policy is selected when the segment controller is built. Braking and
//! the sign of the final speed are handled by the controller.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod fuzzy;
pub mod kinematic;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use crate::route::SegmentKind;
pub use fuzzy::{FuzzyError, FuzzyPolicy};
pub use kinematic::{KinematicParams, KinematicPolicy};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A law mapping the target geometry to velocity demands.
pub trait VelocityPolicy {
    /// Compute the demands for this cycle.
    ///
    /// Implementations must be deterministic, the same input always gives the
    /// same output.
    fn compute(&self, input: &PolicyInput) -> Result<PolicyOutput, PolicyError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematic limits of the robot.
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq)]
pub struct RobotLimits {
    /// Maximum linear speed
    ///
    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Maximum turn rate
    ///
    /// Units: radians/second
    pub max_turn_rate_rads: f64,

    /// Linear acceleration coefficient
    ///
    /// Units: meters/second^2
    pub linear_accel: f64,

    /// Angular acceleration coefficient
    ///
    /// Units: radians/second^2
    pub angular_accel: f64,
}

/// Everything a policy is allowed to know about the current cycle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PolicyInput {
    /// Distance to the target waypoint
    ///
    /// Units: meters
    pub distance_m: f64,

    /// Signed heading error to the target waypoint, in [-180, 180)
    ///
    /// Units: degrees
    pub head_err_deg: f64,

    /// Kind of the segment being followed
    pub segment_kind: SegmentKind,

    /// Index of the target waypoint in the segment's sequence
    pub checkpoint_index: usize,

    /// True when the segment is the last one of the route
    pub final_leg: bool,
}

/// Demands produced by a policy.
///
/// The speed is a magnitude, the controller applies the sign given by `mode`
/// once braking has been applied.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct PolicyOutput {
    /// Units: meters/second
    pub speed_ms: f64,

    /// Units: radians/second, counter-clockwise positive
    pub turn_rate_rads: f64,

    pub mode: MoveMode,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Direction of travel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum MoveMode {
    Forward,
    Reverse,
}

/// Which policy the controller uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Kinematic,
    Fuzzy,
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("Fuzzy inference failed: {0}")]
    InferenceError(#[from] FuzzyError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for MoveMode {
    fn default() -> Self {
        MoveMode::Forward
    }
}

impl MoveMode {
    /// Sign applied to the speed magnitude.
    pub fn sign(&self) -> f64 {
        match self {
            MoveMode::Forward => 1.0,
            MoveMode::Reverse => -1.0,
        }
    }
}
