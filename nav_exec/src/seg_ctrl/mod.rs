//! # Segment control module
//!
//! Segment control drives the robot along the goal segments of a route. Each
//! segment is assigned with `set_goal`, and every control cycle `decide` is
//! given the robot's pose and returns the velocity command for that cycle.
//!
//! A cycle runs as follows:
//!  1. The checkpoint tracker resolves the target waypoint, building the
//!     segment's waypoints on the first visit.
//!  1. The heading error and the distance to the target are computed.
//!  1. The velocity policy turns these into speed and turn rate demands.
//!  1. The tracker updates the progress from the distance, possibly
//!     completing the segment.
//!  1. While holding on the last waypoint the speed is reduced once the robot
//!     is within its stopping distance, and the speed sign is set from the
//!     direction of travel.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod checkpoint;
pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use checkpoint::{CheckpointParams, CheckpointState, CheckpointTracker, Target, Transition};
pub use params::Params;
pub use state::*;
