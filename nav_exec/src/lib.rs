//! # Navigation library.
//!
//! This library provides the segment following core: trajectory generation
//! for linear and curved segments, checkpoint progression along the generated
//! waypoints and the pursuit controller which turns the robot's pose into
//! velocity commands.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Localisation types - the pose of the robot as provided by the external pose source
pub mod loc;

/// Route definitions - the segments to follow and the route-level configuration
pub mod route;

/// Trajectory generation - converts segments into sequences of waypoints
pub mod traj;

/// Velocity policies - the interchangeable laws producing speed and turn rate demands
pub mod policy;

/// Segment control module - tracks checkpoints and drives the robot along the active segment
pub mod seg_ctrl;

/// Simulation - a simple unicycle model of the robot used by the executable and tests
pub mod sim;
