//! # Trajectory generation module
//!
//! Trajectory generation converts the active segment into a sequence of
//! waypoints which the segment controller then tracks checkpoint by
//! checkpoint.
//!
//! Linear segments are evenly subdivided. Curved segments are defined by three
//! points (start, mid and end), the mid point being the apex of the triangle
//! shaping the curve. They are converted into two chained cubic Bézier arcs,
//! `start -> mid` and `mid -> end`, whose control points are pushed outwards
//! from the triangle's sides by an offset that grows with how pointed the
//! triangle is.
//!
//! Sequences are generated once, from the fixed points of the segment, so
//! replaying a segment always yields the same sequence.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod bezier;
pub mod geom;
pub mod params;
pub mod path;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::{CurveStyle, Params, ParamsError};
pub use path::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by degenerate geometry.
#[derive(Debug, thiserror::Error)]
pub enum TrajError {
    #[error("Cannot compute a direction from a zero length vector")]
    DegenerateChord,

    #[error("The points ({0}, {1}), ({2}, {3}) and ({4}, {5}) are collinear")]
    CollinearPoints(f64, f64, f64, f64, f64, f64),
}
