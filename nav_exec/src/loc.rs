//! # Localisation module
//!
//! Localisation itself is provided by an external pose source, this module
//! only defines the pose it hands over each cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current pose of the robot on the plane.
///
/// The two auxiliary fields are not used by the navigation core, they are
/// carried so the pose can be passed back to the pose source unchanged.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// X position
    ///
    /// Units: meters
    pub x_m: f64,

    /// Y position
    ///
    /// Units: meters
    pub y_m: f64,

    /// Heading, the angle to the positive X axis, counter-clockwise positive.
    ///
    /// Units: degrees
    pub heading_deg: f64,

    /// Unused trailing fields of the pose source
    pub aux: [f64; 2],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(x_m: f64, y_m: f64, heading_deg: f64) -> Self {
        Self {
            x_m,
            y_m,
            heading_deg,
            aux: [0.0; 2],
        }
    }

    /// Return the 2D position vector of the robot.
    pub fn position2(&self) -> Vector2<f64> {
        Vector2::new(self.x_m, self.y_m)
    }

    /// Return the heading in radians.
    pub fn heading_rad(&self) -> f64 {
        self.heading_deg.to_radians()
    }
}

impl From<(f64, f64, f64, f64, f64)> for Pose {
    fn from(t: (f64, f64, f64, f64, f64)) -> Self {
        Self {
            x_m: t.0,
            y_m: t.1,
            heading_deg: t.2,
            aux: [t.3, t.4],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_tuple() {
        let pose = Pose::from((1.0, -2.0, 90.0, 7.0, 8.0));

        assert_eq!(pose.position2(), Vector2::new(1.0, -2.0));
        assert_eq!(pose.heading_deg, 90.0);
        assert!((pose.heading_rad() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

        // Trailing fields are carried through unchanged
        assert_eq!(pose.aux, [7.0, 8.0]);
        assert_eq!(Pose::new(1.0, -2.0, 90.0).aux, [0.0, 0.0]);
    }
}
