//! # Unicycle simulation
//!
//! A kinematic unicycle standing in for the robot. Commands are saturated to
//! the robot's limits and integrated with a forward Euler step.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::{loc::Pose, policy::RobotLimits, seg_ctrl::VelocityCmd};
use util::maths::norm_angle_deg;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct UnicycleSim {
    pose: Pose,
    limits: RobotLimits,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl UnicycleSim {
    pub fn new(pose: Pose, limits: RobotLimits) -> Self {
        Self { pose, limits }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Apply the command for `dt_s` seconds and return the new pose.
    pub fn step(&mut self, cmd: &VelocityCmd, dt_s: f64) -> Pose {
        let speed_ms = cmd
            .speed_ms
            .max(-self.limits.max_speed_ms)
            .min(self.limits.max_speed_ms);
        let turn_rate_rads = cmd
            .turn_rate_rads
            .max(-self.limits.max_turn_rate_rads)
            .min(self.limits.max_turn_rate_rads);

        let heading_rad = self.pose.heading_rad();

        self.pose.x_m += speed_ms * heading_rad.cos() * dt_s;
        self.pose.y_m += speed_ms * heading_rad.sin() * dt_s;
        self.pose.heading_deg =
            norm_angle_deg(self.pose.heading_deg + (turn_rate_rads * dt_s).to_degrees());

        self.pose
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn limits() -> RobotLimits {
        RobotLimits {
            max_speed_ms: 3.0,
            max_turn_rate_rads: 1.0,
            linear_accel: 1.0,
            angular_accel: 1.0,
        }
    }

    #[test]
    fn test_step() {
        let mut sim = UnicycleSim::new(Pose::new(0.0, 0.0, 90.0), limits());

        let pose = sim.step(
            &VelocityCmd {
                speed_ms: 2.0,
                turn_rate_rads: 0.0,
            },
            0.5,
        );
        assert!(pose.x_m.abs() < 1e-12);
        assert!((pose.y_m - 1.0).abs() < 1e-12);

        // Saturated turn
        let pose = sim.step(
            &VelocityCmd {
                speed_ms: 0.0,
                turn_rate_rads: 5.0,
            },
            0.1,
        );
        assert!((pose.heading_deg - (90.0 + 0.1f64.to_degrees())).abs() < 1e-9);

        // Reverse
        let mut sim = UnicycleSim::new(Pose::new(0.0, 0.0, 0.0), limits());
        let pose = sim.step(
            &VelocityCmd {
                speed_ms: -10.0,
                turn_rate_rads: 0.0,
            },
            1.0,
        );
        assert_eq!(pose.x_m, -3.0);
    }

    #[test]
    fn test_step_keeps_aux() {
        let mut sim = UnicycleSim::new(Pose::from((0.0, 0.0, 0.0, 4.0, 5.0)), limits());

        let pose = sim.step(
            &VelocityCmd {
                speed_ms: 1.0,
                turn_rate_rads: 0.5,
            },
            0.1,
        );
        assert_eq!(pose.aux, [4.0, 5.0]);
    }
}
