//! # Fuzzy velocity policy
//!
//! The fuzzy policy hands the distance and the absolute heading error to a
//! fuzzy inference engine and uses the inferred linear and angular speeds
//! directly. The engine is a collaborator behind the [`FuzzyInference`]
//! trait, the [`RuleBase`] engine evaluates a table of rules loaded from the
//! parameters.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod rule_base;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{error, trace};

// Internal
use super::{MoveMode, PolicyError, PolicyInput, PolicyOutput, VelocityPolicy};
pub use rule_base::{FuzzyError, RuleBase, RuleBaseParams};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A fuzzy inference engine mapping the distance and the absolute heading
/// error to speed demands.
pub trait FuzzyInference {
    fn infer(&self, distance_m: f64, angle_deg: f64) -> Result<Inference, FuzzyError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of an inference.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Inference {
    /// Units: meters/second
    pub linear: f64,

    /// Unsigned turn rate
    ///
    /// Units: radians/second
    pub angular: f64,

    /// Firing strength of the strongest rule, in [0, 1]
    pub confidence: f64,
}

/// Velocity policy backed by a fuzzy inference engine.
pub struct FuzzyPolicy<F = RuleBase> {
    engine: F,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<F: FuzzyInference> FuzzyPolicy<F> {
    pub fn new(engine: F) -> Self {
        Self { engine }
    }
}

impl<F: FuzzyInference> VelocityPolicy for FuzzyPolicy<F> {
    fn compute(&self, input: &PolicyInput) -> Result<PolicyOutput, PolicyError> {
        let inference = self
            .engine
            .infer(input.distance_m, input.head_err_deg.abs())
            .map_err(|e| {
                error!(
                    "Fuzzy inference failed for distance {:.3} m, angle {:.3} deg: {}. \
                    Check the variable and rule definitions.",
                    input.distance_m,
                    input.head_err_deg.abs(),
                    e
                );
                e
            })?;

        // The engine works on the absolute error, turn towards the target
        let turn_rate_rads = if input.head_err_deg < 0.0 {
            -inference.angular
        } else {
            inference.angular
        };

        trace!(
            "Fuzzy policy: {:.3} m/s, {:.3} rad/s (confidence {:.2})",
            inference.linear,
            turn_rate_rads,
            inference.confidence
        );

        Ok(PolicyOutput {
            speed_ms: inference.linear,
            turn_rate_rads,
            mode: MoveMode::Forward,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::route::SegmentKind;

    /// Engine echoing its inputs back, to check the policy's plumbing.
    struct Echo;

    impl FuzzyInference for Echo {
        fn infer(&self, distance_m: f64, angle_deg: f64) -> Result<Inference, FuzzyError> {
            if distance_m < 0.0 {
                return Err(FuzzyError::UnknownVariable("distance".into()));
            }

            Ok(Inference {
                linear: distance_m,
                angular: angle_deg / 180.0,
                confidence: 1.0,
            })
        }
    }

    fn input(distance_m: f64, head_err_deg: f64) -> PolicyInput {
        PolicyInput {
            distance_m,
            head_err_deg,
            segment_kind: SegmentKind::Linear,
            checkpoint_index: 0,
            final_leg: false,
        }
    }

    #[test]
    fn test_turn_sign() {
        let policy = FuzzyPolicy::new(Echo);

        let out = policy.compute(&input(2.0, 90.0)).unwrap();
        assert_eq!(out.turn_rate_rads, 0.5);
        assert_eq!(out.speed_ms, 2.0);

        // Negative errors turn the other way, speed untouched
        let out = policy.compute(&input(2.0, -90.0)).unwrap();
        assert_eq!(out.turn_rate_rads, -0.5);
        assert_eq!(out.speed_ms, 2.0);
        assert_eq!(out.mode, MoveMode::Forward);
    }

    #[test]
    fn test_error_propagates() {
        let policy = FuzzyPolicy::new(Echo);

        match policy.compute(&input(-1.0, 0.0)) {
            Err(PolicyError::InferenceError(FuzzyError::UnknownVariable(v))) => {
                assert_eq!(v, "distance")
            }
            r => panic!("Expected an unknown variable error, got {:?}", r),
        }
    }
}
