//! # Rule base fuzzy inference engine
//!
//! Linguistic variables are made of named terms, each term having a
//! piecewise linear membership function given by `(x, membership)` points.
//! Outside the first and last points the membership is held constant.
//!
//! Rules are of the form `if A is a and B is b then C is c and D is d`. The
//! premise is combined with `min`, each consequence is clipped to the rule's
//! firing strength and consequences on the same variable are aggregated with
//! `max`. Output values are the centre of gravity of the aggregated
//! membership, evaluated over a discretised universe.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;

// Internal
use super::{FuzzyInference, Inference};
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Input variable holding the distance to the target
pub const DISTANCE_VAR: &str = "distance";

/// Input variable holding the absolute heading error
pub const ANGLE_VAR: &str = "angle";

/// Output variable holding the linear speed
pub const LINEAR_VAR: &str = "linear_velocity";

/// Output variable holding the unsigned turn rate
pub const ANGULAR_VAR: &str = "angular_velocity";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters describing a rule base.
#[derive(Deserialize, Debug, Clone)]
pub struct RuleBaseParams {
    /// Number of points the output universes are discretised into for
    /// defuzzification.
    pub resolution: usize,

    pub variables: BTreeMap<String, VariableParams>,

    pub rules: Vec<RuleParams>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct VariableParams {
    /// Lower and upper bound of the variable
    pub universe: [f64; 2],

    /// Membership points of each term
    pub terms: BTreeMap<String, Vec<[f64; 2]>>,
}

/// A rule, as `[variable, term]` pairs.
#[derive(Deserialize, Debug, Clone)]
pub struct RuleParams {
    pub premise: Vec<[String; 2]>,
    pub consequence: Vec<[String; 2]>,
}

/// A validated rule base, ready for inference.
#[derive(Debug, Clone)]
pub struct RuleBase {
    variables: BTreeMap<String, Variable>,
    rules: Vec<Rule>,
    resolution: usize,
}

/// Result of evaluating the rule base.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Defuzzified value of each output variable
    pub outputs: BTreeMap<String, f64>,

    /// Firing strength of the strongest rule
    pub confidence: f64,
}

#[derive(Debug, Clone)]
struct Variable {
    universe: (f64, f64),
    terms: BTreeMap<String, Term>,
}

#[derive(Debug, Clone)]
struct Term {
    points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone)]
struct Rule {
    premise: Vec<(String, String)>,
    consequence: Vec<(String, String)>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FuzzyError {
    #[error("Unknown linguistic variable \"{0}\"")]
    UnknownVariable(String),

    #[error("Unknown term \"{1}\" of linguistic variable \"{0}\"")]
    UnknownTerm(String, String),

    #[error("Term \"{1}\" of linguistic variable \"{0}\" has no membership points")]
    EmptyTerm(String, String),

    #[error("Linguistic variable \"{0}\" has an empty universe")]
    InvalidUniverse(String),

    #[error("The output resolution must be at least 2, got {0}")]
    InvalidResolution(usize),

    #[error("No value was given for the input variable \"{0}\"")]
    MissingInput(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RuleBase {
    /// Build the rule base, checking that every rule refers to known
    /// variables and terms.
    pub fn new(params: RuleBaseParams) -> Result<Self, FuzzyError> {
        if params.resolution < 2 {
            return Err(FuzzyError::InvalidResolution(params.resolution));
        }

        let mut variables = BTreeMap::new();

        for (var_name, var) in params.variables {
            if !(var.universe[1] > var.universe[0]) {
                return Err(FuzzyError::InvalidUniverse(var_name));
            }

            let mut terms = BTreeMap::new();

            for (term_name, points) in var.terms {
                if points.is_empty() {
                    return Err(FuzzyError::EmptyTerm(var_name, term_name));
                }

                terms.insert(
                    term_name,
                    Term {
                        points: points.iter().map(|p| (p[0], p[1])).collect(),
                    },
                );
            }

            variables.insert(
                var_name,
                Variable {
                    universe: (var.universe[0], var.universe[1]),
                    terms,
                },
            );
        }

        let mut rule_base = Self {
            variables,
            rules: Vec::with_capacity(params.rules.len()),
            resolution: params.resolution,
        };

        for rule in params.rules {
            let rule = Rule {
                premise: rule
                    .premise
                    .into_iter()
                    .map(|[v, t]| (v, t))
                    .collect(),
                consequence: rule
                    .consequence
                    .into_iter()
                    .map(|[v, t]| (v, t))
                    .collect(),
            };

            for (v, t) in rule.premise.iter().chain(rule.consequence.iter()) {
                rule_base.term(v, t)?;
            }

            rule_base.rules.push(rule);
        }

        debug!(
            "Rule base built with {} variables and {} rules",
            rule_base.variables.len(),
            rule_base.rules.len()
        );

        Ok(rule_base)
    }

    /// Evaluate the rule base for the given input values.
    pub fn evaluate(&self, inputs: &[(&str, f64)]) -> Result<Evaluation, FuzzyError> {
        let mut activations: BTreeMap<&str, Vec<(&Term, f64)>> = BTreeMap::new();
        let mut confidence: f64 = 0.0;

        for rule in self.rules.iter() {
            let mut strength: f64 = 1.0;

            for (var, term) in rule.premise.iter() {
                let x = inputs
                    .iter()
                    .find(|(name, _)| *name == var.as_str())
                    .map(|(_, x)| *x)
                    .ok_or_else(|| FuzzyError::MissingInput(var.clone()))?;

                strength = strength.min(self.term(var, term)?.membership(x));
            }

            confidence = confidence.max(strength);

            for (var, term) in rule.consequence.iter() {
                activations
                    .entry(var.as_str())
                    .or_default()
                    .push((self.term(var, term)?, strength));
            }
        }

        let mut outputs = BTreeMap::new();

        for (var, acts) in activations {
            let universe = self.variable(var)?.universe;
            outputs.insert(var.to_string(), self.centre_of_gravity(universe, &acts));
        }

        Ok(Evaluation {
            outputs,
            confidence,
        })
    }

    fn variable(&self, var: &str) -> Result<&Variable, FuzzyError> {
        self.variables
            .get(var)
            .ok_or_else(|| FuzzyError::UnknownVariable(var.to_string()))
    }

    fn term(&self, var: &str, term: &str) -> Result<&Term, FuzzyError> {
        self.variable(var)?
            .terms
            .get(term)
            .ok_or_else(|| FuzzyError::UnknownTerm(var.to_string(), term.to_string()))
    }

    /// Defuzzify the clipped terms over the universe.
    ///
    /// If nothing fired the lower bound of the universe is returned.
    fn centre_of_gravity(&self, universe: (f64, f64), acts: &[(&Term, f64)]) -> f64 {
        let step = (universe.1 - universe.0) / (self.resolution - 1) as f64;

        let mut moment = 0.0;
        let mut area = 0.0;

        for i in 0..self.resolution {
            let x = universe.0 + i as f64 * step;
            let mu = acts
                .iter()
                .map(|(term, strength)| term.membership(x).min(*strength))
                .fold(0.0, f64::max);

            moment += x * mu;
            area += mu;
        }

        if area > 0.0 {
            moment / area
        } else {
            universe.0
        }
    }
}

impl FuzzyInference for RuleBase {
    fn infer(&self, distance_m: f64, angle_deg: f64) -> Result<Inference, FuzzyError> {
        let eval = self.evaluate(&[(DISTANCE_VAR, distance_m), (ANGLE_VAR, angle_deg)])?;

        let output = |var: &str| {
            eval.outputs
                .get(var)
                .copied()
                .ok_or_else(|| FuzzyError::UnknownVariable(var.to_string()))
        };

        Ok(Inference {
            linear: output(LINEAR_VAR)?,
            angular: output(ANGULAR_VAR)?,
            confidence: eval.confidence,
        })
    }
}

impl Term {
    /// Piecewise linear membership of `x`.
    fn membership(&self, x: f64) -> f64 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => return 0.0,
        };

        if x <= first.0 {
            return first.1;
        }
        if x >= last.0 {
            return last.1;
        }

        for w in self.points.windows(2) {
            let ((x0, m0), (x1, m1)) = (w[0], w[1]);

            if x <= x1 {
                if x1 <= x0 {
                    return m1;
                }
                return lin_map((x0, x1), (m0, m1), x);
            }
        }

        last.1
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Deserialize)]
    struct FuzzyFile {
        fuzzy: RuleBaseParams,
    }

    fn default_rule_base() -> RuleBase {
        let file: FuzzyFile =
            util::params::parse(include_str!("../../../../params/seg_ctrl_fuzzy.toml")).unwrap();

        RuleBase::new(file.fuzzy).unwrap()
    }

    fn small_params() -> RuleBaseParams {
        util::params::parse(
            r#"
            resolution = 101

            [variables.x]
            universe = [0.0, 10.0]
            [variables.x.terms]
            low = [[0.0, 1.0], [5.0, 0.0]]
            high = [[5.0, 0.0], [10.0, 1.0]]

            [variables.y]
            universe = [0.0, 1.0]
            [variables.y.terms]
            off = [[0.0, 1.0], [0.1, 0.0]]
            on = [[0.9, 0.0], [1.0, 1.0]]

            [[rules]]
            premise = [["x", "low"]]
            consequence = [["y", "off"]]

            [[rules]]
            premise = [["x", "high"]]
            consequence = [["y", "on"]]
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_membership() {
        let term = Term {
            points: vec![(0.5, 0.0), (1.0, 1.0), (2.0, 0.0)],
        };

        assert_eq!(term.membership(0.0), 0.0);
        assert_eq!(term.membership(1.0), 1.0);
        assert!((term.membership(1.5) - 0.5).abs() < 1e-12);
        assert!((term.membership(0.75) - 0.5).abs() < 1e-12);
        assert_eq!(term.membership(100.0), 0.0);

        // Held constant past the last point
        let term = Term {
            points: vec![(1.5, 0.0), (8.0, 1.0), (120.0, 1.0)],
        };
        assert_eq!(term.membership(500.0), 1.0);
    }

    #[test]
    fn test_evaluate() {
        let rb = RuleBase::new(small_params()).unwrap();

        let low = rb.evaluate(&[("x", 0.0)]).unwrap();
        assert_eq!(low.confidence, 1.0);
        assert!(low.outputs["y"] < 0.1);

        let high = rb.evaluate(&[("x", 10.0)]).unwrap();
        assert!(high.outputs["y"] > 0.9);

        // Inputs are required
        match rb.evaluate(&[("z", 1.0)]) {
            Err(FuzzyError::MissingInput(v)) => assert_eq!(v, "x"),
            r => panic!("Expected a missing input error, got {:?}", r),
        }
    }

    #[test]
    fn test_unknown_references() {
        let mut params = small_params();
        params.rules[0].consequence[0] = ["y".to_string(), "maybe".to_string()];
        match RuleBase::new(params) {
            Err(FuzzyError::UnknownTerm(v, t)) => {
                assert_eq!(v, "y");
                assert_eq!(t, "maybe");
            }
            r => panic!("Expected an unknown term error, got {:?}", r),
        }

        let mut params = small_params();
        params.rules[1].premise[0] = ["heading".to_string(), "low".to_string()];
        match RuleBase::new(params) {
            Err(FuzzyError::UnknownVariable(v)) => assert_eq!(v, "heading"),
            r => panic!("Expected an unknown variable error, got {:?}", r),
        }

        let mut params = small_params();
        params.resolution = 1;
        assert!(matches!(
            RuleBase::new(params),
            Err(FuzzyError::InvalidResolution(1))
        ));
    }

    #[test]
    fn test_default_rule_base() {
        let rb = default_rule_base();

        // Far and aligned: full speed, no turning
        let inf = rb.infer(50.0, 0.0).unwrap();
        assert!(inf.linear > 2.9, "linear = {}", inf.linear);
        assert!(inf.angular < 0.01, "angular = {}", inf.angular);
        assert_eq!(inf.confidence, 1.0);

        // On top of the target facing away: no speed, turn hard
        let inf = rb.infer(0.0, 170.0).unwrap();
        assert!(inf.linear < 0.01, "linear = {}", inf.linear);
        assert!(inf.angular > 0.99, "angular = {}", inf.angular);

        // Outputs stay in their universes
        for d in [0.0, 0.3, 0.8, 1.7, 5.0, 150.0].iter() {
            for a in [0.0, 0.6, 7.0, 30.0, 55.0, 100.0, 180.0].iter() {
                let inf = rb.infer(*d, *a).unwrap();
                assert!(inf.linear >= 0.0 && inf.linear <= 3.0 + 1e-9);
                assert!(inf.angular >= 0.0 && inf.angular <= 1.0 + 1e-9);
                assert!(inf.confidence >= 0.0 && inf.confidence <= 1.0);
            }
        }
    }
}
