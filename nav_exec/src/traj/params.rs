//! Trajectory generation parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::geom::OffsetPolicy;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory generation
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Number of interior points inserted between the two ends of a linear
    /// segment.
    pub line_checkpoints: usize,

    /// Number of decimal places the interior points of a linear segment are
    /// rounded to.
    pub line_round_decimals: u32,

    /// If set, the first segment of the route starts with a lead-in point
    /// placed behind its start, at `start - factor * (end - start)`.
    pub line_lead_in_factor: Option<f64>,

    /// Shape of curved segments
    pub curve_style: CurveStyle,

    /// Number of samples taken on each of the two Bézier arcs of a curve.
    pub curve_samples: usize,

    /// Fraction of each triangle side at which the control point is placed,
    /// before the outward offset is applied.
    pub control_point_const: f64,

    /// Outward offset of the control points
    pub offset: OffsetPolicy,

    /// Softened curves only: distance the mid point is moved away from the
    /// chord.
    ///
    /// Units: meters
    pub mid_shift_m: f64,

    /// Softened curves only: distances of the approach points from the end
    /// point, furthest first. The first one is the end of the second arc.
    ///
    /// Units: meters
    pub approach_dists_m: [f64; 3],
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The way curved segments are built.
#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CurveStyle {
    /// Two arcs, `start -> mid` and `mid -> end`.
    Simple,

    /// The mid point is pushed out from the chord and the curve approaches
    /// the end point radially through a set of synthesised points. The closing
    /// leg of a return-to-origin route uses the raw segment points.
    Softened,
}

/// Invalid trajectory parameters.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParamsError {
    #[error("Curves need at least 2 samples per arc, found {0}")]
    TooFewCurveSamples(usize),

    #[error("The offset lower bound ({min_m}) is above its upper bound ({max_m})")]
    InvalidOffsetBounds { min_m: f64, max_m: f64 },

    #[error("Approach distances must be non-negative and furthest first, found {0:?}")]
    InvalidApproachDists([f64; 3]),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the parameters can only produce sequences that finish on the
    /// segment's end point.
    pub fn validate(&self) -> Result<(), ParamsError> {
        // A single sample per arc stops the curve at the mid point
        if self.curve_samples < 2 {
            return Err(ParamsError::TooFewCurveSamples(self.curve_samples));
        }

        if !(self.offset.min_m <= self.offset.max_m) {
            return Err(ParamsError::InvalidOffsetBounds {
                min_m: self.offset.min_m,
                max_m: self.offset.max_m,
            });
        }

        if self.curve_style == CurveStyle::Softened {
            let d = self.approach_dists_m;
            if d.iter().any(|x| !(*x >= 0.0)) || d[0] < d[1] || d[1] < d[2] {
                return Err(ParamsError::InvalidApproachDists(d));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn params() -> Params {
        Params {
            line_checkpoints: 20,
            line_round_decimals: 6,
            line_lead_in_factor: None,
            curve_style: CurveStyle::Softened,
            curve_samples: 4,
            control_point_const: 0.5,
            offset: OffsetPolicy {
                base: 0.5,
                scale: 2.0,
                min_m: 0.5,
                max_m: 1.5,
            },
            mid_shift_m: 0.25,
            approach_dists_m: [4.0, 2.5, 1.5],
        }
    }

    #[test]
    fn test_validate() {
        assert_eq!(params().validate(), Ok(()));

        for n in 0..2 {
            let mut p = params();
            p.curve_samples = n;
            assert_eq!(p.validate(), Err(ParamsError::TooFewCurveSamples(n)));
        }

        let mut p = params();
        p.offset.min_m = 2.0;
        assert_eq!(
            p.validate(),
            Err(ParamsError::InvalidOffsetBounds {
                min_m: 2.0,
                max_m: 1.5
            })
        );

        let mut p = params();
        p.approach_dists_m = [1.5, 2.5, 4.0];
        assert_eq!(
            p.validate(),
            Err(ParamsError::InvalidApproachDists([1.5, 2.5, 4.0]))
        );

        // Approach distances are unused by simple curves
        p.curve_style = CurveStyle::Simple;
        assert_eq!(p.validate(), Ok(()));
    }
}
