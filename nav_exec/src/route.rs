//! # Route
//!
//! A route is the ordered list of segments the robot has to follow. Segments
//! are supplied by an external source, one at a time, through
//! `SegCtrl::set_goal`. This module defines the segment type, the route-level
//! configuration the controller needs up front, and the parameter file format
//! used by the executable to describe a route.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::convert::TryFrom;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One leg of the route.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Segment {
    /// A straight segment between two points.
    Linear {
        start_m: Vector2<f64>,
        end_m: Vector2<f64>,
    },

    /// A curved segment passing through three points. The mid point is the
    /// apex of the triangle that shapes the curve.
    Curved {
        start_m: Vector2<f64>,
        mid_m: Vector2<f64>,
        end_m: Vector2<f64>,
    },
}

/// Route level configuration, fixed for the lifetime of the controller.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Total number of segments in the route
    pub total_segments: usize,

    /// If true once the last segment is complete the robot drives back to the
    /// start point of the first segment.
    pub return_to_origin: bool,
}

/// A full route, as loaded from a route file.
#[derive(Debug, Clone)]
pub struct Route {
    pub segments: Vec<Segment>,
    pub config: RouteConfig,
}

/// Description of a segment in a route file.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentSpec {
    pub kind: SegmentKind,
    pub start: [f64; 2],
    pub mid: Option<[f64; 2]>,
    pub end: [f64; 2],
}

/// Description of a route in a route file.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteSpec {
    pub return_to_origin: bool,
    pub segments: Vec<SegmentSpec>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The kind of a segment.
///
/// The numeric type tags of the segment source are `1` for linear and `2` for
/// curved, see `type_id`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Linear,
    Curved,
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("The route contains no segments")]
    EmptyRoute,

    #[error("Curved segment {0} has no mid point")]
    MissingMidPoint(usize),

    #[error("Linear segment {0} has a mid point")]
    UnexpectedMidPoint(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SegmentKind {
    /// Numeric type tag used by the segment source.
    pub fn type_id(&self) -> u8 {
        match self {
            SegmentKind::Linear => 1,
            SegmentKind::Curved => 2,
        }
    }
}

impl Segment {
    pub fn linear(start_m: Vector2<f64>, end_m: Vector2<f64>) -> Self {
        Segment::Linear { start_m, end_m }
    }

    pub fn curved(start_m: Vector2<f64>, mid_m: Vector2<f64>, end_m: Vector2<f64>) -> Self {
        Segment::Curved {
            start_m,
            mid_m,
            end_m,
        }
    }

    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::Linear { .. } => SegmentKind::Linear,
            Segment::Curved { .. } => SegmentKind::Curved,
        }
    }

    pub fn start(&self) -> Vector2<f64> {
        match self {
            Segment::Linear { start_m, .. } | Segment::Curved { start_m, .. } => *start_m,
        }
    }

    pub fn end(&self) -> Vector2<f64> {
        match self {
            Segment::Linear { end_m, .. } | Segment::Curved { end_m, .. } => *end_m,
        }
    }

    /// The mid point, only present on curved segments.
    pub fn mid(&self) -> Option<Vector2<f64>> {
        match self {
            Segment::Linear { .. } => None,
            Segment::Curved { mid_m, .. } => Some(*mid_m),
        }
    }
}

impl Route {
    /// Build a route from its file description.
    pub fn from_spec(spec: RouteSpec) -> Result<Self, RouteError> {
        if spec.segments.is_empty() {
            return Err(RouteError::EmptyRoute);
        }

        let segments = spec
            .segments
            .into_iter()
            .enumerate()
            .map(Segment::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config: RouteConfig {
                total_segments: segments.len(),
                return_to_origin: spec.return_to_origin,
            },
            segments,
        })
    }
}

impl TryFrom<(usize, SegmentSpec)> for Segment {
    type Error = RouteError;

    fn try_from((index, spec): (usize, SegmentSpec)) -> Result<Self, Self::Error> {
        let start = Vector2::new(spec.start[0], spec.start[1]);
        let end = Vector2::new(spec.end[0], spec.end[1]);

        match (spec.kind, spec.mid) {
            (SegmentKind::Linear, None) => Ok(Segment::linear(start, end)),
            (SegmentKind::Linear, Some(_)) => Err(RouteError::UnexpectedMidPoint(index)),
            (SegmentKind::Curved, Some(mid)) => {
                Ok(Segment::curved(start, Vector2::new(mid[0], mid[1]), end))
            }
            (SegmentKind::Curved, None) => Err(RouteError::MissingMidPoint(index)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_route_from_spec() {
        let spec: RouteSpec = util::params::parse(
            r#"
            return_to_origin = true

            [[segments]]
            kind = "linear"
            start = [0.0, 0.0]
            end = [10.0, 0.0]

            [[segments]]
            kind = "curved"
            start = [10.0, 0.0]
            mid = [15.0, 5.0]
            end = [20.0, 0.0]
            "#,
        )
        .unwrap();

        let route = Route::from_spec(spec).unwrap();

        assert_eq!(route.config.total_segments, 2);
        assert!(route.config.return_to_origin);
        assert_eq!(route.segments[0].kind().type_id(), 1);
        assert_eq!(route.segments[1].kind().type_id(), 2);
        assert_eq!(route.segments[1].mid(), Some(Vector2::new(15.0, 5.0)));
        assert_eq!(route.segments[0].mid(), None);
    }

    #[test]
    fn test_route_spec_errors() {
        let missing_mid = RouteSpec {
            return_to_origin: false,
            segments: vec![SegmentSpec {
                kind: SegmentKind::Curved,
                start: [0.0, 0.0],
                mid: None,
                end: [1.0, 0.0],
            }],
        };
        match Route::from_spec(missing_mid) {
            Err(RouteError::MissingMidPoint(0)) => (),
            r => panic!("Expected missing mid point, got {:?}", r),
        }

        let empty = RouteSpec {
            return_to_origin: false,
            segments: vec![],
        };
        assert!(matches!(Route::from_spec(empty), Err(RouteError::EmptyRoute)));
    }

    #[test]
    fn test_route_params_file() {
        let spec: RouteSpec = util::params::parse(include_str!("../../params/route.toml")).unwrap();
        let route = Route::from_spec(spec).unwrap();

        assert_eq!(route.config.total_segments, 3);
        assert!(route.config.return_to_origin);
        assert_eq!(route.segments[1].kind(), SegmentKind::Curved);

        // Consecutive segments are joined
        for pair in route.segments.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
    }
}
