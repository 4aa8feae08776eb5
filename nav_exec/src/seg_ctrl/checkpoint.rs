//! # Checkpoint tracking
//!
//! The checkpoint tracker owns the progress along the route: the index of the
//! active segment, the index of the target waypoint (the checkpoint) within
//! that segment's sequence, and the goal reached flag.
//!
//! ```text
//! AwaitingTarget --(sequence built)--> Advancing --(last checkpoint)--> ApproachingEnd
//!       ^                                                                     |
//!       +---------------------(segment done, more to go)----------------------+
//!                                                                             |
//!                                               RouteDone <---(route done)----+
//! ```
//!
//! When the route returns to its origin the start of the first segment is
//! captured, and once the last segment is done a final leg with the origin as
//! its only waypoint is driven before the route is done.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use super::SegCtrlError;
use crate::{
    route::{RouteConfig, Segment, SegmentKind},
    traj::{self, LegContext, Waypoints},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Distance thresholds driving the checkpoint progression.
#[derive(Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct CheckpointParams {
    /// Linear segments: the checkpoint advances when the target is strictly
    /// closer than this.
    ///
    /// Units: meters
    pub linear_activator_m: f64,

    /// Linear segments: activation distance used instead of
    /// `linear_activator_m` while heading for the first waypoint of the route.
    ///
    /// Units: meters
    pub linear_first_activator_m: f64,

    /// Linear segments: the segment is done when the last waypoint is at most
    /// this far.
    ///
    /// Units: meters
    pub linear_stop_m: f64,

    /// Curved segments: the checkpoint advances when the target is at most
    /// this far.
    ///
    /// Units: meters
    pub curve_activator_m: f64,

    /// Curved segments: the segment is done when the last waypoint is at most
    /// this far.
    ///
    /// Units: meters
    pub curve_stop_m: f64,
}

/// The waypoint the robot is heading for this cycle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Target {
    pub point_m: Vector2<f64>,

    /// Checkpoint index of the target
    pub index: usize,

    /// The target is the last waypoint of its sequence
    pub is_last: bool,

    /// Kind of the leg being driven, the return leg counts as linear
    pub kind: SegmentKind,

    /// The leg is the last segment of the route
    pub final_leg: bool,
}

/// Tracks progress along the route.
#[derive(Debug, Clone)]
pub struct CheckpointTracker {
    params: CheckpointParams,
    route: RouteConfig,

    state: CheckpointState,

    /// Index of the active segment. Equal to the total number of segments
    /// on the return leg, or once the route is done.
    segment_index: usize,

    /// Index of the target waypoint in the sequence
    checkpoint_index: usize,

    goal_reached: bool,

    /// Waypoints of the active leg
    waypoints: Option<Waypoints>,

    /// Kind of the active leg, set when its waypoints are built
    leg_kind: SegmentKind,

    /// Start of the first segment, captured for the return leg
    origin_m: Option<Vector2<f64>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum CheckpointState {
    /// No sequence for the active leg yet
    AwaitingTarget,

    /// Heading for a waypoint which isn't the last one
    Advancing,

    /// Heading for the last waypoint of the leg
    ApproachingEnd,

    /// Every leg is complete
    RouteDone,
}

/// Outcome of a progress update.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Target not reached yet
    Hold,

    /// Moved on to the given checkpoint
    Advanced(usize),

    /// A segment of the route is complete. `goal_reached` is false when the
    /// return leg still has to be driven.
    SegmentDone {
        segment_index: usize,
        goal_reached: bool,
    },

    /// The route is complete
    RouteDone,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CheckpointTracker {
    pub fn new(params: CheckpointParams, route: RouteConfig) -> Self {
        Self {
            params,
            route,
            state: CheckpointState::AwaitingTarget,
            segment_index: 0,
            checkpoint_index: 0,
            goal_reached: false,
            waypoints: None,
            leg_kind: SegmentKind::Linear,
            origin_m: None,
        }
    }

    /// Prepare for a newly assigned goal segment.
    ///
    /// Clears the goal reached flag. When the segment differs from the one
    /// being driven any partial progress on the old one is dropped.
    pub fn new_goal(&mut self, changed: bool) {
        self.goal_reached = false;

        if changed && !self.is_return_leg() && self.state != CheckpointState::RouteDone {
            self.checkpoint_index = 0;
            self.waypoints = None;
            self.state = CheckpointState::AwaitingTarget;
        }
    }

    /// Get the target waypoint for this cycle, building the leg's waypoints
    /// if they don't exist yet.
    pub fn resolve_target(
        &mut self,
        segment: Option<&Segment>,
        traj_params: &traj::Params,
    ) -> Result<Target, SegCtrlError> {
        if self.state == CheckpointState::RouteDone {
            return Err(SegCtrlError::RouteDone);
        }

        let return_leg = self.is_return_leg();

        if self.waypoints.is_none() {
            let (waypoints, kind) = if return_leg {
                let origin_m = self.origin_m.ok_or(SegCtrlError::NoOrigin)?;
                (Waypoints::single(origin_m), SegmentKind::Linear)
            } else {
                let segment = segment.ok_or(SegCtrlError::NoGoal)?;

                if self.route.return_to_origin && self.segment_index == 0 {
                    self.origin_m = Some(segment.start());
                }

                let ctx = LegContext {
                    first_segment: self.segment_index == 0,
                    closing_leg: self.route.return_to_origin && self.is_last_segment(),
                };

                (
                    Waypoints::for_segment(segment, ctx, traj_params)?,
                    segment.kind(),
                )
            };

            info!(
                "Leg {} ready with {} waypoints",
                self.segment_index,
                waypoints.len()
            );

            self.waypoints = Some(waypoints);
            self.leg_kind = kind;
            self.checkpoint_index = 0;
        }

        let (point_m, last_index) = self.current_point()?;

        self.state = if self.checkpoint_index == last_index {
            CheckpointState::ApproachingEnd
        } else {
            CheckpointState::Advancing
        };

        Ok(Target {
            point_m,
            index: self.checkpoint_index,
            is_last: self.checkpoint_index == last_index,
            kind: self.leg_kind,
            final_leg: self.is_last_segment(),
        })
    }

    /// Update progress from the distance to the current target.
    pub fn update(&mut self, distance_m: f64) -> Result<Transition, SegCtrlError> {
        let (_, last_index) = self.current_point()?;
        let at_last = self.checkpoint_index == last_index;

        let (activator_m, stop_m, inclusive) = match self.leg_kind {
            SegmentKind::Linear => {
                let activator_m = if self.segment_index == 0 && self.checkpoint_index == 0 {
                    self.params.linear_first_activator_m
                } else {
                    self.params.linear_activator_m
                };
                (activator_m, self.params.linear_stop_m, false)
            }
            SegmentKind::Curved => (
                self.params.curve_activator_m,
                self.params.curve_stop_m,
                true,
            ),
        };

        if at_last && distance_m <= stop_m {
            return Ok(self.complete_leg());
        }

        let within = if inclusive {
            distance_m <= activator_m
        } else {
            distance_m < activator_m
        };

        if !at_last && within {
            self.checkpoint_index += 1;
            self.state = if self.checkpoint_index == last_index {
                CheckpointState::ApproachingEnd
            } else {
                CheckpointState::Advancing
            };

            debug!(
                "Checkpoint {}/{} of leg {}",
                self.checkpoint_index, last_index, self.segment_index
            );

            return Ok(Transition::Advanced(self.checkpoint_index));
        }

        Ok(Transition::Hold)
    }

    pub fn state(&self) -> CheckpointState {
        self.state
    }

    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    pub fn checkpoint_index(&self) -> usize {
        self.checkpoint_index
    }

    pub fn is_goal_reached(&self) -> bool {
        self.goal_reached
    }

    pub fn is_route_done(&self) -> bool {
        self.state == CheckpointState::RouteDone
    }

    /// True while driving back to the origin.
    pub fn is_return_leg(&self) -> bool {
        self.route.return_to_origin && self.segment_index == self.route.total_segments
    }

    pub fn waypoints(&self) -> Option<&Waypoints> {
        self.waypoints.as_ref()
    }

    fn is_last_segment(&self) -> bool {
        self.segment_index + 1 == self.route.total_segments
    }

    /// The current target point and the last index of the sequence.
    fn current_point(&self) -> Result<(Vector2<f64>, usize), SegCtrlError> {
        let waypoints = self.waypoints.as_ref().ok_or(SegCtrlError::NoWaypoints)?;

        match (
            waypoints.get(self.checkpoint_index),
            waypoints.last_index(),
        ) {
            (Some(p), Some(last)) => Ok((*p, last)),
            _ => Err(SegCtrlError::CheckpointOutOfRange {
                index: self.checkpoint_index,
                len: waypoints.len(),
            }),
        }
    }

    /// Terminal checkpoint reached, move to the next leg.
    fn complete_leg(&mut self) -> Transition {
        self.waypoints = None;
        self.checkpoint_index = 0;

        if self.is_return_leg() {
            self.goal_reached = true;
            self.state = CheckpointState::RouteDone;

            info!("Returned to origin, route complete");

            return Transition::RouteDone;
        }

        self.segment_index += 1;

        let route_end = self.segment_index == self.route.total_segments;

        // The return leg is still to come
        self.goal_reached = !(self.route.return_to_origin && route_end);

        self.state = if route_end && !self.route.return_to_origin {
            CheckpointState::RouteDone
        } else {
            CheckpointState::AwaitingTarget
        };

        info!(
            "Segment {} of {} done",
            self.segment_index, self.route.total_segments
        );

        if self.state == CheckpointState::RouteDone {
            info!("Route complete");
        }

        Transition::SegmentDone {
            segment_index: self.segment_index,
            goal_reached: self.goal_reached,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::traj::{geom::OffsetPolicy, CurveStyle};

    fn params() -> CheckpointParams {
        CheckpointParams {
            linear_activator_m: 0.5,
            linear_first_activator_m: 2.0,
            linear_stop_m: 0.5,
            curve_activator_m: 1.5,
            curve_stop_m: 0.5,
        }
    }

    fn traj_params() -> traj::Params {
        traj::Params {
            line_checkpoints: 20,
            line_round_decimals: 6,
            line_lead_in_factor: None,
            curve_style: CurveStyle::Simple,
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

    fn route(total_segments: usize, return_to_origin: bool) -> RouteConfig {
        RouteConfig {
            total_segments,
            return_to_origin,
        }
    }

    fn line() -> Segment {
        Segment::linear(Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0))
    }

    #[test]
    fn test_activators() {
        let mut t = CheckpointTracker::new(params(), route(2, false));
        let seg = line();

        // Coarse activator on the very first waypoint
        t.resolve_target(Some(&seg), &traj_params()).unwrap();
        assert_eq!(t.update(1.9).unwrap(), Transition::Advanced(1));

        // Fine activator, strict
        t.resolve_target(Some(&seg), &traj_params()).unwrap();
        assert_eq!(t.update(0.5).unwrap(), Transition::Hold);
        assert_eq!(t.update(0.49).unwrap(), Transition::Advanced(2));

        // Curves use an inclusive activator
        let mut t = CheckpointTracker::new(params(), route(2, false));
        let curve = Segment::curved(
            Vector2::new(0.0, 0.0),
            Vector2::new(5.0, 5.0),
            Vector2::new(10.0, 0.0),
        );
        t.resolve_target(Some(&curve), &traj_params()).unwrap();
        assert_eq!(t.update(1.5).unwrap(), Transition::Advanced(1));
        assert_eq!(t.update(1.51).unwrap(), Transition::Hold);
    }

    #[test]
    fn test_checkpoint_bounds() {
        let mut t = CheckpointTracker::new(params(), route(2, false));
        let seg = line();

        let target = t.resolve_target(Some(&seg), &traj_params()).unwrap();
        assert_eq!(target.index, 0);
        assert_eq!(t.state(), CheckpointState::Advancing);

        for i in 1..22 {
            assert_eq!(t.update(2.5).unwrap(), Transition::Hold);
            assert_eq!(t.update(0.0).unwrap(), Transition::Advanced(i));
            t.resolve_target(Some(&seg), &traj_params()).unwrap();
        }

        // At the last index, far from the end: never past the end
        assert_eq!(t.state(), CheckpointState::ApproachingEnd);
        for _ in 0..10 {
            assert_eq!(t.update(0.51).unwrap(), Transition::Hold);
            assert_eq!(t.checkpoint_index(), 21);
        }

        assert_eq!(
            t.update(0.5).unwrap(),
            Transition::SegmentDone {
                segment_index: 1,
                goal_reached: true
            }
        );
        assert_eq!(t.checkpoint_index(), 0);
        assert!(t.waypoints().is_none());
        assert_eq!(t.state(), CheckpointState::AwaitingTarget);
    }

    #[test]
    fn test_return_to_origin() {
        let mut t = CheckpointTracker::new(params(), route(1, true));
        let seg = Segment::linear(Vector2::new(1.0, 2.0), Vector2::new(10.0, 0.0));

        t.resolve_target(Some(&seg), &traj_params()).unwrap();
        while t.checkpoint_index() < 21 {
            t.update(0.0).unwrap();
        }

        // Last segment done, but the return leg remains
        assert_eq!(
            t.update(0.0).unwrap(),
            Transition::SegmentDone {
                segment_index: 1,
                goal_reached: false
            }
        );
        assert!(!t.is_goal_reached());
        assert!(t.is_return_leg());

        // The only waypoint of the return leg is the origin
        let target = t.resolve_target(Some(&seg), &traj_params()).unwrap();
        assert_eq!(target.point_m, Vector2::new(1.0, 2.0));
        assert!(target.is_last);
        assert_eq!(t.waypoints().map(|w| w.len()), Some(1));

        assert_eq!(t.update(0.6).unwrap(), Transition::Hold);
        assert_eq!(t.update(0.1).unwrap(), Transition::RouteDone);
        assert!(t.is_goal_reached());
        assert!(t.is_route_done());
        assert_eq!(t.segment_index(), 1);

        assert!(matches!(
            t.resolve_target(Some(&seg), &traj_params()),
            Err(SegCtrlError::RouteDone)
        ));
    }

    #[test]
    fn test_route_done_without_return() {
        let mut t = CheckpointTracker::new(params(), route(1, false));
        let seg = line();

        t.resolve_target(Some(&seg), &traj_params()).unwrap();
        while t.checkpoint_index() < 21 {
            t.update(0.0).unwrap();
        }
        t.update(0.2).unwrap();

        assert!(t.is_goal_reached());
        assert!(t.is_route_done());
        assert_eq!(t.segment_index(), 1);
    }

    #[test]
    fn test_new_goal() {
        let mut t = CheckpointTracker::new(params(), route(2, false));
        let seg = line();

        t.resolve_target(Some(&seg), &traj_params()).unwrap();
        t.update(0.0).unwrap();
        assert_eq!(t.checkpoint_index(), 1);

        // Same goal again keeps the progress
        t.new_goal(false);
        assert_eq!(t.checkpoint_index(), 1);

        // A different goal restarts the sequence
        t.new_goal(true);
        assert_eq!(t.checkpoint_index(), 0);
        assert!(t.waypoints().is_none());
    }

    #[test]
    fn test_missing_goal() {
        let mut t = CheckpointTracker::new(params(), route(2, false));

        assert!(matches!(
            t.resolve_target(None, &traj_params()),
            Err(SegCtrlError::NoGoal)
        ));
        assert!(matches!(t.update(0.0), Err(SegCtrlError::NoWaypoints)));
    }
}
