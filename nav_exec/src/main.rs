//! Main navigation executable entry point.
//!
//! # Architecture
//!
//! The executable drives a simulated robot along the route described in the
//! route parameter file:
//!
//!     - Initialise the session, logging and the segment controller
//!     - Main loop:
//!         - Get the pose from the simulator
//!         - Segment control processing
//!         - Archive the cycle
//!         - Assign the next goal segment once the current one is reached
//!         - Step the simulator with the command
//!
//! The loop ends when the route is done or the cycle limit is hit.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, warn};
use serde::Serialize;
use structopt::StructOpt;

// Internal
use nav_lib::{
    loc::Pose,
    policy::MoveMode,
    route::{Route, RouteSpec},
    seg_ctrl::{CheckpointState, SegCtrl, StatusReport},
    sim::UnicycleSim,
};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.10;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive a simulated robot along a route of linear and curved segments.
#[derive(Debug, StructOpt)]
#[structopt(name = "nav_exec")]
struct Opt {
    /// Segment control parameter file, relative to the params directory
    #[structopt(long, default_value = "seg_ctrl.toml")]
    params: String,

    /// Route file, relative to the params directory
    #[structopt(long, default_value = "route.toml")]
    route: String,

    /// Maximum number of cycles to run for
    #[structopt(long, default_value = "5000")]
    max_cycles: u64,
}

/// One row of the cycle archive.
#[derive(Serialize)]
struct CycleRecord {
    time_s: f64,
    x_m: f64,
    y_m: f64,
    heading_deg: f64,
    segment_index: usize,
    checkpoint_index: usize,
    state: CheckpointState,
    target_x_m: f64,
    target_y_m: f64,
    distance_m: f64,
    head_err_deg: f64,
    speed_ms: f64,
    turn_rate_rads: f64,
    mode: MoveMode,
    braking: bool,
    goal_reached: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("nav_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Segment Navigation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD ROUTE ----

    let route_spec: RouteSpec =
        util::params::load(&opt.route).wrap_err("Could not load the route")?;
    let route = Route::from_spec(route_spec).wrap_err("Invalid route")?;

    info!(
        "Route loaded: {} segments, return to origin: {}",
        route.config.total_segments, route.config.return_to_origin
    );

    // ---- INITIALISE MODULES ----

    let mut seg_ctrl =
        SegCtrl::init(&opt.params, route.config).wrap_err("Failed to initialise SegCtrl")?;
    info!("SegCtrl init complete");

    // Start on the first segment, facing its end
    let first = *route
        .segments
        .first()
        .ok_or_else(|| eyre!("The route has no segments"))?;
    let dir = first.end() - first.start();
    let mut sim = UnicycleSim::new(
        Pose::new(
            first.start()[0],
            first.start()[1],
            dir[1].atan2(dir[0]).to_degrees(),
        ),
        *seg_ctrl.limits(),
    );

    let mut archiver =
        Archiver::from_path(&session, "seg_ctrl.csv").wrap_err("Failed to create the archive")?;

    seg_ctrl.set_goal(first);

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let mut route_done = false;

    for cycle in 0..opt.max_cycles {
        let time_s = cycle as f64 * CYCLE_PERIOD_S;
        let pose = sim.pose();

        let cmd = seg_ctrl
            .decide(&pose)
            .wrap_err_with(|| format!("SegCtrl failed at {:.1} s", time_s))?;

        archiver
            .serialise(CycleRecord::new(time_s, &pose, &seg_ctrl.report()))
            .wrap_err("Failed to archive the cycle")?;

        if seg_ctrl.is_route_done() {
            info!("Route complete after {:.1} s", time_s);
            route_done = true;
            break;
        }

        // Feed the next segment once the current one is reached
        if seg_ctrl.is_goal_reached() {
            if let Some(next) = route.segments.get(seg_ctrl.segment_index()) {
                seg_ctrl.set_goal(*next);
            }
        }

        sim.step(&cmd, CYCLE_PERIOD_S);
    }

    if !route_done {
        warn!(
            "Cycle limit of {} reached before the route was complete",
            opt.max_cycles
        );
    }

    let pose = sim.pose();
    info!(
        "Final pose: ({:.3}, {:.3}) heading {:.2} deg",
        pose.x_m, pose.y_m, pose.heading_deg
    );

    Ok(())
}

impl CycleRecord {
    fn new(time_s: f64, pose: &Pose, report: &StatusReport) -> Self {
        Self {
            time_s,
            x_m: pose.x_m,
            y_m: pose.y_m,
            heading_deg: pose.heading_deg,
            segment_index: report.segment_index,
            checkpoint_index: report.checkpoint_index,
            state: report.state,
            target_x_m: report.target_x_m,
            target_y_m: report.target_y_m,
            distance_m: report.distance_m,
            head_err_deg: report.head_err_deg,
            speed_ms: report.speed_ms,
            turn_rate_rads: report.turn_rate_rads,
            mode: report.mode,
            braking: report.braking,
            goal_reached: report.goal_reached,
        }
    }
}
