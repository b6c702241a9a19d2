//! Coiled Tubing Trip Simulation
//!
//! Generates synthetic injector telemetry for one CT trip, for feeding
//! `ct-integrity ingest`. The trip runs through four phases:
//! - Rig-up idle at surface
//! - Run in hole to target depth
//! - On-depth work with the pumps on
//! - Pull out of hole
//!
//! # Usage
//! ```bash
//! ct-trip-sim --samples 600 --speed 0 | ct-integrity ingest --reel <REEL_ID>
//! ```

use std::io::{self, Write};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use uuid::Uuid;

use ct_integrity::config::{defaults, ForceConfig};
use ct_integrity::physics_engine::{ForceProfiler, TubingGeometry};
use ct_integrity::{TelemetrySample, TravelDirection};

// ============================================================================
// Trip Constants
// ============================================================================

/// Wellhead pressure while running in (psi)
const RUN_IN_PRESSURE: f64 = 500.0;
/// Wellhead pressure while pulling out (psi)
const PULL_OUT_PRESSURE: f64 = 300.0;
/// Injector overpull above string weight (lbf)
const RUN_IN_OVERPULL: f64 = 1_000.0;
const PULL_OUT_OVERPULL: f64 = 2_000.0;
const WORK_OVERPULL: f64 = 800.0;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "ct-trip-sim")]
#[command(about = "Synthetic coiled tubing trip telemetry for ct-integrity testing")]
#[command(version = "1.0")]
struct Args {
    /// Number of samples in the whole trip
    #[arg(short = 'n', long, default_value = "600", value_parser = clap::value_parser!(u32).range(10..=1_000_000))]
    samples: u32,

    /// Target depth (ft)
    #[arg(long, default_value_t = defaults::DEFAULT_TARGET_DEPTH_FT)]
    depth: f64,

    /// Pump pressure while on depth (psi)
    #[arg(long, default_value = "4000")]
    work_pressure: f64,

    /// Tubing outer diameter (in)
    #[arg(long, default_value_t = defaults::DEFAULT_TUBING_OD_IN)]
    od: f64,

    /// Tubing inner diameter (in)
    #[arg(long, default_value_t = defaults::DEFAULT_TUBING_ID_IN)]
    id: f64,

    /// Time compression factor (1 = one sample per second, 0 = no delay)
    #[arg(short, long, default_value = "0")]
    speed: u64,

    /// Output format: json or csv
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Tag every sample with this job id (JSON only)
    #[arg(long)]
    job: Option<Uuid>,

    /// Suppress the trip log on stderr
    #[arg(short, long)]
    quiet: bool,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,
}

// ============================================================================
// Trip Phases
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TripPhase {
    /// 0-5%
    Idle,
    /// 5-45%
    RunIn,
    /// 45-60%
    Work,
    /// 60-95%
    PullOut,
    /// 95-100%
    RigDown,
}

impl TripPhase {
    fn name(self) -> &'static str {
        match self {
            TripPhase::Idle => "Rig-up (idle at surface)",
            TripPhase::RunIn => "Run in hole",
            TripPhase::Work => "On depth (pumping)",
            TripPhase::PullOut => "Pull out of hole",
            TripPhase::RigDown => "Rig-down (idle at surface)",
        }
    }

    fn from_progress(progress: f64) -> Self {
        match progress {
            p if p < 0.05 => TripPhase::Idle,
            p if p < 0.45 => TripPhase::RunIn,
            p if p < 0.60 => TripPhase::Work,
            p if p < 0.95 => TripPhase::PullOut,
            _ => TripPhase::RigDown,
        }
    }

    fn direction(self) -> TravelDirection {
        match self {
            TripPhase::RunIn => TravelDirection::In,
            TripPhase::PullOut => TravelDirection::Out,
            TripPhase::Idle | TripPhase::Work | TripPhase::RigDown => TravelDirection::Stopped,
        }
    }
}

// ============================================================================
// Trip State
// ============================================================================

struct TripState {
    rng: StdRng,
    phase: TripPhase,
    step: u32,
    total_steps: u32,
    target_depth_ft: f64,
    work_pressure_psi: f64,
    weight_lbf_ft: f64,
    started_at: DateTime<Utc>,
    pressure_noise: Normal<f64>,
    tension_noise: Normal<f64>,
}

impl TripState {
    fn new(args: &Args) -> Result<Self, Box<dyn std::error::Error>> {
        let rng = match args.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let profiler = ForceProfiler::new(ForceConfig::default(), 1);
        let weight_lbf_ft = profiler.linear_weight_lbf_ft(&TubingGeometry::new(args.od, args.id));

        Ok(Self {
            rng,
            phase: TripPhase::Idle,
            step: 0,
            total_steps: args.samples,
            target_depth_ft: args.depth.max(0.0),
            work_pressure_psi: args.work_pressure.max(0.0),
            weight_lbf_ft,
            started_at: Utc::now(),
            pressure_noise: Normal::new(0.0, 25.0)?,
            tension_noise: Normal::new(0.0, 150.0)?,
        })
    }

    fn progress(&self) -> f64 {
        f64::from(self.step) / f64::from(self.total_steps)
    }

    /// Returns true on a phase change.
    fn update_phase(&mut self) -> bool {
        let next = TripPhase::from_progress(self.progress());
        let changed = next != self.phase || self.step == 0;
        self.phase = next;
        changed
    }

    fn depth_ft(&self) -> f64 {
        let p = self.progress();
        match self.phase {
            TripPhase::Idle | TripPhase::RigDown => 0.0,
            TripPhase::RunIn => self.target_depth_ft * (p - 0.05) / 0.40,
            TripPhase::Work => self.target_depth_ft,
            TripPhase::PullOut => self.target_depth_ft * (1.0 - (p - 0.60) / 0.35),
        }
    }

    fn next_sample(&mut self, job_id: Option<Uuid>) -> TelemetrySample {
        let depth = self.depth_ft().clamp(0.0, self.target_depth_ft);
        let (pressure, overpull) = match self.phase {
            TripPhase::Idle | TripPhase::RigDown => (0.0, 0.0),
            TripPhase::RunIn => (RUN_IN_PRESSURE, RUN_IN_OVERPULL),
            TripPhase::Work => (self.work_pressure_psi, WORK_OVERPULL),
            TripPhase::PullOut => (PULL_OUT_PRESSURE, PULL_OUT_OVERPULL),
        };

        let pressure = (pressure + self.pressure_noise.sample(&mut self.rng)).max(0.0);
        let tension = (self.weight_lbf_ft * depth
            + overpull
            + self.tension_noise.sample(&mut self.rng))
        .max(0.0);

        let mut sample = TelemetrySample::new(pressure, tension, self.phase.direction());
        sample.job_id = job_id;
        sample.timestamp = Some(self.started_at + chrono::Duration::seconds(i64::from(self.step)));
        self.step += 1;
        sample
    }
}

fn log_trip(step: u32, message: &str, quiet: bool) {
    if !quiet {
        eprintln!("[{step:>7}] {message}");
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut state = TripState::new(&args)?;

    let delay = if args.speed == 0 {
        None
    } else {
        Some(Duration::from_millis(defaults::TRIP_SIM_BASE_DELAY_MS / args.speed))
    };

    log_trip(0, &"=".repeat(60), args.quiet);
    log_trip(0, "CT TRIP SIMULATION", args.quiet);
    log_trip(0, &format!("  Target depth: {:.0} ft", state.target_depth_ft), args.quiet);
    log_trip(0, &format!("  Tubing: {:.3} x {:.3} in ({:.2} lb/ft)", args.od, args.id, state.weight_lbf_ft), args.quiet);
    log_trip(0, &format!("  Work pressure: {:.0} psi", state.work_pressure_psi), args.quiet);
    log_trip(0, &format!("  Samples: {}", args.samples), args.quiet);
    if let Some(seed) = args.seed {
        log_trip(0, &format!("  Random seed: {seed}"), args.quiet);
    }
    log_trip(0, &"=".repeat(60), args.quiet);

    if args.format == "csv" {
        println!("pressure_psi,tension_lbf,temperature_f,direction");
    }

    let start_time = Instant::now();
    let mut stdout_lock = io::stdout().lock();

    while state.step < state.total_steps {
        let loop_start = Instant::now();

        if state.update_phase() {
            log_trip(state.step, &format!(">>> PHASE: {}", state.phase.name()), args.quiet);
        }

        let sample = state.next_sample(args.job);
        match args.format.as_str() {
            "csv" => writeln!(
                stdout_lock,
                "{:.1},{:.1},{:.1},{}",
                sample.pressure_psi,
                sample.tension_lbf,
                sample.temperature_f,
                sample.direction.map_or("", |d| d.as_str()),
            )?,
            _ => writeln!(stdout_lock, "{}", serde_json::to_string(&sample)?)?,
        }
        stdout_lock.flush()?;

        if let Some(interval) = delay {
            let elapsed = loop_start.elapsed();
            if elapsed < interval {
                std::thread::sleep(interval - elapsed);
            }
        }
    }

    drop(stdout_lock);
    log_trip(state.step, &"=".repeat(60), args.quiet);
    log_trip(
        state.step,
        &format!("TRIP COMPLETE in {:.1}s", start_time.elapsed().as_secs_f64()),
        args.quiet,
    );
    Ok(())
}
