//! ct-integrity - Coiled Tubing Reel Fatigue and Job Simulation
//!
//! Command-line front end over the reel fatigue service and job simulator.
//! Results go to stdout as JSON; logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Register a reel from a TOML or JSON description
//! ct-integrity register-reel --file reel.toml
//!
//! # Stream telemetry for a reel (JSON lines on stdin, or a CSV file)
//! ct-trip-sim --samples 200 | ct-integrity ingest --reel <REEL_ID>
//! ct-integrity ingest --reel <REEL_ID> --csv trip.csv
//!
//! # Check a job plan before dispatch
//! ct-integrity simulate --plan plan.json
//! ```
//!
//! # Environment Variables
//!
//! - `CT_INTEGRITY_CONFIG`: Path to the engine TOML config
//! - `RUST_LOG`: Logging level (default: info)

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use ct_integrity::acquisition::{
    CsvTelemetrySource, JsonLinesSource, SampleEvent, TelemetrySource,
};
use ct_integrity::config::{self, EngineConfig};
use ct_integrity::physics_engine::known_grades;
use ct_integrity::{
    FatigueAccumulator, JobPlan, JobSimulator, NewReel, PlannedJob, ReelFatigueService,
    ServiceError, SledStore,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "ct-integrity")]
#[command(about = "Coiled tubing reel fatigue tracking and job simulation")]
#[command(version)]
struct CliArgs {
    /// Engine config TOML (overrides the CT_INTEGRITY_CONFIG / ./ct_config.toml search)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Register a new reel from a TOML or JSON description
    RegisterReel {
        /// Reel description file (.toml or .json)
        #[arg(long)]
        file: PathBuf,
        /// Tenant to register under when the file does not name one
        #[arg(long, env = "CT_INTEGRITY_TENANT")]
        tenant: Option<Uuid>,
    },

    /// Feed telemetry through the fatigue accumulator for one reel
    Ingest {
        #[arg(long)]
        reel: Uuid,
        /// Read CSV from this file instead of JSON lines from stdin
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Tag samples that carry no job id with this one
        #[arg(long)]
        job: Option<Uuid>,
    },

    /// Print a reel's fatigue audit trail
    History {
        #[arg(long)]
        reel: Uuid,
        /// Newest-first page size
        #[arg(long, default_value_t = config::defaults::DEFAULT_HISTORY_LIMIT)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// RFC 3339 lower bound; switches to an oldest-first range query
        #[arg(long, requires = "to")]
        from: Option<DateTime<Utc>>,
        /// RFC 3339 upper bound (inclusive)
        #[arg(long, requires = "from")]
        to: Option<DateTime<Utc>>,
    },

    /// Print a reel's current state
    Reel {
        #[arg(long)]
        reel: Uuid,
    },

    /// List reels, optionally only those above a fatigue percentage
    Reels {
        #[arg(long)]
        above: Option<f64>,
        #[arg(long)]
        tenant: Option<Uuid>,
    },

    /// Simulate one job plan, or a JSON array of plans
    Simulate {
        /// Plan file (.json or .toml)
        #[arg(long)]
        plan: PathBuf,
        /// Require a well name and positive target depth
        #[arg(long)]
        custom: bool,
    },

    /// Simulate a planned job against a registered reel
    SimulateJob {
        /// Planned job file (.json or .toml)
        #[arg(long)]
        job: PathBuf,
        #[arg(long)]
        reel: Uuid,
    },

    /// Print the effective engine configuration as TOML, then the known material grades
    Config,
}

// ============================================================================
// Helpers
// ============================================================================

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(p) => EngineConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(EngineConfig::load()),
    }
}

/// Deserialize a `.toml` file as TOML and anything else as JSON.
fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
    if is_toml {
        toml::from_str(&contents).with_context(|| format!("Invalid TOML in {}", path.display()))
    } else {
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid JSON in {}", path.display()))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn open_service(config: &EngineConfig) -> Result<ReelFatigueService> {
    let store = SledStore::open(&config.storage.path)
        .with_context(|| format!("Failed to open store at {}", config.storage.path))?;
    info!(
        path = %config.storage.path,
        size_bytes = store.size_bytes(),
        "Opened reel store"
    );
    Ok(ReelFatigueService::new(
        Arc::new(store),
        FatigueAccumulator::new(config.fatigue.clone()),
    ))
}

// ============================================================================
// Commands
// ============================================================================

#[derive(Debug, Default, Serialize)]
struct IngestSummary {
    accepted: usize,
    skipped: usize,
    malformed: usize,
    errored: usize,
}

fn run_ingest(
    service: &ReelFatigueService,
    reel_id: Uuid,
    job_id: Option<Uuid>,
    source: &mut dyn TelemetrySource,
) -> Result<IngestSummary> {
    info!(reel_id = %reel_id, source = source.source_name(), "Ingest started");
    let mut summary = IngestSummary::default();
    let mut out = io::stdout().lock();

    loop {
        let mut sample = match source.next_event()? {
            SampleEvent::Sample(sample) => sample,
            SampleEvent::Malformed { line, reason } => {
                warn!(line, %reason, "Skipping malformed telemetry line");
                summary.malformed += 1;
                continue;
            }
            SampleEvent::Eof => break,
        };
        if sample.job_id.is_none() {
            sample.job_id = job_id;
        }

        match service.process_sample(reel_id, &sample) {
            Ok(outcome) => {
                if outcome.is_accepted() {
                    summary.accepted += 1;
                } else {
                    summary.skipped += 1;
                }
                serde_json::to_writer(&mut out, &outcome)?;
                writeln!(out)?;
            }
            Err(ServiceError::Fatigue(e)) => {
                error!(error = %e, "Fatigue calculation failed, sample dropped");
                summary.errored += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(
        reel_id = %reel_id,
        accepted = summary.accepted,
        skipped = summary.skipped,
        malformed = summary.malformed,
        errored = summary.errored,
        "Ingest finished"
    );
    Ok(summary)
}

fn run_simulate(config: &EngineConfig, plan_path: &Path, custom: bool) -> Result<()> {
    let simulator = JobSimulator::new(config);
    let document: serde_json::Value = read_document(plan_path)?;

    let run = |plan: &JobPlan| {
        if custom {
            simulator.simulate_custom(plan)
        } else {
            simulator.simulate(plan)
        }
    };

    if document.is_array() {
        let plans: Vec<JobPlan> =
            serde_json::from_value(document).context("Invalid job plan array")?;
        info!(count = plans.len(), "Simulating job plan batch");
        let results: Vec<serde_json::Value> = if custom {
            plans
                .iter()
                .map(|p| match run(p) {
                    Ok(r) => serde_json::to_value(r).unwrap_or_default(),
                    Err(e) => serde_json::json!({ "error": e.to_string() }),
                })
                .collect()
        } else {
            simulator
                .simulate_batch(&plans)
                .into_iter()
                .map(|r| match r {
                    Ok(r) => serde_json::to_value(r).unwrap_or_default(),
                    Err(e) => serde_json::json!({ "error": e.to_string() }),
                })
                .collect()
        };
        print_json(&results)
    } else {
        let plan: JobPlan = serde_json::from_value(document).context("Invalid job plan")?;
        let result = run(&plan)?;
        print_json(&result)
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let engine_config = load_config(args.config.as_deref())?;
    config::init(engine_config);
    let cfg = config::get();
    info!(site = %cfg.site.name, "ct-integrity starting");

    match args.command {
        SubCommand::RegisterReel { file, tenant } => {
            let new_reel: NewReel = read_document(&file)?;
            let service = open_service(cfg)?;
            let reel = service.register_reel(new_reel, tenant.unwrap_or(Uuid::nil()))?;
            print_json(&reel)?;
        }

        SubCommand::Ingest { reel, csv, job } => {
            let service = open_service(cfg)?;
            let summary = match csv {
                Some(path) => {
                    let file = File::open(&path)
                        .with_context(|| format!("Failed to open {}", path.display()))?;
                    let mut source =
                        CsvTelemetrySource::new(BufReader::new(file), path.display().to_string());
                    run_ingest(&service, reel, job, &mut source)?
                }
                None => {
                    let mut source = JsonLinesSource::new(BufReader::new(io::stdin()), "stdin");
                    run_ingest(&service, reel, job, &mut source)?
                }
            };
            if summary.errored > 0 {
                warn!(errored = summary.errored, "Some samples could not be processed");
            }
        }

        SubCommand::History {
            reel,
            limit,
            offset,
            from,
            to,
        } => {
            let service = open_service(cfg)?;
            let records = match (from, to) {
                (Some(from), Some(to)) => {
                    if to < from {
                        bail!("--to must not be earlier than --from");
                    }
                    service.history_range(reel, from, to)?
                }
                _ => service.history(reel, offset, limit)?,
            };
            print_json(&records)?;
        }

        SubCommand::Reel { reel } => {
            let service = open_service(cfg)?;
            print_json(&service.reel(reel)?)?;
        }

        SubCommand::Reels { above, tenant } => {
            let service = open_service(cfg)?;
            let reels = match above {
                Some(threshold) => service.reels_above(tenant, threshold)?,
                None => service.store().list_reels(tenant)?,
            };
            print_json(&reels)?;
        }

        SubCommand::Simulate { plan, custom } => run_simulate(cfg, &plan, custom)?,

        SubCommand::SimulateJob { job, reel } => {
            let planned: PlannedJob = read_document(&job)?;
            let service = open_service(cfg)?;
            let simulator = JobSimulator::new(cfg);
            let result = service.simulate_job(&simulator, &planned, reel)?;
            print_json(&result)?;
        }

        SubCommand::Config => {
            print!("{}", cfg.to_toml()?);
            println!();
            println!("# Known material grades: {}", known_grades().join(", "));
        }
    }

    Ok(())
}
