use anyhow::{Context, Result, bail};
use cacheplan_model::{PlanOptions, PlanStatus, ProblemInstance, build_model, plan, read_instance};
use cacheplan_solver::SolverSettings;
use cacheplan_solver::mps::write_mps;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "cacheplan")]
#[command(version, about = "Places content on capacity-limited caches to maximize latency savings", long_about = None)]
struct Cli {
    /// Log more (repeat for trace output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a dataset and write the placement
    Solve {
        /// The dataset to solve
        dataset: PathBuf,
        /// Write the submission here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also export the model in MPS format
        #[arg(long)]
        mps: Option<PathBuf>,
        /// Report format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
        #[command(flatten)]
        options: SolveOptions,
    },
    /// Validate a dataset and print model dimensions
    Check {
        /// The dataset to check
        dataset: PathBuf,
    },
    /// Write the model of a dataset in MPS format
    Export {
        /// The dataset to export
        dataset: PathBuf,
        /// Destination MPS file
        output: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Submission on stdout, summary on stderr
    Text,
    /// Full report as JSON on stdout
    Json,
}

#[derive(Args)]
struct SolveOptions {
    /// Relative optimality gap at which to stop
    #[arg(long, env = "CACHEPLAN_GAP", default_value_t = 0.005)]
    gap: f64,
    /// Wall-clock budget in seconds
    #[arg(long, env = "CACHEPLAN_TIME_LIMIT")]
    time_limit: Option<f64>,
    /// Maximum number of search nodes
    #[arg(long, env = "CACHEPLAN_NODE_LIMIT")]
    node_limit: Option<u64>,
    /// Search worker threads
    #[arg(long, env = "CACHEPLAN_THREADS", default_value_t = 1)]
    threads: usize,
    /// Integrality tolerance
    #[arg(long, env = "CACHEPLAN_TOLERANCE", default_value_t = 1e-6)]
    tolerance: f64,
    /// Progress line every N nodes (0 disables)
    #[arg(long, env = "CACHEPLAN_LOG_INTERVAL", default_value_t = 1000)]
    log_interval: u64,
    /// Do not seed the search with the greedy placement
    #[arg(long, env = "CACHEPLAN_NO_WARM_START")]
    no_warm_start: bool,
}

impl SolveOptions {
    fn to_plan_options(&self) -> Result<PlanOptions> {
        if self.gap.is_nan() || self.gap < 0.0 {
            bail!("--gap must be a non-negative number, got {}", self.gap);
        }
        if self.tolerance.is_nan() || self.tolerance <= 0.0 || self.tolerance >= 0.5 {
            bail!("--tolerance must lie in (0, 0.5), got {}", self.tolerance);
        }

        let mut solver = SolverSettings::new()
            .with_gap_tolerance(self.gap)
            .with_integrality_tolerance(self.tolerance)
            .with_threads(self.threads)
            .with_log_interval(self.log_interval);
        if let Some(seconds) = self.time_limit {
            let limit = Duration::try_from_secs_f64(seconds)
                .with_context(|| format!("invalid --time-limit {}", seconds))?;
            solver = solver.with_time_limit(limit);
        }
        if let Some(nodes) = self.node_limit {
            solver = solver.with_node_limit(nodes);
        }

        Ok(PlanOptions::default()
            .with_solver(solver)
            .with_warm_start(!self.no_warm_start))
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        Level::WARN
    } else {
        match cli.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn load(dataset: &Path) -> Result<ProblemInstance> {
    read_instance(dataset).with_context(|| format!("failed to read dataset {}", dataset.display()))
}

fn export(instance: &ProblemInstance, path: &Path) -> Result<()> {
    let model = build_model(instance)?;
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_mps(model.problem(), "cacheplan", &mut out)
        .and_then(|()| out.flush())
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "model exported");
    Ok(())
}

fn solve(dataset: &Path, output: Option<&Path>, mps: Option<&Path>, format: Format, options: &SolveOptions) -> Result<()> {
    let plan_options = options.to_plan_options()?;
    let instance = load(dataset)?;

    if let Some(path) = mps {
        export(&instance, path)?;
    }

    let report = plan(&instance, &plan_options).context("planning failed")?;
    if report.status == PlanStatus::NoSolution {
        warn!("no solution available, writing an empty placement");
    }

    if let Some(path) = output {
        report
            .placement
            .write_submission(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    match format {
        Format::Json => {
            let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
            println!("{}", json);
        }
        Format::Text => {
            if output.is_none() {
                print!("{}", report.placement);
            }
            eprintln!("{}", report);
        }
    }

    Ok(())
}

fn check(dataset: &Path) -> Result<()> {
    let instance = load(dataset)?;
    let model = build_model(&instance)?;
    println!("Dataset: {}", dataset.display());
    println!(
        "Items: {}  Caches: {}  Endpoints: {}  Requests: {}",
        instance.num_items(),
        instance.num_caches(),
        instance.num_endpoints(),
        instance.num_requests()
    );
    println!(
        "Variables: {} ({} store, {} serve)  Constraints: {}",
        model.problem().num_variables(),
        model.num_store_vars(),
        model.num_serve_vars(),
        model.problem().num_constraints()
    );
    println!("OK");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match &cli.command {
        Commands::Solve {
            dataset,
            output,
            mps,
            format,
            options,
        } => solve(dataset, output.as_deref(), mps.as_deref(), *format, options),
        Commands::Check { dataset } => check(dataset),
        Commands::Export { dataset, output } => {
            let instance = load(dataset)?;
            export(&instance, output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_solve_flags() {
        let cli = Cli::try_parse_from([
            "cacheplan",
            "solve",
            "data.in",
            "--gap",
            "0.01",
            "--node-limit",
            "500",
            "--time-limit",
            "2.5",
            "--no-warm-start",
            "-o",
            "out.txt",
        ])
        .unwrap();

        let Commands::Solve { output, options, .. } = cli.command else {
            panic!("expected solve");
        };
        assert_eq!(output, Some(PathBuf::from("out.txt")));

        let plan_options = options.to_plan_options().unwrap();
        assert!(!plan_options.warm_start);
        assert_eq!(plan_options.solver.gap_tolerance, 0.01);
        assert_eq!(plan_options.solver.node_limit, Some(500));
        assert_eq!(plan_options.solver.time_limit, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_rejects_negative_time_limit() {
        let cli = Cli::try_parse_from(["cacheplan", "solve", "data.in", "--time-limit=-1"]).unwrap();
        let Commands::Solve { options, .. } = cli.command else {
            panic!("expected solve");
        };
        assert!(options.to_plan_options().is_err());
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["cacheplan", "-v", "-q", "check", "data.in"]).is_err());
    }
}
