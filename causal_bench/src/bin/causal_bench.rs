// src/bin/causal_bench.rs
//
// Causal integrity runner.
//
// Subcommands:
// - run:       generate the suite's scenarios, score the selected models,
//              print a PASS/FAIL table and save a timestamped JSON report
// - scenarios: list archetypes with their ground truth and expected
//              conversion rates
//
// Usage:
//   cargo run -p causal_bench -- run --samples 10000 --seed 42
//   cargo run -p causal_bench -- run --suite suites/canonical.yaml --markdown
//   cargo run -p causal_bench -- scenarios
//
// Exit status is 1 when any entry fails, so the runner can gate CI.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use causal_bench::report::format_distribution;
use causal_bench::{
    ConsoleSink, Harness, JsonFileSink, MarkdownFileSink, ReportSink, ScenarioKind,
    ScenarioParams, SuiteSpec,
};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ModelArg {
    LastTouch,
    Linear,
}

impl ModelArg {
    fn builtin_name(self) -> &'static str {
        match self {
            ModelArg::LastTouch => "last_touch",
            ModelArg::Linear => "linear",
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "causal_bench",
    about = "Score attribution models against synthetic ground-truth scenarios",
    version
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the validation suite.
    Run(RunArgs),
    /// List scenario archetypes.
    Scenarios,
}

#[derive(Debug, clap::Args)]
struct RunArgs {
    /// Suite manifest (YAML). Flags below override its values.
    #[arg(long)]
    suite: Option<PathBuf>,

    /// Records per scenario.
    #[arg(long)]
    samples: Option<usize>,

    /// Base seed; scenario k uses seed + k.
    #[arg(long)]
    seed: Option<u64>,

    /// Default pass threshold on the L1 error.
    #[arg(long)]
    tolerance: Option<f64>,

    /// Model to score (repeatable). Defaults to every built-in model.
    #[arg(long = "model", value_enum)]
    models: Vec<ModelArg>,

    /// Directory for the JSON report.
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,

    /// Also write a Markdown report next to the JSON one.
    #[arg(long)]
    markdown: bool,

    /// Skip writing reports to disk.
    #[arg(long)]
    no_save: bool,

    /// Print ground truth and estimates for every entry.
    #[arg(long)]
    details: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Run(args) => run(args),
        Command::Scenarios => {
            list_scenarios();
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn resolve_suite(args: &RunArgs) -> Result<SuiteSpec> {
    let mut spec = match &args.suite {
        Some(path) => SuiteSpec::from_yaml_file(path)
            .with_context(|| format!("loading suite {}", path.display()))?,
        None => SuiteSpec::default(),
    };

    if let Some(samples) = args.samples {
        spec.samples = samples;
    }
    if let Some(seed) = args.seed {
        spec.base_seed = Some(seed);
    }
    if let Some(tolerance) = args.tolerance {
        spec.tolerance = tolerance;
    }
    if !args.models.is_empty() {
        spec.models = args
            .models
            .iter()
            .map(|m| m.builtin_name().to_string())
            .collect();
    }

    spec.validate().context("invalid suite configuration")?;
    Ok(spec)
}

fn run(args: RunArgs) -> Result<ExitCode> {
    let spec = resolve_suite(&args)?;
    info!(
        suite = %spec.suite_id,
        samples = spec.samples,
        seed = ?spec.base_seed,
        "starting causal integrity check"
    );

    let scenarios = spec.build_scenarios().context("generating scenarios")?;
    let models = spec.build_models()?;
    let harness = Harness::new(spec.harness_config())?;

    let report = harness.run_suite(&models, &scenarios);

    ConsoleSink {
        verbose: args.details,
    }
    .save(&report)?;

    if !args.no_save {
        let mut json = JsonFileSink::new(&args.out_dir);
        json.save(&report)?;
        if let Some(path) = json.last_path() {
            println!("\nReport saved to {}", path.display());
        }
        if args.markdown {
            let md_path = args.out_dir.join(report.file_name().replace(".json", ".md"));
            MarkdownFileSink::new(md_path).save(&report)?;
        }
    }

    Ok(if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn list_scenarios() {
    for kind in ScenarioKind::ALL {
        let params = ScenarioParams::defaults(kind);
        println!("{}", kind.name());
        println!("    {}", kind.description());
        println!(
            "    expected conversion rate: {:.4}",
            params.expected_conversion_rate()
        );
        println!(
            "    ground truth:             {}",
            format_distribution(&params.ground_truth())
        );
    }
}
