//! QI-Prio CLI: prioritize test cases from risk amplitudes
//!
//! All file I/O of the pipeline happens here; the library stays pure.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use qiprio::amplitude::{derive_amplitudes, parse_risk_metrics};
use qiprio::similarity::{case_distances, missing_test_scripts, parse_test_cases};
use qiprio::{render_json, render_markdown, AmplitudeSet, Prioritization, Prioritizer, PrioritizerConfig};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "qiprio", version, about = "Interference-aware test case prioritization")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "QIPRIO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Order tests from an amplitude file
    Prioritize {
        /// JSON array of amplitude records
        amplitudes: PathBuf,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Number of particles
        #[arg(long)]
        population: Option<usize>,

        /// Number of iterations
        #[arg(long)]
        iterations: Option<usize>,

        /// Contraction-expansion coefficient
        #[arg(long)]
        alpha: Option<f64>,

        /// Evaluate particles in parallel
        #[arg(long)]
        parallel: bool,

        /// Also write a markdown report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Derive amplitudes from per-test risk metrics
    Amplitudes {
        /// JSON object mapping test ids to relevance/complexity/change_nature
        metrics: PathBuf,

        /// Where to write the amplitude file
        #[arg(long, default_value = "tca.json")]
        output: PathBuf,
    },
    /// Compute string-distance matrices between test inputs and outputs
    Distances {
        /// JSON object mapping test ids to {input, output}
        test_cases: PathBuf,

        /// Directory receiving input.json and output.json
        #[arg(long, default_value = "test/string-distances")]
        output_dir: PathBuf,

        /// Directory expected to hold each case's script
        #[arg(long, default_value = "test/test-scripts")]
        scripts_dir: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Prioritize {
            amplitudes,
            seed,
            population,
            iterations,
            alpha,
            parallel,
            report,
            format,
        } => {
            let mut config = config;
            if seed.is_some() {
                config.solver.seed = seed;
            }
            if let Some(population) = population {
                config.solver.population_size = population;
            }
            if let Some(iterations) = iterations {
                config.solver.max_iterations = iterations;
            }
            if let Some(alpha) = alpha {
                config.solver.alpha = alpha;
            }
            config.solver.parallel |= parallel;
            run_prioritize(config, &amplitudes, report.as_deref(), &format)
        }
        Commands::Amplitudes { metrics, output } => run_amplitudes(&config, &metrics, &output),
        Commands::Distances {
            test_cases,
            output_dir,
            scripts_dir,
        } => run_distances(&test_cases, &output_dir, &scripts_dir),
    });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<PrioritizerConfig> {
    match path {
        Some(path) => PrioritizerConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(PrioritizerConfig::default()),
    }
}

fn run_prioritize(
    config: PrioritizerConfig,
    amplitudes_path: &Path,
    report_path: Option<&Path>,
    format: &OutputFormat,
) -> Result<()> {
    let amplitudes = AmplitudeSet::load(amplitudes_path)
        .with_context(|| format!("failed to load amplitudes from {}", amplitudes_path.display()))?;

    info!("Starting QI-PSO optimization for {} test cases", amplitudes.len());
    let prioritizer = Prioritizer::new(config)?;
    let result = prioritizer.prioritize(&amplitudes)?;

    match format {
        OutputFormat::Json => println!("{}", render_json(&result, &amplitudes)?),
        OutputFormat::Markdown => print!("{}", render_markdown(&result, &amplitudes)),
        OutputFormat::Table => print_table(&result, &amplitudes),
    }

    if let Some(path) = report_path {
        std::fs::write(path, render_markdown(&result, &amplitudes))
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!("Report generated: {}", path.display());
    }

    Ok(())
}

fn print_table(result: &Prioritization, amplitudes: &AmplitudeSet) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Priority", "Test Case ID", "Magnitude", "Phase (rad)", "Semantics"]);

    for row in result.ranking(amplitudes) {
        let a = row.amplitude;
        table.add_row(vec![
            row.priority.to_string(),
            a.id.clone(),
            format!("{:.4}", a.magnitude),
            format!("{:.4}", a.phase),
            a.metadata.clone(),
        ]);
    }

    println!("{}", table);
    println!(
        "fitness {:.4} (input order {:.4}) after {} iteration(s)",
        result.fitness, result.baseline_fitness, result.iterations
    );
}

fn run_amplitudes(config: &PrioritizerConfig, metrics_path: &Path, output: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(metrics_path)
        .with_context(|| format!("failed to read {}", metrics_path.display()))?;
    let metrics = parse_risk_metrics(&contents)?;
    let amplitudes = AmplitudeSet::new(derive_amplitudes(&metrics, &config.fusion))?;
    amplitudes
        .save(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Calculated amplitudes for {} test cases.", amplitudes.len());
    Ok(())
}

fn run_distances(test_cases_path: &Path, output_dir: &Path, scripts_dir: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(test_cases_path)
        .with_context(|| format!("failed to read {}", test_cases_path.display()))?;
    let cases = parse_test_cases(&contents)
        .with_context(|| format!("failed to load test cases from {}", test_cases_path.display()))?;
    let matrices = case_distances(&cases);

    std::fs::create_dir_all(output_dir)?;
    let input_path = output_dir.join("input.json");
    std::fs::write(&input_path, serde_json::to_string_pretty(&matrices.input)?)?;
    info!("Wrote {}", input_path.display());

    match &matrices.output {
        Some(output) => {
            let output_path = output_dir.join("output.json");
            std::fs::write(&output_path, serde_json::to_string_pretty(output)?)?;
            info!("Wrote {}", output_path.display());
        }
        None => warn!("No valid outputs found; output distance matrix skipped"),
    }

    let missing = missing_test_scripts(&cases, scripts_dir);
    if missing.is_empty() {
        info!("All test cases have scripts in {}", scripts_dir.display());
    } else {
        warn!("Missing test scripts for cases: {}", missing.join(", "));
        println!("WARNING: Missing test scripts for cases: {}", missing.join(", "));
    }

    println!("Created distance matrices for {} cases.", matrices.input.len());
    Ok(())
}
