//! qsched Command-Line Interface
//!
//! Runs either scheduling formulation against the bundled reference backends:
//!
//! ```text
//! qsched qubo -c fixtures/catalog.json --hamiltonian
//! qsched ilp  -i fixtures/placement.json --config fixtures/run.yaml --objective resources
//! ```

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{ilp, qubo, version};

/// qsched - course scheduling as QUBO / Ising and integer programs
#[derive(Parser)]
#[command(name = "qsched")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick one section per course by minimizing a QUBO
    Qubo {
        /// Catalog file (JSON course records)
        #[arg(short, long)]
        catalog: String,

        /// Run configuration (YAML)
        #[arg(long)]
        config: Option<String>,

        /// Penalty for not selecting exactly one section
        #[arg(long)]
        course_penalty: Option<f64>,

        /// Penalty per selected overlapping pair
        #[arg(long)]
        conflict_penalty: Option<f64>,

        /// Also penalize overlaps with primary meetings
        #[arg(long)]
        primary: bool,

        /// Print the cost Hamiltonian
        #[arg(long)]
        hamiltonian: bool,

        /// Write sparse (i, j, value) QUBO terms to this JSON file
        #[arg(short, long)]
        export: Option<String>,

        /// Decode measurement counts (JSON bitstring -> count) instead of solving exactly
        #[arg(long)]
        counts: Option<String>,

        /// Bit order of count keys (first, last)
        #[arg(long, default_value = "first")]
        bit_order: String,
    },

    /// Place meetings into rooms and time slots with an integer program
    Ilp {
        /// Placement input (JSON with meetings or courses, and rooms)
        #[arg(short, long)]
        input: String,

        /// Run configuration (YAML)
        #[arg(long)]
        config: Option<String>,

        /// Seed for synthetic enrollment and capacity
        #[arg(long)]
        seed: Option<u64>,

        /// Keep at most this many rooms
        #[arg(long)]
        max_rooms: Option<usize>,

        /// Objective (feasibility, resources)
        #[arg(long)]
        objective: Option<String>,

        /// Solver backend (lp, bnb)
        #[arg(long, default_value = "lp")]
        solver: String,

        /// Node budget for the bnb solver
        #[arg(long)]
        node_limit: Option<u64>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Qubo {
            catalog,
            config,
            course_penalty,
            conflict_penalty,
            primary,
            hamiltonian,
            export,
            counts,
            bit_order,
        } => qubo::execute(&qubo::QuboArgs {
            catalog: &catalog,
            config: config.as_deref(),
            course_penalty,
            conflict_penalty,
            primary,
            show_hamiltonian: hamiltonian,
            export: export.as_deref(),
            counts: counts.as_deref(),
            bit_order: &bit_order,
        }),

        Commands::Ilp {
            input,
            config,
            seed,
            max_rooms,
            objective,
            solver,
            node_limit,
            format,
        } => ilp::execute(&ilp::IlpArgs {
            input: &input,
            config: config.as_deref(),
            seed,
            max_rooms,
            objective: objective.as_deref(),
            solver: &solver,
            node_limit,
            format: &format,
        }),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
