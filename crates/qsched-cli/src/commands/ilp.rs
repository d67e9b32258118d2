//! Placement (ILP) command implementation.

use anyhow::{Context, Result};
use console::style;

use qsched_catalog::{Catalog, TimeGrid};
use qsched_ilp::{
    BranchAndBoundSolver, IlpBuilder, IlpInstance, IlpSolver, LpSolver, ScheduleOutcome,
    solve_and_decode,
};

use super::common::{PlacementInput, load_json, load_run_config, parse_objective};

/// Options for the ilp command.
pub struct IlpArgs<'a> {
    pub input: &'a str,
    pub config: Option<&'a str>,
    pub seed: Option<u64>,
    pub max_rooms: Option<usize>,
    pub objective: Option<&'a str>,
    pub solver: &'a str,
    pub node_limit: Option<u64>,
    pub format: &'a str,
}

/// Execute the ilp command.
pub fn execute(args: &IlpArgs<'_>) -> Result<()> {
    let mut config = load_run_config(args.config)?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.max_rooms.is_some() {
        config.max_rooms = args.max_rooms;
    }
    if let Some(name) = args.objective {
        config.objective = parse_objective(name)?;
    }

    println!(
        "{} Placing meetings from {}",
        style("→").cyan().bold(),
        style(args.input).green()
    );
    let input: PlacementInput = load_json(args.input)?;
    let options = config.instance_options();
    let instance = if input.courses.is_empty() {
        IlpInstance::assemble(input.meetings, input.rooms, &options)?
    } else {
        if !input.meetings.is_empty() {
            anyhow::bail!("{}: give either meetings or courses, not both", args.input);
        }
        let catalog = Catalog::from_records(&input.courses)
            .with_context(|| format!("Invalid catalog in {}", args.input))?;
        IlpInstance::from_courses(catalog.courses(), input.rooms, &options)?
    };
    let grid = TimeGrid::new(config.grid.clone())?;
    println!(
        "  Loaded: {} meetings, {} rooms on {}",
        instance.meetings().len(),
        instance.rooms().len(),
        grid
    );

    let model = IlpBuilder::new(&instance, &grid)
        .with_objective(config.objective)
        .build();
    println!("  Model: {}", model.stats());

    let solver: Box<dyn IlpSolver> = match args.solver {
        "lp" => Box::new(LpSolver::new()),
        "bnb" => {
            let mut solver = BranchAndBoundSolver::new();
            if let Some(limit) = args.node_limit {
                solver = solver.with_node_limit(limit);
            }
            Box::new(solver)
        }
        other => anyhow::bail!("Unknown solver: {other} (expected lp or bnb)"),
    };
    println!("  Solver: {}", style(solver.name()).cyan());
    let outcome = solve_and_decode(&model, solver.as_ref())?;

    match args.format {
        "json" => println!("{}", serde_json::to_string_pretty(&outcome)?),
        _ => print_outcome(&outcome),
    }
    Ok(())
}

fn print_outcome(outcome: &ScheduleOutcome) {
    match outcome {
        ScheduleOutcome::Scheduled(schedule) => {
            println!(
                "\n{} Schedule ({} meetings, objective {:.1}):",
                style("✓").green().bold(),
                schedule.placements().count(),
                schedule.objective
            );
            for line in schedule.to_string().lines() {
                println!("  {line}");
            }
            for report in &schedule.unplaceable {
                println!("  {} {}", style("!").yellow().bold(), report);
            }
        }
        ScheduleOutcome::Infeasible { hints } => {
            println!("\n{} Infeasible", style("✗").red().bold());
            for hint in hints {
                println!("  - {hint}");
            }
        }
    }
}
