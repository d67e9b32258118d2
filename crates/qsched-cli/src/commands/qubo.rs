//! Section-selection (QUBO) command implementation.

use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result};
use console::style;

use qsched_qubo::{
    ExhaustiveSampler, QuboBuilder, QuboDecoder, SampleSet, Sampler, expectation_from_counts,
    parse_counts, verify_reported,
};

use super::common::{load_catalog, load_json, load_run_config, parse_bit_order};

/// Options for the qubo command.
pub struct QuboArgs<'a> {
    pub catalog: &'a str,
    pub config: Option<&'a str>,
    pub course_penalty: Option<f64>,
    pub conflict_penalty: Option<f64>,
    pub primary: bool,
    pub show_hamiltonian: bool,
    pub export: Option<&'a str>,
    pub counts: Option<&'a str>,
    pub bit_order: &'a str,
}

/// Execute the qubo command.
pub fn execute(args: &QuboArgs<'_>) -> Result<()> {
    let config = load_run_config(args.config)?;
    let mut penalties = config.qubo;
    if let Some(p) = args.course_penalty {
        penalties = penalties.with_course_penalty(p);
    }
    if let Some(p) = args.conflict_penalty {
        penalties = penalties.with_conflict_penalty(p);
    }

    println!(
        "{} Selecting sections from {}",
        style("→").cyan().bold(),
        style(args.catalog).green()
    );
    let catalog = load_catalog(args.catalog)?;
    println!(
        "  Loaded: {} courses, {} sections",
        catalog.len(),
        catalog.num_sections()
    );

    let model = QuboBuilder::new(catalog.courses())
        .with_penalties(penalties)
        .with_primary_meetings(args.primary || config.primary_meetings)
        .build()?;
    let hamiltonian = model.to_ising().to_hamiltonian();
    println!(
        "  QUBO: {} variables, {} couplings, offset {:.4}",
        model.num_variables(),
        model.quadratic().len(),
        model.offset()
    );
    println!(
        "  Hamiltonian: {} terms on {} qubits",
        hamiltonian.num_terms(),
        hamiltonian.num_qubits()
    );

    if args.show_hamiltonian {
        println!("\n{hamiltonian}");
    }

    if let Some(path) = args.export {
        let triples = model.sparse_triples();
        let json = serde_json::to_string_pretty(&triples)?;
        fs::write(path, json).with_context(|| format!("Failed to write {path}"))?;
        println!("  Exported {} sparse terms to {}", triples.len(), style(path).green());
    }

    let samples = match args.counts {
        Some(path) => {
            let order = parse_bit_order(args.bit_order)?;
            let raw: BTreeMap<String, u64> = load_json(path)?;
            let pairs = || raw.iter().map(|(k, v)| (k.as_str(), *v));
            let counts = parse_counts(pairs(), model.num_variables(), order)?;
            let mean = expectation_from_counts(&hamiltonian, &counts)?;
            println!("  Counts: {} outcomes, mean energy {mean:.4}", counts.len());
            SampleSet::from_counts(pairs(), model.num_variables(), order)?
        }
        None => {
            let sampler = ExhaustiveSampler::new();
            let set = sampler.sample(&hamiltonian)?;
            println!(
                "  {}: {} ground state(s)",
                sampler.name(),
                set.len()
            );
            set
        }
    };

    let decoded = QuboDecoder::new(&model, catalog.courses()).decode_best(samples.samples())?;
    if let Some(reported) = samples.expectation() {
        verify_reported(reported, decoded.energy, 1e-6)?;
    }

    println!(
        "\n{} Selection (energy {:.4}):",
        style("✓").green().bold(),
        decoded.energy
    );
    for (course, section) in &decoded.selection {
        println!("  {:<12} {}", style(course).cyan(), section);
    }
    for violation in &decoded.violations {
        println!("  {} {}", style("!").yellow().bold(), violation);
    }

    Ok(())
}
