//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use qsched_catalog::{Catalog, CourseRecord, GridConfig, Room, SyntheticRanges};
use qsched_ilp::{InstanceOptions, MeetingSpec, ObjectiveMode};
use qsched_qubo::{BitOrder, QuboPenalties};

/// Settings read from `--config <file.yaml>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Selection and conflict penalties.
    pub qubo: QuboPenalties,
    /// Charge overlaps with primary meetings in the QUBO.
    pub primary_meetings: bool,
    /// Weekly grid for placement.
    pub grid: GridConfig,
    /// Placement objective.
    pub objective: ObjectiveMode,
    /// Keep at most this many rooms.
    pub max_rooms: Option<usize>,
    /// Seed for synthetic enrollment and capacity.
    pub seed: u64,
    /// Ranges for synthetic draws.
    pub synthetic: SyntheticRanges,
}

impl RunConfig {
    /// Instance options derived from this config.
    pub fn instance_options(&self) -> InstanceOptions {
        let mut options = InstanceOptions::default().with_seed(self.seed);
        options.synthetic = self.synthetic;
        if let Some(max) = self.max_rooms {
            options = options.with_max_rooms(max);
        }
        options
    }
}

/// Load the YAML run config, or defaults when no path is given.
pub fn load_run_config(path: Option<&str>) -> Result<RunConfig> {
    let Some(path) = path else {
        return Ok(RunConfig::default());
    };
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read config: {path}"))?;
    let config: RunConfig =
        serde_yaml_ng::from_str(&source).with_context(|| format!("Invalid config: {path}"))?;
    debug!(path, seed = config.seed, max_rooms = ?config.max_rooms, "loaded run config");
    Ok(config)
}

/// Read and deserialize a JSON file.
pub fn load_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    let source = fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    serde_json::from_str(&source).with_context(|| format!("Invalid JSON in {path}"))
}

/// Load and validate a catalog of course records.
pub fn load_catalog(path: &str) -> Result<Catalog> {
    let records: Vec<CourseRecord> = load_json(path)?;
    Catalog::from_records(&records).with_context(|| format!("Invalid catalog: {path}"))
}

/// Placement input: either explicit meetings or catalog courses, plus rooms.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlacementInput {
    /// Explicit meetings.
    pub meetings: Vec<MeetingSpec>,
    /// Catalog courses whose timed sections become meetings.
    pub courses: Vec<CourseRecord>,
    /// Available rooms.
    pub rooms: Vec<Room>,
}

/// Parse an objective name.
pub fn parse_objective(name: &str) -> Result<ObjectiveMode> {
    match name.to_lowercase().as_str() {
        "feasibility" | "feasible" => Ok(ObjectiveMode::Feasibility),
        "resources" | "resource" | "min-resources" => Ok(ObjectiveMode::resource_minimization()),
        other => anyhow::bail!("Unknown objective: '{other}'. Available: feasibility, resources"),
    }
}

/// Parse a bit-order name for measurement counts.
pub fn parse_bit_order(name: &str) -> Result<BitOrder> {
    match name.to_lowercase().as_str() {
        "first" | "big-endian" => Ok(BitOrder::QubitZeroFirst),
        "last" | "little-endian" => Ok(BitOrder::QubitZeroLast),
        other => anyhow::bail!("Unknown bit order: '{other}'. Available: first, last"),
    }
}
