//! Scenario runner for batch "what-if" projections
//!
//! Loads and validates the base inputs once, then runs many projections with
//! different input overrides without re-reading the inputs file.

use crate::error::Result;
use crate::inputs::{load_inputs, Parameter, ProjectInputs};
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One input leaf set to a fixed value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Override {
    pub parameter: Parameter,
    pub value: f64,
}

impl Override {
    pub fn new(parameter: Parameter, value: f64) -> Self {
        Self { parameter, value }
    }
}

/// Named set of overrides applied together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub overrides: Vec<Override>,
}

/// Projection result tagged with the scenario that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub result: ProjectionResult,
}

/// Pre-loaded scenario runner for batch projections
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_json_path("data/inputs.json")?;
///
/// let scenarios: Vec<Scenario> = [4.0, 5.0, 6.0]
///     .iter()
///     .map(|&rate| Scenario {
///         name: format!("{}%", rate),
///         overrides: vec![Override::new(Parameter::InterestRate, rate)],
///     })
///     .collect();
/// let outcomes = runner.run_scenarios(&scenarios, 10)?;
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    /// Pre-loaded base inputs
    base_inputs: ProjectInputs,
}

impl ScenarioRunner {
    /// Create runner with pre-built inputs
    pub fn with_inputs(inputs: ProjectInputs) -> Self {
        Self { base_inputs: inputs }
    }

    /// Create runner by loading inputs from a JSON file
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            base_inputs: load_inputs(path)?,
        })
    }

    /// Project the base inputs unchanged
    pub fn run(&self, years: u32) -> ProjectionResult {
        engine_for(years).project(&self.base_inputs)
    }

    /// Project the base inputs with the given overrides applied in order
    pub fn run_with_overrides(&self, overrides: &[Override], years: u32) -> Result<ProjectionResult> {
        let inputs = apply_overrides(&self.base_inputs, overrides)?;
        Ok(engine_for(years).project(&inputs))
    }

    /// Run every scenario over the same horizon; results keep scenario order
    pub fn run_scenarios(&self, scenarios: &[Scenario], years: u32) -> Result<Vec<ScenarioOutcome>> {
        let engine = engine_for(years);
        scenarios
            .par_iter()
            .map(|scenario| {
                let inputs = apply_overrides(&self.base_inputs, &scenario.overrides)?;
                Ok(ScenarioOutcome {
                    name: scenario.name.clone(),
                    result: engine.project(&inputs),
                })
            })
            .collect()
    }

    /// Get reference to base inputs for inspection
    pub fn inputs(&self) -> &ProjectInputs {
        &self.base_inputs
    }
}

fn engine_for(years: u32) -> ProjectionEngine {
    ProjectionEngine::new(ProjectionConfig::with_years(years))
}

/// Copy of `inputs` with every override applied
pub fn apply_overrides(inputs: &ProjectInputs, overrides: &[Override]) -> Result<ProjectInputs> {
    overrides
        .iter()
        .try_fold(inputs.clone(), |acc, o| o.parameter.apply(&acc, o.value))
}
