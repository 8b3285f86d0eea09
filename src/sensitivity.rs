//! One- and two-dimensional sensitivity sweeps over input parameters
//!
//! Each sweep point overrides one (or two) input leaves on a copy of the base
//! inputs and re-evaluates the KPI snapshot. Points are independent, so
//! parameters (1D) and grid rows (2D) are evaluated in parallel; output order
//! always follows the input order and the ascending value arrays.

use crate::error::{ForecastError, Result};
use crate::inputs::{Parameter, ParameterRange, ProjectInputs};
use crate::kpi::Objective;
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Per-axis step cap for 2D grids
pub const MAX_GRID_STEPS: u32 = 50;

/// Grids larger than this are logged as expensive but still evaluated
pub const GRID_CELL_WARNING: usize = 2500;

/// Cooperative cancellation flag, checked between grid cell evaluations
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How far the objective moves at the ends of one parameter's range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityImpact {
    pub parameter: Parameter,
    pub label: String,
    /// objective(min) - base objective
    pub impact_low: f64,
    /// objective(max) - base objective
    pub impact_high: f64,
    /// max(|impact_low|, |impact_high|)
    pub relative_impact: f64,
}

/// One evaluated point of a 1D sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepPoint {
    pub value: f64,
    pub objective_value: f64,
}

/// Full swept curve for one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepCurve {
    pub parameter: Parameter,
    pub label: String,
    pub points: Vec<SweepPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityAnalysis1D {
    pub objective: Objective,
    /// Objective evaluated on the unmodified inputs
    pub base_value: f64,
    /// Most sensitive parameter first
    pub impacts: Vec<SensitivityImpact>,
    /// Curves in the order the parameters were given
    pub detailed_results: Vec<SweepCurve>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityAnalysis2D {
    pub objective: Objective,
    pub parameter_x: Parameter,
    pub parameter_y: Parameter,
    /// Column values, ascending
    pub x_values: Vec<f64>,
    /// Row values, ascending
    pub y_values: Vec<f64>,
    /// `grid[row][col]` is the objective at (x_values[col], y_values[row])
    pub grid: Vec<Vec<f64>>,
}

impl SensitivityAnalysis2D {
    /// Objective at grid position, row = y index, col = x index
    pub fn value_at(&self, row: usize, col: usize) -> Option<f64> {
        self.grid.get(row).and_then(|r| r.get(col)).copied()
    }
}

/// Sweep each parameter independently across its range
pub fn run_sensitivity_analysis_1d(
    base_inputs: &ProjectInputs,
    parameters: &[ParameterRange],
    objective: Objective,
) -> Result<SensitivityAnalysis1D> {
    for range in parameters {
        range.validate()?;
    }

    let base_value = objective.evaluate(base_inputs);
    debug!(
        "1D sweep of {} parameters on {} (base {:.2})",
        parameters.len(),
        objective,
        base_value
    );

    let swept: Vec<(SweepCurve, SensitivityImpact)> = parameters
        .par_iter()
        .map(|range| sweep_parameter(base_inputs, range, objective, base_value))
        .collect::<Result<_>>()?;

    let (detailed_results, mut impacts): (Vec<_>, Vec<_>) = swept.into_iter().unzip();
    impacts.sort_by(|a, b| b.relative_impact.total_cmp(&a.relative_impact));

    Ok(SensitivityAnalysis1D {
        objective,
        base_value,
        impacts,
        detailed_results,
    })
}

fn sweep_parameter(
    base_inputs: &ProjectInputs,
    range: &ParameterRange,
    objective: Objective,
    base_value: f64,
) -> Result<(SweepCurve, SensitivityImpact)> {
    let evaluate = |value: f64| -> Result<f64> {
        Ok(objective.evaluate(&range.parameter.apply(base_inputs, value)?))
    };

    let points = range
        .values()
        .into_iter()
        .map(|value| {
            Ok(SweepPoint {
                value,
                objective_value: evaluate(value)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let impact_low = evaluate(range.min)? - base_value;
    let impact_high = evaluate(range.max)? - base_value;

    Ok((
        SweepCurve {
            parameter: range.parameter,
            label: range.label.clone(),
            points,
        },
        SensitivityImpact {
            parameter: range.parameter,
            label: range.label.clone(),
            impact_low,
            impact_high,
            relative_impact: impact_low.abs().max(impact_high.abs()),
        },
    ))
}

/// Evaluate the objective over the grid of two parameters
pub fn run_sensitivity_analysis_2d(
    base_inputs: &ProjectInputs,
    parameter_x: &ParameterRange,
    parameter_y: &ParameterRange,
    objective: Objective,
) -> Result<SensitivityAnalysis2D> {
    run_sensitivity_analysis_2d_with_cancel(base_inputs, parameter_x, parameter_y, objective, &CancelToken::new())
}

/// 2D sweep that stops with [`ForecastError::Cancelled`] once `cancel` is set
///
/// Both axes must address different parameters.
pub fn run_sensitivity_analysis_2d_with_cancel(
    base_inputs: &ProjectInputs,
    parameter_x: &ParameterRange,
    parameter_y: &ParameterRange,
    objective: Objective,
    cancel: &CancelToken,
) -> Result<SensitivityAnalysis2D> {
    parameter_x.validate()?;
    parameter_y.validate()?;
    if parameter_x.parameter == parameter_y.parameter {
        return Err(ForecastError::InvalidRange {
            parameter: parameter_y.parameter.path(),
            reason: "grid axes must be different parameters".to_string(),
        });
    }

    let x_values = capped(parameter_x).values();
    let y_values = capped(parameter_y).values();

    let cells = x_values.len() * y_values.len();
    if cells > GRID_CELL_WARNING {
        warn!(
            "Sensitivity grid {}x{} has {} cells (over {}); evaluation may be slow",
            y_values.len(),
            x_values.len(),
            cells,
            GRID_CELL_WARNING
        );
    }
    debug!(
        "2D sweep of {} x {} on {} ({} cells)",
        parameter_x.parameter, parameter_y.parameter, objective, cells
    );

    // Row inputs carry the Y override; each cell then applies X on top
    let grid = y_values
        .par_iter()
        .map(|&y| {
            let row_inputs = parameter_y.parameter.apply(base_inputs, y)?;
            x_values
                .iter()
                .map(|&x| {
                    if cancel.is_cancelled() {
                        return Err(ForecastError::Cancelled);
                    }
                    Ok(objective.evaluate(&parameter_x.parameter.apply(&row_inputs, x)?))
                })
                .collect::<Result<Vec<f64>>>()
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    Ok(SensitivityAnalysis2D {
        objective,
        parameter_x: parameter_x.parameter,
        parameter_y: parameter_y.parameter,
        x_values,
        y_values,
        grid,
    })
}

fn capped(range: &ParameterRange) -> ParameterRange {
    if range.steps <= MAX_GRID_STEPS {
        return range.clone();
    }
    debug!(
        "Capping {} grid steps from {} to {}",
        range.parameter, range.steps, MAX_GRID_STEPS
    );
    ParameterRange {
        steps: MAX_GRID_STEPS,
        ..range.clone()
    }
}
