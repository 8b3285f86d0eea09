//! Property Projection - forecasting and sensitivity engine for rental property investments
//!
//! This library provides:
//! - Single-year KPI evaluation and break-even occupancy
//! - Mortgage amortization at any payment frequency
//! - Year-by-year projections with escalation, appreciation and exit-sale scenarios
//! - IRR via Newton-Raphson
//! - 1D and 2D sensitivity sweeps over any numeric input
//! - Batch "what-if" scenario runs

pub mod error;
pub mod rounding;
pub mod inputs;
pub mod amortization;
pub mod expenses;
pub mod irr;
pub mod kpi;
pub mod breakeven;
pub mod projection;
pub mod sensitivity;
pub mod scenario;

// Re-export commonly used types
pub use error::{ForecastError, Result};
pub use inputs::{ExpenseLine, ExpenseType, Parameter, ParameterRange, PaymentFrequency, ProjectInputs, Scalar};
pub use kpi::{calculate_kpis, KpiResults, Objective};
pub use breakeven::break_even_occupancy;
pub use projection::{calculate_projections, ProjectionConfig, ProjectionEngine, ProjectionResult, YearProjection, ExitScenario};
pub use sensitivity::{run_sensitivity_analysis_1d, run_sensitivity_analysis_2d, CancelToken};
pub use scenario::ScenarioRunner;
