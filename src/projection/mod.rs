//! Multi-year projection engine with exit scenarios

mod state;
mod engine;
mod results;

pub use state::ProjectionState;
pub use engine::{
    calculate_projections, ProjectionConfig, ProjectionEngine, ResolvedRates,
    DEFAULT_EXIT_YEARS, MAX_PROJECTION_YEARS,
};
pub use results::{ExitScenario, ProjectionResult, ProjectionSummary, YearProjection};
