//! Bipartite taxi↔order matching: cost functions, the Hungarian solver, and
//! the commit/route-attachment orchestration.
//!
//! Split one concern per file (`cost.rs`, `solver.rs`, `types.rs`), with a
//! single solver shared across all three matching modes — they differ only
//! in the cost function, not in how the resulting matrix gets solved.

mod cost;
mod matcher;
mod solver;
mod types;

pub use cost::build_cost_matrix;
pub use matcher::Matcher;
pub use solver::solve_assignment;
pub use types::MatchMode;
