//! Cell suggestions for a 3×3 pokegrid.
//!
//! [`GridSolver`] owns three row and three column constraints, a
//! [`RankingStrategy`](strategy::RankingStrategy) and the set of names already
//! placed on the grid. For a cell it intersects the row and column matching
//! sets, removes chosen names and lets the strategy order what remains.
//!
//! # Strategies
//!
//! - [`RandomStrategy`](strategy::RandomStrategy) - Independent uniform scores
//! - [`OracleStrategy`](strategy::OracleStrategy) - Scores from an external
//!   language-model oracle, favouring obscure or popular picks by persona
//!
//! Strategies are built from configuration through
//! [`build_strategy`](strategy::build_strategy).

pub use self::solver::*;

mod solver;
pub mod strategy;
