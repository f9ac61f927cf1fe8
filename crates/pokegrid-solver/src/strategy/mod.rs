//! Pluggable ranking of candidate pools.

use std::{cmp::Ordering, fmt};

use async_trait::async_trait;
use pokegrid_constraint::NameSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use self::{chat::*, oracle::*, random::*, registry::*};

mod chat;
mod oracle;
mod random;
mod registry;

/// A candidate name with its strategy-assigned score. Higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub name: String,
    pub score: f64,
}

impl RankedCandidate {
    #[must_use]
    pub fn new(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Descending score, ties broken by ascending name.
fn ranking_order(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.name.cmp(&b.name))
}

pub fn sort_ranked(candidates: &mut [RankedCandidate]) {
    candidates.sort_by(ranking_order);
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum RankError {
    #[display("scoring oracle failed")]
    Oracle { source: OracleError },
}

impl From<OracleError> for RankError {
    fn from(source: OracleError) -> Self {
        Self::Oracle { source }
    }
}

/// Orders a candidate pool by desirability.
///
/// Implementations must not rely on the iteration order of the input, and
/// must return their result sorted by [`sort_ranked`]'s ordering.
#[async_trait]
pub trait RankingStrategy: fmt::Debug + Send + Sync {
    /// Registry name of the strategy.
    #[must_use]
    fn name(&self) -> &'static str;

    /// Parameters recorded alongside each suggestion.
    #[must_use]
    fn params(&self) -> Map<String, Value>;

    async fn rank(&self, candidates: &NameSet) -> Result<Vec<RankedCandidate>, RankError>;
}

pub type BoxedRankingStrategy = Box<dyn RankingStrategy>;
