use std::{fmt, sync::Arc};

use async_trait::async_trait;
use pokegrid_constraint::NameSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{RankError, RankedCandidate, RankingStrategy, sort_ranked};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum OracleError {
    #[display("environment variable {name} is not set")]
    MissingCredentials { name: &'static str },
    #[display("request to {url} failed")]
    Transport { url: String, source: reqwest::Error },
    #[display("request to {url} returned status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[display("oracle returned no scores")]
    EmptyResponse,
    #[display("failed to decode oracle scores")]
    Decode { source: serde_json::Error },
}

/// External scorer of candidate names.
///
/// The oracle is a free-form system: its answer may drop, rename or duplicate
/// names. Callers must not assume a one-to-one mapping with the input.
#[async_trait]
pub trait ScoringOracle: fmt::Debug + Send + Sync {
    /// Parameters identifying the oracle configuration (e.g. the model).
    #[must_use]
    fn params(&self) -> Map<String, Value> {
        Map::new()
    }

    async fn score(
        &self,
        instruction: &str,
        candidates: &[String],
    ) -> Result<Vec<RankedCandidate>, OracleError>;
}

/// Which picks the oracle is asked to favour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// Rarely picked Pokémon score high.
    Obscure,
    /// Commonly picked Pokémon score high.
    Popular,
}

impl Persona {
    #[must_use]
    pub fn instruction(self) -> &'static str {
        match self {
            Persona::Obscure => {
                "You are an expert Pokémon trivia player. You will receive a JSON list of \
                 Pokémon names. Score each one from 0 to 1 by how rarely other players would \
                 pick it for a grid cell: obscure Pokémon score close to 1, popular ones close \
                 to 0. Return every name exactly once."
            }
            Persona::Popular => {
                "You are an expert Pokémon trivia player. You will receive a JSON list of \
                 Pokémon names. Score each one from 0 to 1 by how often other players would \
                 pick it for a grid cell: popular Pokémon score close to 1, obscure ones close \
                 to 0. Return every name exactly once."
            }
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Persona::Obscure => f.write_str("obscure"),
            Persona::Popular => f.write_str("popular"),
        }
    }
}

/// Ranks candidates with scores from a [`ScoringOracle`].
///
/// [`Persona::Obscure`] is the `oracle` strategy; [`Persona::Popular`] is
/// `reverse_oracle`. Both share the same mechanics.
#[derive(Debug, Clone)]
pub struct OracleStrategy {
    persona: Persona,
    oracle: Arc<dyn ScoringOracle>,
}

impl OracleStrategy {
    #[must_use]
    pub fn new(persona: Persona, oracle: Arc<dyn ScoringOracle>) -> Self {
        Self { persona, oracle }
    }

    #[must_use]
    pub fn persona(&self) -> Persona {
        self.persona
    }
}

#[async_trait]
impl RankingStrategy for OracleStrategy {
    fn name(&self) -> &'static str {
        match self.persona {
            Persona::Obscure => "oracle",
            Persona::Popular => "reverse_oracle",
        }
    }

    fn params(&self) -> Map<String, Value> {
        let mut params = self.oracle.params();
        params.insert("persona".to_owned(), self.persona.to_string().into());
        params
    }

    async fn rank(&self, candidates: &NameSet) -> Result<Vec<RankedCandidate>, RankError> {
        if candidates.is_empty() {
            return Ok(vec![]);
        }

        let names: Vec<String> = candidates.iter().cloned().collect();
        debug!(count = names.len(), persona = %self.persona, "requesting oracle scores");
        let mut ranked = self
            .oracle
            .score(self.persona.instruction(), &names)
            .await?;

        let returned: NameSet = ranked.iter().map(|c| c.name.clone()).collect();
        if ranked.len() != candidates.len() || &returned != candidates {
            warn!(
                requested = candidates.len(),
                returned = ranked.len(),
                missing = candidates.difference(&returned).count(),
                unexpected = returned.difference(candidates).count(),
                "oracle answer does not match the candidate pool"
            );
        }

        sort_ranked(&mut ranked);
        Ok(ranked)
    }
}
