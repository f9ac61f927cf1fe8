use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{
    BoxedRankingStrategy, ChatCompletionsOracle, ChatOracleConfig, OracleError, OracleStrategy,
    Persona, RandomStrategy, ScoringOracle,
};

pub const STRATEGY_NAMES: [&str; 3] = ["random", "oracle", "reverse_oracle"];

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum BuildStrategyError {
    #[display("unknown strategy '{name}' (expected one of: {})", STRATEGY_NAMES.join(", "))]
    UnknownStrategy { name: String },
    #[display("strategy '{strategy}' does not accept parameter '{param}'")]
    UnknownParam {
        strategy: &'static str,
        param: String,
    },
    #[display("strategy '{strategy}' parameter '{param}' must be {expected}, got {value}")]
    InvalidParam {
        strategy: &'static str,
        param: &'static str,
        expected: &'static str,
        value: Value,
    },
    #[display("failed to set up scoring oracle")]
    Oracle { source: OracleError },
}

/// Declarative strategy description, as found in grid configurations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl StrategySpec {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_owned(), value.into());
        self
    }
}

/// Builds a strategy, creating oracles from the environment.
pub fn build_strategy(spec: &StrategySpec) -> Result<BoxedRankingStrategy, BuildStrategyError> {
    build_strategy_with(spec, |model| {
        let config = ChatOracleConfig::from_env(model)?;
        let oracle: Arc<dyn ScoringOracle> = Arc::new(ChatCompletionsOracle::new(config)?);
        Ok(oracle)
    })
}

/// Builds a strategy, creating oracles with `make_oracle` from the optional
/// `model` parameter.
pub fn build_strategy_with<F>(
    spec: &StrategySpec,
    make_oracle: F,
) -> Result<BoxedRankingStrategy, BuildStrategyError>
where
    F: FnOnce(Option<String>) -> Result<Arc<dyn ScoringOracle>, OracleError>,
{
    let normalized = spec.name.trim().to_ascii_lowercase().replace('-', "_");
    let Some(&name) = STRATEGY_NAMES.iter().find(|&&n| n == normalized) else {
        return Err(BuildStrategyError::UnknownStrategy {
            name: spec.name.clone(),
        });
    };

    let mut params = spec.params.clone();
    let strategy: BoxedRankingStrategy = match name {
        "random" => match params.remove("seed") {
            None | Some(Value::Null) => Box::new(RandomStrategy::new()),
            Some(value) => {
                let seed = value
                    .as_u64()
                    .ok_or_else(|| BuildStrategyError::InvalidParam {
                        strategy: name,
                        param: "seed",
                        expected: "a non-negative integer",
                        value: value.clone(),
                    })?;
                Box::new(RandomStrategy::with_seed(seed))
            }
        },
        _ => {
            let persona = if name == "oracle" {
                Persona::Obscure
            } else {
                Persona::Popular
            };
            let model = match params.remove("model") {
                None | Some(Value::Null) => None,
                Some(Value::String(model)) => Some(model),
                Some(value) => {
                    return Err(BuildStrategyError::InvalidParam {
                        strategy: name,
                        param: "model",
                        expected: "a string",
                        value,
                    });
                }
            };
            if let Some(param) = params.keys().next() {
                return Err(BuildStrategyError::UnknownParam {
                    strategy: name,
                    param: param.clone(),
                });
            }
            let oracle =
                make_oracle(model).map_err(|source| BuildStrategyError::Oracle { source })?;
            Box::new(OracleStrategy::new(persona, oracle))
        }
    };

    if let Some(param) = params.keys().next() {
        return Err(BuildStrategyError::UnknownParam {
            strategy: name,
            param: param.clone(),
        });
    }
    Ok(strategy)
}
