//! Name-keyed construction of constraints from configuration.
//!
//! A [`ConstraintSpec`] names a predicate and carries its arguments as JSON
//! values, positionally (`args`) or by name (`kwargs`). [`build_constraint`]
//! resolves the key against [`all_constraint_entries`] and validates every
//! argument up front, so a bad configuration fails at load time without
//! touching the data source.
//!
//! Keys are matched after normalization: `has_type`, `HasType` and
//! `PokemonHasType` all resolve to the same entry.

use std::collections::VecDeque;

use pokegrid_dex::Stat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constraint::{
    BoxedConstraint, CanLearnMove, CanMegaEvolve, FinalEvolutionLine, FirstEvolutionLine,
    FirstSeenInGeneration, HasType, HeavierThan, HighestBaseStat, ImmuneToType, IsDualType,
    IsLegendaryMythical, IsMegaEvolution, IsMonotype, LighterThan, MiddleEvolutionLine,
    NeutralToType, NoEvolutionLine, ResistantToType, ShorterThan, TallerThan, WeakToType,
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum BuildConstraintError {
    #[display("unknown constraint '{key}'")]
    UnknownConstraint { key: String },
    #[display("constraint '{key}' is missing argument '{arg}'")]
    MissingArgument { key: &'static str, arg: &'static str },
    #[display("constraint '{key}' argument '{arg}' must be {expected}, got {value}")]
    InvalidArgument {
        key: &'static str,
        arg: &'static str,
        expected: &'static str,
        value: Value,
    },
    #[display("constraint '{key}' got unexpected arguments: {extra}")]
    TooManyArguments { key: &'static str, extra: String },
    #[display("constraint '{key}' got a positional '{arg}' after a named argument")]
    PositionalAfterNamed { key: &'static str, arg: &'static str },
}

/// Declarative constraint description, as found in grid configurations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSpec {
    pub constraint: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub kwargs: Map<String, Value>,
}

impl ConstraintSpec {
    #[must_use]
    pub fn new(constraint: impl Into<String>) -> Self {
        Self {
            constraint: constraint.into(),
            args: vec![],
            kwargs: Map::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    #[must_use]
    pub fn kwarg(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.to_owned(), value.into());
        self
    }

    pub fn build(&self) -> Result<BoxedConstraint, BuildConstraintError> {
        build_constraint(self)
    }
}

/// Arguments of one constraint, consumed by name or else by position.
#[derive(Debug)]
pub struct ConstraintArgs {
    key: &'static str,
    positional: VecDeque<Value>,
    named: Map<String, Value>,
    /// Set once an argument was taken by name; later ones cannot be positional.
    named_taken: bool,
}

impl ConstraintArgs {
    fn new(key: &'static str, spec: &ConstraintSpec) -> Self {
        Self {
            key,
            positional: spec.args.iter().cloned().collect(),
            named: spec.kwargs.clone(),
            named_taken: false,
        }
    }

    fn take(&mut self, arg: &'static str) -> Result<Option<Value>, BuildConstraintError> {
        if let Some(value) = self.named.remove(arg) {
            self.named_taken = true;
            return Ok(Some(value));
        }
        if self.named_taken && !self.positional.is_empty() {
            return Err(BuildConstraintError::PositionalAfterNamed { key: self.key, arg });
        }
        Ok(self.positional.pop_front())
    }

    fn require(&mut self, arg: &'static str) -> Result<Value, BuildConstraintError> {
        self.take(arg)?
            .ok_or(BuildConstraintError::MissingArgument { key: self.key, arg })
    }

    fn invalid(
        &self,
        arg: &'static str,
        expected: &'static str,
        value: Value,
    ) -> BuildConstraintError {
        BuildConstraintError::InvalidArgument {
            key: self.key,
            arg,
            expected,
            value,
        }
    }

    pub fn string(&mut self, arg: &'static str) -> Result<String, BuildConstraintError> {
        match self.require(arg)? {
            Value::String(s) => Ok(s),
            value => Err(self.invalid(arg, "a string", value)),
        }
    }

    pub fn u32(&mut self, arg: &'static str) -> Result<u32, BuildConstraintError> {
        let value = self.require(arg)?;
        self.to_u32(arg, value)
    }

    pub fn u32_or(&mut self, arg: &'static str, default: u32) -> Result<u32, BuildConstraintError> {
        match self.take(arg)? {
            Some(value) => self.to_u32(arg, value),
            None => Ok(default),
        }
    }

    fn to_u32(&self, arg: &'static str, value: Value) -> Result<u32, BuildConstraintError> {
        let parsed = match &value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(arg, "a non-negative integer", value))
    }

    pub fn f64(&mut self, arg: &'static str) -> Result<f64, BuildConstraintError> {
        let value = self.require(arg)?;
        let parsed = match &value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        match parsed {
            Some(n) if n.is_finite() => Ok(n),
            _ => Err(self.invalid(arg, "a finite number", value)),
        }
    }

    pub fn stat(&mut self, arg: &'static str) -> Result<Stat, BuildConstraintError> {
        match self.require(arg)? {
            Value::String(s) => s
                .parse()
                .map_err(|_| self.invalid(arg, "a stat name", Value::String(s))),
            value => Err(self.invalid(arg, "a stat name", value)),
        }
    }

    /// An optional type filter, given as a type name or a nested `has_type` spec.
    pub fn type_filter(
        &mut self,
        arg: &'static str,
    ) -> Result<Option<HasType>, BuildConstraintError> {
        let Some(value) = self.take(arg)? else {
            return Ok(None);
        };
        match value {
            Value::Null => Ok(None),
            Value::String(ty) => Ok(Some(HasType::new(ty))),
            Value::Object(_) => {
                let Ok(spec) = serde_json::from_value::<ConstraintSpec>(value.clone()) else {
                    return Err(self.invalid(arg, "a type name or has_type spec", value));
                };
                if normalize_key(&spec.constraint) != "has_type" {
                    return Err(self.invalid(arg, "a type name or has_type spec", value));
                }
                let mut inner = ConstraintArgs::new("has_type", &spec);
                let ty = inner.string("type")?;
                inner.finish()?;
                Ok(Some(HasType::new(ty)))
            }
            value => Err(self.invalid(arg, "a type name or has_type spec", value)),
        }
    }

    /// Fails if any argument was left unconsumed.
    pub fn finish(self) -> Result<(), BuildConstraintError> {
        let mut extra: Vec<String> = self.positional.iter().map(Value::to_string).collect();
        extra.extend(self.named.keys().map(|k| format!("{k}=")));
        if extra.is_empty() {
            Ok(())
        } else {
            Err(BuildConstraintError::TooManyArguments {
                key: self.key,
                extra: extra.join(", "),
            })
        }
    }
}

type BuildFn = fn(&mut ConstraintArgs) -> Result<BoxedConstraint, BuildConstraintError>;

#[derive(Debug, Clone, Copy)]
pub struct ConstraintEntry {
    pub key: &'static str,
    pub build: BuildFn,
}

impl ConstraintEntry {
    fn new(key: &'static str, build: BuildFn) -> Self {
        Self { key, build }
    }
}

#[must_use]
pub fn all_constraint_entries() -> Vec<ConstraintEntry> {
    vec![
        // typing
        ConstraintEntry::new("has_type", |a| Ok(Box::new(HasType::new(a.string("type")?)))),
        ConstraintEntry::new("is_monotype", |a| {
            Ok(Box::new(IsMonotype::new(a.type_filter("type")?)))
        }),
        ConstraintEntry::new("is_dual_type", |a| {
            Ok(Box::new(IsDualType::new(a.type_filter("type")?)))
        }),
        // matchups
        ConstraintEntry::new("resistant_to_type", |a| {
            Ok(Box::new(ResistantToType::new(a.string("type")?)))
        }),
        ConstraintEntry::new("weak_to_type", |a| {
            Ok(Box::new(WeakToType::new(a.string("type")?)))
        }),
        ConstraintEntry::new("neutral_to_type", |a| {
            Ok(Box::new(NeutralToType::new(a.string("type")?)))
        }),
        ConstraintEntry::new("immune_to_type", |a| {
            Ok(Box::new(ImmuneToType::new(a.string("type")?)))
        }),
        // evolution
        ConstraintEntry::new("first_evolution_line", |_| Ok(Box::new(FirstEvolutionLine))),
        ConstraintEntry::new("middle_evolution_line", |_| Ok(Box::new(MiddleEvolutionLine))),
        ConstraintEntry::new("final_evolution_line", |_| Ok(Box::new(FinalEvolutionLine))),
        ConstraintEntry::new("no_evolution_line", |_| Ok(Box::new(NoEvolutionLine))),
        ConstraintEntry::new("can_mega_evolve", |_| Ok(Box::new(CanMegaEvolve))),
        ConstraintEntry::new("is_mega_evolution", |_| Ok(Box::new(IsMegaEvolution))),
        // roster
        ConstraintEntry::new("is_legendary_mythical", |_| Ok(Box::new(IsLegendaryMythical))),
        ConstraintEntry::new("can_learn_move", |a| {
            Ok(Box::new(CanLearnMove::new(a.string("move")?)))
        }),
        ConstraintEntry::new("first_seen_in_generation", |a| {
            Ok(Box::new(FirstSeenInGeneration::new(a.u32("generation")?)))
        }),
        ConstraintEntry::new("highest_base_stat", |a| {
            Ok(Box::new(HighestBaseStat::new(a.stat("stat")?)))
        }),
        // measurements
        ConstraintEntry::new("shorter_than", |a| {
            Ok(Box::new(ShorterThan::new(a.u32("feet")?, a.u32_or("inches", 0)?)))
        }),
        ConstraintEntry::new("taller_than", |a| {
            Ok(Box::new(TallerThan::new(a.u32("feet")?, a.u32_or("inches", 0)?)))
        }),
        ConstraintEntry::new("heavier_than", |a| {
            Ok(Box::new(HeavierThan::new(a.f64("pounds")?)))
        }),
        ConstraintEntry::new("lighter_than", |a| {
            Ok(Box::new(LighterThan::new(a.f64("pounds")?)))
        }),
    ]
}

/// Canonical registry key: snake case, without a leading `pokemon_`.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.trim().chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else if ch == '-' || ch == ' ' {
            out.push('_');
        } else {
            out.push(ch);
        }
    }
    match out.strip_prefix("pokemon_") {
        Some(rest) => rest.to_owned(),
        None => out,
    }
}

pub fn build_constraint(spec: &ConstraintSpec) -> Result<BoxedConstraint, BuildConstraintError> {
    let key = normalize_key(&spec.constraint);
    let entry = all_constraint_entries()
        .into_iter()
        .find(|e| e.key == key)
        .ok_or_else(|| BuildConstraintError::UnknownConstraint {
            key: spec.constraint.clone(),
        })?;
    let mut args = ConstraintArgs::new(entry.key, spec);
    let constraint = (entry.build)(&mut args)?;
    args.finish()?;
    Ok(constraint)
}
