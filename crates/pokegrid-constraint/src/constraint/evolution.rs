//! Evolution-stage and mega-form predicates.

use std::fmt;

use async_trait::async_trait;
use pokegrid_dex::DexError;

use super::{BoxedConstraint, Constraint};
use crate::{NameSet, evolution::EvolutionRole, metadata::MetadataCache};

/// Marker separating a base name from its mega form (`charizard-mega-x`).
pub const MEGA_MARKER: &str = "-mega";

/// Base name of a mega form, or `None` when `name` is not a mega form.
#[must_use]
pub fn mega_base_name(name: &str) -> Option<&str> {
    name.find(MEGA_MARKER).map(|idx| &name[..idx])
}

async fn role_members(cache: &MetadataCache, role: EvolutionRole) -> Result<NameSet, DexError> {
    Ok(cache.evolution_roles().await?.get(role).clone())
}

/// Species starting an evolution chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstEvolutionLine;

impl fmt::Display for FirstEvolutionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("first_evolution_line()")
    }
}

#[async_trait]
impl Constraint for FirstEvolutionLine {
    fn id(&self) -> &'static str {
        "first_evolution_line"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(self.clone())
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        role_members(cache, EvolutionRole::First).await
    }
}

/// Species strictly between the first and last stage of some chain path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MiddleEvolutionLine;

impl fmt::Display for MiddleEvolutionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("middle_evolution_line()")
    }
}

#[async_trait]
impl Constraint for MiddleEvolutionLine {
    fn id(&self) -> &'static str {
        "middle_evolution_line"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(self.clone())
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        role_members(cache, EvolutionRole::Middle).await
    }
}

/// Species ending some chain path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalEvolutionLine;

impl fmt::Display for FinalEvolutionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("final_evolution_line()")
    }
}

#[async_trait]
impl Constraint for FinalEvolutionLine {
    fn id(&self) -> &'static str {
        "final_evolution_line"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(self.clone())
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        role_members(cache, EvolutionRole::Final).await
    }
}

/// Species whose chain is a single node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoEvolutionLine;

impl fmt::Display for NoEvolutionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no_evolution_line()")
    }
}

#[async_trait]
impl Constraint for NoEvolutionLine {
    fn id(&self) -> &'static str {
        "no_evolution_line"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(self.clone())
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        role_members(cache, EvolutionRole::NoEvolution).await
    }
}

/// Pokémon that have a mega form.
///
/// # Matching set
///
/// For every Pokémon whose name contains [`MEGA_MARKER`], the name with the
/// marker and everything after it removed. `charizard-mega-x` and
/// `charizard-mega-y` both yield `charizard`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanMegaEvolve;

impl fmt::Display for CanMegaEvolve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("can_mega_evolve()")
    }
}

#[async_trait]
impl Constraint for CanMegaEvolve {
    fn id(&self) -> &'static str {
        "can_mega_evolve"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(self.clone())
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        let names = cache.pokemon_names().await?;
        Ok(names
            .iter()
            .filter_map(|name| mega_base_name(name))
            .map(str::to_owned)
            .collect())
    }
}

/// Mega forms themselves, under their full names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IsMegaEvolution;

impl fmt::Display for IsMegaEvolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("is_mega_evolution()")
    }
}

#[async_trait]
impl Constraint for IsMegaEvolution {
    fn id(&self) -> &'static str {
        "is_mega_evolution"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(self.clone())
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        let names = cache.pokemon_names().await?;
        Ok(names
            .iter()
            .filter(|name| mega_base_name(name).is_some())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mega_base_name() {
        assert_eq!(mega_base_name("venusaur-mega"), Some("venusaur"));
        assert_eq!(mega_base_name("charizard-mega-x"), Some("charizard"));
        assert_eq!(mega_base_name("charizard"), None);
        assert_eq!(mega_base_name("meganium"), None);
    }
}
