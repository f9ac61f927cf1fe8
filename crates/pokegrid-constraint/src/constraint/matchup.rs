//! Type-effectiveness predicates.
//!
//! All four predicates share one evaluation: fetch the attacking type's damage
//! relations, fetch the membership of every defending type in the immune,
//! resist and weak lists concurrently, and classify each Pokémon with a
//! [`MatchupTable`]. For a fixed attacking type the four matching sets
//! partition the catalog.

use std::fmt;

use async_trait::async_trait;
use pokegrid_dex::DexError;
use tracing::debug;

use super::{
    BoxedConstraint, Constraint,
    typing::{all_type_members, members_of},
};
use crate::{
    NameSet,
    matchup::{Matchup, MatchupTable},
    metadata::MetadataCache,
};

async fn matchup_table(cache: &MetadataCache, attacking: &str) -> Result<MatchupTable, DexError> {
    let relations = cache.source().type_detail(attacking).await?.damage_relations;
    debug!(
        attacking,
        immune = relations.no_damage_to.len(),
        resist = relations.half_damage_to.len(),
        weak = relations.double_damage_to.len(),
        "fetching defending type memberships"
    );
    let (immune, resist, weak) = futures::try_join!(
        members_of(cache, &relations.no_damage_to),
        members_of(cache, &relations.half_damage_to),
        members_of(cache, &relations.double_damage_to),
    )?;
    Ok(MatchupTable::from_memberships(&immune, &resist, &weak))
}

async fn select_matchup(
    cache: &MetadataCache,
    attacking: &str,
    matchup: Matchup,
) -> Result<NameSet, DexError> {
    let table = matchup_table(cache, attacking).await?;
    if !matchup.is_neutral() {
        return Ok(table.select(matchup));
    }
    // neutral Pokémon may never appear in any relation list
    let universe: NameSet = all_type_members(cache).await?.into_iter().flatten().collect();
    Ok(table.select_from(&universe, matchup))
}

/// Pokémon taking less than normal damage from the attacking type.
///
/// Immune Pokémon are not included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResistantToType {
    attacking: String,
}

impl ResistantToType {
    #[must_use]
    pub fn new(attacking: impl Into<String>) -> Self {
        Self {
            attacking: attacking.into(),
        }
    }
}

impl fmt::Display for ResistantToType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resistant_to_type({})", self.attacking)
    }
}

#[async_trait]
impl Constraint for ResistantToType {
    fn id(&self) -> &'static str {
        "resistant_to_type"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(self.clone())
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        select_matchup(cache, &self.attacking, Matchup::Resistant).await
    }
}

/// Pokémon taking more than normal damage from the attacking type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeakToType {
    attacking: String,
}

impl WeakToType {
    #[must_use]
    pub fn new(attacking: impl Into<String>) -> Self {
        Self {
            attacking: attacking.into(),
        }
    }
}

impl fmt::Display for WeakToType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "weak_to_type({})", self.attacking)
    }
}

#[async_trait]
impl Constraint for WeakToType {
    fn id(&self) -> &'static str {
        "weak_to_type"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(self.clone())
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        select_matchup(cache, &self.attacking, Matchup::Weak).await
    }
}

/// Pokémon taking exactly normal damage from the attacking type.
///
/// Evaluated over every Pokémon with a type, including those whose types
/// appear in no relation list of the attacking type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeutralToType {
    attacking: String,
}

impl NeutralToType {
    #[must_use]
    pub fn new(attacking: impl Into<String>) -> Self {
        Self {
            attacking: attacking.into(),
        }
    }
}

impl fmt::Display for NeutralToType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "neutral_to_type({})", self.attacking)
    }
}

#[async_trait]
impl Constraint for NeutralToType {
    fn id(&self) -> &'static str {
        "neutral_to_type"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(self.clone())
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        select_matchup(cache, &self.attacking, Matchup::Neutral).await
    }
}

/// Pokémon taking no damage from the attacking type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmuneToType {
    attacking: String,
}

impl ImmuneToType {
    #[must_use]
    pub fn new(attacking: impl Into<String>) -> Self {
        Self {
            attacking: attacking.into(),
        }
    }
}

impl fmt::Display for ImmuneToType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "immune_to_type({})", self.attacking)
    }
}

#[async_trait]
impl Constraint for ImmuneToType {
    fn id(&self) -> &'static str {
        "immune_to_type"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(self.clone())
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        select_matchup(cache, &self.attacking, Matchup::Immune).await
    }
}
