//! Catalog-roster predicates: legendary status, learnsets, debut generation
//! and stat profile.

use std::fmt;

use async_trait::async_trait;
use pokegrid_dex::{DexError, Stat};

use super::{BoxedConstraint, Constraint};
use crate::{NameSet, metadata::MetadataCache};

/// Legendary or mythical species.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IsLegendaryMythical;

impl fmt::Display for IsLegendaryMythical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("is_legendary_mythical()")
    }
}

#[async_trait]
impl Constraint for IsLegendaryMythical {
    fn id(&self) -> &'static str {
        "is_legendary_mythical"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(self.clone())
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        Ok(cache.legendary_roster().await?.union())
    }
}

/// Pokémon listed as learners of a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanLearnMove {
    move_name: String,
}

impl CanLearnMove {
    #[must_use]
    pub fn new(move_name: impl Into<String>) -> Self {
        Self {
            move_name: move_name.into(),
        }
    }
}

impl fmt::Display for CanLearnMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "can_learn_move({})", self.move_name)
    }
}

#[async_trait]
impl Constraint for CanLearnMove {
    fn id(&self) -> &'static str {
        "can_learn_move"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(self.clone())
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        let detail = cache.source().move_detail(&self.move_name).await?;
        Ok(detail.learned_by_pokemon.into_iter().collect())
    }
}

/// Species introduced in a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstSeenInGeneration {
    generation: u32,
}

impl FirstSeenInGeneration {
    #[must_use]
    pub fn new(generation: u32) -> Self {
        Self { generation }
    }
}

impl fmt::Display for FirstSeenInGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "first_seen_in_generation({})", self.generation)
    }
}

#[async_trait]
impl Constraint for FirstSeenInGeneration {
    fn id(&self) -> &'static str {
        "first_seen_in_generation"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(*self)
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        let generation = cache
            .source()
            .generation(&self.generation.to_string())
            .await?;
        Ok(generation.pokemon_species.into_iter().collect())
    }
}

/// Pokémon whose given stat is their single highest stat.
///
/// # Matching set
///
/// A Pokémon qualifies when its value for `stat` is strictly greater than each
/// of its own five other stats. Other Pokémon are not compared, and a tie for
/// the top value disqualifies. See [`MetadataCache::highest_base_stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighestBaseStat {
    stat: Stat,
}

impl HighestBaseStat {
    #[must_use]
    pub fn new(stat: Stat) -> Self {
        Self { stat }
    }
}

impl fmt::Display for HighestBaseStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "highest_base_stat({})", self.stat)
    }
}

#[async_trait]
impl Constraint for HighestBaseStat {
    fn id(&self) -> &'static str {
        "highest_base_stat"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(*self)
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        cache.highest_base_stat(self.stat).await
    }
}
