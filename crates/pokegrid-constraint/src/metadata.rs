//! Memoized catalog-wide facts.
//!
//! [`MetadataCache`] owns a data-source handle and lazily derives facts that need
//! a full-catalog pass: the type roster, the Pokémon roster, legendary/mythical
//! membership, evolution roles and per-Pokémon details (height, weight, stats).
//!
//! Each fact is computed at most once per cache and then treated as immutable:
//! there is no invalidation and no expiry. Concurrent first accesses wait for a
//! single computation. A failed computation caches nothing, so the next access
//! retries it.
//!
//! Caches are not global. Pointing at a different data source means constructing
//! a new cache ([`MetadataCache::new`]); nothing leaks between instances.

use std::collections::BTreeMap;

use futures::future::try_join_all;
use pokegrid_dex::{DexError, DexSource, Pokemon, ResourceKind, SharedDexSource, Stat};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::{NameSet, evolution::EvolutionRoles};

/// Legendary and mythical species, classified independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegendaryRoster {
    pub legendary: NameSet,
    pub mythical: NameSet,
}

impl LegendaryRoster {
    #[must_use]
    pub fn union(&self) -> NameSet {
        self.legendary.union(&self.mythical).cloned().collect()
    }
}

#[derive(Debug)]
pub struct MetadataCache {
    source: SharedDexSource,
    types: OnceCell<Vec<String>>,
    pokemon_names: OnceCell<Vec<String>>,
    legendary: OnceCell<LegendaryRoster>,
    evolution_roles: OnceCell<EvolutionRoles>,
    details: OnceCell<BTreeMap<String, Pokemon>>,
}

impl MetadataCache {
    #[must_use]
    pub fn new(source: SharedDexSource) -> Self {
        Self {
            source,
            types: OnceCell::new(),
            pokemon_names: OnceCell::new(),
            legendary: OnceCell::new(),
            evolution_roles: OnceCell::new(),
            details: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn source(&self) -> &dyn DexSource {
        self.source.as_ref()
    }

    #[must_use]
    pub fn shared_source(&self) -> SharedDexSource {
        SharedDexSource::clone(&self.source)
    }

    /// Every type label in the catalog.
    pub async fn types(&self) -> Result<&[String], DexError> {
        let types = self
            .types
            .get_or_try_init(|| async {
                let types = self.source.list(ResourceKind::Type).await?;
                debug!(count = types.len(), "cached type roster");
                Ok::<_, DexError>(types)
            })
            .await?;
        Ok(types)
    }

    /// Every Pokémon name in the catalog, alternate forms included.
    pub async fn pokemon_names(&self) -> Result<&[String], DexError> {
        let names = self
            .pokemon_names
            .get_or_try_init(|| async {
                let names = self.source.list(ResourceKind::Pokemon).await?;
                debug!(count = names.len(), "cached pokemon roster");
                Ok::<_, DexError>(names)
            })
            .await?;
        Ok(names)
    }

    /// Legendary and mythical species, from one pass over every species record.
    pub async fn legendary_roster(&self) -> Result<&LegendaryRoster, DexError> {
        self.legendary
            .get_or_try_init(|| async {
                let names = self.source.list(ResourceKind::Species).await?;
                debug!(count = names.len(), "fetching species records");
                let species = try_join_all(names.iter().map(|n| self.source.species(n))).await?;

                let mut roster = LegendaryRoster::default();
                for s in species {
                    if s.is_legendary {
                        roster.legendary.insert(s.name.clone());
                    }
                    if s.is_mythical {
                        roster.mythical.insert(s.name);
                    }
                }
                debug!(
                    legendary = roster.legendary.len(),
                    mythical = roster.mythical.len(),
                    "cached legendary roster"
                );
                Ok::<_, DexError>(roster)
            })
            .await
    }

    /// Evolution roles, from one pass over every evolution chain.
    pub async fn evolution_roles(&self) -> Result<&EvolutionRoles, DexError> {
        self.evolution_roles
            .get_or_try_init(|| async {
                let ids = self.source.list(ResourceKind::EvolutionChain).await?;
                debug!(count = ids.len(), "fetching evolution chains");
                let chains =
                    try_join_all(ids.iter().map(|id| self.source.evolution_chain(id))).await?;
                Ok::<_, DexError>(EvolutionRoles::from_chains(
                    chains.iter().map(|c| &c.chain),
                ))
            })
            .await
    }

    /// Details of every Pokémon, one request per Pokémon.
    pub async fn details(&self) -> Result<&BTreeMap<String, Pokemon>, DexError> {
        let names = self.pokemon_names().await?;
        self.details
            .get_or_try_init(|| async {
                debug!(count = names.len(), "fetching pokemon details");
                let details = try_join_all(names.iter().map(|n| self.source.pokemon(n))).await?;
                Ok::<_, DexError>(details.into_iter().map(|p| (p.name.clone(), p)).collect())
            })
            .await
    }

    /// Height of every Pokémon, in decimetres.
    pub async fn heights(&self) -> Result<BTreeMap<&str, u32>, DexError> {
        let details = self.details().await?;
        Ok(details.values().map(|p| (p.name.as_str(), p.height)).collect())
    }

    /// Weight of every Pokémon, in hectograms.
    pub async fn weights(&self) -> Result<BTreeMap<&str, u32>, DexError> {
        let details = self.details().await?;
        Ok(details.values().map(|p| (p.name.as_str(), p.weight)).collect())
    }

    /// Pokémon whose `stat` is strictly greater than each of their own other stats.
    ///
    /// The comparison is against the same Pokémon's other stats, not against
    /// other Pokémon. Any tie disqualifies. Computed on every call from the
    /// memoized details.
    pub async fn highest_base_stat(&self, stat: Stat) -> Result<NameSet, DexError> {
        let details = self.details().await?;
        Ok(details
            .values()
            .filter(|p| is_highest_stat(p, stat))
            .map(|p| p.name.clone())
            .collect())
    }
}

fn is_highest_stat(pokemon: &Pokemon, stat: Stat) -> bool {
    let value = pokemon.stats.get(stat);
    pokemon
        .stats
        .iter()
        .filter(|&(other, _)| other != stat)
        .all(|(_, other_value)| value > other_value)
}
