//! In-memory catalog backend.
//!
//! [`InMemoryDex`] serves a fixed [`DexFixture`], either built in code through
//! [`DexFixtureBuilder`] or loaded from a JSON file. It counts every request it
//! answers, which lets callers observe memoization, and can be told to fail
//! specific lookups to exercise fail-fast fan-out.

use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    io,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    DexError, DexSource,
    model::{
        BaseStats, ChainLink, DamageRelations, EvolutionChain, Generation, MoveDetail, Pokemon,
        ResourceKind, Species, TypeDetail,
    },
};

/// Serializable snapshot of a catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DexFixture {
    pub pokemon: Vec<Pokemon>,
    pub types: Vec<TypeDetail>,
    pub moves: Vec<MoveDetail>,
    pub generations: Vec<Generation>,
    pub evolution_chains: Vec<EvolutionChain>,
    pub species: Vec<Species>,
}

impl DexFixture {
    #[must_use]
    pub fn builder() -> DexFixtureBuilder {
        DexFixtureBuilder::default()
    }
}

/// Incremental construction of a [`DexFixture`].
///
/// Type membership is derived from each Pokémon's type list, so callers only
/// declare damage relations for attacking types they care about.
#[derive(Debug, Default)]
pub struct DexFixtureBuilder {
    pokemon: BTreeMap<String, Pokemon>,
    relations: BTreeMap<String, DamageRelations>,
    moves: BTreeMap<String, BTreeSet<String>>,
    generations: BTreeMap<u32, BTreeSet<String>>,
    chains: Vec<ChainLink>,
    species: BTreeMap<String, Species>,
}

impl DexFixtureBuilder {
    #[must_use]
    pub fn pokemon(
        mut self,
        name: &str,
        types: &[&str],
        height: u32,
        weight: u32,
        stats: BaseStats,
    ) -> Self {
        self.pokemon.insert(
            name.to_owned(),
            Pokemon {
                name: name.to_owned(),
                types: types.iter().map(|&t| t.to_owned()).collect(),
                height,
                weight,
                stats,
            },
        );
        self
    }

    /// Declares the damage relations of `attacking` against defending types.
    #[must_use]
    pub fn damage_relations(
        mut self,
        attacking: &str,
        no_damage_to: &[&str],
        half_damage_to: &[&str],
        double_damage_to: &[&str],
    ) -> Self {
        let to_vec = |names: &[&str]| names.iter().map(|&n| n.to_owned()).collect();
        self.relations.insert(
            attacking.to_owned(),
            DamageRelations {
                no_damage_to: to_vec(no_damage_to),
                half_damage_to: to_vec(half_damage_to),
                double_damage_to: to_vec(double_damage_to),
            },
        );
        self
    }

    /// Declares an empty type so it shows up in the roster without members.
    #[must_use]
    pub fn empty_type(mut self, name: &str) -> Self {
        self.relations.entry(name.to_owned()).or_default();
        self
    }

    #[must_use]
    pub fn move_learners(mut self, move_name: &str, learners: &[&str]) -> Self {
        self.moves
            .entry(move_name.to_owned())
            .or_default()
            .extend(learners.iter().map(|&n| n.to_owned()));
        self
    }

    #[must_use]
    pub fn generation(mut self, id: u32, species: &[&str]) -> Self {
        self.generations
            .entry(id)
            .or_default()
            .extend(species.iter().map(|&n| n.to_owned()));
        self
    }

    #[must_use]
    pub fn evolution_chain(mut self, chain: ChainLink) -> Self {
        self.chains.push(chain);
        self
    }

    #[must_use]
    pub fn species(mut self, name: &str, is_legendary: bool, is_mythical: bool) -> Self {
        self.species.insert(
            name.to_owned(),
            Species {
                name: name.to_owned(),
                is_legendary,
                is_mythical,
            },
        );
        self
    }

    #[must_use]
    pub fn build(self) -> DexFixture {
        let Self {
            pokemon,
            mut relations,
            moves,
            generations,
            chains,
            species,
        } = self;

        let defending: Vec<String> = relations
            .values()
            .flat_map(|r| {
                r.no_damage_to
                    .iter()
                    .chain(&r.half_damage_to)
                    .chain(&r.double_damage_to)
                    .cloned()
            })
            .collect();
        for ty in defending {
            relations.entry(ty).or_default();
        }

        let mut members: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for p in pokemon.values() {
            for ty in &p.types {
                members.entry(ty.clone()).or_default().push(p.name.clone());
                relations.entry(ty.clone()).or_default();
            }
        }

        let types = relations
            .into_iter()
            .map(|(name, damage_relations)| TypeDetail {
                pokemon: members.remove(&name).unwrap_or_default(),
                name,
                damage_relations,
            })
            .collect();

        DexFixture {
            pokemon: pokemon.into_values().collect(),
            types,
            moves: moves
                .into_iter()
                .map(|(name, learners)| MoveDetail {
                    name,
                    learned_by_pokemon: learners.into_iter().collect(),
                })
                .collect(),
            generations: generations
                .into_iter()
                .map(|(id, species)| Generation {
                    id,
                    name: format!("generation-{id}"),
                    pokemon_species: species.into_iter().collect(),
                })
                .collect(),
            evolution_chains: chains
                .into_iter()
                .enumerate()
                .map(|(i, chain)| EvolutionChain {
                    id: (i + 1).to_string(),
                    chain,
                })
                .collect(),
            species: species.into_values().collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDex {
    fixture: DexFixture,
    failing: HashSet<(ResourceKind, String)>,
    requests: AtomicUsize,
}

impl InMemoryDex {
    #[must_use]
    pub fn new(fixture: DexFixture) -> Self {
        Self {
            fixture,
            failing: HashSet::new(),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn from_json_reader<R>(reader: R) -> Result<Self, serde_json::Error>
    where
        R: io::Read,
    {
        let fixture = serde_json::from_reader(reader)?;
        Ok(Self::new(fixture))
    }

    /// Makes every lookup of `name` in `kind` fail with a 503 status.
    ///
    /// Use `"*"` as the name to fail bulk listings of `kind`.
    #[must_use]
    pub fn with_failure(mut self, kind: ResourceKind, name: &str) -> Self {
        self.failing.insert((kind, name.to_owned()));
        self
    }

    #[must_use]
    pub fn fixture(&self) -> &DexFixture {
        &self.fixture
    }

    /// Number of requests answered so far, failed ones included.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    fn lookup<'a, T, F>(
        &self,
        kind: ResourceKind,
        name: &str,
        items: &'a [T],
        key: F,
    ) -> Result<&'a T, DexError>
    where
        F: Fn(&T) -> bool,
    {
        self.begin(kind, name)?;
        items
            .iter()
            .find(|item| key(item))
            .ok_or_else(|| DexError::NotFound {
                resource: kind,
                name: name.to_owned(),
            })
    }

    fn begin(&self, kind: ResourceKind, name: &str) -> Result<(), DexError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if self.failing.contains(&(kind, name.to_owned())) {
            return Err(DexError::Status {
                url: format!("memory://{}/{name}", kind.path()),
                status: 503,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DexSource for InMemoryDex {
    async fn pokemon(&self, name: &str) -> Result<Pokemon, DexError> {
        self.lookup(ResourceKind::Pokemon, name, &self.fixture.pokemon, |p| {
            p.name == name
        })
        .cloned()
    }

    async fn type_detail(&self, name: &str) -> Result<TypeDetail, DexError> {
        self.lookup(ResourceKind::Type, name, &self.fixture.types, |t| t.name == name)
            .cloned()
    }

    async fn move_detail(&self, name: &str) -> Result<MoveDetail, DexError> {
        self.lookup(ResourceKind::Move, name, &self.fixture.moves, |m| m.name == name)
            .cloned()
    }

    async fn generation(&self, id: &str) -> Result<Generation, DexError> {
        self.lookup(ResourceKind::Generation, id, &self.fixture.generations, |g| {
            g.name == id || g.id.to_string() == id
        })
        .cloned()
    }

    async fn evolution_chain(&self, id: &str) -> Result<EvolutionChain, DexError> {
        self.lookup(
            ResourceKind::EvolutionChain,
            id,
            &self.fixture.evolution_chains,
            |c| c.id == id,
        )
        .cloned()
    }

    async fn species(&self, name: &str) -> Result<Species, DexError> {
        self.lookup(ResourceKind::Species, name, &self.fixture.species, |s| {
            s.name == name
        })
        .cloned()
    }

    async fn list(&self, kind: ResourceKind) -> Result<Vec<String>, DexError> {
        self.begin(kind, "*")?;
        let fixture = &self.fixture;
        let ids = match kind {
            ResourceKind::Pokemon => fixture.pokemon.iter().map(|p| p.name.clone()).collect(),
            ResourceKind::Type => fixture.types.iter().map(|t| t.name.clone()).collect(),
            ResourceKind::Move => fixture.moves.iter().map(|m| m.name.clone()).collect(),
            ResourceKind::Generation => {
                fixture.generations.iter().map(|g| g.name.clone()).collect()
            }
            ResourceKind::EvolutionChain => {
                fixture.evolution_chains.iter().map(|c| c.id.clone()).collect()
            }
            ResourceKind::Species => fixture.species.iter().map(|s| s.name.clone()).collect(),
        };
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> DexFixture {
        DexFixture::builder()
            .pokemon("charmander", &["fire"], 6, 85, BaseStats::default())
            .pokemon("charizard", &["fire", "flying"], 17, 905, BaseStats::default())
            .damage_relations("fire", &[], &["fire", "water"], &["grass"])
            .empty_type("stellar")
            .move_learners("fly", &["charizard"])
            .generation(1, &["charmander", "charizard"])
            .evolution_chain(ChainLink::with_children(
                "charmander",
                vec![ChainLink::leaf("charizard")],
            ))
            .species("charizard", false, false)
            .build()
    }

    #[test]
    fn test_builder_derives_type_membership() {
        let fixture = fixture();
        let fire = fixture.types.iter().find(|t| t.name == "fire").unwrap();
        assert_eq!(fire.pokemon, vec!["charizard", "charmander"]);
        assert_eq!(fire.damage_relations.double_damage_to, vec!["grass"]);

        let flying = fixture.types.iter().find(|t| t.name == "flying").unwrap();
        assert_eq!(flying.pokemon, vec!["charizard"]);
        assert!(flying.damage_relations.no_damage_to.is_empty());

        let stellar = fixture.types.iter().find(|t| t.name == "stellar").unwrap();
        assert!(stellar.pokemon.is_empty());

        // defending types named only in relations still get an entry
        let water = fixture.types.iter().find(|t| t.name == "water").unwrap();
        assert!(water.pokemon.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_and_not_found() {
        let dex = InMemoryDex::new(fixture());
        let charizard = dex.pokemon("charizard").await.unwrap();
        assert_eq!(charizard.weight, 905);

        let err = dex.move_detail("splash").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(dex.request_count(), 2);
    }

    #[tokio::test]
    async fn test_generation_addressed_by_number_or_name() {
        let dex = InMemoryDex::new(fixture());
        assert_eq!(dex.generation("1").await.unwrap().name, "generation-1");
        assert_eq!(dex.generation("generation-1").await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let dex = InMemoryDex::new(fixture()).with_failure(ResourceKind::Pokemon, "*");
        let err = dex.list(ResourceKind::Pokemon).await.unwrap_err();
        assert!(err.is_status());
        let types = dex.list(ResourceKind::Type).await.unwrap();
        assert_eq!(types, vec!["fire", "flying", "grass", "stellar", "water"]);
    }

    #[test]
    fn test_fixture_json_round_trip() {
        let fixture = fixture();
        let json = serde_json::to_string(&fixture).unwrap();
        let dex = InMemoryDex::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(dex.fixture(), &fixture);
    }
}
