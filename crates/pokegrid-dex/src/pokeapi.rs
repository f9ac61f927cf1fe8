//! HTTP backend for a PokeAPI-compatible service.
//!
//! Responses are decoded into private wire structs that ignore unknown fields,
//! then converted into the crate's [`model`](crate::model) records. Bulk
//! listings use a very large page size so a single request returns the whole
//! collection.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, de::DeserializeOwned};
use tokio::sync::Semaphore;
use tracing::{debug, trace};

use crate::{
    DexError, DexSource,
    model::{
        BaseStats, ChainLink, DamageRelations, EvolutionChain, Generation, MoveDetail, Pokemon,
        ResourceKind, Species, Stat, TypeDetail,
    },
};

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 32;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const LIST_PAGE_SIZE: u32 = 100_000;

#[derive(Debug, Clone)]
pub struct PokeApiConfig {
    pub base_url: String,
    /// Upper bound on in-flight requests; `None` leaves fan-out unbounded.
    pub max_concurrent_requests: Option<usize>,
    pub request_timeout: Duration,
}

impl Default for PokeApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            max_concurrent_requests: Some(DEFAULT_MAX_CONCURRENT_REQUESTS),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug)]
pub struct PokeApiClient {
    http: reqwest::Client,
    base_url: String,
    permits: Option<Semaphore>,
}

impl PokeApiClient {
    pub fn new(config: PokeApiConfig) -> Result<Self, DexError> {
        let PokeApiConfig {
            base_url,
            max_concurrent_requests,
            request_timeout,
        } = config;
        let base_url = base_url.trim_end_matches('/').to_owned();
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|source| DexError::Transport {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self {
            http,
            base_url,
            permits: max_concurrent_requests.map(|n| Semaphore::new(n.max(1))),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_resource<T>(&self, kind: ResourceKind, name: &str) -> Result<T, DexError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}/{}/", self.base_url, kind.path(), name);
        self.get_json(&url, kind, name).await
    }

    async fn get_json<T>(&self, url: &str, kind: ResourceKind, name: &str) -> Result<T, DexError>
    where
        T: DeserializeOwned,
    {
        // The semaphore is never closed, so a failed acquire only means "no cap".
        let _permit = match &self.permits {
            Some(permits) => permits.acquire().await.ok(),
            None => None,
        };

        trace!(url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| DexError::Transport {
                url: url.to_owned(),
                source,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DexError::NotFound {
                resource: kind,
                name: name.to_owned(),
            });
        }
        if !status.is_success() {
            return Err(DexError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| DexError::Transport {
                url: url.to_owned(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|source| DexError::Decode {
            resource: kind,
            name: name.to_owned(),
            source,
        })
    }
}

#[async_trait]
impl DexSource for PokeApiClient {
    async fn pokemon(&self, name: &str) -> Result<Pokemon, DexError> {
        let wire: WirePokemon = self.get_resource(ResourceKind::Pokemon, name).await?;
        Ok(wire.into())
    }

    async fn type_detail(&self, name: &str) -> Result<TypeDetail, DexError> {
        let wire: WireType = self.get_resource(ResourceKind::Type, name).await?;
        Ok(wire.into())
    }

    async fn move_detail(&self, name: &str) -> Result<MoveDetail, DexError> {
        let wire: WireMove = self.get_resource(ResourceKind::Move, name).await?;
        Ok(wire.into())
    }

    async fn generation(&self, id: &str) -> Result<Generation, DexError> {
        let wire: WireGeneration = self.get_resource(ResourceKind::Generation, id).await?;
        Ok(wire.into())
    }

    async fn evolution_chain(&self, id: &str) -> Result<EvolutionChain, DexError> {
        let wire: WireEvolutionChain = self.get_resource(ResourceKind::EvolutionChain, id).await?;
        Ok(wire.into())
    }

    async fn species(&self, name: &str) -> Result<Species, DexError> {
        let wire: WireSpecies = self.get_resource(ResourceKind::Species, name).await?;
        Ok(wire.into())
    }

    async fn list(&self, kind: ResourceKind) -> Result<Vec<String>, DexError> {
        let url = format!("{}/{}?limit={LIST_PAGE_SIZE}", self.base_url, kind.path());
        let wire: WireResourceList = self.get_json(&url, kind, "*").await?;
        let ids = wire.identifiers();
        debug!(resource = %kind, count = ids.len(), "listed resources");
        Ok(ids)
    }
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WirePokemon {
    name: String,
    height: u32,
    weight: u32,
    types: Vec<WirePokemonType>,
    stats: Vec<WirePokemonStat>,
}

#[derive(Debug, Deserialize)]
struct WirePokemonType {
    #[serde(rename = "type")]
    ty: NamedRef,
}

#[derive(Debug, Deserialize)]
struct WirePokemonStat {
    base_stat: u32,
    stat: NamedRef,
}

impl From<WirePokemon> for Pokemon {
    fn from(wire: WirePokemon) -> Self {
        let mut stats = BaseStats::default();
        for entry in wire.stats {
            if let Ok(stat) = entry.stat.name.parse::<Stat>() {
                stats.set(stat, entry.base_stat);
            }
        }
        Pokemon {
            name: wire.name,
            types: wire.types.into_iter().map(|t| t.ty.name).collect(),
            height: wire.height,
            weight: wire.weight,
            stats,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireType {
    name: String,
    pokemon: Vec<WireTypeMember>,
    damage_relations: WireDamageRelations,
}

#[derive(Debug, Deserialize)]
struct WireTypeMember {
    pokemon: NamedRef,
}

#[derive(Debug, Deserialize)]
struct WireDamageRelations {
    no_damage_to: Vec<NamedRef>,
    half_damage_to: Vec<NamedRef>,
    double_damage_to: Vec<NamedRef>,
}

fn names(refs: Vec<NamedRef>) -> Vec<String> {
    refs.into_iter().map(|r| r.name).collect()
}

impl From<WireType> for TypeDetail {
    fn from(wire: WireType) -> Self {
        let relations = wire.damage_relations;
        TypeDetail {
            name: wire.name,
            pokemon: wire.pokemon.into_iter().map(|m| m.pokemon.name).collect(),
            damage_relations: DamageRelations {
                no_damage_to: names(relations.no_damage_to),
                half_damage_to: names(relations.half_damage_to),
                double_damage_to: names(relations.double_damage_to),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireMove {
    name: String,
    learned_by_pokemon: Vec<NamedRef>,
}

impl From<WireMove> for MoveDetail {
    fn from(wire: WireMove) -> Self {
        MoveDetail {
            name: wire.name,
            learned_by_pokemon: names(wire.learned_by_pokemon),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireGeneration {
    id: u32,
    name: String,
    pokemon_species: Vec<NamedRef>,
}

impl From<WireGeneration> for Generation {
    fn from(wire: WireGeneration) -> Self {
        Generation {
            id: wire.id,
            name: wire.name,
            pokemon_species: names(wire.pokemon_species),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireEvolutionChain {
    id: u32,
    chain: WireChainLink,
}

#[derive(Debug, Deserialize)]
struct WireChainLink {
    species: NamedRef,
    #[serde(default)]
    evolves_to: Vec<WireChainLink>,
}

impl From<WireChainLink> for ChainLink {
    fn from(wire: WireChainLink) -> Self {
        ChainLink {
            species: wire.species.name,
            evolves_to: wire.evolves_to.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<WireEvolutionChain> for EvolutionChain {
    fn from(wire: WireEvolutionChain) -> Self {
        EvolutionChain {
            id: wire.id.to_string(),
            chain: wire.chain.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireSpecies {
    name: String,
    is_legendary: bool,
    is_mythical: bool,
}

impl From<WireSpecies> for Species {
    fn from(wire: WireSpecies) -> Self {
        Species {
            name: wire.name,
            is_legendary: wire.is_legendary,
            is_mythical: wire.is_mythical,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireResourceList {
    results: Vec<WireResourceRef>,
}

#[derive(Debug, Deserialize)]
struct WireResourceRef {
    name: Option<String>,
    url: String,
}

impl WireResourceList {
    fn identifiers(self) -> Vec<String> {
        self.results
            .into_iter()
            .map(|r| match r.name {
                Some(name) => name,
                None => id_from_url(&r.url).to_owned(),
            })
            .collect()
    }
}

fn id_from_url(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pokemon_ignores_unknown_fields() {
        let json = r#"{
            "id": 6,
            "name": "charizard",
            "height": 17,
            "weight": 905,
            "base_experience": 267,
            "types": [
                {"slot": 1, "type": {"name": "fire", "url": "https://pokeapi.co/api/v2/type/10/"}},
                {"slot": 2, "type": {"name": "flying", "url": "https://pokeapi.co/api/v2/type/3/"}}
            ],
            "stats": [
                {"base_stat": 78, "effort": 0, "stat": {"name": "hp"}},
                {"base_stat": 84, "effort": 0, "stat": {"name": "attack"}},
                {"base_stat": 78, "effort": 0, "stat": {"name": "defense"}},
                {"base_stat": 109, "effort": 3, "stat": {"name": "special-attack"}},
                {"base_stat": 85, "effort": 0, "stat": {"name": "special-defense"}},
                {"base_stat": 100, "effort": 0, "stat": {"name": "speed"}}
            ]
        }"#;
        let wire: WirePokemon = serde_json::from_str(json).unwrap();
        let pokemon = Pokemon::from(wire);
        assert_eq!(pokemon.name, "charizard");
        assert_eq!(pokemon.types, vec!["fire", "flying"]);
        assert_eq!(pokemon.height, 17);
        assert_eq!(pokemon.stats.get(Stat::SpecialAttack), 109);
        assert_eq!(pokemon.stats.get(Stat::Speed), 100);
    }

    #[test]
    fn test_decode_evolution_chain_with_extra_detail_fields() {
        let json = r#"{
            "id": 140,
            "baby_trigger_item": null,
            "chain": {
                "species": {"name": "ralts"},
                "evolution_details": [],
                "evolves_to": [{
                    "species": {"name": "kirlia"},
                    "evolution_details": [
                        {"base_form_id": 280, "region_id": null, "min_level": 20}
                    ],
                    "evolves_to": [
                        {"species": {"name": "gardevoir"}, "evolves_to": []},
                        {"species": {"name": "gallade"}, "evolves_to": []}
                    ]
                }]
            }
        }"#;
        let wire: WireEvolutionChain = serde_json::from_str(json).unwrap();
        let chain = EvolutionChain::from(wire);
        assert_eq!(chain.id, "140");
        assert_eq!(chain.chain.species, "ralts");
        assert_eq!(chain.chain.evolves_to[0].evolves_to.len(), 2);
        assert_eq!(chain.chain.evolves_to[0].evolves_to[1].species, "gallade");
    }

    #[test]
    fn test_decode_type_damage_relations() {
        let json = r#"{
            "name": "ghost",
            "pokemon": [{"slot": 1, "pokemon": {"name": "gastly"}}],
            "damage_relations": {
                "no_damage_to": [{"name": "normal"}],
                "half_damage_to": [{"name": "dark"}],
                "double_damage_to": [{"name": "ghost"}, {"name": "psychic"}],
                "no_damage_from": [],
                "half_damage_from": [],
                "double_damage_from": []
            }
        }"#;
        let wire: WireType = serde_json::from_str(json).unwrap();
        let detail = TypeDetail::from(wire);
        assert_eq!(detail.pokemon, vec!["gastly"]);
        assert_eq!(detail.damage_relations.no_damage_to, vec!["normal"]);
        assert_eq!(
            detail.damage_relations.double_damage_to,
            vec!["ghost", "psychic"]
        );
    }

    #[test]
    fn test_resource_list_falls_back_to_url_id() {
        let json = r#"{
            "count": 2,
            "results": [
                {"url": "https://pokeapi.co/api/v2/evolution-chain/1/"},
                {"url": "https://pokeapi.co/api/v2/evolution-chain/2/"}
            ]
        }"#;
        let wire: WireResourceList = serde_json::from_str(json).unwrap();
        assert_eq!(wire.identifiers(), vec!["1", "2"]);

        let json = r#"{"results": [
            {"name": "normal", "url": "https://pokeapi.co/api/v2/type/1/"}
        ]}"#;
        let wire: WireResourceList = serde_json::from_str(json).unwrap();
        assert_eq!(wire.identifiers(), vec!["normal"]);
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = PokeApiClient::new(PokeApiConfig {
            base_url: "http://localhost:8000/api/v2/".to_owned(),
            ..PokeApiConfig::default()
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api/v2");
    }
}
