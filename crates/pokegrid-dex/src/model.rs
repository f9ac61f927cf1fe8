//! Catalog records.
//!
//! Field units follow the upstream API: heights are decimetres and weights are
//! hectograms. Conversions to imperial units live in `pokegrid-constraint`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Bulk-listable resource collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Pokemon,
    Type,
    Move,
    Generation,
    EvolutionChain,
    Species,
}

impl ResourceKind {
    /// Path segment of the resource on the upstream API.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Pokemon => "pokemon",
            ResourceKind::Type => "type",
            ResourceKind::Move => "move",
            ResourceKind::Generation => "generation",
            ResourceKind::EvolutionChain => "evolution-chain",
            ResourceKind::Species => "pokemon-species",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A single Pokémon (including alternate forms such as `charizard-mega-x`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pokemon {
    pub name: String,
    pub types: Vec<String>,
    /// Height in decimetres.
    pub height: u32,
    /// Weight in hectograms.
    pub weight: u32,
    pub stats: BaseStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl Stat {
    pub const ALL: [Stat; 6] = [
        Stat::Hp,
        Stat::Attack,
        Stat::Defense,
        Stat::SpecialAttack,
        Stat::SpecialDefense,
        Stat::Speed,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Stat::Hp => "hp",
            Stat::Attack => "attack",
            Stat::Defense => "defense",
            Stat::SpecialAttack => "special-attack",
            Stat::SpecialDefense => "special-defense",
            Stat::Speed => "speed",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("unknown stat '{name}'")]
pub struct UnknownStatError {
    pub name: String,
}

impl FromStr for Stat {
    type Err = UnknownStatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Stat::ALL
            .into_iter()
            .find(|stat| stat.name() == normalized)
            .ok_or_else(|| UnknownStatError { name: s.to_owned() })
    }
}

/// The six base stats of a Pokémon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

impl BaseStats {
    #[must_use]
    pub fn get(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::SpecialAttack => self.special_attack,
            Stat::SpecialDefense => self.special_defense,
            Stat::Speed => self.speed,
        }
    }

    pub fn set(&mut self, stat: Stat, value: u32) {
        let slot = match stat {
            Stat::Hp => &mut self.hp,
            Stat::Attack => &mut self.attack,
            Stat::Defense => &mut self.defense,
            Stat::SpecialAttack => &mut self.special_attack,
            Stat::SpecialDefense => &mut self.special_defense,
            Stat::Speed => &mut self.speed,
        };
        *slot = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, u32)> + '_ {
        Stat::ALL.into_iter().map(|stat| (stat, self.get(stat)))
    }
}

/// Damage relations of an attacking type against defending types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRelations {
    /// Defending types that take no damage (immune).
    pub no_damage_to: Vec<String>,
    /// Defending types that take half damage (resist).
    pub half_damage_to: Vec<String>,
    /// Defending types that take double damage (weak).
    pub double_damage_to: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDetail {
    pub name: String,
    /// Names of every Pokémon carrying this type.
    pub pokemon: Vec<String>,
    pub damage_relations: DamageRelations,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDetail {
    pub name: String,
    pub learned_by_pokemon: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub id: u32,
    pub name: String,
    /// Species introduced in this generation.
    pub pokemon_species: Vec<String>,
}

/// One node of an evolution tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    pub species: String,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

impl ChainLink {
    #[must_use]
    pub fn leaf(species: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            evolves_to: vec![],
        }
    }

    #[must_use]
    pub fn with_children(species: impl Into<String>, evolves_to: Vec<ChainLink>) -> Self {
        Self {
            species: species.into(),
            evolves_to,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionChain {
    pub id: String,
    pub chain: ChainLink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    pub is_legendary: bool,
    pub is_mythical: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_from_str_accepts_api_and_snake_case() {
        assert_eq!("special-attack".parse::<Stat>().unwrap(), Stat::SpecialAttack);
        assert_eq!("special_defense".parse::<Stat>().unwrap(), Stat::SpecialDefense);
        assert_eq!(" HP ".parse::<Stat>().unwrap(), Stat::Hp);
        assert!("luck".parse::<Stat>().is_err());
    }

    #[test]
    fn test_base_stats_set_and_iter() {
        let mut stats = BaseStats::default();
        stats.set(Stat::Speed, 130);
        stats.set(Stat::Hp, 50);
        assert_eq!(stats.get(Stat::Speed), 130);
        let collected: Vec<_> = stats.iter().collect();
        assert_eq!(collected.len(), 6);
        assert_eq!(collected[0], (Stat::Hp, 50));
        assert_eq!(collected[5], (Stat::Speed, 130));
    }

    #[test]
    fn test_resource_kind_path() {
        assert_eq!(ResourceKind::EvolutionChain.path(), "evolution-chain");
        assert_eq!(ResourceKind::Species.to_string(), "pokemon-species");
    }
}
