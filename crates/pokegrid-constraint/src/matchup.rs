//! Multiplicative type-effectiveness.
//!
//! For an attacking type, the catalog partitions defending types into three
//! relation lists: immune (no damage), resist (half damage) and weak (double
//! damage). A Pokémon's overall multiplier is the product over its own types:
//!
//! ```text
//! multiplier = 0                              if any type is immune
//!            = 0.5^resist_count × 2^weak_count otherwise
//! ```
//!
//! Dual types are handled by summing the per-type counts. The multiplier is
//! below 1 exactly when `resist_count > weak_count`, so classification is done on
//! the counts and stays exact.
//!
//! Every Pokémon falls into exactly one [`Matchup`]. Pokémon whose types never
//! appear in any relation list have all-zero counts and are [`Matchup::Neutral`].

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::NameSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum Matchup {
    Immune,
    Resistant,
    Neutral,
    Weak,
}

impl fmt::Display for Matchup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Matchup::Immune => "immune",
            Matchup::Resistant => "resistant",
            Matchup::Neutral => "neutral",
            Matchup::Weak => "weak",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchupCounts {
    pub immune: u32,
    pub resist: u32,
    pub weak: u32,
}

impl MatchupCounts {
    #[must_use]
    pub fn multiplier(self) -> f64 {
        if self.immune > 0 {
            return 0.0;
        }
        let exponent = i64::from(self.weak) - i64::from(self.resist);
        #[expect(clippy::cast_possible_truncation)]
        let exponent = exponent.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        2.0_f64.powi(exponent)
    }

    #[must_use]
    pub fn classify(self) -> Matchup {
        let multiplier = self.multiplier();
        if self.immune > 0 {
            Matchup::Immune
        } else if multiplier < 1.0 {
            Matchup::Resistant
        } else if multiplier > 1.0 {
            Matchup::Weak
        } else {
            Matchup::Neutral
        }
    }
}

/// Per-Pokémon relation counts against one attacking type.
#[derive(Debug, Clone, Default)]
pub struct MatchupTable {
    counts: BTreeMap<String, MatchupCounts>,
}

impl MatchupTable {
    /// Builds the table from the memberships of each defending type in the
    /// immune, resist and weak relation lists.
    #[must_use]
    pub fn from_memberships(immune: &[NameSet], resist: &[NameSet], weak: &[NameSet]) -> Self {
        let mut table = Self::default();
        for members in immune {
            table.add(members, |c| &mut c.immune);
        }
        for members in resist {
            table.add(members, |c| &mut c.resist);
        }
        for members in weak {
            table.add(members, |c| &mut c.weak);
        }
        table
    }

    fn add<F>(&mut self, members: &NameSet, slot: F)
    where
        F: Fn(&mut MatchupCounts) -> &mut u32,
    {
        for name in members {
            *slot(self.counts.entry(name.clone()).or_default()) += 1;
        }
    }

    #[must_use]
    pub fn counts(&self, name: &str) -> MatchupCounts {
        self.counts.get(name).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn classify(&self, name: &str) -> Matchup {
        self.counts(name).classify()
    }

    /// Names in the table's own universe that classify as `matchup`.
    ///
    /// Only names touched by at least one relation list are visible here; use
    /// [`select_from`](Self::select_from) for [`Matchup::Neutral`].
    #[must_use]
    pub fn select(&self, matchup: Matchup) -> NameSet {
        self.counts
            .iter()
            .filter(|(_, counts)| counts.classify() == matchup)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Names in `universe` that classify as `matchup`.
    #[must_use]
    pub fn select_from(&self, universe: &NameSet, matchup: Matchup) -> NameSet {
        universe
            .iter()
            .filter(|name| self.classify(name) == matchup)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> NameSet {
        names.iter().map(|&n| n.to_owned()).collect()
    }

    #[test]
    fn test_multiplier() {
        let counts = |immune, resist, weak| MatchupCounts {
            immune,
            resist,
            weak,
        };
        assert!((counts(0, 0, 0).multiplier() - 1.0).abs() < f64::EPSILON);
        assert!((counts(0, 1, 0).multiplier() - 0.5).abs() < f64::EPSILON);
        assert!((counts(0, 0, 2).multiplier() - 4.0).abs() < f64::EPSILON);
        assert!((counts(0, 1, 1).multiplier() - 1.0).abs() < f64::EPSILON);
        assert!(counts(1, 0, 2).multiplier().abs() < f64::EPSILON);
    }

    #[test]
    fn test_classification_follows_count_balance() {
        for immune in 0..2 {
            for resist in 0..3 {
                for weak in 0..3 {
                    let counts = MatchupCounts {
                        immune,
                        resist,
                        weak,
                    };
                    let expected = if immune > 0 {
                        Matchup::Immune
                    } else if resist > weak {
                        Matchup::Resistant
                    } else if weak > resist {
                        Matchup::Weak
                    } else {
                        Matchup::Neutral
                    };
                    assert_eq!(counts.classify(), expected, "{counts:?}");
                }
            }
        }
    }

    #[test]
    fn test_electric_attack_partition() {
        // electric: immune ground; resist grass, electric, dragon; weak water, flying
        let ground = set(&["geodude", "swampert"]);
        let grass = set(&["bulbasaur", "lotad"]);
        let electric = set(&["pikachu"]);
        let water = set(&["squirtle", "gyarados", "lotad", "swampert"]);
        let flying = set(&["gyarados", "pidgeot"]);

        let table = MatchupTable::from_memberships(
            &[ground],
            &[grass, electric],
            &[water, flying],
        );

        assert_eq!(table.classify("geodude"), Matchup::Immune);
        assert_eq!(table.classify("swampert"), Matchup::Immune);
        assert_eq!(table.classify("pikachu"), Matchup::Resistant);
        assert_eq!(table.classify("bulbasaur"), Matchup::Resistant);
        assert_eq!(table.classify("lotad"), Matchup::Neutral);
        assert_eq!(table.classify("gyarados"), Matchup::Weak);
        assert_eq!(table.counts("gyarados").weak, 2);
        assert_eq!(table.classify("squirtle"), Matchup::Weak);
        assert_eq!(table.classify("snorlax"), Matchup::Neutral);

        assert_eq!(table.select(Matchup::Weak), set(&["gyarados", "pidgeot", "squirtle"]));
        assert_eq!(table.select(Matchup::Neutral), set(&["lotad"]));

        let universe = set(&[
            "bulbasaur", "geodude", "gyarados", "lotad", "pidgeot", "pikachu", "snorlax",
            "squirtle", "swampert",
        ]);
        assert_eq!(
            table.select_from(&universe, Matchup::Neutral),
            set(&["lotad", "snorlax"])
        );

        let mut covered = NameSet::new();
        for matchup in [
            Matchup::Immune,
            Matchup::Resistant,
            Matchup::Neutral,
            Matchup::Weak,
        ] {
            let selected = table.select_from(&universe, matchup);
            assert!(covered.is_disjoint(&selected));
            covered.extend(selected);
        }
        assert_eq!(covered, universe);
    }
}
