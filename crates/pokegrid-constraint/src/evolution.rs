//! Evolution-role classification.
//!
//! Every evolution chain is a tree rooted at its base stage. Roles are derived
//! from the root-to-leaf paths of each tree:
//!
//! - a tree that is a single node contributes that species to [`EvolutionRole::NoEvolution`]
//! - the first element of every path is [`EvolutionRole::First`]
//! - the last element of every path is [`EvolutionRole::Final`]
//! - the interior elements of paths longer than two are [`EvolutionRole::Middle`]
//!
//! Sets are unioned across chains. A species that starts one branch and sits in
//! the interior of a sibling branch lands in both sets; the roles do not form a
//! strict partition.

use std::fmt;

use pokegrid_dex::ChainLink;
use serde::{Deserialize, Serialize};

use crate::NameSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionRole {
    First,
    Middle,
    Final,
    NoEvolution,
}

impl fmt::Display for EvolutionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EvolutionRole::First => "first",
            EvolutionRole::Middle => "middle",
            EvolutionRole::Final => "final",
            EvolutionRole::NoEvolution => "no_evolution",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvolutionRoles {
    first: NameSet,
    middle: NameSet,
    last: NameSet,
    no_evolution: NameSet,
}

impl EvolutionRoles {
    #[must_use]
    pub fn from_chains<'a, I>(chains: I) -> Self
    where
        I: IntoIterator<Item = &'a ChainLink>,
    {
        let mut roles = Self::default();
        for root in chains {
            roles.add_chain(root);
        }
        roles
    }

    pub fn add_chain(&mut self, root: &ChainLink) {
        if root.evolves_to.is_empty() {
            self.no_evolution.insert(root.species.clone());
            return;
        }

        for path in root_to_leaf_paths(root) {
            let (Some(&head), Some(&tail)) = (path.first(), path.last()) else {
                continue;
            };
            self.first.insert(head.to_owned());
            self.last.insert(tail.to_owned());
            if path.len() > 2 {
                self.middle
                    .extend(path[1..path.len() - 1].iter().map(|&s| s.to_owned()));
            }
        }
    }

    #[must_use]
    pub fn get(&self, role: EvolutionRole) -> &NameSet {
        match role {
            EvolutionRole::First => &self.first,
            EvolutionRole::Middle => &self.middle,
            EvolutionRole::Final => &self.last,
            EvolutionRole::NoEvolution => &self.no_evolution,
        }
    }
}

/// Enumerates every path from `root` to a leaf, in depth-first order.
#[must_use]
pub fn root_to_leaf_paths(root: &ChainLink) -> Vec<Vec<&str>> {
    let mut paths = vec![];
    let mut stack = vec![(root, vec![root.species.as_str()])];
    while let Some((node, path)) = stack.pop() {
        if node.evolves_to.is_empty() {
            paths.push(path);
            continue;
        }
        for child in node.evolves_to.iter().rev() {
            let mut child_path = path.clone();
            child_path.push(child.species.as_str());
            stack.push((child, child_path));
        }
    }
    paths
}
