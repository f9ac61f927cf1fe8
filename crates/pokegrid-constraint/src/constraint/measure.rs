//! Height and weight thresholds.
//!
//! Thresholds are given in feet/inches and pounds and converted once into the
//! catalog's decimetres and hectograms. Every comparison is strict: a Pokémon
//! exactly at the threshold matches neither side.

use std::{cmp::Ordering, collections::BTreeMap, fmt};

use async_trait::async_trait;
use pokegrid_dex::DexError;

use super::{BoxedConstraint, Constraint};
use crate::{
    NameSet,
    metadata::MetadataCache,
    units::{Length, Mass},
};

fn compare_all(values: &BTreeMap<&str, u32>, threshold: f64, wanted: Ordering) -> NameSet {
    values
        .iter()
        .filter(|&(_, &value)| f64::from(value).partial_cmp(&threshold) == Some(wanted))
        .map(|(&name, _)| name.to_owned())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShorterThan {
    feet: u32,
    inches: u32,
}

impl ShorterThan {
    #[must_use]
    pub fn new(feet: u32, inches: u32) -> Self {
        Self { feet, inches }
    }

    #[must_use]
    pub fn threshold(self) -> Length {
        Length::from_feet_inches(self.feet, self.inches)
    }
}

impl fmt::Display for ShorterThan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shorter_than({}, {})", self.feet, self.inches)
    }
}

#[async_trait]
impl Constraint for ShorterThan {
    fn id(&self) -> &'static str {
        "shorter_than"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(*self)
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        let heights = cache.heights().await?;
        Ok(compare_all(&heights, self.threshold().decimetres(), Ordering::Less))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallerThan {
    feet: u32,
    inches: u32,
}

impl TallerThan {
    #[must_use]
    pub fn new(feet: u32, inches: u32) -> Self {
        Self { feet, inches }
    }

    #[must_use]
    pub fn threshold(self) -> Length {
        Length::from_feet_inches(self.feet, self.inches)
    }
}

impl fmt::Display for TallerThan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "taller_than({}, {})", self.feet, self.inches)
    }
}

#[async_trait]
impl Constraint for TallerThan {
    fn id(&self) -> &'static str {
        "taller_than"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(*self)
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        let heights = cache.heights().await?;
        Ok(compare_all(&heights, self.threshold().decimetres(), Ordering::Greater))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeavierThan {
    pounds: f64,
}

impl HeavierThan {
    #[must_use]
    pub fn new(pounds: f64) -> Self {
        Self { pounds }
    }

    #[must_use]
    pub fn threshold(self) -> Mass {
        Mass::from_pounds(self.pounds)
    }
}

impl fmt::Display for HeavierThan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "heavier_than({})", self.pounds)
    }
}

#[async_trait]
impl Constraint for HeavierThan {
    fn id(&self) -> &'static str {
        "heavier_than"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(*self)
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        let weights = cache.weights().await?;
        Ok(compare_all(&weights, self.threshold().hectograms(), Ordering::Greater))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LighterThan {
    pounds: f64,
}

impl LighterThan {
    #[must_use]
    pub fn new(pounds: f64) -> Self {
        Self { pounds }
    }

    #[must_use]
    pub fn threshold(self) -> Mass {
        Mass::from_pounds(self.pounds)
    }
}

impl fmt::Display for LighterThan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lighter_than({})", self.pounds)
    }
}

#[async_trait]
impl Constraint for LighterThan {
    fn id(&self) -> &'static str {
        "lighter_than"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(*self)
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        let weights = cache.weights().await?;
        Ok(compare_all(&weights, self.threshold().hectograms(), Ordering::Less))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_all_is_strict() {
        let values = BTreeMap::from([("a", 5), ("b", 10), ("c", 15)]);
        assert_eq!(
            compare_all(&values, 10.0, Ordering::Less),
            NameSet::from(["a".to_owned()])
        );
        assert_eq!(
            compare_all(&values, 10.0, Ordering::Greater),
            NameSet::from(["c".to_owned()])
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ShorterThan::new(3, 0).to_string(), "shorter_than(3, 0)");
        assert_eq!(HeavierThan::new(220.5).to_string(), "heavier_than(220.5)");
    }
}
