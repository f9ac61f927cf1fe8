//! Type-membership predicates.

use std::{collections::BTreeMap, fmt};

use async_trait::async_trait;
use futures::future::try_join_all;
use pokegrid_dex::DexError;
use tracing::debug;

use super::{BoxedConstraint, Constraint};
use crate::{NameSet, metadata::MetadataCache};

/// Pokémon carrying type `ty`, from that type's resource.
pub(crate) async fn type_members(cache: &MetadataCache, ty: &str) -> Result<NameSet, DexError> {
    let detail = cache.source().type_detail(ty).await?;
    Ok(detail.pokemon.into_iter().collect())
}

/// Member sets of every listed type, fetched concurrently.
pub(crate) async fn members_of<S>(
    cache: &MetadataCache,
    types: &[S],
) -> Result<Vec<NameSet>, DexError>
where
    S: AsRef<str>,
{
    try_join_all(types.iter().map(|ty| type_members(cache, ty.as_ref()))).await
}

/// Member sets of every type in the roster.
pub(crate) async fn all_type_members(cache: &MetadataCache) -> Result<Vec<NameSet>, DexError> {
    let types = cache.types().await?;
    debug!(count = types.len(), "fetching every type membership");
    members_of(cache, types).await
}

/// How many of the given sets each name appears in.
fn membership_counts(sets: &[NameSet]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for name in sets.iter().flatten() {
        *counts.entry(name.as_str()).or_insert(0) += 1;
    }
    counts
}

async fn filter_by_type_count<F>(
    cache: &MetadataCache,
    inner: Option<&HasType>,
    keep: F,
) -> Result<NameSet, DexError>
where
    F: Fn(usize) -> bool,
{
    let sets = all_type_members(cache).await?;
    let selected: NameSet = membership_counts(&sets)
        .into_iter()
        .filter(|&(_, count)| keep(count))
        .map(|(name, _)| name.to_owned())
        .collect();

    match inner {
        Some(inner) => {
            let filter = inner.matching_set(cache).await?;
            Ok(selected.intersection(&filter).cloned().collect())
        }
        None => Ok(selected),
    }
}

/// Pokémon whose type list contains the given type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HasType {
    ty: String,
}

impl HasType {
    #[must_use]
    pub fn new(ty: impl Into<String>) -> Self {
        Self { ty: ty.into() }
    }

    #[must_use]
    pub fn ty(&self) -> &str {
        &self.ty
    }
}

impl fmt::Display for HasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "has_type({})", self.ty)
    }
}

#[async_trait]
impl Constraint for HasType {
    fn id(&self) -> &'static str {
        "has_type"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(self.clone())
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        type_members(cache, &self.ty).await
    }
}

/// Pokémon with exactly one type.
///
/// # Matching set
///
/// Names appearing in exactly one per-type membership set across the whole
/// type roster, intersected with the inner [`HasType`] set when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IsMonotype {
    inner: Option<HasType>,
}

impl IsMonotype {
    #[must_use]
    pub fn new(inner: Option<HasType>) -> Self {
        Self { inner }
    }
}

impl fmt::Display for IsMonotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(inner) => write!(f, "is_monotype({inner})"),
            None => f.write_str("is_monotype()"),
        }
    }
}

#[async_trait]
impl Constraint for IsMonotype {
    fn id(&self) -> &'static str {
        "is_monotype"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(self.clone())
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        filter_by_type_count(cache, self.inner.as_ref(), |count| count == 1).await
    }
}

/// Pokémon with two or more types.
///
/// # Matching set
///
/// Names appearing in at least two per-type membership sets, intersected with
/// the inner [`HasType`] set when present. Disjoint from [`IsMonotype`] for any
/// filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IsDualType {
    inner: Option<HasType>,
}

impl IsDualType {
    #[must_use]
    pub fn new(inner: Option<HasType>) -> Self {
        Self { inner }
    }
}

impl fmt::Display for IsDualType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(inner) => write!(f, "is_dual_type({inner})"),
            None => f.write_str("is_dual_type()"),
        }
    }
}

#[async_trait]
impl Constraint for IsDualType {
    fn id(&self) -> &'static str {
        "is_dual_type"
    }
    fn clone_boxed(&self) -> BoxedConstraint {
        Box::new(self.clone())
    }
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError> {
        filter_by_type_count(cache, self.inner.as_ref(), |count| count >= 2).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> NameSet {
        names.iter().map(|&n| n.to_owned()).collect()
    }

    #[test]
    fn test_membership_counts() {
        let sets = [set(&["a", "b"]), set(&["b", "c"]), set(&["b"])];
        let counts = membership_counts(&sets);
        assert_eq!(counts["a"], 1);
        assert_eq!(counts["b"], 3);
        assert_eq!(counts["c"], 1);
        assert!(!counts.contains_key("d"));
    }

    #[test]
    fn test_display() {
        assert_eq!(HasType::new("fire").to_string(), "has_type(fire)");
        assert_eq!(IsMonotype::new(None).to_string(), "is_monotype()");
        assert_eq!(
            IsDualType::new(Some(HasType::new("water"))).to_string(),
            "is_dual_type(has_type(water))"
        );
    }
}
