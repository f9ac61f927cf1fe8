//! Constraint evaluation for pokegrid cells.
//!
//! A grid cell is satisfied by every Pokémon matching both its row and its
//! column constraint. This crate computes those matching sets:
//!
//! 1. **Metadata** ([`metadata`]) - Memoized, catalog-wide facts that are expensive to
//!    derive (type roster, legendary/mythical sets, evolution roles, per-Pokémon details).
//!
//! 2. **Constraints** ([`constraint`]) - The predicate family. Each predicate computes the
//!    set of names satisfying it, querying the data source and/or the metadata cache.
//!
//! 3. **Registry** ([`registry`]) - Builds predicates from declarative
//!    [`ConstraintSpec`](registry::ConstraintSpec)s, rejecting unknown keys and malformed
//!    arguments before any request is issued.
//!
//! # Supporting Modules
//!
//! - [`matchup`] - Multiplicative type-effectiveness classification
//! - [`evolution`] - Evolution-tree role classification (first/middle/final/none)
//! - [`units`] - Conversions between API units and imperial thresholds
//!
//! # Fan-out
//!
//! Computations issue their data-source requests concurrently and wait for all of
//! them. The first failure aborts the whole computation: no partial set is returned
//! and nothing partial is memoized.

use std::collections::BTreeSet;

pub mod constraint;
pub mod evolution;
pub mod matchup;
pub mod metadata;
pub mod registry;
pub mod units;

/// A set of Pokémon names.
pub type NameSet = BTreeSet<String>;
