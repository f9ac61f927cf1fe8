//! The predicate family.
//!
//! A [`Constraint`] computes the set of Pokémon names satisfying it. Predicates
//! carry only their construction parameters and are read-only: results are
//! recomputed on every call, except where the predicate reads a fact the
//! [`MetadataCache`] has already memoized.
//!
//! - [`typing`]: [`HasType`], [`IsMonotype`], [`IsDualType`]
//! - [`matchup`]: [`ResistantToType`], [`WeakToType`], [`NeutralToType`],
//!   [`ImmuneToType`]
//! - [`evolution`]: [`FirstEvolutionLine`], [`MiddleEvolutionLine`],
//!   [`FinalEvolutionLine`], [`NoEvolutionLine`], [`CanMegaEvolve`],
//!   [`IsMegaEvolution`]
//! - [`roster`]: [`IsLegendaryMythical`], [`CanLearnMove`],
//!   [`FirstSeenInGeneration`], [`HighestBaseStat`]
//! - [`measure`]: [`ShorterThan`], [`TallerThan`], [`HeavierThan`], [`LighterThan`]
//!
//! Any failed data-source request fails the whole evaluation; an unknown type,
//! move or generation surfaces as [`DexError::NotFound`].

use std::fmt;

use async_trait::async_trait;
use pokegrid_dex::DexError;

use crate::{NameSet, metadata::MetadataCache};

pub use self::{evolution::*, matchup::*, measure::*, roster::*, typing::*};

pub mod evolution;
pub mod matchup;
pub mod measure;
pub mod roster;
pub mod typing;

#[async_trait]
pub trait Constraint: fmt::Debug + fmt::Display + Send + Sync {
    /// Registry key of this predicate (e.g. `has_type`).
    #[must_use]
    fn id(&self) -> &'static str;

    #[must_use]
    fn clone_boxed(&self) -> BoxedConstraint;

    /// Computes every Pokémon name satisfying this predicate.
    async fn matching_set(&self, cache: &MetadataCache) -> Result<NameSet, DexError>;
}

pub type BoxedConstraint = Box<dyn Constraint>;

impl Clone for BoxedConstraint {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}
