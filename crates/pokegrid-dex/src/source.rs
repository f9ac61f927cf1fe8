use std::{fmt, sync::Arc};

use async_trait::async_trait;

use crate::{
    DexError,
    model::{EvolutionChain, Generation, MoveDetail, Pokemon, ResourceKind, Species, TypeDetail},
};

/// Read-only access to the species catalog.
///
/// Implementations must be safe to call concurrently: callers fan out many
/// requests at once and wait for all of them.
#[async_trait]
pub trait DexSource: fmt::Debug + Send + Sync {
    async fn pokemon(&self, name: &str) -> Result<Pokemon, DexError>;

    async fn type_detail(&self, name: &str) -> Result<TypeDetail, DexError>;

    async fn move_detail(&self, name: &str) -> Result<MoveDetail, DexError>;

    /// Generations are addressed by number (`"1"`) or name (`"generation-i"`).
    async fn generation(&self, id: &str) -> Result<Generation, DexError>;

    async fn evolution_chain(&self, id: &str) -> Result<EvolutionChain, DexError>;

    async fn species(&self, name: &str) -> Result<Species, DexError>;

    /// Lists identifiers of every resource of `kind` in a single request.
    ///
    /// Named resources yield their names; evolution chains yield their ids.
    async fn list(&self, kind: ResourceKind) -> Result<Vec<String>, DexError>;
}

pub type SharedDexSource = Arc<dyn DexSource>;
