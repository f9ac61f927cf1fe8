//! Species catalog access for the pokegrid solver.
//!
//! This crate defines the data the rest of the workspace reasons about and the
//! [`DexSource`] seam through which it is fetched:
//!
//! - [`model`] - Immutable records (Pokémon, types, moves, generations, evolution chains, species)
//! - [`source`] - The [`DexSource`] trait every backend implements
//! - [`pokeapi`] - HTTP backend talking to a PokeAPI-compatible service
//! - [`memory`] - In-memory backend loaded from a JSON fixture (offline runs and tests)
//!
//! All entities are keyed by their lowercase name. Lookups of unknown names
//! surface as [`DexError::NotFound`]; there is no local fallback.

pub use self::{memory::*, model::*, pokeapi::*, source::*};

pub mod memory;
pub mod model;
pub mod pokeapi;
pub mod source;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum DexError {
    #[display("{resource} '{name}' not found")]
    NotFound {
        resource: ResourceKind,
        name: String,
    },
    #[display("request to {url} failed")]
    Transport {
        url: String,
        source: reqwest::Error,
    },
    #[display("request to {url} returned status {status}")]
    Status {
        url: String,
        status: u16,
    },
    #[display("failed to decode {resource} '{name}'")]
    Decode {
        resource: ResourceKind,
        name: String,
        source: serde_json::Error,
    },
}
