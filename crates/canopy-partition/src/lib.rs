//! Partition engine for the Canopy entry store.
//!
//! This crate is the heart of Canopy. A partition owns one namespace
//! (everything at or below its suffix path) and keeps the master record
//! table and seven auxiliary indices mutually consistent across every
//! mutation:
//!
//! - the normalized-name and user-name indices (path to id)
//! - the hierarchy index (parent id to child ids)
//! - one value index per indexed attribute, plus the existence index
//! - the direct, one-level-scope, and subtree-scope alias indices
//!
//! It provides:
//! - The [`Partition`] trait boundary (lifecycle, mutations, lookups)
//! - [`InMemoryPartition`], the engine over in-memory tables
//! - The alias subsystem with its graph-safety rules (no self-reference,
//!   no ancestor/descendant cycle, no external target, no dangling
//!   target, no chaining)
//! - [`SchemaOracle`] / [`StaticSchema`] for index-registration lookups
//! - Typed failures in [`PartitionError`]

pub mod alias;
pub mod config;
pub mod engine;
pub mod error;
pub mod schema;
pub mod traits;

pub use config::PartitionConfig;
pub use engine::InMemoryPartition;
pub use error::{PartitionError, PartitionResult};
pub use schema::{IndexCardinality, SchemaOracle, StaticSchema};
pub use traits::{ModifyOp, Partition};
