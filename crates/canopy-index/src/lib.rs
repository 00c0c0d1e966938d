//! Generic value indexing for the Canopy entry store.
//!
//! One structure, [`ValueIndex`], serves every secondary-index role in the
//! partition: the two name indices (path to id), the hierarchy index
//! (parent id to child ids), the three alias indices, the existence index
//! (attribute name to ids), and one instance per indexed attribute. The
//! original design expressed these as a type hierarchy; here they are a
//! single ordered-map abstraction parameterized over the key type.
//!
//! # Key Types
//!
//! - [`ValueIndex`] -- Forward (`key -> ids`) and reverse (`id -> keys`)
//!   ordered maps kept in lockstep
//! - [`IndexError`] -- Index-level failures

pub mod error;
pub mod value_index;

pub use error::{IndexError, IndexResult};
pub use value_index::ValueIndex;
