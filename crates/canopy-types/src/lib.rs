//! Foundation types for the Canopy entry store.
//!
//! This crate provides the identifier, path, and attribute types used
//! throughout the Canopy system. Every other Canopy crate depends on
//! `canopy-types`.
//!
//! # Key Types
//!
//! - [`EntryId`] — Monotonically allocated entry identifier, never reused
//! - [`Dn`] — Hierarchical path with a normalized and a user-supplied form
//! - [`Rdn`] — A single `attr=value` path component
//! - [`Entry`] — Multi-valued attribute set keyed by normalized name

pub mod entry;
pub mod error;
pub mod id;
pub mod path;

pub use entry::Entry;
pub use error::TypeError;
pub use id::EntryId;
pub use path::{Dn, Rdn};
