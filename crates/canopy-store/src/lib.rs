//! Master record table for the Canopy entry store.
//!
//! The record table is the source of truth for entry contents: it maps an
//! [`EntryId`](canopy_types::EntryId) to a [`Record`] (path plus attribute
//! set) and hands out fresh ids. It performs no validation whatsoever --
//! every invariant lives in the partition engine that owns it.
//!
//! # Design Rules
//!
//! 1. Ids strictly increase and are never reused, even after deletion.
//! 2. The table never interprets record contents -- it is a pure keyed store.
//! 3. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod record;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryRecordTable;
pub use record::Record;
pub use traits::RecordTable;
