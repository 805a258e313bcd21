//! Document store abstraction and implementations for Milestone.
//!
//! This crate provides the trait the repository reads project documents
//! through, an in-memory store and a JSON directory store.

#![warn(missing_docs)]

pub mod trait_;
pub mod document;
pub mod memory_storage;
pub mod json_storage;

pub use trait_::{DocumentStore, StoreError, Result};
pub use document::Document;
pub use memory_storage::MemoryStore;
pub use json_storage::JsonStore;
