//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: the entity repository used by the store
//! - **search**: the full-text engine fed by the search index synchronizer
//!
//! Adapters translate between domain types and their storage representation.
//! They contain no business logic.

pub mod persistence;
pub mod search;
