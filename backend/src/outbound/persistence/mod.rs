//! Persistence adapters for the entity repository port.
//!
//! The board ships with an in-memory store. A database-backed adapter only
//! needs to implement [`crate::domain::ports::EntityRepository`] with the
//! same referential checks and atomic multi-row operations.

mod memory_entity_repository;

pub use memory_entity_repository::InMemoryEntityRepository;
