//! Full-text search adapters for the search index port.

mod memory_search_index;

pub use memory_search_index::InMemorySearchIndex;
