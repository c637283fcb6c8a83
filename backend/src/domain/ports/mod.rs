//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod board_command;
mod board_query;
mod entity_repository;
mod search_index;
mod search_index_outbox;
mod user_registration;

#[cfg(test)]
pub use board_command::MockBoardCommand;
pub use board_command::{BoardCommand, Command, MutationOutcome};
#[cfg(test)]
pub use board_query::MockBoardQuery;
pub use board_query::BoardQuery;
#[cfg(test)]
pub use entity_repository::MockEntityRepository;
pub use entity_repository::{EntityRepository, EntityRepositoryError, FixtureEntityRepository};
#[cfg(test)]
pub use search_index::MockSearchIndex;
pub use search_index::{SearchIndex, SearchIndexError};
#[cfg(test)]
pub use search_index_outbox::MockSearchIndexOutbox;
pub use search_index_outbox::{FixtureSearchIndexOutbox, IndexOperation, SearchIndexOutbox};
#[cfg(test)]
pub use user_registration::MockUserRegistration;
pub use user_registration::UserRegistration;
