//! Domain primitives, policy, and services for the question-and-answer board.
//!
//! Purpose: define the board's entities and the rules that keep them
//! consistent. Authorization, the best-answer invariant, and search index
//! synchronization all live here; adapters only translate.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic error payload.
//! - Question, Answer, User: board entities with their invariants.
//! - BoardService: the only path by which mutations reach the store.
//! - SearchIndexSynchronizer: outbox worker keeping the search index fresh.

pub mod answer;
pub mod best_answer;
pub mod board_service;
pub mod error;
pub mod ids;
pub mod policy;
pub mod ports;
pub mod question;
pub mod question_locks;
pub mod search;
pub mod search_sync;
pub mod store;
pub mod trace_id;
pub mod user;
pub mod validation;

pub use self::answer::{Answer, AnswerDraft};
pub use self::best_answer::BestAnswerState;
pub use self::board_service::{
    BoardService, BoardServiceConfig, BoardServicePorts, QuestionDestroyDenial,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{AnswerId, IdParseError, QuestionId, UserId};
pub use self::question::{Question, QuestionChanges, QuestionDraft, QuestionThread};
pub use self::question_locks::QuestionLocks;
pub use self::search::{SearchHit, SearchIndexEntry, SearchQuery, SearchResults};
pub use self::search_sync::{
    BackoffJitter, IndexSleeper, SearchIndexSynchronizer, SearchSyncConfig, SearchSyncPorts,
    SearchSyncRuntime, StaleEntry,
};
pub use self::store::EntityStore;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Actor, Email, EmailValidationError, User};
pub use self::validation::{FieldError, FieldErrorReason, ValidationErrors};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("no access"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
