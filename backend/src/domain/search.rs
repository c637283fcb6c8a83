//! Search projection and query types.
//!
//! The index holds one [`SearchIndexEntry`] per question. It is derived data:
//! authorization and mutation decisions always read the entity store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Email, Question, QuestionId, UserId};

/// Denormalized projection of a question for full-text search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndexEntry {
    /// Projected question.
    pub question_id: QuestionId,
    /// Indexed title text.
    pub title: String,
    /// Indexed body text.
    pub body: String,
    /// Indexed author email.
    pub author_email: String,
    /// Filterable owner attribute.
    pub owner_id: UserId,
    /// Filterable creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Filterable update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl SearchIndexEntry {
    /// Project a stored question and its author's email.
    pub fn project(question: &Question, author_email: &Email) -> Self {
        Self {
            question_id: question.id,
            title: question.title.clone(),
            body: question.body.clone(),
            author_email: author_email.as_ref().to_owned(),
            owner_id: question.author_id,
            created_at: question.created_at,
            updated_at: question.updated_at,
        }
    }
}

/// Full-text query with optional attribute filters.
///
/// A blank term matches every entry that passes the filters.
///
/// # Examples
/// ```
/// use backend::domain::SearchQuery;
///
/// let query = SearchQuery::new("borrow checker");
/// assert_eq!(query.term(), "borrow checker");
/// assert!(query.owner_id.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    term: String,
    /// Only entries owned by this user.
    pub owner_id: Option<UserId>,
    /// Only entries created strictly after this instant.
    pub created_after: Option<DateTime<Utc>>,
    /// Only entries updated strictly after this instant.
    pub updated_after: Option<DateTime<Utc>>,
}

impl SearchQuery {
    /// Query for `term` without filters.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    /// Restrict results to one owner.
    #[must_use]
    pub fn owned_by(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Restrict results to entries created after `instant`.
    #[must_use]
    pub fn created_after(mut self, instant: DateTime<Utc>) -> Self {
        self.created_after = Some(instant);
        self
    }

    /// Restrict results to entries updated after `instant`.
    #[must_use]
    pub fn updated_after(mut self, instant: DateTime<Utc>) -> Self {
        self.updated_after = Some(instant);
        self
    }

    /// The raw search term.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Whether `entry` satisfies the attribute filters.
    pub fn admits(&self, entry: &SearchIndexEntry) -> bool {
        self.owner_id.is_none_or(|owner| owner == entry.owner_id)
            && self.created_after.is_none_or(|at| entry.created_at > at)
            && self.updated_after.is_none_or(|at| entry.updated_at > at)
    }
}

/// One ranked match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    /// Matching question.
    pub question_id: QuestionId,
    /// Relevance score; higher ranks first.
    pub score: f64,
}

/// Ranked question ids produced by one execution of a query.
///
/// Results hold no cursor into the index. Running the query again
/// re-executes it against the current index contents.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    hits: std::vec::IntoIter<SearchHit>,
}

impl SearchResults {
    /// Wrap hits, ordering them by descending score.
    pub fn ranked(mut hits: Vec<SearchHit>) -> Self {
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        Self {
            hits: hits.into_iter(),
        }
    }

    /// Remaining hits with their scores.
    pub fn hits(self) -> impl Iterator<Item = SearchHit> {
        self.hits
    }
}

impl Iterator for SearchResults {
    type Item = QuestionId;

    fn next(&mut self) -> Option<Self::Item> {
        self.hits.next().map(|hit| hit.question_id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.hits.size_hint()
    }
}
