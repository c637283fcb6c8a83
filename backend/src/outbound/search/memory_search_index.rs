//! In-memory full-text index.
//!
//! Entries are tokenized on write. A query matches an entry when every query
//! token appears in its title, body, or author email; the score sums token
//! frequencies with title hits weighted double.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{SearchIndex, SearchIndexError};
use crate::domain::{QuestionId, SearchHit, SearchIndexEntry, SearchQuery};

const TITLE_WEIGHT: f64 = 2.0;

#[derive(Debug, Clone)]
struct IndexedEntry {
    entry: SearchIndexEntry,
    title: HashMap<String, u32>,
    text: HashMap<String, u32>,
}

impl IndexedEntry {
    fn new(entry: SearchIndexEntry) -> Self {
        let title = frequencies(&entry.title);
        let mut text = frequencies(&entry.body);
        for (token, count) in frequencies(&entry.author_email) {
            *text.entry(token).or_default() += count;
        }
        Self { entry, title, text }
    }

    fn score(&self, tokens: &[String]) -> Option<f64> {
        tokens.iter().try_fold(0.0, |score, token| {
            let in_title = self.title.get(token).copied().unwrap_or(0);
            let in_text = self.text.get(token).copied().unwrap_or(0);
            (in_title + in_text > 0)
                .then(|| score + f64::from(in_title) * TITLE_WEIGHT + f64::from(in_text))
        })
    }
}

/// Split `text` into lowercase alphanumeric tokens.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn frequencies(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_default() += 1;
    }
    counts
}

/// Search index held in process memory.
///
/// # Examples
/// ```
/// use backend::domain::ports::SearchIndex;
/// use backend::domain::SearchQuery;
/// use backend::outbound::search::InMemorySearchIndex;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let index = InMemorySearchIndex::default();
/// let hits = index.query(&SearchQuery::new("rust")).await.expect("query");
/// assert!(hits.is_empty());
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemorySearchIndex {
    entries: RwLock<HashMap<QuestionId, IndexedEntry>>,
}

impl InMemorySearchIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed questions.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the index holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    #[cfg(test)]
    pub(crate) async fn entry(&self, question_id: &QuestionId) -> Option<SearchIndexEntry> {
        self.entries
            .read()
            .await
            .get(question_id)
            .map(|indexed| indexed.entry.clone())
    }
}

#[async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn upsert(&self, entry: &SearchIndexEntry) -> Result<(), SearchIndexError> {
        let indexed = IndexedEntry::new(entry.clone());
        self.entries.write().await.insert(entry.question_id, indexed);
        Ok(())
    }

    async fn remove(&self, question_id: &QuestionId) -> Result<(), SearchIndexError> {
        self.entries.write().await.remove(question_id);
        Ok(())
    }

    async fn query(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, SearchIndexError> {
        let tokens = tokenize(query.term());
        let entries = self.entries.read().await;
        let mut candidates = entries
            .values()
            .filter(|indexed| query.admits(&indexed.entry))
            .collect::<Vec<_>>();
        // Newest first so equal scores keep a useful order.
        candidates.sort_by(|a, b| b.entry.updated_at.cmp(&a.entry.updated_at));

        Ok(candidates
            .into_iter()
            .filter_map(|indexed| {
                indexed.score(&tokens).map(|score| SearchHit {
                    question_id: indexed.entry.question_id,
                    score,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use chrono::{DateTime, TimeDelta, Utc};
    use rstest::rstest;

    fn entry(title: &str, body: &str, email: &str, minutes: i64) -> SearchIndexEntry {
        let at = DateTime::<Utc>::UNIX_EPOCH + TimeDelta::minutes(minutes);
        SearchIndexEntry {
            question_id: QuestionId::random(),
            title: title.to_owned(),
            body: body.to_owned(),
            author_email: email.to_owned(),
            owner_id: UserId::random(),
            created_at: at,
            updated_at: at,
        }
    }

    async fn ids(index: &InMemorySearchIndex, query: SearchQuery) -> Vec<QuestionId> {
        let mut hits = index.query(&query).await.expect("query");
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.into_iter().map(|hit| hit.question_id).collect()
    }

    #[rstest]
    #[case("Borrow-checker woes!", vec!["borrow", "checker", "woes"])]
    #[case("ann@example.com", vec!["ann", "example", "com"])]
    #[case("  ", vec![])]
    fn tokenizer_splits_on_punctuation(#[case] text: &str, #[case] expected: Vec<&str>) {
        assert_eq!(tokenize(text), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn title_matches_outrank_body_matches() {
        let index = InMemorySearchIndex::new();
        let in_body = entry("Help", "tokio runtime panics", "a@x.io", 1);
        let in_title = entry("Tokio question", "help", "b@x.io", 0);
        index.upsert(&in_body).await.expect("upsert");
        index.upsert(&in_title).await.expect("upsert");

        let found = ids(&index, SearchQuery::new("tokio")).await;

        assert_eq!(found, vec![in_title.question_id, in_body.question_id]);
    }

    #[rstest]
    #[tokio::test]
    async fn every_token_must_match() {
        let index = InMemorySearchIndex::new();
        let both = entry("Async traits", "with tokio", "a@x.io", 0);
        let one = entry("Async closures", "nightly", "a@x.io", 0);
        index.upsert(&both).await.expect("upsert");
        index.upsert(&one).await.expect("upsert");

        assert_eq!(
            ids(&index, SearchQuery::new("async tokio")).await,
            vec![both.question_id]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn author_email_is_searchable_and_owner_filter_applies() {
        let index = InMemorySearchIndex::new();
        let mine = entry("T", "B", "ann@example.com", 0);
        index.upsert(&mine).await.expect("upsert");

        assert_eq!(
            ids(&index, SearchQuery::new("ann@example.com")).await,
            vec![mine.question_id]
        );
        assert!(
            ids(&index, SearchQuery::new("ann").owned_by(UserId::random()))
                .await
                .is_empty()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn upsert_replaces_and_remove_forgets() {
        let index = InMemorySearchIndex::new();
        let mut original = entry("Old title", "B", "a@x.io", 0);
        index.upsert(&original).await.expect("upsert");
        original.title = "New title".to_owned();
        index.upsert(&original).await.expect("upsert");

        assert!(ids(&index, SearchQuery::new("old")).await.is_empty());
        assert_eq!(index.len().await, 1);

        index.remove(&original.question_id).await.expect("remove");
        index.remove(&original.question_id).await.expect("idempotent remove");
        assert!(index.is_empty().await);
    }

    #[rstest]
    #[tokio::test]
    async fn blank_term_lists_admitted_entries_newest_first() {
        let index = InMemorySearchIndex::new();
        let older = entry("A", "B", "a@x.io", 0);
        let newer = entry("C", "D", "a@x.io", 5);
        index.upsert(&older).await.expect("upsert");
        index.upsert(&newer).await.expect("upsert");

        let hits = index.query(&SearchQuery::new("")).await.expect("query");
        let found = hits.into_iter().map(|hit| hit.question_id).collect::<Vec<_>>();

        assert_eq!(found, vec![newer.question_id, older.question_id]);
    }
}
