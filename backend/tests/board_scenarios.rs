//! End-to-end board behaviour over the in-memory adapters.

use backend::domain::ports::{
    BoardCommand, BoardQuery, Command, MutationOutcome, SearchIndexError, UserRegistration,
};
use backend::domain::{
    Actor, Answer, AnswerDraft, Email, ErrorCode, Question, QuestionChanges, QuestionDraft,
    QuestionId, SearchQuery,
};
use backend::test_support::{TestBoard, fast_sync_config};
use futures_util::future::join_all;
use rstest::{fixture, rstest};

struct World {
    board: TestBoard,
    alice: Actor,
    bob: Actor,
}

#[fixture]
async fn world() -> World {
    let board = TestBoard::new();
    let alice = sign_up(&board, "alice@example.com").await;
    let bob = sign_up(&board, "bob@example.com").await;
    World { board, alice, bob }
}

async fn sign_up(board: &TestBoard, email: &str) -> Actor {
    let user = board
        .service
        .register(Email::new(email).expect("valid email"))
        .await
        .expect("registration succeeds");
    Actor::User(user.id)
}

impl World {
    async fn ask(&self, actor: Actor, title: &str, body: &str) -> Question {
        match self
            .board
            .service
            .perform(actor, Command::CreateQuestion(QuestionDraft::new(title, body)))
            .await
            .expect("question created")
        {
            MutationOutcome::Question(question) => question,
            other => panic!("expected a question, got {other:?}"),
        }
    }

    async fn answer(&self, actor: Actor, question_id: QuestionId, body: &str) -> Answer {
        let command = Command::CreateAnswer {
            question_id,
            draft: AnswerDraft::new(body),
        };
        match self
            .board
            .service
            .perform(actor, command)
            .await
            .expect("answer created")
        {
            MutationOutcome::Answer(answer) => answer,
            other => panic!("expected an answer, got {other:?}"),
        }
    }

    async fn best_flags(&self, answers: &[&Answer]) -> Vec<bool> {
        let mut flags = Vec::with_capacity(answers.len());
        for answer in answers {
            let current = self
                .board
                .service
                .find_answer(&Actor::Anonymous, &answer.id)
                .await
                .expect("answer exists");
            flags.push(current.the_best);
        }
        flags
    }

    async fn search_ids(&self, term: &str) -> Vec<QuestionId> {
        self.board.synchronizer.flush().await;
        self.board
            .service
            .search(&Actor::Anonymous, &SearchQuery::new(term))
            .await
            .expect("search succeeds")
            .hits()
            .map(|hit| hit.question_id)
            .collect()
    }
}

#[rstest]
#[tokio::test]
async fn author_creates_question(#[future] world: World) {
    let world = world.await;

    let question = world.ask(world.alice, "T", "B").await;

    assert_eq!(Some(question.author_id), world.alice.user_id());
    assert_eq!(question.title, "T");
}

#[rstest]
#[tokio::test]
async fn non_author_update_is_denied_and_changes_nothing(#[future] world: World) {
    let world = world.await;
    let question = world.ask(world.alice, "T", "B").await;

    let error = world
        .board
        .service
        .perform(
            world.bob,
            Command::UpdateQuestion {
                question_id: question.id,
                changes: QuestionChanges {
                    title: Some("Mine now".into()),
                    body: None,
                },
            },
        )
        .await
        .expect_err("update denied");

    assert_eq!(error.code(), ErrorCode::Forbidden);
    let thread = world
        .board
        .service
        .show_question(&Actor::Anonymous, &question.id)
        .await
        .expect("question still shown");
    assert_eq!(thread.question.title, "T");
    assert_eq!(thread.question.body, "B");
}

#[rstest]
#[tokio::test]
async fn best_answer_moves_exclusively(#[future] world: World) {
    let world = world.await;
    let question = world.ask(world.alice, "T", "B").await;
    let x = world.answer(world.bob, question.id, "X").await;
    let y = world.answer(world.bob, question.id, "Y").await;

    world
        .board
        .service
        .perform(world.alice, Command::SelectBest { answer_id: x.id })
        .await
        .expect("select X");
    assert_eq!(world.best_flags(&[&x, &y]).await, vec![true, false]);

    world
        .board
        .service
        .perform(world.alice, Command::SelectBest { answer_id: y.id })
        .await
        .expect("select Y");
    assert_eq!(world.best_flags(&[&x, &y]).await, vec![false, true]);
}

#[rstest]
#[tokio::test]
async fn non_author_selection_leaves_flags_unchanged(#[future] world: World) {
    let world = world.await;
    let question = world.ask(world.alice, "T", "B").await;
    let x = world.answer(world.bob, question.id, "X").await;
    let y = world.answer(world.bob, question.id, "Y").await;
    world
        .board
        .service
        .perform(world.alice, Command::SelectBest { answer_id: y.id })
        .await
        .expect("author selects Y");

    let error = world
        .board
        .service
        .perform(world.bob, Command::SelectBest { answer_id: x.id })
        .await
        .expect_err("selection denied");

    assert_eq!(error.code(), ErrorCode::Forbidden);
    assert_eq!(world.best_flags(&[&x, &y]).await, vec![false, true]);
}

#[rstest]
#[tokio::test]
async fn destroying_a_question_cascades_and_leaves_search(#[future] world: World) {
    let world = world.await;
    let question = world.ask(world.alice, "Lifetimes explained", "B").await;
    let x = world.answer(world.bob, question.id, "X").await;
    let y = world.answer(world.bob, question.id, "Y").await;
    assert_eq!(world.search_ids("lifetimes").await, vec![question.id]);

    let outcome = world
        .board
        .service
        .perform(
            world.alice,
            Command::DestroyQuestion {
                question_id: question.id,
            },
        )
        .await
        .expect("author destroys");

    assert_eq!(outcome, MutationOutcome::Destroyed);
    for answer in [&x, &y] {
        let error = world
            .board
            .service
            .find_answer(&Actor::Anonymous, &answer.id)
            .await
            .expect_err("answer gone");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
    assert!(world.search_ids("lifetimes").await.is_empty());
}

#[rstest]
#[tokio::test]
async fn edits_reach_the_index(#[future] world: World) {
    let world = world.await;
    let question = world.ask(world.alice, "Borrowing", "B").await;
    assert_eq!(world.search_ids("borrowing").await, vec![question.id]);

    world
        .board
        .service
        .perform(
            world.alice,
            Command::UpdateQuestion {
                question_id: question.id,
                changes: QuestionChanges {
                    title: Some("Pinning".into()),
                    body: None,
                },
            },
        )
        .await
        .expect("author edits");

    assert!(world.search_ids("borrowing").await.is_empty());
    assert_eq!(world.search_ids("pinning").await, vec![question.id]);
}

#[rstest]
#[tokio::test]
async fn failed_validation_writes_nothing(#[future] world: World) {
    let world = world.await;
    let question = world.ask(world.alice, "T", "B").await;

    let create = world
        .board
        .service
        .perform(world.alice, Command::CreateQuestion(QuestionDraft::new("", "B")))
        .await
        .expect_err("blank title rejected");
    let answer = world
        .board
        .service
        .perform(
            world.bob,
            Command::CreateAnswer {
                question_id: question.id,
                draft: AnswerDraft::new(" "),
            },
        )
        .await
        .expect_err("blank answer rejected");

    assert_eq!(create.code(), ErrorCode::InvalidRequest);
    assert_eq!(answer.code(), ErrorCode::InvalidRequest);
    let listed = world
        .board
        .service
        .list_questions(&Actor::Anonymous)
        .await
        .expect("list");
    assert_eq!(listed, vec![question.clone()]);
    let thread = world
        .board
        .service
        .show_question(&Actor::Anonymous, &question.id)
        .await
        .expect("thread");
    assert!(thread.answers.is_empty());
}

#[rstest]
#[tokio::test]
async fn index_outage_never_fails_a_mutation(#[future] world: World) {
    let world = world.await;
    let attempts = fast_sync_config().max_attempts;
    world
        .board
        .index
        .fail_next((0..attempts * 2).map(|_| SearchIndexError::unavailable("engine down")));

    let question = world.ask(world.alice, "Offline index", "B").await;
    let outcome = world
        .board
        .service
        .perform(
            world.alice,
            Command::UpdateQuestion {
                question_id: question.id,
                changes: QuestionChanges {
                    title: None,
                    body: Some("Edited while the index is down".into()),
                },
            },
        )
        .await
        .expect("update succeeds despite the outage");

    assert!(matches!(outcome, MutationOutcome::Question(_)));
    let stored = world
        .board
        .service
        .store()
        .find_question(&question.id)
        .await
        .expect("question committed");
    assert_eq!(stored.body, "Edited while the index is down");
    world.board.synchronizer.flush().await;
    let stale = world.board.synchronizer.stale_entries();
    assert!(stale.iter().any(|entry| entry.question_id == question.id));
}

#[rstest]
#[tokio::test]
async fn concurrent_sign_ups_share_one_user() {
    let board = TestBoard::new();

    let users = join_all((0..4).map(|_| {
        board
            .service
            .register(Email::new("race@example.com").expect("valid email"))
    }))
    .await;

    let ids = users
        .into_iter()
        .map(|user| user.expect("registration succeeds").id)
        .collect::<Vec<_>>();
    assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
}
