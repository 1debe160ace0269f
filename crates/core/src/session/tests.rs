use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use converse_model::Message;
use converse_test_model::{
    FREE_TIER_REQUESTS, PresetOutcome, PresetResponse, TestCompletionProvider,
};
use tokio::time::timeout;

use crate::collaborator::{Notifier, UpgradePrompt};
use crate::{
    EMPTY_PROMPT_MESSAGE, GENERIC_FAILURE_MESSAGE, Session, SessionBuilder,
    SessionSnapshot, SubmissionError, SubmissionState,
};

#[derive(Default)]
struct Recorder {
    upgrade_opened: AtomicUsize,
    errors: Mutex<Vec<String>>,
}

impl Recorder {
    fn upgrade_opened(&self) -> usize {
        self.upgrade_opened.load(Ordering::SeqCst)
    }

    fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl UpgradePrompt for Recorder {
    fn open(&self) {
        self.upgrade_opened.fetch_add(1, Ordering::SeqCst);
    }

    fn close(&self) {}
}

impl Notifier for Recorder {
    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_owned());
    }
}

fn build_session(
    provider: TestCompletionProvider,
) -> (Session, Arc<Recorder>, Arc<Mutex<Vec<SessionSnapshot>>>) {
    let recorder = Arc::new(Recorder::default());
    let changes = Arc::new(Mutex::new(Vec::new()));
    let session = SessionBuilder::with_completion_provider(provider)
        .with_upgrade_prompt(recorder.clone())
        .with_notifier(recorder.clone())
        .on_change({
            let changes = Arc::clone(&changes);
            move |snapshot| {
                changes.lock().unwrap().push(snapshot.clone());
            }
        })
        .build();
    (session, recorder, changes)
}

#[tokio::test]
async fn test_simple_turn() {
    let mut provider = TestCompletionProvider::default();
    provider.add_reply("Hi!");
    let (session, recorder, _) = build_session(provider);

    session.submit("Hello").await.unwrap();

    let snapshot = session.snapshot();
    assert_eq!(
        snapshot.conversation().messages(),
        &[Message::user("Hello"), Message::assistant("Hi!")]
    );
    assert_eq!(snapshot.state(), SubmissionState::Idle);
    assert_eq!(recorder.upgrade_opened(), 0);
    assert!(recorder.errors().is_empty());
}

#[tokio::test]
async fn test_request_carries_history() {
    let mut provider = TestCompletionProvider::default();
    provider.add_reply("Hi!");
    provider.add_reply("Still here.");
    let (session, _, _) = build_session(provider.clone());

    session.submit("Hello").await.unwrap();
    session.submit("Are you there?").await.unwrap();

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].messages, vec![Message::user("Hello")]);
    assert_eq!(
        requests[1].messages,
        vec![
            Message::user("Hello"),
            Message::assistant("Hi!"),
            Message::user("Are you there?"),
        ]
    );
    assert_eq!(session.snapshot().conversation().len(), 4);
}

#[tokio::test]
async fn test_empty_prompt() {
    let mut provider = TestCompletionProvider::default();
    provider.add_reply("Hi!");
    let (session, recorder, changes) = build_session(provider.clone());

    let err = session.submit("").await.unwrap_err();
    assert!(matches!(err, SubmissionError::EmptyPrompt));
    assert!(err.is_local());
    assert_eq!(provider.call_count(), 0);

    let snapshot = session.snapshot();
    assert!(snapshot.conversation().is_empty());
    assert_eq!(snapshot.prompt_error(), Some(EMPTY_PROMPT_MESSAGE));
    assert_eq!(snapshot.state(), SubmissionState::Idle);
    assert!(recorder.errors().is_empty());

    // Only the field feedback changed; nothing was ever submitting.
    let changes = changes.lock().unwrap().clone();
    assert_eq!(changes.len(), 1);
    assert!(!changes[0].is_submitting());

    // The feedback goes away with the next accepted submission.
    session.submit("Hello").await.unwrap();
    assert_eq!(session.snapshot().prompt_error(), None);
}

#[tokio::test]
async fn test_quota_denial() {
    let mut provider = TestCompletionProvider::default();
    provider.add_response(PresetResponse::with_outcome(
        PresetOutcome::QuotaExceeded,
    ));
    let (session, recorder, _) = build_session(provider.clone());

    let err = session.submit("Hello").await.unwrap_err();
    assert!(matches!(err, SubmissionError::QuotaExceeded(_)));
    assert!(!err.is_local());
    assert_eq!(provider.call_count(), 1);
    assert_eq!(recorder.upgrade_opened(), 1);
    assert!(recorder.errors().is_empty());

    let snapshot = session.snapshot();
    assert!(snapshot.conversation().is_empty());
    assert_eq!(snapshot.state(), SubmissionState::Idle);
}

#[tokio::test]
async fn test_generic_failure() {
    let mut provider = TestCompletionProvider::default();
    provider.add_reply("Hi!");
    provider.add_response(PresetResponse::with_outcome(
        PresetOutcome::ServerError,
    ));
    let (session, recorder, _) = build_session(provider);

    session.submit("Hello").await.unwrap();
    let before = session.snapshot().conversation().clone();

    let err = session.submit("Again").await.unwrap_err();
    assert!(matches!(err, SubmissionError::Transport(_)));
    assert_eq!(recorder.errors(), vec![GENERIC_FAILURE_MESSAGE.to_owned()]);
    assert_eq!(recorder.upgrade_opened(), 0);
    assert_eq!(session.snapshot().conversation(), &before);
    assert_eq!(session.snapshot().state(), SubmissionState::Idle);
}

#[tokio::test]
async fn test_no_retry() {
    let mut provider = TestCompletionProvider::default();
    provider.add_response(PresetResponse::with_reply("Hi!").with_failures(1));
    let (session, _, _) = build_session(provider.clone());

    assert!(session.submit("Hello").await.is_err());
    assert_eq!(provider.call_count(), 1);

    // The user trying again is a new submission.
    session.submit("Hello").await.unwrap();
    assert_eq!(provider.call_count(), 2);
    assert_eq!(session.snapshot().conversation().len(), 2);
}

#[test]
fn test_each_change_reported_once_across_threads() {
    const EDITS: usize = 200;

    let (session, _, changes) =
        build_session(TestCompletionProvider::default());
    std::thread::scope(|scope| {
        for writer in ["a", "b"] {
            let session = session.clone();
            scope.spawn(move || {
                for idx in 0..EDITS {
                    assert!(session.set_draft(format!("{writer}{idx}")));
                }
            });
        }
    });

    let mut drafts: Vec<_> = changes
        .lock()
        .unwrap()
        .iter()
        .map(|s| s.draft().to_owned())
        .collect();
    assert_eq!(drafts.len(), 2 * EDITS);
    drafts.sort();
    drafts.dedup();
    assert_eq!(drafts.len(), 2 * EDITS);
}

#[tokio::test]
async fn test_transitions_are_atomic() {
    let mut provider = TestCompletionProvider::default();
    provider.add_reply("Hi!");
    provider.add_response(PresetResponse::with_outcome(
        PresetOutcome::ServerError,
    ));
    let (session, _, changes) = build_session(provider);

    session.submit("Hello").await.unwrap();
    let _ = session.submit("Again").await;

    let changes = changes.lock().unwrap().clone();
    let states: Vec<_> = changes.iter().map(|s| s.state()).collect();
    assert_eq!(
        states,
        vec![
            SubmissionState::Submitting,
            SubmissionState::Idle,
            SubmissionState::Submitting,
            SubmissionState::Idle,
        ]
    );
    // History grows by whole turns only.
    let lengths: Vec<_> =
        changes.iter().map(|s| s.conversation().len()).collect();
    assert_eq!(lengths, vec![0, 2, 2, 2]);
}

#[tokio::test]
async fn test_one_submission_at_a_time() {
    let mut provider = TestCompletionProvider::default();
    provider.add_reply("Hi!");
    provider.set_delay(Duration::from_millis(20));
    let (session, _, _) = build_session(provider.clone());

    let (first, second) =
        tokio::join!(session.submit("Hello"), session.submit("Hello again"));
    first.unwrap();
    assert!(matches!(second, Err(SubmissionError::Busy)));
    assert_eq!(provider.call_count(), 1);
    assert_eq!(session.snapshot().conversation().len(), 2);
}

#[tokio::test]
async fn test_draft() {
    let mut provider = TestCompletionProvider::default();
    provider.add_reply("Hi!");
    provider.add_response(PresetResponse::with_outcome(
        PresetOutcome::ServerError,
    ));
    provider.set_delay(Duration::from_millis(20));
    let (session, _, _) = build_session(provider);

    assert!(session.set_draft("Hello"));
    let (result, accepted) = tokio::join!(session.submit_draft(), async {
        // The input is disabled while the request is in flight.
        session.set_draft("typing ahead")
    });
    result.unwrap();
    assert!(!accepted);
    assert_eq!(session.snapshot().draft(), "");

    // A failed submission keeps what the user typed.
    assert!(session.set_draft("Again"));
    assert!(session.submit_draft().await.is_err());
    assert_eq!(session.snapshot().draft(), "Again");
}

#[tokio::test]
async fn test_empty_draft() {
    let provider = TestCompletionProvider::default();
    let (session, _, _) = build_session(provider.clone());

    let err = session.submit_draft().await.unwrap_err();
    assert!(matches!(err, SubmissionError::EmptyPrompt));
    assert_eq!(provider.call_count(), 0);

    // Editing the field clears the feedback.
    session.set_draft("H");
    assert_eq!(session.snapshot().prompt_error(), None);
}

#[tokio::test(start_paused = true)]
async fn test_timeout() {
    let mut provider = TestCompletionProvider::default();
    provider.add_reply("Too late");
    provider.set_delay(Duration::from_secs(30));
    let recorder = Arc::new(Recorder::default());
    let session = SessionBuilder::with_completion_provider(provider)
        .with_notifier(recorder.clone())
        .with_request_timeout(Duration::from_secs(5))
        .build();

    let err = session.submit("Hello").await.unwrap_err();
    assert!(matches!(err, SubmissionError::Transport(_)));
    assert!(err.to_string().contains("5s"));
    assert_eq!(recorder.errors(), vec![GENERIC_FAILURE_MESSAGE.to_owned()]);
    assert!(session.snapshot().conversation().is_empty());
    assert_eq!(session.snapshot().state(), SubmissionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_submission() {
    let mut provider = TestCompletionProvider::default();
    provider.add_reply("Hi!");
    provider.set_delay(Duration::from_secs(30));
    let (session, recorder, _) = build_session(provider);

    let mut rx = session.subscribe();
    let abandoned =
        timeout(Duration::from_secs(1), session.submit("Hello")).await;
    assert!(abandoned.is_err());

    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.state(), SubmissionState::Idle);
    assert!(snapshot.conversation().is_empty());
    // Nothing failed from the user's point of view.
    assert!(recorder.errors().is_empty());
}

#[tokio::test]
async fn test_free_tier_runs_out() {
    let mut provider = TestCompletionProvider::default();
    for idx in 0..=FREE_TIER_REQUESTS {
        provider.add_reply(format!("Answer #{idx}"));
    }
    provider.set_quota(FREE_TIER_REQUESTS);
    let (session, recorder, _) = build_session(provider);

    for idx in 0..FREE_TIER_REQUESTS {
        session.submit(format!("Question #{idx}")).await.unwrap();
    }
    let err = session.submit("One more").await.unwrap_err();
    assert!(matches!(err, SubmissionError::QuotaExceeded(_)));
    assert_eq!(recorder.upgrade_opened(), 1);
    assert_eq!(
        session.snapshot().conversation().len(),
        2 * FREE_TIER_REQUESTS as usize
    );
}

#[tokio::test]
async fn test_reset() {
    let mut provider = TestCompletionProvider::default();
    provider.add_reply("Hi!");
    provider.add_reply("Hello again!");
    let (session, _, _) = build_session(provider.clone());

    session.submit("Hello").await.unwrap();
    assert!(session.reset());
    assert_eq!(session.snapshot(), SessionSnapshot::default());

    // The next request starts a fresh history.
    session.submit("Hello").await.unwrap();
    assert_eq!(provider.requests()[1].messages, vec![Message::user("Hello")]);
}

#[tokio::test]
async fn test_subscribe() {
    let mut provider = TestCompletionProvider::default();
    provider.add_reply("Hi!");
    let (session, _, _) = build_session(provider);

    let mut rx = session.subscribe();
    let watcher = tokio::spawn(async move {
        let snapshot =
            rx.wait_for(|s| s.conversation().len() == 2).await.unwrap().clone();
        snapshot
    });

    session.submit("Hello").await.unwrap();
    let snapshot = timeout(Duration::from_millis(500), watcher)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.state(), SubmissionState::Idle);
    assert_eq!(
        snapshot.conversation().messages()[1],
        Message::assistant("Hi!")
    );
}
