use super::*;
use crate::board::{Board, NO_BOARD_ID};
use crate::events::EventReceiver;
use crate::services::test_helpers::{MockRemote, image};
use tokio::time::{Duration, timeout};

fn choices() -> BoardChoices {
    BoardChoices::from_boards(&[Board::new("1", "A"), Board::new("2", "B")])
}

fn draft_with(choices: &BoardChoices) -> (PinDraft, EventReceiver) {
    let (events, rx) = EventPublisher::channel();
    (PinDraft::new(image("a.png"), choices, events), rx)
}

fn drain_states(rx: &mut EventReceiver) -> Vec<SubmissionState> {
    let mut states = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let SessionEvent::SubmissionChanged { state, .. } = event {
            states.push(state);
        }
    }
    states
}

// =============================================================================
// construction
// =============================================================================

#[test]
fn new_draft_defaults_to_first_board() {
    let (draft, _rx) = draft_with(&choices());
    let snap = draft.snapshot();
    assert_eq!(snap.board_id, "1");
    assert_eq!(snap.state, SubmissionState::Draft);
    assert_eq!(snap.board_options.len(), 2);
    assert!(snap.note.is_empty());
    assert!(snap.link.is_empty());
}

#[test]
fn new_draft_without_boards_has_no_board() {
    let (draft, _rx) = draft_with(&BoardChoices::default());
    assert_eq!(draft.board_id(), NO_BOARD_ID);
}

#[test]
fn clones_share_state() {
    let (draft, _rx) = draft_with(&choices());
    let other = draft.clone();
    other.set_note("shared");
    assert_eq!(draft.note(), "shared");
    assert_eq!(draft.id(), other.id());
}

// =============================================================================
// editing / validity
// =============================================================================

#[test]
fn empty_note_is_invalid() {
    let (draft, _rx) = draft_with(&choices());
    assert!(!draft.is_valid());
    draft.set_note("x");
    assert!(draft.is_valid());
}

#[test]
fn valid_without_board() {
    // No board selection is required to pass validation.
    let (draft, _rx) = draft_with(&BoardChoices::from_boards(&[]));
    draft.set_note("note");
    assert_eq!(draft.board_id(), NO_BOARD_ID);
    assert!(draft.is_valid());
}

#[test]
fn entering_note_clears_invalid_flag() {
    let (draft, _rx) = draft_with(&choices());
    draft.flag_invalid(3);
    assert!(draft.snapshot().flagged_invalid);
    assert_eq!(draft.snapshot().tab_order, Some(3));

    draft.set_note("");
    assert!(draft.snapshot().flagged_invalid);

    draft.set_note("now valid");
    let snap = draft.snapshot();
    assert!(!snap.flagged_invalid);
    assert_eq!(snap.tab_order, None);
}

#[test]
fn setters_store_values_verbatim() {
    let (draft, _rx) = draft_with(&choices());
    draft.set_link("https://example.com");
    draft.set_board("2");
    assert_eq!(draft.link(), "https://example.com");
    assert_eq!(draft.board_id(), "2");
}

// =============================================================================
// apply_choices
// =============================================================================

#[test]
fn apply_choices_keeps_surviving_selection() {
    let (draft, _rx) = draft_with(&choices());
    draft.set_board("2");
    draft.apply_choices(&BoardChoices::from_boards(&[Board::new("3", "C"), Board::new("2", "B")]));
    assert_eq!(draft.board_id(), "2");
    assert_eq!(draft.snapshot().board_options.len(), 2);
}

#[test]
fn apply_choices_resets_vanished_selection() {
    let (draft, _rx) = draft_with(&choices());
    draft.set_board("2");
    draft.apply_choices(&BoardChoices::from_boards(&[Board::new("3", "C")]));
    assert_eq!(draft.board_id(), "3");

    draft.apply_choices(&BoardChoices::from_boards(&[]));
    assert_eq!(draft.board_id(), NO_BOARD_ID);
    assert!(!draft.snapshot().board_options[0].enabled);
}

// =============================================================================
// submit
// =============================================================================

#[tokio::test]
async fn submit_success_pins_and_publishes_transitions() {
    let remote = MockRemote::new(vec![]);
    let (draft, mut rx) = draft_with(&choices());
    draft.set_note("cat");
    draft.set_link("  ");

    let pin = draft.submit(&remote).await.unwrap();

    assert_eq!(pin, PinId("pin-1".into()));
    assert_eq!(draft.state(), SubmissionState::Pinned);
    assert_eq!(draft.snapshot().pin_id, Some(pin));
    assert_eq!(drain_states(&mut rx), vec![SubmissionState::Submitting, SubmissionState::Pinned]);

    let created = remote.created.lock().unwrap();
    assert_eq!(created[0].note, "cat");
    assert_eq!(created[0].board_id, "1");
    assert!(created[0].link.is_none());
}

#[tokio::test]
async fn submit_failure_marks_failed_and_propagates() {
    let remote = MockRemote::new(vec![]);
    remote.fail_image("a.png", PinError::Validation { status: 400, body: "bad link".into() });
    let (draft, mut rx) = draft_with(&choices());
    draft.set_note("cat");

    let err = draft.submit(&remote).await.unwrap_err();

    assert!(matches!(err, PinError::Validation { status: 400, .. }));
    assert_eq!(draft.state(), SubmissionState::Failed);
    assert_eq!(draft.snapshot().last_error, Some(err));
    assert_eq!(drain_states(&mut rx), vec![SubmissionState::Submitting, SubmissionState::Failed]);
}

#[tokio::test]
async fn failed_draft_can_be_retried() {
    let remote = MockRemote::new(vec![]);
    remote.fail_image("a.png", PinError::Network("down".into()));
    let (draft, _rx) = draft_with(&choices());
    draft.set_note("cat");
    assert!(draft.submit(&remote).await.is_err());

    let healthy = MockRemote::new(vec![]);
    draft.submit(&healthy).await.unwrap();
    assert_eq!(draft.state(), SubmissionState::Pinned);
    assert!(draft.snapshot().last_error.is_none());
}

#[tokio::test]
async fn pinned_draft_rejects_resubmission_without_remote_call() {
    let remote = MockRemote::new(vec![]);
    let (draft, mut rx) = draft_with(&choices());
    draft.set_note("cat");
    draft.submit(&remote).await.unwrap();
    drain_states(&mut rx);

    let err = draft.submit(&remote).await.unwrap_err();

    assert_eq!(err, PinError::AlreadyPinned(draft.id()));
    assert_eq!(remote.created.lock().unwrap().len(), 1);
    assert_eq!(draft.state(), SubmissionState::Pinned);
    assert!(drain_states(&mut rx).is_empty());
}

#[tokio::test]
async fn in_flight_draft_rejects_second_submit() {
    let remote = std::sync::Arc::new(MockRemote::gated(vec![]));
    let (draft, _rx) = draft_with(&choices());
    draft.set_note("cat");

    let first = {
        let draft = draft.clone();
        let remote = std::sync::Arc::clone(&remote);
        tokio::spawn(async move { draft.submit(remote.as_ref()).await })
    };
    while draft.state() != SubmissionState::Submitting {
        tokio::task::yield_now().await;
    }

    let err = draft.submit(remote.as_ref()).await.unwrap_err();
    assert_eq!(err, PinError::AlreadySubmitting(draft.id()));

    remote.release(1);
    let pinned = timeout(Duration::from_millis(500), first)
        .await
        .expect("submit timed out")
        .expect("task panicked");
    assert!(pinned.is_ok());
    assert_eq!(remote.created.lock().unwrap().len(), 1);
}
