//! Session events — the notification stream a rendering layer subscribes to.
//!
//! DESIGN
//! ======
//! The coordinator and every draft publish into one unbounded channel.
//! Publishing never fails: a dropped receiver only means nobody is
//! rendering, which must not affect pinning.

use tokio::sync::mpsc;
use tracing::trace;

use crate::board::{BoardChoices, BoardOption};
use crate::remote::types::{PinError, PinId};
use crate::services::draft::{DraftId, SubmissionState};

/// Coarse lifecycle of a whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Empty,
    Populating,
    Ready,
    Validating,
    Submitting,
}

/// A draft that failed validation and where it sits in the tab order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDraft {
    pub draft_id: DraftId,
    /// Position in the session's draft sequence.
    pub index: usize,
    /// Sequential, starting at 1.
    pub tab_order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    PhaseChanged(SessionPhase),
    BoardsDistributed(BoardChoices),
    DraftCreated {
        draft_id: DraftId,
        index: usize,
        board_options: Vec<BoardOption>,
    },
    DraftsRemoved {
        draft_ids: Vec<DraftId>,
    },
    ValidationFailed {
        invalid: Vec<InvalidDraft>,
        /// The draft that receives input focus (tab order 1).
        focus: DraftId,
    },
    SubmissionChanged {
        draft_id: DraftId,
        state: SubmissionState,
    },
    /// Exactly one per dispatched draft.
    SubmissionFinished {
        draft_id: DraftId,
        outcome: Result<PinId, PinError>,
    },
}

pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Cloneable, infallible sending half of the event stream.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventPublisher {
    #[must_use]
    pub fn channel() -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn publish(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            trace!("session event dropped: no subscriber");
        }
    }
}
