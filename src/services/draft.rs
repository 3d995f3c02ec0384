//! Pin draft — one image queued for pinning.
//!
//! DESIGN
//! ======
//! A draft is plain data plus a submission state machine. `PinDraft` is a
//! cheap-clone handle: the coordinator keeps one copy in its sequence and
//! hands others to callers, all sharing the same fields. Each draft guards
//! its own fields, so concurrent submissions of different drafts never
//! contend. The lock is never held across an await point.
//!
//! State machine:
//!
//! ```text
//! Draft ──► Submitting ──► Pinned
//!               │  ▲
//!               ▼  │ (retry)
//!             Failed
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::board::{BoardChoices, BoardOption};
use crate::events::{EventPublisher, SessionEvent};
use crate::image::ImageSource;
use crate::remote::types::{PinError, PinId, PinPayload, RemoteBoardSource};

// =============================================================================
// TYPES
// =============================================================================

/// Stable identity of a draft within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftId(Uuid);

impl DraftId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DraftId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionState {
    Draft,
    Submitting,
    Pinned,
    Failed,
}

/// Point-in-time copy of a draft's editable and UI-facing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSnapshot {
    pub id: DraftId,
    pub note: String,
    pub link: String,
    pub board_id: String,
    pub state: SubmissionState,
    pub pin_id: Option<PinId>,
    pub last_error: Option<PinError>,
    /// Set by the last failed validation pass, cleared once a note is entered.
    pub flagged_invalid: bool,
    pub tab_order: Option<u32>,
    pub board_options: Vec<BoardOption>,
}

#[derive(Debug)]
struct DraftFields {
    note: String,
    link: String,
    board_id: String,
    state: SubmissionState,
    pin_id: Option<PinId>,
    last_error: Option<PinError>,
    flagged_invalid: bool,
    tab_order: Option<u32>,
    board_options: Vec<BoardOption>,
}

// =============================================================================
// PIN DRAFT
// =============================================================================

#[derive(Debug, Clone)]
pub struct PinDraft {
    id: DraftId,
    image: Arc<ImageSource>,
    fields: Arc<Mutex<DraftFields>>,
    events: EventPublisher,
}

impl PinDraft {
    /// New draft seeded with `choices`; its board is the first selectable one.
    pub(crate) fn new(image: ImageSource, choices: &BoardChoices, events: EventPublisher) -> Self {
        let fields = DraftFields {
            note: String::new(),
            link: String::new(),
            board_id: choices.default_board_id().to_string(),
            state: SubmissionState::Draft,
            pin_id: None,
            last_error: None,
            flagged_invalid: false,
            tab_order: None,
            board_options: choices.draft_options.clone(),
        };
        Self { id: DraftId::new(), image: Arc::new(image), fields: Arc::new(Mutex::new(fields)), events }
    }

    fn lock(&self) -> MutexGuard<'_, DraftFields> {
        self.fields.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn id(&self) -> DraftId {
        self.id
    }

    #[must_use]
    pub fn image(&self) -> &ImageSource {
        &self.image
    }

    #[must_use]
    pub fn note(&self) -> String {
        self.lock().note.clone()
    }

    #[must_use]
    pub fn link(&self) -> String {
        self.lock().link.clone()
    }

    #[must_use]
    pub fn board_id(&self) -> String {
        self.lock().board_id.clone()
    }

    #[must_use]
    pub fn state(&self) -> SubmissionState {
        self.lock().state
    }

    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.state() == SubmissionState::Pinned
    }

    #[must_use]
    pub fn snapshot(&self) -> DraftSnapshot {
        let f = self.lock();
        DraftSnapshot {
            id: self.id,
            note: f.note.clone(),
            link: f.link.clone(),
            board_id: f.board_id.clone(),
            state: f.state,
            pin_id: f.pin_id.clone(),
            last_error: f.last_error.clone(),
            flagged_invalid: f.flagged_invalid,
            tab_order: f.tab_order,
            board_options: f.board_options.clone(),
        }
    }

    // -------------------------------------------------------------------------
    // Editing
    // -------------------------------------------------------------------------

    /// Replace the note. A non-empty note clears any invalid flag.
    pub fn set_note(&self, text: impl Into<String>) {
        let mut f = self.lock();
        f.note = text.into();
        if !f.note.is_empty() {
            f.flagged_invalid = false;
            f.tab_order = None;
        }
    }

    pub fn set_link(&self, url: impl Into<String>) {
        self.lock().link = url.into();
    }

    pub fn set_board(&self, board_id: impl Into<String>) {
        self.lock().board_id = board_id.into();
    }

    /// A draft is submittable once it has a note. No board is required.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.lock().note.is_empty()
    }

    // -------------------------------------------------------------------------
    // Coordinator hooks
    // -------------------------------------------------------------------------

    /// Swap in a new option list, falling back to the default board when the
    /// current selection disappeared.
    pub(crate) fn apply_choices(&self, choices: &BoardChoices) {
        let mut f = self.lock();
        f.board_options = choices.draft_options.clone();
        if !choices.contains(&f.board_id) {
            f.board_id = choices.default_board_id().to_string();
        }
    }

    pub(crate) fn flag_invalid(&self, tab_order: u32) {
        let mut f = self.lock();
        f.flagged_invalid = true;
        f.tab_order = Some(tab_order);
    }

    pub(crate) fn clear_invalid(&self) {
        let mut f = self.lock();
        f.flagged_invalid = false;
        f.tab_order = None;
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Create the pin on the remote.
    ///
    /// Transitions to `Submitting`, then to `Pinned` or `Failed`, publishing
    /// each transition. A `Failed` draft may be submitted again.
    ///
    /// # Errors
    ///
    /// Returns [`PinError::AlreadyPinned`] / [`PinError::AlreadySubmitting`]
    /// without touching the remote, or the remote's error after marking the
    /// draft `Failed`.
    pub async fn submit(&self, remote: &dyn RemoteBoardSource) -> Result<PinId, PinError> {
        let payload = self.begin_submit()?;
        self.publish_state(SubmissionState::Submitting);

        let result = remote.create_pin(&payload).await;

        let state = self.finish_submit(&result);
        match &result {
            Ok(pin_id) => info!(draft_id = %self.id, %pin_id, "draft: pinned"),
            Err(e) => warn!(draft_id = %self.id, error = %e, code = e.error_code(), "draft: pin failed"),
        }
        self.publish_state(state);
        result
    }

    fn begin_submit(&self) -> Result<PinPayload, PinError> {
        let mut f = self.lock();
        match f.state {
            SubmissionState::Pinned => return Err(PinError::AlreadyPinned(self.id)),
            SubmissionState::Submitting => return Err(PinError::AlreadySubmitting(self.id)),
            SubmissionState::Draft | SubmissionState::Failed => {}
        }
        f.state = SubmissionState::Submitting;
        f.last_error = None;

        let link = f.link.trim();
        Ok(PinPayload {
            image: Arc::clone(&self.image),
            note: f.note.clone(),
            link: (!link.is_empty()).then(|| link.to_string()),
            board_id: f.board_id.clone(),
        })
    }

    fn finish_submit(&self, result: &Result<PinId, PinError>) -> SubmissionState {
        let mut f = self.lock();
        match result {
            Ok(pin_id) => {
                f.state = SubmissionState::Pinned;
                f.pin_id = Some(pin_id.clone());
            }
            Err(e) => {
                f.state = SubmissionState::Failed;
                f.last_error = Some(e.clone());
            }
        }
        f.state
    }

    fn publish_state(&self, state: SubmissionState) {
        self.events.publish(SessionEvent::SubmissionChanged { draft_id: self.id, state });
    }
}

#[cfg(test)]
#[path = "draft_test.rs"]
mod tests;
