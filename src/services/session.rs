//! Session coordinator — batch lifecycle for one image selection.
//!
//! DESIGN
//! ======
//! The coordinator owns the ordered draft sequence (selection order, stable
//! for UI indexing), the latest board snapshot, and the choices template
//! every future draft is seeded from. All UI-facing changes go out on the
//! event channel returned by `new`.
//!
//! Board loading takes `&self` so two loads may race; whichever result is
//! passed to `distribute_boards` last wins. There is no de-duplication and
//! no cancellation.
//!
//! ERROR HANDLING
//! ==============
//! `load_boards` failures go straight back to the caller and leave the cache
//! alone. Submission is fire-and-forget: each draft runs on its own task,
//! its failure lands in its own state and in one `SubmissionFinished`
//! event, and nothing escapes `submit_all`.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::board::{Board, BoardChoices, NO_BOARD_ID};
use crate::cache::BoardCache;
use crate::events::{EventPublisher, EventReceiver, InvalidDraft, SessionEvent, SessionPhase};
use crate::image::ImageSource;
use crate::remote::types::{PinError, RemoteBoardSource};

use super::draft::{DraftId, PinDraft, SubmissionState};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("submission disabled: no boards to pin to")]
    SubmissionDisabled,
    #[error("{count} draft(s) need a note before sending")]
    InvalidDrafts { count: usize },
}

impl SessionError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SubmissionDisabled => "E_SUBMISSION_DISABLED",
            Self::InvalidDrafts { .. } => "E_INVALID_DRAFTS",
        }
    }
}

// =============================================================================
// COORDINATOR
// =============================================================================

pub struct SessionCoordinator {
    cache: Arc<dyn BoardCache>,
    remote: Arc<dyn RemoteBoardSource>,
    drafts: Vec<PinDraft>,
    /// `None` until the first distribution.
    boards: Option<Vec<Board>>,
    choices: BoardChoices,
    focused: Option<DraftId>,
    phase: SessionPhase,
    events: EventPublisher,
}

impl SessionCoordinator {
    /// Empty session plus the receiving end of its event stream.
    #[must_use]
    pub fn new(cache: Arc<dyn BoardCache>, remote: Arc<dyn RemoteBoardSource>) -> (Self, EventReceiver) {
        let (events, rx) = EventPublisher::channel();
        let coordinator = Self {
            cache,
            remote,
            drafts: Vec::new(),
            boards: None,
            choices: BoardChoices::default(),
            focused: None,
            phase: SessionPhase::Empty,
            events,
        };
        (coordinator, rx)
    }

    #[must_use]
    pub fn drafts(&self) -> &[PinDraft] {
        &self.drafts
    }

    #[must_use]
    pub fn draft(&self, id: DraftId) -> Option<&PinDraft> {
        self.drafts.iter().find(|d| d.id() == id)
    }

    #[must_use]
    pub fn boards(&self) -> Option<&[Board]> {
        self.boards.as_deref()
    }

    #[must_use]
    pub fn choices(&self) -> &BoardChoices {
        &self.choices
    }

    #[must_use]
    pub fn submission_enabled(&self) -> bool {
        self.choices.submission_enabled
    }

    /// Draft holding input focus after the last failed validation. Cleared
    /// once `send` gets past validation.
    #[must_use]
    pub fn focused(&self) -> Option<DraftId> {
        self.focused
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            self.phase = phase;
            self.events.publish(SessionEvent::PhaseChanged(phase));
        }
    }

    fn resting_phase(&self) -> SessionPhase {
        if self.drafts.is_empty() && self.boards.is_none() {
            SessionPhase::Empty
        } else {
            SessionPhase::Ready
        }
    }

    // -------------------------------------------------------------------------
    // Boards
    // -------------------------------------------------------------------------

    /// Cached boards unless `force_reload`, otherwise a fresh fetch that is
    /// written back to the cache.
    ///
    /// # Errors
    ///
    /// Propagates the remote's error unmodified; the cache is left untouched.
    pub async fn load_boards(&self, force_reload: bool) -> Result<Vec<Board>, PinError> {
        if !force_reload {
            if let Some(boards) = self.cache.get() {
                debug!(count = boards.len(), "session: boards from cache");
                return Ok(boards);
            }
        }

        let boards = self.remote.fetch_boards().await?;
        self.cache.set(&boards);
        info!(count = boards.len(), force_reload, "session: boards fetched");
        Ok(boards)
    }

    /// Push `boards` to every existing draft and to the template for future
    /// ones. An empty list disables submission until a non-empty list
    /// arrives.
    pub fn distribute_boards(&mut self, boards: &[Board]) {
        let choices = BoardChoices::from_boards(boards);
        for draft in &self.drafts {
            draft.apply_choices(&choices);
        }

        if choices.submission_enabled {
            info!(count = boards.len(), drafts = self.drafts.len(), "session: boards distributed");
        } else {
            warn!("session: no boards available, submission disabled");
        }

        self.boards = Some(boards.to_vec());
        self.choices = choices.clone();
        self.events.publish(SessionEvent::BoardsDistributed(choices));
    }

    /// Load, then distribute.
    ///
    /// # Errors
    ///
    /// Propagates the load error; the previous distribution stays in place.
    pub async fn refresh_boards(&mut self, force_reload: bool) -> Result<Vec<Board>, PinError> {
        self.set_phase(SessionPhase::Populating);
        let result = self.load_boards(force_reload).await;
        if let Ok(boards) = &result {
            self.distribute_boards(boards);
        }
        let resting = self.resting_phase();
        self.set_phase(resting);
        result
    }

    /// Set every draft's board. The blank selector entry is ignored.
    pub fn apply_board_to_all(&mut self, board_id: &str) {
        if board_id == NO_BOARD_ID {
            return;
        }
        for draft in &self.drafts {
            draft.set_board(board_id);
        }
        debug!(board_id, drafts = self.drafts.len(), "session: board applied to all");
    }

    // -------------------------------------------------------------------------
    // Drafts
    // -------------------------------------------------------------------------

    /// Append a draft seeded with the currently known boards.
    pub fn create_draft(&mut self, image: ImageSource) -> PinDraft {
        let draft = PinDraft::new(image, &self.choices, self.events.clone());
        let index = self.drafts.len();
        self.drafts.push(draft.clone());

        debug!(draft_id = %draft.id(), index, image = draft.image().name(), "session: draft created");
        self.events.publish(SessionEvent::DraftCreated {
            draft_id: draft.id(),
            index,
            board_options: self.choices.draft_options.clone(),
        });
        if self.phase == SessionPhase::Empty {
            self.set_phase(SessionPhase::Ready);
        }
        draft
    }

    /// One draft per image, in order.
    pub fn create_drafts<I>(&mut self, images: I) -> Vec<PinDraft>
    where
        I: IntoIterator<Item = ImageSource>,
    {
        images.into_iter().map(|image| self.create_draft(image)).collect()
    }

    /// Copy the first draft's note and link onto every other draft.
    pub fn autofill_from_first(&mut self) {
        let Some((first, rest)) = self.drafts.split_first() else {
            return;
        };
        let note = first.note();
        let link = first.link();
        for draft in rest {
            draft.set_note(note.clone());
            draft.set_link(link.clone());
        }
    }

    /// Drop every pinned draft. Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let (pinned, kept): (Vec<PinDraft>, Vec<PinDraft>) = self.drafts.drain(..).partition(PinDraft::is_pinned);
        self.drafts = kept;
        self.remove_notify(&pinned)
    }

    /// Drop every draft. Returns how many were removed.
    pub fn clear_all(&mut self) -> usize {
        let removed: Vec<PinDraft> = self.drafts.drain(..).collect();
        self.remove_notify(&removed)
    }

    fn remove_notify(&mut self, removed: &[PinDraft]) -> usize {
        if removed.is_empty() {
            return 0;
        }
        let draft_ids: Vec<DraftId> = removed.iter().map(PinDraft::id).collect();
        if self.focused.is_some_and(|f| draft_ids.contains(&f)) {
            self.focused = None;
        }
        info!(count = draft_ids.len(), "session: drafts removed");
        self.events.publish(SessionEvent::DraftsRemoved { draft_ids });
        if self.drafts.is_empty() {
            self.set_phase(SessionPhase::Empty);
        }
        removed.len()
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// `true` iff every draft has a note.
    ///
    /// Invalid drafts are flagged and numbered 1, 2, ... in sequence order;
    /// the first one takes focus. A fully valid session is left untouched.
    pub fn validate_all(&mut self) -> bool {
        let invalid: Vec<InvalidDraft> = self
            .drafts
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.is_valid())
            .zip(1_u32..)
            .map(|((index, d), tab_order)| InvalidDraft { draft_id: d.id(), index, tab_order })
            .collect();

        let Some(first) = invalid.first() else {
            return true;
        };

        self.set_phase(SessionPhase::Validating);
        for draft in &self.drafts {
            match invalid.iter().find(|i| i.draft_id == draft.id()) {
                Some(i) => draft.flag_invalid(i.tab_order),
                None => draft.clear_invalid(),
            }
        }
        let focus = first.draft_id;
        self.focused = Some(focus);

        info!(invalid = invalid.len(), %focus, "session: validation failed");
        self.events.publish(SessionEvent::ValidationFailed { invalid, focus });
        let resting = self.resting_phase();
        self.set_phase(resting);
        false
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Dispatch every draft that is not pinned (or already in flight) on its
    /// own task and return immediately with the dispatched ids.
    ///
    /// Nothing is published when no draft is eligible.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime while at least one draft is
    /// eligible, since each submission is started with `tokio::spawn`.
    pub fn submit_all(&mut self) -> Vec<DraftId> {
        let eligible: Vec<PinDraft> = self
            .drafts
            .iter()
            .filter(|d| matches!(d.state(), SubmissionState::Draft | SubmissionState::Failed))
            .cloned()
            .collect();
        if eligible.is_empty() {
            debug!(total = self.drafts.len(), "session: nothing to submit");
            return Vec::new();
        }

        self.set_phase(SessionPhase::Submitting);

        let mut dispatched = Vec::with_capacity(eligible.len());
        for draft in eligible {
            let remote = Arc::clone(&self.remote);
            let events = self.events.clone();
            dispatched.push(draft.id());

            tokio::spawn(async move {
                let outcome = draft.submit(remote.as_ref()).await;
                events.publish(SessionEvent::SubmissionFinished { draft_id: draft.id(), outcome });
            });
        }

        info!(dispatched = dispatched.len(), total = self.drafts.len(), "session: submission dispatched");
        let resting = self.resting_phase();
        self.set_phase(resting);
        dispatched
    }

    /// Send button: gate on boards and validation, then `submit_all`.
    ///
    /// # Errors
    ///
    /// [`SessionError::SubmissionDisabled`] while no boards exist;
    /// [`SessionError::InvalidDrafts`] when validation fails.
    ///
    /// # Panics
    ///
    /// Same as [`SessionCoordinator::submit_all`].
    pub fn send(&mut self) -> Result<Vec<DraftId>, SessionError> {
        if !self.choices.submission_enabled {
            return Err(SessionError::SubmissionDisabled);
        }
        if !self.validate_all() {
            let count = self.drafts.iter().filter(|d| !d.is_valid()).count();
            return Err(SessionError::InvalidDrafts { count });
        }
        self.focused = None;
        Ok(self.submit_all())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
