//! Boards and the selectable-option snapshots derived from them.
//!
//! DESIGN
//! ======
//! A board list is replaced wholesale on every fetch. `BoardChoices` is the
//! rendering-independent projection of one list: the options every draft
//! selector shows, the options of the bulk "send all to board" selector,
//! and whether submission is possible at all.

use serde::{Deserialize, Serialize};

/// Reserved board id meaning "no board selected" / "no boards exist".
pub const NO_BOARD_ID: &str = "";

/// Label of the single disabled option shown when the user has no boards.
pub const NO_BOARDS_LABEL: &str = "You don't have any boards!";

/// Label of the leading blank option of the bulk selector.
pub const BULK_BLANK_LABEL: &str = "---";

// =============================================================================
// BOARD
// =============================================================================

/// A named pin destination on the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
}

impl Board {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

// =============================================================================
// OPTIONS
// =============================================================================

/// One entry of a board selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardOption {
    pub id: String,
    pub name: String,
    pub enabled: bool,
}

impl BoardOption {
    fn from_board(board: &Board) -> Self {
        Self { id: board.id.clone(), name: board.name.clone(), enabled: true }
    }

    fn placeholder(name: &str) -> Self {
        Self { id: NO_BOARD_ID.to_string(), name: name.to_string(), enabled: false }
    }

    fn blank() -> Self {
        Self { id: NO_BOARD_ID.to_string(), name: BULK_BLANK_LABEL.to_string(), enabled: true }
    }
}

/// Selector contents derived from one board list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardChoices {
    /// Options for each draft's own selector.
    pub draft_options: Vec<BoardOption>,
    /// Options for the "send all to board" selector.
    pub bulk_options: Vec<BoardOption>,
    /// `false` while the user has no boards to pin to.
    pub submission_enabled: bool,
}

impl BoardChoices {
    /// Build selector contents for a freshly fetched list.
    ///
    /// An empty list yields the "no boards" placeholder and disables
    /// submission.
    #[must_use]
    pub fn from_boards(boards: &[Board]) -> Self {
        if boards.is_empty() {
            return Self {
                draft_options: vec![BoardOption::placeholder(NO_BOARDS_LABEL)],
                bulk_options: vec![BoardOption::blank()],
                submission_enabled: false,
            };
        }

        let draft_options: Vec<BoardOption> = boards.iter().map(BoardOption::from_board).collect();
        let mut bulk_options = Vec::with_capacity(boards.len() + 1);
        bulk_options.push(BoardOption::blank());
        bulk_options.extend(draft_options.iter().cloned());

        Self { draft_options, bulk_options, submission_enabled: true }
    }

    /// The board a newly rendered selector shows first, or `NO_BOARD_ID`.
    #[must_use]
    pub fn default_board_id(&self) -> &str {
        self.draft_options
            .iter()
            .find(|o| o.enabled)
            .map_or(NO_BOARD_ID, |o| o.id.as_str())
    }

    /// Whether `board_id` is a selectable (enabled, non-sentinel) option.
    #[must_use]
    pub fn contains(&self, board_id: &str) -> bool {
        board_id != NO_BOARD_ID && self.draft_options.iter().any(|o| o.enabled && o.id == board_id)
    }
}

impl Default for BoardChoices {
    /// Choices before any board list has been loaded: nothing selectable,
    /// submission not yet disabled.
    fn default() -> Self {
        Self { draft_options: Vec::new(), bulk_options: vec![BoardOption::blank()], submission_enabled: true }
    }
}

#[cfg(test)]
#[path = "board_test.rs"]
mod tests;
