//! Local board-list persistence.
//!
//! DESIGN
//! ======
//! The cache is a pure memoization layer: it is read before any remote
//! fetch and overwritten after every successful one. It never fails from
//! the caller's point of view. A file that cannot be read or parsed is a
//! miss, and a failed write is logged and dropped.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::board::Board;

/// Synchronous local store for the user's board list.
pub trait BoardCache: Send + Sync {
    /// Cached boards, or `None` when nothing has been stored yet.
    fn get(&self) -> Option<Vec<Board>>;

    /// Replace the cached list.
    fn set(&self, boards: &[Board]);
}

// =============================================================================
// IN-MEMORY
// =============================================================================

/// Process-local cache, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryBoardCache {
    boards: Mutex<Option<Vec<Board>>>,
}

impl MemoryBoardCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-seeded with `boards`.
    #[must_use]
    pub fn with_boards(boards: Vec<Board>) -> Self {
        Self { boards: Mutex::new(Some(boards)) }
    }
}

impl BoardCache for MemoryBoardCache {
    fn get(&self) -> Option<Vec<Board>> {
        self.boards
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, boards: &[Board]) {
        *self.boards.lock().unwrap_or_else(PoisonError::into_inner) = Some(boards.to_vec());
    }
}

// =============================================================================
// FILE
// =============================================================================

/// JSON file cache that survives restarts.
#[derive(Debug, Clone)]
pub struct FileBoardCache {
    path: PathBuf,
}

impl FileBoardCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BoardCache for FileBoardCache {
    fn get(&self) -> Option<Vec<Board>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "board cache: miss");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "board cache: read failed");
                return None;
            }
        };

        match serde_json::from_str::<Vec<Board>>(&raw) {
            Ok(boards) => Some(boards),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "board cache: corrupt, ignoring");
                None
            }
        }
    }

    fn set(&self, boards: &[Board]) {
        if let Err(e) = write_json(&self.path, boards) {
            warn!(path = %self.path.display(), error = %e, "board cache: write failed");
        }
    }
}

fn write_json(path: &Path, boards: &[Board]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string(boards).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
