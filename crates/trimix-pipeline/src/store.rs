//! Pipeline state store.
//!
//! Owns the single shared `PipelineState`, exposes read snapshots and a
//! functional update operation, and keeps a persisted record on disk. The
//! record is re-serialized (blobs stripped) after every mutation and removed
//! on reset. Rehydration is best-effort: a corrupt or absent record falls
//! back to defaults with only a log line.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};

use trimix_models::PipelineState;

/// Fixed name of the persisted state record.
pub const STATE_FILE_NAME: &str = "dashboard_state.json";

/// Owner of the shared pipeline state.
pub struct StateStore {
    state: RwLock<PipelineState>,
    path: Option<PathBuf>,
}

impl StateStore {
    /// Store without a persisted record (tests, ephemeral sessions).
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(PipelineState::default()),
            path: None,
        }
    }

    /// Load the persisted record from `dir`, falling back to defaults.
    ///
    /// Blob fields are never part of the record, so a rehydrated state
    /// always has both set to `None`.
    pub fn load_or_default(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(STATE_FILE_NAME);
        let state = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<PipelineState>(&bytes) {
                Ok(state) => {
                    debug!(path = %path.display(), "Restored persisted pipeline state");
                    state
                }
                Err(e) => {
                    warn!(path = %path.display(), "Failed to decode persisted state, using defaults: {}", e);
                    PipelineState::default()
                }
            },
            Err(_) => PipelineState::default(),
        };

        Self {
            state: RwLock::new(state),
            path: Some(path),
        }
    }

    /// Read a snapshot of the current state.
    pub fn snapshot(&self) -> PipelineState {
        self.state.read().expect("state lock poisoned").clone()
    }

    /// Apply a functional mutation and persist the result.
    ///
    /// After the mutator runs, `downloading_states` is re-synced to the clip
    /// list so the index-alignment invariant holds after every update no
    /// matter what the mutator did. Returns a snapshot of the new state.
    pub fn update<F>(&self, mutate: F) -> PipelineState
    where
        F: FnOnce(&mut PipelineState),
    {
        let snapshot = {
            let mut state = self.state.write().expect("state lock poisoned");
            mutate(&mut state);
            state.sync_downloading_states();
            state.clone()
        };
        self.persist(&snapshot);
        snapshot
    }

    /// Restore defaults and remove the persisted record.
    pub fn reset(&self) {
        {
            let mut state = self.state.write().expect("state lock poisoned");
            *state = PipelineState::default();
        }
        if let Some(path) = &self.path {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), "Failed to remove persisted state: {}", e);
                }
            }
        }
    }

    /// Path of the persisted record, when persistence is enabled.
    pub fn record_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn persist(&self, state: &PipelineState) {
        let Some(path) = &self.path else {
            return;
        };
        // Persistence is cosmetic; failures are logged, never surfaced.
        let result = serde_json::to_vec_pretty(&state.persistable())
            .map_err(std::io::Error::other)
            .and_then(|bytes| fs::write(path, bytes));
        if let Err(e) = result {
            warn!(path = %path.display(), "Failed to persist state: {}", e);
        }
    }
}
