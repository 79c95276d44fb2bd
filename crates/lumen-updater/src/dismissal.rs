use std::path::PathBuf;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Persists the single most recently dismissed release version.
///
/// Only one value is retained; a later dismissal silently replaces the
/// former. Implementations provide atomic single-key read/write with
/// last-write-wins semantics.
pub trait DismissalStore: Send + Sync {
    fn get(&self) -> Option<String>;
    /// Store `version` verbatim, replacing any prior value.
    fn set(&self, version: &str);
}

impl<S: DismissalStore + ?Sized> DismissalStore for &S {
    fn get(&self) -> Option<String> {
        (**self).get()
    }

    fn set(&self, version: &str) {
        (**self).set(version);
    }
}

/// Writes user dismissals through to a [`DismissalStore`].
pub struct DismissalRecorder<S> {
    store: S,
}

impl<S: DismissalStore> DismissalRecorder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Record a dismissal. The string is not validated; whatever the caller
    /// passes is stored as-is and suppresses exactly that version name until
    /// the next forced check.
    pub fn dismiss(&self, version: &str) {
        debug!("Dismissing version {version}");
        self.store.set(version);
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DismissalState {
    #[serde(default)]
    dismissed: Option<String>,
}

/// JSON-file [`DismissalStore`] under the application data directory.
///
/// A missing or unreadable file reads as "nothing dismissed"; write failures
/// are logged and absorbed so a dismissal can never fail the caller.
#[derive(Clone)]
pub struct FileDismissalStore {
    path: PathBuf,
}

impl FileDismissalStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> DismissalState {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => DismissalState::default(),
        }
    }
}

impl DismissalStore for FileDismissalStore {
    fn get(&self) -> Option<String> {
        self.load().dismissed
    }

    fn set(&self, version: &str) {
        let state = DismissalState {
            dismissed: Some(version.to_string()),
        };
        let Ok(content) = serde_json::to_string_pretty(&state) else {
            warn!("Failed to serialize dismissal state");
            return;
        };

        if let Some(parent) = self.path.parent()
            && let Err(error) = std::fs::create_dir_all(parent)
        {
            warn!("Failed to create dismissal directory: {error}");
            return;
        }
        if let Err(error) = std::fs::write(&self.path, content) {
            warn!("Failed to persist dismissal: {error}");
        }
    }
}
