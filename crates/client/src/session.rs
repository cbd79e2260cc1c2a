//! # Session Store
//!
//! Provides [`SessionStore`] for persisting and loading the per-profile
//! session identifier.
//!
//! ## File Layout
//!
//! ```text
//! {base_path}/
//! └── session.id   # single line: the session identifier
//! ```
//!
//! ## Lifecycle
//!
//! The file is read once at startup and written at most once (on first
//! creation). After that the same identifier is returned unchanged on
//! every call, across restarts. No network I/O happens here.
//!
//! ## Degraded Mode
//!
//! If the base directory cannot be created, or the file cannot be read
//! or written, `get_or_create` falls back to an in-memory identifier
//! with `durable = false` and logs the underlying
//! [`ClientError::Storage`] once. The ephemeral id is cached inside the
//! store, so repeated calls within one process return the same value —
//! identity stays idempotent for the process lifetime even without
//! storage; only a restart loses it. The degradation is explicit in the
//! returned [`Session`], never silent.
//!
//! ## Corruption Handling
//!
//! A blank or whitespace-only file is treated as absent: a fresh id is
//! generated and written over it. Anything else is returned verbatim —
//! the identifier is opaque and the service is the authority on what it
//! maps to.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use parallax_common::SessionId;

use crate::error::ClientError;

/// Filename for the persisted session identifier.
const SESSION_FILENAME: &str = "session.id";

/// Number of uuid characters appended to the time-based prefix.
const SUFFIX_LEN: usize = 8;

// ════════════════════════════════════════════════════════════════════════════
// SESSION
// ════════════════════════════════════════════════════════════════════════════

/// A resolved session identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The session identifier.
    pub id: SessionId,
    /// `false` when durable storage was unavailable and the id lives
    /// only for the process lifetime.
    pub durable: bool,
}

/// Generate a fresh session identifier.
///
/// Shape: `sess-<unix-millis>-<uuid8>`. The time component keeps ids
/// readable and roughly sortable; the uuid suffix makes collisions
/// negligible even if two profiles are created within the same
/// millisecond.
pub fn generate_session_id() -> SessionId {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(SUFFIX_LEN).collect();
    format!("sess-{}-{}", millis, suffix)
}

// ════════════════════════════════════════════════════════════════════════════
// SESSION STORE
// ════════════════════════════════════════════════════════════════════════════

/// Durable storage for the session identifier.
pub struct SessionStore {
    /// Root directory for the session file. Created on demand.
    base_path: PathBuf,
    /// Ephemeral id minted when storage is unavailable, held for the
    /// process lifetime so repeated calls stay idempotent.
    ephemeral: Mutex<Option<SessionId>>,
}

impl SessionStore {
    /// Creates a store rooted at the given directory. The directory is
    /// not created until the first write.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        SessionStore {
            base_path: base_path.into(),
            ephemeral: Mutex::new(None),
        }
    }

    /// Returns the profile's session identity, creating and persisting
    /// one on first use.
    ///
    /// Never fails: storage errors degrade to an ephemeral session
    /// (`durable = false`) with a warning on first degradation. The
    /// same ephemeral id is returned on every subsequent call for the
    /// lifetime of this store.
    pub fn get_or_create(&self) -> Session {
        match self.load_or_persist() {
            Ok(id) => Session { id, durable: true },
            Err(e) => {
                let mut cached = self.ephemeral.lock();
                let id = cached
                    .get_or_insert_with(|| {
                        let id = generate_session_id();
                        warn!(
                            "session storage unavailable ({}), using ephemeral session {}: \
                             history will not survive restart",
                            e, id
                        );
                        id
                    })
                    .clone();
                Session { id, durable: false }
            }
        }
    }

    fn load_or_persist(&self) -> Result<SessionId, ClientError> {
        let path = self.base_path.join(SESSION_FILENAME);

        if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let id = raw.trim();
            if !id.is_empty() {
                return Ok(id.to_string());
            }
            // blank file: fall through and regenerate over it
        }

        fs::create_dir_all(&self.base_path)?;
        let id = generate_session_id();
        fs::write(&path, &id)?;
        info!("created session {} at {}", id, path.display());
        Ok(id)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TESTS
// ════════════════════════════════════════════════════════════════════════════
