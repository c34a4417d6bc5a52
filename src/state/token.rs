//! Auth-token persistence.
//!
//! The only state that outlives a session is one opaque token stored under
//! [`TOKEN_KEY`]. Browser builds would back this with `localStorage`; the
//! CLI uses a file.

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::ClientError;

/// Fixed storage key (and file name) for the persisted token.
pub const TOKEN_KEY: &str = "auth_token";

/// Load/save/clear for the persisted token.
pub trait TokenStore: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the backing store is unreadable.
    fn load(&self) -> Result<Option<String>, ClientError>;

    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the token cannot be written.
    fn save(&self, token: &str) -> Result<(), ClientError>;

    /// Clearing an already-empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the token cannot be removed.
    fn clear(&self) -> Result<(), ClientError>;
}

/// Process-local store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self { token: Mutex::new(Some(token.to_owned())) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, ClientError> {
        Ok(self.token.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, token: &str) -> Result<(), ClientError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Stores the token as `<dir>/auth_token`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store inside `dir`; the directory is created on first save.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self { path: dir.join(TOKEN_KEY) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, ClientError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| token.to_owned()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
