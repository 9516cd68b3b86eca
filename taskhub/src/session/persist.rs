//! Durable storage for the session credential.
//!
//! One TOML file under the user's config directory holds the three
//! persisted entries: bearer token, subject id, and role. The file is
//! written on successful login (token only after registration, which
//! reports no identity), read once at process start, and erased on
//! logout. Writes go through a temp file and rename so a crash mid-write
//! never leaves a half-credential behind.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use taskhub_api::user::{Role, UserId};

/// Errors from credential file operations.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Reading or writing the file failed.
    #[error("credential file I/O failed at {path}: {source}")]
    Io {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file exists but does not parse as a credential.
    #[error("credential file is corrupt: {0}")]
    Corrupt(#[from] toml::de::Error),

    /// Serializing the credential failed.
    #[error("credential could not be encoded: {0}")]
    Encode(#[from] toml::ser::Error),

    /// No config directory is available on this system.
    #[error("could not determine config directory (no HOME or XDG_CONFIG_HOME)")]
    NoConfigDir,
}

/// The persisted credential triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    /// Bearer token.
    pub token: String,
    /// Authenticated subject, when known.
    pub user_id: Option<UserId>,
    /// Subject's role, when known.
    pub role: Option<Role>,
}

/// Handle on the on-disk credential file.
#[derive(Debug, Clone)]
pub struct CredentialFile {
    path: PathBuf,
}

impl CredentialFile {
    /// Uses an explicit file path (tests, custom deployments).
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses the default location, `<config_dir>/taskhub/session.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::NoConfigDir`] when the platform exposes no
    /// config directory.
    pub fn default_location() -> Result<Self, PersistError> {
        let Some(config_dir) = dirs::config_dir() else {
            return Err(PersistError::NoConfigDir);
        };
        Ok(Self {
            path: config_dir.join("taskhub").join("session.toml"),
        })
    }

    /// Returns the path this handle reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted credential, if any.
    ///
    /// A missing file is `Ok(None)` — first run, or a clean logout.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] when the file exists but cannot be read
    /// or parsed.
    pub fn load(&self) -> Result<Option<StoredCredential>, PersistError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PersistError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        Ok(Some(toml::from_str(&contents)?))
    }

    /// Persists the credential, atomically replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] on encoding or I/O failure.
    pub fn save(&self, credential: &StoredCredential) -> Result<(), PersistError> {
        let io_err = |e: std::io::Error| PersistError::Io {
            path: self.path.clone(),
            source: e,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let encoded = toml::to_string_pretty(credential)?;
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, encoded).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }

    /// Erases the persisted credential. A file that is already gone
    /// counts as success.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] when the file exists but cannot be
    /// removed.
    pub fn erase(&self) -> Result<(), PersistError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistError::Io {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}
