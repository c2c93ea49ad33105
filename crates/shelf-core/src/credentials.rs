//! Saved login for auto-login
//!
//! The last successful login is written to `credentials.toml` in the data
//! directory. On Unix the file is created owner-readable only.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading or writing the saved login
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Failed to read saved login '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write saved login '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Saved login '{path}' is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize saved login: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Username and password of the last successful login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLogin {
    pub username: String,
    pub password: String,
}

impl SavedLogin {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for SavedLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SavedLogin")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// File-backed store for [`SavedLogin`]
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved login, `None` if nothing has been saved
    pub fn load(&self) -> Result<Option<SavedLogin>, CredentialError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CredentialError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let saved: SavedLogin = toml::from_str(&content).map_err(|source| CredentialError::Parse {
            path: self.path.clone(),
            source,
        })?;

        if saved.username.is_empty() {
            return Ok(None);
        }
        Ok(Some(saved))
    }

    /// Save a login, replacing any previous one
    pub fn save(&self, login: &SavedLogin) -> Result<(), CredentialError> {
        let write_err = |source| CredentialError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let content = toml::to_string_pretty(login)?;
        let mut file = open_private(&self.path).map_err(write_err)?;
        file.write_all(content.as_bytes()).map_err(write_err)?;
        Ok(())
    }

    /// Forget the saved login. Missing file is not an error.
    pub fn clear(&self) -> Result<(), CredentialError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CredentialError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// Open for writing with mode 0600. An existing file is narrowed to 0600
/// before anything is written to it.
#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
