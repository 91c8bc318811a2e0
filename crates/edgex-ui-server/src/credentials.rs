//! Shared-password gate backed by a single bcrypt hash on disk.
//!
//! The first access provisions the file with the hash of
//! [`DEFAULT_PASSWORD`] when it does not exist. Reads and writes are
//! serialised; replacements are written to a temporary file in the same
//! directory and renamed into place.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

/// Password accepted until an operator changes it.
pub const DEFAULT_PASSWORD: &str = "admin";

const CREDENTIALS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::credentials");

/// Failures of the password gate.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No credentials file was configured.
    #[error("no credentials file configured")]
    NotConfigured,
    /// The supplied password does not match.
    #[error("invalid password")]
    InvalidPassword,
    /// The current password supplied with a change request does not match.
    #[error("invalid current password")]
    InvalidCurrentPassword,
    /// The credentials file could not be read or written.
    #[error("credentials file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Hashing or verification failed.
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    /// The blocking hashing task did not complete.
    #[error("password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Serialised access to the credentials file.
#[derive(Debug)]
pub struct CredentialStore {
    path: Option<PathBuf>,
    cost: u32,
    lock: Mutex<()>,
}

impl CredentialStore {
    /// Creates a store over `path`; `None` rejects every check.
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            cost: bcrypt::DEFAULT_COST,
            lock: Mutex::new(()),
        }
    }

    /// Overrides the bcrypt cost used for new hashes.
    #[must_use]
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    /// Checks `password` against the stored hash.
    ///
    /// # Errors
    ///
    /// [`CredentialError::InvalidPassword`] on mismatch; other variants on
    /// I/O or hashing failures.
    pub async fn verify(&self, password: &str) -> Result<(), CredentialError> {
        let path = self.path()?;
        let _guard = self.lock.lock().await;
        let hash = self.load_or_provision(path).await?;
        if matches(password, hash).await? {
            Ok(())
        } else {
            Err(CredentialError::InvalidPassword)
        }
    }

    /// Replaces the stored hash after checking `current`.
    ///
    /// # Errors
    ///
    /// [`CredentialError::InvalidCurrentPassword`] when `current` does not
    /// match; other variants on I/O or hashing failures.
    pub async fn change(&self, current: &str, new: &str) -> Result<(), CredentialError> {
        let path = self.path()?;
        let _guard = self.lock.lock().await;
        let hash = self.load_or_provision(path).await?;
        if !matches(current, hash).await? {
            return Err(CredentialError::InvalidCurrentPassword);
        }
        let replacement = self.hash(new).await?;
        persist(path, replacement).await?;
        info!(target: CREDENTIALS_TARGET, "password changed");
        Ok(())
    }

    fn path(&self) -> Result<&Path, CredentialError> {
        self.path.as_deref().ok_or(CredentialError::NotConfigured)
    }

    async fn load_or_provision(&self, path: &Path) -> Result<String, CredentialError> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Ok(contents.trim().to_owned()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                let hash = self.hash(DEFAULT_PASSWORD).await?;
                persist(path, hash.clone()).await?;
                info!(
                    target: CREDENTIALS_TARGET,
                    path = %path.display(),
                    "provisioned default credentials"
                );
                Ok(hash)
            }
            Err(source) => Err(CredentialError::Io {
                path: path.to_owned(),
                source,
            }),
        }
    }

    async fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let password = password.to_owned();
        let cost = self.cost;
        Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??)
    }
}

async fn matches(password: &str, hash: String) -> Result<bool, CredentialError> {
    let password = password.to_owned();
    Ok(tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
}

async fn persist(path: &Path, hash: String) -> Result<(), CredentialError> {
    let target = path.to_owned();
    let io_error = |source| CredentialError::Io {
        path: path.to_owned(),
        source,
    };
    tokio::task::spawn_blocking(move || write_atomically(&target, &hash))
        .await?
        .map_err(io_error)
}

fn write_atomically(path: &Path, contents: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}
