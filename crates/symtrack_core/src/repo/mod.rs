//! Persistence adapter contracts and implementations.
//!
//! # Responsibility
//! - Define the save/load contract consumed by the selection state.
//! - Define the append/list contract consumed by the tracking service.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Adapters report failures as `PersistError`; they never panic.
//! - Decoded data is validated against model invariants before it is
//!   returned.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod profile_store;
pub mod timeline_repo;

pub type PersistResult<T> = Result<T, PersistError>;

/// Failure at the persistence boundary.
#[derive(Debug)]
pub enum PersistError {
    /// Backing store could not be opened or read.
    Unavailable(DbError),
    /// Persisted data does not decode into a valid model value.
    Decode(String),
    /// Writing to the backing store failed.
    Write(DbError),
    /// A record could not be serialized for storage.
    Encode(serde_json::Error),
}

impl PersistError {
    pub(crate) fn unavailable(err: impl Into<DbError>) -> Self {
        Self::Unavailable(err.into())
    }

    pub(crate) fn write(err: impl Into<DbError>) -> Self {
        Self::Write(err.into())
    }

    /// Stable short code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "store_unavailable",
            Self::Decode(_) => "decode_failed",
            Self::Write(_) => "write_failed",
            Self::Encode(_) => "encode_failed",
        }
    }
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(err) => write!(f, "store unavailable: {err}"),
            Self::Decode(message) => write!(f, "invalid persisted data: {message}"),
            Self::Write(err) => write!(f, "write failed: {err}"),
            Self::Encode(err) => write!(f, "cannot encode record: {err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(err) | Self::Write(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Decode(_) => None,
        }
    }
}

impl From<DbError> for PersistError {
    fn from(value: DbError) -> Self {
        Self::Unavailable(value)
    }
}
