//! Tagged record identifiers.
//!
//! A cached record is either **confirmed** (it carries the identifier the
//! server assigned) or **local** (it was projected optimistically and has
//! not been acknowledged yet). Representing the two as a tagged union
//! removes any possibility of a locally generated identifier colliding
//! with a real one, which a string-prefix sentinel cannot guarantee.
//!
//! On the wire a confirmed id is a plain integer and a local id is a
//! UUID string, so the untagged serde representation is unambiguous.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A unique identifier for a locally projected, not-yet-confirmed record.
///
/// Each optimistic create mints a fresh `TempId`, so concurrent creates
/// never collide in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TempId(Uuid);

impl TempId {
    /// Mint a new unique temporary identifier.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a cached record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Server-assigned identifier.
    Confirmed(i64),
    /// Locally projected placeholder, awaiting server confirmation.
    Local(TempId),
}

impl RecordId {
    /// Returns `true` if this id belongs to an unconfirmed placeholder.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// Returns `true` if this id was assigned by the server.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    /// The server-assigned id, if confirmed.
    pub fn as_confirmed(&self) -> Option<i64> {
        match self {
            Self::Confirmed(id) => Some(*id),
            Self::Local(_) => None,
        }
    }

    /// The temporary id, if local.
    pub fn as_local(&self) -> Option<TempId> {
        match self {
            Self::Local(tmp) => Some(*tmp),
            Self::Confirmed(_) => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed(id) => write!(f, "{id}"),
            Self::Local(tmp) => write!(f, "local:{tmp}"),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self::Confirmed(id)
    }
}

impl From<TempId> for RecordId {
    fn from(tmp: TempId) -> Self {
        Self::Local(tmp)
    }
}
