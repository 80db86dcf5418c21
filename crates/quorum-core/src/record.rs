//! The `Record` trait implemented by every cached entity.
//!
//! The optimistic mutation engine is generic over this trait: it needs
//! to read a row's identifier to match placeholders against confirmed
//! rows, and to refresh the modification timestamp when a patch is
//! projected locally.

use chrono::{DateTime, Utc};

use crate::id::RecordId;

/// A cacheable entity row.
pub trait Record {
    /// The row's identifier, local or confirmed.
    fn id(&self) -> RecordId;

    /// Replace the row's identifier (used when a placeholder is
    /// confirmed by the server).
    fn set_id(&mut self, id: RecordId);

    /// Refresh the row's modification timestamp.
    fn touch(&mut self, now: DateTime<Utc>);

    /// Returns `true` if this row is an unconfirmed placeholder.
    fn is_placeholder(&self) -> bool {
        self.id().is_local()
    }
}
