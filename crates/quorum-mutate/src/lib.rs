//! Quorum Mutate — the optimistic mutation engine.
//!
//! One generic implementation of the create/update/delete convention the
//! dashboard applies to every entity:
//!
//! 1. cancel in-flight reads for every affected cached view,
//! 2. snapshot those views,
//! 3. compute a locally projected result,
//! 4. apply it to lists, infinite views, and the detail record,
//! 5. await the network response,
//! 6. on success reconcile the projection with the server row,
//! 7. on failure restore the snapshots verbatim,
//! 8. always settle by invalidating the affected views.
//!
//! Steps 3–7 are a latency optimization; step 8 is the correctness
//! backstop that makes the cache converge to server truth.
//!
//! # Modules
//!
//! - [`views`]: The set of cached views one mutation touches
//! - [`project`]: Optimistic projections for create/update/delete
//! - [`reconcile`]: Replacing projections with server-confirmed rows
//! - [`protocol`]: The engine itself plus the error-notification seam

pub mod error;
pub mod project;
pub mod protocol;
pub mod reconcile;
pub mod views;

pub use error::{Error, Result};
pub use protocol::{LogNotifier, Notifier, OptimisticWrite};
pub use views::{Aggregate, ViewSet};
