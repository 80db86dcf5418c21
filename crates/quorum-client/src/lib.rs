//! Quorum Client — HTTP transport and entity dispatchers.
//!
//! Talks to the council API (REST-ish resource paths, query-string
//! filters, JSON bodies) and wires the optimistic mutation engine to
//! each entity: every create/update/delete goes through
//! [`Dispatch`], which builds the entity's view set and placeholder and
//! hands the transport future to the engine.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`config`]: Client configuration (base URL, timeout)
//! - [`client`]: The transport seam and the reqwest implementation
//! - [`dispatch`]: Per-entity mutation dispatchers and read-through
//!   cache refresh

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;

pub use client::{ApiClient, HttpTransport, Transport};
pub use config::ClientConfig;
pub use dispatch::Dispatch;
pub use error::{Error, Result};
