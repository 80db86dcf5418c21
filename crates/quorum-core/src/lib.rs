//! Quorum Core — shared types, traits, and errors.
//!
//! This crate provides the foundational types used across all Quorum
//! crates. It has no internal Quorum dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`id`]: Tagged record identifiers (`Local` vs `Confirmed`)
//! - [`page`]: Pagination wire contract and count arithmetic
//! - [`record`]: The `Record` trait implemented by cached entities

#![doc = include_str!("../README.md")]

pub mod error;
pub mod id;
pub mod page;
pub mod record;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use id::{RecordId, TempId};
pub use page::{Page, PageMeta};
pub use record::Record;
