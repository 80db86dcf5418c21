//! Quorum — umbrella crate.
//!
//! Re-exports the component crates for convenience. Enable the
//! `client` feature for the HTTP transport and entity dispatchers.

#![doc = include_str!("../README.md")]

pub use quorum_cache as cache;
pub use quorum_core as core;
pub use quorum_model as model;
pub use quorum_mutate as mutate;

#[cfg(feature = "client")]
pub use quorum_client as client;
