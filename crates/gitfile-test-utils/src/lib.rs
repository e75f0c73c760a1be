//! Shared test utilities for the git-file workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`remote`] — [`BareRemote`], a local bare repository standing in for a
//!   hosted remote

pub mod remote;

pub use remote::BareRemote;
