//! Git access for git-file
//!
//! Resolves credentials for a remote, clones it into a throwaway workspace
//! and exposes the small commit/push surface the reconciler needs.

pub mod auth;
pub mod client;
pub mod error;
pub mod known_hosts;
pub mod session;

pub use auth::{Credentials, HttpConfig, HttpCredentials, HttpTransport, SshConfig, SshCredentials};
pub use client::{Commit, FileEdit, Git2Client, GitClient, Signature};
pub use error::{Error, Result};
pub use known_hosts::{HostKeyScanner, KnownHosts, SshKeyscan};
pub use session::{Git2Sessions, OpenOptions, RemoteTarget, Session, SessionProvider};
