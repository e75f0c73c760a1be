//! Host key lookup for SSH remotes
//!
//! SSH credentials carry the host keys scanned at resolution time. The
//! transport accepts a server only when the key it presents is one of them.

use std::path::PathBuf;
use std::process::Command;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::{Error, Result};

/// A single `host keytype key` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostKey {
    /// Host patterns the key applies to (comma separated in the file)
    pub hosts: Vec<String>,

    /// Key algorithm, e.g. `ssh-ed25519`
    pub key_type: String,

    /// Decoded key blob
    pub key: Vec<u8>,
}

/// Parsed known-hosts content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownHosts {
    entries: Vec<HostKey>,
}

impl KnownHosts {
    /// Parse OpenSSH known-hosts text.
    ///
    /// Blank lines, comments and marker lines (`@cert-authority`, `@revoked`)
    /// are skipped, as are lines whose key is not valid base64.
    pub fn parse(text: &str) -> Self {
        let mut entries = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('@') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (Some(hosts), Some(key_type), Some(encoded)) =
                (fields.next(), fields.next(), fields.next())
            else {
                tracing::debug!(line = %line, "Skipping incomplete known_hosts line");
                continue;
            };

            match STANDARD.decode(encoded) {
                Ok(key) => entries.push(HostKey {
                    hosts: hosts.split(',').map(str::to_string).collect(),
                    key_type: key_type.to_string(),
                    key,
                }),
                Err(e) => {
                    tracing::debug!(line = %line, error = %e, "Skipping known_hosts line with invalid key");
                }
            }
        }

        Self { entries }
    }

    pub fn entries(&self) -> &[HostKey] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` (raw blob as presented by the server) is a known key.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }
}

/// Capability to fetch the host keys of an SSH server.
pub trait HostKeyScanner: Send + Sync {
    /// Scan `host` (optionally on a non-default `port`).
    fn scan(&self, host: &str, port: Option<u16>) -> Result<KnownHosts>;
}

/// [`HostKeyScanner`] backed by the `ssh-keyscan` binary.
#[derive(Debug, Clone)]
pub struct SshKeyscan {
    program: PathBuf,
    timeout_secs: u32,
}

impl Default for SshKeyscan {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ssh-keyscan"),
            timeout_secs: 10,
        }
    }
}

impl SshKeyscan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different `ssh-keyscan` executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }
}

impl HostKeyScanner for SshKeyscan {
    fn scan(&self, host: &str, port: Option<u16>) -> Result<KnownHosts> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-T").arg(self.timeout_secs.to_string());
        if let Some(port) = port {
            cmd.arg("-p").arg(port.to_string());
        }
        cmd.arg(host);

        tracing::debug!(host = %host, port = ?port, "Scanning SSH host keys");

        let output = cmd.output().map_err(|e| Error::HostKeyScan {
            host: host.to_string(),
            message: format!("could not run {}: {e}", self.program.display()),
        })?;

        if !output.status.success() {
            return Err(Error::HostKeyScan {
                host: host.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let known_hosts = KnownHosts::parse(&String::from_utf8_lossy(&output.stdout));
        if known_hosts.is_empty() {
            return Err(Error::HostKeyScan {
                host: host.to_string(),
                message: "no host keys returned".into(),
            });
        }

        Ok(known_hosts)
    }
}
