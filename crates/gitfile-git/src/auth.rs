//! Credential resolution for remote repositories
//!
//! The URL scheme picks the transport. Each transport consumes exactly one
//! declared credentials block and yields one [`Credentials`] variant.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::known_hosts::{HostKeyScanner, KnownHosts};
use crate::{Error, Result};

/// Declared `ssh` credentials block.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// Username on the SSH server (defaults to the URL user, then `git`)
    pub username: Option<String>,

    /// Passphrase for the private key
    pub password: Option<String>,

    /// PEM/OpenSSH private key text
    pub private_key: Option<String>,
}

/// Declared `http` credentials block.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub username: Option<String>,
    pub password: Option<String>,

    /// Permit credentials over plain `http://` URLs
    pub allow_insecure_http: bool,

    /// PEM certificate authority used to validate self-signed servers
    pub certificate_authority: Option<String>,
}

impl fmt::Debug for SshConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl fmt::Debug for HttpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("allow_insecure_http", &self.allow_insecure_http)
            .field("certificate_authority", &self.certificate_authority.is_some())
            .finish()
    }
}

/// Plain or TLS HTTP transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpTransport {
    Http,
    Https,
}

/// Resolved SSH credentials, including the host keys to trust.
#[derive(Clone)]
pub struct SshCredentials {
    pub username: String,
    pub password: Option<String>,
    pub private_key: String,
    pub known_hosts: KnownHosts,
}

/// Resolved HTTP(S) basic-auth credentials.
#[derive(Clone)]
pub struct HttpCredentials {
    pub transport: HttpTransport,
    pub username: String,
    pub password: String,
    pub ca_certificate: Option<String>,
}

impl HttpCredentials {
    /// Whether any secret would be sent to the server.
    pub fn has_userinfo(&self) -> bool {
        !self.username.is_empty() || !self.password.is_empty()
    }
}

impl fmt::Debug for SshCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshCredentials")
            .field("username", &self.username)
            .field("known_hosts", &self.known_hosts.entries().len())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for HttpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCredentials")
            .field("transport", &self.transport)
            .field("username", &self.username)
            .field("ca_certificate", &self.ca_certificate.is_some())
            .finish_non_exhaustive()
    }
}

/// Transport credentials for one remote.
#[derive(Debug, Clone)]
pub enum Credentials {
    Ssh(SshCredentials),
    Http(HttpCredentials),
}

/// Resolve credentials for `url` from the declared blocks.
///
/// Only `ssh` performs I/O: the server's host keys are fetched through
/// `scanner` so the transport can verify the host it connects to.
pub fn resolve(
    url: &str,
    http: Option<&HttpConfig>,
    ssh: Option<&SshConfig>,
    scanner: &dyn HostKeyScanner,
) -> Result<Credentials> {
    let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" => http_credentials(HttpTransport::Http, "http", http),
        "https" => http_credentials(HttpTransport::Https, "https", http),
        "ssh" => ssh_credentials(&parsed, ssh, scanner),
        scheme => Err(Error::UnsupportedScheme {
            scheme: scheme.to_string(),
        }),
    }
}

fn http_credentials(
    transport: HttpTransport,
    scheme: &str,
    http: Option<&HttpConfig>,
) -> Result<Credentials> {
    let http = http.ok_or_else(|| Error::MissingCredentials {
        scheme: scheme.to_string(),
        block: "http",
    })?;

    let ca_certificate = match transport {
        HttpTransport::Https => http
            .certificate_authority
            .clone()
            .filter(|pem| !pem.trim().is_empty()),
        HttpTransport::Http => None,
    };

    Ok(Credentials::Http(HttpCredentials {
        transport,
        username: http.username.clone().unwrap_or_default(),
        password: http.password.clone().unwrap_or_default(),
        ca_certificate,
    }))
}

fn ssh_credentials(
    url: &Url,
    ssh: Option<&SshConfig>,
    scanner: &dyn HostKeyScanner,
) -> Result<Credentials> {
    let ssh = ssh.ok_or_else(|| Error::MissingCredentials {
        scheme: "ssh".into(),
        block: "ssh",
    })?;

    let private_key = ssh.private_key.as_deref().unwrap_or_default();
    if private_key.is_empty() {
        return Err(Error::SshWithoutPrivateKey);
    }

    let host = url.host_str().ok_or_else(|| Error::InvalidUrl {
        url: url.to_string(),
        message: "ssh url has no host".into(),
    })?;
    let known_hosts = scanner.scan(host, url.port())?;

    let username = ssh
        .username
        .clone()
        .filter(|u| !u.is_empty())
        .or_else(|| Some(url.username().to_string()).filter(|u| !u.is_empty()))
        .unwrap_or_else(|| "git".to_string());

    Ok(Credentials::Ssh(SshCredentials {
        username,
        password: ssh.password.clone().filter(|p| !p.is_empty()),
        private_key: private_key.to_string(),
        known_hosts,
    }))
}
