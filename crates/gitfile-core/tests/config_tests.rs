use std::fs;

use gitfile_core::config::load_document;
use gitfile_core::{Error, ErrorKind, ProviderConfig, RepositoryFile};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(temp: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = temp.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_toml() {
    let temp = TempDir::new().unwrap();
    let path = write(
        &temp,
        "provider.toml",
        r#"url = "https://git.example.com/org/config.git"
branch = "release"
ignore_updates = true

[http]
username = "bot"
password = "token"

[commits]
author_email = "bot@example.com"
"#,
    );

    let config = ProviderConfig::load(&path).unwrap();
    assert_eq!(config.url, "https://git.example.com/org/config.git");
    assert_eq!(config.branch(), Some("release"));
    assert!(config.ignore_updates);
    assert!(!config.allow_insecure_http());

    let http = config.http.unwrap();
    assert_eq!(http.username.as_deref(), Some("bot"));
    assert_eq!(http.password.as_deref(), Some("token"));
    assert_eq!(
        config.commits.unwrap().author_email.as_deref(),
        Some("bot@example.com")
    );
}

#[test]
fn test_load_json() {
    let temp = TempDir::new().unwrap();
    let path = write(
        &temp,
        "provider.json",
        r#"{"url": "ssh://git@git.example.com/org/config.git", "ssh": {"private_key": "KEY"}}"#,
    );

    let config = ProviderConfig::load(&path).unwrap();
    assert_eq!(config.ssh.as_ref().unwrap().private_key.as_deref(), Some("KEY"));
    assert_eq!(config.branch(), None);
    assert!(!config.ignore_updates);
}

#[test]
fn test_load_yaml() {
    let temp = TempDir::new().unwrap();
    let path = write(
        &temp,
        "provider.yml",
        "url: http://git.internal/config.git\nhttp:\n  username: bot\n  allow_insecure_http: true\n",
    );

    let config = ProviderConfig::load(&path).unwrap();
    assert!(config.allow_insecure_http());
}

#[test]
fn test_resource_document() {
    let temp = TempDir::new().unwrap();
    let path = write(
        &temp,
        "resource.toml",
        r#"path = "docs/readme.md"
content = "hello"

[timeouts]
create = 30
"#,
    );

    let file: RepositoryFile = load_document(&path).unwrap();
    assert_eq!(file.path, "docs/readme.md");
    assert!(!file.override_on_create);
    assert_eq!(file.timeouts.create, 30);
    assert_eq!(file.timeouts.update, 600);
}

#[test]
fn test_missing_url_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = write(&temp, "provider.toml", "branch = \"main\"\n");

    let err = ProviderConfig::load(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_unsupported_extension() {
    let temp = TempDir::new().unwrap();
    let path = write(&temp, "provider.ini", "url=x");

    let err = ProviderConfig::load(&path).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { ref extension } if extension == "ini"));
}

#[test]
fn test_parse_error_names_format_and_file() {
    let temp = TempDir::new().unwrap();
    let path = write(&temp, "provider.toml", "url = ");

    let err = ProviderConfig::load(&path).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("TOML"), "got {message}");
    assert!(message.contains("provider.toml"), "got {message}");
}

#[test]
fn test_missing_file_is_io_error() {
    let temp = TempDir::new().unwrap();
    let err = ProviderConfig::load(&temp.path().join("absent.toml")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}
