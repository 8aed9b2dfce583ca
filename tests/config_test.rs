//! Integration tests for Settings config loading.
//!
//! These tests pass an explicit config file, so no global config is read.
//! Environment overrides are covered in `config_env_test.rs` (own process).

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use domtree::application::{ApplicationError, ReportFormat};
use domtree::config::Settings;

#[test]
fn given_config_file_when_load_then_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("domtree.toml");
    fs::write(
        &path,
        r#"
[render]
marker = "*"

[report]
format = "pdf"
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(path.as_path())).expect("load settings");

    assert_eq!(settings.render.marker, '*');
    assert!(settings.render.color, "unspecified keep default");
    assert_eq!(settings.report.format, ReportFormat::Pdf);
    assert_eq!(settings.session.default_auth_source, "admin");
}

#[test]
fn given_output_dir_with_tilde_when_load_then_expanded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("domtree.toml");
    fs::write(&path, "[report]\noutput_dir = \"~/reports\"\n").unwrap();

    let settings = Settings::load(Some(path.as_path())).unwrap();

    assert!(!settings.report.output_dir.starts_with("~"));
    assert!(settings.report.output_dir.ends_with("reports"));
}

#[test]
fn given_unknown_key_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("domtree.toml");
    fs::write(&path, "[render]\nindent = 2\n").unwrap();

    let err = Settings::load(Some(path.as_path())).unwrap_err();
    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_missing_explicit_config_when_load_then_config_error() {
    let err = Settings::load(Some(PathBuf::from("/nonexistent/domtree.toml").as_path())).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/domtree.toml"));
}
