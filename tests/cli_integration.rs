//! Tests for config loading and the init command.

use doublefetch::cli::{self, InitArgs, EXIT_ERROR, EXIT_SUCCESS};
use doublefetch::config::{self, ClientKind};

#[test]
fn test_load_explicit_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doublefetch.yaml");
    std::fs::write(
        &path,
        r#"
client: stub
timeout_ms: 1500
stub:
  body: "from file"
"#,
    )
    .unwrap();

    let config = cli::load_config(Some(&path)).unwrap();

    assert_eq!(config.client, ClientKind::Stub);
    assert_eq!(config.timeout_ms, 1500);
    assert_eq!(config.stub.unwrap().body, "from file");
}

#[test]
fn test_load_missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = cli::load_config(Some(&dir.path().join("nope.yaml"))).unwrap_err();
    assert!(format!("{err:#}").contains("nope.yaml"));
}

#[test]
fn test_init_writes_template_once() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("conf").join("doublefetch.yaml");
    let args = InitArgs {
        output: output.clone(),
        template: "stub".to_string(),
        list: false,
    };

    assert_eq!(cli::run_init(&args).unwrap(), EXIT_SUCCESS);

    let written = config::Config::parse_file(&output).unwrap();
    assert_eq!(written.client, ClientKind::Stub);
    assert!(config::validate(&written).is_ok());

    // Refuses to overwrite
    assert_eq!(cli::run_init(&args).unwrap(), EXIT_ERROR);
}

#[test]
fn test_init_unknown_template() {
    let dir = tempfile::tempdir().unwrap();
    let args = InitArgs {
        output: dir.path().join("x.yaml"),
        template: "grpc".to_string(),
        list: false,
    };

    assert_eq!(cli::run_init(&args).unwrap(), EXIT_ERROR);
    assert!(!dir.path().join("x.yaml").exists());
}

#[tokio::test]
async fn test_built_client_from_file_serves_routes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stub.yaml");
    std::fs::write(
        &path,
        r#"
client: stub
stub:
  body: "default"
  routes:
    - pattern: "*/fail"
      error: "status:500"
"#,
    )
    .unwrap();

    let config = cli::load_config(Some(&path)).unwrap();
    let client = cli::build_client(&config).unwrap();

    assert_eq!(client.fetch("https://a.test/ok").await.unwrap(), "default");
    assert_eq!(client.fetch("https://a.test/fail").await.unwrap_err().kind(), "status");
}
