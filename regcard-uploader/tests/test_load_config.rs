use regcard_uploader::load_config::{load_config, ConfigOverrides, BASE_URL_VAR, TOKEN_VAR};
use regcard_uploader_core::config::Environment;
use regcard_uploader_core::contract::{MockSettingsPrompt, PromptError};
use serial_test::serial;
use std::env;
use std::fs::{create_dir_all, write};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn clear_env() {
    env::remove_var(BASE_URL_VAR);
    env::remove_var(TOKEN_VAR);
}

fn write_env_file(root: &Path, name: &str, contents: &str) {
    let dir = root.join("env");
    create_dir_all(&dir).unwrap();
    write(dir.join(name), contents).unwrap();
}

/// A static env file plus a prompted token produce a complete RunConfig.
#[test]
#[serial]
fn test_env_file_and_prompted_token_are_merged() {
    clear_env();
    let root = tempdir().unwrap();
    write_env_file(
        root.path(),
        ".env.na",
        "API_BASE_URL=https://stage.example.test/v4-reports/ihg/properties/\n",
    );

    let mut prompt = MockSettingsPrompt::new();
    prompt.expect_select_environment().never();
    prompt
        .expect_bearer_token()
        .times(1)
        .returning(|| Ok("  token-from-prompt \n".to_string()));

    let overrides = ConfigOverrides {
        root: root.path().to_path_buf(),
        environment: Some(Environment::Na),
        ..Default::default()
    };
    let config = load_config(&overrides, &prompt).expect("config should resolve");

    assert_eq!(config.environment, Environment::Na);
    assert_eq!(
        config.base_url,
        "https://stage.example.test/v4-reports/ihg/properties"
    );
    assert_eq!(config.token, "token-from-prompt");
    assert_eq!(config.paths.reg_cards_dir, root.path().join("reg_cards/NA"));
    assert_eq!(
        config.paths.property_map,
        root.path().join("property_id_map.json")
    );
    clear_env();
}

/// Without --environment the operator is asked, and the chosen env file is used.
#[test]
#[serial]
fn test_environment_is_selected_interactively() {
    clear_env();
    let root = tempdir().unwrap();
    write_env_file(root.path(), ".env.emea", "API_BASE_URL=https://emea.example.test\n");
    env::set_var(TOKEN_VAR, "env-token");

    let mut prompt = MockSettingsPrompt::new();
    prompt
        .expect_select_environment()
        .withf(|choices| choices.contains(&Environment::Emea))
        .times(1)
        .returning(|_| Ok(Environment::Emea));
    prompt.expect_bearer_token().never();

    let overrides = ConfigOverrides {
        root: root.path().to_path_buf(),
        ..Default::default()
    };
    let config = load_config(&overrides, &prompt).unwrap();

    assert_eq!(config.environment, Environment::Emea);
    assert_eq!(config.base_url, "https://emea.example.test");
    assert_eq!(config.token, "env-token");
    assert_eq!(config.paths.reg_cards_dir, root.path().join("reg_cards/EMEA"));
    clear_env();
}

#[test]
#[serial]
fn test_non_interactive_run_falls_back_to_default_environment() {
    clear_env();
    env::set_var(TOKEN_VAR, "env-token");

    let mut prompt = MockSettingsPrompt::new();
    prompt
        .expect_select_environment()
        .returning(|_| Err(PromptError::NotInteractive("the environment")));

    let overrides = ConfigOverrides {
        root: PathBuf::from("/nonexistent-root"),
        base_url: Some("http://localhost:8080".into()),
        ..Default::default()
    };
    let config = load_config(&overrides, &prompt).unwrap();
    assert_eq!(config.environment, Environment::Na);
    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_win_over_defaults() {
    clear_env();
    let root = tempdir().unwrap();
    write_env_file(root.path(), ".env.na", "API_BASE_URL=https://from-file.example.test\n");
    env::set_var(TOKEN_VAR, "env-token");

    let prompt = MockSettingsPrompt::new();
    let overrides = ConfigOverrides {
        root: root.path().to_path_buf(),
        environment: Some(Environment::Na),
        base_url: Some("https://from-flag.example.test".into()),
        reg_cards_dir: Some(PathBuf::from("/cards")),
        property_map: Some(PathBuf::from("/maps/ids.json")),
        field_mapping: Some(PathBuf::from("/maps/fields.json")),
    };
    let config = load_config(&overrides, &prompt).unwrap();

    assert_eq!(config.base_url, "https://from-flag.example.test");
    assert_eq!(config.paths.reg_cards_dir, PathBuf::from("/cards"));
    assert_eq!(config.paths.property_map, PathBuf::from("/maps/ids.json"));
    assert_eq!(config.paths.field_mapping, PathBuf::from("/maps/fields.json"));
    clear_env();
}

#[test]
#[serial]
fn test_missing_base_url_is_fatal() {
    clear_env();
    env::set_var(TOKEN_VAR, "env-token");
    let root = tempdir().unwrap();

    let prompt = MockSettingsPrompt::new();
    let overrides = ConfigOverrides {
        root: root.path().to_path_buf(),
        environment: Some(Environment::Na),
        ..Default::default()
    };
    let err = load_config(&overrides, &prompt).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("API base URL"), "got: {msg}");
    assert!(msg.contains(".env.na"), "got: {msg}");
    clear_env();
}

#[test]
#[serial]
fn test_blank_prompted_token_is_rejected() {
    clear_env();
    let mut prompt = MockSettingsPrompt::new();
    prompt
        .expect_bearer_token()
        .returning(|| Ok("   ".to_string()));

    let overrides = ConfigOverrides {
        root: PathBuf::from("/nonexistent-root"),
        environment: Some(Environment::Na),
        base_url: Some("http://localhost:8080".into()),
        ..Default::default()
    };
    let err = load_config(&overrides, &prompt).unwrap_err();
    assert!(err.to_string().contains("must not be empty"));
}

#[test]
#[serial]
fn test_malformed_env_file_is_fatal() {
    clear_env();
    let root = tempdir().unwrap();
    write_env_file(root.path(), ".env.na", "API_BASE_URL='unterminated\n");

    let prompt = MockSettingsPrompt::new();
    let overrides = ConfigOverrides {
        root: root.path().to_path_buf(),
        environment: Some(Environment::Na),
        ..Default::default()
    };
    let err = load_config(&overrides, &prompt).unwrap_err();
    assert!(
        err.to_string().contains("Failed to load environment file"),
        "got: {err}"
    );
}
