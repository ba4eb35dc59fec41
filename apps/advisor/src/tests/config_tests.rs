use std::collections::HashMap;

use super::*;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_the_hosted_setup() {
    let settings = Settings::default();
    assert_eq!(settings.catalog, "products.json");
    assert_eq!(settings.model, "gpt-4o");
    assert_eq!(settings.max_tokens, 1000);
    assert_eq!(settings.api_key, None);
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
        catalog = "https://shop.example/products.json"
        completion_url = "https://proxy.example/"
        max_tokens = 400
        "#,
    )
    .expect("valid file");

    assert_eq!(settings.catalog, "https://shop.example/products.json");
    assert_eq!(settings.completion_url, "https://proxy.example/");
    assert_eq!(settings.max_tokens, 400);
    assert_eq!(settings.model, "gpt-4o");
}

#[test]
fn unknown_file_keys_are_rejected() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "catalgo = \"typo.json\"").is_err());
}

#[test]
fn env_overrides_file_and_prefers_app_prefix() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "model = \"from-file\"").expect("file");
    apply_env(
        &mut settings,
        env_from(&[
            ("ADVISOR_MODEL", "from-advisor-env"),
            ("APP__MODEL", "from-app-env"),
            ("OPENAI_API_KEY", "sk-test"),
        ]),
    );

    assert_eq!(settings.model, "from-app-env");
    assert_eq!(settings.api_key.as_deref(), Some("sk-test"));
}

#[test]
fn unparsable_numeric_env_is_ignored() {
    let mut settings = Settings::default();
    apply_env(&mut settings, env_from(&[("ADVISOR_MAX_TOKENS", "lots")]));
    assert_eq!(settings.max_tokens, 1000);
}

#[test]
fn explicit_config_path_must_exist() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent.toml");
    assert!(load_settings(Some(missing.as_path())).is_err());
}

#[test]
fn explicit_config_file_is_loaded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("advisor.toml");
    fs::write(&path, "database_url = \"sqlite://./tmp/test.db\"\n").expect("write");

    let settings = load_settings(Some(path.as_path())).expect("load");
    // Environment may still override; only check the file was read when it is not set.
    if std::env::var("APP__DATABASE_URL").is_err() && std::env::var("ADVISOR_DATABASE_URL").is_err()
    {
        assert_eq!(settings.database_url, "sqlite://./tmp/test.db");
    }
}

#[test]
fn endpoint_settings_drop_blank_api_key() {
    let settings = Settings {
        api_key: Some(String::new()),
        request_timeout_secs: 5,
        ..Settings::default()
    };
    let endpoint = settings.endpoint_settings().expect("endpoint");
    assert_eq!(endpoint.api_key, None);
    assert_eq!(endpoint.request_timeout, Duration::from_secs(5));
}

#[test]
fn invalid_completion_url_is_reported() {
    let settings = Settings {
        completion_url: "not a url".into(),
        ..Settings::default()
    };
    assert!(settings.endpoint_settings().is_err());
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(
        normalize_database_url("sqlite::memory:"),
        "sqlite::memory:"
    );
    assert_eq!(normalize_database_url("  "), Settings::default().database_url);
}
