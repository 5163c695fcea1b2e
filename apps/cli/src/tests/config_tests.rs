use super::*;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let pairs: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| pairs.get(key).cloned()
}

#[test]
fn defaults_match_mock_login_timings() {
    let settings = Settings::default();
    assert_eq!(settings.login_latency(), Duration::from_millis(1000));
    assert_eq!(settings.login_timeout(), Duration::from_millis(5000));
    assert_eq!(settings.utc_offset().expect("offset").local_minus_utc(), 0);
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
            session_database_url = "sqlite://./state/s.db"
            login_timeout_ms = 250
            utc_offset_minutes = "-300"
        "#,
    );

    assert_eq!(settings.session_database_url, "sqlite://./state/s.db");
    assert_eq!(settings.login_timeout_ms, 250);
    assert_eq!(settings.utc_offset_minutes, -300);
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn malformed_file_is_ignored() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "this is = = not toml");
    assert_eq!(settings, Settings::default());
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let mut settings = Settings::default();
    apply_file(&mut settings, r#"session_database_url = "from-file.db""#);
    apply_env(
        &mut settings,
        env_of(&[
            ("CRM_SESSION_DB", "legacy.db"),
            ("APP__SESSION_DATABASE_URL", "sqlite://./app.db"),
            ("APP__LOGIN_LATENCY_MS", "10"),
            ("APP__LOGIN_TIMEOUT_MS", "not-a-number"),
            ("APP__LOG_FILTER", "debug"),
        ]),
    );

    assert_eq!(settings.session_database_url, "sqlite://./app.db");
    assert_eq!(settings.login_latency_ms, 10);
    assert_eq!(settings.login_timeout_ms, 5000);
    assert_eq!(settings.log_filter, "debug");
}

#[test]
fn offset_outside_a_day_is_rejected() {
    let settings = Settings {
        utc_offset_minutes: 24 * 60,
        ..Settings::default()
    };
    assert!(settings.utc_offset().is_err());

    let settings = Settings {
        utc_offset_minutes: 330,
        ..Settings::default()
    };
    assert_eq!(settings.utc_offset().expect("offset").local_minus_utc(), 330 * 60);
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/session.db"),
        "sqlite://./data/session.db"
    );
    assert_eq!(normalize_database_url("sqlite:data.db"), "sqlite://data.db");
    assert_eq!(normalize_database_url("  "), Settings::default().session_database_url);
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
}

#[test]
fn prepare_leaves_directory_creation_to_the_store() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("session.db");

    let url = prepare_database_url(&db_path.to_string_lossy());

    assert_eq!(url, format!("sqlite://{}", db_path.to_string_lossy()));
    assert!(!temp_root.path().join("nested").exists());
}

#[test]
fn load_settings_reads_given_file() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let path = temp_root.path().join("crm.toml");
    fs::write(&path, "login_latency_ms = 42\n").expect("write config");

    let settings = load_settings(&path);
    assert!(settings.login_latency_ms == 42 || std::env::var("APP__LOGIN_LATENCY_MS").is_ok());
}
