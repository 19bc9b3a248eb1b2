use super::*;

use std::io::Write;

#[test]
fn missing_file_keeps_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = load_settings_from(&dir.path().join("absent.toml"));
    assert_eq!(settings.base_url, "http://127.0.0.1:8080");
    assert_eq!(settings.login_path, "/login");
    assert_eq!(settings.body_encoding, BodyEncoding::Json);
    assert!(settings.session_token.is_none());
}

#[test]
fn file_values_override_defaults() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
base_url = "https://forum.example"
login_path = "/auth/login"
body_encoding = "form"
request_timeout_secs = 3
session_token = "abc123"
"#
    )
    .expect("write");

    let settings = load_settings_from(file.path());
    assert_eq!(settings.base_url, "https://forum.example");
    assert_eq!(settings.body_encoding, BodyEncoding::Form);
    assert_eq!(settings.request_timeout(), Duration::from_secs(3));
    assert_eq!(settings.session_token.as_deref(), Some("abc123"));
    assert_eq!(
        settings.login_url().expect("login url").as_str(),
        "https://forum.example/auth/login"
    );
}

#[test]
fn unknown_encoding_in_file_is_ignored() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, r#"body_encoding = "xml""#).expect("write");

    let settings = load_settings_from(file.path());
    assert_eq!(settings.body_encoding, BodyEncoding::Json);
}

#[test]
fn unparsable_file_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "base_url = ").expect("write");

    let settings = load_settings_from(file.path());
    assert_eq!(settings.base_url, ClientSettings::default().base_url);
}

#[test]
fn zero_timeout_is_clamped() {
    let settings = ClientSettings {
        request_timeout_secs: 0,
        ..ClientSettings::default()
    };
    assert_eq!(settings.request_timeout(), Duration::from_secs(1));
}

const ENV_KEYS: [&str; 6] = [
    "FORUM_BASE_URL",
    "APP__BASE_URL",
    "APP__LOGIN_PATH",
    "APP__BODY_ENCODING",
    "APP__REQUEST_TIMEOUT_SECS",
    "FORUM_SESSION_TOKEN",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

// Single test for every env case: the process environment is shared
// between the test threads.
#[test]
fn env_overrides_file_values_in_order() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
base_url = "https://file.example"
login_path = "/file-login"
body_encoding = "form"
request_timeout_secs = 3
session_token = "from-file"
"#
    )
    .expect("write");

    clear_env();
    std::env::set_var("FORUM_BASE_URL", "https://forum-var.example");
    std::env::set_var("APP__BASE_URL", "https://app-var.example");
    std::env::set_var("APP__LOGIN_PATH", "/signin");
    std::env::set_var("APP__BODY_ENCODING", "json");
    std::env::set_var("APP__REQUEST_TIMEOUT_SECS", "25");
    std::env::set_var("FORUM_SESSION_TOKEN", "from-env");

    let mut settings = load_settings_from(file.path());
    apply_env_overrides(&mut settings);
    assert_eq!(settings.base_url, "https://app-var.example");
    assert_eq!(settings.login_path, "/signin");
    assert_eq!(settings.body_encoding, BodyEncoding::Json);
    assert_eq!(settings.request_timeout(), Duration::from_secs(25));
    assert_eq!(settings.session_token.as_deref(), Some("from-env"));

    std::env::remove_var("APP__BASE_URL");
    std::env::set_var("APP__BODY_ENCODING", "xml");
    std::env::set_var("APP__REQUEST_TIMEOUT_SECS", "soon");

    let mut settings = load_settings_from(file.path());
    apply_env_overrides(&mut settings);
    clear_env();

    assert_eq!(settings.base_url, "https://forum-var.example");
    assert_eq!(settings.body_encoding, BodyEncoding::Form);
    assert_eq!(settings.request_timeout(), Duration::from_secs(3));
}
