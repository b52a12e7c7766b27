use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

fn minimal() -> Vec<(&'static str, &'static str)> {
    vec![("SUPABASE_URL", "https://abcd.supabase.co/"), ("SUPABASE_ANON_KEY", "anon")]
}

// =============================================================================
// from_lookup
// =============================================================================

#[test]
fn from_lookup_defaults() {
    let cfg = AppConfig::from_lookup(lookup_from(&minimal())).unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.supabase.url, "https://abcd.supabase.co");
    assert_eq!(cfg.supabase.anon_key, "anon");
    assert!(cfg.cookie_secure);
    assert_eq!(
        cfg.supabase.timeouts,
        HttpTimeouts { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    );
}

#[test]
fn from_lookup_missing_url() {
    let err = AppConfig::from_lookup(lookup_from(&[("SUPABASE_ANON_KEY", "anon")])).unwrap_err();
    assert_eq!(err, ConfigError::Missing { var: "SUPABASE_URL" });
}

#[test]
fn from_lookup_blank_anon_key_is_missing() {
    let err = AppConfig::from_lookup(lookup_from(&[
        ("SUPABASE_URL", "https://abcd.supabase.co"),
        ("SUPABASE_ANON_KEY", "   "),
    ]))
    .unwrap_err();
    assert_eq!(err, ConfigError::Missing { var: "SUPABASE_ANON_KEY" });
}

#[test]
fn from_lookup_rejects_non_http_url() {
    let err = AppConfig::from_lookup(lookup_from(&[
        ("SUPABASE_URL", "abcd.supabase.co"),
        ("SUPABASE_ANON_KEY", "anon"),
    ]))
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "SUPABASE_URL", .. }));
}

#[test]
fn from_lookup_invalid_port() {
    let mut pairs = minimal();
    pairs.push(("PORT", "http"));
    let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
}

#[test]
fn from_lookup_overrides() {
    let mut pairs = minimal();
    pairs.extend([
        ("PORT", "8080"),
        ("COOKIE_SECURE", "off"),
        ("SUPABASE_REQUEST_TIMEOUT_SECS", "5"),
        ("SUPABASE_CONNECT_TIMEOUT_SECS", "2"),
    ]);
    let cfg = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
    assert_eq!(cfg.port, 8080);
    assert!(!cfg.cookie_secure);
    assert_eq!(cfg.supabase.timeouts, HttpTimeouts { request_secs: 5, connect_secs: 2 });
}

#[test]
fn from_lookup_http_url_defaults_to_insecure_cookies() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
        ("SUPABASE_URL", "http://127.0.0.1:54321"),
        ("SUPABASE_ANON_KEY", "anon"),
    ]))
    .unwrap();
    assert!(!cfg.cookie_secure);
}

#[test]
fn from_lookup_bad_cookie_secure() {
    let mut pairs = minimal();
    pairs.push(("COOKIE_SECURE", "maybe"));
    let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "COOKIE_SECURE", .. }));
}

#[test]
fn unparseable_timeout_falls_back_to_default() {
    let mut pairs = minimal();
    pairs.push(("SUPABASE_REQUEST_TIMEOUT_SECS", "soon"));
    let cfg = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
    assert_eq!(cfg.supabase.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
}

// =============================================================================
// parse_bool
// =============================================================================

#[test]
fn parse_bool_words() {
    for val in ["1", "true", "YES", " on "] {
        assert_eq!(parse_bool(val), Some(true), "expected true for {val:?}");
    }
    for val in ["0", "False", "no", "off"] {
        assert_eq!(parse_bool(val), Some(false), "expected false for {val:?}");
    }
    assert_eq!(parse_bool(""), None);
}

// =============================================================================
// storage key
// =============================================================================

#[test]
fn storage_key_uses_project_ref() {
    let cfg = AppConfig::from_lookup(lookup_from(&minimal())).unwrap();
    assert_eq!(cfg.supabase.project_ref(), "abcd");
    assert_eq!(cfg.supabase.storage_key(), "sb-abcd-auth-token");
}

#[test]
fn storage_key_for_local_url() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
        ("SUPABASE_URL", "http://127.0.0.1:54321"),
        ("SUPABASE_ANON_KEY", "anon"),
    ]))
    .unwrap();
    assert_eq!(cfg.supabase.storage_key(), "sb-127-auth-token");
}
