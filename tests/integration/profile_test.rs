//! Connection-profile resolution tests.
//!
//! Covers field trimming, missing-credential reporting, and the shape
//! of the generated connection URLs.

use pretty_assertions::assert_eq;

use sqlchat::error::ChatError;
use sqlchat::profile::{ConnectionProfile, DatabaseKind, RemoteFields};

fn fields(host: &str, user: &str, password: &str, database: &str) -> RemoteFields {
    RemoteFields {
        host: host.to_string(),
        user: user.to_string(),
        password: password.to_string(),
        database: database.to_string(),
    }
}

#[test]
fn test_blank_form_reports_every_missing_field() {
    let result = ConnectionProfile::resolve(
        DatabaseKind::Postgres,
        &fields("", "", "", ""),
        None,
    );

    let error = result.unwrap_err();
    match error {
        ChatError::MissingCredentials { fields } => {
            assert_eq!(fields, vec!["host", "user", "password", "database"]);
        }
        other => panic!("expected MissingCredentials, got: {other}"),
    }
}

#[test]
fn test_whitespace_only_host_counts_as_missing() {
    let result = ConnectionProfile::resolve(
        DatabaseKind::MySql,
        &fields("   ", "reader", "pw", "students"),
        None,
    );

    let error = result.unwrap_err();
    assert!(error.to_string().contains("host"));
    assert!(!error.to_string().contains("user"));
}

#[test]
fn test_password_of_spaces_is_accepted() {
    // Passwords are taken verbatim; only the other fields are trimmed
    let profile = ConnectionProfile::resolve(
        DatabaseKind::Postgres,
        &fields("db.example.com", "reader", "   ", "students"),
        None,
    )
    .unwrap();

    let url = profile.connection_url().unwrap();
    assert!(url.contains(":%20%20%20@"));
}

#[test]
fn test_postgres_url_round_trips_through_parser() {
    let profile = ConnectionProfile::resolve(
        DatabaseKind::Postgres,
        &fields(" db.example.com ", " reader ", "p@ss/w:ord?#", " students "),
        None,
    )
    .unwrap();

    let url = url::Url::parse(&profile.connection_url().unwrap()).unwrap();
    assert_eq!(url.scheme(), "postgres");
    assert_eq!(url.host_str(), Some("db.example.com"));
    assert_eq!(url.username(), "reader");
    assert_eq!(url.password(), Some("p%40ss%2Fw%3Aord%3F%23"));
    assert_eq!(url.path(), "/students");
}

#[test]
fn test_local_profile_ignores_credential_fields() {
    let profile = ConnectionProfile::resolve(
        DatabaseKind::Local,
        &fields("", "", "", ""),
        Some(std::path::Path::new("/opt/app/student.db")),
    )
    .unwrap();

    assert_eq!(profile.kind(), DatabaseKind::Local);
    assert!(profile.connection_url().is_none());
}

#[test]
fn test_profiles_differing_only_in_password_are_distinct() {
    let a = ConnectionProfile::resolve(
        DatabaseKind::Postgres,
        &fields("h", "u", "pw1", "d"),
        None,
    )
    .unwrap();
    let b = ConnectionProfile::resolve(
        DatabaseKind::Postgres,
        &fields("h", "u", "pw2", "d"),
        None,
    )
    .unwrap();

    assert_ne!(a, b);
}

#[test]
fn test_debug_output_never_contains_password() {
    let profile = ConnectionProfile::resolve(
        DatabaseKind::MySql,
        &fields("h", "u", "hunter2", "d"),
        None,
    )
    .unwrap();

    let debug = format!("{profile:?}");
    assert!(!debug.contains("hunter2"));
    assert!(debug.contains("<redacted>"));
}
