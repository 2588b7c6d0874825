//! Local SQLite backend tests against a temporary database file.

use std::path::PathBuf;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;

use sqlchat::profile::ConnectionProfile;
use sqlchat::session::Session;

/// Creates a student database in a temp directory and returns its path.
async fn create_fixture(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("student.db");
    let pool = SqlitePool::connect_with(
        SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true),
    )
    .await
    .unwrap();

    sqlx::query(
        "CREATE TABLE student (name TEXT NOT NULL, class TEXT, section TEXT, marks INTEGER)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO student VALUES ('Alice', '10', 'A', 91), ('Bob', '10', 'B', 78)")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    path
}

#[tokio::test]
async fn test_session_connects_and_queries_local_db() {
    let dir = tempfile::tempdir().unwrap();
    let path = create_fixture(&dir).await;

    let mut session = Session::new();
    let handle = session
        .connect(&ConnectionProfile::Local { path })
        .await
        .unwrap();

    assert_eq!(handle.list_tables().await.unwrap(), vec!["student"]);

    let result = handle
        .run_query("SELECT name FROM student ORDER BY marks DESC")
        .await
        .unwrap();
    assert_eq!(result.row_count, 2);
    assert_eq!(result.render_text().lines().nth(1), Some("Alice"));
}

#[tokio::test]
async fn test_local_db_rejects_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = create_fixture(&dir).await;

    let mut session = Session::new();
    let handle = session
        .connect(&ConnectionProfile::Local { path })
        .await
        .unwrap();

    let error = handle
        .run_query("DELETE FROM student")
        .await
        .unwrap_err();
    assert!(error.to_string().to_lowercase().contains("readonly"));

    // The data is untouched
    let result = handle.run_query("SELECT * FROM student").await.unwrap();
    assert_eq!(result.row_count, 2);
}

#[tokio::test]
async fn test_missing_local_db_is_a_connection_error() {
    let mut session = Session::new();
    let result = session
        .connect(&ConnectionProfile::Local {
            path: PathBuf::from("/nonexistent/student.db"),
        })
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_reconnect_reuses_cached_handle() {
    let dir = tempfile::tempdir().unwrap();
    let path = create_fixture(&dir).await;
    let profile = ConnectionProfile::Local { path };

    let mut session = Session::new();
    let first = session.connect(&profile).await.unwrap();
    let second = session.connect(&profile).await.unwrap();

    assert!(std::sync::Arc::ptr_eq(&first, &second));
}
