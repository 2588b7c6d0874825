//! Integration tests for sqlchat.

pub mod local_db_test;
pub mod profile_test;
pub mod session_test;
