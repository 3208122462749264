//! Database schema and migrations for depot.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: users table with quota counters
    r#"
-- Users table; quota counters live on the user row
CREATE TABLE users (
    id                        INTEGER PRIMARY KEY AUTOINCREMENT,
    email                     TEXT NOT NULL,
    files_uploaded            INTEGER NOT NULL DEFAULT 0,
    last_download_time        TEXT NOT NULL,
    bytes_read_on_last_minute INTEGER NOT NULL DEFAULT 0,
    created_at                TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_users_email ON users(email);
"#,
    // v2: files table
    r#"
-- File catalog; uri is the public identifier, id gives insertion order
CREATE TABLE files (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    uri         TEXT NOT NULL UNIQUE,
    name        TEXT NOT NULL,
    size        INTEGER NOT NULL,
    user_id     INTEGER NOT NULL REFERENCES users(id),
    uploaded_on TEXT NOT NULL,
    UNIQUE (user_id, name)
);

CREATE INDEX idx_files_user_id ON files(user_id);
CREATE INDEX idx_files_uri ON files(uri);
"#,
];
