//! Bookkeeping tables owned by the runner.
//!
//! Executed at connection startup. The contact tables themselves are created
//! only by changesets.

/// Idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const BOOKKEEPING: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per applied changeset.
CREATE TABLE IF NOT EXISTS rolodex_migrations (
    version     INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    checksum    TEXT NOT NULL,   -- hex SHA-256 of the forward operations
    applied_at  TEXT NOT NULL    -- RFC 3339 UTC
);

-- Last surrogate key handed out per table. Survives the table being
-- dropped and recreated so keys are never reused.
CREATE TABLE IF NOT EXISTS rolodex_sequences (
    table_name  TEXT PRIMARY KEY,
    last_id     INTEGER NOT NULL
);
";

/// Prefix of the shadow table used when a table is rebuilt.
pub const REBUILD_PREFIX: &str = "rolodex_rebuild_";
