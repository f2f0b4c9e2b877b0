//! SQL schema for the SQLite feed store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS activities (
    activity_id  TEXT PRIMARY KEY,
    actor_type   TEXT,
    actor_id     TEXT,
    verb         TEXT NOT NULL,
    object_type  TEXT,
    object_id    TEXT,
    target_type  TEXT,
    target_id    TEXT,
    data         TEXT,            -- free-form JSON payload or NULL
    published_at TEXT,            -- ISO 8601 UTC; NULL means unpublished
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    deleted_at   TEXT             -- soft-delete marker
);

-- One row per activity family per context. family_hash is derived from
-- activity fields and re-derivable at any time; the row only tracks which
-- member was saved last.
CREATE TABLE IF NOT EXISTS groupings (
    grouping_id TEXT PRIMARY KEY,
    activity_id TEXT NOT NULL REFERENCES activities(activity_id),
    family_hash TEXT NOT NULL,
    context     TEXT,             -- NULL is the default context
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- SQL NULLs compare distinct, so (family_hash, context) uniqueness needs a
-- partial index per nullability case.
CREATE UNIQUE INDEX IF NOT EXISTS groupings_default_context_idx
    ON groupings(family_hash) WHERE context IS NULL;
CREATE UNIQUE INDEX IF NOT EXISTS groupings_named_context_idx
    ON groupings(family_hash, context) WHERE context IS NOT NULL;

CREATE INDEX IF NOT EXISTS activities_actor_idx     ON activities(actor_type, actor_id);
CREATE INDEX IF NOT EXISTS activities_object_idx    ON activities(object_type, object_id);
CREATE INDEX IF NOT EXISTS activities_target_idx    ON activities(target_type, target_id);
CREATE INDEX IF NOT EXISTS activities_verb_idx      ON activities(verb);
CREATE INDEX IF NOT EXISTS activities_published_idx ON activities(published_at);

PRAGMA user_version = 1;
";
