//! SQL schema for the debate SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

-- Projection of externally-authenticated users.
CREATE TABLE IF NOT EXISTS users (
    user_id      TEXT PRIMARY KEY,
    display_name TEXT,
    wins_count   INTEGER NOT NULL DEFAULT 0 CHECK (wins_count >= 0),
    created_at   TEXT NOT NULL
);

-- Debates are never deleted. Only the close transition updates a row.
CREATE TABLE IF NOT EXISTS debates (
    debate_id         TEXT PRIMARY KEY,
    topic             TEXT NOT NULL,
    day_number        INTEGER NOT NULL UNIQUE CHECK (day_number > 0),
    status            TEXT NOT NULL CHECK (status IN ('active', 'closed')),
    created_at        TEXT NOT NULL,   -- RFC 3339 UTC, microseconds
    closed_at         TEXT,
    winning_entry_id  TEXT,
    winner_commentary TEXT
);

-- At most one active debate, enforced by the index itself.
CREATE UNIQUE INDEX IF NOT EXISTS debates_one_active_idx
    ON debates(status) WHERE status = 'active';

-- Entries are never deleted. Only vote_count changes after insert, and only
-- inside the same transaction that adds or removes a vote row.
CREATE TABLE IF NOT EXISTS entries (
    entry_id   TEXT PRIMARY KEY,
    debate_id  TEXT NOT NULL REFERENCES debates(debate_id),
    user_id    TEXT NOT NULL REFERENCES users(user_id),
    content    TEXT NOT NULL,
    approved   INTEGER NOT NULL DEFAULT 1,
    vote_count INTEGER NOT NULL DEFAULT 0 CHECK (vote_count >= 0),
    created_at TEXT NOT NULL
);

-- Live votes. debate_id is denormalised from the entry so that the
-- one-vote-per-debate rule is a constraint, not just a check.
CREATE TABLE IF NOT EXISTS votes (
    vote_id    TEXT PRIMARY KEY,
    entry_id   TEXT NOT NULL REFERENCES entries(entry_id),
    debate_id  TEXT NOT NULL REFERENCES debates(debate_id),
    user_id    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (entry_id, user_id),
    UNIQUE (debate_id, user_id)
);

CREATE INDEX IF NOT EXISTS entries_debate_idx ON entries(debate_id);
CREATE INDEX IF NOT EXISTS entries_user_idx   ON entries(user_id);
CREATE INDEX IF NOT EXISTS votes_entry_idx    ON votes(entry_id);

PRAGMA user_version = 1;
";
