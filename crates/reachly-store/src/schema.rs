/// SQL DDL for the Reachly context store.
/// WAL mode + foreign keys enabled at connection time.
pub const SCHEMA_VERSION: u32 = 1;

pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS prospects (
    id TEXT PRIMARY KEY,
    name TEXT,
    role TEXT,
    company TEXT,
    industry TEXT,
    seniority TEXT,
    summary TEXT NOT NULL,
    style TEXT NOT NULL,
    raw_profile TEXT NOT NULL,
    source TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    prospect_id TEXT NOT NULL REFERENCES prospects(id),
    channel TEXT NOT NULL,
    followup_stage INTEGER CHECK (followup_stage IS NULL OR followup_stage BETWEEN 1 AND 3),
    content TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_prospects_created ON prospects(created_at);
CREATE INDEX IF NOT EXISTS idx_prospects_industry ON prospects(industry);
CREATE INDEX IF NOT EXISTS idx_prospects_role ON prospects(role);
CREATE INDEX IF NOT EXISTS idx_messages_prospect ON messages(prospect_id, created_at);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);
"#;

pub const PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;
PRAGMA synchronous = NORMAL;
"#;

/// Column list shared by every full-prospect query, in [`crate::prospects`] read order.
pub const PROSPECT_COLUMNS: &str =
    "id, name, role, company, industry, seniority, summary, style, raw_profile, source, created_at";

pub const MESSAGE_COLUMNS: &str = "id, prospect_id, channel, followup_stage, content, created_at";
