//! v001 -- Initial schema creation.
//!
//! Creates the `dreams` journal table.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS dreams (
    id                      TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    description             TEXT NOT NULL,
    refined_description     TEXT,
    did_wake_up             INTEGER,                    -- tri-state: NULL / 0 / 1
    had_negative_emotions   INTEGER,                    -- tri-state: NULL / 0 / 1
    intensity_level         INTEGER NOT NULL,           -- 1..=10
    created_at              TEXT NOT NULL,              -- RFC-3339, UTC
    dream_name              TEXT NOT NULL,
    quick_overview          TEXT NOT NULL,
    in_depth_interpretation TEXT NOT NULL,
    daily_life_connection   TEXT NOT NULL,
    recommendations         TEXT NOT NULL,
    feeling_rating          INTEGER,                    -- 1..=5
    star_rating             INTEGER                     -- 0..=5
);

CREATE INDEX IF NOT EXISTS idx_dreams_created_at ON dreams(created_at DESC);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
