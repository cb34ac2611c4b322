//! v001 -- Initial schema creation.
//!
//! Creates the `recipes` table.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Recipes
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS recipes (
    id           TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    name         TEXT NOT NULL CHECK (length(trim(name)) > 0),
    ingredients  TEXT NOT NULL,               -- JSON array of strings, display order
    instructions TEXT NOT NULL,               -- JSON array of strings, execution order
    image        BLOB                         -- encoded photo, nullable
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
