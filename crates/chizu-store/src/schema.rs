//! Database schema provisioning
//!
//! `authors`, `works`, and `sentences` are owned by the external ingestion
//! pipeline and are read-only from this crate; they are provisioned here so
//! development and test databases can be created from scratch.

use sqlx::SqlitePool;

use chizu_core::{ChizuError, Result};

/// Create all tables and indexes if they do not exist
pub async fn provision(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| ChizuError::Database(format!("Schema provisioning failed: {e}")))?;
    }

    Ok(())
}

const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS authors (
        author_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS works (
        work_id INTEGER PRIMARY KEY AUTOINCREMENT,
        author_id INTEGER NOT NULL REFERENCES authors(author_id),
        title TEXT NOT NULL,
        sentence_count INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sentences (
        sentence_id INTEGER PRIMARY KEY AUTOINCREMENT,
        work_id INTEGER NOT NULL REFERENCES works(work_id),
        sentence_text TEXT NOT NULL,
        before_text TEXT,
        after_text TEXT,
        position_in_work INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS places_master (
        place_id INTEGER PRIMARY KEY AUTOINCREMENT,
        place_name TEXT NOT NULL UNIQUE,
        canonical_name TEXT NOT NULL,
        place_type TEXT NOT NULL,
        confidence REAL NOT NULL,
        latitude REAL,
        longitude REAL,
        verification_status TEXT,
        geocoded_at TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sentence_places (
        sentence_place_id INTEGER PRIMARY KEY AUTOINCREMENT,
        sentence_id INTEGER NOT NULL REFERENCES sentences(sentence_id),
        place_id INTEGER NOT NULL REFERENCES places_master(place_id),
        extraction_method TEXT NOT NULL,
        confidence REAL NOT NULL,
        context_before TEXT,
        context_after TEXT,
        matched_text TEXT NOT NULL,
        created_at TIMESTAMP NOT NULL,
        UNIQUE(sentence_id, place_id)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_sentences_work_position
    ON sentences(work_id, position_in_work)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_sentence_places_place
    ON sentence_places(place_id)
    "#,
];
