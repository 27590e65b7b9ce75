//! Chizu Store - SQLite persistence
//!
//! Provides the sentence, place, and mention-link stores over a shared
//! `sqlx` connection pool. Place resolution and mention linking are
//! idempotent, so a terminated run can always be resumed.

pub mod reporting;
pub mod schema;

pub use reporting::{CorpusStats, PlaceCount, ReportStore, WorkStats};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;

use chizu_core::{
    ChizuError, Coordinates, MentionContext, NewMention, Place, Result, Sentence,
};

/// Category assigned to identities at creation; the rule label that
/// produced the match is retained only on the link
const GENERIC_PLACE_TYPE: &str = "地名";

/// SQLite-backed store implementing all persistence traits
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open a store at the given SQLite URL, creating the file if missing
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| ChizuError::Database(format!("Invalid database URL: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| ChizuError::Database(format!("SQLite connection failed: {e}")))?;

        Ok(Self { pool })
    }

    /// Open a fresh in-memory store with the schema provisioned
    ///
    /// A single connection is used so the database survives for the life
    /// of the pool.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| ChizuError::Database(format!("SQLite connection failed: {e}")))?;

        let store = Self { pool };
        schema::provision(&store.pool).await?;
        Ok(store)
    }

    /// Create from an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(Debug, FromRow)]
struct SentenceRow {
    sentence_id: i64,
    work_id: i64,
    sentence_text: String,
    before_text: Option<String>,
    after_text: Option<String>,
    position_in_work: i64,
}

impl From<SentenceRow> for Sentence {
    fn from(row: SentenceRow) -> Self {
        Sentence {
            sentence_id: row.sentence_id,
            work_id: row.work_id,
            sentence_text: row.sentence_text,
            before_text: row.before_text,
            after_text: row.after_text,
            position_in_work: row.position_in_work,
        }
    }
}

#[derive(Debug, FromRow)]
struct PlaceRow {
    place_id: i64,
    place_name: String,
    canonical_name: String,
    place_type: String,
    confidence: f64,
    latitude: Option<f64>,
    longitude: Option<f64>,
    verification_status: Option<String>,
    geocoded_at: Option<DateTime<Utc>>,
}

impl From<PlaceRow> for Place {
    fn from(row: PlaceRow) -> Self {
        Place {
            place_id: row.place_id,
            place_name: row.place_name,
            canonical_name: row.canonical_name,
            place_type: row.place_type,
            confidence: row.confidence,
            latitude: row.latitude,
            longitude: row.longitude,
            verification_status: row.verification_status,
            geocoded_at: row.geocoded_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ContextRow {
    sentence_text: String,
    context_before: Option<String>,
    context_after: Option<String>,
}

const PLACE_COLUMNS: &str = "place_id, place_name, canonical_name, place_type, confidence, \
     latitude, longitude, verification_status, geocoded_at";

// ============================================================================
// Traits
// ============================================================================

/// Read access to the sentence corpus
#[async_trait]
pub trait SentenceStore: Send + Sync {
    /// All sentences ordered by work, then position within the work
    async fn sentences_in_reading_order(&self) -> Result<Vec<Sentence>>;
}

/// Place identity resolution and coordinate updates
#[async_trait]
pub trait PlaceStore: Send + Sync {
    /// Return the place with this exact canonical name, creating it on
    /// first sight; the boolean is true when a new identity was created
    async fn resolve(&self, name: &str, confidence: f64) -> Result<(Place, bool)>;

    /// Look up a place by canonical name without creating it
    async fn find_by_name(&self, name: &str) -> Result<Option<Place>>;

    /// Places still lacking coordinates, ordered by canonical name
    async fn awaiting_coordinates(&self) -> Result<Vec<Place>>;

    /// Attach coordinates, mark the place verified, and stamp the
    /// geocoding time
    async fn record_coordinates(
        &self,
        place_id: i64,
        coords: Coordinates,
        at: DateTime<Utc>,
    ) -> Result<()>;
}

/// Insert-only (sentence, place) mention links
#[async_trait]
pub trait MentionStore: Send + Sync {
    /// Insert the link unless one already exists for the (sentence, place)
    /// pair; returns whether a new link was created
    async fn link(&self, mention: &NewMention) -> Result<bool>;

    /// Sentence text and context of the highest-confidence mention of a
    /// place, or `None` when the place has no links
    async fn best_context_for(&self, place_id: i64) -> Result<Option<MentionContext>>;
}

// ============================================================================
// Implementations
// ============================================================================

#[async_trait]
impl SentenceStore for SqliteStore {
    async fn sentences_in_reading_order(&self) -> Result<Vec<Sentence>> {
        let rows: Vec<SentenceRow> = sqlx::query_as(
            r#"
            SELECT sentence_id, work_id, sentence_text, before_text, after_text, position_in_work
            FROM sentences
            ORDER BY work_id, position_in_work
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChizuError::Database(format!("Failed to load sentences: {e}")))?;

        Ok(rows.into_iter().map(Sentence::from).collect())
    }
}

#[async_trait]
impl PlaceStore for SqliteStore {
    async fn resolve(&self, name: &str, confidence: f64) -> Result<(Place, bool)> {
        // Lookup and insert share one transaction so a pass cannot create
        // two identities for the same canonical name
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ChizuError::Database(format!("Failed to begin transaction: {e}")))?;

        let existing: Option<PlaceRow> = sqlx::query_as(&format!(
            "SELECT {PLACE_COLUMNS} FROM places_master WHERE place_name = ?"
        ))
        .bind(name)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| ChizuError::Database(format!("Failed to look up place: {e}")))?;

        if let Some(row) = existing {
            tx.commit()
                .await
                .map_err(|e| ChizuError::Database(format!("Failed to commit: {e}")))?;
            return Ok((Place::from(row), false));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO places_master (place_name, canonical_name, place_type, confidence)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(name)
        .bind(GENERIC_PLACE_TYPE)
        .bind(confidence)
        .execute(&mut *tx)
        .await
        .map_err(|e| ChizuError::Database(format!("Failed to create place: {e}")))?;

        let place_id = result.last_insert_rowid();

        tx.commit()
            .await
            .map_err(|e| ChizuError::Database(format!("Failed to commit: {e}")))?;

        let place = Place {
            place_id,
            place_name: name.to_string(),
            canonical_name: name.to_string(),
            place_type: GENERIC_PLACE_TYPE.to_string(),
            confidence,
            latitude: None,
            longitude: None,
            verification_status: None,
            geocoded_at: None,
        };

        Ok((place, true))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Place>> {
        let row: Option<PlaceRow> = sqlx::query_as(&format!(
            "SELECT {PLACE_COLUMNS} FROM places_master WHERE place_name = ?"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChizuError::Database(format!("Failed to look up place: {e}")))?;

        Ok(row.map(Place::from))
    }

    async fn awaiting_coordinates(&self) -> Result<Vec<Place>> {
        let rows: Vec<PlaceRow> = sqlx::query_as(&format!(
            r#"
            SELECT {PLACE_COLUMNS}
            FROM places_master
            WHERE latitude IS NULL OR longitude IS NULL
            ORDER BY place_name
            "#
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChizuError::Database(format!("Failed to select places: {e}")))?;

        Ok(rows.into_iter().map(Place::from).collect())
    }

    async fn record_coordinates(
        &self,
        place_id: i64,
        coords: Coordinates,
        at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE places_master
            SET latitude = ?, longitude = ?, verification_status = 'verified', geocoded_at = ?
            WHERE place_id = ?
            "#,
        )
        .bind(coords.latitude)
        .bind(coords.longitude)
        .bind(at)
        .bind(place_id)
        .execute(&self.pool)
        .await
        .map_err(|e| ChizuError::Database(format!("Failed to record coordinates: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl MentionStore for SqliteStore {
    async fn link(&self, mention: &NewMention) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO sentence_places
                (sentence_id, place_id, extraction_method, confidence,
                 context_before, context_after, matched_text, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(mention.sentence_id)
        .bind(mention.place_id)
        .bind(&mention.extraction_method)
        .bind(mention.confidence)
        .bind(&mention.context_before)
        .bind(&mention.context_after)
        .bind(&mention.matched_text)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| ChizuError::Database(format!("Failed to link mention: {e}")))?;

        Ok(result.rows_affected() == 1)
    }

    async fn best_context_for(&self, place_id: i64) -> Result<Option<MentionContext>> {
        let row: Option<ContextRow> = sqlx::query_as(
            r#"
            SELECT s.sentence_text, sp.context_before, sp.context_after
            FROM sentence_places sp
            JOIN sentences s ON s.sentence_id = sp.sentence_id
            WHERE sp.place_id = ?
            ORDER BY sp.confidence DESC, sp.sentence_place_id
            LIMIT 1
            "#,
        )
        .bind(place_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChizuError::Database(format!("Failed to load mention context: {e}")))?;

        Ok(row.map(|r| MentionContext {
            sentence_text: r.sentence_text,
            context_before: r.context_before.unwrap_or_default(),
            context_after: r.context_after.unwrap_or_default(),
        }))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_sentence(store: &SqliteStore, text: &str, position: i64) -> i64 {
        sqlx::query("INSERT OR IGNORE INTO authors (author_id, name) VALUES (1, '夏目漱石')")
            .execute(store.pool())
            .await
            .unwrap();
        sqlx::query("INSERT OR IGNORE INTO works (work_id, author_id, title) VALUES (1, 1, '草枕')")
            .execute(store.pool())
            .await
            .unwrap();

        sqlx::query(
            "INSERT INTO sentences (work_id, sentence_text, before_text, after_text, position_in_work)
             VALUES (1, ?, '前の文', '次の文', ?)",
        )
        .bind(text)
        .bind(position)
        .execute(store.pool())
        .await
        .unwrap()
        .last_insert_rowid()
    }

    fn mention(sentence_id: i64, place_id: i64, confidence: f64) -> NewMention {
        NewMention {
            sentence_id,
            place_id,
            extraction_method: "regex_landmark".to_string(),
            confidence,
            context_before: Some("前の文".to_string()),
            context_after: Some("次の文".to_string()),
            matched_text: "鎌倉".to_string(),
        }
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let store = SqliteStore::in_memory().await.unwrap();

        let (first, created_first) = store.resolve("鎌倉", 0.9).await.unwrap();
        let (second, created_second) = store.resolve("鎌倉", 0.8).await.unwrap();

        assert!(created_first);
        assert!(!created_second);
        assert_eq!(first.place_id, second.place_id);
        // First-seen confidence is kept
        assert_eq!(second.confidence, 0.9);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM places_master")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_resolve_sets_generic_type() {
        let store = SqliteStore::in_memory().await.unwrap();
        let (place, _) = store.resolve("水戸市", 0.85).await.unwrap();

        assert_eq!(place.place_type, "地名");
        assert_eq!(place.canonical_name, "水戸市");
        assert!(place.awaits_coordinates());
    }

    #[tokio::test]
    async fn test_link_is_idempotent() {
        let store = SqliteStore::in_memory().await.unwrap();
        let sentence_id = seed_sentence(&store, "鎌倉の大仏を見た", 1).await;
        let (place, _) = store.resolve("鎌倉", 0.9).await.unwrap();

        let first = store.link(&mention(sentence_id, place.place_id, 0.9)).await.unwrap();
        let second = store.link(&mention(sentence_id, place.place_id, 0.9)).await.unwrap();

        assert!(first);
        assert!(!second);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sentence_places")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_duplicate_pair_keeps_first_provenance() {
        let store = SqliteStore::in_memory().await.unwrap();
        let sentence_id = seed_sentence(&store, "富士山を見上げた", 1).await;
        let (place, _) = store.resolve("富士山", 0.9).await.unwrap();

        store.link(&mention(sentence_id, place.place_id, 0.9)).await.unwrap();

        let mut later = mention(sentence_id, place.place_id, 0.8);
        later.extraction_method = "regex_terrain".to_string();
        let created = store.link(&later).await.unwrap();
        assert!(!created);

        let method: String =
            sqlx::query_scalar("SELECT extraction_method FROM sentence_places WHERE place_id = ?")
                .bind(place.place_id)
                .fetch_one(store.pool())
                .await
                .unwrap();
        assert_eq!(method, "regex_landmark");
    }

    #[tokio::test]
    async fn test_awaiting_coordinates_ordered_by_name() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.resolve("鎌倉", 0.9).await.unwrap();
        store.resolve("博多", 0.9).await.unwrap();
        let (tokyo, _) = store.resolve("東京都", 0.95).await.unwrap();

        store
            .record_coordinates(tokyo.place_id, Coordinates::new(35.6895, 139.6917), Utc::now())
            .await
            .unwrap();

        let pending = store.awaiting_coordinates().await.unwrap();
        let names: Vec<&str> = pending.iter().map(|p| p.place_name.as_str()).collect();

        // 東京都 is geocoded and no longer selected; the rest sort by name
        assert_eq!(names, vec!["博多", "鎌倉"]);
    }

    #[tokio::test]
    async fn test_record_coordinates_marks_verified() {
        let store = SqliteStore::in_memory().await.unwrap();
        let (place, _) = store.resolve("鎌倉", 0.9).await.unwrap();

        let at = Utc::now();
        store
            .record_coordinates(place.place_id, Coordinates::new(35.3192, 139.5467), at)
            .await
            .unwrap();

        let reloaded = store.find_by_name("鎌倉").await.unwrap().unwrap();
        assert_eq!(reloaded.latitude, Some(35.3192));
        assert_eq!(reloaded.longitude, Some(139.5467));
        assert_eq!(reloaded.verification_status.as_deref(), Some("verified"));
        assert!(reloaded.geocoded_at.is_some());
        assert!(!reloaded.awaits_coordinates());
    }

    #[tokio::test]
    async fn test_best_context_prefers_highest_confidence() {
        let store = SqliteStore::in_memory().await.unwrap();
        let low_id = seed_sentence(&store, "鎌倉らしい", 1).await;
        let high_id = seed_sentence(&store, "鎌倉に滞在した", 2).await;
        let (place, _) = store.resolve("鎌倉", 0.9).await.unwrap();

        store.link(&mention(low_id, place.place_id, 0.5)).await.unwrap();
        store.link(&mention(high_id, place.place_id, 0.9)).await.unwrap();

        let context = store.best_context_for(place.place_id).await.unwrap().unwrap();
        assert_eq!(context.sentence_text, "鎌倉に滞在した");
        assert_eq!(context.context_before, "前の文");
    }

    #[tokio::test]
    async fn test_best_context_none_without_links() {
        let store = SqliteStore::in_memory().await.unwrap();
        let (place, _) = store.resolve("不明地", 0.7).await.unwrap();

        assert!(store.best_context_for(place.place_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sentences_in_reading_order() {
        let store = SqliteStore::in_memory().await.unwrap();
        seed_sentence(&store, "二番目の文", 2).await;
        seed_sentence(&store, "最初の文", 1).await;

        let sentences = store.sentences_in_reading_order().await.unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].sentence_text, "最初の文");
        assert_eq!(sentences[1].sentence_text, "二番目の文");
    }
}
