//! Aggregate reporting queries
//!
//! Corpus-wide counts, per-work mention totals, and the most-mentioned
//! places, used by the report renderer after a pipeline run.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use chizu_core::{ChizuError, Result};

use crate::SqliteStore;

/// Corpus-wide counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusStats {
    pub sentences: i64,
    pub mentions: i64,
    pub unique_places: i64,
    pub geocoded_places: i64,
}

impl CorpusStats {
    /// Geocoding success rate as a percentage of unique places
    pub fn geocoding_rate(&self) -> f64 {
        if self.unique_places == 0 {
            0.0
        } else {
            self.geocoded_places as f64 / self.unique_places as f64 * 100.0
        }
    }
}

/// Mention totals for a single work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkStats {
    pub work_id: i64,
    pub author: String,
    pub title: String,
    pub mention_count: i64,
}

/// A place with its mention count and coordinates, for top-N listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceCount {
    pub place_name: String,
    pub mentions: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Read-only aggregate queries
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn corpus_stats(&self) -> Result<CorpusStats>;

    /// Per-work mention totals, most-mentioned first
    async fn work_stats(&self) -> Result<Vec<WorkStats>>;

    /// The `limit` most-mentioned places
    async fn top_places(&self, limit: i64) -> Result<Vec<PlaceCount>>;
}

async fn count(pool: &sqlx::SqlitePool, sql: &str) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(sql)
        .fetch_one(pool)
        .await
        .map_err(|e| ChizuError::Database(format!("Failed to count: {e}")))
}

#[async_trait]
impl ReportStore for SqliteStore {
    async fn corpus_stats(&self) -> Result<CorpusStats> {
        Ok(CorpusStats {
            sentences: count(self.pool(), "SELECT COUNT(*) FROM sentences").await?,
            mentions: count(self.pool(), "SELECT COUNT(*) FROM sentence_places").await?,
            unique_places: count(self.pool(), "SELECT COUNT(*) FROM places_master").await?,
            geocoded_places: count(
                self.pool(),
                "SELECT COUNT(*) FROM places_master \
                 WHERE latitude IS NOT NULL AND longitude IS NOT NULL",
            )
            .await?,
        })
    }

    async fn work_stats(&self) -> Result<Vec<WorkStats>> {
        let rows: Vec<(i64, String, String, i64)> = sqlx::query_as(
            r#"
            SELECT w.work_id, a.name, w.title, COUNT(sp.sentence_place_id)
            FROM works w
            JOIN authors a ON a.author_id = w.author_id
            LEFT JOIN sentences s ON s.work_id = w.work_id
            LEFT JOIN sentence_places sp ON sp.sentence_id = s.sentence_id
            GROUP BY w.work_id, a.name, w.title
            ORDER BY COUNT(sp.sentence_place_id) DESC, w.work_id
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| ChizuError::Database(format!("Failed to load work stats: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(work_id, author, title, mention_count)| WorkStats {
                work_id,
                author,
                title,
                mention_count,
            })
            .collect())
    }

    async fn top_places(&self, limit: i64) -> Result<Vec<PlaceCount>> {
        let rows: Vec<(String, i64, Option<f64>, Option<f64>)> = sqlx::query_as(
            r#"
            SELECT p.place_name, COUNT(sp.sentence_place_id), p.latitude, p.longitude
            FROM places_master p
            LEFT JOIN sentence_places sp ON sp.place_id = p.place_id
            GROUP BY p.place_id
            ORDER BY COUNT(sp.sentence_place_id) DESC, p.place_name
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(|e| ChizuError::Database(format!("Failed to load top places: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(place_name, mentions, latitude, longitude)| PlaceCount {
                place_name,
                mentions,
                latitude,
                longitude,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MentionStore, PlaceStore};
    use chizu_core::NewMention;

    async fn seed_corpus(store: &SqliteStore) {
        sqlx::query("INSERT INTO authors (author_id, name) VALUES (1, '夏目漱石')")
            .execute(store.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO works (work_id, author_id, title) VALUES (1, 1, '草枕')")
            .execute(store.pool())
            .await
            .unwrap();
        for (id, text) in [(1, "鎌倉の大仏を見た"), (2, "東京都へ発った")] {
            sqlx::query(
                "INSERT INTO sentences (sentence_id, work_id, sentence_text, position_in_work)
                 VALUES (?, 1, ?, ?)",
            )
            .bind(id)
            .bind(text)
            .bind(id)
            .execute(store.pool())
            .await
            .unwrap();
        }
    }

    fn mention(sentence_id: i64, place_id: i64, text: &str) -> NewMention {
        NewMention {
            sentence_id,
            place_id,
            extraction_method: "regex_landmark".to_string(),
            confidence: 0.9,
            context_before: None,
            context_after: None,
            matched_text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_corpus_stats() {
        let store = SqliteStore::in_memory().await.unwrap();
        seed_corpus(&store).await;

        let (kamakura, _) = store.resolve("鎌倉", 0.9).await.unwrap();
        let (tokyo, _) = store.resolve("東京都", 0.95).await.unwrap();
        store.link(&mention(1, kamakura.place_id, "鎌倉")).await.unwrap();
        store.link(&mention(2, tokyo.place_id, "東京都")).await.unwrap();

        store
            .record_coordinates(
                tokyo.place_id,
                chizu_core::Coordinates::new(35.6895, 139.6917),
                chrono::Utc::now(),
            )
            .await
            .unwrap();

        let stats = store.corpus_stats().await.unwrap();
        assert_eq!(stats.sentences, 2);
        assert_eq!(stats.mentions, 2);
        assert_eq!(stats.unique_places, 2);
        assert_eq!(stats.geocoded_places, 1);
        assert!((stats.geocoding_rate() - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_corpus_rate_is_zero() {
        let store = SqliteStore::in_memory().await.unwrap();
        let stats = store.corpus_stats().await.unwrap();
        assert_eq!(stats.unique_places, 0);
        assert_eq!(stats.geocoding_rate(), 0.0);
    }

    #[tokio::test]
    async fn test_work_stats_and_top_places() {
        let store = SqliteStore::in_memory().await.unwrap();
        seed_corpus(&store).await;

        let (kamakura, _) = store.resolve("鎌倉", 0.9).await.unwrap();
        store.link(&mention(1, kamakura.place_id, "鎌倉")).await.unwrap();
        store.link(&mention(2, kamakura.place_id, "鎌倉")).await.unwrap();
        store.resolve("不明地", 0.7).await.unwrap();

        let works = store.work_stats().await.unwrap();
        assert_eq!(works.len(), 1);
        assert_eq!(works[0].author, "夏目漱石");
        assert_eq!(works[0].mention_count, 2);

        let top = store.top_places(10).await.unwrap();
        assert_eq!(top[0].place_name, "鎌倉");
        assert_eq!(top[0].mentions, 2);
        assert_eq!(top[1].mentions, 0);
    }
}
