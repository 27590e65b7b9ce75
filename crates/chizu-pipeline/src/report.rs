//! Report rendering
//!
//! Gathers the aggregate statistics after a run and renders them as text
//! for the console.

use chizu_core::Result;
use chizu_store::{CorpusStats, PlaceCount, ReportStore, SqliteStore, WorkStats};

/// Aggregate statistics for a corpus, ready to render
#[derive(Debug, Clone)]
pub struct Report {
    pub corpus: CorpusStats,
    pub works: Vec<WorkStats>,
    pub top_places: Vec<PlaceCount>,
}

impl Report {
    /// Collect statistics from the store
    pub async fn gather(store: &SqliteStore, top_n: i64) -> Result<Self> {
        Ok(Self {
            corpus: store.corpus_stats().await?,
            works: store.work_stats().await?,
            top_places: store.top_places(top_n).await?,
        })
    }

    /// Render as console text
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("=== Toponym extraction report ===\n");
        out.push_str(&format!("Sentences:        {}\n", self.corpus.sentences));
        out.push_str(&format!("Place mentions:   {}\n", self.corpus.mentions));
        out.push_str(&format!("Unique places:    {}\n", self.corpus.unique_places));
        out.push_str(&format!(
            "Geocoded places:  {} ({:.1}%)\n",
            self.corpus.geocoded_places,
            self.corpus.geocoding_rate()
        ));

        if !self.works.is_empty() {
            out.push_str("\n--- Mentions per work ---\n");
            for work in &self.works {
                out.push_str(&format!(
                    "{:>6}  {} / {}\n",
                    work.mention_count, work.author, work.title
                ));
            }
        }

        if !self.top_places.is_empty() {
            out.push_str("\n--- Most mentioned places ---\n");
            for place in &self.top_places {
                let coords = match (place.latitude, place.longitude) {
                    (Some(lat), Some(lon)) => format!("({lat:.4}, {lon:.4})"),
                    _ => "(not geocoded)".to_string(),
                };
                out.push_str(&format!(
                    "{:>6}  {} {}\n",
                    place.mentions, place.place_name, coords
                ));
            }
        }

        out
    }
}
