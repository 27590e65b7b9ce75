//! Extraction pass
//!
//! Streams sentences in reading order, extracts toponym matches, resolves
//! each to a place identity, and links the mention. A failing sentence is
//! recorded as an outcome and skipped; the pass never aborts. Each
//! sentence commits independently, so a terminated run resumes cleanly.

use tracing::{debug, warn};

use chizu_core::{NewMention, PipelineConfig, Result, Sentence};
use chizu_extractor::PlaceExtractor;
use chizu_store::{MentionStore, PlaceStore, SentenceStore, SqliteStore};

/// Sentences that slipped through ingestion as raw markup are not prose
const HTML_MARKERS: &[&str] = &[
    "<html", "<head>", "<meta", "<title>", "<body>", "<div", "<p>", "<script", "<style", "<link",
];

fn is_html_content(text: &str) -> bool {
    let lower = text.to_lowercase();
    HTML_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Truncate to at most `cap` characters on a character boundary
fn truncate_chars(text: &str, cap: usize) -> String {
    text.chars().take(cap).collect()
}

/// A sentence whose processing failed; the pass moved on
#[derive(Debug, Clone)]
pub struct SentenceFailure {
    pub sentence_id: i64,
    pub reason: String,
}

/// Batch summary of one extraction pass
#[derive(Debug, Clone, Default)]
pub struct ExtractionSummary {
    /// Sentences that went through extraction
    pub processed: usize,

    /// Sentences skipped as markup or below the minimum length
    pub skipped: usize,

    /// Raw matches produced across all sentences
    pub matches: usize,

    /// New place identities created
    pub places_created: usize,

    /// New mention links created (duplicate pairs are no-ops)
    pub links_created: usize,

    pub failures: Vec<SentenceFailure>,
}

#[derive(Default)]
struct SentenceTally {
    matches: usize,
    places_created: usize,
    links_created: usize,
}

/// Runs extraction over the whole sentence corpus
pub struct ExtractionPass<'a> {
    store: &'a SqliteStore,
    extractor: Box<dyn PlaceExtractor>,
    config: PipelineConfig,
}

impl<'a> ExtractionPass<'a> {
    pub fn new(
        store: &'a SqliteStore,
        extractor: Box<dyn PlaceExtractor>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            extractor,
            config,
        }
    }

    /// Process every sentence, in order by work then position
    pub async fn run(&self) -> Result<ExtractionSummary> {
        let sentences = self.store.sentences_in_reading_order().await?;
        tracing::info!("extraction pass over {} sentences", sentences.len());

        let mut summary = ExtractionSummary::default();

        for sentence in &sentences {
            let text = sentence.sentence_text.trim();

            if is_html_content(text) || text.chars().count() < self.config.min_sentence_chars {
                summary.skipped += 1;
                continue;
            }

            match self.process_sentence(sentence).await {
                Ok(tally) => {
                    summary.processed += 1;
                    summary.matches += tally.matches;
                    summary.places_created += tally.places_created;
                    summary.links_created += tally.links_created;
                }
                Err(e) => {
                    warn!(
                        sentence_id = sentence.sentence_id,
                        "sentence processing failed: {e}"
                    );
                    summary.failures.push(SentenceFailure {
                        sentence_id: sentence.sentence_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(summary)
    }

    async fn process_sentence(&self, sentence: &Sentence) -> Result<SentenceTally> {
        let matches = self.extractor.extract(&sentence.sentence_text);
        let mut tally = SentenceTally {
            matches: matches.len(),
            ..Default::default()
        };

        for m in matches {
            let (place, created) = self.store.resolve(&m.text, m.confidence).await?;
            if created {
                debug!(place = %place.place_name, rule = %m.rule_label, "new place");
                tally.places_created += 1;
            }

            let mention = NewMention {
                sentence_id: sentence.sentence_id,
                place_id: place.place_id,
                extraction_method: m.rule_label,
                confidence: m.confidence,
                context_before: sentence
                    .before_text
                    .as_deref()
                    .map(|t| truncate_chars(t, self.config.context_cap)),
                context_after: sentence
                    .after_text
                    .as_deref()
                    .map(|t| truncate_chars(t, self.config.context_cap)),
                matched_text: m.text,
            };

            if self.store.link(&mention).await? {
                tally.links_created += 1;
            }
        }

        Ok(tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_detection() {
        assert!(is_html_content("<html><body>本文</body></html>"));
        assert!(is_html_content("<DIV class=\"x\">"));
        assert!(!is_html_content("鎌倉の大仏を見たときのことである"));
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        let long = "あ".repeat(300);
        let truncated = truncate_chars(&long, 200);
        assert_eq!(truncated.chars().count(), 200);

        assert_eq!(truncate_chars("短い", 200), "短い");
    }
}
