//! Chizu Extractor - Rule-based toponym extraction
//!
//! Applies an ordered pattern catalog to segmented sentences, producing raw
//! place matches with position and provenance. Matching is purely textual:
//! no external calls, no blocking, and an empty result is never an error.

pub mod boundary;
pub mod catalog;
pub mod context;
pub mod exclusion;

pub use catalog::{PatternCatalog, PlaceRule};
pub use context::ContextAdjuster;
pub use exclusion::{ExclusionList, ExclusionRule};

/// A raw toponym match inside a sentence
///
/// Transient: consumed immediately by the place resolver, never persisted
/// directly.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceMatch {
    /// Matched surface text
    pub text: String,

    /// Label of the rule that produced this match
    pub rule_label: String,

    /// Rule category (e.g. "市区町村")
    pub category: String,

    /// Confidence score in [0, 1]
    pub confidence: f64,

    /// Byte offset of the match start within the sentence
    pub start: usize,

    /// Byte offset of the match end within the sentence
    pub end: usize,
}

/// Trait for toponym extractors
pub trait PlaceExtractor: Send + Sync {
    /// Extract all place matches from a sentence
    fn extract(&self, text: &str) -> Vec<PlaceMatch>;
}

/// Extractor applying every catalog rule and collecting all matches
///
/// A single sentence may yield multiple places, and the same surface text
/// may match more than one rule; all matches are kept rather than picking
/// one winner per span. Downstream dedup by canonical name is what prevents
/// duplicate persistence.
pub struct CatalogExtractor {
    catalog: PatternCatalog,
    exclusions: ExclusionList,
    adjuster: Option<ContextAdjuster>,
}

impl CatalogExtractor {
    /// Create an extractor over the given catalog, with no exclusion rules
    /// and no confidence adjustment
    pub fn new(catalog: PatternCatalog) -> Self {
        Self {
            catalog,
            exclusions: ExclusionList::empty(),
            adjuster: None,
        }
    }

    /// The standard catalog with the shipped exclusion rules
    pub fn standard() -> Self {
        Self::new(PatternCatalog::standard()).with_exclusions(ExclusionList::standard())
    }

    /// Replace the exclusion rule list
    pub fn with_exclusions(mut self, exclusions: ExclusionList) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Enable context-based confidence adjustment
    pub fn with_adjuster(mut self, adjuster: ContextAdjuster) -> Self {
        self.adjuster = Some(adjuster);
        self
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }
}

impl PlaceExtractor for CatalogExtractor {
    fn extract(&self, text: &str) -> Vec<PlaceMatch> {
        let mut matches = Vec::new();

        for rule in self.catalog.iter() {
            for mut m in rule.find_matches(text) {
                if self.exclusions.excluded_by(&m, text).is_some() {
                    continue;
                }

                if let Some(adjuster) = &self.adjuster {
                    m.confidence = adjuster.adjust(&m.text, text, m.confidence);
                }

                matches.push(m);
            }
        }

        matches
    }
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod boundary_properties {
    use super::*;
    use crate::boundary::respects_boundaries;
    use proptest::prelude::*;

    proptest! {
        /// Bounded rules never return a span touching an adjacent ideograph,
        /// whatever surrounds the suffix
        #[test]
        fn bounded_matches_respect_boundaries(
            text in "[東京鎌倉大市町村山川庁の、をへに ]{0,24}"
        ) {
            let extractor = CatalogExtractor::new(PatternCatalog::standard());
            for m in extractor.extract(&text) {
                prop_assert!(respects_boundaries(&text, m.start, m.end));
            }
        }
    }
}
