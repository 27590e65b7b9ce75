//! Chizu Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the chizu system:
//! - Toponym models (sentences, places, mention links)
//! - Geocoding types and the `Geocoder` capability trait
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, DatabaseConfig, GeocoderConfig, GeocoderProvider, LoggingConfig,
    PipelineConfig,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for chizu operations
#[derive(Error, Debug)]
pub enum ChizuError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ChizuError>;

// ============================================================================
// Sentence Models
// ============================================================================

/// A segmented sentence from a literary work
///
/// Sentences are created by an external ingestion pipeline and are
/// read-only here; `before_text` and `after_text` hold the neighbouring
/// sentences for context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    pub sentence_id: i64,

    /// Owning work
    pub work_id: i64,

    pub sentence_text: String,

    /// Text immediately preceding this sentence
    pub before_text: Option<String>,

    /// Text immediately following this sentence
    pub after_text: Option<String>,

    /// Position within the work, used for reading order
    pub position_in_work: i64,
}

// ============================================================================
// Place Models
// ============================================================================

/// A deduplicated place identity
///
/// Created on first encounter of a new surface text; `place_name` is the
/// canonical key and is unique across all places. Coordinates are attached
/// later by the geocoding pass and are the only mutation a place sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub place_id: i64,

    /// Canonical key, equal to the first-seen surface text
    pub place_name: String,

    pub canonical_name: String,

    /// Category (e.g. "地名")
    pub place_type: String,

    /// Confidence of the identity, set at creation
    pub confidence: f64,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    pub verification_status: Option<String>,

    pub geocoded_at: Option<DateTime<Utc>>,
}

impl Place {
    /// Whether the geocoding pass still needs to visit this place
    pub fn awaits_coordinates(&self) -> bool {
        self.latitude.is_none() || self.longitude.is_none()
    }
}

/// A (sentence, place) mention with extraction provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionLink {
    pub sentence_place_id: i64,

    pub sentence_id: i64,

    pub place_id: i64,

    /// Label of the rule that produced the match
    pub extraction_method: String,

    pub confidence: f64,

    pub context_before: Option<String>,

    pub context_after: Option<String>,

    /// Surface text as matched in the sentence
    pub matched_text: String,

    pub created_at: DateTime<Utc>,
}

/// A mention proposed for insertion
///
/// The store deduplicates on the (sentence, place) pair, so proposing the
/// same mention twice is a no-op.
#[derive(Debug, Clone)]
pub struct NewMention {
    pub sentence_id: i64,
    pub place_id: i64,
    pub extraction_method: String,
    pub confidence: f64,
    pub context_before: Option<String>,
    pub context_after: Option<String>,
    pub matched_text: String,
}

/// Sentence text and flanking context backing a mention, used as
/// disambiguation input for geocoding
#[derive(Debug, Clone, Default)]
pub struct MentionContext {
    pub sentence_text: String,
    pub context_before: String,
    pub context_after: String,
}

// ============================================================================
// Geocoding Types
// ============================================================================

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Input to a geocoding lookup: the place name plus the sentence and
/// flanking context of its best mention
#[derive(Debug, Clone, Default)]
pub struct GeocodeQuery {
    pub place_name: String,
    pub sentence_text: String,
    pub context_before: String,
    pub context_after: String,
}

impl GeocodeQuery {
    /// Build a query for a place with no recorded mention
    pub fn bare(place_name: impl Into<String>) -> Self {
        Self {
            place_name: place_name.into(),
            ..Default::default()
        }
    }

    /// Build a query from a mention's context
    pub fn with_context(place_name: impl Into<String>, context: &MentionContext) -> Self {
        Self {
            place_name: place_name.into(),
            sentence_text: context.sentence_text.clone(),
            context_before: context.context_before.clone(),
            context_after: context.context_after.clone(),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Capability trait for resolving a place name (plus context) to coordinates
///
/// Returning `Ok(None)` is the absence signal: the backend answered but
/// could not (or chose not to) produce coordinates. Errors are reserved
/// for transport and protocol failures.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a query to coordinates, or `None` when the backend has no answer
    async fn geocode(&self, query: &GeocodeQuery) -> Result<Option<Coordinates>>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
