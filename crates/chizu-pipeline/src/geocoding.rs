//! Geocoding pass
//!
//! Visits every place still lacking coordinates, in canonical-name order,
//! and asks the geocoder with the place's best mention context. Absence
//! and errors leave the place untouched; it stays eligible for the next
//! run because the selection predicate is "coordinates are null".

use chrono::Utc;
use tracing::{debug, info, warn};

use chizu_core::{GeocodeQuery, Geocoder, Result};
use chizu_geocoding::MinInterval;
use chizu_store::{MentionStore, PlaceStore, SqliteStore};

/// Batch summary of one geocoding pass
#[derive(Debug, Clone, Default)]
pub struct GeocodingSummary {
    /// Places visited
    pub attempted: usize,

    /// Places that received coordinates
    pub geocoded: usize,

    /// Places left without coordinates (absence, backend error, or a
    /// failed write); all retry-eligible on a future run
    pub failed: usize,
}

/// Runs geocoding over all places awaiting coordinates
pub struct GeocodingPass<'a> {
    store: &'a SqliteStore,
    geocoder: Box<dyn Geocoder>,
    throttle: MinInterval,
    progress_interval: usize,
}

impl<'a> GeocodingPass<'a> {
    pub fn new(store: &'a SqliteStore, geocoder: Box<dyn Geocoder>) -> Self {
        Self {
            store,
            geocoder,
            throttle: MinInterval::from_millis(100),
            progress_interval: 50,
        }
    }

    /// Replace the inter-call throttle policy
    pub fn with_throttle(mut self, throttle: MinInterval) -> Self {
        self.throttle = throttle;
        self
    }

    /// Emit a progress event every `interval` places
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Visit every place lacking coordinates, one at a time
    pub async fn run(&self) -> Result<GeocodingSummary> {
        let places = self.store.awaiting_coordinates().await?;
        info!("geocoding pass over {} places", places.len());

        let mut summary = GeocodingSummary::default();

        for place in &places {
            summary.attempted += 1;

            // A place with no mention is still attempted, with empty context
            let query = match self.store.best_context_for(place.place_id).await {
                Ok(Some(context)) => GeocodeQuery::with_context(&place.place_name, &context),
                Ok(None) => GeocodeQuery::bare(&place.place_name),
                Err(e) => {
                    warn!(place = %place.place_name, "context lookup failed: {e}");
                    GeocodeQuery::bare(&place.place_name)
                }
            };

            self.throttle.wait().await;

            match self.geocoder.geocode(&query).await {
                Ok(Some(coords)) => {
                    match self
                        .store
                        .record_coordinates(place.place_id, coords, Utc::now())
                        .await
                    {
                        Ok(()) => {
                            info!(
                                place = %place.place_name,
                                latitude = coords.latitude,
                                longitude = coords.longitude,
                                "geocoded"
                            );
                            summary.geocoded += 1;
                        }
                        Err(e) => {
                            warn!(place = %place.place_name, "coordinate write failed: {e}");
                            summary.failed += 1;
                        }
                    }
                }
                Ok(None) => {
                    debug!(place = %place.place_name, "no coordinates returned");
                    summary.failed += 1;
                }
                Err(e) => {
                    warn!(place = %place.place_name, "geocoding failed: {e}");
                    summary.failed += 1;
                }
            }

            if summary.attempted % self.progress_interval == 0 {
                info!(
                    "geocoding progress: {}/{} ({} geocoded)",
                    summary.attempted,
                    places.len(),
                    summary.geocoded
                );
            }
        }

        Ok(summary)
    }
}
