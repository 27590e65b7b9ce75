//! Chained geocoding lookup
//!
//! Tries each backend in order; the first answer with coordinates wins.
//! A backend error is logged and the chain moves on, so one backend going
//! down never blocks the places the others can still resolve.

use async_trait::async_trait;
use tracing::warn;

use chizu_core::{Coordinates, GeocodeQuery, Geocoder, Result};

/// Geocoder trying a list of backends in order
pub struct ChainGeocoder {
    backends: Vec<Box<dyn Geocoder>>,
}

impl ChainGeocoder {
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Append a backend to the end of the chain
    pub fn with_backend(mut self, backend: Box<dyn Geocoder>) -> Self {
        self.backends.push(backend);
        self
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl Default for ChainGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for ChainGeocoder {
    async fn geocode(&self, query: &GeocodeQuery) -> Result<Option<Coordinates>> {
        for backend in &self.backends {
            match backend.geocode(query).await {
                Ok(Some(coords)) => return Ok(Some(coords)),
                Ok(None) => continue,
                Err(e) => {
                    warn!(
                        backend = backend.name(),
                        place = %query.place_name,
                        "geocoding backend failed: {e}"
                    );
                    continue;
                }
            }
        }

        Ok(None)
    }

    fn name(&self) -> &str {
        "chain"
    }
}
