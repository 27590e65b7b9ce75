//! Chizu Geocoding - Coordinate resolution backends
//!
//! The gazetteer answers the common literary place names without I/O;
//! LLM backends handle the long tail with context-based disambiguation.
//! `create_geocoder` assembles the configured chain.

pub mod chain;
pub mod gazetteer;
pub mod llm;
pub mod throttle;

pub use chain::ChainGeocoder;
pub use gazetteer::GazetteerGeocoder;
pub use llm::{OllamaGeocoder, OpenAiGeocoder};
pub use throttle::MinInterval;

use chizu_core::{Geocoder, GeocoderConfig, GeocoderProvider, Result};

/// Create the configured geocoder chain: gazetteer first, then the remote
/// backend when one is configured
pub fn create_geocoder(config: &GeocoderConfig) -> Result<Box<dyn Geocoder>> {
    let chain = ChainGeocoder::new().with_backend(Box::new(GazetteerGeocoder::new()));

    let chain = match config.provider {
        GeocoderProvider::Gazetteer => chain,
        GeocoderProvider::OpenAI => {
            chain.with_backend(Box::new(OpenAiGeocoder::from_config(config)?))
        }
        GeocoderProvider::Ollama => {
            chain.with_backend(Box::new(OllamaGeocoder::from_config(config)?))
        }
    };

    Ok(Box::new(chain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gazetteer_only_chain() {
        let config = GeocoderConfig::default();
        let geocoder = create_geocoder(&config).unwrap();
        assert_eq!(geocoder.name(), "chain");
    }

    #[test]
    fn test_openai_chain_requires_key() {
        let config = GeocoderConfig {
            provider: GeocoderProvider::OpenAI,
            ..Default::default()
        };
        assert!(create_geocoder(&config).is_err());
    }

    #[test]
    fn test_ollama_chain() {
        let config = GeocoderConfig {
            provider: GeocoderProvider::Ollama,
            ..Default::default()
        };
        assert!(create_geocoder(&config).is_ok());
    }
}
