//! Built-in coordinate tables
//!
//! Covers the place names that dominate literary corpora: classical
//! provinces, Tokyo and Kyoto districts, Hokkaido cities, major regional
//! cities, and foreign cities frequent in translation-era fiction. Exact
//! canonical-name lookup, no I/O.

use std::collections::HashMap;

use async_trait::async_trait;

use chizu_core::{Coordinates, GeocodeQuery, Geocoder, Result};

/// Geocoder backed by the built-in tables
pub struct GazetteerGeocoder {
    entries: HashMap<&'static str, Coordinates>,
}

impl GazetteerGeocoder {
    pub fn new() -> Self {
        let mut entries = HashMap::new();

        for table in [
            CLASSICAL_PROVINCES,
            TOKYO_DISTRICTS,
            KYOTO_DISTRICTS,
            HOKKAIDO_CITIES,
            MAJOR_PLACES,
            FOREIGN_CITIES,
        ] {
            for &(name, latitude, longitude) in table {
                entries.insert(name, Coordinates::new(latitude, longitude));
            }
        }

        Self { entries }
    }

    /// Number of known place names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for GazetteerGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for GazetteerGeocoder {
    async fn geocode(&self, query: &GeocodeQuery) -> Result<Option<Coordinates>> {
        Ok(self.entries.get(query.place_name.as_str()).copied())
    }

    fn name(&self) -> &str {
        "gazetteer"
    }
}

/// Classical provinces, located at their historical centres
const CLASSICAL_PROVINCES: &[(&str, f64, f64)] = &[
    ("伊勢", 34.4900, 136.7056),
    ("大和", 34.6851, 135.8325),
    ("美濃", 35.3912, 136.7223),
    ("尾張", 35.1802, 136.9066),
    ("薩摩", 31.5966, 130.5571),
    ("伊豆", 34.9756, 138.9462),
    ("信濃", 36.2354, 137.9720),
    ("近江", 35.0045, 135.8686),
    ("駿河", 34.9756, 138.3828),
    ("武蔵", 35.6895, 139.6917),
    ("土佐", 33.5597, 133.5311),
    ("陸奥", 39.7036, 141.1527),
];

const TOKYO_DISTRICTS: &[(&str, f64, f64)] = &[
    ("本郷", 35.7081, 139.7619),
    ("神田", 35.6918, 139.7648),
    ("青山", 35.6736, 139.7263),
    ("麻布", 35.6581, 139.7414),
    ("両国", 35.6967, 139.7933),
    ("赤坂", 35.6745, 139.7378),
    ("日本橋", 35.6813, 139.7744),
    ("築地", 35.6654, 139.7707),
    ("銀座", 35.6717, 139.7650),
    ("浅草", 35.7148, 139.7967),
    ("上野", 35.7141, 139.7774),
];

const KYOTO_DISTRICTS: &[(&str, f64, f64)] = &[
    ("伏見", 34.9393, 135.7578),
    ("嵐山", 35.0088, 135.6761),
    ("清水", 34.9948, 135.7849),
    ("祇園", 35.0037, 135.7744),
    ("宇治", 34.8842, 135.7991),
];

const HOKKAIDO_CITIES: &[(&str, f64, f64)] = &[
    ("小樽", 43.1907, 140.9947),
    ("函館", 41.7687, 140.7291),
    ("札幌", 43.0642, 141.3469),
];

/// Major cities and sights across the rest of the country
const MAJOR_PLACES: &[(&str, f64, f64)] = &[
    ("東京都", 35.6895, 139.6917),
    ("京都", 35.0116, 135.7681),
    ("大阪", 34.6937, 135.5023),
    ("奈良", 34.6851, 135.8048),
    ("神戸", 34.6901, 135.1956),
    ("横浜", 35.4437, 139.6380),
    ("鎌倉", 35.3192, 139.5467),
    ("箱根", 35.2323, 139.1069),
    ("名古屋", 35.1815, 136.9066),
    ("金沢", 36.5613, 136.6562),
    ("仙台", 38.2682, 140.8694),
    ("松島", 38.3687, 141.0632),
    ("広島", 34.3853, 132.4553),
    ("松山", 33.8392, 132.7657),
    ("福岡", 33.5904, 130.4017),
    ("博多", 33.5902, 130.4205),
    ("長崎", 32.7503, 129.8777),
    ("那覇", 26.2124, 127.6809),
    ("富士山", 35.3606, 138.7274),
    ("琵琶湖", 35.2590, 136.0655),
    ("日光", 36.7198, 139.6982),
];

/// Foreign cities frequent in literary works
const FOREIGN_CITIES: &[(&str, f64, f64)] = &[
    ("ローマ", 41.9028, 12.4964),
    ("パリ", 48.8566, 2.3522),
    ("ロンドン", 51.5074, -0.1278),
    ("ベルリン", 52.5200, 13.4050),
    ("ニューヨーク", 40.7128, -74.0060),
    ("上海", 31.2304, 121.4737),
    ("北京", 39.9042, 116.4074),
    ("モスクワ", 55.7558, 37.6176),
    ("ウィーン", 48.2082, 16.3738),
    ("アテネ", 37.9838, 23.7275),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_place_resolves() {
        let gazetteer = GazetteerGeocoder::new();
        let coords = gazetteer
            .geocode(&GeocodeQuery::bare("鎌倉"))
            .await
            .unwrap()
            .unwrap();

        assert!((coords.latitude - 35.3192).abs() < 1e-6);
        assert!((coords.longitude - 139.5467).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_unknown_place_is_absence_not_error() {
        let gazetteer = GazetteerGeocoder::new();
        let result = gazetteer.geocode(&GeocodeQuery::bare("不明地")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_context_does_not_affect_lookup() {
        let gazetteer = GazetteerGeocoder::new();
        let query = GeocodeQuery {
            place_name: "札幌".to_string(),
            sentence_text: "札幌の冬は長い".to_string(),
            context_before: String::new(),
            context_after: String::new(),
        };
        assert!(gazetteer.geocode(&query).await.unwrap().is_some());
    }

    #[test]
    fn test_tables_are_loaded() {
        let gazetteer = GazetteerGeocoder::new();
        assert!(gazetteer.len() > 50);
    }
}
