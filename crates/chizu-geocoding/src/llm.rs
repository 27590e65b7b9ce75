//! LLM-backed context-aware geocoding
//!
//! Embeds the place name, its sentence, and the flanking context into a
//! prompt and asks the model for strict JSON. Non-place judgements and
//! unparseable answers are the absence signal; only transport and protocol
//! failures surface as errors.
//!
//! Author: hephaex@gmail.com

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use chizu_core::{
    ChizuError, Coordinates, GeocodeQuery, Geocoder, GeocoderConfig, Result,
};

/// Build the geocoding prompt for a query
fn build_prompt(query: &GeocodeQuery) -> String {
    format!(
        "次の文学作品の一文に現れる語「{place}」について、それが実在の地名かどうかを\
         文脈から判断し、地名であれば代表的な座標を答えてください。\n\n\
         前文: {before}\n\
         文: {sentence}\n\
         後文: {after}\n\n\
         次のJSONのみを出力してください:\n\
         {{\"is_place\": true/false, \"latitude\": 数値またはnull, \"longitude\": 数値またはnull}}",
        place = query.place_name,
        before = query.context_before,
        sentence = query.sentence_text,
        after = query.context_after,
    )
}

/// Expected JSON answer from the model
#[derive(Debug, Deserialize)]
struct GeocodeAnswer {
    is_place: Option<bool>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Parse the model's answer leniently: the first JSON object found wins,
/// anything else is the absence signal
fn parse_coordinates(response: &str) -> Option<Coordinates> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    let answer: GeocodeAnswer = serde_json::from_str(&response[start..=end]).ok()?;

    if answer.is_place == Some(false) {
        return None;
    }

    match (answer.latitude, answer.longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
        _ => None,
    }
}

fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ChizuError::Geocoding(format!("Failed to build HTTP client: {e}")))
}

// ============================================================================
// OpenAI Geocoder
// ============================================================================

/// Geocoder backed by an OpenAI-compatible chat completion API
pub struct OpenAiGeocoder {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

impl OpenAiGeocoder {
    /// Create from config
    pub fn from_config(config: &GeocoderConfig) -> Result<Self> {
        let api_key = config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ChizuError::Config("OpenAI API key required".to_string()))?;

        let base_url = config
            .openai_base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string());

        Ok(Self {
            client: build_client(config.timeout_secs)?,
            api_key: api_key.clone(),
            base_url,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Set custom base URL (for Azure or compatible APIs)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl Geocoder for OpenAiGeocoder {
    async fn geocode(&self, query: &GeocodeQuery) -> Result<Option<Coordinates>> {
        let request = OpenAiRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: build_prompt(query),
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ChizuError::Geocoding(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ChizuError::Geocoding(format!("OpenAI error: {error_text}")));
        }

        let result: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| ChizuError::Geocoding(format!("Failed to parse response: {e}")))?;

        Ok(result
            .choices
            .first()
            .and_then(|c| parse_coordinates(&c.message.content)))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// ============================================================================
// Ollama Geocoder
// ============================================================================

/// Geocoder backed by a local Ollama server
pub struct OllamaGeocoder {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaGeocoder {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    /// Create from config
    pub fn from_config(config: &GeocoderConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            base_url: config.ollama_url.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for OllamaGeocoder {
    async fn geocode(&self, query: &GeocodeQuery) -> Result<Option<Coordinates>> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: build_prompt(query),
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| ChizuError::Geocoding(format!("Ollama request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ChizuError::Geocoding(format!("Ollama error: {error_text}")));
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| ChizuError::Geocoding(format!("Failed to parse Ollama response: {e}")))?;

        Ok(parse_coordinates(&result.response))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_query() {
        let query = GeocodeQuery {
            place_name: "鎌倉".to_string(),
            sentence_text: "鎌倉の大仏を見た".to_string(),
            context_before: "前の文".to_string(),
            context_after: "次の文".to_string(),
        };
        let prompt = build_prompt(&query);

        assert!(prompt.contains("鎌倉"));
        assert!(prompt.contains("鎌倉の大仏を見た"));
        assert!(prompt.contains("is_place"));
    }

    #[test]
    fn test_parse_plain_json() {
        let coords = parse_coordinates(
            r#"{"is_place": true, "latitude": 35.3192, "longitude": 139.5467}"#,
        )
        .unwrap();
        assert!((coords.latitude - 35.3192).abs() < 1e-6);
    }

    #[test]
    fn test_parse_fenced_json() {
        let response = "答えは次の通りです。\n```json\n{\"is_place\": true, \"latitude\": 43.0642, \"longitude\": 141.3469}\n```";
        assert!(parse_coordinates(response).is_some());
    }

    #[test]
    fn test_non_place_is_absence() {
        let response = r#"{"is_place": false, "latitude": null, "longitude": null}"#;
        assert!(parse_coordinates(response).is_none());
    }

    #[test]
    fn test_missing_coordinates_is_absence() {
        let response = r#"{"is_place": true, "latitude": null, "longitude": null}"#;
        assert!(parse_coordinates(response).is_none());
    }

    #[test]
    fn test_garbage_is_absence() {
        assert!(parse_coordinates("わかりません").is_none());
        assert!(parse_coordinates("").is_none());
    }

    #[test]
    fn test_openai_requires_api_key() {
        let config = GeocoderConfig::default();
        assert!(OpenAiGeocoder::from_config(&config).is_err());
    }

    #[test]
    fn test_ollama_from_config() {
        let config = GeocoderConfig::default();
        let geocoder = OllamaGeocoder::from_config(&config).unwrap();
        assert_eq!(geocoder.model, "gpt-4o-mini");
        assert_eq!(geocoder.base_url, "http://localhost:11434");
    }
}
