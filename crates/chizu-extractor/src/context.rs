//! Context-based confidence adjustment
//!
//! Adjusts a surviving match's confidence from sentence context: travel and
//! residence phrasing raises it, honorific or person phrasing lowers it, and
//! very short surface texts are penalised. The raw catalog confidences stay
//! untouched so they remain the testable base values; the adjuster is a
//! separate stage enabled at extractor construction.

use regex::Regex;

/// Confidence bounds after adjustment
const MIN_CONFIDENCE: f64 = 0.1;
const MAX_CONFIDENCE: f64 = 1.0;

/// Adjusts match confidence from sentence context
#[derive(Debug, Clone)]
pub struct ContextAdjuster {
    travel_patterns: Vec<Regex>,
    person_patterns: Vec<Regex>,
}

impl ContextAdjuster {
    pub fn new() -> Self {
        let compile = |p: &str| Regex::new(p).expect("context pattern compiles");

        Self {
            travel_patterns: vec![
                compile("(?:から|より|への|へと|にて|にいる|にある|を通り|を経て)"),
                compile("(?:行く|来る|向かう|着く|発つ|出発|到着)"),
                compile("(?:住む|滞在|訪問|旅行|見物)"),
            ],
            person_patterns: vec![
                compile("(?:さん|君|氏|先生|様)"),
                compile("(?:は|が)(?:話す|言う|思う|考える)"),
            ],
        }
    }

    /// Adjust `base` confidence for a match on `place_name` inside `sentence`
    pub fn adjust(&self, place_name: &str, sentence: &str, base: f64) -> f64 {
        let mut confidence = base;

        if self.travel_patterns.iter().any(|p| p.is_match(sentence)) {
            confidence += 0.1;
        }

        if self.person_patterns.iter().any(|p| p.is_match(sentence)) {
            confidence -= 0.2;
        }

        // Short surface texts are easily confused with other words
        match place_name.chars().count() {
            1 => confidence -= 0.3,
            2 => confidence -= 0.1,
            _ => {}
        }

        confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
    }
}

impl Default for ContextAdjuster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travel_context_raises_confidence() {
        let adjuster = ContextAdjuster::new();
        // +0.1 travel, -0.1 two-character name
        let adjusted = adjuster.adjust("鎌倉", "鎌倉に滞在した", 0.9);
        assert!((adjusted - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_person_context_lowers_confidence() {
        let adjuster = ContextAdjuster::new();
        // -0.2 person, -0.1 two-character name
        let adjusted = adjuster.adjust("青山", "青山さんと会った", 0.9);
        assert!((adjusted - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_single_character_penalty() {
        let adjuster = ContextAdjuster::new();
        let adjusted = adjuster.adjust("柏", "柏の木立", 0.9);
        assert!((adjusted - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_to_floor() {
        let adjuster = ContextAdjuster::new();
        let adjusted = adjuster.adjust("柏", "柏さんが言う", 0.2);
        assert!((adjusted - MIN_CONFIDENCE).abs() < 1e-9);
    }

    #[test]
    fn test_neutral_context_unchanged() {
        let adjuster = ContextAdjuster::new();
        let adjusted = adjuster.adjust("富士山", "富士山は高い", 0.8);
        assert!((adjusted - 0.8).abs() < 1e-9);
    }
}
