//! Lexical exclusion rules applied after matching
//!
//! Some characters double as plant names, direction words, or fragments of
//! religious-site names, and surface as false positives when they also
//! resemble historical place names. These rules drop a match when the word
//! immediately following it reveals a non-place reading, e.g. 「萩が咲く」
//! is the plant, not the town.

use regex::Regex;

use crate::PlaceMatch;

/// A single exclusion rule: drop a match whose surface text is one of
/// `targets` and whose immediately following text matches `following`
#[derive(Debug, Clone)]
pub struct ExclusionRule {
    pub label: String,
    targets: Vec<String>,
    following: Regex,
}

impl ExclusionRule {
    /// Create a rule; `following` is anchored to the start of the text
    /// after the match
    pub fn new(label: impl Into<String>, targets: &[&str], following: &str) -> Self {
        Self {
            label: label.into(),
            targets: targets.iter().map(|s| s.to_string()).collect(),
            following: Regex::new(&format!("^(?:{following})"))
                .expect("exclusion pattern compiles"),
        }
    }

    /// Whether this rule rejects the given match
    pub fn applies(&self, m: &PlaceMatch, text: &str) -> bool {
        self.targets.iter().any(|t| t == &m.text) && self.following.is_match(&text[m.end..])
    }
}

/// An ordered list of exclusion rules, swappable at extractor construction
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    rules: Vec<ExclusionRule>,
}

impl ExclusionList {
    pub fn new(rules: Vec<ExclusionRule>) -> Self {
        Self { rules }
    }

    /// An empty list; disables the exclusion stage
    pub fn empty() -> Self {
        Self::default()
    }

    /// The shipped rules, seeded from false positives observed in the
    /// extraction corpus
    pub fn standard() -> Self {
        Self::new(vec![
            ExclusionRule::new(
                "direction_word",
                &["東", "西", "南", "北"],
                "から|へ|に向かって|を見て",
            ),
            ExclusionRule::new(
                "plant_reading",
                &["萩", "桜", "梅", "松", "竹"],
                "[がの](?:咲|散|茂|延)",
            ),
        ])
    }

    /// The label of the first rule rejecting the match, if any
    pub fn excluded_by(&self, m: &PlaceMatch, text: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.applies(m, text))
            .map(|r| r.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place_match(text: &str, start: usize, end: usize) -> PlaceMatch {
        PlaceMatch {
            text: text.to_string(),
            rule_label: "regex_landmark".to_string(),
            category: "有名地名".to_string(),
            confidence: 0.9,
            start,
            end,
        }
    }

    #[test]
    fn test_plant_reading_excluded() {
        let list = ExclusionList::standard();
        let text = "庭の萩が咲いた";
        // 萩 at bytes 6..9
        let m = place_match("萩", 6, 9);
        assert_eq!(list.excluded_by(&m, text), Some("plant_reading"));
    }

    #[test]
    fn test_direction_word_excluded() {
        let list = ExclusionList::standard();
        let text = "東から西へ";
        let m = place_match("東", 0, 3);
        assert_eq!(list.excluded_by(&m, text), Some("direction_word"));
    }

    #[test]
    fn test_place_usage_not_excluded() {
        let list = ExclusionList::standard();
        let text = "萩に滞在した";
        let m = place_match("萩", 0, 3);
        assert_eq!(list.excluded_by(&m, text), None);
    }

    #[test]
    fn test_empty_list_excludes_nothing() {
        let list = ExclusionList::empty();
        let text = "東から西へ";
        let m = place_match("東", 0, 3);
        assert_eq!(list.excluded_by(&m, text), None);
    }
}
