//! Pattern catalog for toponym extraction
//!
//! An ordered, immutable set of named matching rules, each tagged with a
//! confidence score reflecting observed precision. Closed-vocabulary rules
//! (prefectures, classical provinces, well-known places) sit at the top of
//! the trust order; open-class suffix rules trade precision for recall and
//! rely on the boundary guard to stay out of longer compounds.

use regex::Regex;

use crate::boundary::respects_boundaries;
use crate::PlaceMatch;

/// A single extraction rule: label, matcher, and confidence
#[derive(Debug, Clone)]
pub struct PlaceRule {
    /// Stable label recorded as the extraction method of resulting mentions
    pub label: String,

    /// Category of place this rule recognises (e.g. "都道府県")
    pub category: String,

    /// Empirical precision of the rule, in [0, 1]
    pub confidence: f64,

    /// Apply the adjacent-ideograph boundary guard to candidate matches
    pub bounded: bool,

    pattern: Regex,
}

impl PlaceRule {
    /// Create an unbounded rule
    ///
    /// Panics if the pattern does not compile; rules are built from static
    /// pattern strings.
    pub fn new(
        label: impl Into<String>,
        pattern: &str,
        category: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            label: label.into(),
            category: category.into(),
            confidence,
            bounded: false,
            pattern: Regex::new(pattern).expect("rule pattern compiles"),
        }
    }

    /// Enable the boundary guard for this rule
    pub fn bounded(mut self) -> Self {
        self.bounded = true;
        self
    }

    /// Apply this rule to a sentence, returning all surviving matches
    pub fn find_matches(&self, text: &str) -> Vec<PlaceMatch> {
        self.pattern
            .find_iter(text)
            .filter(|m| !self.bounded || respects_boundaries(text, m.start(), m.end()))
            .map(|m| PlaceMatch {
                text: m.as_str().to_string(),
                rule_label: self.label.clone(),
                category: self.category.clone(),
                confidence: self.confidence,
                start: m.start(),
                end: m.end(),
            })
            .collect()
    }
}

/// An ordered set of extraction rules
///
/// Construction is explicit; the catalog is never mutated after creation
/// and can be swapped wholesale for testing or tuning.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    rules: Vec<PlaceRule>,
}

impl PatternCatalog {
    /// Build a catalog from an explicit rule list
    pub fn new(rules: Vec<PlaceRule>) -> Self {
        Self { rules }
    }

    /// The standard rule set, in descending trust order
    pub fn standard() -> Self {
        Self::new(vec![
            PlaceRule::new(
                "regex_prefecture",
                PREFECTURE_PATTERN,
                "都道府県",
                0.95,
            )
            .bounded(),
            PlaceRule::new("regex_classical", CLASSICAL_PATTERN, "古典地名", 0.92).bounded(),
            PlaceRule::new("regex_landmark", LANDMARK_PATTERN, "有名地名", 0.90).bounded(),
            PlaceRule::new(
                "regex_municipality",
                r"[一-龯]{2,6}[市区町村]",
                "市区町村",
                0.85,
            )
            .bounded(),
            PlaceRule::new(
                "regex_terrain",
                r"[一-龯]{2,4}[山川湖海峠谷野原島岬浦崎]",
                "自然地名",
                0.80,
            )
            .bounded(),
            PlaceRule::new("regex_county", r"[一-龯]{2,6}郡", "郡", 0.75).bounded(),
            PlaceRule::new(
                "regex_shrine_temple",
                r"[一-龯]{2,4}(?:神社|[寺院宮])",
                "社寺",
                0.70,
            )
            .bounded(),
        ])
    }

    pub fn rules(&self) -> &[PlaceRule] {
        &self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaceRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// All 47 prefectures, full names
const PREFECTURE_PATTERN: &str = "(?:北海道|青森県|岩手県|宮城県|秋田県|山形県|福島県\
|茨城県|栃木県|群馬県|埼玉県|千葉県|東京都|神奈川県\
|新潟県|富山県|石川県|福井県|山梨県|長野県|岐阜県|静岡県|愛知県\
|三重県|滋賀県|京都府|大阪府|兵庫県|奈良県|和歌山県\
|鳥取県|島根県|岡山県|広島県|山口県|徳島県|香川県|愛媛県|高知県\
|福岡県|佐賀県|長崎県|熊本県|大分県|宮崎県|鹿児島県|沖縄県)";

/// Classical provinces and capitals, frequent in literary texts
const CLASSICAL_PATTERN: &str = "(?:平安京|江戸|武蔵|相模|甲斐|信濃|越後|下野|上野\
|駿河|伊豆|伊勢|山城|大和|河内|和泉|摂津|近江|美濃|尾張|薩摩|土佐|陸奥|出羽)";

/// Curated well-known place names: Tokyo districts, regional cities, onsen
/// towns, classical sights, frequent foreign cities, and named natural
/// features
const LANDMARK_PATTERN: &str = "(?:銀座|新宿|渋谷|浅草|品川|池袋|新橋|有楽町|丸の内\
|表参道|原宿|恵比寿|六本木|赤坂|青山|麻布|目黒|世田谷\
|本郷|神田|日本橋|築地|月島|両国|秋葉原\
|横浜|川崎|大宮|浦和|船橋|柏|所沢|川越\
|鎌倉|湘南|箱根|熱海|軽井沢|日光|那須|草津|伊香保\
|京都|大阪|神戸|奈良|嵐山|祇園|伏見|宇治|難波|梅田|心斎橋\
|名古屋|金沢|松本|諏訪|上高地|立山\
|仙台|盛岡|会津|松島\
|札幌|函館|小樽|旭川|釧路|帯広\
|広島|岡山|高松|松山|高知|徳島\
|福岡|博多|北九州|長崎|熊本|鹿児島|那覇\
|パリ|ロンドン|ベルリン|ローマ|ウィーン|モスクワ|ペテルブルク\
|ニューヨーク|シカゴ|サンフランシスコ|上海|北京|香港|ソウル\
|富士山|阿蘇山|筑波山|比叡山|高野山\
|琵琶湖|中禅寺湖|芦ノ湖|十和田湖\
|瀬戸内海|日本海|太平洋|東京湾|大阪湾|駿河湾\
|利根川|信濃川|石狩川|筑後川|吉野川)";
