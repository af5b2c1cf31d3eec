// 🏷️ Product Name Normalizer
// Title-cases a raw product phrase and splits it into base name + variety + grade

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};

// ============================================================================
// VARIETY RULES
// ============================================================================

/// One keyword → label pair. Keywords match case-insensitively anywhere in
/// the phrase; the label is what lands in `CanonicalProduct::variety`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarietyRule {
    pub keyword: String,
    pub label: String,
}

impl VarietyRule {
    pub fn new(keyword: &str, label: &str) -> Self {
        VarietyRule {
            keyword: keyword.to_string(),
            label: label.to_string(),
        }
    }
}

/// The varieties recognized out of the box, in priority order.
pub fn default_variety_rules() -> Vec<VarietyRule> {
    vec![
        VarietyRule::new("combo halves and pieces", "Combo Halves and Pieces"),
        VarietyRule::new("hulled", "Hulled"),
        VarietyRule::new("natural", "Natural"),
        VarietyRule::new("dark", "Dark"),
    ]
}

/// Ordered variety table. First rule (in table order) whose keyword occurs
/// in the phrase wins, regardless of where in the phrase it occurs.
#[derive(Debug, Clone)]
pub struct VarietyTable {
    rules: Vec<(Regex, VarietyRule)>,
}

impl VarietyTable {
    pub fn from_rules(rules: Vec<VarietyRule>) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(compile_rule)
            .collect::<Result<Vec<_>>>()?;

        Ok(VarietyTable { rules })
    }

    pub fn rules(&self) -> impl Iterator<Item = &VarietyRule> {
        self.rules.iter().map(|(_, rule)| rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Locate the first matching rule; returns the byte offset where its
    /// keyword starts and the rule itself.
    fn find(&self, phrase: &str) -> Option<(usize, &VarietyRule)> {
        self.rules
            .iter()
            .find_map(|(matcher, rule)| matcher.find(phrase).map(|m| (m.start(), rule)))
    }
}

impl Default for VarietyTable {
    fn default() -> Self {
        // Built-in keywords are plain words; escaping makes them infallible.
        let rules = default_variety_rules()
            .into_iter()
            .filter_map(|rule| compile_rule(rule).ok())
            .collect();

        VarietyTable { rules }
    }
}

fn compile_rule(rule: VarietyRule) -> Result<(Regex, VarietyRule)> {
    let keyword = collapse_whitespace(&rule.keyword);
    if keyword.is_empty() {
        return Err(ImportError::Config(format!(
            "variety '{}' has an empty keyword",
            rule.label
        )));
    }

    let matcher = RegexBuilder::new(&regex::escape(&keyword))
        .case_insensitive(true)
        .build()
        .map_err(|e| ImportError::Config(format!("bad variety keyword '{}': {}", keyword, e)))?;

    Ok((matcher, rule))
}

// ============================================================================
// NORMALIZED NAME
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedName {
    pub base_name: String,
    pub variety: Option<String>,
    /// No grade keywords are defined yet.
    pub grade: Option<String>,
}

// ============================================================================
// TEXT HELPERS
// ============================================================================

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Uppercase the first letter of every word, lowercase the rest.
/// Not locale-aware: "and" becomes "And".
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// NORMALIZER
// ============================================================================

pub struct ProductNameNormalizer {
    varieties: VarietyTable,
}

impl ProductNameNormalizer {
    pub fn new(varieties: VarietyTable) -> Self {
        ProductNameNormalizer { varieties }
    }

    pub fn varieties(&self) -> &VarietyTable {
        &self.varieties
    }

    pub fn normalize(&self, phrase: &str) -> NormalizedName {
        let name = title_case(phrase);

        match self.varieties.find(&name) {
            Some((start, rule)) => NormalizedName {
                base_name: name[..start].trim().to_string(),
                variety: Some(rule.label.clone()),
                grade: None,
            },
            None => NormalizedName {
                base_name: name,
                variety: None,
                grade: None,
            },
        }
    }
}

impl Default for ProductNameNormalizer {
    fn default() -> Self {
        Self::new(VarietyTable::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
