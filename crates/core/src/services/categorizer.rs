use regex::Regex;

use crate::errors::CoreError;
use crate::models::transaction::FALLBACK_CATEGORY;

/// Built-in expense categories, in matching priority order.
pub const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "ăn uống",
        &[
            "ăn", "ăn sáng", "ăn trưa", "ăn tối", "cafe", "cà phê", "trà đá", "chè", "nhậu",
            "bia", "đồ ăn", "đồ uống", "quán", "phở", "bún", "cơm", "trà sữa",
        ],
    ),
    (
        "sinh hoạt",
        &[
            "sửa xe", "đổ xăng", "xăng", "tiền điện", "điện", "nước", "điện thoại",
            "học phí", "internet", "wifi", "gas", "rác", "phí", "bảo hiểm",
        ],
    ),
    (
        "hưởng thụ",
        &[
            "spa", "du lịch", "massage", "cắt tóc", "làm tóc", "xem phim", "phim",
            "karaoke", "trò chơi", "game", "makeup",
        ],
    ),
];

struct CategoryRule {
    label: String,
    /// Any keyword of the category, bounded by non-letters or the string edges
    pattern: Regex,
}

/// Assigns an expense note to a category by whole-word keyword match.
///
/// Categories are tried in declaration order and the first one with a
/// matching keyword wins. A keyword only counts when the characters right
/// before and after it are not letters, so "phở" matches "phở bò" and
/// "(phở)" but never the inside of a longer word.
pub struct Categorizer {
    rules: Vec<CategoryRule>,
}

impl Categorizer {
    /// Categorizer with the built-in keyword table.
    ///
    /// # Panics
    /// Only if [`DEFAULT_CATEGORIES`] stops compiling, which is a bug.
    pub fn new() -> Self {
        Self::from_rules(DEFAULT_CATEGORIES).expect("built-in category table compiles")
    }

    /// Build a categorizer from a custom `(label, keywords)` table.
    pub fn from_rules(table: &[(&str, &[&str])]) -> Result<Self, CoreError> {
        let mut rules = Vec::with_capacity(table.len());
        for (label, keywords) in table {
            let alternatives: Vec<String> = keywords
                .iter()
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .map(|k| regex::escape(&k.to_lowercase()))
                .collect();
            if alternatives.is_empty() {
                continue;
            }
            let source = format!(r"(?i)(?:^|\P{{L}})(?:{})(?:\P{{L}}|$)", alternatives.join("|"));
            let pattern = Regex::new(&source).map_err(|e| {
                CoreError::Config(format!("Invalid keywords for category '{label}': {e}"))
            })?;
            rules.push(CategoryRule {
                label: label.to_string(),
                pattern,
            });
        }
        Ok(Self { rules })
    }

    /// Category label for an expense note. Empty or unmatched notes get "khác".
    pub fn categorize(&self, note: &str) -> &str {
        let text = note.trim().to_lowercase();
        if text.is_empty() {
            return FALLBACK_CATEGORY;
        }
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(&text))
            .map(|rule| rule.label.as_str())
            .unwrap_or(FALLBACK_CATEGORY)
    }

    /// Category labels in matching order.
    pub fn labels(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.label.as_str()).collect()
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new()
    }
}
