//! Question category taxonomy and keyword classification

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Allowed FAQ question categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Usage,
    Safety,
    Ingredients,
    Benefits,
    Pricing,
    Comparison,
    General,
}

impl Category {
    /// Every category, in taxonomy order.
    pub const ALL: [Category; 7] = [
        Self::Usage,
        Self::Safety,
        Self::Ingredients,
        Self::Benefits,
        Self::Pricing,
        Self::Comparison,
        Self::General,
    ];

    /// Category assigned when a label is missing or unknown.
    pub const DEFAULT: Category = Self::General;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usage => "Usage",
            Self::Safety => "Safety",
            Self::Ingredients => "Ingredients",
            Self::Benefits => "Benefits",
            Self::Pricing => "Pricing",
            Self::Comparison => "Comparison",
            Self::General => "General",
        }
    }

    /// Exact label lookup.
    pub fn from_label(label: &str) -> Option<Category> {
        Self::ALL.into_iter().find(|c| c.as_str() == label)
    }

    /// Trim and title-case a raw label, coercing non-members to `General`.
    pub fn normalize(raw: &str) -> Category {
        Self::from_label(&title_case(raw.trim())).unwrap_or(Self::DEFAULT)
    }

    /// Position in taxonomy order.
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(Self::ALL.len() - 1)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comma-separated taxonomy labels, as embedded in prompts.
pub fn taxonomy_labels() -> String {
    Category::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Upper-case the first letter of every alphabetic run and lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

// Ordered rules; the first matching rule wins.
static KEYWORD_RULES: LazyLock<Vec<(Category, Regex)>> = LazyLock::new(|| {
    let rules: [(Category, &str); 6] = [
        (
            Category::Safety,
            r"\b(safe|safety|side effects?|sensitive|irritat\w*|allerg\w*|pregnan\w*|reaction|patch test)\b",
        ),
        (
            Category::Comparison,
            r"\b(compare|compared|comparison|versus|vs\.?|better than|different from|alternatives?|similar)\b",
        ),
        (
            Category::Pricing,
            r"\b(price|prices|pricing|cost|costs|buy|purchase|worth|afford\w*|sizes?|value for money)\b",
        ),
        (
            Category::Ingredients,
            r"\b(ingredients?|contains?|formula\w*|vitamin|acid|concentration|fragrance)\b",
        ),
        (
            Category::Benefits,
            r"\b(benefits?|results?|improve\w*|helps?|brighten\w*|hydrat\w*|effective)\b",
        ),
        (
            Category::Usage,
            r"\b(apply|applied|use|using|usage|how often|routine|morning|night|daily|store)\b",
        ),
    ];

    rules
        .into_iter()
        .filter_map(|(category, pattern)| {
            Regex::new(&format!("(?i){}", pattern))
                .ok()
                .map(|re| (category, re))
        })
        .collect()
});

/// Classify free-form question text by keyword, falling back to `General`.
pub fn classify_question(text: &str) -> Category {
    KEYWORD_RULES
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(category, _)| *category)
        .unwrap_or(Category::DEFAULT)
}
