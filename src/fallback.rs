//! Deterministic, model-free question generation.
//!
//! The table is walked in order and wraps around. The first pass uses the plain
//! templates; every later pass qualifies each question with one follow-up
//! context, so each pass yields fresh dedup keys. The number of passes is
//! bounded by the context list.

use crate::error::{PagegenError, Result};
use crate::normalize::{QuestionCandidate, QuestionSet};
use crate::product::ProductRecord;
use crate::taxonomy::Category;

/// Template placeholders: `{name}`, `{ingredients}`, `{benefits}`.
/// The first seven rows cover every category once.
const FALLBACK_TABLE: &[(Category, &str)] = &[
    (Category::Usage, "How should I apply {name}?"),
    (Category::Safety, "Is {name} safe for sensitive skin?"),
    (Category::Ingredients, "What are the key ingredients in {name}?"),
    (Category::Benefits, "What results can I expect from {name}?"),
    (Category::Pricing, "What is the price of {name}?"),
    (Category::Comparison, "How does {name} compare with similar skincare products?"),
    (Category::General, "Who can benefit most from using {name}?"),
    (Category::Usage, "Can I use {name} daily?"),
    (Category::Safety, "Does {name} have any side effects?"),
    (Category::Ingredients, "How does {ingredients} benefit the skin?"),
    (Category::Benefits, "How does {name} help with {benefits}?"),
    (Category::Pricing, "Is {name} available in different sizes?"),
    (Category::Comparison, "What makes {name} different from other serums?"),
    (Category::General, "How should {name} be stored?"),
    (Category::Benefits, "How long until I see visible improvements from using {name}?"),
];

/// Qualifiers appended on each pass after the first.
const FOLLOW_UP_CONTEXTS: &[&str] = &[
    "for first-time users",
    "as part of a morning routine",
    "as part of an evening routine",
    "alongside other skincare products",
    "during the summer months",
    "during the winter months",
    "while travelling",
    "over several months of use",
];

/// Number of passes the generator may make over the table.
pub const MAX_FALLBACK_CYCLES: usize = FOLLOW_UP_CONTEXTS.len() + 1;

/// Upper bound on distinct questions the generator can ever produce.
pub const fn fallback_capacity() -> usize {
    FALLBACK_TABLE.len() * MAX_FALLBACK_CYCLES
}

/// Render one table row for a product on a given pass.
fn render(template: &str, product: &ProductRecord, cycle: usize) -> String {
    let name = product.display_name();
    let ingredients = product
        .ingredients_text()
        .unwrap_or_else(|| "its active ingredients".to_string());
    let benefits = product
        .benefits_text()
        .map(|b| b.to_lowercase())
        .unwrap_or_else(|| "your skin concerns".to_string());

    let question = template
        .replace("{name}", name)
        .replace("{ingredients}", &ingredients)
        .replace("{benefits}", &benefits);

    match cycle.checked_sub(1).and_then(|i| FOLLOW_UP_CONTEXTS.get(i)) {
        Some(context) => {
            let stem = question.trim_end_matches('?');
            format!("{} {}?", stem, context)
        }
        None => question,
    }
}

/// Deterministic generator over the fallback table for one product
pub struct FallbackGenerator<'a> {
    product: &'a ProductRecord,
}

impl<'a> FallbackGenerator<'a> {
    pub fn new(product: &'a ProductRecord) -> Self {
        Self { product }
    }

    /// Every question the generator can produce, in emission order.
    pub fn sequence(&self) -> impl Iterator<Item = QuestionCandidate> + '_ {
        (0..MAX_FALLBACK_CYCLES).flat_map(move |cycle| {
            FALLBACK_TABLE
                .iter()
                .map(move |(category, template)| {
                    QuestionCandidate::new(*category, render(template, self.product, cycle))
                })
        })
    }

    /// Fill `set` to its limit, skipping anything it already holds.
    ///
    /// Returns how many entries were added, or `FallbackExhausted` when the
    /// bounded sequence runs out first.
    pub fn fill(&self, set: &mut QuestionSet) -> Result<usize> {
        let mut added = 0;
        for candidate in self.sequence() {
            if set.is_full() {
                break;
            }
            if set.insert(candidate) {
                added += 1;
            }
        }

        if !set.is_full() {
            return Err(PagegenError::FallbackExhausted {
                requested: set.len() + set.remaining(),
                produced: set.len(),
            });
        }
        Ok(added)
    }

    /// Generate `count` unique fallback questions on their own.
    pub fn generate(&self, count: usize) -> Result<Vec<QuestionCandidate>> {
        let mut set = QuestionSet::new(count);
        self.fill(&mut set)?;
        Ok(set.into_vec())
    }
}
