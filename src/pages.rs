//! Page documents rendered from products and synthesized questions

use serde::Serialize;

use crate::blocks::{
    benefits_block, comparison_block, ingredients_block, product_summary, safety_block,
    ComparisonBlock, ProductSummary, SafetyBlock,
};
use crate::engine::Synthesis;
use crate::normalize::QuestionCandidate;
use crate::product::ProductRecord;
use crate::taxonomy::Category;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// How the FAQ questions were produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationInfo {
    pub model: String,
    pub from_model: usize,
    pub from_fallback: usize,
    pub prompt_sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaqPage {
    pub product_name: String,
    pub faq_items: Vec<QuestionCandidate>,
    pub categories: Vec<CategoryCount>,
    pub benefits: Vec<String>,
    pub ingredients: Vec<String>,
    pub usage: String,
    pub safety: SafetyBlock,
    pub pricing: String,
    pub generation: GenerationInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPage {
    pub product_name: String,
    pub concentration: Option<String>,
    pub benefits: Vec<String>,
    pub ingredients: Vec<String>,
    pub usage: String,
    pub safety: SafetyBlock,
    pub pricing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPage {
    pub product_a: ProductSummary,
    pub product_b: ProductSummary,
    pub comparison: ComparisonBlock,
}

/// Per-category counts in taxonomy order, omitting empty categories.
pub fn category_counts(questions: &[QuestionCandidate]) -> Vec<CategoryCount> {
    let mut counts = [0usize; Category::ALL.len()];
    for q in questions {
        counts[q.category.index()] += 1;
    }
    Category::ALL
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(category, count)| CategoryCount {
            category: *category,
            count,
        })
        .collect()
}

pub fn render_faq_page(product: &ProductRecord, synthesis: &Synthesis) -> FaqPage {
    FaqPage {
        product_name: product.display_name().to_string(),
        faq_items: synthesis.questions.clone(),
        categories: category_counts(&synthesis.questions),
        benefits: benefits_block(product),
        ingredients: ingredients_block(product),
        usage: product.usage.clone(),
        safety: safety_block(product),
        pricing: product.price.clone(),
        generation: GenerationInfo {
            model: synthesis.model.clone(),
            from_model: synthesis.from_model,
            from_fallback: synthesis.from_fallback,
            prompt_sha256: synthesis.prompt_sha256.clone(),
        },
    }
}

pub fn render_product_page(product: &ProductRecord) -> ProductPage {
    ProductPage {
        product_name: product.display_name().to_string(),
        concentration: product.concentration.clone(),
        benefits: benefits_block(product),
        ingredients: ingredients_block(product),
        usage: product.usage.clone(),
        safety: safety_block(product),
        pricing: product.price.clone(),
    }
}

pub fn render_comparison_page(a: &ProductRecord, b: &ProductRecord) -> ComparisonPage {
    ComparisonPage {
        product_a: product_summary(a),
        product_b: product_summary(b),
        comparison: comparison_block(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractionStrategy;
    use serde_json::json;

    fn glow() -> ProductRecord {
        ProductRecord {
            name: "GlowBoost".to_string(),
            concentration: Some("10% Vitamin C".to_string()),
            skin_types: vec!["All".to_string()],
            key_ingredients: vec!["Vitamin C".to_string()],
            benefits: vec!["Brightening".to_string()],
            usage: "Apply daily".to_string(),
            side_effects: "None".to_string(),
            price: "₹699".to_string(),
        }
    }

    fn synthesis(questions: Vec<QuestionCandidate>) -> Synthesis {
        Synthesis {
            from_model: questions.len(),
            questions,
            model: "fixed".to_string(),
            from_fallback: 0,
            strategy: ExtractionStrategy::JsonArray,
            model_error: None,
            prompt_sha256: "abc".to_string(),
        }
    }

    #[test]
    fn test_product_page_json() {
        let value = serde_json::to_value(render_product_page(&glow())).unwrap();
        assert_eq!(value["product_name"], "GlowBoost");
        assert_eq!(value["concentration"], "10% Vitamin C");
        assert_eq!(value["ingredients"], json!(["Vitamin C"]));
        assert_eq!(value["safety"], json!({"side_effects": "None", "skin_type": ["All"]}));
        assert_eq!(value["pricing"], "₹699");
    }

    #[test]
    fn test_faq_page_schema() {
        let questions = vec![
            QuestionCandidate::new(Category::Safety, "Is it safe?"),
            QuestionCandidate::new(Category::Usage, "How do I apply it?"),
            QuestionCandidate::new(Category::Safety, "Any side effects?"),
        ];
        let page = render_faq_page(&glow(), &synthesis(questions));
        let value = serde_json::to_value(&page).unwrap();

        for item in value["faq_items"].as_array().unwrap() {
            assert!(item["category"].is_string());
            assert!(item["question"].is_string());
        }
        assert_eq!(
            value["categories"],
            json!([
                {"category": "Usage", "count": 1},
                {"category": "Safety", "count": 2},
            ])
        );
        assert_eq!(value["generation"]["model"], "fixed");
        assert_eq!(value["generation"]["from_model"], 3);
    }

    #[test]
    fn test_comparison_page_json() {
        let a = glow();
        let mut b = glow();
        b.name = "Other".to_string();
        b.price = "₹899".to_string();
        b.key_ingredients.push("Niacinamide".to_string());

        let value = serde_json::to_value(render_comparison_page(&a, &b)).unwrap();
        assert_eq!(value["product_a"]["name"], "GlowBoost");
        assert_eq!(value["product_b"]["price"], "₹899");
        assert_eq!(value["comparison"]["shared_ingredients"], json!(["Vitamin C"]));
        assert_eq!(value["comparison"]["price_difference"], "₹699 vs ₹899");
        assert_eq!(value["comparison"]["key_differences"].as_array().unwrap().len(), 2);
    }
}
