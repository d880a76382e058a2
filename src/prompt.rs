//! Generation prompts for the question model.

use crate::product::ProductRecord;
use crate::taxonomy::taxonomy_labels;

const JSON_PROMPT_TEMPLATE: &str = r#"You are an expert FAQ writer for skincare and beauty products.

Write {count} distinct, customer-facing FAQ questions about the product below.

Return ONLY a JSON array, with no text before or after it. Each element must have exactly this shape:
{"category": "<one of: {categories}>", "question": "<a short, clear question ending with ?>"}

Use only these categories: {categories}.
Cover every category at least once. Do not repeat questions.

PRODUCT
Name: {name}
Key ingredients: {ingredients}
Benefits: {benefits}
How to use: {usage}"#;

const LINES_PROMPT_TEMPLATE: &str = r#"You are an expert FAQ writer for skincare and beauty products.

Write {count} distinct, customer-facing FAQ questions about the product below.
Write one question per line. Every line must end with a question mark. Do not add answers.
Cover these topics: {categories}.

PRODUCT
Name: {name}
Key ingredients: {ingredients}
Benefits: {benefits}
How to use: {usage}"#;

/// Shape of the model output requested by the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Lines,
}

impl std::str::FromStr for ResponseFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "lines" => Ok(Self::Lines),
            other => Err(format!("unknown response format '{}' (expected json or lines)", other)),
        }
    }
}

/// Build the question-generation prompt for a product.
pub fn build_prompt(product: &ProductRecord, target_count: usize, format: ResponseFormat) -> String {
    let template = match format {
        ResponseFormat::Json => JSON_PROMPT_TEMPLATE,
        ResponseFormat::Lines => LINES_PROMPT_TEMPLATE,
    };

    let usage = product.usage.trim();
    template
        .replace("{count}", &target_count.to_string())
        .replace("{categories}", &taxonomy_labels())
        .replace("{name}", product.display_name())
        .replace(
            "{ingredients}",
            &product.ingredients_text().unwrap_or_else(|| "not specified".to_string()),
        )
        .replace(
            "{benefits}",
            &product.benefits_text().unwrap_or_else(|| "not specified".to_string()),
        )
        .replace("{usage}", if usage.is_empty() { "not specified" } else { usage })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> ProductRecord {
        ProductRecord {
            name: "GlowSerum".to_string(),
            key_ingredients: vec!["Vitamin C".to_string(), "Hyaluronic Acid".to_string()],
            benefits: vec!["Brightening".to_string()],
            usage: "Apply in the morning".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_prompt_embeds_product_and_taxonomy() {
        let prompt = build_prompt(&product(), 20, ResponseFormat::Json);
        assert!(prompt.contains("Write 20 distinct"));
        assert!(prompt.contains("Name: GlowSerum"));
        assert!(prompt.contains("Key ingredients: Vitamin C, Hyaluronic Acid"));
        assert!(prompt.contains("Benefits: Brightening"));
        assert!(prompt.contains("How to use: Apply in the morning"));
        assert!(prompt.contains("Usage, Safety, Ingredients, Benefits, Pricing, Comparison, General"));
        assert!(prompt.contains("JSON array"));
        assert!(prompt.contains(r#"{"category": "<one of: Usage,"#));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_prompt(&product(), 20, ResponseFormat::Json);
        let b = build_prompt(&product(), 20, ResponseFormat::Json);
        assert_eq!(a, b);
    }

    #[test]
    fn test_prompt_missing_fields() {
        let prompt = build_prompt(&ProductRecord::named("Plain"), 18, ResponseFormat::Lines);
        assert!(prompt.contains("Key ingredients: not specified"));
        assert!(prompt.contains("How to use: not specified"));
        assert!(prompt.contains("one question per line"));
        assert!(!prompt.contains("JSON"));
    }

    #[test]
    fn test_response_format_parse() {
        assert_eq!("JSON".parse::<ResponseFormat>().unwrap(), ResponseFormat::Json);
        assert_eq!(" lines".parse::<ResponseFormat>().unwrap(), ResponseFormat::Lines);
        assert!("xml".parse::<ResponseFormat>().is_err());
    }
}
