//! Product records and the product-data parser.
//!
//! Product files are flat JSON objects keyed by `product_name`, `concentration`,
//! `skin_type`, `key_ingredients`, `benefits`, `how_to_use`, `side_effects` and
//! `price`. Missing keys default to empty values; unknown keys are ignored.

use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{PagegenError, Result};

/// Structured product data driving every generated page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "product_name", default)]
    pub name: String,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub concentration: Option<String>,
    #[serde(rename = "skin_type", default, deserialize_with = "de_string_list")]
    pub skin_types: Vec<String>,
    #[serde(default, deserialize_with = "de_string_list")]
    pub key_ingredients: Vec<String>,
    #[serde(default, deserialize_with = "de_string_list")]
    pub benefits: Vec<String>,
    #[serde(rename = "how_to_use", default, deserialize_with = "de_trimmed_string")]
    pub usage: String,
    #[serde(default, deserialize_with = "de_trimmed_string")]
    pub side_effects: String,
    #[serde(default, deserialize_with = "de_price")]
    pub price: String,
}

impl ProductRecord {
    /// Minimal record carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse a product from JSON text and validate it.
    pub fn from_json(text: &str) -> Result<Self> {
        let product: ProductRecord = serde_json::from_str(text)?;
        product.validate()?;
        Ok(product)
    }

    /// Read and parse a product file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| PagegenError::Io {
            message: format!("failed to read {:?}: {}", path, e),
        })?;
        Self::from_json(&text)
    }

    /// A product is usable once it has a non-blank name.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PagegenError::InvalidProduct {
                message: "product_name is missing or empty".to_string(),
            });
        }
        Ok(())
    }

    /// Trimmed product name.
    pub fn display_name(&self) -> &str {
        self.name.trim()
    }

    /// Filesystem-friendly identifier derived from the name.
    pub fn slug(&self) -> String {
        let mut slug = String::new();
        for c in self.display_name().chars() {
            if c.is_alphanumeric() {
                slug.extend(c.to_lowercase());
            } else if !slug.ends_with('-') && !slug.is_empty() {
                slug.push('-');
            }
        }
        let trimmed = slug.trim_end_matches('-');
        if trimmed.is_empty() {
            "product".to_string()
        } else {
            trimmed.to_string()
        }
    }

    pub fn ingredients_text(&self) -> Option<String> {
        join_non_empty(&self.key_ingredients)
    }

    pub fn benefits_text(&self) -> Option<String> {
        join_non_empty(&self.benefits)
    }
}

fn join_non_empty(items: &[String]) -> Option<String> {
    let parts: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Accepts an array of strings or a single comma-separated string.
fn de_string_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(serde_json::Value::String(s)) => Ok(s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect()),
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => {
                    let s = s.trim().to_string();
                    (!s.is_empty()).then_some(Ok(s))
                }
                serde_json::Value::Null => None,
                other => Some(Err(D::Error::custom(format!(
                    "expected string list item, got {}",
                    other
                )))),
            })
            .collect(),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or array of strings, got {}",
            other
        ))),
    }
}

fn de_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

fn de_trimmed_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(de_opt_string(deserializer)?.unwrap_or_default())
}

/// Prices stay untyped text; bare numbers are rendered as-is.
fn de_price<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(String::new()),
        Some(serde_json::Value::String(s)) => Ok(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(D::Error::custom(format!(
            "expected price as string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
        "product_name": "GlowBoost Vitamin C Serum",
        "concentration": "10% Vitamin C",
        "skin_type": ["Oily", "Combination"],
        "key_ingredients": ["Vitamin C", "Hyaluronic Acid"],
        "benefits": ["Brightening", "Fades dark spots"],
        "how_to_use": "Apply 2-3 drops in the morning before sunscreen",
        "side_effects": "Mild tingling for sensitive skin",
        "price": "₹699"
    }"#;

    #[test]
    fn test_parse_full_record() {
        let p = ProductRecord::from_json(SAMPLE).unwrap();
        assert_eq!(p.name, "GlowBoost Vitamin C Serum");
        assert_eq!(p.concentration.as_deref(), Some("10% Vitamin C"));
        assert_eq!(p.skin_types, vec!["Oily", "Combination"]);
        assert_eq!(p.key_ingredients, vec!["Vitamin C", "Hyaluronic Acid"]);
        assert_eq!(p.usage, "Apply 2-3 drops in the morning before sunscreen");
        assert_eq!(p.price, "₹699");
    }

    #[test]
    fn test_missing_fields_default() {
        let p = ProductRecord::from_json(r#"{"product_name": "X", "color": "red"}"#).unwrap();
        assert_eq!(p.name, "X");
        assert!(p.concentration.is_none());
        assert!(p.skin_types.is_empty());
        assert!(p.benefits.is_empty());
        assert_eq!(p.price, "");
    }

    #[test]
    fn test_missing_name_is_invalid() {
        let err = ProductRecord::from_json(r#"{"benefits": ["Hydration"]}"#).unwrap_err();
        assert!(matches!(err, PagegenError::InvalidProduct { .. }));

        let err = ProductRecord::from_json(r#"{"product_name": "   "}"#).unwrap_err();
        assert!(matches!(err, PagegenError::InvalidProduct { .. }));
    }

    #[test]
    fn test_forgiving_lists_and_price() {
        let p = ProductRecord::from_json(
            r#"{"product_name": "X", "skin_type": "Oily, Dry", "benefits": ["A", "", null], "price": 699}"#,
        )
        .unwrap();
        assert_eq!(p.skin_types, vec!["Oily", "Dry"]);
        assert_eq!(p.benefits, vec!["A"]);
        assert_eq!(p.price, "699");
    }

    #[test]
    fn test_text_fields_trimmed() {
        let p = ProductRecord::from_json(
            r#"{"product_name": " X ", "how_to_use": "  Apply at night\n", "side_effects": null, "concentration": "  "}"#,
        )
        .unwrap();
        assert_eq!(p.usage, "Apply at night");
        assert_eq!(p.side_effects, "");
        assert!(p.concentration.is_none());
    }

    #[test]
    fn test_wrong_list_type_rejected() {
        let err = ProductRecord::from_json(r#"{"product_name": "X", "benefits": 3}"#).unwrap_err();
        assert!(matches!(err, PagegenError::Serialization { .. }));
    }

    #[test]
    fn test_slug() {
        assert_eq!(
            ProductRecord::named("GlowBoost Vitamin C Serum").slug(),
            "glowboost-vitamin-c-serum"
        );
        assert_eq!(ProductRecord::named("  A&B -- 10% ").slug(), "a-b-10");
        assert_eq!(ProductRecord::named("!!!").slug(), "product");
    }

    #[test]
    fn test_joined_text() {
        let mut p = ProductRecord::named("X");
        assert!(p.ingredients_text().is_none());
        p.key_ingredients = vec!["Vitamin C".into(), "Niacinamide".into()];
        assert_eq!(p.ingredients_text().as_deref(), Some("Vitamin C, Niacinamide"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("product.json");
        fs::write(&path, SAMPLE).unwrap();
        let p = ProductRecord::load(&path).unwrap();
        assert_eq!(p.benefits.len(), 2);

        let missing = ProductRecord::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, PagegenError::Io { .. }));
    }
}
