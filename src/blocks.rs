//! Reusable content blocks derived directly from product data

use serde::Serialize;
use std::collections::HashSet;

use crate::product::ProductRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyBlock {
    pub side_effects: String,
    pub skin_type: Vec<String>,
}

/// One side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub name: String,
    pub price: String,
    pub ingredients: Vec<String>,
    pub benefits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonBlock {
    pub price_difference: String,
    pub shared_ingredients: Vec<String>,
    pub key_differences: Vec<String>,
    pub overall_summary: String,
}

pub fn safety_block(product: &ProductRecord) -> SafetyBlock {
    SafetyBlock {
        side_effects: product.side_effects.clone(),
        skin_type: product.skin_types.clone(),
    }
}

pub fn ingredients_block(product: &ProductRecord) -> Vec<String> {
    product.key_ingredients.clone()
}

pub fn benefits_block(product: &ProductRecord) -> Vec<String> {
    product.benefits.clone()
}

pub fn product_summary(product: &ProductRecord) -> ProductSummary {
    ProductSummary {
        name: product.display_name().to_string(),
        price: product.price.clone(),
        ingredients: product.key_ingredients.clone(),
        benefits: product.benefits.clone(),
    }
}

fn ingredient_key(ingredient: &str) -> String {
    ingredient.trim().to_lowercase()
}

/// Ingredients of `a` also present in `b`, in `a`'s order, without repeats.
pub fn shared_ingredients(a: &ProductRecord, b: &ProductRecord) -> Vec<String> {
    let in_b: HashSet<String> = b.key_ingredients.iter().map(|i| ingredient_key(i)).collect();
    let mut seen = HashSet::new();
    a.key_ingredients
        .iter()
        .filter(|i| {
            let key = ingredient_key(i);
            in_b.contains(&key) && seen.insert(key)
        })
        .cloned()
        .collect()
}

fn has_unique_ingredients(a: &ProductRecord, b: &ProductRecord) -> bool {
    let in_b: HashSet<String> = b.key_ingredients.iter().map(|i| ingredient_key(i)).collect();
    a.key_ingredients
        .iter()
        .any(|i| !in_b.contains(&ingredient_key(i)))
}

pub fn price_difference(a: &ProductRecord, b: &ProductRecord) -> String {
    if a.price.trim() == b.price.trim() {
        "Same price".to_string()
    } else {
        format!("{} vs {}", a.price, b.price)
    }
}

pub fn key_differences(a: &ProductRecord, b: &ProductRecord) -> Vec<String> {
    let mut diffs = Vec::new();

    if a.price.trim() != b.price.trim() {
        diffs.push(format!(
            "{} is priced at {}, while {} costs {}.",
            a.display_name(),
            a.price,
            b.display_name(),
            b.price
        ));
    }
    if has_unique_ingredients(a, b) {
        diffs.push(format!(
            "{} contains unique ingredients not found in the other product.",
            a.display_name()
        ));
    }
    if has_unique_ingredients(b, a) {
        diffs.push(format!(
            "{} contains ingredients not present in the other product.",
            b.display_name()
        ));
    }

    diffs
}

pub fn comparison_summary(a: &ProductRecord, b: &ProductRecord) -> String {
    format!(
        "{} and {} are comparable products with overlapping ingredients and benefits. \
         The final choice depends on pricing preferences and formulation differences.",
        a.display_name(),
        b.display_name()
    )
}

pub fn comparison_block(a: &ProductRecord, b: &ProductRecord) -> ComparisonBlock {
    ComparisonBlock {
        price_difference: price_difference(a, b),
        shared_ingredients: shared_ingredients(a, b),
        key_differences: key_differences(a, b),
        overall_summary: comparison_summary(a, b),
    }
}
