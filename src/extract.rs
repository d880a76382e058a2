//! Candidate extraction from raw model output.
//!
//! Models are asked for a JSON array but frequently wrap it in prose, use single
//! quotes, or leave trailing commas. Extraction recovers what it can and never
//! fails: unusable text simply yields no candidates.

use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

use crate::prompt::ResponseFormat;
use crate::taxonomy::classify_question;

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("trailing comma pattern"));

static ENUMERATION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d+\s*[.):]|[-*•]+|(?i:q)\d*\s*[.):])\s*").expect("enumeration pattern")
});

/// Which strategy produced the candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    JsonArray,
    Lines,
    None,
}

/// Raw candidates recovered from one model response
#[derive(Debug, Clone)]
pub struct Extraction {
    pub candidates: Vec<Value>,
    pub strategy: ExtractionStrategy,
}

/// Extract candidates using the strategy matching the requested format.
///
/// A JSON response that cannot be recovered yields no candidates; its lines are
/// fragments of objects, not questions.
pub fn extract(raw: &str, format: ResponseFormat) -> Extraction {
    let (candidates, strategy) = match format {
        ResponseFormat::Json => (extract_json_array(raw), ExtractionStrategy::JsonArray),
        ResponseFormat::Lines => (extract_lines(raw), ExtractionStrategy::Lines),
    };
    if candidates.is_empty() {
        tracing::debug!("No candidates recovered from {} byte response", raw.len());
        return Extraction {
            candidates,
            strategy: ExtractionStrategy::None,
        };
    }
    Extraction { candidates, strategy }
}

/// Parse the span between the first `[` and the last `]` as a JSON array.
pub fn extract_json_array(raw: &str) -> Vec<Value> {
    let (Some(start), Some(end)) = (raw.find('['), raw.rfind(']')) else {
        return Vec::new();
    };
    if end < start {
        return Vec::new();
    }
    let span = &raw[start..=end];

    if let Some(items) = parse_array(span) {
        return items;
    }

    let without_commas = strip_trailing_commas(span);
    if let Some(items) = parse_array(&without_commas) {
        return items;
    }

    match parse_array(&repair_json(span)) {
        Some(items) => items,
        None => {
            tracing::debug!("JSON array unparseable after repair ({} bytes)", span.len());
            Vec::new()
        }
    }
}

fn parse_array(text: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}

fn strip_trailing_commas(text: &str) -> String {
    TRAILING_COMMA.replace_all(text, "$1").into_owned()
}

/// Full repair: single quotes become double quotes, trailing commas go.
///
/// Only tried after stripping commas alone has failed, since apostrophes inside
/// double-quoted strings do not survive the quote swap.
pub fn repair_json(text: &str) -> String {
    strip_trailing_commas(&text.replace('\'', "\""))
}

/// Keep question lines, stripping enumeration markers and classifying by keyword.
pub fn extract_lines(raw: &str) -> Vec<Value> {
    raw.lines()
        .filter_map(|line| {
            let stripped = ENUMERATION_MARKER.replace(line, "");
            let question = stripped
                .trim()
                .trim_end_matches(',')
                .trim_matches('"')
                .trim();
            if question.len() < 2 || !question.ends_with('?') {
                return None;
            }
            Some(json!({
                "category": classify_question(question).as_str(),
                "question": question,
            }))
        })
        .collect()
}
