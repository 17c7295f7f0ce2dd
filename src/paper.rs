//! Canonical paper record and the normalizer that builds it.
//!
//! Raw input is whatever a JSONL line decodes to; [`normalize`] validates the
//! mandatory fields and backfills defaults for everything else.

use crate::hash::stable_hash_str;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Domain tag used when a record carries none.
pub const DEFAULT_DOMAIN: &str = "execution";

/// Fallback for a missing `actionable_insight`.
pub const DEFAULT_INSIGHT: &str =
    "Evidence suggests structured execution improves outcomes under constraints.";

/// Fallback for a missing `action_hint`.
pub const DEFAULT_ACTION_HINT: &str =
    "Define one concrete next step and execute within the next focused block.";

/// Placeholder when neither `source_url` nor `doi` is present.
pub const DOI_PREFIX: &str = "https://doi.org/";

/// Raw record as decoded from one JSONL line.
pub type RawRecord = Map<String, Value>;

/// Normalized bibliographic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    pub id: String,
    pub title: String,
    pub year: i64,
    pub domain: String,
    pub actionable_insight: String,
    pub action_hint: String,
    pub source_url: String,
    pub keywords: Vec<String>,
}

impl Paper {
    /// Deduplication key: lower-cased title plus year.
    pub fn key(&self) -> (String, i64) {
        (self.title.to_lowercase(), self.year)
    }
}

/// Normalize a raw record into a [`Paper`].
///
/// Returns `None` when the title is blank or the year is not positive.
pub fn normalize(raw: &RawRecord) -> Option<Paper> {
    let title = field_text(raw, "title");
    let year = field_year(raw.get("year"));
    if title.is_empty() || year <= 0 {
        return None;
    }

    let id = match field_text(raw, "id") {
        id if id.is_empty() => derive_id(&title, year),
        id => id,
    };

    let domain = match field_text(raw, "domain").to_lowercase() {
        d if d.is_empty() => DEFAULT_DOMAIN.to_string(),
        d => d,
    };

    let source_url = Some(field_text(raw, "source_url"))
        .filter(|s| !s.is_empty())
        .or_else(|| Some(field_text(raw, "doi")).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| DOI_PREFIX.to_string());

    let mut keywords = normalize_keywords(raw.get("keywords"));
    if keywords.is_empty() {
        keywords = vec![domain.clone(), "execution".to_string(), "atlas".to_string()];
    }

    Some(Paper {
        id,
        title,
        year,
        actionable_insight: or_default(field_text(raw, "actionable_insight"), DEFAULT_INSIGHT),
        action_hint: or_default(field_text(raw, "action_hint"), DEFAULT_ACTION_HINT),
        domain,
        source_url,
        keywords,
    })
}

/// Clean a keyword field: either a list of values or a `,`/`;` separated string.
///
/// Any other shape yields an empty list.
pub fn normalize_keywords(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|v| clean_token(&value_text(v))).collect(),
        Some(Value::String(s)) => s
            .split([',', ';'])
            .filter_map(clean_token)
            .collect(),
        _ => Vec::new(),
    }
}

/// Stable id for records that arrive without one.
pub fn derive_id(title: &str, year: i64) -> String {
    let hash = stable_hash_str(year as u64, title);
    format!("paper-{}", hash % 1_000_000)
}

fn clean_token(token: &str) -> Option<String> {
    let token = token.trim().to_lowercase();
    (!token.is_empty()).then_some(token)
}

fn or_default(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Trimmed string form of a field; null and missing become empty.
fn field_text(raw: &RawRecord, key: &str) -> String {
    raw.get(key).map(value_text).unwrap_or_default().trim().to_string()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Missing, null, or non-numeric years read as 0.
fn field_year(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
