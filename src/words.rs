//! Word normalization: heterogeneous raw vocabulary records into `NormalizedWord`

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::error::Result;

/// A derived form (or relation entry) with an optional gloss
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derivative {
    pub word: String,
    pub meaning: String,
}

/// Canonical vocabulary entry consumed by every generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedWord {
    pub id: String,
    pub term: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    pub example: String,
    pub derivatives: Vec<Derivative>,
    pub synonyms: Vec<String>,
    pub antonyms: Vec<String>,
}

impl NormalizedWord {
    pub fn relation(&self, kind: RelationKind) -> &[String] {
        match kind {
            RelationKind::Synonym => &self.synonyms,
            RelationKind::Antonym => &self.antonyms,
        }
    }

    pub fn has_example(&self) -> bool {
        !self.example.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Synonym,
    Antonym,
}

impl RelationKind {
    pub fn label(self) -> &'static str {
        match self {
            RelationKind::Synonym => "synonym",
            RelationKind::Antonym => "antonym",
        }
    }
}

const TERM_KEYS: &[&str] = &["term", "word"];
const MEANING_KEYS: &[&str] = &["meaning", "definition", "meanings"];
const EXAMPLE_KEYS: &[&str] = &["example", "example_sentence", "exampleSentence", "sentence"];
const EXAMPLE_TRANSLATION_KEYS: &[&str] = &[
    "example_translation",
    "exampleTranslation",
    "sentence_translation",
];

/// Normalize a list of raw records. Records without an id or term are dropped.
pub fn normalize_words(records: &[Value]) -> Vec<NormalizedWord> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| normalize_record(record, index))
        .collect()
}

/// Parse a JSON array of raw records and normalize it.
pub fn normalize_json_str(json: &str) -> Result<Vec<NormalizedWord>> {
    let value: Value = serde_json::from_str(json)?;
    let records = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("words") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    Ok(normalize_words(&records))
}

fn normalize_record(record: &Value, index: usize) -> Option<NormalizedWord> {
    let Value::Object(_) = record else {
        log::debug!("Skipping non-object vocabulary record at {}", index);
        return None;
    };

    let term = first_text(record, TERM_KEYS)?;
    let id = text_of(record.get("id")).unwrap_or_else(|| format!("word-{}", index + 1));
    if id.is_empty() || term.is_empty() {
        return None;
    }

    // `translation` doubles as the meaning only when no meaning key exists at all.
    let has_meaning_key = MEANING_KEYS.iter().any(|k| record.get(*k).is_some());
    let meaning = if has_meaning_key {
        first_text(record, MEANING_KEYS).unwrap_or_default()
    } else {
        text_of(record.get("translation")).unwrap_or_default()
    };

    let translation = first_text(record, EXAMPLE_TRANSLATION_KEYS).or_else(|| {
        if has_meaning_key {
            text_of(record.get("translation"))
        } else {
            None
        }
    });

    let derivatives = parse_entries(record.get("derivatives"), true)
        .into_iter()
        .filter(|d| !d.word.is_empty())
        .collect::<Vec<_>>();

    Some(NormalizedWord {
        id,
        term,
        meaning,
        translation,
        example: first_text(record, EXAMPLE_KEYS).unwrap_or_default(),
        derivatives: dedupe_entries(derivatives),
        synonyms: relation_words(record.get("synonyms")),
        antonyms: relation_words(record.get("antonyms")),
    })
}

fn text_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_text(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| text_of(record.get(*k)))
}

fn relation_words(value: Option<&Value>) -> Vec<String> {
    let mut seen = HashSet::new();
    parse_entries(value, false)
        .into_iter()
        .map(|entry| entry.word)
        .filter(|w| !w.is_empty() && seen.insert(w.clone()))
        .collect()
}

fn dedupe_entries(entries: Vec<Derivative>) -> Vec<Derivative> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|d| seen.insert(d.word.clone()))
        .collect()
}

/// Accepts an array of objects, an array of strings, or one delimited string.
fn parse_entries(value: Option<&Value>, parse_gloss: bool) -> Vec<Derivative> {
    let from_text = |text: &str| {
        if parse_gloss {
            parse_glossed(text)
        } else {
            Derivative {
                word: text.trim().to_string(),
                meaning: String::new(),
            }
        }
    };

    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(_) => Some(Derivative {
                    word: first_text(item, &["word", "term"]).unwrap_or_default(),
                    meaning: first_text(item, &["meaning", "translation"]).unwrap_or_default(),
                }),
                Value::String(s) => Some(from_text(s.as_str())),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => split_delimited(s)
            .iter()
            .map(|part| from_text(part.as_str()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Split on `,` `;` `/` outside of parentheses, trimming and dropping empties.
pub(crate) fn split_delimited(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in text.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' | ';' | '/' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

fn glossed_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*(.+?)\s*\(([^()]*)\)\s*$").unwrap())
}

/// `"resilient (탄력 있는)"` -> `{word: "resilient", meaning: "탄력 있는"}`
fn parse_glossed(text: &str) -> Derivative {
    match glossed_pattern().captures(text) {
        Some(caps) => Derivative {
            word: caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
            meaning: caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
        },
        None => Derivative {
            word: text.trim().to_string(),
            meaning: String::new(),
        },
    }
}

// ============= Python Bindings =============

#[cfg(feature = "python")]
pub(crate) mod py {
    use pyo3::prelude::*;

    /// JSON array of raw records in, JSON array of normalized words out
    #[pyfunction]
    #[pyo3(name = "normalize_words")]
    pub fn py_normalize_words(records_json: &str) -> PyResult<String> {
        let words = super::normalize_json_str(records_json)
            .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(e.to_string()))?;
        serde_json::to_string(&words)
            .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(e.to_string()))
    }
}
