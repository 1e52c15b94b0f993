//! Vocabulary file import (CSV, Excel, JSON) into raw records for normalization

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::error::{EngineError, Result};
use crate::words::{normalize_words, NormalizedWord};

/// Load and normalize a vocabulary file, dispatching on its extension.
pub fn load_vocabulary_file(file_path: &str) -> Result<Vec<NormalizedWord>> {
    let records = read_raw_records(file_path)?;
    Ok(normalize_words(&records))
}

/// Raw records as they appear in the file, before normalization.
pub fn read_raw_records(file_path: &str) -> Result<Vec<Value>> {
    let path = Path::new(file_path);
    let extension = path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xls" => parse_excel(file_path),
        "csv" => parse_csv(file_path),
        "json" => parse_json(file_path),
        _ => Err(EngineError::UnsupportedFormat(extension)),
    }
}

/// Header column -> normalized record key
#[derive(Debug, Default, Clone)]
pub struct ColumnMapping {
    pub word: usize,
    pub columns: Vec<(usize, &'static str)>,
}

/// Detect column indices from header names
fn detect_columns(headers: &[String]) -> Result<ColumnMapping> {
    let mut mapping = ColumnMapping::default();
    let mut word_found = false;

    for (i, header) in headers.iter().enumerate() {
        let key = match header.to_lowercase().trim() {
            "word" | "words" | "term" | "vocabulary" => {
                mapping.word = i;
                word_found = true;
                continue;
            }
            "id" => "id",
            "meaning" | "meanings" | "definition" | "definitions" | "translation" => "meaning",
            "example" | "example_sentence" | "sentence" => "example",
            "example_translation" | "sentence_translation" => "example_translation",
            "derivative" | "derivatives" => "derivatives",
            "synonym" | "synonyms" => "synonyms",
            "antonym" | "antonyms" => "antonyms",
            _ => continue, // Unknown columns ignored
        };
        mapping.columns.push((i, key));
    }

    if !word_found {
        return Err(EngineError::InvalidSheet(
            "Missing required 'Word' column in file header".to_string(),
        ));
    }
    if !mapping.columns.iter().any(|(_, key)| *key != "id") {
        return Err(EngineError::InvalidSheet(
            "At least one additional column required \
             (Meaning, Example, Derivatives, Synonyms, or Antonyms)"
                .to_string(),
        ));
    }

    Ok(mapping)
}

/// Build one raw record from a row; `None` when the word cell is empty.
fn row_to_record(mapping: &ColumnMapping, cell: impl Fn(usize) -> String) -> Option<Value> {
    let word = cell(mapping.word);
    if word.is_empty() {
        return None;
    }

    let mut record = Map::new();
    record.insert("word".to_string(), Value::String(word));
    for &(i, key) in &mapping.columns {
        let value = cell(i);
        if !value.is_empty() {
            record.insert(key.to_string(), Value::String(value));
        }
    }
    Some(Value::Object(record))
}

/// Parse the first sheet of an Excel workbook
pub fn parse_excel(file_path: &str) -> Result<Vec<Value>> {
    let mut workbook = open_workbook_auto(file_path)?;

    let sheet_name = workbook.sheet_names().first()
        .cloned()
        .ok_or_else(|| EngineError::InvalidSheet("No sheets found in Excel file".to_string()))?;

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows();

    let header_row = rows.next()
        .ok_or_else(|| EngineError::InvalidSheet("Empty file - no header row".to_string()))?;
    let headers: Vec<String> = header_row.iter().map(get_cell_string).collect();
    let mapping = detect_columns(&headers)?;

    Ok(rows
        .filter_map(|row| {
            row_to_record(&mapping, |i| row.get(i).map(get_cell_string).unwrap_or_default())
        })
        .collect())
}

/// Parse a CSV file with a header row
pub fn parse_csv(file_path: &str) -> Result<Vec<Value>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(file_path)?;

    let headers: Vec<String> = reader.headers()?
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mapping = detect_columns(&headers)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let cell = |i: usize| row.get(i).unwrap_or("").trim().to_string();
        if let Some(record) = row_to_record(&mapping, cell) {
            records.push(record);
        }
    }
    Ok(records)
}

/// Parse a JSON array (or `{"words": [...]}`) of raw records
pub fn parse_json(file_path: &str) -> Result<Vec<Value>> {
    let contents = fs::read_to_string(file_path)?;
    Ok(match serde_json::from_str::<Value>(&contents)? {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("words") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    })
}

/// Helper to extract string from Excel cell
fn get_cell_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        Data::Empty => String::new(),
    }
}

// ============= Python Bindings =============

#[cfg(feature = "python")]
pub(crate) mod py {
    use pyo3::prelude::*;

    #[pyfunction]
    #[pyo3(name = "load_vocabulary_file")]
    pub fn py_load_vocabulary_file(file_path: &str) -> PyResult<String> {
        let words = super::load_vocabulary_file(file_path)
            .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(e.to_string()))?;
        serde_json::to_string(&words)
            .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(e.to_string()))
    }
}
