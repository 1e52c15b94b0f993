//! Error types for vocabulary import, configuration and bank assembly

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read Excel file: {0}")]
    Excel(#[from] calamine::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    InvalidSheet(String),

    #[error("Unknown stage {0}")]
    UnknownStage(u8),

    /// Stage 1 could not be built, so no other stage has a fallback.
    #[error("Not enough vocabulary to build a question bank")]
    InsufficientVocabulary,
}

pub type Result<T> = std::result::Result<T, EngineError>;
