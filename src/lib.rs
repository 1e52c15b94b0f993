//! WordStage Core - vocabulary normalization, staged question generation,
//! answer grading and stage progression for the WordStage quiz app.
//!
//! Everything is plain Rust; the `python` feature exposes a JSON-in/JSON-out
//! module for the app backend.

mod arbiter;
mod bank;
mod config;
mod error;
mod fuzzy;
mod generators;
mod grader;
mod import;
mod matching;
mod progress;
mod question;
mod words;

pub use arbiter::{
    ArbiterError, ArbiterRequest, ArbiterVerdict, HttpArbiter, NoArbiter, SemanticArbiter,
};
pub use bank::{build_question_bank, generate_stage_questions, QuestionBank};
pub use config::{load_config_from_file, EngineConfig, GradingConfig, QuestionLimits};
pub use error::{EngineError, Result};
pub use fuzzy::{best_similarity, similarity, split_alternatives};
pub use generators::{
    generate_derivative_questions, generate_fill_in_questions, generate_meaning_questions,
    generate_relation_questions, generate_sentence_questions, mask_sentence,
};
pub use grader::{FillInAnswerGrader, GradingResult, GradingTier};
pub use import::load_vocabulary_file;
pub use matching::{build_matching_round, MatchingRound};
pub use progress::{
    default_stage_definitions, PracticeMode, ProgressState, StageDefinition, StageId,
    StageProgressionEngine, StageStatus, StageTransition, ALL_IN_ONE_STAGE, STAGE_IDS,
};
pub use question::{
    check_choice, AnswerKey, ChoiceSubmission, Question, QuestionType, RecallDirection,
    SentenceData, CHOICE_OPTION_COUNT, MASK_TOKEN,
};
pub use words::{normalize_json_str, normalize_words, Derivative, NormalizedWord, RelationKind};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// WordStage Core Python Module
#[cfg(feature = "python")]
#[pymodule]
fn wordstage_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Vocabulary input
    m.add_function(wrap_pyfunction!(words::py::py_normalize_words, m)?)?;
    m.add_function(wrap_pyfunction!(import::py::py_load_vocabulary_file, m)?)?;

    // Question generation
    m.add_function(wrap_pyfunction!(bank::py::py_build_question_bank, m)?)?;
    m.add_function(wrap_pyfunction!(bank::py::py_generate_stage_questions, m)?)?;
    m.add_function(wrap_pyfunction!(matching::py::py_build_matching_round, m)?)?;

    // Grading
    m.add_function(wrap_pyfunction!(question::py::py_check_choice, m)?)?;
    m.add_function(wrap_pyfunction!(grader::py::py_grade_answer, m)?)?;

    // Stage progression
    m.add_function(wrap_pyfunction!(progress::py::py_initial_progress, m)?)?;
    m.add_function(wrap_pyfunction!(progress::py::py_restore_progress, m)?)?;
    m.add_function(wrap_pyfunction!(progress::py::py_start_stage, m)?)?;
    m.add_function(wrap_pyfunction!(progress::py::py_complete_mode, m)?)?;
    m.add_function(wrap_pyfunction!(progress::py::py_available_modes, m)?)?;

    Ok(())
}
