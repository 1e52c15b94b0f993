//! Question model shared by all generators, plus option-index answer checking

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Replaces the target term (and parenthetical hints) in cloze sentences.
pub const MASK_TOKEN: &str = "_____";

pub const CHOICE_OPTION_COUNT: usize = 4;
pub const MAX_MULTI_SELECT_OPTIONS: usize = 8;
pub const MAX_MULTI_SELECT_CORRECT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    MultiSelect,
    Sentence,
    FillInWord,
    FillInMeaning,
}

impl QuestionType {
    pub fn is_free_text(self) -> bool {
        matches!(self, QuestionType::FillInWord | QuestionType::FillInMeaning)
    }

    pub fn recall_direction(self) -> Option<RecallDirection> {
        match self {
            QuestionType::FillInWord => Some(RecallDirection::Word),
            QuestionType::FillInMeaning => Some(RecallDirection::Meaning),
            _ => None,
        }
    }
}

/// Which side of a word the learner must produce in a fill-in question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecallDirection {
    /// Read the meaning, write the word.
    Word,
    /// Read the word, write the meaning.
    Meaning,
}

impl RecallDirection {
    pub fn question_type(self) -> QuestionType {
        match self {
            RecallDirection::Word => QuestionType::FillInWord,
            RecallDirection::Meaning => QuestionType::FillInMeaning,
        }
    }
}

/// Answer key, serialized as `correctAnswer` or `correctAnswers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerKey {
    Single {
        #[serde(rename = "correctAnswer")]
        correct_answer: usize,
    },
    Multiple {
        #[serde(rename = "correctAnswers")]
        correct_answers: BTreeSet<usize>,
    },
    /// Accepted text; may hold several alternatives separated by `,` or `;`.
    Text {
        #[serde(rename = "correctAnswer")]
        correct_answer: String,
    },
}

impl AnswerKey {
    pub fn single(index: usize) -> Self {
        AnswerKey::Single { correct_answer: index }
    }

    pub fn multiple(indices: BTreeSet<usize>) -> Self {
        AnswerKey::Multiple { correct_answers: indices }
    }

    pub fn text(accepted: impl Into<String>) -> Self {
        AnswerKey::Text { correct_answer: accepted.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceData {
    pub masked_english: String,
    pub masked_translation: String,
    /// Unmasked sentence for review screens; never shown while answering.
    pub original_english: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(flatten)]
    pub answer: AnswerKey,
    pub explanation: String,
    pub word_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence_data: Option<SentenceData>,
}

impl Question {
    /// Structural invariants every emitted question must satisfy.
    pub fn is_well_formed(&self) -> bool {
        let distinct = self.options.iter().collect::<HashSet<_>>().len() == self.options.len();

        match (&self.question_type, &self.answer) {
            (
                QuestionType::MultipleChoice | QuestionType::Sentence,
                AnswerKey::Single { correct_answer },
            ) => {
                let has_sentence =
                    self.question_type != QuestionType::Sentence || self.sentence_data.is_some();
                distinct
                    && self.options.len() == CHOICE_OPTION_COUNT
                    && *correct_answer < self.options.len()
                    && has_sentence
            }
            (QuestionType::MultiSelect, AnswerKey::Multiple { correct_answers }) => {
                distinct
                    && (2..=MAX_MULTI_SELECT_OPTIONS).contains(&self.options.len())
                    && (1..=MAX_MULTI_SELECT_CORRECT).contains(&correct_answers.len())
                    && correct_answers.iter().all(|&i| i < self.options.len())
            }
            (
                QuestionType::FillInWord | QuestionType::FillInMeaning,
                AnswerKey::Text { correct_answer },
            ) => {
                self.options.is_empty() && !correct_answer.trim().is_empty()
            }
            _ => false,
        }
    }

    /// Same question under a new id.
    pub(crate) fn with_id(&self, id: String) -> Question {
        Question { id, ..self.clone() }
    }
}

/// A learner's pick for a choice-based question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceSubmission {
    Single(usize),
    Multiple(BTreeSet<usize>),
}

/// Compare a submitted option index (or index set) against the answer key.
/// Free-text questions never match here; they go through the grader.
pub fn check_choice(question: &Question, submission: &ChoiceSubmission) -> bool {
    match (&question.answer, submission) {
        (AnswerKey::Single { correct_answer }, ChoiceSubmission::Single(picked)) => {
            correct_answer == picked
        }
        (AnswerKey::Single { correct_answer }, ChoiceSubmission::Multiple(picked)) => {
            picked.len() == 1 && picked.contains(correct_answer)
        }
        (AnswerKey::Multiple { correct_answers }, ChoiceSubmission::Multiple(picked)) => {
            correct_answers == picked
        }
        (AnswerKey::Multiple { correct_answers }, ChoiceSubmission::Single(picked)) => {
            correct_answers.len() == 1 && correct_answers.contains(picked)
        }
        (AnswerKey::Text { .. }, _) => false,
    }
}

/// Fresh id for a generated question; differs on every regeneration.
pub(crate) fn question_id<R: Rng + ?Sized>(prefix: &str, word_id: &str, rng: &mut R) -> String {
    format!("{}-{}-{:08x}", prefix, word_id, rng.gen::<u32>())
}

/// Distinct, non-empty values excluding `correct`, in first-seen order.
pub(crate) fn distractor_pool<'a>(
    values: impl IntoIterator<Item = &'a str>,
    correct: &str,
) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != correct.trim() && seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Pick 3 distractors and place the correct answer at a random position.
/// `None` when the pool cannot supply 3 distinct distractors.
pub(crate) fn four_options<R: Rng + ?Sized>(
    correct: &str,
    pool: &[String],
    rng: &mut R,
) -> Option<(Vec<String>, usize)> {
    let needed = CHOICE_OPTION_COUNT - 1;
    if pool.len() < needed {
        return None;
    }

    let mut options: Vec<String> = pool.choose_multiple(rng, needed).cloned().collect();
    options.push(correct.trim().to_string());
    options.shuffle(rng);

    let correct_index = options.iter().position(|o| o == correct.trim())?;
    Some((options, correct_index))
}

// ============= Python Binding =============

#[cfg(feature = "python")]
pub(crate) mod py {
    use pyo3::prelude::*;

    /// `submission_json` is an index (`2`) or an index list (`[0, 3]`).
    #[pyfunction]
    #[pyo3(name = "check_choice")]
    pub fn py_check_choice(question_json: &str, submission_json: &str) -> PyResult<bool> {
        let question: super::Question = serde_json::from_str(question_json)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
        let submission: super::ChoiceSubmission = serde_json::from_str(submission_json)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
        Ok(super::check_choice(&question, &submission))
    }
}
