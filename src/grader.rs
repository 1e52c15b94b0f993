//! Three-tier free-text grading: exact match, fuzzy similarity, then the
//! semantic arbiter (meaning recall only) with a local fallback.

use serde::Serialize;

use crate::arbiter::{ArbiterError, ArbiterRequest, NoArbiter, SemanticArbiter};
use crate::config::GradingConfig;
use crate::fuzzy::{best_similarity, split_alternatives};
use crate::question::RecallDirection;

/// Which tier decided the result. Diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GradingTier {
    Exact,
    Fuzzy,
    Arbitrated,
    /// Arbiter failed; decided by the local fallback threshold.
    Fallback,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingResult {
    pub is_correct: bool,
    pub feedback: String,
    pub tier: GradingTier,
    /// Best similarity against any accepted alternative.
    pub score: f64,
}

impl GradingResult {
    fn new(is_correct: bool, tier: GradingTier, score: f64, feedback: String) -> Self {
        Self {
            is_correct,
            feedback,
            tier,
            score,
        }
    }
}

pub struct FillInAnswerGrader<A = NoArbiter> {
    config: GradingConfig,
    arbiter: A,
}

impl FillInAnswerGrader<NoArbiter> {
    /// Grader without an arbiter: meaning answers always use the local fallback.
    pub fn local(config: GradingConfig) -> Self {
        Self {
            config,
            arbiter: NoArbiter,
        }
    }
}

impl<A: SemanticArbiter> FillInAnswerGrader<A> {
    pub fn new(config: GradingConfig, arbiter: A) -> Self {
        Self { config, arbiter }
    }

    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    /// Tiers 1 and 2. `Some` when either accepts, `None` when the answer needs
    /// the arbiter (or is wrong).
    pub fn grade_locally(
        &self,
        expected: &str,
        user_answer: &str,
        direction: RecallDirection,
    ) -> Option<GradingResult> {
        let case_sensitive = direction == RecallDirection::Word;
        let normalize = |s: &str| {
            let trimmed = s.trim();
            if case_sensitive {
                trimmed.to_string()
            } else {
                trimmed.to_lowercase()
            }
        };

        // the full expected string, or any one of its alternatives
        let answer = normalize(user_answer);
        if normalize(expected) == answer
            || split_alternatives(expected)
                .into_iter()
                .any(|alt| normalize(alt) == answer)
        {
            return Some(GradingResult::new(
                true,
                GradingTier::Exact,
                1.0,
                "Perfect! ✓".to_string(),
            ));
        }

        let score = best_similarity(user_answer, expected);
        if score >= self.config.fuzzy_accept {
            return Some(GradingResult::new(
                true,
                GradingTier::Fuzzy,
                score,
                format!(
                    "Close enough! ✓ ({}% match) Expected: '{}'",
                    (score * 100.0) as i32,
                    expected.trim()
                ),
            ));
        }

        None
    }

    /// Grade one answer. Never fails: arbiter errors and timeouts resolve
    /// through the local fallback threshold.
    pub async fn grade(
        &self,
        term: &str,
        expected: &str,
        user_answer: &str,
        direction: RecallDirection,
    ) -> GradingResult {
        if user_answer.trim().is_empty() {
            return GradingResult::new(
                false,
                GradingTier::Rejected,
                0.0,
                format!("No answer given. Expected: '{}'", expected.trim()),
            );
        }

        if let Some(result) = self.grade_locally(expected, user_answer, direction) {
            return result;
        }

        let score = best_similarity(user_answer, expected);
        match direction {
            RecallDirection::Word => rejection(expected, score),
            RecallDirection::Meaning => self.arbitrate(term, expected, user_answer, score).await,
        }
    }

    async fn arbitrate(
        &self,
        term: &str,
        expected: &str,
        user_answer: &str,
        score: f64,
    ) -> GradingResult {
        let request = ArbiterRequest {
            term: term.trim().to_string(),
            reference_answer: expected.trim().to_string(),
            user_answer: user_answer.trim().to_string(),
        };

        let timeout = self.config.arbiter_timeout();
        let verdict = match tokio::time::timeout(timeout, self.arbiter.judge(&request)).await {
            Ok(result) => result,
            Err(_) => Err(ArbiterError::Timeout),
        };

        match verdict {
            Ok(verdict) => {
                let feedback = if verdict.feedback.trim().is_empty() {
                    if verdict.is_correct {
                        "Correct! ✓".to_string()
                    } else {
                        format!("Incorrect. Expected: '{}'", expected.trim())
                    }
                } else {
                    verdict.feedback
                };
                GradingResult::new(verdict.is_correct, GradingTier::Arbitrated, score, feedback)
            }
            Err(ArbiterError::Unavailable) => self.fallback(expected, score),
            Err(e) => {
                log::warn!("Arbiter failed for '{}', grading locally: {}", term, e);
                self.fallback(expected, score)
            }
        }
    }

    fn fallback(&self, expected: &str, score: f64) -> GradingResult {
        let percent = (score * 100.0) as i32;
        if score >= self.config.fallback_accept {
            GradingResult::new(
                true,
                GradingTier::Fallback,
                score,
                format!(
                    "Accepted by offline grading ({}% match). Expected: '{}'",
                    percent,
                    expected.trim()
                ),
            )
        } else {
            GradingResult::new(
                false,
                GradingTier::Fallback,
                score,
                format!("Incorrect (offline grading). Expected: '{}'", expected.trim()),
            )
        }
    }
}

fn rejection(expected: &str, score: f64) -> GradingResult {
    let feedback = if score >= 0.5 {
        format!("Almost! Expected: '{}'", expected.trim())
    } else {
        format!("Incorrect. Expected: '{}'", expected.trim())
    };
    GradingResult::new(false, GradingTier::Rejected, score, feedback)
}

// ============= Python Binding =============

#[cfg(feature = "python")]
pub(crate) mod py {
    use pyo3::prelude::*;

    use super::FillInAnswerGrader;
    use crate::arbiter::HttpArbiter;
    use crate::config::GradingConfig;
    use crate::question::RecallDirection;

    fn runtime_error(e: impl std::fmt::Display) -> PyErr {
        pyo3::exceptions::PyRuntimeError::new_err(e.to_string())
    }

    /// `direction` is `"word"` or `"meaning"`. Blocks until graded.
    #[pyfunction]
    #[pyo3(
        name = "grade_answer",
        signature = (term, expected, user_answer, direction, arbiter_endpoint=None)
    )]
    pub fn py_grade_answer(
        term: &str,
        expected: &str,
        user_answer: &str,
        direction: &str,
        arbiter_endpoint: Option<&str>,
    ) -> PyResult<String> {
        let direction: RecallDirection =
            serde_json::from_value(serde_json::Value::String(direction.to_string()))
                .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(runtime_error)?;

        let config = GradingConfig {
            arbiter_endpoint: arbiter_endpoint.map(str::to_string),
            ..GradingConfig::default()
        };
        let result = match config.arbiter_endpoint.clone() {
            Some(endpoint) => {
                let arbiter =
                    HttpArbiter::new(endpoint, config.arbiter_timeout()).map_err(runtime_error)?;
                let grader = FillInAnswerGrader::new(config, arbiter);
                runtime.block_on(grader.grade(term, expected, user_answer, direction))
            }
            None => {
                let grader = FillInAnswerGrader::local(config);
                runtime.block_on(grader.grade(term, expected, user_answer, direction))
            }
        };
        serde_json::to_string(&result).map_err(runtime_error)
    }
}
