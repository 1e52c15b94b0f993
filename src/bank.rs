//! Five-stage question bank assembly with stage-1 fallback

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::config::QuestionLimits;
use crate::error::{EngineError, Result};
use crate::generators::{
    generate_derivative_questions, generate_meaning_questions, generate_relation_questions,
    generate_sentence_questions,
};
use crate::progress::{StageId, ALL_IN_ONE_STAGE, STAGE_IDS};
use crate::question::Question;
use crate::words::NormalizedWord;

/// Stage id -> ordered questions. Stages that fell back share stage 1's list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBank {
    stages: BTreeMap<StageId, Arc<Vec<Question>>>,
    fallback_stages: BTreeSet<StageId>,
}

impl QuestionBank {
    pub fn stage(&self, id: StageId) -> Option<&[Question]> {
        self.stages.get(&id).map(|qs| qs.as_slice())
    }

    pub fn stage_shared(&self, id: StageId) -> Option<Arc<Vec<Question>>> {
        self.stages.get(&id).cloned()
    }

    /// True when the stage's own generator produced nothing and stage 1 stands in.
    pub fn is_fallback(&self, id: StageId) -> bool {
        self.fallback_stages.contains(&id)
    }

    pub fn stage_ids(&self) -> impl Iterator<Item = StageId> + '_ {
        self.stages.keys().copied()
    }

    pub fn total_questions(&self) -> usize {
        self.stages.values().map(|qs| qs.len()).sum()
    }
}

/// Build all five stages. Fails only when stage 1 (meaning questions) is empty,
/// since every other stage falls back to it.
pub fn build_question_bank<R: Rng + ?Sized>(
    words: &[NormalizedWord],
    limits: &QuestionLimits,
    rng: &mut R,
) -> Result<QuestionBank> {
    let meaning = generate_meaning_questions(words, limits.meaning, rng);
    if meaning.is_empty() {
        log::debug!("No meaning questions from {} words; bank not built", words.len());
        return Err(EngineError::InsufficientVocabulary);
    }

    let derivative = generate_derivative_questions(words, limits.derivative, rng);
    let relation = generate_relation_questions(words, limits.relation, rng);
    let sentence = generate_sentence_questions(words, limits.sentence, rng);

    let all_in_one = build_all_in_one(
        &[&meaning, &derivative, &relation, &sentence],
        &meaning,
        limits.all_in_one,
        rng,
    );

    let stage_one = Arc::new(meaning);
    let mut stages = BTreeMap::new();
    let mut fallback_stages = BTreeSet::new();
    stages.insert(STAGE_IDS[0], Arc::clone(&stage_one));

    for (stage, questions) in [(2, derivative), (3, relation), (4, sentence)] {
        if questions.is_empty() {
            log::debug!("Stage {} has no questions of its own; using stage 1", stage);
            fallback_stages.insert(stage);
            stages.insert(stage, Arc::clone(&stage_one));
        } else {
            stages.insert(stage, Arc::new(questions));
        }
    }
    stages.insert(ALL_IN_ONE_STAGE, Arc::new(all_in_one));

    Ok(QuestionBank {
        stages,
        fallback_stages,
    })
}

/// Rebuild a single stage, e.g. when the learner asks for a reshuffle.
/// Ids outside `STAGE_IDS` are rejected.
pub fn generate_stage_questions<R: Rng + ?Sized>(
    words: &[NormalizedWord],
    stage: StageId,
    limits: &QuestionLimits,
    rng: &mut R,
) -> Result<Vec<Question>> {
    let own = match stage {
        1 => generate_meaning_questions(words, limits.meaning, rng),
        2 => generate_derivative_questions(words, limits.derivative, rng),
        3 => generate_relation_questions(words, limits.relation, rng),
        4 => generate_sentence_questions(words, limits.sentence, rng),
        ALL_IN_ONE_STAGE => {
            let bank = build_question_bank(words, limits, rng)?;
            return Ok(bank
                .stage(ALL_IN_ONE_STAGE)
                .map(<[Question]>::to_vec)
                .unwrap_or_default());
        }
        _ => return Err(EngineError::UnknownStage(stage)),
    };

    if !own.is_empty() {
        return Ok(own);
    }
    if stage == 1 {
        return Err(EngineError::InsufficientVocabulary);
    }
    let fallback = generate_meaning_questions(words, limits.meaning, rng);
    if fallback.is_empty() {
        Err(EngineError::InsufficientVocabulary)
    } else {
        Ok(fallback)
    }
}

/// Pool every generator's output, shuffle, cut to `target`, pad by cycling the
/// meaning list, then renumber.
fn build_all_in_one<R: Rng + ?Sized>(
    sources: &[&[Question]],
    meaning: &[Question],
    target: usize,
    rng: &mut R,
) -> Vec<Question> {
    let mut pool: Vec<Question> = sources.iter().flat_map(|qs| qs.iter().cloned()).collect();
    pool.shuffle(rng);
    pool.truncate(target);

    let mut padding = meaning.iter().cycle();
    while pool.len() < target {
        match padding.next() {
            Some(q) => pool.push(q.clone()),
            None => break,
        }
    }

    let batch: u32 = rng.gen();
    pool.iter()
        .enumerate()
        .map(|(i, q)| q.with_id(format!("mixed-{:08x}-{}", batch, i + 1)))
        .collect()
}

// ============= Python Bindings =============

#[cfg(feature = "python")]
pub(crate) mod py {
    use pyo3::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::config::QuestionLimits;
    use crate::progress::StageId;
    use crate::words::normalize_json_str;

    fn runtime_error(e: impl std::fmt::Display) -> PyErr {
        pyo3::exceptions::PyRuntimeError::new_err(e.to_string())
    }

    /// Returns the bank as JSON, or raises when the vocabulary is too small.
    #[pyfunction]
    #[pyo3(name = "build_question_bank", signature = (words_json, seed=None))]
    pub fn py_build_question_bank(words_json: &str, seed: Option<u64>) -> PyResult<String> {
        let words = normalize_json_str(words_json).map_err(runtime_error)?;
        let limits = QuestionLimits::default();
        let bank = match seed {
            Some(seed) => {
                super::build_question_bank(&words, &limits, &mut StdRng::seed_from_u64(seed))
            }
            None => super::build_question_bank(&words, &limits, &mut rand::thread_rng()),
        }
        .map_err(runtime_error)?;
        serde_json::to_string(&bank).map_err(runtime_error)
    }

    #[pyfunction]
    #[pyo3(name = "generate_stage_questions", signature = (words_json, stage, seed=None))]
    pub fn py_generate_stage_questions(
        words_json: &str,
        stage: StageId,
        seed: Option<u64>,
    ) -> PyResult<String> {
        let words = normalize_json_str(words_json).map_err(runtime_error)?;
        let limits = QuestionLimits::default();
        let questions = match seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                super::generate_stage_questions(&words, stage, &limits, &mut rng)
            }
            None => {
                super::generate_stage_questions(&words, stage, &limits, &mut rand::thread_rng())
            }
        }
        .map_err(runtime_error)?;
        serde_json::to_string(&questions).map_err(runtime_error)
    }
}
