//! Derived-form meaning questions

use rand::seq::SliceRandom;
use rand::Rng;

use crate::question::{
    distractor_pool, four_options, question_id, AnswerKey, Question, QuestionType,
};
use crate::words::NormalizedWord;

struct DerivativeEntry<'a> {
    word_id: &'a str,
    root: &'a str,
    derivative: &'a str,
    meaning: &'a str,
}

fn derivative_entries(words: &[NormalizedWord]) -> Vec<DerivativeEntry<'_>> {
    words
        .iter()
        .flat_map(|w| {
            w.derivatives.iter().map(move |d| DerivativeEntry {
                word_id: &w.id,
                root: &w.term,
                derivative: d.word.trim(),
                meaning: d.meaning.trim(),
            })
        })
        .filter(|e| !e.derivative.is_empty() && !e.meaning.is_empty())
        .collect()
}

/// Ask for the meaning of each derived form; distractors are other derivative meanings.
pub fn generate_derivative_questions<R: Rng + ?Sized>(
    words: &[NormalizedWord],
    limit: usize,
    rng: &mut R,
) -> Vec<Question> {
    let mut entries = derivative_entries(words);
    let all_meanings: Vec<&str> = entries.iter().map(|e| e.meaning).collect();
    entries.shuffle(rng);

    let mut questions = Vec::new();
    for entry in &entries {
        if questions.len() >= limit {
            break;
        }

        let pool = distractor_pool(all_meanings.iter().copied(), entry.meaning);
        let Some((options, correct_index)) = four_options(entry.meaning, &pool, rng) else {
            log::debug!(
                "Skipping derivative question for '{}': not enough distractors",
                entry.derivative
            );
            continue;
        };

        questions.push(Question {
            id: question_id("derivative", entry.word_id, rng),
            question_type: QuestionType::MultipleChoice,
            prompt: format!("What does '{}' (from '{}') mean?", entry.derivative, entry.root),
            options,
            answer: AnswerKey::single(correct_index),
            explanation: format!(
                "'{}' is a form of '{}' and means '{}'.",
                entry.derivative, entry.root, entry.meaning
            ),
            word_id: entry.word_id.to_string(),
            sentence_data: None,
        });
    }

    questions
}
