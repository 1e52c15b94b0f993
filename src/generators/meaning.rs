//! Word -> meaning multiple-choice questions

use rand::seq::SliceRandom;
use rand::Rng;

use crate::question::{
    distractor_pool, four_options, question_id, AnswerKey, Question, QuestionType,
};
use crate::words::NormalizedWord;

/// One 4-option question per word, distractors drawn from other words' meanings.
/// Words lacking 3 distinct distractor meanings are skipped.
pub fn generate_meaning_questions<R: Rng + ?Sized>(
    words: &[NormalizedWord],
    limit: usize,
    rng: &mut R,
) -> Vec<Question> {
    let mut candidates: Vec<&NormalizedWord> = words
        .iter()
        .filter(|w| !w.term.trim().is_empty() && !w.meaning.trim().is_empty())
        .collect();
    candidates.shuffle(rng);

    let mut questions = Vec::new();
    for word in candidates {
        if questions.len() >= limit {
            break;
        }

        let pool = distractor_pool(
            words
                .iter()
                .filter(|w| w.id != word.id)
                .map(|w| w.meaning.as_str()),
            &word.meaning,
        );

        let Some((options, correct_index)) = four_options(&word.meaning, &pool, rng) else {
            log::debug!("Skipping meaning question for '{}': not enough distractors", word.term);
            continue;
        };

        questions.push(Question {
            id: question_id("meaning", &word.id, rng),
            question_type: QuestionType::MultipleChoice,
            prompt: format!("What is the meaning of '{}'?", word.term),
            options,
            answer: AnswerKey::single(correct_index),
            explanation: format!("'{}' means '{}'.", word.term, word.meaning.trim()),
            word_id: word.id.clone(),
            sentence_data: None,
        });
    }

    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::test_support::{vocabulary, word};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_questions_are_well_formed() {
        let words = vocabulary();
        let mut rng = StdRng::seed_from_u64(1);
        let questions = generate_meaning_questions(&words, 20, &mut rng);

        assert_eq!(questions.len(), words.len());
        for q in &questions {
            assert!(q.is_well_formed(), "{:?}", q);
            let word = words.iter().find(|w| w.id == q.word_id).unwrap();
            let AnswerKey::Single { correct_answer } = q.answer else {
                panic!("expected single answer")
            };
            assert_eq!(q.options[correct_answer], word.meaning);
            assert_eq!(q.options.iter().filter(|o| **o == word.meaning).count(), 1);
        }
    }

    #[test]
    fn test_respects_limit() {
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(generate_meaning_questions(&vocabulary(), 3, &mut rng).len(), 3);
    }

    #[test]
    fn test_skips_words_without_enough_distinct_distractors() {
        let words = vec![
            word("1", "alpha", "첫째"),
            word("2", "beta", "둘째"),
            word("3", "gamma", "둘째"),
            word("4", "delta", "첫째"),
        ];
        let mut rng = StdRng::seed_from_u64(3);
        assert!(generate_meaning_questions(&words, 20, &mut rng).is_empty());
    }

    #[test]
    fn test_regeneration_gives_fresh_ids_same_coverage() {
        let words = vocabulary();
        let mut rng = StdRng::seed_from_u64(4);
        let first = generate_meaning_questions(&words, 20, &mut rng);
        let second = generate_meaning_questions(&words, 20, &mut rng);

        let ids: HashSet<_> = first.iter().map(|q| q.id.clone()).collect();
        assert!(second.iter().all(|q| !ids.contains(&q.id)));

        let coverage =
            |qs: &[Question]| qs.iter().map(|q| q.word_id.clone()).collect::<HashSet<_>>();
        assert_eq!(coverage(&first), coverage(&second));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let words = vocabulary();
        let a = generate_meaning_questions(&words, 20, &mut StdRng::seed_from_u64(9));
        let b = generate_meaning_questions(&words, 20, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
