//! Open-ended fill-in questions for the free-text practice modes

use rand::seq::SliceRandom;
use rand::Rng;

use crate::question::{question_id, AnswerKey, Question, RecallDirection};
use crate::words::NormalizedWord;

/// `Word`: show the meaning, expect the term. `Meaning`: show the term, expect
/// the meaning (whose `,`/`;` alternatives are all accepted by the grader).
pub fn generate_fill_in_questions<R: Rng + ?Sized>(
    words: &[NormalizedWord],
    direction: RecallDirection,
    limit: usize,
    rng: &mut R,
) -> Vec<Question> {
    let mut candidates: Vec<&NormalizedWord> = words
        .iter()
        .filter(|w| !w.term.trim().is_empty() && !w.meaning.trim().is_empty())
        .collect();
    candidates.shuffle(rng);

    candidates
        .into_iter()
        .take(limit)
        .map(|word| {
            let (prefix, prompt, accepted) = match direction {
                RecallDirection::Word => (
                    "fill-word",
                    format!("Which word means: '{}'?", word.meaning.trim()),
                    word.term.trim(),
                ),
                RecallDirection::Meaning => (
                    "fill-meaning",
                    format!("What is the meaning of '{}'?", word.term.trim()),
                    word.meaning.trim(),
                ),
            };

            let explanation = if word.has_example() {
                format!("{} = {}. {}", word.term.trim(), word.meaning.trim(), word.example.trim())
            } else {
                format!("{} = {}", word.term.trim(), word.meaning.trim())
            };

            Question {
                id: question_id(prefix, &word.id, rng),
                question_type: direction.question_type(),
                prompt,
                options: Vec::new(),
                answer: AnswerKey::text(accepted),
                explanation,
                word_id: word.id.clone(),
                sentence_data: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::test_support::{vocabulary, word};
    use crate::question::QuestionType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_word_recall() {
        let words = vec![word("1", "resilience", "회복력, 복원력")];
        let mut rng = StdRng::seed_from_u64(1);
        let questions = generate_fill_in_questions(&words, RecallDirection::Word, 20, &mut rng);

        assert_eq!(questions.len(), 1);
        let q = &questions[0];
        assert!(q.is_well_formed());
        assert_eq!(q.question_type, QuestionType::FillInWord);
        assert!(q.options.is_empty());
        assert_eq!(q.answer, AnswerKey::text("resilience"));
        assert!(q.prompt.contains("회복력, 복원력"));
    }

    #[test]
    fn test_meaning_recall_keeps_alternatives() {
        let words = vec![word("1", "resilience", "회복력; 복원력")];
        let mut rng = StdRng::seed_from_u64(2);
        let questions = generate_fill_in_questions(&words, RecallDirection::Meaning, 20, &mut rng);
        assert_eq!(questions[0].question_type, QuestionType::FillInMeaning);
        assert_eq!(questions[0].answer, AnswerKey::text("회복력; 복원력"));
    }

    #[test]
    fn test_limit_and_skips() {
        let mut words = vocabulary();
        words.push(word("x", "empty", ""));
        let mut rng = StdRng::seed_from_u64(3);
        let questions = generate_fill_in_questions(&words, RecallDirection::Word, 4, &mut rng);
        assert_eq!(questions.len(), 4);
        assert!(questions.iter().all(|q| q.word_id != "x"));
    }
}
