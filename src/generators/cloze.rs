//! Sentence cloze questions: the target term is masked out of its example

use rand::seq::SliceRandom;
use rand::Rng;
use regex::{NoExpand, Regex};
use std::sync::OnceLock;

use crate::question::{
    distractor_pool, four_options, question_id, AnswerKey, Question, QuestionType, SentenceData,
    MASK_TOKEN,
};
use crate::words::NormalizedWord;

fn parenthetical_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\([^()]*\)").unwrap())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Case-insensitive match of `term` as a whole word. With `allow_suffix`, any
/// trailing word characters are swallowed too ("abandon" matches "abandoned").
fn term_pattern(term: &str, allow_suffix: bool) -> Option<Regex> {
    let first = term.chars().next()?;
    let last = term.chars().last()?;
    let start = if is_word_char(first) { r"\b" } else { "" };
    let end = match (allow_suffix, is_word_char(last)) {
        (true, true) => r"\w*\b",
        (false, true) => r"\b",
        _ => "",
    };
    Regex::new(&format!("(?i){}{}{}", start, regex::escape(term), end)).ok()
}

/// Replace every whole-word occurrence of `term` with the mask token, then
/// mask parenthetical hints. Returns the masked text and how many term
/// occurrences were replaced.
pub fn mask_sentence(text: &str, term: &str) -> (String, usize) {
    let term = term.trim();
    let mut masked = text.to_string();
    let mut replaced = 0;

    if !term.is_empty() {
        for allow_suffix in [false, true] {
            let Some(pattern) = term_pattern(term, allow_suffix) else { break };
            replaced = pattern.find_iter(text).count();
            if replaced > 0 {
                masked = pattern.replace_all(text, NoExpand(MASK_TOKEN)).into_owned();
                break;
            }
        }
    }

    let masked = parenthetical_pattern()
        .replace_all(&masked, NoExpand(MASK_TOKEN))
        .into_owned();
    (masked, replaced)
}

/// Cloze questions from example sentences; options are the term plus three
/// other words' terms. Examples that never mention the term are skipped.
pub fn generate_sentence_questions<R: Rng + ?Sized>(
    words: &[NormalizedWord],
    limit: usize,
    rng: &mut R,
) -> Vec<Question> {
    let mut candidates: Vec<&NormalizedWord> = words
        .iter()
        .filter(|w| !w.term.trim().is_empty() && w.has_example())
        .collect();
    candidates.shuffle(rng);

    let mut questions = Vec::new();
    for word in candidates {
        if questions.len() >= limit {
            break;
        }

        let (masked_english, replaced) = mask_sentence(&word.example, &word.term);
        if replaced == 0 {
            log::debug!("Skipping cloze for '{}': term not found in example", word.term);
            continue;
        }
        let translation_source = word.translation.as_deref().unwrap_or(&word.meaning);
        let (masked_translation, _) = mask_sentence(translation_source, &word.term);

        let pool = distractor_pool(
            words
                .iter()
                .filter(|w| w.id != word.id)
                .map(|w| w.term.as_str()),
            &word.term,
        );
        let Some((options, correct_index)) = four_options(&word.term, &pool, rng) else {
            log::debug!("Skipping cloze for '{}': not enough distractors", word.term);
            continue;
        };

        questions.push(Question {
            id: question_id("sentence", &word.id, rng),
            question_type: QuestionType::Sentence,
            prompt: masked_english.clone(),
            options,
            answer: AnswerKey::single(correct_index),
            explanation: format!("The missing word means '{}'.", word.meaning.trim()),
            word_id: word.id.clone(),
            sentence_data: Some(SentenceData {
                masked_english,
                masked_translation,
                original_english: word.example.trim().to_string(),
            }),
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

    #[test]
    fn test_mask_whole_word_case_insensitive() {
        let (masked, count) =
            mask_sentence("Resilience builds resilience, not resiliences.", "resilience");
        assert_eq!(masked, "_____ builds _____, not resiliences.");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_mask_falls_back_to_inflected_forms() {
        let (masked, count) = mask_sentence("They abandoned the ship.", "abandon");
        assert_eq!(masked, "They _____ the ship.");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_mask_strips_parenthetical_hints() {
        let (masked, count) = mask_sentence("He showed great resilience (회복력).", "resilience");
        assert_eq!(masked, "He showed great _____ _____.");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_mask_term_with_symbols() {
        let (masked, count) = mask_sentence("I write C++ daily.", "C++");
        assert_eq!(masked, "I write _____ daily.");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_masked_text_never_leaks_term() {
        let words = vocabulary();
        let mut rng = StdRng::seed_from_u64(8);
        let questions = generate_sentence_questions(&words, 12, &mut rng);
        assert!(!questions.is_empty());

        for q in &questions {
            assert!(q.is_well_formed(), "{:?}", q);
            let word = words.iter().find(|w| w.id == q.word_id).unwrap();
            let term = word.term.to_lowercase();
            let data = q.sentence_data.as_ref().unwrap();

            assert!(!q.prompt.to_lowercase().contains(&term));
            assert!(!data.masked_english.to_lowercase().contains(&term));
            assert!(!data.masked_translation.to_lowercase().contains(&term));
            assert!(data.masked_english.contains(MASK_TOKEN));
            assert!(!q.explanation.to_lowercase().contains(&term));
            assert_eq!(data.original_english, word.example);
        }
    }

    #[test]
    fn test_skips_examples_without_term() {
        let mut words: Vec<NormalizedWord> = (0..4)
            .map(|i| word(&i.to_string(), &format!("term{}", i), &format!("뜻{}", i)))
            .collect();
        words[0].example = "Nothing relevant here.".into();
        let mut rng = StdRng::seed_from_u64(9);
        assert!(generate_sentence_questions(&words, 12, &mut rng).is_empty());
    }
}
