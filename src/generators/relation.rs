//! Synonym / antonym multi-select questions

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeSet, HashSet};

use crate::question::{
    question_id, AnswerKey, Question, QuestionType, MAX_MULTI_SELECT_CORRECT,
    MAX_MULTI_SELECT_OPTIONS,
};
use crate::words::{NormalizedWord, RelationKind};

/// Synonym mode when the word has synonyms and either no antonyms or the coin lands on synonyms.
fn choose_relation<R: Rng + ?Sized>(word: &NormalizedWord, rng: &mut R) -> RelationKind {
    if !word.synonyms.is_empty() && (word.antonyms.is_empty() || rng.gen_bool(0.5)) {
        RelationKind::Synonym
    } else {
        RelationKind::Antonym
    }
}

/// Multi-select questions whose answer key is a random 1–3 element subset of a
/// word's synonyms or antonyms.
pub fn generate_relation_questions<R: Rng + ?Sized>(
    words: &[NormalizedWord],
    limit: usize,
    rng: &mut R,
) -> Vec<Question> {
    let qualifies =
        |w: &NormalizedWord, min: usize| w.synonyms.len() >= min || w.antonyms.len() >= min;
    let min_relations = if words.iter().any(|w| qualifies(w, 2)) { 2 } else { 1 };

    let mut candidates: Vec<&NormalizedWord> = words
        .iter()
        .filter(|w| !w.term.trim().is_empty() && qualifies(w, min_relations))
        .collect();
    candidates.shuffle(rng);

    let mut questions = Vec::new();
    for word in candidates {
        if questions.len() >= limit {
            break;
        }
        if let Some(question) = relation_question(word, words, rng) {
            questions.push(question);
        }
    }

    questions
}

fn relation_question<R: Rng + ?Sized>(
    word: &NormalizedWord,
    words: &[NormalizedWord],
    rng: &mut R,
) -> Option<Question> {
    let kind = choose_relation(word, rng);
    let relation = word.relation(kind);
    if relation.is_empty() {
        return None;
    }

    let correct_count = relation.len().min(MAX_MULTI_SELECT_CORRECT);
    let correct: Vec<String> = relation.choose_multiple(rng, correct_count).cloned().collect();

    // whole relation list, not just the chosen subset
    let mut excluded: HashSet<String> = relation.iter().map(|r| r.to_lowercase()).collect();
    excluded.insert(word.term.to_lowercase());

    let mut distractors: Vec<String> = Vec::new();
    let merged = words
        .iter()
        .map(|w| w.term.as_str())
        .chain(words.iter().flat_map(|w| w.relation(kind).iter().map(String::as_str)));
    for candidate in merged {
        let candidate = candidate.trim();
        if candidate.is_empty() || !excluded.insert(candidate.to_lowercase()) {
            continue;
        }
        distractors.push(candidate.to_string());
    }
    distractors.shuffle(rng);

    let option_count = MAX_MULTI_SELECT_OPTIONS.min(correct_count + distractors.len());
    if option_count < 2 {
        log::debug!("Skipping {} question for '{}': too few options", kind.label(), word.term);
        return None;
    }

    let mut options = correct.clone();
    options.extend(distractors.into_iter().take(option_count - correct_count));
    options.shuffle(rng);

    let correct_set: HashSet<&str> = correct.iter().map(String::as_str).collect();
    let correct_answers: BTreeSet<usize> = options
        .iter()
        .enumerate()
        .filter(|(_, o)| correct_set.contains(o.as_str()))
        .map(|(i, _)| i)
        .collect();

    Some(Question {
        id: question_id(kind.label(), &word.id, rng),
        question_type: QuestionType::MultiSelect,
        prompt: format!("Select every {} of '{}'.", kind.label(), word.term),
        options,
        answer: AnswerKey::multiple(correct_answers),
        explanation: format!("{}s of '{}': {}", kind.label(), word.term, relation.join(", ")),
        word_id: word.id.clone(),
        sentence_data: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::test_support::{vocabulary, word};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_answer_key_comes_from_relation_set() {
        let words = vocabulary();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let questions = generate_relation_questions(&words, 12, &mut rng);
            assert!(!questions.is_empty());

            for q in &questions {
                assert!(q.is_well_formed(), "{:?}", q);
                let word = words.iter().find(|w| w.id == q.word_id).unwrap();
                let AnswerKey::Multiple { correct_answers } = &q.answer else {
                    panic!("expected multiple answers")
                };
                let relation: Vec<&String> = if q.prompt.contains("synonym") {
                    word.synonyms.iter().collect()
                } else {
                    word.antonyms.iter().collect()
                };
                for &i in correct_answers {
                    assert!(relation.contains(&&q.options[i]));
                }
                for (i, option) in q.options.iter().enumerate() {
                    if !correct_answers.contains(&i) {
                        assert!(!relation.contains(&option), "unchosen relation shown as wrong");
                    }
                }
                assert!(correct_answers.len() <= q.options.len());
            }
        }
    }

    #[test]
    fn test_prefers_words_with_two_relations() {
        let mut rich = word("1", "big", "큰");
        rich.synonyms = vec!["large".into(), "huge".into()];
        let mut poor = word("2", "cold", "추운");
        poor.antonyms = vec!["hot".into()];
        let words = vec![rich, poor, word("3", "tree", "나무"), word("4", "river", "강")];

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let questions = generate_relation_questions(&words, 12, &mut rng);
            assert_eq!(questions.len(), 1);
            assert_eq!(questions[0].word_id, "1");
        }
    }

    #[test]
    fn test_relaxes_to_single_relation() {
        let mut cold = word("1", "cold", "추운");
        cold.antonyms = vec!["hot".into()];
        let words = vec![cold, word("2", "tree", "나무")];

        let mut rng = StdRng::seed_from_u64(3);
        let questions = generate_relation_questions(&words, 12, &mut rng);
        assert_eq!(questions.len(), 1);
        let q = &questions[0];
        assert!(q.prompt.contains("antonym"));
        assert_eq!(q.options.len(), 2);
        assert!(q.options.contains(&"hot".to_string()));
        assert!(q.options.contains(&"tree".to_string()));
        assert!(!q.options.contains(&"cold".to_string()));
    }

    #[test]
    fn test_needs_at_least_two_options() {
        let mut lonely = word("1", "cold", "추운");
        lonely.antonyms = vec!["hot".into()];
        let mut rng = StdRng::seed_from_u64(4);
        assert!(generate_relation_questions(&[lonely], 12, &mut rng).is_empty());
    }

    #[test]
    fn test_option_count_capped_at_eight() {
        let mut words: Vec<NormalizedWord> = (0..20)
            .map(|i| word(&i.to_string(), &format!("term{}", i), &format!("뜻{}", i)))
            .collect();
        words[0].synonyms = vec!["s1".into(), "s2".into(), "s3".into(), "s4".into()];

        let mut rng = StdRng::seed_from_u64(5);
        let questions = generate_relation_questions(&words, 12, &mut rng);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].options.len(), 8);
        let AnswerKey::Multiple { correct_answers } = &questions[0].answer else { unreachable!() };
        assert_eq!(correct_answers.len(), 3);
    }
}
