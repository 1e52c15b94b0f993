//! Question generators. Each is a pure function of the normalized word list
//! and an injected RNG, so regenerating a stage is just calling it again.

mod cloze;
mod derivative;
mod fill_in;
mod meaning;
mod relation;

pub use cloze::{generate_sentence_questions, mask_sentence};
pub use derivative::generate_derivative_questions;
pub use fill_in::generate_fill_in_questions;
pub use meaning::generate_meaning_questions;
pub use relation::generate_relation_questions;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::words::{Derivative, NormalizedWord};

    pub fn word(id: &str, term: &str, meaning: &str) -> NormalizedWord {
        NormalizedWord {
            id: id.to_string(),
            term: term.to_string(),
            meaning: meaning.to_string(),
            ..Default::default()
        }
    }

    fn derivative(word: &str, meaning: &str) -> Derivative {
        Derivative {
            word: word.to_string(),
            meaning: meaning.to_string(),
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Eight fully-populated words; every generator can build questions from it.
    pub fn vocabulary() -> Vec<NormalizedWord> {
        let mut words = vec![
            word("1", "resilience", "회복력"),
            word("2", "abandon", "버리다"),
            word("3", "candid", "솔직한"),
            word("4", "diligent", "부지런한"),
            word("5", "frugal", "검소한"),
            word("6", "hostile", "적대적인"),
            word("7", "obscure", "모호한"),
            word("8", "vivid", "생생한"),
        ];

        words[0].example = "Her resilience (회복력) surprised everyone.".into();
        words[0].translation = Some("그녀의 회복력은 모두를 놀라게 했다.".into());
        words[0].derivatives = vec![derivative("resilient", "회복력 있는")];
        words[0].synonyms = strings(&["toughness", "elasticity"]);
        words[0].antonyms = strings(&["fragility"]);

        words[1].example = "They abandoned the plan at dawn.".into();
        words[1].derivatives = vec![derivative("abandonment", "포기")];
        words[1].synonyms = strings(&["desert", "forsake", "leave"]);

        words[2].example = "He gave a candid answer.".into();
        words[2].derivatives = vec![derivative("candidly", "솔직하게")];
        words[2].synonyms = strings(&["frank", "honest"]);
        words[2].antonyms = strings(&["evasive", "guarded"]);

        words[3].example = "A diligent student studies daily.".into();
        words[3].derivatives = vec![derivative("diligence", "근면")];
        words[3].antonyms = strings(&["lazy", "idle"]);

        words[4].example = "She lives a frugal life.".into();
        words[4].derivatives = vec![derivative("frugality", "검소")];
        words[4].synonyms = strings(&["thrifty", "economical"]);
        words[4].antonyms = strings(&["wasteful", "extravagant"]);

        words[5].example = "The crowd turned hostile.".into();
        words[5].antonyms = strings(&["friendly", "amicable"]);

        words[6].example = "The meaning remains obscure.".into();
        words[6].synonyms = strings(&["unclear", "vague"]);

        words[7].example = "I have vivid memories of it.".into();
        words[7].synonyms = strings(&["bright", "striking"]);

        words
    }
}
