//! Term/meaning pairing rounds for the matching practice mode

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::words::NormalizedWord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingRound {
    pub word_ids: Vec<String>,
    pub terms: Vec<String>,
    /// Shuffled; `pairs[i]` is the index here that matches `terms[i]`.
    pub meanings: Vec<String>,
    pub pairs: Vec<usize>,
}

impl MatchingRound {
    pub fn is_match(&self, term_index: usize, meaning_index: usize) -> bool {
        self.pairs.get(term_index) == Some(&meaning_index)
    }
}

/// Pick up to `round_size` words with distinct meanings. `None` when fewer
/// than `min_words` usable words exist.
pub fn build_matching_round<R: Rng + ?Sized>(
    words: &[NormalizedWord],
    min_words: usize,
    round_size: usize,
    rng: &mut R,
) -> Option<MatchingRound> {
    let mut seen_meanings = std::collections::HashSet::new();
    let usable: Vec<&NormalizedWord> = words
        .iter()
        .filter(|w| !w.term.trim().is_empty() && !w.meaning.trim().is_empty())
        .filter(|w| seen_meanings.insert(w.meaning.trim().to_string()))
        .collect();

    if usable.len() < min_words.max(1) {
        log::debug!("Matching round needs {} words, only {} usable", min_words, usable.len());
        return None;
    }

    let picked: Vec<&NormalizedWord> = usable
        .choose_multiple(rng, round_size.min(usable.len()))
        .copied()
        .collect();

    let mut order: Vec<usize> = (0..picked.len()).collect();
    order.shuffle(rng);

    // order[slot] = picked index shown at meaning slot `slot`
    let mut pairs = vec![0; picked.len()];
    for (slot, &picked_index) in order.iter().enumerate() {
        pairs[picked_index] = slot;
    }

    Some(MatchingRound {
        word_ids: picked.iter().map(|w| w.id.clone()).collect(),
        terms: picked.iter().map(|w| w.term.trim().to_string()).collect(),
        meanings: order.iter().map(|&i| picked[i].meaning.trim().to_string()).collect(),
        pairs,
    })
}

#[cfg(feature = "python")]
pub(crate) mod py {
    use pyo3::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::config::EngineConfig;
    use crate::words::normalize_json_str;

    /// JSON round, or `None` when the vocabulary is too small for matching.
    #[pyfunction]
    #[pyo3(name = "build_matching_round", signature = (words_json, seed=None))]
    pub fn py_build_matching_round(
        words_json: &str,
        seed: Option<u64>,
    ) -> PyResult<Option<String>> {
        let words = normalize_json_str(words_json)
            .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(e.to_string()))?;
        let config = EngineConfig::default();
        let round = match seed {
            Some(seed) => super::build_matching_round(
                &words,
                config.matching_min_words,
                config.matching_round_size,
                &mut StdRng::seed_from_u64(seed),
            ),
            None => super::build_matching_round(
                &words,
                config.matching_min_words,
                config.matching_round_size,
                &mut rand::thread_rng(),
            ),
        };
        round
            .map(|r| serde_json::to_string(&r))
            .transpose()
            .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::test_support::{vocabulary, word};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_pairs_line_up() {
        let words = vocabulary();
        let mut rng = StdRng::seed_from_u64(31);
        let round = build_matching_round(&words, 5, 5, &mut rng).unwrap();

        assert_eq!(round.terms.len(), 5);
        assert_eq!(round.meanings.len(), 5);
        for (i, term) in round.terms.iter().enumerate() {
            let word = words.iter().find(|w| &w.term == term).unwrap();
            assert_eq!(round.meanings[round.pairs[i]], word.meaning);
            assert!(round.is_match(i, round.pairs[i]));
        }
    }

    #[test]
    fn test_requires_minimum_words() {
        let words = vec![word("1", "a", "에이"), word("2", "b", "비"), word("3", "c", "에이")];
        let mut rng = StdRng::seed_from_u64(32);
        assert!(build_matching_round(&words, 3, 5, &mut rng).is_none());
        assert!(build_matching_round(&words, 2, 5, &mut rng).is_some());
    }
}
