//! String similarity for free-text answer scoring

use strsim::levenshtein;

/// Split an expected answer into its accepted alternatives (`,` or `;`).
pub fn split_alternatives(expected: &str) -> Vec<&str> {
    let alternatives: Vec<&str> = expected
        .split(&[',', ';'][..])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if alternatives.is_empty() {
        vec![expected.trim()]
    } else {
        alternatives
    }
}

/// Containment ratio when one string contains the other, otherwise
/// `1 - edit_distance / max_len`. Lengths are in characters.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_len = a.chars().count();
    let b_len = b.chars().count();

    if a_len == 0 && b_len == 0 {
        return 1.0;
    }
    if a_len == 0 || b_len == 0 {
        return 0.0;
    }

    let longer = a_len.max(b_len) as f64;
    if a.contains(b) || b.contains(a) {
        return a_len.min(b_len) as f64 / longer;
    }

    1.0 - levenshtein(a, b) as f64 / longer
}

/// Best similarity of `input` against any alternative in `expected`, compared case-insensitively.
pub fn best_similarity(input: &str, expected: &str) -> f64 {
    let input = input.trim().to_lowercase();
    split_alternatives(expected)
        .into_iter()
        .map(|alt| similarity(&input, &alt.to_lowercase()))
        .fold(0.0, f64::max)
}
