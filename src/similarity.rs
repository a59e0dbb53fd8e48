//! Name similarity scoring for payee matching.
//!
//! Two layers: `calculate_similarity` is the plain edit-distance ratio in
//! [0, 1]; `name_score` blends edit distance, token-set overlap, and
//! Jaro-Winkler into the 0-100 confidence used by the payee matcher.

use crate::models::MatchType;

/// Jaro-Winkler is only trusted when the names share surface signal; on
/// unrelated names it still scores ~0.45 and would inflate the blend.
const JARO_WINKLER_EDIT_FLOOR: f64 = 0.5;

/// Lowercase, strip everything but alphanumerics and spaces, collapse runs
/// of whitespace.
pub fn normalize_name(raw: &str) -> String {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn tokens(normalized: &str) -> Vec<&str> {
    normalized.split_whitespace().collect()
}

/// Edit-distance similarity between two names, in [0, 1].
///
/// Exact match after normalization is 1.0. Two strings that normalize to
/// empty are trivially equal.
pub fn calculate_similarity(a: &str, b: &str) -> f64 {
    let na = normalize_name(a);
    let nb = normalize_name(b);
    if na == nb {
        return 1.0;
    }
    let max_len = na.chars().count().max(nb.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = strsim::levenshtein(&na, &nb);
    (max_len.saturating_sub(distance)) as f64 / max_len as f64
}

/// Sorensen-Dice coefficient over whitespace token sets.
fn token_overlap(na: &str, nb: &str) -> f64 {
    let ta = tokens(na);
    let tb = tokens(nb);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let shared = ta.iter().filter(|t| tb.contains(t)).count();
    2.0 * shared as f64 / (ta.len() + tb.len()) as f64
}

/// Blended 0-100 name confidence plus a coarse match type.
pub fn name_score(a: &str, b: &str) -> (f64, MatchType) {
    let na = normalize_name(a);
    let nb = normalize_name(b);
    if na == nb {
        return (100.0, MatchType::Exact);
    }

    let max_len = na.chars().count().max(nb.chars().count());
    let edit = if max_len == 0 {
        1.0
    } else {
        (max_len.saturating_sub(strsim::levenshtein(&na, &nb))) as f64 / max_len as f64
    };
    let token = token_overlap(&na, &nb);

    let mut best = edit.max(token);
    if token > 0.0 || edit >= JARO_WINKLER_EDIT_FLOOR {
        best = best.max(strsim::jaro_winkler(&na, &nb));
    }

    let match_type = if token >= edit && token > 0.0 {
        MatchType::Token
    } else {
        MatchType::Fuzzy
    };
    ((best * 100.0).clamp(0.0, 100.0), match_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Smith   Plumbing, LLC. "), "smith plumbing llc");
        assert_eq!(normalize_name("A&B Electric"), "a b electric");
        assert_eq!(normalize_name("!!!"), "");
    }

    #[test]
    fn test_identity() {
        for s in &["Acme Electric", "smith plumbing", "J&J Drywall Co"] {
            assert_eq!(calculate_similarity(s, s), 1.0);
        }
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("Acme Electric", "Acme Electric Co"),
            ("Smith Plumbing LLC", "Smith Plumbing"),
            ("Zephyr", "Acme"),
        ];
        for (a, b) in pairs {
            assert_eq!(calculate_similarity(a, b), calculate_similarity(b, a));
            assert_eq!(name_score(a, b).0, name_score(b, a).0);
        }
    }

    #[test]
    fn test_range() {
        let pairs = [
            ("", ""),
            ("", "Acme"),
            ("Acme Electric", "Zephyr Plumbing"),
            ("Smith Plumbing LLC", "Smith Plumbing"),
        ];
        for (a, b) in pairs {
            let sim = calculate_similarity(a, b);
            assert!((0.0..=1.0).contains(&sim), "similarity out of range: {sim}");
            let (score, _) = name_score(a, b);
            assert!((0.0..=100.0).contains(&score), "score out of range: {score}");
        }
    }

    #[test]
    fn test_empty_strings_trivially_equal() {
        assert_eq!(calculate_similarity("", ""), 1.0);
        assert_eq!(calculate_similarity("...", "!!!"), 1.0);
    }

    #[test]
    fn test_exact_after_normalization_scores_max() {
        let (score, match_type) = name_score("SMITH PLUMBING, LLC", "smith plumbing llc");
        assert_eq!(score, 100.0);
        assert_eq!(match_type, MatchType::Exact);
    }

    #[test]
    fn test_similar_names_score_high() {
        let (score, _) = name_score("Acme Electric", "Acme Electric Co");
        assert!(score >= 75.0, "expected >= 75, got {score}");
        let (score, _) = name_score("Smith Plumbing LLC", "Smith Plumbing");
        assert!(score >= 90.0, "expected >= 90, got {score}");
    }

    #[test]
    fn test_dissimilar_names_score_low() {
        let (score, _) = name_score("Acme Electric", "Zephyr Plumbing");
        assert!(score < 40.0, "expected < 40, got {score}");
        let (score, _) = name_score("Quick Concrete", "Bayside Roofing Inc");
        assert!(score < 40.0, "expected < 40, got {score}");
    }

    #[test]
    fn test_token_overlap_wins_on_reordered_names() {
        let (score, match_type) = name_score("Plumbing Smith", "Smith Plumbing");
        assert!(score >= 90.0, "expected >= 90, got {score}");
        assert_eq!(match_type, MatchType::Token);
    }

    #[test]
    fn test_edit_distance_ratio() {
        // "acme" vs "acne": one substitution over four chars.
        assert_eq!(calculate_similarity("acme", "acne"), 0.75);
    }
}
