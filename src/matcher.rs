//! Payee fuzzy matcher: ranks candidate payees against a target name and
//! separates "safe to auto-use" from "present as a suggestion".

use std::cmp::Ordering;

use crate::models::{MatchResult, PartialPayee};
use crate::similarity::name_score;

/// Minimum confidence for a top-ranked candidate to be returned as
/// `best_match`. Below this the caller gets the ranked list only.
pub const AUTO_ACCEPT_THRESHOLD: f64 = 75.0;

pub struct PayeeMatch {
    /// Full ranked list, descending by confidence. Not filtered, so callers
    /// can inspect runners-up in low-confidence scenarios.
    pub matches: Vec<MatchResult>,
    /// Top candidate, only when its confidence clears the auto-accept bar.
    pub best_match: Option<MatchResult>,
}

fn candidate_name(payee: &PartialPayee) -> &str {
    match payee.full_name.as_deref() {
        Some(full) if !full.trim().is_empty() => full,
        _ => &payee.payee_name,
    }
}

pub fn fuzzy_match_payee(target_name: &str, candidates: &[PartialPayee]) -> PayeeMatch {
    let mut matches: Vec<MatchResult> = candidates
        .iter()
        .map(|payee| {
            let (confidence, match_type) = name_score(target_name, candidate_name(payee));
            MatchResult {
                payee: payee.clone(),
                confidence,
                match_type,
            }
        })
        .collect();

    matches.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let best_match = matches
        .first()
        .filter(|m| m.confidence >= AUTO_ACCEPT_THRESHOLD)
        .cloned();

    PayeeMatch {
        matches,
        best_match,
    }
}
