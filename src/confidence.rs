//! Expense-to-line-item confidence model.
//!
//! Blends four independent signals into a single 0-100 allocation confidence:
//! category match, payee fuzzy match, amount proximity, and description
//! keyword overlap. Thresholds and weights live here as named constants so
//! they can be tuned and tested in one place.

use crate::matcher::fuzzy_match_payee;
use crate::models::{LineItem, LineItemKind, PartialPayee, UnallocatedExpense};

pub const MAX_CONFIDENCE: f64 = 100.0;

/// Awarded when the expense category maps onto any line item's category.
pub const CATEGORY_POINTS: f64 = 40.0;

/// Payee fuzzy-match bands: (minimum name confidence, points awarded).
pub const PAYEE_BANDS: &[(f64, f64)] = &[(90.0, 30.0), (75.0, 20.0), (60.0, 10.0)];

/// Amount proximity bands: (maximum percent difference, points awarded).
pub const AMOUNT_BANDS: &[(f64, f64)] = &[(5.0, 20.0), (10.0, 15.0), (20.0, 10.0)];

/// Awarded when the expense description shares a keyword with a
/// category-matching line item's description.
pub const KEYWORD_POINTS: f64 = 10.0;

/// Keywords are words longer than this many characters.
const MIN_KEYWORD_LEN: usize = 3;

const STOP_WORDS: &[&str] = &["the", "and", "for", "with", "from"];

/// Expense category -> line-item categories, as data rather than branching,
/// so new trades can be added without touching the scoring logic.
pub const CATEGORY_MAP: &[(&str, &[&str])] = &[
    ("labor", &["labor_internal"]),
    ("subcontractor", &["subcontractors"]),
    ("materials", &["materials"]),
    ("equipment", &["equipment"]),
    ("permits", &["permits"]),
    ("management", &["management"]),
    ("other", &["other"]),
];

/// Line-item categories an expense category maps onto. Tolerates singular or
/// plural spellings; unknown categories map to nothing.
pub fn mapped_line_categories(expense_category: &str) -> &'static [&'static str] {
    let key = expense_category.trim().to_lowercase();
    for (name, targets) in CATEGORY_MAP.iter().copied() {
        if name == key {
            return targets;
        }
    }
    // Singular/plural fallback: "subcontractors" and "permit" both resolve.
    for (name, targets) in CATEGORY_MAP.iter().copied() {
        if key.strip_suffix('s') == Some(name) || format!("{key}s") == name {
            return targets;
        }
    }
    &[]
}

fn category_matches<'a>(
    expense: &UnallocatedExpense,
    line_items: &'a [LineItem],
) -> Vec<&'a LineItem> {
    let targets = mapped_line_categories(&expense.category);
    line_items
        .iter()
        .filter(|item| {
            targets
                .iter()
                .any(|t| t.eq_ignore_ascii_case(item.category.trim()))
        })
        .collect()
}

fn description_keywords(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > MIN_KEYWORD_LEN && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Payees carried by category-matching quote line items, keyed by line item
/// id so a fuzzy best-match resolves straight back to its line item.
fn quote_payee_candidates(matching: &[&LineItem]) -> Vec<PartialPayee> {
    matching
        .iter()
        .filter(|item| item.kind == LineItemKind::Quote)
        .filter_map(|item| {
            item.payee_name
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .map(|name| PartialPayee {
                    id: item.id,
                    payee_name: name.to_string(),
                    full_name: None,
                })
        })
        .collect()
}

fn payee_points(expense: &UnallocatedExpense, matching: &[&LineItem]) -> f64 {
    let Some(target) = expense.effective_payee_name() else {
        return 0.0;
    };
    let candidates = quote_payee_candidates(matching);
    if candidates.is_empty() {
        return 0.0;
    }
    let result = fuzzy_match_payee(target, &candidates);
    let Some(top) = result.matches.first() else {
        return 0.0;
    };
    for (threshold, points) in PAYEE_BANDS {
        if top.confidence >= *threshold {
            return *points;
        }
    }
    0.0
}

fn amount_points(expense: &UnallocatedExpense, matching: &[&LineItem]) -> f64 {
    if expense.amount == 0.0 {
        return 0.0;
    }
    let best_pct_diff = matching
        .iter()
        .filter(|item| item.total_cost != 0.0)
        .map(|item| ((item.total_cost - expense.amount).abs() / expense.amount.abs()) * 100.0)
        .fold(f64::INFINITY, f64::min);
    if !best_pct_diff.is_finite() {
        return 0.0;
    }
    for (max_diff, points) in AMOUNT_BANDS {
        if best_pct_diff <= *max_diff {
            return *points;
        }
    }
    0.0
}

fn keyword_points(expense: &UnallocatedExpense, matching: &[&LineItem]) -> f64 {
    let Some(description) = expense.description.as_deref() else {
        return 0.0;
    };
    let keywords = description_keywords(description);
    if keywords.is_empty() {
        return 0.0;
    }
    let shared = matching.iter().any(|item| {
        description_keywords(&item.description)
            .iter()
            .any(|w| keywords.contains(w))
    });
    if shared {
        KEYWORD_POINTS
    } else {
        0.0
    }
}

/// Overall allocation confidence for an expense against a set of candidate
/// line items, clamped to [0, 100].
pub fn calculate_match_confidence(expense: &UnallocatedExpense, line_items: &[LineItem]) -> f64 {
    let matching = category_matches(expense, line_items);
    if matching.is_empty() {
        return 0.0;
    }
    let score = CATEGORY_POINTS
        + payee_points(expense, &matching)
        + amount_points(expense, &matching)
        + keyword_points(expense, &matching);
    score.clamp(0.0, MAX_CONFIDENCE)
}

/// Which line item the expense should be allocated to, if any.
///
/// Prefers the payee fuzzy best-match among category-matching quote items,
/// then falls back to the first category-matching item. Kept as a separate
/// pass from `calculate_match_confidence`, matching the model's contract of
/// "score and suggestion are independent".
pub fn suggest_line_item_allocation(
    expense: &UnallocatedExpense,
    line_items: &[LineItem],
) -> Option<i64> {
    let matching = category_matches(expense, line_items);
    if matching.is_empty() {
        return None;
    }
    if let Some(target) = expense.effective_payee_name() {
        let candidates = quote_payee_candidates(&matching);
        if let Some(best) = fuzzy_match_payee(target, &candidates).best_match {
            return Some(best.payee.id);
        }
    }
    matching.first().map(|item| item.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineItemKind;

    fn expense(amount: f64, category: &str, payee: Option<&str>, desc: Option<&str>) -> UnallocatedExpense {
        UnallocatedExpense {
            id: 1,
            amount,
            expense_date: "2026-03-10".to_string(),
            description: desc.map(str::to_string),
            category: category.to_string(),
            payee_id: None,
            payee_name: payee.map(str::to_string),
            suggested_line_item_id: None,
            confidence_score: None,
        }
    }

    fn line_item(id: i64, kind: LineItemKind, category: &str, desc: &str, total_cost: f64, payee: Option<&str>) -> LineItem {
        LineItem {
            id,
            kind,
            source_id: 1,
            category: category.to_string(),
            description: desc.to_string(),
            quantity: 1.0,
            price_per_unit: total_cost * 1.2,
            total: total_cost * 1.2,
            cost_per_unit: total_cost,
            total_cost,
            total_markup: total_cost * 0.2,
            payee_name: payee.map(str::to_string),
            quote_number: payee.map(|_| "Q-100".to_string()),
            allocated_expenses: Vec::new(),
            allocated_amount: 0.0,
        }
    }

    #[test]
    fn test_category_map_lookup() {
        assert_eq!(mapped_line_categories("labor"), &["labor_internal"]);
        assert_eq!(mapped_line_categories("SUBCONTRACTOR"), &["subcontractors"]);
        assert_eq!(mapped_line_categories("subcontractors"), &["subcontractors"]);
        assert_eq!(mapped_line_categories("permit"), &["permits"]);
        assert!(mapped_line_categories("landscaping").is_empty());
    }

    #[test]
    fn test_category_gate_scores_zero() {
        let exp = expense(500.0, "materials", None, Some("lumber delivery"));
        let items = vec![
            line_item(1, LineItemKind::Estimate, "labor_internal", "framing labor", 500.0, None),
            line_item(2, LineItemKind::Estimate, "equipment", "lift rental", 510.0, None),
        ];
        assert_eq!(calculate_match_confidence(&exp, &items), 0.0);
        assert_eq!(suggest_line_item_allocation(&exp, &items), None);
    }

    #[test]
    fn test_category_only_scores_forty() {
        let exp = expense(123.0, "materials", None, None);
        let items = vec![line_item(
            1,
            LineItemKind::Estimate,
            "materials",
            "drywall sheets",
            9999.0,
            None,
        )];
        assert_eq!(calculate_match_confidence(&exp, &items), CATEGORY_POINTS);
    }

    #[test]
    fn test_confidence_never_exceeds_cap() {
        // All four signals maxed: 40 + 30 + 20 + 10 lands exactly on 100.
        let exp = expense(
            5000.0,
            "subcontractor",
            Some("Smith Plumbing LLC"),
            Some("bathroom rough-in"),
        );
        let items = vec![line_item(
            1,
            LineItemKind::Quote,
            "subcontractors",
            "plumbing rough-in work",
            5000.0,
            Some("Smith Plumbing LLC"),
        )];
        let score = calculate_match_confidence(&exp, &items);
        assert_eq!(score, MAX_CONFIDENCE);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let exp = expense(
            5000.0,
            "subcontractor",
            Some("Smith Plumbing LLC"),
            Some("bathroom rough-in"),
        );
        let items = vec![line_item(
            42,
            LineItemKind::Quote,
            "subcontractors",
            "plumbing rough-in work",
            5100.0,
            Some("Smith Plumbing"),
        )];
        // category 40 + payee >= 90 (30) + amount 2% (20) + keyword (10)
        assert_eq!(calculate_match_confidence(&exp, &items), 100.0);
        assert_eq!(suggest_line_item_allocation(&exp, &items), Some(42));
    }

    #[test]
    fn test_amount_bands() {
        let cases = [
            (5100.0, 60.0), // 2% -> 20 points
            (5400.0, 55.0), // 8% -> 15 points
            (5900.0, 50.0), // 18% -> 10 points
            (7000.0, 40.0), // 40% -> 0 points
        ];
        for (cost, expected) in cases {
            let exp = expense(5000.0, "materials", None, None);
            let items = vec![line_item(1, LineItemKind::Estimate, "materials", "", cost, None)];
            assert_eq!(
                calculate_match_confidence(&exp, &items),
                expected,
                "total_cost {cost}"
            );
        }
    }

    #[test]
    fn test_amount_uses_closest_item() {
        let exp = expense(1000.0, "materials", None, None);
        let items = vec![
            line_item(1, LineItemKind::Estimate, "materials", "", 5000.0, None),
            line_item(2, LineItemKind::Estimate, "materials", "", 1020.0, None),
        ];
        assert_eq!(calculate_match_confidence(&exp, &items), 60.0);
    }

    #[test]
    fn test_zero_cost_items_skip_amount_signal() {
        let exp = expense(1000.0, "materials", None, None);
        let items = vec![line_item(1, LineItemKind::Estimate, "materials", "", 0.0, None)];
        assert_eq!(calculate_match_confidence(&exp, &items), CATEGORY_POINTS);
    }

    #[test]
    fn test_payee_bands() {
        let cases = [
            ("Smith Plumbing", 90.0),  // near-exact -> 30
            ("Zephyr Plumbing", 70.0), // shared "Plumbing" token -> weak band, 10
            ("Bayside Roofing", 60.0), // unrelated -> 0
        ];
        for (item_payee, expected) in cases {
            let exp = expense(5000.0, "subcontractor", Some("Smith Plumbing LLC"), None);
            let items = vec![line_item(
                1,
                LineItemKind::Quote,
                "subcontractors",
                "",
                5050.0,
                Some(item_payee),
            )];
            assert_eq!(
                calculate_match_confidence(&exp, &items),
                expected,
                "payee {item_payee}"
            );
        }
    }

    #[test]
    fn test_payee_signal_ignores_estimate_items() {
        // Estimate items never carry payees into the fuzzy match.
        let exp = expense(5000.0, "subcontractor", Some("Smith Plumbing"), None);
        let items = vec![line_item(
            1,
            LineItemKind::Estimate,
            "subcontractors",
            "",
            5050.0,
            Some("Smith Plumbing"),
        )];
        // category 40 + amount 20, no payee points
        assert_eq!(calculate_match_confidence(&exp, &items), 60.0);
    }

    #[test]
    fn test_keyword_stop_words_excluded() {
        let exp = expense(100.0, "materials", None, Some("with from the and for"));
        let items = vec![line_item(
            1,
            LineItemKind::Estimate,
            "materials",
            "paint with primer from stock",
            9999.0,
            None,
        )];
        assert_eq!(calculate_match_confidence(&exp, &items), CATEGORY_POINTS);
    }

    #[test]
    fn test_keyword_overlap_awards_ten() {
        let exp = expense(100.0, "materials", None, Some("interior paint gallons"));
        let items = vec![line_item(
            1,
            LineItemKind::Estimate,
            "materials",
            "exterior paint supplies",
            9999.0,
            None,
        )];
        assert_eq!(calculate_match_confidence(&exp, &items), CATEGORY_POINTS + KEYWORD_POINTS);
    }

    #[test]
    fn test_short_words_are_not_keywords() {
        let exp = expense(100.0, "materials", None, Some("mud and tape"));
        let items = vec![line_item(
            1,
            LineItemKind::Estimate,
            "materials",
            "mud application",
            9999.0,
            None,
        )];
        // "mud" and "tape" are <= 3 and 4 chars; only "tape" counts, no overlap
        assert_eq!(calculate_match_confidence(&exp, &items), CATEGORY_POINTS);
    }

    #[test]
    fn test_suggestion_prefers_payee_match_over_first_item() {
        let exp = expense(800.0, "subcontractor", Some("Acme Electric"), None);
        let items = vec![
            line_item(1, LineItemKind::Estimate, "subcontractors", "misc subs", 0.0, None),
            line_item(2, LineItemKind::Quote, "subcontractors", "panel upgrade", 820.0, Some("Acme Electric Co")),
        ];
        assert_eq!(suggest_line_item_allocation(&exp, &items), Some(2));
    }

    #[test]
    fn test_suggestion_falls_back_to_first_category_match() {
        let exp = expense(800.0, "subcontractor", Some("Totally Unrelated"), None);
        let items = vec![
            line_item(1, LineItemKind::Estimate, "subcontractors", "misc subs", 0.0, None),
            line_item(2, LineItemKind::Quote, "subcontractors", "panel upgrade", 820.0, Some("Acme Electric Co")),
        ];
        assert_eq!(suggest_line_item_allocation(&exp, &items), Some(1));
    }

    #[test]
    fn test_empty_line_items() {
        let exp = expense(800.0, "subcontractor", Some("Acme"), Some("work"));
        assert_eq!(calculate_match_confidence(&exp, &[]), 0.0);
        assert_eq!(suggest_line_item_allocation(&exp, &[]), None);
    }

    #[test]
    fn test_confidence_range() {
        let exp = expense(100.0, "equipment", Some("Rentals R Us"), Some("scissor lift"));
        let items = vec![line_item(
            1,
            LineItemKind::Quote,
            "equipment",
            "scissor lift rental",
            101.0,
            Some("Rentals R Us"),
        )];
        let score = calculate_match_confidence(&exp, &items);
        assert!((0.0..=100.0).contains(&score));
    }
}
