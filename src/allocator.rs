//! Allocation orchestrator: loads project expenses and candidate line items,
//! computes suggested allocations, and persists correlations.
//!
//! Writes run inside a single SQLite transaction so the correlation insert
//! and the `is_planned` flag update cannot half-apply.

use rusqlite::{Connection, OptionalExtension};

use crate::confidence::{calculate_match_confidence, suggest_line_item_allocation};
use crate::error::{JobcostError, Result};
use crate::matcher::AUTO_ACCEPT_THRESHOLD;
use crate::models::{
    AllocatedExpense, CorrelationType, LineItem, LineItemKind, UnallocatedExpense,
};

/// Minimum confidence for an expense to qualify for auto-allocation.
/// Shares the matcher's auto-accept bar.
pub const AUTO_ALLOCATE_THRESHOLD: f64 = AUTO_ACCEPT_THRESHOLD;

pub struct AllocationState {
    pub line_items: Vec<LineItem>,
    pub unallocated: Vec<UnallocatedExpense>,
    pub allocated_count: usize,
    pub allocated_total: f64,
}

/// A previewed auto-allocation: one expense resolved to one line item.
#[derive(Debug, Clone)]
pub struct AutoCandidate {
    pub expense_id: i64,
    pub expense_date: String,
    pub expense_description: Option<String>,
    pub amount: f64,
    pub line_item_id: i64,
    pub line_item_label: String,
    pub confidence: f64,
}

fn load_line_items(conn: &Connection, project_id: i64) -> Result<Vec<LineItem>> {
    // Estimate items plus line items of accepted quotes, one unified view.
    let mut stmt = conn.prepare(
        "SELECT li.id, li.quote_id, li.category, li.description, li.quantity, \
                li.price_per_unit, li.total, li.cost_per_unit, li.total_cost, li.total_markup, \
                q.payee_name, q.quote_number \
         FROM line_items li \
         LEFT JOIN quotes q ON li.quote_id = q.id \
         WHERE li.project_id = ?1 AND (li.quote_id IS NULL OR q.status = 'accepted') \
         ORDER BY li.id",
    )?;
    let items = stmt
        .query_map([project_id], |row| {
            let quote_id: Option<i64> = row.get(1)?;
            Ok(LineItem {
                id: row.get(0)?,
                kind: if quote_id.is_some() {
                    LineItemKind::Quote
                } else {
                    LineItemKind::Estimate
                },
                source_id: quote_id.unwrap_or(project_id),
                category: row.get(2)?,
                description: row.get(3)?,
                quantity: row.get(4)?,
                price_per_unit: row.get(5)?,
                total: row.get(6)?,
                cost_per_unit: row.get(7)?,
                total_cost: row.get(8)?,
                total_markup: row.get(9)?,
                payee_name: row.get(10)?,
                quote_number: row.get(11)?,
                allocated_expenses: Vec::new(),
                allocated_amount: 0.0,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(items)
}

fn attach_allocated_expenses(conn: &Connection, items: &mut [LineItem]) -> Result<()> {
    let mut stmt = conn.prepare(
        "SELECT e.id, e.amount, e.expense_date, e.description, \
                c.auto_correlated, c.confidence_score, \
                c.estimate_line_item_id, c.quote_id \
         FROM expense_correlations c JOIN expenses e ON c.expense_id = e.id \
         ORDER BY e.expense_date",
    )?;
    let rows: Vec<(AllocatedExpense, Option<i64>, Option<i64>)> = stmt
        .query_map([], |row| {
            Ok((
                AllocatedExpense {
                    id: row.get(0)?,
                    amount: row.get(1)?,
                    expense_date: row.get(2)?,
                    description: row.get(3)?,
                    auto_correlated: row.get(4)?,
                    confidence_score: row.get(5)?,
                },
                row.get(6)?,
                row.get(7)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for (expense, estimate_item_id, quote_id) in rows {
        // Quote correlations attach at quote granularity; roll them up on the
        // quote's first line item so each expense appears exactly once.
        let target = items.iter_mut().find(|item| match item.kind {
            LineItemKind::Estimate => estimate_item_id == Some(item.id),
            LineItemKind::Quote => quote_id == Some(item.source_id),
        });
        if let Some(item) = target {
            item.allocated_amount += expense.amount;
            item.allocated_expenses.push(expense);
        }
    }
    Ok(())
}

/// Load everything the allocation workflow needs for one project. Read-only;
/// a failure here leaves no state behind.
pub fn load_allocation_state(conn: &Connection, project_id: i64) -> Result<AllocationState> {
    let mut line_items = load_line_items(conn, project_id)?;
    attach_allocated_expenses(conn, &mut line_items)?;

    let mut stmt = conn.prepare(
        "SELECT e.id, e.amount, e.expense_date, e.description, e.category, \
                e.payee_id, COALESCE(p.full_name, p.payee_name, e.payee_name) \
         FROM expenses e \
         LEFT JOIN payees p ON e.payee_id = p.id \
         LEFT JOIN expense_correlations c ON c.expense_id = e.id \
         WHERE e.project_id = ?1 AND c.id IS NULL \
         ORDER BY e.expense_date, e.id",
    )?;
    let mut unallocated: Vec<UnallocatedExpense> = stmt
        .query_map([project_id], |row| {
            Ok(UnallocatedExpense {
                id: row.get(0)?,
                amount: row.get(1)?,
                expense_date: row.get(2)?,
                description: row.get(3)?,
                category: row.get(4)?,
                payee_id: row.get(5)?,
                payee_name: row.get(6)?,
                suggested_line_item_id: None,
                confidence_score: None,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for expense in &mut unallocated {
        expense.suggested_line_item_id = suggest_line_item_allocation(expense, &line_items);
        expense.confidence_score = Some(calculate_match_confidence(expense, &line_items));
    }

    let (allocated_count, allocated_total) = conn.query_row(
        "SELECT count(*), COALESCE(sum(e.amount), 0) \
         FROM expense_correlations c JOIN expenses e ON c.expense_id = e.id \
         WHERE e.project_id = ?1",
        [project_id],
        |row| Ok((row.get::<_, i64>(0)? as usize, row.get::<_, f64>(1)?)),
    )?;

    Ok(AllocationState {
        line_items,
        unallocated,
        allocated_count,
        allocated_total,
    })
}

fn correlation_target(conn: &Connection, line_item_id: i64) -> Result<(CorrelationType, Option<i64>)> {
    let quote_id: Option<i64> = conn
        .query_row(
            "SELECT quote_id FROM line_items WHERE id = ?1",
            [line_item_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(JobcostError::UnknownLineItem(line_item_id))?;
    match quote_id {
        Some(q) => Ok((CorrelationType::Quoted, Some(q))),
        None => Ok((CorrelationType::Estimated, None)),
    }
}

fn insert_correlation(
    conn: &Connection,
    expense_id: i64,
    line_item_id: i64,
    auto_correlated: bool,
    confidence_score: Option<f64>,
    notes: Option<&str>,
) -> Result<()> {
    let exists: bool = conn
        .prepare_cached("SELECT 1 FROM expense_correlations WHERE expense_id = ?1")?
        .exists([expense_id])?;
    if exists {
        return Err(JobcostError::AlreadyAllocated(expense_id));
    }
    let (correlation_type, quote_id) = correlation_target(conn, line_item_id)?;
    let estimate_item_id = match correlation_type {
        CorrelationType::Estimated => Some(line_item_id),
        CorrelationType::Quoted => None,
    };
    conn.execute(
        "INSERT INTO expense_correlations \
         (expense_id, estimate_line_item_id, quote_id, correlation_type, auto_correlated, confidence_score, notes) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            expense_id,
            estimate_item_id,
            quote_id,
            correlation_type.as_str(),
            auto_correlated,
            confidence_score,
            notes,
        ],
    )?;
    conn.execute(
        "UPDATE expenses SET is_planned = 1 WHERE id = ?1",
        [expense_id],
    )?;
    Ok(())
}

/// Manually assign a set of expenses to one line item. All-or-nothing: any
/// failure rolls the whole batch back.
pub fn bulk_assign(conn: &mut Connection, expense_ids: &[i64], line_item_id: i64) -> Result<usize> {
    let tx = conn.transaction()?;
    for &expense_id in expense_ids {
        insert_correlation(&tx, expense_id, line_item_id, false, None, None)?;
    }
    tx.commit()?;
    Ok(expense_ids.len())
}

/// Remove correlations so the expenses return to the unallocated pool.
/// Reallocation is delete-then-reinsert; correlations are never updated
/// in place.
pub fn unassign(conn: &mut Connection, expense_ids: &[i64]) -> Result<usize> {
    let tx = conn.transaction()?;
    let mut removed = 0usize;
    for &expense_id in expense_ids {
        removed += tx.execute(
            "DELETE FROM expense_correlations WHERE expense_id = ?1",
            [expense_id],
        )?;
        tx.execute("UPDATE expenses SET is_planned = 0 WHERE id = ?1", [expense_id])?;
    }
    tx.commit()?;
    Ok(removed)
}

/// The auto-allocate candidate list: unallocated expenses whose confidence
/// clears the threshold and whose suggestion resolves to a loaded line item.
/// Empty means "no high-confidence allocations" and nothing is written.
pub fn auto_allocate_preview(state: &AllocationState) -> Vec<AutoCandidate> {
    state
        .unallocated
        .iter()
        .filter_map(|expense| {
            let confidence = expense.confidence_score?;
            if confidence < AUTO_ALLOCATE_THRESHOLD {
                return None;
            }
            let item_id = expense.suggested_line_item_id?;
            let item = state.line_items.iter().find(|i| i.id == item_id)?;
            Some(AutoCandidate {
                expense_id: expense.id,
                expense_date: expense.expense_date.clone(),
                expense_description: expense.description.clone(),
                amount: expense.amount,
                line_item_id: item.id,
                line_item_label: line_item_label(item),
                confidence,
            })
        })
        .collect()
}

pub fn line_item_label(item: &LineItem) -> String {
    match (&item.quote_number, &item.payee_name) {
        (Some(number), Some(payee)) => format!("{number} {payee}: {}", item.description),
        (Some(number), None) => format!("{number}: {}", item.description),
        _ => item.description.clone(),
    }
}

/// Persist a reviewed auto-allocate batch. Each correlation records the
/// confidence it was previewed with, flagged `auto_correlated`.
pub fn auto_allocate_commit(conn: &mut Connection, candidates: &[AutoCandidate]) -> Result<usize> {
    let tx = conn.transaction()?;
    for candidate in candidates {
        insert_correlation(
            &tx,
            candidate.expense_id,
            candidate.line_item_id,
            true,
            Some(candidate.confidence),
            None,
        )?;
    }
    tx.commit()?;
    Ok(candidates.len())
}
