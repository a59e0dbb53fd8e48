use rusqlite::Connection;

use crate::error::Result;

/// One allocation target: an estimate line item, or an accepted quote as a
/// unit (quote correlations attach at quote granularity).
pub struct TargetSummary {
    pub label: String,
    pub category: String,
    pub budgeted_cost: f64,
    pub allocated_amount: f64,
    pub expense_count: i64,
}

impl TargetSummary {
    pub fn variance(&self) -> f64 {
        self.budgeted_cost - self.allocated_amount
    }
}

pub struct AllocationSummary {
    pub targets: Vec<TargetSummary>,
    pub total_budgeted: f64,
    pub total_allocated: f64,
    pub unallocated_count: i64,
    pub unallocated_total: f64,
}

pub fn allocation_summary(conn: &Connection, project_id: i64) -> Result<AllocationSummary> {
    let mut targets = Vec::new();

    // Estimate line items, each its own target.
    let mut stmt = conn.prepare(
        "SELECT li.id, li.category, li.description, li.total_cost, \
                COALESCE(sum(e.amount), 0), count(e.id) \
         FROM line_items li \
         LEFT JOIN expense_correlations c ON c.estimate_line_item_id = li.id \
         LEFT JOIN expenses e ON e.id = c.expense_id \
         WHERE li.project_id = ?1 AND li.quote_id IS NULL \
         GROUP BY li.id ORDER BY li.id",
    )?;
    let estimate_rows: Vec<TargetSummary> = stmt
        .query_map([project_id], |row| {
            let description: String = row.get(2)?;
            Ok(TargetSummary {
                label: description,
                category: row.get(1)?,
                budgeted_cost: row.get(3)?,
                allocated_amount: row.get(4)?,
                expense_count: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    targets.extend(estimate_rows);

    // Accepted quotes, one target per quote.
    let mut stmt = conn.prepare(
        "SELECT q.quote_number, q.payee_name, \
                COALESCE((SELECT sum(total_cost) FROM line_items WHERE quote_id = q.id), 0), \
                COALESCE(sum(e.amount), 0), count(e.id), \
                COALESCE((SELECT group_concat(DISTINCT category) FROM line_items WHERE quote_id = q.id), '') \
         FROM quotes q \
         LEFT JOIN expense_correlations c ON c.quote_id = q.id \
         LEFT JOIN expenses e ON e.id = c.expense_id \
         WHERE q.project_id = ?1 AND q.status = 'accepted' \
         GROUP BY q.id ORDER BY q.id",
    )?;
    let quote_rows: Vec<TargetSummary> = stmt
        .query_map([project_id], |row| {
            let number: String = row.get(0)?;
            let payee: Option<String> = row.get(1)?;
            let label = match payee {
                Some(p) => format!("{number} \u{2014} {p}"),
                None => number,
            };
            Ok(TargetSummary {
                label,
                category: row.get(5)?,
                budgeted_cost: row.get(2)?,
                allocated_amount: row.get(3)?,
                expense_count: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    targets.extend(quote_rows);

    let total_budgeted = targets.iter().map(|t| t.budgeted_cost).sum();
    let total_allocated = targets.iter().map(|t| t.allocated_amount).sum();

    let (unallocated_count, unallocated_total) = conn.query_row(
        "SELECT count(*), COALESCE(sum(e.amount), 0) FROM expenses e \
         LEFT JOIN expense_correlations c ON c.expense_id = e.id \
         WHERE e.project_id = ?1 AND c.id IS NULL",
        [project_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(AllocationSummary {
        targets,
        total_budgeted,
        total_allocated,
        unallocated_count,
        unallocated_total,
    })
}
