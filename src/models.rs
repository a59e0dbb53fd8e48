#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Project {
    pub id: i64,
    pub name: String,
}

/// Minimal payee identity used by the fuzzy matcher. Built transiently from
/// the payees table or from quote line items; never persisted by the matcher.
#[derive(Debug, Clone)]
pub struct PartialPayee {
    pub id: i64,
    pub payee_name: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    Exact,
    Fuzzy,
    Token,
}

#[derive(Debug, Clone)]
pub struct MatchResult {
    pub payee: PartialPayee,
    pub confidence: f64,
    pub match_type: MatchType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemKind {
    Estimate,
    Quote,
}

impl LineItemKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Estimate => "estimate",
            Self::Quote => "quote",
        }
    }
}

/// Unified read-only view over estimate line items and accepted-quote line
/// items, recomputed on each load. `source_id` is the owning project for
/// estimate items and the parent quote for quote items.
#[derive(Debug, Clone)]
pub struct LineItem {
    pub id: i64,
    pub kind: LineItemKind,
    pub source_id: i64,
    pub category: String,
    pub description: String,
    pub quantity: f64,
    pub price_per_unit: f64,
    pub total: f64,
    pub cost_per_unit: f64,
    pub total_cost: f64,
    pub total_markup: f64,
    pub payee_name: Option<String>,
    pub quote_number: Option<String>,
    pub allocated_expenses: Vec<AllocatedExpense>,
    pub allocated_amount: f64,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct UnallocatedExpense {
    pub id: i64,
    pub amount: f64,
    pub expense_date: String,
    pub description: Option<String>,
    pub category: String,
    pub payee_id: Option<i64>,
    pub payee_name: Option<String>,
    pub suggested_line_item_id: Option<i64>,
    pub confidence_score: Option<f64>,
}

impl UnallocatedExpense {
    pub fn effective_payee_name(&self) -> Option<&str> {
        self.payee_name.as_deref().filter(|n| !n.is_empty())
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct AllocatedExpense {
    pub id: i64,
    pub amount: f64,
    pub expense_date: String,
    pub description: Option<String>,
    pub auto_correlated: bool,
    pub confidence_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationType {
    Estimated,
    Quoted,
}

impl CorrelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Estimated => "estimated",
            Self::Quoted => "quoted",
        }
    }
}
