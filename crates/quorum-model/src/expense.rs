//! Expense transactions charged against validated fund requests.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use quorum_core::{Record, RecordId};

/// Cache scope for expense-transaction views.
pub const SCOPE: &str = "expense-transactions";

/// A single expense drawn from council funds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseTransaction {
    pub id: RecordId,
    /// The fund request this expense is charged against.
    pub fund_request_id: i64,
    pub particulars: String,
    pub amount: f64,
    /// Date the expense was incurred.
    pub incurred_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for ExpenseTransaction {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Fields supplied when recording an expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpenseTransaction {
    pub fund_request_id: i64,
    pub particulars: String,
    pub amount: f64,
    pub incurred_on: NaiveDate,
}

impl NewExpenseTransaction {
    /// Placeholder row for an optimistic create.
    pub fn placeholder(&self, id: RecordId, now: DateTime<Utc>) -> ExpenseTransaction {
        ExpenseTransaction {
            id,
            fund_request_id: self.fund_request_id,
            particulars: self.particulars.clone(),
            amount: self.amount,
            incurred_on: self.incurred_on,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Shallow-merge patch for an expense transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseTransactionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particulars: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incurred_on: Option<NaiveDate>,
}

impl ExpenseTransactionPatch {
    /// Apply the patch onto a cached row, refreshing `updated_at`.
    pub fn apply(&self, row: &mut ExpenseTransaction, now: DateTime<Utc>) {
        if let Some(particulars) = &self.particulars {
            row.particulars = particulars.clone();
        }
        if let Some(amount) = self.amount {
            row.amount = amount;
        }
        if let Some(incurred_on) = self.incurred_on {
            row.incurred_on = incurred_on;
        }
        row.touch(now);
    }
}
