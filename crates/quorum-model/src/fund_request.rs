//! Fund requests and their approval lifecycle.
//!
//! A fund request is submitted by a council officer, then validated or
//! rejected by the treasurer. Its detail view embeds the expense
//! transactions charged against it, which is the one parent aggregate
//! the mutation protocol has to keep in step with the expense list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quorum_core::{Record, RecordId};

use crate::expense::ExpenseTransaction;

/// Cache scope for fund-request views.
pub const SCOPE: &str = "fund-requests";

/// Approval state of a fund request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundRequestStatus {
    Pending,
    Validated,
    Rejected,
}

impl FundRequestStatus {
    /// Returns `true` once the treasurer has ruled on the request.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Validated | Self::Rejected)
    }
}

impl std::fmt::Display for FundRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Validated => write!(f, "validated"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// A request for council funds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundRequest {
    pub id: RecordId,
    pub title: String,
    pub purpose: String,
    pub amount: f64,
    pub status: FundRequestStatus,
    /// Officer who filed the request.
    pub requested_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for FundRequest {
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

/// Fields supplied when filing a fund request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFundRequest {
    pub title: String,
    pub purpose: String,
    pub amount: f64,
    pub requested_by: i64,
}

impl NewFundRequest {
    /// Synthesize the placeholder row an optimistic create projects into
    /// the cache: local id, initial `Pending` status, fresh timestamps.
    pub fn placeholder(&self, id: RecordId, now: DateTime<Utc>) -> FundRequest {
        FundRequest {
            id,
            title: self.title.clone(),
            purpose: self.purpose.clone(),
            amount: self.amount,
            status: FundRequestStatus::Pending,
            requested_by: self.requested_by,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Shallow-merge patch for a fund request. Only present fields are
/// applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundRequestPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FundRequestStatus>,
}

impl FundRequestPatch {
    /// Apply the patch onto a cached row, refreshing `updated_at`.
    pub fn apply(&self, row: &mut FundRequest, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            row.title = title.clone();
        }
        if let Some(purpose) = &self.purpose {
            row.purpose = purpose.clone();
        }
        if let Some(amount) = self.amount {
            row.amount = amount;
        }
        if let Some(status) = self.status {
            row.status = status;
        }
        row.touch(now);
    }
}

/// Wire-form field of [`FundRequestWithExpenses`] holding the embedded
/// expense rows; expense mutations edit this array through the
/// aggregate projection.
pub const EMBEDDED_EXPENSES: &str = "expenseTransactions";

/// Detail aggregate: a fund request plus the expense transactions
/// charged against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundRequestWithExpenses {
    #[serde(flatten)]
    pub fund_request: FundRequest,
    pub expense_transactions: Vec<ExpenseTransaction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_core::TempId;

    fn sample_new() -> NewFundRequest {
        NewFundRequest {
            title: "Intramurals banners".to_string(),
            purpose: "Printing and tarpaulin".to_string(),
            amount: 1500.0,
            requested_by: 7,
        }
    }

    #[test]
    fn test_status_is_settled() {
        assert!(!FundRequestStatus::Pending.is_settled());
        assert!(FundRequestStatus::Validated.is_settled());
        assert!(FundRequestStatus::Rejected.is_settled());
    }

    #[test]
    fn test_placeholder_starts_pending() {
        let now = Utc::now();
        let row = sample_new().placeholder(RecordId::Local(TempId::new()), now);
        assert_eq!(row.status, FundRequestStatus::Pending);
        assert!(row.is_placeholder());
        assert_eq!(row.created_at, now);
        assert_eq!(row.updated_at, now);
    }

    #[test]
    fn test_patch_applies_present_fields_only() {
        let created = Utc::now();
        let mut row = sample_new().placeholder(RecordId::Confirmed(3), created);
        let later = created + chrono::Duration::seconds(30);

        let patch = FundRequestPatch {
            status: Some(FundRequestStatus::Validated),
            ..Default::default()
        };
        patch.apply(&mut row, later);

        assert_eq!(row.status, FundRequestStatus::Validated);
        assert_eq!(row.title, "Intramurals banners");
        assert_eq!(row.updated_at, later);
    }

    #[test]
    fn test_patch_serializes_sparsely() {
        let patch = FundRequestPatch {
            amount: Some(2000.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "amount": 2000.0 }));
    }
}
