//! Common test harness for the optimistic mutation protocol suite.

use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use quorum_cache::{CacheKey, CacheStore};
use quorum_core::{Page, PageMeta, RecordId, TempId};
use quorum_model::expense::{self, ExpenseTransaction, NewExpenseTransaction};
use quorum_model::fund_request::{
    self, FundRequest, FundRequestStatus, FundRequestWithExpenses,
};
use quorum_mutate::{Notifier, ViewSet};

/// Fixed wall-clock instant so projections are deterministic.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap()
}

/// A confirmed expense row with the given id.
pub fn expense(id: i64) -> ExpenseTransaction {
    ExpenseTransaction {
        id: RecordId::Confirmed(id),
        fund_request_id: 1,
        particulars: format!("Expense {id}"),
        amount: 100.0,
        incurred_on: chrono::NaiveDate::from_ymd_opt(2025, 8, 30).unwrap(),
        created_at: t0(),
        updated_at: t0(),
    }
}

/// A placeholder expense row as an optimistic create would mint it.
pub fn placeholder() -> (TempId, ExpenseTransaction) {
    let temp = TempId::new();
    let new = NewExpenseTransaction {
        fund_request_id: 1,
        particulars: "Fresh expense".to_string(),
        amount: 75.0,
        incurred_on: chrono::NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
    };
    (temp, new.placeholder(RecordId::Local(temp), t0()))
}

/// Keys of the seeded views.
pub struct SeededKeys {
    pub page1: CacheKey,
    pub page2: CacheKey,
    pub infinite: CacheKey,
    pub detail5: CacheKey,
}

/// A store seeded with the canonical scenario: a 25-row expense list
/// cached as page 1 (rows 1–10) and page 2 (rows 11–20), the same data
/// as an infinite view, and a detail entry for row 5.
pub fn seeded_store() -> (CacheStore, SeededKeys) {
    let store = CacheStore::new();

    let page1 = CacheKey::list(expense::SCOPE, &json!({ "page": 1, "limit": 10 })).unwrap();
    let page2 = CacheKey::list(expense::SCOPE, &json!({ "page": 2, "limit": 10 })).unwrap();
    let infinite = CacheKey::infinite(expense::SCOPE, &json!({ "limit": 10 })).unwrap();
    let detail5 = CacheKey::detail(expense::SCOPE, RecordId::Confirmed(5));

    store
        .set(
            &page1,
            &Page {
                data: (1..=10).map(expense).collect::<Vec<_>>(),
                meta: PageMeta::new(1, 10, 25),
            },
        )
        .unwrap();
    store
        .set(
            &page2,
            &Page {
                data: (11..=20).map(expense).collect::<Vec<_>>(),
                meta: PageMeta::new(2, 10, 25),
            },
        )
        .unwrap();
    store
        .set(
            &infinite,
            &vec![
                Page {
                    data: (1..=10).map(expense).collect::<Vec<_>>(),
                    meta: PageMeta::new(1, 10, 25),
                },
                Page {
                    data: (11..=20).map(expense).collect::<Vec<_>>(),
                    meta: PageMeta::new(2, 10, 25),
                },
            ],
        )
        .unwrap();
    store.set(&detail5, &expense(5)).unwrap();

    (
        store,
        SeededKeys {
            page1,
            page2,
            infinite,
            detail5,
        },
    )
}

/// The view set every expense mutation in this suite uses.
pub fn expense_views() -> ViewSet {
    ViewSet::scoped(expense::SCOPE)
}

/// Detail key of the fund request the seeded expenses are charged to.
pub fn aggregate_key() -> CacheKey {
    CacheKey::detail(fund_request::SCOPE, RecordId::Confirmed(1))
}

/// Seed the owning fund request's detail aggregate: the request row
/// with expenses 1 and 2 embedded.
pub fn seeded_aggregate(store: &CacheStore) -> CacheKey {
    let key = aggregate_key();
    store
        .set(
            &key,
            &FundRequestWithExpenses {
                fund_request: FundRequest {
                    id: RecordId::Confirmed(1),
                    title: "Intramurals".to_string(),
                    purpose: "Sports fest logistics".to_string(),
                    amount: 5_000.0,
                    status: FundRequestStatus::Validated,
                    requested_by: 7,
                    created_at: t0(),
                    updated_at: t0(),
                },
                expense_transactions: vec![expense(1), expense(2)],
            },
        )
        .unwrap();
    key
}

/// Expense views plus the owning fund request's aggregate.
pub fn expense_views_with_aggregate() -> ViewSet {
    ViewSet::scoped(expense::SCOPE)
        .with_aggregate(aggregate_key(), fund_request::EMBEDDED_EXPENSES)
}

/// Notifier double that records every reported error.
#[derive(Default)]
pub struct CapturingNotifier {
    pub reports: Mutex<Vec<(String, String)>>,
}

impl Notifier for CapturingNotifier {
    fn notify_error(&self, scope: &str, message: &str) {
        self.reports
            .lock()
            .unwrap()
            .push((scope.to_string(), message.to_string()));
    }
}
