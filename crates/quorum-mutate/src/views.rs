//! The set of cached views one mutation touches.
//!
//! A mutation affects every cached view of its entity's scope (all list
//! and infinite variants, whatever filter sets happen to be cached), the
//! entity's detail view when the target id is known, and any parent
//! aggregate views that embed the entity (e.g. a fund request's detail
//! view embedding its expense list).

use quorum_cache::{CacheKey, CacheStore};
use quorum_core::RecordId;

/// A parent aggregate view embedding this entity's rows, e.g. a fund
/// request's detail view carrying its expense list.
///
/// `embedded` is the wire-form name of the field holding the embedded
/// row array; projections and reconciliation edit that array the same
/// way they edit a plain list view.
#[derive(Debug, Clone)]
pub struct Aggregate {
    key: CacheKey,
    embedded: String,
}

impl Aggregate {
    /// The aggregate's cache key.
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Wire-form name of the field holding the embedded row array.
    pub fn embedded(&self) -> &str {
        &self.embedded
    }
}

/// The affected-view set of one mutation.
#[derive(Debug, Clone)]
pub struct ViewSet {
    scope: String,
    detail: Option<CacheKey>,
    aggregates: Vec<Aggregate>,
}

impl ViewSet {
    /// A view set covering every cached view under `scope`.
    pub fn scoped(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            detail: None,
            aggregates: Vec::new(),
        }
    }

    /// Name the mutation target's detail view (update/delete, where the
    /// id is known up front).
    pub fn with_detail(mut self, id: RecordId) -> Self {
        self.detail = Some(CacheKey::detail(&self.scope, id));
        self
    }

    /// Add a parent aggregate view that embeds this entity. `embedded`
    /// names the aggregate's field holding the embedded row array.
    pub fn with_aggregate(mut self, key: CacheKey, embedded: impl Into<String>) -> Self {
        self.aggregates.push(Aggregate {
            key,
            embedded: embedded.into(),
        });
        self
    }

    /// The entity scope this mutation operates on.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// The target's detail key, if named.
    pub fn detail(&self) -> Option<&CacheKey> {
        self.detail.as_ref()
    }

    /// Parent aggregates embedding this entity.
    pub fn aggregates(&self) -> &[Aggregate] {
        &self.aggregates
    }

    /// Every scope an affected view lives under. Used for in-flight
    /// read cancellation, which is per scope.
    pub fn scopes(&self) -> Vec<String> {
        let mut scopes = vec![self.scope.clone()];
        for aggregate in &self.aggregates {
            if !scopes.iter().any(|s| s == aggregate.key.scope()) {
                scopes.push(aggregate.key.scope().to_string());
            }
        }
        scopes
    }

    /// Resolve the concrete affected keys against the store's current
    /// contents: every cached key under the scope, plus the detail key
    /// and the aggregates (whether cached or not — absent slots still
    /// get snapshotted so rollback can delete what projection creates).
    pub fn resolve(&self, store: &CacheStore) -> Vec<CacheKey> {
        let mut keys = store.keys_in_scope(&self.scope);
        if let Some(detail) = &self.detail {
            if !keys.contains(detail) {
                keys.push(detail.clone());
            }
        }
        for aggregate in &self.aggregates {
            if !keys.contains(&aggregate.key) {
                keys.push(aggregate.key.clone());
            }
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_collects_scope_detail_and_aggregates() {
        let store = CacheStore::new();
        let list = CacheKey::list("expense-transactions", &json!({ "page": 1 })).unwrap();
        store.set(&list, &json!([])).unwrap();

        let aggregate = CacheKey::detail("fund-requests", RecordId::Confirmed(7));
        let views = ViewSet::scoped("expense-transactions")
            .with_detail(RecordId::Confirmed(3))
            .with_aggregate(aggregate.clone(), "expenseTransactions");

        let keys = views.resolve(&store);
        assert!(keys.contains(&list));
        assert!(keys.contains(&CacheKey::detail("expense-transactions", RecordId::Confirmed(3))));
        assert!(keys.contains(&aggregate));
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_scopes_deduplicate() {
        let views = ViewSet::scoped("expense-transactions")
            .with_aggregate(
                CacheKey::detail("fund-requests", RecordId::Confirmed(1)),
                "expenseTransactions",
            )
            .with_aggregate(
                CacheKey::detail("fund-requests", RecordId::Confirmed(2)),
                "expenseTransactions",
            );
        assert_eq!(views.scopes(), vec!["expense-transactions", "fund-requests"]);
    }
}
