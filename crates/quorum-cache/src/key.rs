//! Hierarchical cache keys.
//!
//! A key names one cached view: a paginated list, an infinite-scroll page
//! set, or a single-item detail record. Keys are grouped under an entity
//! **scope** (e.g. `"expense-transactions"`); invalidation and in-flight
//! read cancellation operate on whole scopes.
//!
//! List and infinite keys embed their filter set in canonical JSON
//! (object keys sorted), so logically equal filters address the same
//! entry regardless of construction order.

use serde::Serialize;
use std::fmt;

use quorum_core::{Error, RecordId, Result};

/// The view discriminant of a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// One page of a paginated list, addressed by its filter set
    /// (which includes the page number).
    List { filters: String },
    /// An infinite-scroll page set, addressed by its filter set.
    Infinite { filters: String },
    /// A single-item detail record.
    Detail { id: RecordId },
}

/// Address of one cached view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    scope: String,
    kind: ViewKind,
}

impl CacheKey {
    /// Key for a paginated list view under `scope` with the given
    /// filter set.
    pub fn list(scope: &str, filters: &impl Serialize) -> Result<Self> {
        Ok(Self {
            scope: scope.to_string(),
            kind: ViewKind::List {
                filters: canonical_filters(filters)?,
            },
        })
    }

    /// Key for an infinite-scroll view under `scope`.
    pub fn infinite(scope: &str, filters: &impl Serialize) -> Result<Self> {
        Ok(Self {
            scope: scope.to_string(),
            kind: ViewKind::Infinite {
                filters: canonical_filters(filters)?,
            },
        })
    }

    /// Key for a single-item detail view.
    pub fn detail(scope: &str, id: RecordId) -> Self {
        Self {
            scope: scope.to_string(),
            kind: ViewKind::Detail { id },
        }
    }

    /// The entity scope this key belongs to.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// The view discriminant.
    pub fn kind(&self) -> &ViewKind {
        &self.kind
    }

    /// Returns `true` if this key is covered by `scope`.
    pub fn in_scope(&self, scope: &str) -> bool {
        self.scope == scope
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, ViewKind::List { .. })
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.kind, ViewKind::Infinite { .. })
    }

    pub fn is_detail(&self) -> bool {
        matches!(self.kind, ViewKind::Detail { .. })
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViewKind::List { filters } => write!(f, "{}/list?{filters}", self.scope),
            ViewKind::Infinite { filters } => write!(f, "{}/infinite?{filters}", self.scope),
            ViewKind::Detail { id } => write!(f, "{}/detail/{id}", self.scope),
        }
    }
}

/// Canonical JSON encoding of a filter set. `serde_json` maps are
/// ordered by key, so equal filter sets encode identically.
fn canonical_filters(filters: &impl Serialize) -> Result<String> {
    let value = serde_json::to_value(filters).map_err(Error::encode)?;
    serde_json::to_string(&value).map_err(Error::encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_core::TempId;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Filter {
        page: u64,
        limit: u64,
    }

    #[test]
    fn test_equal_filters_address_same_entry() {
        let a = CacheKey::list("expense-transactions", &Filter { page: 1, limit: 10 }).unwrap();
        let b = CacheKey::list("expense-transactions", &Filter { page: 1, limit: 10 }).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_canonical_filters_sort_object_keys() {
        let ab = serde_json::json!({ "a": 1, "b": 2 });
        let ba = serde_json::json!({ "b": 2, "a": 1 });
        assert_eq!(
            canonical_filters(&ab).unwrap(),
            canonical_filters(&ba).unwrap()
        );
    }

    #[test]
    fn test_kinds_are_distinct_keys() {
        let filters = Filter { page: 1, limit: 10 };
        let list = CacheKey::list("igps", &filters).unwrap();
        let infinite = CacheKey::infinite("igps", &filters).unwrap();
        assert_ne!(list, infinite);
        assert!(list.is_list());
        assert!(infinite.is_infinite());
    }

    #[test]
    fn test_scope_coverage() {
        let key = CacheKey::detail("violations", RecordId::Confirmed(4));
        assert!(key.in_scope("violations"));
        assert!(!key.in_scope("igps"));
        assert!(key.is_detail());
    }

    #[test]
    fn test_display_forms() {
        let detail = CacheKey::detail("igps", RecordId::Confirmed(8));
        assert_eq!(detail.to_string(), "igps/detail/8");

        let tmp = TempId::new();
        let local = CacheKey::detail("igps", RecordId::Local(tmp));
        assert_eq!(local.to_string(), format!("igps/detail/local:{tmp}"));
    }
}
