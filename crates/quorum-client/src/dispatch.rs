//! Per-entity mutation dispatchers.
//!
//! The dashboard's source duplicated the optimistic-update step sequence
//! once per entity and operation (~15 near-identical files). Here each
//! dispatcher shrinks to its distinct part: the entity's view set, its
//! placeholder or patch projection, and the transport call. Everything
//! else is the generic engine in `quorum-mutate`.
//!
//! Reads go through the store's fetch guard, so a refetch that a
//! mutation cancelled mid-flight cannot overwrite the optimistic write.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use quorum_cache::{CacheKey, CacheStore};
use quorum_core::{Page, RecordId, TempId};
use quorum_model::{
    expense::{self, ExpenseTransaction, ExpenseTransactionPatch, NewExpenseTransaction},
    fund_request::{self, FundRequest, FundRequestPatch, NewFundRequest},
    igp::{self, Igp, IgpPatch, NewIgp},
    locker::{self, LockerRental, LockerRentalPatch, NewLockerRental},
    violation::{self, NewViolation, Violation, ViolationPatch},
    water_fund::{self, NewWaterFund, WaterFund, WaterFundPatch},
};
use quorum_mutate::{OptimisticWrite, ViewSet};

use crate::client::ApiClient;
use crate::error::Result;

/// Entity dispatchers over one API client and one cache store.
#[derive(Clone)]
pub struct Dispatch {
    api: ApiClient,
    engine: OptimisticWrite,
}

impl Dispatch {
    /// Dispatchers with the default (logging) error notifier.
    pub fn new(api: ApiClient, store: CacheStore) -> Self {
        Self {
            api,
            engine: OptimisticWrite::new(store),
        }
    }

    /// Dispatchers over a preconfigured engine (custom notifier).
    pub fn with_engine(api: ApiClient, engine: OptimisticWrite) -> Self {
        Self { api, engine }
    }

    /// The cache store behind the engine.
    pub fn store(&self) -> &CacheStore {
        self.engine.store()
    }

    // ------------------------------------------------------------------
    // Read-through refresh
    // ------------------------------------------------------------------

    /// Fetch a list view and cache it, unless a mutation cancelled this
    /// read while it was in flight.
    pub async fn refresh_list<T>(&self, scope: &str, filters: &impl Serialize) -> Result<Page<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let key = CacheKey::list(scope, filters)?;
        let guard = self.store().begin_fetch(scope);
        let page = self.api.find_many::<T>(scope, filters).await?;
        if !guard.commit(&key, &page)? {
            log::debug!("refetch of '{key}' cancelled by a mutation");
        }
        Ok(page)
    }

    /// Fetch a detail view and cache it, subject to the same guard.
    pub async fn refresh_detail<T>(&self, scope: &str, id: i64) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let key = CacheKey::detail(scope, RecordId::Confirmed(id));
        let guard = self.store().begin_fetch(scope);
        let row = self.api.find_one::<T>(scope, id).await?;
        if !guard.commit(&key, &row)? {
            log::debug!("refetch of '{key}' cancelled by a mutation");
        }
        Ok(row)
    }

    // ------------------------------------------------------------------
    // Expense transactions (parent aggregate: the owning fund request)
    // ------------------------------------------------------------------

    pub async fn create_expense_transaction(
        &self,
        new: &NewExpenseTransaction,
    ) -> Result<ExpenseTransaction> {
        let views = ViewSet::scoped(expense::SCOPE).with_aggregate(
            CacheKey::detail(fund_request::SCOPE, RecordId::Confirmed(new.fund_request_id)),
            fund_request::EMBEDDED_EXPENSES,
        );
        let placeholder = new.placeholder(RecordId::Local(TempId::new()), Utc::now());
        let request = self.api.create(expense::SCOPE, new);
        Ok(self.engine.create(&views, placeholder, request).await?)
    }

    pub async fn update_expense_transaction(
        &self,
        id: i64,
        fund_request_id: i64,
        patch: &ExpenseTransactionPatch,
    ) -> Result<ExpenseTransaction> {
        let rid = RecordId::Confirmed(id);
        let views = ViewSet::scoped(expense::SCOPE).with_detail(rid).with_aggregate(
            CacheKey::detail(fund_request::SCOPE, RecordId::Confirmed(fund_request_id)),
            fund_request::EMBEDDED_EXPENSES,
        );
        let now = Utc::now();
        let request = self.api.update(expense::SCOPE, id, patch);
        Ok(self
            .engine
            .update(
                &views,
                rid,
                |row: &mut ExpenseTransaction| patch.apply(row, now),
                request,
            )
            .await?)
    }

    pub async fn delete_expense_transaction(&self, id: i64, fund_request_id: i64) -> Result<()> {
        let rid = RecordId::Confirmed(id);
        let views = ViewSet::scoped(expense::SCOPE).with_detail(rid).with_aggregate(
            CacheKey::detail(fund_request::SCOPE, RecordId::Confirmed(fund_request_id)),
            fund_request::EMBEDDED_EXPENSES,
        );
        let request = self.api.delete(expense::SCOPE, id);
        Ok(self
            .engine
            .delete::<ExpenseTransaction, _, _>(&views, rid, request)
            .await?)
    }

    // ------------------------------------------------------------------
    // Fund requests
    // ------------------------------------------------------------------

    pub async fn create_fund_request(&self, new: &NewFundRequest) -> Result<FundRequest> {
        let views = ViewSet::scoped(fund_request::SCOPE);
        let placeholder = new.placeholder(RecordId::Local(TempId::new()), Utc::now());
        let request = self.api.create(fund_request::SCOPE, new);
        Ok(self.engine.create(&views, placeholder, request).await?)
    }

    pub async fn update_fund_request(
        &self,
        id: i64,
        patch: &FundRequestPatch,
    ) -> Result<FundRequest> {
        let rid = RecordId::Confirmed(id);
        let views = ViewSet::scoped(fund_request::SCOPE).with_detail(rid);
        let now = Utc::now();
        let request = self.api.update(fund_request::SCOPE, id, patch);
        Ok(self
            .engine
            .update(&views, rid, |row: &mut FundRequest| patch.apply(row, now), request)
            .await?)
    }

    pub async fn delete_fund_request(&self, id: i64) -> Result<()> {
        let rid = RecordId::Confirmed(id);
        let views = ViewSet::scoped(fund_request::SCOPE).with_detail(rid);
        let request = self.api.delete(fund_request::SCOPE, id);
        self.engine
            .delete::<FundRequest, _, _>(&views, rid, request)
            .await?;
        // Expenses charged against the request are gone server-side
        // (cascade); make every cached expense view refetch.
        self.store().invalidate_scope(expense::SCOPE);
        Ok(())
    }

    // ------------------------------------------------------------------
    // IGPs
    // ------------------------------------------------------------------

    pub async fn create_igp(&self, new: &NewIgp) -> Result<Igp> {
        let views = ViewSet::scoped(igp::SCOPE);
        let placeholder = new.placeholder(RecordId::Local(TempId::new()), Utc::now());
        let request = self.api.create(igp::SCOPE, new);
        Ok(self.engine.create(&views, placeholder, request).await?)
    }

    pub async fn update_igp(&self, id: i64, patch: &IgpPatch) -> Result<Igp> {
        let rid = RecordId::Confirmed(id);
        let views = ViewSet::scoped(igp::SCOPE).with_detail(rid);
        let now = Utc::now();
        let request = self.api.update(igp::SCOPE, id, patch);
        Ok(self
            .engine
            .update(&views, rid, |row: &mut Igp| patch.apply(row, now), request)
            .await?)
    }

    pub async fn delete_igp(&self, id: i64) -> Result<()> {
        let rid = RecordId::Confirmed(id);
        let views = ViewSet::scoped(igp::SCOPE).with_detail(rid);
        let request = self.api.delete(igp::SCOPE, id);
        Ok(self.engine.delete::<Igp, _, _>(&views, rid, request).await?)
    }

    // ------------------------------------------------------------------
    // Locker rentals
    // ------------------------------------------------------------------

    pub async fn create_locker_rental(&self, new: &NewLockerRental) -> Result<LockerRental> {
        let views = ViewSet::scoped(locker::SCOPE);
        let placeholder = new.placeholder(RecordId::Local(TempId::new()), Utc::now());
        let request = self.api.create(locker::SCOPE, new);
        Ok(self.engine.create(&views, placeholder, request).await?)
    }

    pub async fn update_locker_rental(
        &self,
        id: i64,
        patch: &LockerRentalPatch,
    ) -> Result<LockerRental> {
        let rid = RecordId::Confirmed(id);
        let views = ViewSet::scoped(locker::SCOPE).with_detail(rid);
        let now = Utc::now();
        let request = self.api.update(locker::SCOPE, id, patch);
        Ok(self
            .engine
            .update(&views, rid, |row: &mut LockerRental| patch.apply(row, now), request)
            .await?)
    }

    pub async fn delete_locker_rental(&self, id: i64) -> Result<()> {
        let rid = RecordId::Confirmed(id);
        let views = ViewSet::scoped(locker::SCOPE).with_detail(rid);
        let request = self.api.delete(locker::SCOPE, id);
        Ok(self
            .engine
            .delete::<LockerRental, _, _>(&views, rid, request)
            .await?)
    }

    // ------------------------------------------------------------------
    // Water funds
    // ------------------------------------------------------------------

    pub async fn create_water_fund(&self, new: &NewWaterFund) -> Result<WaterFund> {
        let views = ViewSet::scoped(water_fund::SCOPE);
        let placeholder = new.placeholder(RecordId::Local(TempId::new()), Utc::now());
        let request = self.api.create(water_fund::SCOPE, new);
        Ok(self.engine.create(&views, placeholder, request).await?)
    }

    pub async fn update_water_fund(&self, id: i64, patch: &WaterFundPatch) -> Result<WaterFund> {
        let rid = RecordId::Confirmed(id);
        let views = ViewSet::scoped(water_fund::SCOPE).with_detail(rid);
        let now = Utc::now();
        let request = self.api.update(water_fund::SCOPE, id, patch);
        Ok(self
            .engine
            .update(&views, rid, |row: &mut WaterFund| patch.apply(row, now), request)
            .await?)
    }

    pub async fn delete_water_fund(&self, id: i64) -> Result<()> {
        let rid = RecordId::Confirmed(id);
        let views = ViewSet::scoped(water_fund::SCOPE).with_detail(rid);
        let request = self.api.delete(water_fund::SCOPE, id);
        Ok(self
            .engine
            .delete::<WaterFund, _, _>(&views, rid, request)
            .await?)
    }

    // ------------------------------------------------------------------
    // Violations
    // ------------------------------------------------------------------

    pub async fn create_violation(&self, new: &NewViolation) -> Result<Violation> {
        let views = ViewSet::scoped(violation::SCOPE);
        let placeholder = new.placeholder(RecordId::Local(TempId::new()), Utc::now());
        let request = self.api.create(violation::SCOPE, new);
        Ok(self.engine.create(&views, placeholder, request).await?)
    }

    pub async fn update_violation(&self, id: i64, patch: &ViolationPatch) -> Result<Violation> {
        let rid = RecordId::Confirmed(id);
        let views = ViewSet::scoped(violation::SCOPE).with_detail(rid);
        let now = Utc::now();
        let request = self.api.update(violation::SCOPE, id, patch);
        Ok(self
            .engine
            .update(&views, rid, |row: &mut Violation| patch.apply(row, now), request)
            .await?)
    }

    pub async fn delete_violation(&self, id: i64) -> Result<()> {
        let rid = RecordId::Confirmed(id);
        let views = ViewSet::scoped(violation::SCOPE).with_detail(rid);
        let request = self.api.delete(violation::SCOPE, id);
        Ok(self
            .engine
            .delete::<Violation, _, _>(&views, rid, request)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use chrono::{TimeZone, Utc};
    use quorum_core::{PageMeta, Record};
    use quorum_model::violation::ViolationStatus;

    use crate::client::Transport;
    use crate::error::Error;

    /// Transport double: scripted responses, recorded calls.
    struct MockTransport {
        responses: Mutex<VecDeque<crate::Result<Value>>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl MockTransport {
        fn scripted(responses: Vec<crate::Result<Value>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn next(&self, verb: &str, path: &str) -> crate::Result<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((verb.to_string(), path.to_string()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::status(500, "unscripted call")))
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn get(&self, path: &str, _query: Option<&Value>) -> crate::Result<Value> {
            self.next("GET", path)
        }

        async fn post(&self, path: &str, _body: Value) -> crate::Result<Value> {
            self.next("POST", path)
        }

        async fn patch(&self, path: &str, _body: Value) -> crate::Result<Value> {
            self.next("PATCH", path)
        }

        async fn delete(&self, path: &str) -> crate::Result<()> {
            self.next("DELETE", path).map(|_| ())
        }
    }

    fn violation_row(id: i64) -> Violation {
        Violation {
            id: RecordId::Confirmed(id),
            student_name: "Reyes".to_string(),
            offense: "Lost locker key".to_string(),
            fine_amount: 50.0,
            status: ViolationStatus::Unpaid,
            created_at: Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap(),
        }
    }

    fn seeded_violations() -> (CacheStore, CacheKey) {
        let store = CacheStore::new();
        let key = CacheKey::list(violation::SCOPE, &json!({ "page": 1, "limit": 10 })).unwrap();
        store
            .set(
                &key,
                &Page {
                    data: vec![violation_row(1), violation_row(2)],
                    meta: PageMeta::new(1, 10, 2),
                },
            )
            .unwrap();
        (store, key)
    }

    #[tokio::test]
    async fn create_violation_hits_create_path_and_reconciles() {
        let (store, key) = seeded_violations();
        let server_row = violation_row(3);
        let transport = MockTransport::scripted(vec![Ok(
            serde_json::to_value(&server_row).unwrap()
        )]);
        let dispatch = Dispatch::new(ApiClient::new(transport.clone()), store.clone());

        let new = NewViolation {
            student_name: "Reyes".to_string(),
            offense: "Lost locker key".to_string(),
            fine_amount: 50.0,
        };
        let created = dispatch.create_violation(&new).await.unwrap();
        assert_eq!(created.id(), RecordId::Confirmed(3));

        let calls = transport.calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            &[("POST".to_string(), "violations/create-violation".to_string())]
        );
        drop(calls);

        let page: Page<Violation> = store.get(&key).unwrap().unwrap();
        assert_eq!(page.data[0], server_row);
        assert_eq!(page.meta.total_items, 3);
        assert!(page.data.iter().all(|r| !r.is_placeholder()));
        assert!(store.is_stale(&key), "settled views must refetch");
    }

    #[tokio::test]
    async fn rejected_create_rolls_back_the_list() {
        let (store, key) = seeded_violations();
        let transport =
            MockTransport::scripted(vec![Err(Error::status(422, "fine must be positive"))]);
        let dispatch = Dispatch::new(ApiClient::new(transport), store.clone());

        let before = store.get_value(&key).unwrap();
        let new = NewViolation {
            student_name: "Reyes".to_string(),
            offense: "Lost locker key".to_string(),
            fine_amount: -1.0,
        };
        let result = dispatch.create_violation(&new).await;

        assert!(matches!(
            result,
            Err(Error::Mutation(quorum_mutate::Error::Rejected { .. }))
        ));
        assert_eq!(store.get_value(&key).unwrap(), before);
    }

    #[tokio::test]
    async fn update_violation_patches_cache_then_takes_server_row() {
        let (store, key) = seeded_violations();
        let mut server_row = violation_row(2);
        server_row.status = ViolationStatus::Paid;
        let transport = MockTransport::scripted(vec![Ok(
            serde_json::to_value(&server_row).unwrap()
        )]);
        let dispatch = Dispatch::new(ApiClient::new(transport.clone()), store.clone());

        let patch = ViolationPatch {
            status: Some(ViolationStatus::Paid),
            ..Default::default()
        };
        let updated = dispatch.update_violation(2, &patch).await.unwrap();
        assert_eq!(updated.status, ViolationStatus::Paid);

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls[0].1, "violations/update-violation/2");
        drop(calls);

        let page: Page<Violation> = store.get(&key).unwrap().unwrap();
        let row = page
            .data
            .iter()
            .find(|r| r.id() == RecordId::Confirmed(2))
            .unwrap();
        assert_eq!(row.status, ViolationStatus::Paid);
    }

    #[tokio::test]
    async fn delete_violation_removes_row_and_detail() {
        let (store, key) = seeded_violations();
        let detail = CacheKey::detail(violation::SCOPE, RecordId::Confirmed(1));
        store.set(&detail, &violation_row(1)).unwrap();

        let transport = MockTransport::scripted(vec![Ok(Value::Null)]);
        let dispatch = Dispatch::new(ApiClient::new(transport.clone()), store.clone());

        dispatch.delete_violation(1).await.unwrap();

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls[0].1, "violations/delete-violation/1");
        drop(calls);

        let page: Page<Violation> = store.get(&key).unwrap().unwrap();
        assert!(page.data.iter().all(|r| r.id() != RecordId::Confirmed(1)));
        assert_eq!(page.meta.total_items, 1);
        assert!(!store.contains(&detail));
    }

    #[tokio::test]
    async fn refresh_list_caches_the_fetched_page() {
        let store = CacheStore::new();
        let page = Page {
            data: vec![violation_row(1)],
            meta: PageMeta::new(1, 10, 1),
        };
        let transport =
            MockTransport::scripted(vec![Ok(serde_json::to_value(&page).unwrap())]);
        let dispatch = Dispatch::new(ApiClient::new(transport), store.clone());

        let filters = json!({ "page": 1, "limit": 10 });
        let fetched: Page<Violation> = dispatch
            .refresh_list(violation::SCOPE, &filters)
            .await
            .unwrap();
        assert_eq!(fetched, page);

        let key = CacheKey::list(violation::SCOPE, &filters).unwrap();
        let cached: Page<Violation> = store.get(&key).unwrap().unwrap();
        assert_eq!(cached, page);
        assert!(!store.is_stale(&key));
    }
}
