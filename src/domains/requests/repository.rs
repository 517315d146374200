use anyhow::anyhow;
use chrono::{DateTime, Utc};

use super::ItemRequest;
use crate::pagination::{Page, paged};
use crate::store::{InMemoryStore, RequestRecord, StoreInner};

/// Defines the RequestsRepository trait for item request storage.
#[async_trait::async_trait]
pub trait RequestsRepository: Send + Sync + 'static {
    /// Persists a new request for `requestor_id`.
    async fn create(
        &self,
        requestor_id: i64,
        description: String,
        created: DateTime<Utc>,
    ) -> Result<ItemRequest, anyhow::Error>;

    /// Retrieves an [ItemRequest] by id, `None` if absent.
    async fn find_by_id(&self, request_id: i64) -> Result<Option<ItemRequest>, anyhow::Error>;

    /// Retrieves the requests posted by `requestor_id`, newest first.
    async fn find_by_requestor(&self, requestor_id: i64)
    -> Result<Vec<ItemRequest>, anyhow::Error>;

    /// Retrieves every request, newest first, paged.
    async fn find_all(&self, page: Page) -> Result<Vec<ItemRequest>, anyhow::Error>;
}

#[derive(Clone)]
pub struct InMemoryRequestsRepository {
    store: InMemoryStore,
}

impl InMemoryRequestsRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

fn hydrate(store: &StoreInner, record: &RequestRecord) -> Result<ItemRequest, anyhow::Error> {
    let requestor = store
        .users
        .get(&record.requestor_id)
        .cloned()
        .ok_or_else(|| anyhow!("request {} references a missing requestor", record.id))?;
    Ok(ItemRequest {
        id: record.id,
        description: record.description.clone(),
        requestor,
        created: record.created,
    })
}

fn collect_newest_first(
    store: &StoreInner,
    select: impl Fn(&RequestRecord) -> bool,
) -> Result<Vec<ItemRequest>, anyhow::Error> {
    let mut records: Vec<&RequestRecord> = store.requests.values().filter(|r| select(r)).collect();
    records.sort_by_key(|r| std::cmp::Reverse(r.created));
    records.into_iter().map(|r| hydrate(store, r)).collect()
}

#[async_trait::async_trait]
impl RequestsRepository for InMemoryRequestsRepository {
    async fn create(
        &self,
        requestor_id: i64,
        description: String,
        created: DateTime<Utc>,
    ) -> Result<ItemRequest, anyhow::Error> {
        let mut store = self.store.write()?;
        let record = RequestRecord {
            id: store.next_request_id(),
            requestor_id,
            description,
            created,
        };
        let request = hydrate(&store, &record)?;
        store.requests.insert(record.id, record);
        Ok(request)
    }

    async fn find_by_id(&self, request_id: i64) -> Result<Option<ItemRequest>, anyhow::Error> {
        let store = self.store.read()?;
        match store.requests.get(&request_id) {
            Some(record) => Ok(Some(hydrate(&store, record)?)),
            None => Ok(None),
        }
    }

    async fn find_by_requestor(
        &self,
        requestor_id: i64,
    ) -> Result<Vec<ItemRequest>, anyhow::Error> {
        let store = self.store.read()?;
        collect_newest_first(&store, |r| r.requestor_id == requestor_id)
    }

    async fn find_all(&self, page: Page) -> Result<Vec<ItemRequest>, anyhow::Error> {
        let store = self.store.read()?;
        let requests = collect_newest_first(&store, |_| true)?;
        Ok(paged(requests, Some(page)))
    }
}
