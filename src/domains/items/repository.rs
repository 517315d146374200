use chrono::{DateTime, Utc};

use super::{Comment, Item, ItemPatch, NewItem};
use crate::pagination::{Page, paged};
use crate::store::{CommentRecord, InMemoryStore};

/// Defines the ItemsRepository trait for item storage operations.
#[async_trait::async_trait]
pub trait ItemsRepository: Send + Sync + 'static {
    /// Creates a new [Item] owned by `owner_id`.
    async fn create(&self, owner_id: i64, new_item: NewItem) -> Result<Item, anyhow::Error>;

    /// Retrieves an [Item] by id, `None` if absent.
    async fn find_by_id(&self, item_id: i64) -> Result<Option<Item>, anyhow::Error>;

    /// Applies a partial update, `None` if the item does not exist.
    /// Ownership is checked by the caller.
    async fn update(&self, item_id: i64, patch: ItemPatch) -> Result<Option<Item>, anyhow::Error>;

    /// Retrieves the items owned by `owner_id`, ordered by id.
    async fn find_by_owner(
        &self,
        owner_id: i64,
        page: Option<Page>,
    ) -> Result<Vec<Item>, anyhow::Error>;

    /// Case-insensitive substring search over name and description,
    /// restricted to available items.
    async fn search(&self, text: &str, page: Option<Page>) -> Result<Vec<Item>, anyhow::Error>;

    /// Retrieves the item fulfilling the given request, if any.
    async fn find_by_request_id(&self, request_id: i64) -> Result<Option<Item>, anyhow::Error>;
}

/// Defines the CommentsRepository trait for item comment storage.
#[async_trait::async_trait]
pub trait CommentsRepository: Send + Sync + 'static {
    /// Persists a comment on an item. Eligibility is checked by the caller.
    async fn create(
        &self,
        item_id: i64,
        author_id: i64,
        author_name: String,
        text: String,
        created: DateTime<Utc>,
    ) -> Result<Comment, anyhow::Error>;

    /// Retrieves the comments on an item, oldest first.
    async fn find_by_item(&self, item_id: i64) -> Result<Vec<Comment>, anyhow::Error>;
}

#[derive(Clone)]
pub struct InMemoryItemsRepository {
    store: InMemoryStore,
}

impl InMemoryItemsRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl ItemsRepository for InMemoryItemsRepository {
    async fn create(&self, owner_id: i64, new_item: NewItem) -> Result<Item, anyhow::Error> {
        let mut store = self.store.write()?;
        let item = Item {
            id: store.next_item_id(),
            name: new_item.name,
            description: new_item.description,
            available: new_item.available,
            owner_id,
            request_id: new_item.request_id,
        };
        store.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn find_by_id(&self, item_id: i64) -> Result<Option<Item>, anyhow::Error> {
        let store = self.store.read()?;
        Ok(store.items.get(&item_id).cloned())
    }

    async fn update(&self, item_id: i64, patch: ItemPatch) -> Result<Option<Item>, anyhow::Error> {
        let mut store = self.store.write()?;
        let Some(item) = store.items.get_mut(&item_id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            item.name = name;
        }
        if let Some(description) = patch.description {
            item.description = description;
        }
        if let Some(available) = patch.available {
            item.available = available;
        }
        Ok(Some(item.clone()))
    }

    async fn find_by_owner(
        &self,
        owner_id: i64,
        page: Option<Page>,
    ) -> Result<Vec<Item>, anyhow::Error> {
        let store = self.store.read()?;
        let items: Vec<Item> = store
            .items
            .values()
            .filter(|item| item.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(paged(items, page))
    }

    async fn search(&self, text: &str, page: Option<Page>) -> Result<Vec<Item>, anyhow::Error> {
        let store = self.store.read()?;
        let needle = text.to_lowercase();
        let items: Vec<Item> = store
            .items
            .values()
            .filter(|item| item.available)
            .filter(|item| {
                item.name.to_lowercase().contains(&needle)
                    || item.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        Ok(paged(items, page))
    }

    async fn find_by_request_id(&self, request_id: i64) -> Result<Option<Item>, anyhow::Error> {
        let store = self.store.read()?;
        Ok(store
            .items
            .values()
            .find(|item| item.request_id == Some(request_id))
            .cloned())
    }
}

#[derive(Clone)]
pub struct InMemoryCommentsRepository {
    store: InMemoryStore,
}

impl InMemoryCommentsRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl CommentsRepository for InMemoryCommentsRepository {
    async fn create(
        &self,
        item_id: i64,
        author_id: i64,
        author_name: String,
        text: String,
        created: DateTime<Utc>,
    ) -> Result<Comment, anyhow::Error> {
        let mut store = self.store.write()?;
        let record = CommentRecord {
            id: store.next_comment_id(),
            item_id,
            author_id,
            author_name,
            text,
            created,
        };
        store.comments.insert(record.id, record.clone());
        Ok(Comment {
            id: record.id,
            text: record.text,
            author_name: record.author_name,
            created: record.created,
        })
    }

    async fn find_by_item(&self, item_id: i64) -> Result<Vec<Comment>, anyhow::Error> {
        let store = self.store.read()?;
        let comments = store
            .comments
            .values()
            .filter(|comment| comment.item_id == item_id)
            .map(|comment| Comment {
                id: comment.id,
                text: comment.text.clone(),
                author_name: comment.author_name.clone(),
                created: comment.created,
            })
            .collect();
        Ok(comments)
    }
}
