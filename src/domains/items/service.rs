use chrono::Utc;

use super::repository::{CommentsRepository, ItemsRepository};
use super::{
    AddCommentError, AddItemError, Comment, EditItemError, FindItemError, Item, ItemDetails,
    ItemPatch, NewItem,
};
use crate::domains::bookings::repository::BookingsRepository;
use crate::domains::users::repository::UsersRepository;
use crate::pagination::Page;

/// Service trait for managing items and their comments.
#[async_trait::async_trait]
pub trait ItemsService: Send + Sync + 'static {
    /// Lists a new item for the given owner.
    ///
    /// # Errors
    /// * [AddItemError::UserNotFound] - If the owner does not exist.
    async fn add_item(&self, user_id: i64, new_item: NewItem) -> Result<Item, AddItemError>;

    /// Partially updates an item; only its owner may do so.
    async fn edit_item(
        &self,
        user_id: i64,
        item_id: i64,
        patch: ItemPatch,
    ) -> Result<Item, EditItemError>;

    /// Retrieves an item with its comments. Booking references are attached
    /// only when the requester owns the item.
    async fn get_item(&self, user_id: i64, item_id: i64) -> Result<ItemDetails, FindItemError>;

    /// Retrieves the requester's own items with booking references and
    /// comments.
    async fn get_items_by_owner(
        &self,
        user_id: i64,
        page: Option<Page>,
    ) -> Result<Vec<ItemDetails>, FindItemError>;

    /// Searches available items by text; a blank text yields nothing.
    async fn search_items(
        &self,
        text: &str,
        page: Option<Page>,
    ) -> Result<Vec<Item>, anyhow::Error>;

    /// Posts a comment on an item. The author must have an approved booking
    /// on the item whose start time has already passed.
    async fn add_comment(
        &self,
        user_id: i64,
        item_id: i64,
        text: String,
    ) -> Result<Comment, AddCommentError>;
}

pub struct DefaultItemsService<IR, CR, UR, BR> {
    items_repository: IR,
    comments_repository: CR,
    users_repository: UR,
    bookings_repository: BR,
}

impl<IR, CR, UR, BR> DefaultItemsService<IR, CR, UR, BR>
where
    IR: ItemsRepository,
    CR: CommentsRepository,
    UR: UsersRepository,
    BR: BookingsRepository,
{
    pub fn new(
        items_repository: IR,
        comments_repository: CR,
        users_repository: UR,
        bookings_repository: BR,
    ) -> Self {
        Self {
            items_repository,
            comments_repository,
            users_repository,
            bookings_repository,
        }
    }

    /// A user may comment on an item iff they have an APPROVED booking on it
    /// whose start time has already passed.
    async fn can_comment(&self, user_id: i64, item_id: i64) -> Result<bool, anyhow::Error> {
        use crate::domains::bookings::BookingStatus;

        let now = Utc::now();
        let bookings = self.bookings_repository.find_by_booker(user_id, None).await?;
        Ok(bookings.iter().any(|booking| {
            booking.item.id == item_id
                && booking.status == BookingStatus::Approved
                && booking.start < now
        }))
    }

    async fn details_for(
        &self,
        requester_id: i64,
        item: Item,
    ) -> Result<ItemDetails, anyhow::Error> {
        let now = Utc::now();
        let (last_booking, next_booking) = if requester_id == item.owner_id {
            (
                self.bookings_repository
                    .find_last_for_item(item.id, now)
                    .await?,
                self.bookings_repository
                    .find_next_for_item(item.id, now)
                    .await?,
            )
        } else {
            (None, None)
        };
        let comments = self.comments_repository.find_by_item(item.id).await?;
        Ok(ItemDetails {
            item,
            last_booking,
            next_booking,
            comments,
        })
    }
}

#[async_trait::async_trait]
impl<IR, CR, UR, BR> ItemsService for DefaultItemsService<IR, CR, UR, BR>
where
    IR: ItemsRepository,
    CR: CommentsRepository,
    UR: UsersRepository,
    BR: BookingsRepository,
{
    async fn add_item(&self, user_id: i64, new_item: NewItem) -> Result<Item, AddItemError> {
        self.users_repository
            .find_by_id(user_id)
            .await?
            .ok_or(AddItemError::UserNotFound)?;
        Ok(self.items_repository.create(user_id, new_item).await?)
    }

    async fn edit_item(
        &self,
        user_id: i64,
        item_id: i64,
        patch: ItemPatch,
    ) -> Result<Item, EditItemError> {
        self.users_repository
            .find_by_id(user_id)
            .await?
            .ok_or(EditItemError::UserNotFound)?;
        let item = self
            .items_repository
            .find_by_id(item_id)
            .await?
            .ok_or(EditItemError::ItemNotFound)?;
        if item.owner_id != user_id {
            return Err(EditItemError::NotOwner);
        }
        self.items_repository
            .update(item_id, patch)
            .await?
            .ok_or(EditItemError::ItemNotFound)
    }

    async fn get_item(&self, user_id: i64, item_id: i64) -> Result<ItemDetails, FindItemError> {
        self.users_repository
            .find_by_id(user_id)
            .await?
            .ok_or(FindItemError::UserNotFound)?;
        let item = self
            .items_repository
            .find_by_id(item_id)
            .await?
            .ok_or(FindItemError::ItemNotFound)?;
        Ok(self.details_for(user_id, item).await?)
    }

    async fn get_items_by_owner(
        &self,
        user_id: i64,
        page: Option<Page>,
    ) -> Result<Vec<ItemDetails>, FindItemError> {
        self.users_repository
            .find_by_id(user_id)
            .await?
            .ok_or(FindItemError::UserNotFound)?;
        let items = self.items_repository.find_by_owner(user_id, page).await?;
        let mut details = Vec::with_capacity(items.len());
        for item in items {
            details.push(self.details_for(user_id, item).await?);
        }
        Ok(details)
    }

    async fn search_items(
        &self,
        text: &str,
        page: Option<Page>,
    ) -> Result<Vec<Item>, anyhow::Error> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.items_repository.search(text, page).await
    }

    async fn add_comment(
        &self,
        user_id: i64,
        item_id: i64,
        text: String,
    ) -> Result<Comment, AddCommentError> {
        if text.trim().is_empty() {
            return Err(AddCommentError::EmptyText);
        }
        let author = self
            .users_repository
            .find_by_id(user_id)
            .await?
            .ok_or(AddCommentError::UserNotFound)?;
        self.items_repository
            .find_by_id(item_id)
            .await?
            .ok_or(AddCommentError::ItemNotFound)?;
        if !self.can_comment(user_id, item_id).await? {
            return Err(AddCommentError::NotEntitled);
        }
        Ok(self
            .comments_repository
            .create(item_id, author.id, author.name, text, Utc::now())
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::domains::bookings::BookingStatus;
    use crate::domains::bookings::repository::{BookingsRepository, InMemoryBookingsRepository};
    use crate::domains::items::repository::{InMemoryCommentsRepository, InMemoryItemsRepository};
    use crate::domains::users::repository::{InMemoryUsersRepository, UsersRepository};
    use crate::newtypes::Email;
    use crate::store::InMemoryStore;

    struct Fixture {
        service: DefaultItemsService<
            InMemoryItemsRepository,
            InMemoryCommentsRepository,
            InMemoryUsersRepository,
            InMemoryBookingsRepository,
        >,
        bookings: InMemoryBookingsRepository,
        users: InMemoryUsersRepository,
        owner_id: i64,
        renter_id: i64,
        item_id: i64,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let users = InMemoryUsersRepository::new(store.clone());
        let items = InMemoryItemsRepository::new(store.clone());
        let comments = InMemoryCommentsRepository::new(store.clone());
        let bookings = InMemoryBookingsRepository::new(store.clone());

        let owner = users
            .create(
                "Owner".to_string(),
                Email::new("owner@example.com").unwrap(),
            )
            .await
            .unwrap();
        let renter = users
            .create(
                "Renter".to_string(),
                Email::new("renter@example.com").unwrap(),
            )
            .await
            .unwrap();
        let item = items
            .create(
                owner.id,
                NewItem {
                    name: "Drill".to_string(),
                    description: "Cordless drill".to_string(),
                    available: true,
                    request_id: None,
                },
            )
            .await
            .unwrap();

        Fixture {
            service: DefaultItemsService::new(
                items,
                comments,
                users.clone(),
                InMemoryBookingsRepository::new(store),
            ),
            bookings,
            users,
            owner_id: owner.id,
            renter_id: renter.id,
            item_id: item.id,
        }
    }

    #[tokio::test]
    async fn test_comment_allowed_after_started_approved_booking() {
        let f = fixture().await;
        let now = Utc::now();
        let booking = f
            .bookings
            .create(
                f.item_id,
                f.renter_id,
                now - Duration::days(2),
                now - Duration::days(1),
            )
            .await
            .unwrap();
        f.bookings
            .update_status(booking.id, BookingStatus::Approved)
            .await
            .unwrap();

        let comment = f
            .service
            .add_comment(f.renter_id, f.item_id, "Great drill".to_string())
            .await
            .unwrap();
        assert_eq!(comment.text, "Great drill");
        assert_eq!(comment.author_name, "Renter");
    }

    #[tokio::test]
    async fn test_comment_author_name_survives_a_rename() {
        let f = fixture().await;
        let now = Utc::now();
        let booking = f
            .bookings
            .create(
                f.item_id,
                f.renter_id,
                now - Duration::days(2),
                now - Duration::days(1),
            )
            .await
            .unwrap();
        f.bookings
            .update_status(booking.id, BookingStatus::Approved)
            .await
            .unwrap();
        f.service
            .add_comment(f.renter_id, f.item_id, "Great drill".to_string())
            .await
            .unwrap();

        f.users
            .update(
                f.renter_id,
                crate::domains::users::UserPatch {
                    name: Some("Renamed".to_string()),
                    email: None,
                },
            )
            .await
            .unwrap();

        let details = f.service.get_item(f.renter_id, f.item_id).await.unwrap();
        assert_eq!(details.comments.len(), 1);
        assert_eq!(details.comments[0].author_name, "Renter");
    }

    #[tokio::test]
    async fn test_comment_rejected_without_any_booking() {
        let f = fixture().await;
        let result = f
            .service
            .add_comment(f.renter_id, f.item_id, "Great drill".to_string())
            .await;
        assert!(matches!(result, Err(AddCommentError::NotEntitled)));
    }

    #[tokio::test]
    async fn test_comment_rejected_when_booking_is_only_waiting() {
        let f = fixture().await;
        let now = Utc::now();
        f.bookings
            .create(
                f.item_id,
                f.renter_id,
                now - Duration::days(2),
                now - Duration::days(1),
            )
            .await
            .unwrap();

        let result = f
            .service
            .add_comment(f.renter_id, f.item_id, "Great drill".to_string())
            .await;
        assert!(matches!(result, Err(AddCommentError::NotEntitled)));
    }

    #[tokio::test]
    async fn test_comment_rejected_when_approved_booking_has_not_started() {
        let f = fixture().await;
        let now = Utc::now();
        let booking = f
            .bookings
            .create(
                f.item_id,
                f.renter_id,
                now + Duration::days(1),
                now + Duration::days(2),
            )
            .await
            .unwrap();
        f.bookings
            .update_status(booking.id, BookingStatus::Approved)
            .await
            .unwrap();

        let result = f
            .service
            .add_comment(f.renter_id, f.item_id, "Great drill".to_string())
            .await;
        assert!(matches!(result, Err(AddCommentError::NotEntitled)));
    }

    #[tokio::test]
    async fn test_blank_comment_text_is_rejected() {
        let f = fixture().await;
        let result = f
            .service
            .add_comment(f.renter_id, f.item_id, "   ".to_string())
            .await;
        assert!(matches!(result, Err(AddCommentError::EmptyText)));
    }

    #[tokio::test]
    async fn test_booking_refs_are_attached_for_the_owner_only() {
        let f = fixture().await;
        let now = Utc::now();
        let past = f
            .bookings
            .create(
                f.item_id,
                f.renter_id,
                now - Duration::days(2),
                now - Duration::days(1),
            )
            .await
            .unwrap();
        let future = f
            .bookings
            .create(
                f.item_id,
                f.renter_id,
                now + Duration::days(1),
                now + Duration::days(2),
            )
            .await
            .unwrap();
        f.bookings
            .update_status(past.id, BookingStatus::Approved)
            .await
            .unwrap();
        f.bookings
            .update_status(future.id, BookingStatus::Approved)
            .await
            .unwrap();

        let owner_view = f.service.get_item(f.owner_id, f.item_id).await.unwrap();
        assert_eq!(owner_view.last_booking.map(|b| b.id), Some(past.id));
        assert_eq!(owner_view.next_booking.map(|b| b.id), Some(future.id));

        let renter_view = f.service.get_item(f.renter_id, f.item_id).await.unwrap();
        assert!(renter_view.last_booking.is_none());
        assert!(renter_view.next_booking.is_none());
    }

    #[tokio::test]
    async fn test_only_the_owner_may_edit_an_item() {
        let f = fixture().await;
        let result = f
            .service
            .edit_item(
                f.renter_id,
                f.item_id,
                ItemPatch {
                    name: Some("Hammer".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(EditItemError::NotOwner)));
    }

    #[tokio::test]
    async fn test_blank_search_text_yields_nothing() {
        let f = fixture().await;
        let found = f.service.search_items("  ", None).await.unwrap();
        assert!(found.is_empty());
    }
}
