use chrono::Utc;

use super::repository::RequestsRepository;
use super::{
    AddRequestError, GetRequestError, ItemRequest, ItemRequestDetails, ListRequestsError,
};
use crate::domains::items::repository::ItemsRepository;
use crate::domains::users::repository::UsersRepository;
use crate::pagination::Page;

/// Service trait for item requests: posting a wish and browsing requests
/// together with the items listed in answer to them.
#[async_trait::async_trait]
pub trait RequestsService: Send + Sync + 'static {
    /// Posts a new request for the given user, stamped with the current time.
    async fn add_request(
        &self,
        user_id: i64,
        description: String,
    ) -> Result<ItemRequest, AddRequestError>;

    /// Lists the requester's own requests, newest first, with their items.
    async fn get_own_requests(
        &self,
        user_id: i64,
    ) -> Result<Vec<ItemRequestDetails>, ListRequestsError>;

    /// Lists other users' requests, newest first. Without a page the listing
    /// is empty rather than unbounded.
    async fn get_all_requests(
        &self,
        user_id: i64,
        page: Option<Page>,
    ) -> Result<Vec<ItemRequestDetails>, ListRequestsError>;

    /// Retrieves one request with its items; any existing user may look.
    async fn get_request(
        &self,
        user_id: i64,
        request_id: i64,
    ) -> Result<ItemRequestDetails, GetRequestError>;
}

pub struct DefaultRequestsService<RR, IR, UR> {
    requests_repository: RR,
    items_repository: IR,
    users_repository: UR,
}

impl<RR, IR, UR> DefaultRequestsService<RR, IR, UR>
where
    RR: RequestsRepository,
    IR: ItemsRepository,
    UR: UsersRepository,
{
    pub fn new(requests_repository: RR, items_repository: IR, users_repository: UR) -> Self {
        Self {
            requests_repository,
            items_repository,
            users_repository,
        }
    }

    async fn details_for(&self, request: ItemRequest) -> Result<ItemRequestDetails, anyhow::Error> {
        let items = self
            .items_repository
            .find_by_request_id(request.id)
            .await?
            .into_iter()
            .collect();
        Ok(ItemRequestDetails { request, items })
    }
}

#[async_trait::async_trait]
impl<RR, IR, UR> RequestsService for DefaultRequestsService<RR, IR, UR>
where
    RR: RequestsRepository,
    IR: ItemsRepository,
    UR: UsersRepository,
{
    async fn add_request(
        &self,
        user_id: i64,
        description: String,
    ) -> Result<ItemRequest, AddRequestError> {
        self.users_repository
            .find_by_id(user_id)
            .await?
            .ok_or(AddRequestError::UserNotFound)?;
        if description.trim().is_empty() {
            return Err(AddRequestError::EmptyDescription);
        }
        Ok(self
            .requests_repository
            .create(user_id, description, Utc::now())
            .await?)
    }

    async fn get_own_requests(
        &self,
        user_id: i64,
    ) -> Result<Vec<ItemRequestDetails>, ListRequestsError> {
        self.users_repository
            .find_by_id(user_id)
            .await?
            .ok_or(ListRequestsError::UserNotFound)?;
        let requests = self.requests_repository.find_by_requestor(user_id).await?;
        let mut details = Vec::with_capacity(requests.len());
        for request in requests {
            details.push(self.details_for(request).await?);
        }
        Ok(details)
    }

    async fn get_all_requests(
        &self,
        user_id: i64,
        page: Option<Page>,
    ) -> Result<Vec<ItemRequestDetails>, ListRequestsError> {
        self.users_repository
            .find_by_id(user_id)
            .await?
            .ok_or(ListRequestsError::UserNotFound)?;
        let Some(page) = page else {
            return Ok(Vec::new());
        };
        let requests = self.requests_repository.find_all(page).await?;
        let mut details = Vec::new();
        for request in requests {
            if request.requestor.id == user_id {
                continue;
            }
            details.push(self.details_for(request).await?);
        }
        Ok(details)
    }

    async fn get_request(
        &self,
        user_id: i64,
        request_id: i64,
    ) -> Result<ItemRequestDetails, GetRequestError> {
        self.users_repository
            .find_by_id(user_id)
            .await?
            .ok_or(GetRequestError::UserNotFound)?;
        let request = self
            .requests_repository
            .find_by_id(request_id)
            .await?
            .ok_or(GetRequestError::NotFound)?;
        Ok(self.details_for(request).await?)
    }
}
