use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domains::items::Item;
use crate::domains::users::User;

pub mod repository;
pub mod service;

// ##################################################
// ############### REQUEST DEFINITION ###############
// ##################################################

/// A wish posted by a user for an item nobody has listed yet.
#[derive(Debug, Clone)]
pub struct ItemRequest {
    pub id: i64,
    pub description: String,
    pub requestor: User,
    pub created: DateTime<Utc>,
}

/// Request view enriched with the items listed in answer to it.
#[derive(Debug, Clone)]
pub struct ItemRequestDetails {
    pub request: ItemRequest,
    pub items: Vec<Item>,
}

// ###############################################
// ############### REQUEST CREATION ##############
// ###############################################

#[derive(Debug, Error)]
pub enum AddRequestError {
    #[error("user not found")]
    UserNotFound,
    #[error("the request description cannot be empty")]
    EmptyDescription,
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

// ###############################################
// ############### REQUEST RETRIEVAL #############
// ###############################################

#[derive(Debug, Error)]
pub enum GetRequestError {
    #[error("user not found")]
    UserNotFound,
    #[error("item request not found")]
    NotFound,
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

// ###############################################
// ############### REQUEST LISTING ###############
// ###############################################

#[derive(Debug, Error)]
pub enum ListRequestsError {
    #[error("user not found")]
    UserNotFound,
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}
