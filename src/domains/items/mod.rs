use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domains::bookings::BookingRef;

pub mod repository;
pub mod service;

// ###############################################
// ############### ITEM DEFINITION ###############
// ###############################################

#[derive(Debug, Clone)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    /// Id of the item request this item fulfills, if any.
    pub request_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
}

/// Partial update of an item; only present fields overwrite.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

/// Item view enriched with booking references and comments.
///
/// `last_booking`/`next_booking` are only populated when the view is built
/// for the item owner.
#[derive(Debug, Clone)]
pub struct ItemDetails {
    pub item: Item,
    pub last_booking: Option<BookingRef>,
    pub next_booking: Option<BookingRef>,
    pub comments: Vec<Comment>,
}

// ##################################################
// ############### COMMENT DEFINITION ###############
// ##################################################

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub author_name: String,
    pub created: DateTime<Utc>,
}

// ###############################################
// ############### ITEM CREATION #################
// ###############################################

#[derive(Debug, Error)]
pub enum AddItemError {
    #[error("user not found")]
    UserNotFound,
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

// ###############################################
// ############### ITEM UPDATE ###################
// ###############################################

#[derive(Debug, Error)]
pub enum EditItemError {
    #[error("user not found")]
    UserNotFound,
    #[error("item not found")]
    ItemNotFound,
    /// Masked as not-found at the boundary so non-owners cannot probe for
    /// item existence.
    #[error("item not found")]
    NotOwner,
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

// ###############################################
// ############### ITEM RETRIEVAL ################
// ###############################################

#[derive(Debug, Error)]
pub enum FindItemError {
    #[error("user not found")]
    UserNotFound,
    #[error("item not found")]
    ItemNotFound,
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

// ###############################################
// ############### COMMENT CREATION ##############
// ###############################################

#[derive(Debug, Error)]
pub enum AddCommentError {
    #[error("comment text cannot be empty")]
    EmptyText,
    #[error("user not found")]
    UserNotFound,
    #[error("item not found")]
    ItemNotFound,
    /// The author has no approved booking on the item that has started.
    #[error("the user has not rented this item and cannot comment on it")]
    NotEntitled,
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}
