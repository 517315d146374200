use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domains::items::Item;
use crate::domains::users::User;

pub mod repository;
pub mod service;

// ##################################################
// ############### BOOKING DEFINITION ###############
// ##################################################

/// Approval status of a booking. A booking is born WAITING and leaves that
/// status at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
}

/// Booking view with resolved item and booker snapshots.
#[derive(Debug, Clone)]
pub struct Booking {
    pub id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
    pub item: Item,
    pub booker: User,
}

/// Short booking reference attached to item views.
#[derive(Debug, Clone, Copy)]
pub struct BookingRef {
    pub id: i64,
    pub booker_id: i64,
}

/// Booking creation input; the dates stay optional until the engine
/// validates them.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub item_id: i64,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

// ###############################################
// ############### LISTING STATE #################
// ###############################################

/// Classification token for booking listings. CURRENT/PAST/FUTURE classify
/// by time regardless of status; WAITING/REJECTED classify by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

/// Unrecognized state token, carried verbatim for the boundary layer.
#[derive(Debug, Error)]
#[error("Unknown state: {0}")]
pub struct UnsupportedStateError(pub String);

impl FromStr for BookingState {
    type Err = UnsupportedStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" => Ok(Self::All),
            "CURRENT" => Ok(Self::Current),
            "PAST" => Ok(Self::Past),
            "FUTURE" => Ok(Self::Future),
            "WAITING" => Ok(Self::Waiting),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(UnsupportedStateError(other.to_string())),
        }
    }
}

// ###############################################
// ############### BOOKING CREATION ##############
// ###############################################

#[derive(Debug, Error)]
pub enum AddBookingError {
    #[error("item not found")]
    ItemNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("the item owner cannot book their own item")]
    OwnerCannotBook,
    #[error("the item is not available for booking")]
    ItemUnavailable,
    #[error("both start and end dates must be provided")]
    MissingDates,
    #[error("the start date must be in the future")]
    StartInPast,
    #[error("the end date must be after the start date")]
    EndNotAfterStart,
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

// ###############################################
// ############### STATUS CHANGE #################
// ###############################################

#[derive(Debug, Error)]
pub enum ChangeStatusError {
    #[error("booking not found")]
    NotFound,
    /// Masked as not-found at the boundary so non-owners cannot probe for
    /// booking existence.
    #[error("booking not found")]
    NotOwner,
    #[error("the booking has already been approved")]
    AlreadyApproved,
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

// ###############################################
// ############### BOOKING RETRIEVAL #############
// ###############################################

#[derive(Debug, Error)]
pub enum GetBookingError {
    #[error("user not found")]
    UserNotFound,
    #[error("booking not found")]
    NotFound,
    /// The requester is neither the booker nor the item owner; masked as
    /// not-found at the boundary.
    #[error("booking not found")]
    AccessDenied,
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

// ###############################################
// ############### BOOKING LISTING ###############
// ###############################################

#[derive(Debug, Error)]
pub enum ListBookingsError {
    #[error("user not found")]
    UserNotFound,
    #[error(transparent)]
    UnsupportedState(#[from] UnsupportedStateError),
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}
