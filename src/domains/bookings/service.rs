use chrono::Utc;

use super::repository::{BookingsRepository, UpdateStatusError};
use super::{
    AddBookingError, Booking, BookingState, BookingStatus, ChangeStatusError, GetBookingError,
    ListBookingsError, NewBooking,
};
use crate::domains::items::repository::ItemsRepository;
use crate::domains::users::repository::UsersRepository;
use crate::pagination::Page;

/// Service trait for the booking lifecycle: creation, approval/rejection,
/// ownership-based reads and state-classified listings.
#[async_trait::async_trait]
pub trait BookingsService: Send + Sync + 'static {
    /// Creates a booking in WAITING status after validating the request.
    ///
    /// Preconditions are checked in order, each failing with its own error:
    /// item exists, requester exists, requester is not the owner, item is
    /// available, both dates are present, start is in the future, start is
    /// before end. No overlap check against other bookings is performed.
    async fn add_booking(
        &self,
        user_id: i64,
        new_booking: NewBooking,
    ) -> Result<Booking, AddBookingError>;

    /// Approves or rejects a booking; only the item owner may do so, and a
    /// booking that is already APPROVED can no longer change.
    async fn change_status(
        &self,
        user_id: i64,
        booking_id: i64,
        approved: bool,
    ) -> Result<Booking, ChangeStatusError>;

    /// Retrieves a booking, visible only to its booker and the item owner.
    async fn get_booking(&self, user_id: i64, booking_id: i64)
    -> Result<Booking, GetBookingError>;

    /// Lists the requester's bookings as booker, classified by `state`
    /// (defaults to ALL when absent).
    async fn list_by_booker(
        &self,
        user_id: i64,
        state: Option<String>,
        page: Option<Page>,
    ) -> Result<Vec<Booking>, ListBookingsError>;

    /// Lists the bookings on the requester's items, classified by `state`
    /// (defaults to ALL when absent).
    async fn list_by_owner(
        &self,
        user_id: i64,
        state: Option<String>,
        page: Option<Page>,
    ) -> Result<Vec<Booking>, ListBookingsError>;
}

pub struct DefaultBookingsService<BR, IR, UR> {
    bookings_repository: BR,
    items_repository: IR,
    users_repository: UR,
}

impl<BR, IR, UR> DefaultBookingsService<BR, IR, UR>
where
    BR: BookingsRepository,
    IR: ItemsRepository,
    UR: UsersRepository,
{
    pub fn new(bookings_repository: BR, items_repository: IR, users_repository: UR) -> Self {
        Self {
            bookings_repository,
            items_repository,
            users_repository,
        }
    }
}

#[async_trait::async_trait]
impl<BR, IR, UR> BookingsService for DefaultBookingsService<BR, IR, UR>
where
    BR: BookingsRepository,
    IR: ItemsRepository,
    UR: UsersRepository,
{
    async fn add_booking(
        &self,
        user_id: i64,
        new_booking: NewBooking,
    ) -> Result<Booking, AddBookingError> {
        let item = self
            .items_repository
            .find_by_id(new_booking.item_id)
            .await?
            .ok_or(AddBookingError::ItemNotFound)?;
        let booker = self
            .users_repository
            .find_by_id(user_id)
            .await?
            .ok_or(AddBookingError::UserNotFound)?;
        if booker.id == item.owner_id {
            return Err(AddBookingError::OwnerCannotBook);
        }
        if !item.available {
            return Err(AddBookingError::ItemUnavailable);
        }
        let (start, end) = match (new_booking.start, new_booking.end) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err(AddBookingError::MissingDates),
        };
        if start <= Utc::now() {
            return Err(AddBookingError::StartInPast);
        }
        if start >= end {
            return Err(AddBookingError::EndNotAfterStart);
        }
        Ok(self
            .bookings_repository
            .create(item.id, booker.id, start, end)
            .await?)
    }

    async fn change_status(
        &self,
        user_id: i64,
        booking_id: i64,
        approved: bool,
    ) -> Result<Booking, ChangeStatusError> {
        let booking = self
            .bookings_repository
            .find_by_id(booking_id)
            .await?
            .ok_or(ChangeStatusError::NotFound)?;
        if booking.item.owner_id != user_id {
            return Err(ChangeStatusError::NotOwner);
        }
        let status = if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        };
        // The already-approved guard lives in the repository so the check
        // and the write happen under one write guard.
        self.bookings_repository
            .update_status(booking_id, status)
            .await
            .map_err(|e| match e {
                UpdateStatusError::NotFound => ChangeStatusError::NotFound,
                UpdateStatusError::AlreadyApproved => ChangeStatusError::AlreadyApproved,
                UpdateStatusError::Unknown(err) => ChangeStatusError::Unknown(err),
            })
    }

    async fn get_booking(
        &self,
        user_id: i64,
        booking_id: i64,
    ) -> Result<Booking, GetBookingError> {
        self.users_repository
            .find_by_id(user_id)
            .await?
            .ok_or(GetBookingError::UserNotFound)?;
        let booking = self
            .bookings_repository
            .find_by_id(booking_id)
            .await?
            .ok_or(GetBookingError::NotFound)?;
        if booking.booker.id != user_id && booking.item.owner_id != user_id {
            return Err(GetBookingError::AccessDenied);
        }
        Ok(booking)
    }

    async fn list_by_booker(
        &self,
        user_id: i64,
        state: Option<String>,
        page: Option<Page>,
    ) -> Result<Vec<Booking>, ListBookingsError> {
        self.users_repository
            .find_by_id(user_id)
            .await?
            .ok_or(ListBookingsError::UserNotFound)?;
        let state = match state {
            None => BookingState::All,
            Some(token) => token.parse()?,
        };
        let now = Utc::now();
        let repo = &self.bookings_repository;
        let bookings = match state {
            BookingState::All => repo.find_by_booker(user_id, page).await?,
            BookingState::Current => repo.find_current_by_booker(user_id, now).await?,
            BookingState::Past => repo.find_past_by_booker(user_id, now).await?,
            BookingState::Future => repo.find_future_by_booker(user_id, now).await?,
            BookingState::Waiting => {
                repo.find_by_booker_and_status(user_id, BookingStatus::Waiting)
                    .await?
            }
            BookingState::Rejected => {
                repo.find_by_booker_and_status(user_id, BookingStatus::Rejected)
                    .await?
            }
        };
        Ok(bookings)
    }

    async fn list_by_owner(
        &self,
        user_id: i64,
        state: Option<String>,
        page: Option<Page>,
    ) -> Result<Vec<Booking>, ListBookingsError> {
        self.users_repository
            .find_by_id(user_id)
            .await?
            .ok_or(ListBookingsError::UserNotFound)?;
        let state = match state {
            None => BookingState::All,
            Some(token) => token.parse()?,
        };
        let now = Utc::now();
        let repo = &self.bookings_repository;
        let bookings = match state {
            BookingState::All => repo.find_by_owner(user_id, page).await?,
            BookingState::Current => repo.find_current_by_owner(user_id, now).await?,
            BookingState::Past => repo.find_past_by_owner(user_id, now).await?,
            BookingState::Future => repo.find_future_by_owner(user_id, now).await?,
            BookingState::Waiting => {
                repo.find_by_owner_and_status(user_id, BookingStatus::Waiting)
                    .await?
            }
            BookingState::Rejected => {
                repo.find_by_owner_and_status(user_id, BookingStatus::Rejected)
                    .await?
            }
        };
        Ok(bookings)
    }
}
