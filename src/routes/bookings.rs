use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, PageQuery, SharerUserId};
use crate::domains::bookings::{
    AddBookingError, Booking, BookingStatus, ChangeStatusError, GetBookingError,
    ListBookingsError, NewBooking,
};

pub fn bookings_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings_as_booker).post(create_booking))
        .route("/owner", get(list_bookings_as_owner))
        .route("/{booking_id}", get(get_booking).patch(change_status))
}

// ##############################################
// ############### CREATE BOOKING ###############
// ##############################################

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingHttpBody {
    pub item_id: Option<i64>,
    pub start: Option<chrono::DateTime<chrono::Utc>>,
    pub end: Option<chrono::DateTime<chrono::Utc>>,
}

async fn create_booking(
    State(app_state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Json(body): Json<CreateBookingHttpBody>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let item_id = body
        .item_id
        .ok_or_else(|| ApiError::BadRequest("itemId must be provided".to_string()))?;
    let booking = app_state
        .bookings_service
        .add_booking(
            user_id,
            NewBooking {
                item_id,
                start: body.start,
                end: body.end,
            },
        )
        .await
        .map_err(|e| match e {
            AddBookingError::ItemNotFound | AddBookingError::UserNotFound => {
                ApiError::NotFound(e.to_string())
            }
            AddBookingError::OwnerCannotBook => ApiError::Forbidden(e.to_string()),
            AddBookingError::ItemUnavailable
            | AddBookingError::MissingDates
            | AddBookingError::StartInPast
            | AddBookingError::EndNotAfterStart => ApiError::BadRequest(e.to_string()),
            AddBookingError::Unknown(err) => ApiError::InternalServerError(err),
        })?;
    Ok((StatusCode::CREATED, Json(BookingResponse::from(booking))))
}

// #############################################
// ############### CHANGE STATUS ###############
// #############################################

#[derive(Debug, Deserialize)]
pub struct ApprovedQuery {
    pub approved: bool,
}

async fn change_status(
    State(app_state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Path(booking_id): Path<i64>,
    Query(query): Query<ApprovedQuery>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = app_state
        .bookings_service
        .change_status(user_id, booking_id, query.approved)
        .await
        .map_err(|e| match e {
            ChangeStatusError::NotFound | ChangeStatusError::NotOwner => {
                ApiError::NotFound(e.to_string())
            }
            ChangeStatusError::AlreadyApproved => ApiError::BadRequest(e.to_string()),
            ChangeStatusError::Unknown(err) => ApiError::InternalServerError(err),
        })?;
    Ok(Json(BookingResponse::from(booking)))
}

// ############################################
// ############### GET BOOKINGS ###############
// ############################################

async fn get_booking(
    State(app_state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = app_state
        .bookings_service
        .get_booking(user_id, booking_id)
        .await
        .map_err(|e| match e {
            GetBookingError::UserNotFound
            | GetBookingError::NotFound
            | GetBookingError::AccessDenied => ApiError::NotFound(e.to_string()),
            GetBookingError::Unknown(err) => ApiError::InternalServerError(err),
        })?;
    Ok(Json(BookingResponse::from(booking)))
}

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub state: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

fn map_list_error(e: ListBookingsError) -> ApiError {
    match e {
        ListBookingsError::UserNotFound => ApiError::NotFound(e.to_string()),
        ListBookingsError::UnsupportedState(err) => ApiError::UnsupportedState(err.to_string()),
        ListBookingsError::Unknown(err) => ApiError::InternalServerError(err),
    }
}

async fn list_bookings_as_booker(
    State(app_state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let page = PageQuery {
        from: query.from,
        size: query.size,
    }
    .parse()?;
    let bookings = app_state
        .bookings_service
        .list_by_booker(user_id, query.state, page)
        .await
        .map_err(map_list_error)?;
    Ok(Json(
        bookings.into_iter().map(BookingResponse::from).collect(),
    ))
}

async fn list_bookings_as_owner(
    State(app_state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let page = PageQuery {
        from: query.from,
        size: query.size,
    }
    .parse()?;
    let bookings = app_state
        .bookings_service
        .list_by_owner(user_id, query.state, page)
        .await
        .map_err(map_list_error)?;
    Ok(Json(
        bookings.into_iter().map(BookingResponse::from).collect(),
    ))
}

// ######################################
// ############### COMMON ###############
// ######################################

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingItemResponse {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookerResponse {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: i64,
    pub start: chrono::DateTime<chrono::Utc>,
    pub end: chrono::DateTime<chrono::Utc>,
    pub status: BookingStatus,
    pub item: BookingItemResponse,
    pub booker: BookerResponse,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        BookingResponse {
            id: booking.id,
            start: booking.start,
            end: booking.end,
            status: booking.status,
            item: BookingItemResponse {
                id: booking.item.id,
                name: booking.item.name,
            },
            booker: BookerResponse {
                id: booking.booker.id,
                name: booking.booker.name,
            },
        }
    }
}
