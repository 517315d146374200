use std::sync::Arc;

use axum::{
    Json, Router,
    extract::FromRequestParts,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::domains::{
    bookings::service::BookingsService, items::service::ItemsService,
    requests::service::RequestsService, users::service::UsersService,
};
use crate::pagination::Page;

pub mod bookings;
pub mod items;
pub mod requests;
pub mod users;

pub fn app_router(
    users_service: impl UsersService,
    items_service: impl ItemsService,
    bookings_service: impl BookingsService,
    requests_service: impl RequestsService,
) -> Router {
    let app_state = AppState {
        users_service: Arc::new(users_service),
        items_service: Arc::new(items_service),
        bookings_service: Arc::new(bookings_service),
        requests_service: Arc::new(requests_service),
    };
    Router::new()
        .route("/health", get(get_healthcheck))
        .nest("/users", users::users_router())
        .nest("/items", items::items_router())
        .nest("/bookings", bookings::bookings_router())
        .nest("/requests", requests::requests_router())
        .fallback(not_found)
        .with_state(app_state)
}

#[derive(Clone)]
pub struct AppState {
    users_service: Arc<dyn UsersService>,
    items_service: Arc<dyn ItemsService>,
    bookings_service: Arc<dyn BookingsService>,
    requests_service: Arc<dyn RequestsService>,
}

#[derive(Serialize, Deserialize)]
pub struct GetHealthcheckResponse {
    pub ok: bool,
}
async fn get_healthcheck() -> (StatusCode, Json<GetHealthcheckResponse>) {
    (StatusCode::OK, Json(GetHealthcheckResponse { ok: true }))
}

async fn not_found() -> impl IntoResponse {
    ApiError::NotFound("Not found".to_string())
}

// ############################################
// ################## ERRORS ##################
// ############################################

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Forbidden(String),
    Conflict(String),
    /// Unknown booking state token; rendered as a JSON body because clients
    /// key on the `error` field to surface the offending token.
    UnsupportedState(String),
    InternalServerError(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalServerError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg).into_response(),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
            Self::UnsupportedState(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": msg })),
            )
                .into_response(),
            Self::InternalServerError(e) => {
                error!("Internal server error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

// ################################################
// ################## PAGINATION ##################
// ################################################

/// The `from`/`size` query parameters shared by the listing routes.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub from: Option<i64>,
    pub size: Option<i64>,
}

impl PageQuery {
    fn parse(self) -> Result<Option<Page>, ApiError> {
        Page::from_query(self.from, self.size).map_err(|e| ApiError::BadRequest(e.to_string()))
    }
}

// ##############################################
// ################## IDENTITY ##################
// ##############################################

/// Identity header every protected route requires.
pub const SHARER_USER_ID_HEADER: &str = "x-sharer-user-id";

/// The requester's user id, taken from the `X-Sharer-User-Id` header. The id
/// is not authenticated, only parsed; the services decide what it may do.
pub struct SharerUserId(pub i64);

impl FromRequestParts<AppState> for SharerUserId {
    type Rejection = IdentityError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(SHARER_USER_ID_HEADER)
            .ok_or(IdentityError::MissingHeader)?;
        let user_id = header_value
            .to_str()
            .map_err(|_| IdentityError::InvalidHeader)?
            .parse::<i64>()
            .map_err(|_| IdentityError::InvalidHeader)?;
        Ok(SharerUserId(user_id))
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("missing X-Sharer-User-Id header")]
    MissingHeader,
    #[error("invalid X-Sharer-User-Id header")]
    InvalidHeader,
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        warn!("Rejected request: {}", self);
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}
