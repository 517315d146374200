use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, PageQuery, SharerUserId};
use crate::domains::requests::{
    AddRequestError, GetRequestError, ItemRequest, ItemRequestDetails, ListRequestsError,
};
use crate::routes::items::ItemResponse;

pub fn requests_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_own_requests).post(create_request))
        .route("/all", get(list_all_requests))
        .route("/{request_id}", get(get_request))
}

// ##############################################
// ############### CREATE REQUEST ###############
// ##############################################

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestHttpBody {
    pub description: Option<String>,
}

async fn create_request(
    State(app_state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Json(body): Json<CreateRequestHttpBody>,
) -> Result<(StatusCode, Json<RequestResponse>), ApiError> {
    let request = app_state
        .requests_service
        .add_request(user_id, body.description.unwrap_or_default())
        .await
        .map_err(|e| match e {
            AddRequestError::UserNotFound => ApiError::NotFound(e.to_string()),
            AddRequestError::EmptyDescription => ApiError::BadRequest(e.to_string()),
            AddRequestError::Unknown(err) => ApiError::InternalServerError(err),
        })?;
    Ok((StatusCode::CREATED, Json(RequestResponse::from(request))))
}

// ############################################
// ############### GET REQUESTS ###############
// ############################################

fn map_list_error(e: ListRequestsError) -> ApiError {
    match e {
        ListRequestsError::UserNotFound => ApiError::NotFound(e.to_string()),
        ListRequestsError::Unknown(err) => ApiError::InternalServerError(err),
    }
}

async fn list_own_requests(
    State(app_state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
) -> Result<Json<Vec<RequestDetailsResponse>>, ApiError> {
    let details = app_state
        .requests_service
        .get_own_requests(user_id)
        .await
        .map_err(map_list_error)?;
    Ok(Json(
        details
            .into_iter()
            .map(RequestDetailsResponse::from)
            .collect(),
    ))
}

async fn list_all_requests(
    State(app_state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Query(page_query): Query<PageQuery>,
) -> Result<Json<Vec<RequestDetailsResponse>>, ApiError> {
    let page = page_query.parse()?;
    let details = app_state
        .requests_service
        .get_all_requests(user_id, page)
        .await
        .map_err(map_list_error)?;
    Ok(Json(
        details
            .into_iter()
            .map(RequestDetailsResponse::from)
            .collect(),
    ))
}

async fn get_request(
    State(app_state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Path(request_id): Path<i64>,
) -> Result<Json<RequestDetailsResponse>, ApiError> {
    let details = app_state
        .requests_service
        .get_request(user_id, request_id)
        .await
        .map_err(|e| match e {
            GetRequestError::UserNotFound | GetRequestError::NotFound => {
                ApiError::NotFound(e.to_string())
            }
            GetRequestError::Unknown(err) => ApiError::InternalServerError(err),
        })?;
    Ok(Json(RequestDetailsResponse::from(details)))
}

// ######################################
// ############### COMMON ###############
// ######################################

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponse {
    pub id: i64,
    pub description: String,
    pub requestor_id: i64,
    pub created: chrono::DateTime<chrono::Utc>,
}

impl From<ItemRequest> for RequestResponse {
    fn from(request: ItemRequest) -> Self {
        RequestResponse {
            id: request.id,
            description: request.description,
            requestor_id: request.requestor.id,
            created: request.created,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetailsResponse {
    pub id: i64,
    pub description: String,
    pub requestor_id: i64,
    pub created: chrono::DateTime<chrono::Utc>,
    pub items: Vec<ItemResponse>,
}

impl From<ItemRequestDetails> for RequestDetailsResponse {
    fn from(details: ItemRequestDetails) -> Self {
        RequestDetailsResponse {
            id: details.request.id,
            description: details.request.description,
            requestor_id: details.request.requestor.id,
            created: details.request.created,
            items: details.items.into_iter().map(ItemResponse::from).collect(),
        }
    }
}
