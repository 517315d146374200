use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, PageQuery, SharerUserId};
use crate::domains::items::{
    AddCommentError, AddItemError, Comment, EditItemError, FindItemError, Item, ItemDetails,
    ItemPatch, NewItem,
};

pub fn items_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_own_items).post(create_item))
        .route("/search", get(search_items))
        .route("/{item_id}", get(get_item).patch(update_item))
        .route("/{item_id}/comment", post(create_comment))
}

// ###########################################
// ############### CREATE ITEM ###############
// ###########################################

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemHttpBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
    pub request_id: Option<i64>,
}

async fn create_item(
    State(app_state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Json(body): Json<CreateItemHttpBody>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let name = body
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("name cannot be empty".to_string()))?;
    let description = body
        .description
        .filter(|description| !description.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("description cannot be empty".to_string()))?;
    let available = body
        .available
        .ok_or_else(|| ApiError::BadRequest("available must be provided".to_string()))?;

    let item = app_state
        .items_service
        .add_item(
            user_id,
            NewItem {
                name,
                description,
                available,
                request_id: body.request_id,
            },
        )
        .await
        .map_err(|e| match e {
            AddItemError::UserNotFound => ApiError::NotFound(e.to_string()),
            AddItemError::Unknown(err) => ApiError::InternalServerError(err),
        })?;
    Ok((StatusCode::CREATED, Json(ItemResponse::from(item))))
}

// ###########################################
// ############### UPDATE ITEM ###############
// ###########################################

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemHttpBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

async fn update_item(
    State(app_state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Path(item_id): Path<i64>,
    Json(body): Json<UpdateItemHttpBody>,
) -> Result<Json<ItemResponse>, ApiError> {
    let patch = ItemPatch {
        name: body.name,
        description: body.description,
        available: body.available,
    };
    let item = app_state
        .items_service
        .edit_item(user_id, item_id, patch)
        .await
        .map_err(|e| match e {
            EditItemError::UserNotFound
            | EditItemError::ItemNotFound
            | EditItemError::NotOwner => ApiError::NotFound(e.to_string()),
            EditItemError::Unknown(err) => ApiError::InternalServerError(err),
        })?;
    Ok(Json(ItemResponse::from(item)))
}

// #########################################
// ############### GET ITEMS ###############
// #########################################

async fn get_item(
    State(app_state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Path(item_id): Path<i64>,
) -> Result<Json<ItemDetailsResponse>, ApiError> {
    let details = app_state
        .items_service
        .get_item(user_id, item_id)
        .await
        .map_err(|e| match e {
            FindItemError::UserNotFound | FindItemError::ItemNotFound => {
                ApiError::NotFound(e.to_string())
            }
            FindItemError::Unknown(err) => ApiError::InternalServerError(err),
        })?;
    Ok(Json(ItemDetailsResponse::from(details)))
}

async fn list_own_items(
    State(app_state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Query(page_query): Query<PageQuery>,
) -> Result<Json<Vec<ItemDetailsResponse>>, ApiError> {
    let page = page_query.parse()?;
    let details = app_state
        .items_service
        .get_items_by_owner(user_id, page)
        .await
        .map_err(|e| match e {
            FindItemError::UserNotFound | FindItemError::ItemNotFound => {
                ApiError::NotFound(e.to_string())
            }
            FindItemError::Unknown(err) => ApiError::InternalServerError(err),
        })?;
    Ok(Json(
        details.into_iter().map(ItemDetailsResponse::from).collect(),
    ))
}

// ############################################
// ############### SEARCH ITEMS ###############
// ############################################

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub text: String,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

async fn search_items(
    State(app_state): State<AppState>,
    SharerUserId(_user_id): SharerUserId,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let page = PageQuery {
        from: query.from,
        size: query.size,
    }
    .parse()?;
    let items = app_state.items_service.search_items(&query.text, page).await?;
    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

// ##############################################
// ############### CREATE COMMENT ###############
// ##############################################

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentHttpBody {
    pub text: Option<String>,
}

async fn create_comment(
    State(app_state): State<AppState>,
    SharerUserId(user_id): SharerUserId,
    Path(item_id): Path<i64>,
    Json(body): Json<CreateCommentHttpBody>,
) -> Result<Json<CommentResponse>, ApiError> {
    let comment = app_state
        .items_service
        .add_comment(user_id, item_id, body.text.unwrap_or_default())
        .await
        .map_err(|e| match e {
            AddCommentError::EmptyText | AddCommentError::NotEntitled => {
                ApiError::BadRequest(e.to_string())
            }
            AddCommentError::UserNotFound | AddCommentError::ItemNotFound => {
                ApiError::NotFound(e.to_string())
            }
            AddCommentError::Unknown(err) => ApiError::InternalServerError(err),
        })?;
    Ok(Json(CommentResponse::from(comment)))
}

// ######################################
// ############### COMMON ###############
// ######################################

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        ItemResponse {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            request_id: item.request_id,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRefResponse {
    pub id: i64,
    pub booker_id: i64,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i64,
    pub text: String,
    pub author_name: String,
    pub created: chrono::DateTime<chrono::Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        CommentResponse {
            id: comment.id,
            text: comment.text,
            author_name: comment.author_name,
            created: comment.created,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetailsResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
    pub last_booking: Option<BookingRefResponse>,
    pub next_booking: Option<BookingRefResponse>,
    pub comments: Vec<CommentResponse>,
}

impl From<ItemDetails> for ItemDetailsResponse {
    fn from(details: ItemDetails) -> Self {
        let to_ref = |r: crate::domains::bookings::BookingRef| BookingRefResponse {
            id: r.id,
            booker_id: r.booker_id,
        };
        ItemDetailsResponse {
            id: details.item.id,
            name: details.item.name,
            description: details.item.description,
            available: details.item.available,
            request_id: details.item.request_id,
            last_booking: details.last_booking.map(to_ref),
            next_booking: details.next_booking.map(to_ref),
            comments: details
                .comments
                .into_iter()
                .map(CommentResponse::from)
                .collect(),
        }
    }
}
