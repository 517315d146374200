use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::domains::users::{
    CreateUserError, DeleteUserError, FindUserError, UpdateUserError, User, UserPatch,
};
use crate::newtypes::{Email, EmailError};

pub fn users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{user_id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

fn parse_email(raw: &str) -> Result<Email, ApiError> {
    Email::new(raw).map_err(|e| match e {
        EmailError::Empty => ApiError::BadRequest("email cannot be empty".to_string()),
        EmailError::InvalidFormat => ApiError::BadRequest("email format is invalid".to_string()),
    })
}

// ###########################################
// ############### CREATE USER ###############
// ###########################################

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserHttpBody {
    pub name: Option<String>,
    pub email: Option<String>,
}

async fn create_user(
    State(app_state): State<AppState>,
    Json(body): Json<CreateUserHttpBody>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let name = body
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("name cannot be empty".to_string()))?;
    let email = body
        .email
        .ok_or_else(|| ApiError::BadRequest("email cannot be empty".to_string()))?;
    let email = parse_email(&email)?;

    let user = app_state
        .users_service
        .create_user(name, email)
        .await
        .map_err(|e| match e {
            CreateUserError::EmailAlreadyUsed => ApiError::Conflict(e.to_string()),
            CreateUserError::Unknown(err) => ApiError::InternalServerError(err),
        })?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

// ##########################################
// ############### GET USERS ################
// ##########################################

async fn list_users(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = app_state.users_service.get_all_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

async fn get_user(
    State(app_state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = app_state
        .users_service
        .get_user(user_id)
        .await
        .map_err(|e| match e {
            FindUserError::NotFound => ApiError::NotFound(e.to_string()),
            FindUserError::Unknown(err) => ApiError::InternalServerError(err),
        })?;
    Ok(Json(UserResponse::from(user)))
}

// ###########################################
// ############### UPDATE USER ###############
// ###########################################

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserHttpBody {
    pub name: Option<String>,
    pub email: Option<String>,
}

async fn update_user(
    State(app_state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(body): Json<UpdateUserHttpBody>,
) -> Result<Json<UserResponse>, ApiError> {
    let email = match body.email {
        Some(raw) => Some(parse_email(&raw)?),
        None => None,
    };
    let patch = UserPatch {
        name: body.name,
        email,
    };
    let user = app_state
        .users_service
        .update_user(user_id, patch)
        .await
        .map_err(|e| match e {
            UpdateUserError::NotFound => ApiError::NotFound(e.to_string()),
            UpdateUserError::EmailAlreadyUsed => ApiError::Conflict(e.to_string()),
            UpdateUserError::Unknown(err) => ApiError::InternalServerError(err),
        })?;
    Ok(Json(UserResponse::from(user)))
}

// ###########################################
// ############### DELETE USER ###############
// ###########################################

async fn delete_user(
    State(app_state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    app_state
        .users_service
        .delete_user(user_id)
        .await
        .map_err(|e| match e {
            DeleteUserError::NotFound => ApiError::NotFound(e.to_string()),
            DeleteUserError::Unknown(err) => ApiError::InternalServerError(err),
        })?;
    Ok(StatusCode::OK)
}

// ######################################
// ############### COMMON ###############
// ######################################

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email.to_string(),
        }
    }
}
