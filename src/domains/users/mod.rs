use thiserror::Error;

use crate::newtypes::Email;

pub mod repository;
pub mod service;

// ###############################################
// ############### USER DEFINITION ###############
// ###############################################

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: Email,
}

/// Partial update of a user; only present fields overwrite.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<Email>,
}

// ###############################################
// ############### USER CREATION #################
// ###############################################

#[derive(Debug, Error)]
pub enum CreateUserError {
    #[error("a user with the given email already exists")]
    EmailAlreadyUsed,
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

// ###############################################
// ############### USER RETRIEVAL ################
// ###############################################

#[derive(Debug, Error)]
pub enum FindUserError {
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

// ###############################################
// ############### USER UPDATE ###################
// ###############################################

#[derive(Debug, Error)]
pub enum UpdateUserError {
    #[error("user not found")]
    NotFound,
    #[error("a user with the given email already exists")]
    EmailAlreadyUsed,
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

// ###############################################
// ############### USER DELETION #################
// ###############################################

#[derive(Debug, Error)]
pub enum DeleteUserError {
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}
