use super::repository::UsersRepository;
use super::{CreateUserError, DeleteUserError, FindUserError, UpdateUserError, User, UserPatch};
use crate::newtypes::Email;

/// Service trait for managing users.
#[async_trait::async_trait]
pub trait UsersService: Send + Sync + 'static {
    /// Registers a new user.
    ///
    /// # Errors
    /// * [CreateUserError::EmailAlreadyUsed] - If the email is already taken.
    async fn create_user(&self, name: String, email: Email) -> Result<User, CreateUserError>;

    /// Retrieves a user by id.
    async fn get_user(&self, user_id: i64) -> Result<User, FindUserError>;

    /// Retrieves every registered user.
    async fn get_all_users(&self) -> Result<Vec<User>, anyhow::Error>;

    /// Applies a partial update to a user.
    async fn update_user(&self, user_id: i64, patch: UserPatch) -> Result<User, UpdateUserError>;

    /// Deletes a user and everything that hangs off them.
    async fn delete_user(&self, user_id: i64) -> Result<(), DeleteUserError>;
}

pub struct DefaultUsersService<R: UsersRepository> {
    repository: R,
}

impl<R: UsersRepository> DefaultUsersService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl<R: UsersRepository> UsersService for DefaultUsersService<R> {
    async fn create_user(&self, name: String, email: Email) -> Result<User, CreateUserError> {
        self.repository.create(name, email).await
    }

    async fn get_user(&self, user_id: i64) -> Result<User, FindUserError> {
        self.repository
            .find_by_id(user_id)
            .await?
            .ok_or(FindUserError::NotFound)
    }

    async fn get_all_users(&self) -> Result<Vec<User>, anyhow::Error> {
        self.repository.find_all().await
    }

    async fn update_user(&self, user_id: i64, patch: UserPatch) -> Result<User, UpdateUserError> {
        self.repository.update(user_id, patch).await
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), DeleteUserError> {
        self.repository.delete(user_id).await
    }
}
