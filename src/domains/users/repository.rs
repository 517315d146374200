use super::{CreateUserError, DeleteUserError, UpdateUserError, User, UserPatch};
use crate::newtypes::Email;
use crate::store::InMemoryStore;

/// Defines the UsersRepository trait for user storage operations.
#[async_trait::async_trait]
pub trait UsersRepository: Send + Sync + 'static {
    /// Creates a new [User].
    ///
    /// # Errors
    /// - MUST return [CreateUserError::EmailAlreadyUsed] if another user
    ///   already has the given email.
    async fn create(&self, name: String, email: Email) -> Result<User, CreateUserError>;

    /// Retrieves a [User] by id, `None` if absent.
    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, anyhow::Error>;

    /// Retrieves every [User], ordered by id.
    async fn find_all(&self) -> Result<Vec<User>, anyhow::Error>;

    /// Applies a partial update to a user.
    ///
    /// # Errors
    /// - MUST return [UpdateUserError::NotFound] if the user does not exist.
    /// - MUST return [UpdateUserError::EmailAlreadyUsed] if the patched email
    ///   belongs to another user.
    async fn update(&self, user_id: i64, patch: UserPatch) -> Result<User, UpdateUserError>;

    /// Deletes a user, cascading to their items, the bookings involving them
    /// or their items, and their comments.
    ///
    /// # Errors
    /// - MUST return [DeleteUserError::NotFound] if the user does not exist.
    async fn delete(&self, user_id: i64) -> Result<(), DeleteUserError>;
}

#[derive(Clone)]
pub struct InMemoryUsersRepository {
    store: InMemoryStore,
}

impl InMemoryUsersRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn create(&self, name: String, email: Email) -> Result<User, CreateUserError> {
        let mut store = self.store.write()?;
        if store.users.values().any(|user| user.email == email) {
            return Err(CreateUserError::EmailAlreadyUsed);
        }
        let user = User {
            id: store.next_user_id(),
            name,
            email,
        };
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, anyhow::Error> {
        let store = self.store.read()?;
        Ok(store.users.get(&user_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, anyhow::Error> {
        let store = self.store.read()?;
        Ok(store.users.values().cloned().collect())
    }

    async fn update(&self, user_id: i64, patch: UserPatch) -> Result<User, UpdateUserError> {
        let mut store = self.store.write()?;
        if let Some(email) = &patch.email {
            let taken = store
                .users
                .values()
                .any(|user| user.id != user_id && &user.email == email);
            if taken {
                return Err(UpdateUserError::EmailAlreadyUsed);
            }
        }
        let user = store
            .users
            .get_mut(&user_id)
            .ok_or(UpdateUserError::NotFound)?;
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        Ok(user.clone())
    }

    async fn delete(&self, user_id: i64) -> Result<(), DeleteUserError> {
        let mut store = self.store.write()?;
        if store.users.remove(&user_id).is_none() {
            return Err(DeleteUserError::NotFound);
        }
        let owned_items: Vec<i64> = store
            .items
            .values()
            .filter(|item| item.owner_id == user_id)
            .map(|item| item.id)
            .collect();
        store.items.retain(|_, item| item.owner_id != user_id);
        store.bookings.retain(|_, booking| {
            booking.booker_id != user_id && !owned_items.contains(&booking.item_id)
        });
        store.comments.retain(|_, comment| {
            comment.author_id != user_id && !owned_items.contains(&comment.item_id)
        });
        store
            .requests
            .retain(|_, request| request.requestor_id != user_id);
        Ok(())
    }
}
