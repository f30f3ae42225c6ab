use super::domain::{NewUser, SessionToken, User, UserId};
use crate::storage::RepositoryError;

/// Storage abstraction for accounts so the service can be exercised in isolation.
///
/// Implementations must reject duplicate usernames and emails on insert with
/// [`RepositoryError::Conflict`], even when the service already checked.
pub trait UserRepository: Send + Sync {
    fn insert(&self, user: NewUser) -> Result<User, RepositoryError>;
    fn fetch(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
    fn username_exists(&self, username: &str) -> Result<bool, RepositoryError>;
    fn email_exists(&self, email: &str) -> Result<bool, RepositoryError>;
}

/// Server-side session table keyed by the cookie token.
pub trait SessionStore: Send + Sync {
    fn create(&self, user_id: UserId) -> Result<SessionToken, RepositoryError>;
    fn resolve(&self, token: &SessionToken) -> Result<Option<UserId>, RepositoryError>;
    fn revoke(&self, token: &SessionToken) -> Result<(), RepositoryError>;
}
