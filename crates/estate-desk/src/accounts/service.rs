use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use super::domain::{LoginForm, NewUser, RegistrationForm, SessionToken, UserId, UserProfile};
use super::password::{self, PasswordError};
use super::repository::{SessionStore, UserRepository};
use crate::contacts::{Contact, ContactRepository};
use crate::error::FailureKind;
use crate::storage::{RepositoryError, UniqueConstraint};

/// Registration, login, and the per-user inquiry dashboard.
pub struct AccountService<U, C> {
    users: Arc<U>,
    contacts: Arc<C>,
    sessions: Arc<dyn SessionStore>,
}

/// Result of a successful login: who logged in and the session to hand back.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: UserProfile,
    pub token: SessionToken,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub user: UserProfile,
    pub contacts: Vec<Contact>,
}

impl<U, C> AccountService<U, C>
where
    U: UserRepository + 'static,
    C: ContactRepository + 'static,
{
    pub fn new(users: Arc<U>, contacts: Arc<C>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            users,
            contacts,
            sessions,
        }
    }

    pub fn sessions(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.sessions)
    }

    /// Create an account. Checks run in a fixed order (password match, username,
    /// email) and only the first failure is reported.
    pub fn register(&self, form: RegistrationForm) -> Result<UserProfile, AccountError> {
        let RegistrationForm {
            first_name,
            last_name,
            username,
            email,
            password,
            password2,
        } = form;

        if password != password2 {
            return Err(AccountError::PasswordMismatch);
        }
        if self.users.username_exists(&username)? {
            return Err(AccountError::UsernameTaken);
        }
        if self.users.email_exists(&email)? {
            return Err(AccountError::EmailInUse);
        }

        let password_hash = password::hash_password(&password)?;
        let user = self.users.insert(NewUser {
            username,
            email,
            password_hash,
            first_name,
            last_name,
            date_joined: Utc::now(),
        })?;

        info!(user_id = %user.id, username = %user.username, "account registered");
        Ok(user.profile())
    }

    /// Verify credentials and open a session. Unknown usernames and wrong
    /// passwords fail identically.
    pub fn login(&self, form: LoginForm) -> Result<LoginSession, AccountError> {
        let LoginForm { username, password } = form;

        let user = match self.users.find_by_username(&username)? {
            Some(user) => user,
            None => {
                password::verify_against_dummy(&password);
                debug!("login rejected");
                return Err(AccountError::InvalidCredentials);
            }
        };

        if !password::verify_password(&password, &user.password_hash) {
            debug!("login rejected");
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.sessions.create(user.id)?;
        info!(user_id = %user.id, "session opened");
        Ok(LoginSession {
            user: user.profile(),
            token,
        })
    }

    pub fn logout(&self, token: &SessionToken) -> Result<(), AccountError> {
        self.sessions.revoke(token)?;
        info!("session closed");
        Ok(())
    }

    /// The user's own inquiries, newest first.
    pub fn dashboard(&self, user_id: UserId) -> Result<Dashboard, AccountError> {
        let user = self
            .users
            .fetch(user_id)?
            .ok_or(AccountError::NotAuthenticated)?;
        let contacts = self.contacts.for_user(user_id)?;

        Ok(Dashboard {
            user: user.profile(),
            contacts,
        })
    }
}

/// Error raised by the account service. Display strings are the messages shown to users.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("That username is taken")]
    UsernameTaken,
    #[error("That email is being used")]
    EmailInUse,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Please log in to continue")]
    NotAuthenticated,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("account task interrupted: {0}")]
    Interrupted(String),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl AccountError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AccountError::PasswordMismatch => FailureKind::Validation,
            AccountError::UsernameTaken | AccountError::EmailInUse => FailureKind::Conflict,
            AccountError::InvalidCredentials | AccountError::NotAuthenticated => {
                FailureKind::Authentication
            }
            AccountError::Password(_)
            | AccountError::Interrupted(_)
            | AccountError::Repository(_) => FailureKind::Unavailable,
        }
    }
}

impl From<RepositoryError> for AccountError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict(UniqueConstraint::Username) => Self::UsernameTaken,
            RepositoryError::Conflict(UniqueConstraint::Email) => Self::EmailInUse,
            other => Self::Repository(other),
        }
    }
}
