//! User accounts: registration, login/logout, and the inquiry dashboard.

pub mod domain;
pub(crate) mod password;
pub mod repository;
pub mod router;
pub mod service;


pub use domain::{
    LoginForm, NewUser, RegistrationForm, SessionToken, User, UserId, UserProfile,
};
pub use password::{hash_password, verify_password, PasswordError};
pub use repository::{SessionStore, UserRepository};
pub use router::accounts_router;
pub use service::{AccountError, AccountService, Dashboard, LoginSession};
