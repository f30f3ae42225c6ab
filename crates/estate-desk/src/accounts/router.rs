use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use tower_cookies::Cookies;
use tracing::error;

use super::domain::{LoginForm, RegistrationForm};
use super::service::{AccountError, AccountService};
use super::UserRepository;
use crate::contacts::ContactRepository;
use crate::web::{
    error_response, rejected_form, session_cookie, session_removal_cookie, FormRedirect,
    RequestContext,
};

/// Router builder exposing registration, login/logout, and the dashboard.
pub fn accounts_router<U, C>(service: Arc<AccountService<U, C>>) -> Router
where
    U: UserRepository + 'static,
    C: ContactRepository + 'static,
{
    Router::new()
        .route(
            "/register",
            get(register_page).post(register_handler::<U, C>),
        )
        .route("/login", get(login_page).post(login_handler::<U, C>))
        .route("/logout", post(logout_handler::<U, C>))
        .route("/dashboard", get(dashboard_handler::<U, C>))
        .with_state(service)
}

/// Descriptor for a form page; markup is left to the presentation layer.
#[derive(Debug, Serialize)]
pub(crate) struct FormPage {
    page: &'static str,
    action: &'static str,
    fields: &'static [&'static str],
    authenticated: bool,
}

pub(crate) async fn register_page(context: RequestContext) -> Json<FormPage> {
    Json(FormPage {
        page: "register",
        action: "/register",
        fields: &[
            "first_name",
            "last_name",
            "username",
            "email",
            "password",
            "password2",
        ],
        authenticated: context.is_authenticated(),
    })
}

pub(crate) async fn login_page(context: RequestContext) -> Json<FormPage> {
    Json(FormPage {
        page: "login",
        action: "/login",
        fields: &["username", "password"],
        authenticated: context.is_authenticated(),
    })
}

pub(crate) async fn register_handler<U, C>(
    State(service): State<Arc<AccountService<U, C>>>,
    form: Result<Form<RegistrationForm>, FormRejection>,
) -> Response
where
    U: UserRepository + 'static,
    C: ContactRepository + 'static,
{
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return rejected_form("/register", rejection),
    };

    match off_worker(move || service.register(form)).await {
        Ok(_) => {
            FormRedirect::success("/login", "You are now registered and can log in").into_response()
        }
        Err(err) => form_failure("/register", err),
    }
}

pub(crate) async fn login_handler<U, C>(
    State(service): State<Arc<AccountService<U, C>>>,
    cookies: Cookies,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response
where
    U: UserRepository + 'static,
    C: ContactRepository + 'static,
{
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return rejected_form("/login", rejection),
    };

    match off_worker(move || service.login(form)).await {
        Ok(login) => {
            cookies.add(session_cookie(&login.token));
            FormRedirect::success("/dashboard", "You are now logged in").into_response()
        }
        Err(err) => form_failure("/login", err),
    }
}

pub(crate) async fn logout_handler<U, C>(
    State(service): State<Arc<AccountService<U, C>>>,
    cookies: Cookies,
    context: RequestContext,
) -> Response
where
    U: UserRepository + 'static,
    C: ContactRepository + 'static,
{
    let Some(token) = context.session.filter(|_| context.user.is_some()) else {
        return form_failure("/login", AccountError::NotAuthenticated);
    };

    match service.logout(&token) {
        Ok(()) => {
            cookies.remove(session_removal_cookie());
            FormRedirect::success("/", "You are now logged out").into_response()
        }
        Err(err) => form_failure("/", err),
    }
}

pub(crate) async fn dashboard_handler<U, C>(
    State(service): State<Arc<AccountService<U, C>>>,
    context: RequestContext,
) -> Response
where
    U: UserRepository + 'static,
    C: ContactRepository + 'static,
{
    let Some(user_id) = context.user else {
        return form_failure("/login", AccountError::NotAuthenticated);
    };

    match service.dashboard(user_id) {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(err) => form_failure("/login", err),
    }
}

/// Password hashing is CPU-bound; keep it off the async worker threads.
async fn off_worker<T, F>(task: F) -> Result<T, AccountError>
where
    F: FnOnce() -> Result<T, AccountError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .unwrap_or_else(|err| Err(AccountError::Interrupted(err.to_string())))
}

fn form_failure(location: &str, err: AccountError) -> Response {
    if err.kind().is_user_facing() {
        return FormRedirect::error(location, err.to_string()).into_response();
    }

    error!(error = %err, "account request failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
