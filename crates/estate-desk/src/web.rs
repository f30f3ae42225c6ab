//! HTTP plumbing shared by the feature routers: request context, form
//! redirects with flash messages, and the session cookie.

use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::FromRequestParts;
use axum::http::header::LOCATION;
use axum::http::request::Parts;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, CookieManagerLayer, Cookies};
use tracing::{error, warn};

use crate::accounts::{
    accounts_router, AccountService, SessionStore, SessionToken, UserId, UserRepository,
};
use crate::contacts::{inquiry_router, ContactRepository, InquiryNotifier, InquiryService};
use crate::listings::{listings_router, ListingRepository, ListingService};

pub const SESSION_COOKIE: &str = "estate_session";

/// Shown when a posted form is missing fields or carries values of the wrong shape.
pub const INVALID_FORM_MESSAGE: &str = "Please fill in every field with a valid value";

/// Session store handle made available to the [`RequestContext`] extractor.
#[derive(Clone)]
pub struct Sessions(pub Arc<dyn SessionStore>);

/// Compose the full site from the three feature services.
pub fn site_router<U, C, L, N>(
    accounts: Arc<AccountService<U, C>>,
    inquiries: Arc<InquiryService<C, N>>,
    listings: Arc<ListingService<L>>,
) -> Router
where
    U: UserRepository + 'static,
    C: ContactRepository + 'static,
    L: ListingRepository + 'static,
    N: InquiryNotifier + 'static,
{
    let sessions = accounts.sessions();
    let site = accounts_router(accounts)
        .merge(inquiry_router(inquiries))
        .merge(listings_router(listings));
    with_sessions(site, sessions)
}

/// Install the session store and cookie handling that [`RequestContext`] relies on.
pub fn with_sessions(router: Router, sessions: Arc<dyn SessionStore>) -> Router {
    router
        .layer(Extension(Sessions(sessions)))
        .layer(CookieManagerLayer::new())
}

/// Who is making the request. Resolved once per request from the session
/// cookie and passed to handlers explicitly.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub session: Option<SessionToken>,
    pub user: Option<UserId>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(session: SessionToken, user: UserId) -> Self {
        Self {
            session: Some(session),
            user: Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(Sessions(store)) = parts.extensions.get::<Sessions>().cloned() else {
            error!("session store extension missing from router");
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "session store unavailable",
            ));
        };
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let Some(token) = session_token(&cookies) else {
            return Ok(Self::anonymous());
        };

        match store.resolve(&token) {
            Ok(Some(user)) => Ok(Self::authenticated(token, user)),
            Ok(None) => Ok(Self::anonymous()),
            Err(err) => {
                error!(error = %err, "session lookup failed");
                Err(error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "session store unavailable",
                ))
            }
        }
    }
}

/// The session token carried by the request, if any. Quoted values are unquoted.
pub fn session_token(cookies: &Cookies) -> Option<SessionToken> {
    cookies
        .get(SESSION_COOKIE)
        .and_then(|cookie| SessionToken::from_cookie(cookie.value_trimmed()))
}

pub fn session_cookie(token: &SessionToken) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.as_str().to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie handed to [`Cookies::remove`] to expire the session on the client.
pub fn session_removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    Success,
    Error,
}

/// One-shot message shown after a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub level: MessageLevel,
    pub text: String,
}

/// Outcome of a form post: `303 See Other` to the next page with a message.
///
/// The message travels only in the JSON body of the 303. Browsers drop that
/// body when they follow `Location`, so clients that need the message must
/// read the redirect response themselves instead of following it blindly.
#[derive(Debug, Clone)]
pub struct FormRedirect {
    location: String,
    message: FlashMessage,
}

impl FormRedirect {
    pub fn success(location: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(location, MessageLevel::Success, text)
    }

    pub fn error(location: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(location, MessageLevel::Error, text)
    }

    fn new(location: impl Into<String>, level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: FlashMessage {
                level,
                text: text.into(),
            },
        }
    }
}

impl IntoResponse for FormRedirect {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "redirect_to": self.location,
            "message": self.message,
        }));
        let mut response = (StatusCode::SEE_OTHER, body).into_response();

        match HeaderValue::from_str(&self.location) {
            Ok(value) => {
                response.headers_mut().insert(LOCATION, value);
            }
            Err(_) => warn!(location = %self.location, "redirect target is not a valid header"),
        }

        response
    }
}

/// Bounce a form that could not be decoded back to `location` with a message.
pub(crate) fn rejected_form(location: &str, rejection: FormRejection) -> Response {
    warn!(%location, error = %rejection.body_text(), "form rejected");
    FormRedirect::error(location, INVALID_FORM_MESSAGE).into_response()
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({ "error": message.into() });
    (status, Json(payload)).into_response()
}

/// Treat blank form and query values as absent.
pub(crate) fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
