use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Form, Router,
};
use tracing::error;

use super::domain::InquiryForm;
use super::repository::{ContactRepository, InquiryNotifier};
use super::service::InquiryService;
use crate::web::{error_response, rejected_form, FormRedirect, RequestContext};

pub const SUBMITTED_MESSAGE: &str =
    "Your request has been submitted, a realtor will get back to you soon";

pub fn inquiry_router<C, N>(service: Arc<InquiryService<C, N>>) -> Router
where
    C: ContactRepository + 'static,
    N: InquiryNotifier + 'static,
{
    Router::new()
        .route("/contact", post(contact_handler::<C, N>))
        .with_state(service)
}

pub(crate) async fn contact_handler<C, N>(
    State(service): State<Arc<InquiryService<C, N>>>,
    context: RequestContext,
    form: Result<Form<InquiryForm>, FormRejection>,
) -> Response
where
    C: ContactRepository + 'static,
    N: InquiryNotifier + 'static,
{
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return rejected_form("/", rejection),
    };
    let listing_page = format!("/listings/{}", form.listing_id);

    match service.submit(context.user, form) {
        Ok(_) => FormRedirect::success(listing_page, SUBMITTED_MESSAGE).into_response(),
        Err(err) if err.kind().is_user_facing() => {
            FormRedirect::error(listing_page, err.to_string()).into_response()
        }
        Err(err) => {
            error!(error = %err, "inquiry submission failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}
