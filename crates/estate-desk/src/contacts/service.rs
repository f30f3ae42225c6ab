use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{Contact, InquiryForm, NewContact};
use super::repository::{ContactRepository, InquiryNotification, InquiryNotifier};
use crate::accounts::UserId;
use crate::error::FailureKind;
use crate::storage::{RepositoryError, UniqueConstraint};

pub const NOTIFICATION_SUBJECT: &str = "Property Listing Inquiry";

/// Records inquiries and hands them to the notifier.
pub struct InquiryService<C, N> {
    contacts: Arc<C>,
    notifier: Arc<N>,
    operations_email: String,
}

impl<C, N> InquiryService<C, N>
where
    C: ContactRepository + 'static,
    N: InquiryNotifier + 'static,
{
    pub fn new(contacts: Arc<C>, notifier: Arc<N>, operations_email: impl Into<String>) -> Self {
        Self {
            contacts,
            notifier,
            operations_email: operations_email.into(),
        }
    }

    /// Persist an inquiry on behalf of `submitter` (the session user, if any).
    ///
    /// Authenticated submitters get one inquiry per listing; anonymous ones are
    /// stored without a user and never deduplicated.
    pub fn submit(
        &self,
        submitter: Option<UserId>,
        form: InquiryForm,
    ) -> Result<Contact, InquiryError> {
        let InquiryForm {
            listing_id,
            listing,
            name,
            email,
            phone,
            message,
            user_id: _,
            realtor_email,
        } = form;

        if let Some(user_id) = submitter {
            if self.contacts.exists_for_user(listing_id, user_id)? {
                info!(%listing_id, %user_id, "duplicate inquiry rejected");
                return Err(InquiryError::Duplicate);
            }
        }

        let contact = self.contacts.insert(NewContact {
            listing_id,
            listing,
            user_id: submitter,
            name,
            email,
            phone,
            message,
            contact_date: Utc::now(),
        })?;
        info!(contact_id = %contact.id, %listing_id, "inquiry recorded");

        let notification = self.notification_for(&contact, realtor_email);
        if let Err(err) = self.notifier.notify(notification) {
            warn!(contact_id = %contact.id, error = %err, "inquiry notification failed");
        }

        Ok(contact)
    }

    fn notification_for(
        &self,
        contact: &Contact,
        realtor_email: Option<String>,
    ) -> InquiryNotification {
        let mut recipients: Vec<String> = realtor_email.into_iter().collect();
        if !recipients.contains(&self.operations_email) {
            recipients.push(self.operations_email.clone());
        }

        InquiryNotification {
            subject: NOTIFICATION_SUBJECT.to_string(),
            body: format!(
                "There has been an inquiry for {}. Sign into the admin panel for more info",
                contact.listing
            ),
            recipients,
            contact: contact.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InquiryError {
    #[error("You have already made an inquiry for this listing")]
    Duplicate,
    #[error(transparent)]
    Repository(RepositoryError),
}

impl InquiryError {
    pub fn kind(&self) -> FailureKind {
        match self {
            InquiryError::Duplicate => FailureKind::Conflict,
            InquiryError::Repository(_) => FailureKind::Unavailable,
        }
    }
}

impl From<RepositoryError> for InquiryError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict(UniqueConstraint::ListingInquiry) => Self::Duplicate,
            other => Self::Repository(other),
        }
    }
}
