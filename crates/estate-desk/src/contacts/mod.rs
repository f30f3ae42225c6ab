//! Listing inquiries ("contacts") and their notification hook.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;


pub use domain::{Contact, ContactId, InquiryForm, NewContact};
pub use repository::{ContactRepository, InquiryNotification, InquiryNotifier, NotifyError};
pub use router::inquiry_router;
pub use service::{InquiryError, InquiryService};
