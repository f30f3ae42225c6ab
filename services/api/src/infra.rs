use estate_desk::accounts::AccountService;
use estate_desk::contacts::{InquiryNotification, InquiryNotifier, InquiryService, NotifyError};
use estate_desk::listings::{Listing, ListingService};
use estate_desk::storage::{
    InMemoryContactRepository, InMemoryListingRepository, InMemorySessionStore,
    InMemoryUserRepository,
};
use estate_desk::web::site_router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Notifications kept in memory before the oldest are dropped.
pub(crate) const OUTBOX_CAPACITY: usize = 256;

/// Notifier that logs each inquiry notification and keeps the most recent
/// ones in process in place of a mail transport. Never served over HTTP.
#[derive(Clone)]
pub(crate) struct OutboxNotifier {
    events: Arc<Mutex<VecDeque<InquiryNotification>>>,
    capacity: usize,
}

impl Default for OutboxNotifier {
    fn default() -> Self {
        Self::with_capacity(OUTBOX_CAPACITY)
    }
}

impl InquiryNotifier for OutboxNotifier {
    fn notify(&self, notification: InquiryNotification) -> Result<(), NotifyError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| NotifyError::Transport("outbox mutex poisoned".to_string()))?;
        info!(
            subject = %notification.subject,
            recipients = ?notification.recipients,
            contact_id = %notification.contact.id,
            "inquiry notification queued"
        );
        while guard.len() >= self.capacity {
            let Some(dropped) = guard.pop_front() else {
                break;
            };
            warn!(contact_id = %dropped.contact.id, "outbox full; dropping oldest notification");
        }
        guard.push_back(notification);
        Ok(())
    }
}

impl OutboxNotifier {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(OUTBOX_CAPACITY)))),
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn events(&self) -> Vec<InquiryNotification> {
        self.events
            .lock()
            .map(|guard| guard.iter().cloned().collect())
            .unwrap_or_default()
    }
}

pub(crate) type Accounts = AccountService<InMemoryUserRepository, InMemoryContactRepository>;
pub(crate) type Inquiries = InquiryService<InMemoryContactRepository, OutboxNotifier>;
pub(crate) type Catalog = ListingService<InMemoryListingRepository>;

/// The three site services wired to the in-memory adapters.
pub(crate) struct SiteServices {
    pub(crate) accounts: Arc<Accounts>,
    pub(crate) inquiries: Arc<Inquiries>,
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) outbox: OutboxNotifier,
}

impl SiteServices {
    pub(crate) fn in_memory(listings: Vec<Listing>, operations_email: &str) -> Self {
        let contacts = Arc::new(InMemoryContactRepository::default());
        let outbox = OutboxNotifier::default();

        let accounts = Arc::new(AccountService::new(
            Arc::new(InMemoryUserRepository::default()),
            contacts.clone(),
            Arc::new(InMemorySessionStore::default()),
        ));
        let inquiries = Arc::new(InquiryService::new(
            contacts,
            Arc::new(outbox.clone()),
            operations_email,
        ));
        let catalog = Arc::new(ListingService::new(Arc::new(
            InMemoryListingRepository::new(listings),
        )));

        Self {
            accounts,
            inquiries,
            catalog,
            outbox,
        }
    }

    pub(crate) fn router(&self) -> axum::Router {
        site_router(
            self.accounts.clone(),
            self.inquiries.clone(),
            self.catalog.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use estate_desk::contacts::{Contact, ContactId};
    use estate_desk::listings::ListingId;

    fn notification(id: u64) -> InquiryNotification {
        InquiryNotification {
            subject: "Property Listing Inquiry".to_string(),
            body: format!("Inquiry {id}"),
            recipients: vec!["ops@example.com".to_string()],
            contact: Contact {
                id: ContactId(id),
                listing_id: ListingId(1),
                listing: "45 Drivewood Circle".to_string(),
                user_id: None,
                name: "Sam".to_string(),
                email: "sam@example.com".to_string(),
                phone: "555-0100".to_string(),
                message: "Viewing?".to_string(),
                contact_date: Utc::now(),
            },
        }
    }

    #[test]
    fn outbox_keeps_only_the_most_recent_notifications() {
        let outbox = OutboxNotifier::with_capacity(3);
        for id in 1..=5 {
            outbox.notify(notification(id)).expect("queued");
        }

        let kept: Vec<u64> = outbox
            .events()
            .iter()
            .map(|event| event.contact.id.0)
            .collect();
        assert_eq!(kept, vec![3, 4, 5]);
    }

    #[test]
    fn default_outbox_is_bounded() {
        let outbox = OutboxNotifier::default();
        for id in 0..(OUTBOX_CAPACITY as u64 + 10) {
            outbox.notify(notification(id)).expect("queued");
        }
        assert_eq!(outbox.events().len(), OUTBOX_CAPACITY);
    }
}
