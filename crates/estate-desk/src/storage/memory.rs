use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use super::{lock, RepositoryError, UniqueConstraint};
use crate::accounts::{NewUser, SessionStore, SessionToken, User, UserId, UserRepository};
use crate::contacts::{Contact, ContactId, ContactRepository, NewContact};
use crate::listings::{Listing, ListingId, ListingQuery, ListingRepository};

#[derive(Debug, Default)]
struct UserTable {
    last_id: u64,
    rows: BTreeMap<UserId, User>,
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    table: Arc<Mutex<UserTable>>,
}

impl UserRepository for InMemoryUserRepository {
    fn insert(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut guard = lock(&self.table, "users")?;
        if guard.rows.values().any(|row| row.username == user.username) {
            return Err(RepositoryError::Conflict(UniqueConstraint::Username));
        }
        if guard.rows.values().any(|row| row.email == user.email) {
            return Err(RepositoryError::Conflict(UniqueConstraint::Email));
        }

        guard.last_id += 1;
        let id = UserId(guard.last_id);
        let row = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            date_joined: user.date_joined,
        };
        guard.rows.insert(id, row.clone());
        Ok(row)
    }

    fn fetch(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let guard = lock(&self.table, "users")?;
        Ok(guard.rows.get(&id).cloned())
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let guard = lock(&self.table, "users")?;
        Ok(guard
            .rows
            .values()
            .find(|row| row.username == username)
            .cloned())
    }

    fn username_exists(&self, username: &str) -> Result<bool, RepositoryError> {
        let guard = lock(&self.table, "users")?;
        Ok(guard.rows.values().any(|row| row.username == username))
    }

    fn email_exists(&self, email: &str) -> Result<bool, RepositoryError> {
        let guard = lock(&self.table, "users")?;
        Ok(guard.rows.values().any(|row| row.email == email))
    }
}

#[derive(Debug, Default)]
struct ContactTable {
    last_id: u64,
    rows: Vec<Contact>,
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryContactRepository {
    table: Arc<Mutex<ContactTable>>,
}

impl InMemoryContactRepository {
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(lock(&self.table, "contacts")?.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }
}

impl ContactRepository for InMemoryContactRepository {
    fn insert(&self, contact: NewContact) -> Result<Contact, RepositoryError> {
        let mut guard = lock(&self.table, "contacts")?;
        if let Some(user_id) = contact.user_id {
            let duplicate = guard
                .rows
                .iter()
                .any(|row| row.listing_id == contact.listing_id && row.user_id == Some(user_id));
            if duplicate {
                return Err(RepositoryError::Conflict(UniqueConstraint::ListingInquiry));
            }
        }

        guard.last_id += 1;
        let row = Contact {
            id: ContactId(guard.last_id),
            listing_id: contact.listing_id,
            listing: contact.listing,
            user_id: contact.user_id,
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            message: contact.message,
            contact_date: contact.contact_date,
        };
        guard.rows.push(row.clone());
        Ok(row)
    }

    fn exists_for_user(
        &self,
        listing_id: ListingId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let guard = lock(&self.table, "contacts")?;
        Ok(guard
            .rows
            .iter()
            .any(|row| row.listing_id == listing_id && row.user_id == Some(user_id)))
    }

    fn for_user(&self, user_id: UserId) -> Result<Vec<Contact>, RepositoryError> {
        let guard = lock(&self.table, "contacts")?;
        let mut rows: Vec<Contact> = guard
            .rows
            .iter()
            .filter(|row| row.user_id == Some(user_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.contact_date
                .cmp(&a.contact_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(rows)
    }
}

/// Read-only catalog seeded at startup.
#[derive(Debug, Default, Clone)]
pub struct InMemoryListingRepository {
    rows: Arc<Mutex<Vec<Listing>>>,
}

impl InMemoryListingRepository {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(listings)),
        }
    }
}

impl ListingRepository for InMemoryListingRepository {
    fn fetch(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError> {
        let guard = lock(&self.rows, "listings")?;
        Ok(guard.iter().find(|listing| listing.id == id).cloned())
    }

    fn query(&self, query: &ListingQuery) -> Result<Vec<Listing>, RepositoryError> {
        let guard = lock(&self.rows, "listings")?;
        let mut matches: Vec<Listing> = guard
            .iter()
            .filter(|listing| query.matches(listing))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.list_date.cmp(&a.list_date).then_with(|| b.id.cmp(&a.id)));
        Ok(matches)
    }
}

#[derive(Default, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionToken, UserId>>>,
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, user_id: UserId) -> Result<SessionToken, RepositoryError> {
        let token = SessionToken::generate();
        lock(&self.sessions, "sessions")?.insert(token.clone(), user_id);
        Ok(token)
    }

    fn resolve(&self, token: &SessionToken) -> Result<Option<UserId>, RepositoryError> {
        Ok(lock(&self.sessions, "sessions")?.get(token).copied())
    }

    fn revoke(&self, token: &SessionToken) -> Result<(), RepositoryError> {
        lock(&self.sessions, "sessions")?.remove(token);
        Ok(())
    }
}
