//! In-memory user directory for development and testing

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{DirectoryError, NewUser, UserDirectory, UserRecord};

/// Users keyed by email, with sequential ids starting at 1.
pub struct InMemoryUserDirectory {
    users: DashMap<String, UserRecord>,
    next_id: AtomicI64,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn create_user(&self, user: NewUser) -> Result<(), DirectoryError> {
        match self.users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(DirectoryError::Conflict),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                slot.insert(UserRecord {
                    id,
                    name: user.name,
                    email: user.email,
                    password_hash: user.password_hash,
                    role: user.role,
                });
                Ok(())
            }
        }
    }

    async fn fetch_by_email(&self, email: &str) -> Result<Option<UserRecord>, DirectoryError> {
        Ok(self.users.get(email).map(|r| r.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> NewUser {
        NewUser {
            name: "A".into(),
            email: email.into(),
            password_hash: "$2b$04$hash".into(),
            role: "customer".into(),
        }
    }

    #[tokio::test]
    async fn create_then_fetch() {
        let dir = InMemoryUserDirectory::new();
        dir.create_user(user("a@x.com")).await.unwrap();
        dir.create_user(user("b@x.com")).await.unwrap();

        let a = dir.fetch_by_email("a@x.com").await.unwrap().unwrap();
        let b = dir.fetch_by_email("b@x.com").await.unwrap().unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(dir.fetch_by_email("c@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let dir = InMemoryUserDirectory::new();
        dir.create_user(user("a@x.com")).await.unwrap();

        let err = dir.create_user(user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, DirectoryError::Conflict));

        // The rejected insert must not consume an id.
        dir.create_user(user("b@x.com")).await.unwrap();
        let b = dir.fetch_by_email("b@x.com").await.unwrap().unwrap();
        assert_eq!(b.id, 2);
    }
}
