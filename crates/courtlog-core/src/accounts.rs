//! User accounts.
//!
//! Registration enforces unique usernames, emails and phone numbers. Holding
//! credentials and checking them is left to whatever authenticates requests;
//! this service only stores the opaque hash it is given.

use std::sync::Arc;

use courtlog_store::{EntityStore, StoreError};
use courtlog_types::{NewUser, User, UserId};
use tracing::info;

use crate::error::{HierarchyError, HierarchyResult};
use crate::validation::Validate;

pub struct AccountService<S> {
    store: Arc<S>,
}

impl<S> Clone for AccountService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: EntityStore> AccountService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Register a new, enabled user.
    pub fn register(&self, input: NewUser) -> HierarchyResult<User> {
        input.validate()?;
        let user = User::new(input);
        self.store.transaction(|tx| -> HierarchyResult<()> {
            tx.save_user(user.clone()).map_err(taken)
        })?;
        info!(id = %user.id(), username = %user.username, "registered user");
        Ok(user)
    }

    pub fn user(&self, id: UserId) -> HierarchyResult<User> {
        self.store.read(|view| -> HierarchyResult<User> {
            view.user(id)?.ok_or(HierarchyError::UserNotFound(id))
        })
    }

    pub fn find_by_username(&self, username: &str) -> HierarchyResult<Option<User>> {
        self.store
            .read(|view| -> HierarchyResult<Option<User>> { Ok(view.user_by_username(username)?) })
    }

    pub fn set_enabled(&self, id: UserId, enabled: bool) -> HierarchyResult<User> {
        let user = self.store.transaction(|tx| -> HierarchyResult<User> {
            let mut user = tx.user(id)?.ok_or(HierarchyError::UserNotFound(id))?;
            user.enabled = enabled;
            tx.save_user(user.clone())?;
            Ok(user)
        })?;
        info!(%id, enabled, "changed account state");
        Ok(user)
    }
}

fn taken(e: StoreError) -> HierarchyError {
    match e {
        StoreError::Conflict { field, value } => {
            HierarchyError::validation(format!("{field} {value:?} is already registered"))
        }
        other => other.into(),
    }
}
