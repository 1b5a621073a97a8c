use crate::types::{NewUser, UpdateUserRequest, User};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// In-process user table. Contents are lost when the process exits.
pub struct UserStore {
    users: HashMap<u64, User>,
    next_id: u64,
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            next_id: 1,
        }
    }

    /// Newest first; users created in the same instant fall back to id order.
    pub fn list(&self) -> Vec<&User> {
        let mut items: Vec<&User> = self.users.values().collect();
        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        items
    }

    pub fn get(&self, id: u64) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }

    pub fn find_by_username(&self, username: &str) -> Option<&User> {
        self.users.values().find(|u| u.username == username)
    }

    /// Insert a user and return a clone of it.
    pub fn insert(&mut self, new: NewUser) -> User {
        let id = self.next_id;
        self.next_id += 1;
        let now = Utc::now().to_rfc3339();

        let user = User {
            id,
            email: new.email,
            username: new.username,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        };
        self.users.insert(id, user.clone());
        user
    }

    pub fn update(&mut self, id: u64, changes: UpdateUserRequest) -> Option<User> {
        let user = self.users.get_mut(&id)?;
        if let Some(v) = changes.email {
            user.email = v;
        }
        if let Some(v) = changes.username {
            user.username = v;
        }
        if let Some(v) = changes.first_name {
            user.first_name = Some(v);
        }
        if let Some(v) = changes.last_name {
            user.last_name = Some(v);
        }
        if let Some(v) = changes.is_active {
            user.is_active = v;
        }
        user.updated_at = Utc::now().to_rfc3339();
        Some(user.clone())
    }

    pub fn delete(&mut self, id: u64) -> bool {
        self.users.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Hex SHA-256 digest stored in place of the submitted password.
pub fn digest_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}
