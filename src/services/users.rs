#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use super::{into_validation_error, is_valid_email, require};
use crate::collect::combine_all;
use crate::domain::{NewUser, User, UserId};
use crate::error::{AppError, AppOutcome};
use crate::outcome::{failure, Outcome, OutcomeFutureExt, Unit};
use crate::store::Storage;
use std::sync::Arc;
use tap::Pipe;
use tracing::info;

const MAX_NAME_LEN: usize = 100;

pub struct UserService {
    store: Arc<dyn Storage>,
}

fn validate_email(email: &str) -> AppOutcome<Unit> {
    combine_all([require(
        is_valid_email(email),
        "email",
        "Email must contain '@' and a dotted domain",
    )])
    .map_error(into_validation_error)
    .discard()
}

fn validate_new_user(input: NewUser) -> AppOutcome<NewUser> {
    let name = input.name.trim();
    combine_all([
        require(!name.is_empty(), "name", "Name is required"),
        require(
            name.chars().count() <= MAX_NAME_LEN,
            "name",
            format!("Name must be at most {MAX_NAME_LEN} characters"),
        ),
        require(
            is_valid_email(&input.email),
            "email",
            "Email must contain '@' and a dotted domain",
        ),
    ])
    .map_error(into_validation_error)
    .map(|_| input)
}

impl UserService {
    #[must_use]
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    /// Validates, then stores the user unless the email is already taken.
    pub async fn create_user(&self, input: NewUser) -> AppOutcome<User> {
        validate_new_user(input)
            .into_async()
            .bind(|input| async move {
                let email = input.email.clone();
                let stored = self.store.insert_user(input).await;
                Outcome::from_option(stored, || AppError::duplicate("email", email))
            })
            .tap(|user| info!(user_id = %user.id, "user created"))
            .await
    }

    pub async fn get_user(&self, id: UserId) -> AppOutcome<User> {
        self.store
            .get_user(id)
            .await
            .pipe(|found| Outcome::from_option(found, || AppError::not_found("User", id)))
    }

    pub async fn list_users(&self) -> Vec<User> {
        self.store.list_users().await
    }

    pub async fn update_email(&self, id: UserId, email: String) -> AppOutcome<User> {
        validate_email(&email)
            .into_async()
            .bind(|_| self.get_user(id))
            .bind(|user| {
                self.ensure_email_free(email.clone(), Some(id))
                    .async_outcome()
                    .map(move |_| User { email, ..user })
            })
            .bind(|user| async move {
                let found = self.store.update_user(user).await;
                Outcome::from_option(found, || AppError::not_found("User", id))
            })
            .await
    }

    pub async fn delete_user(&self, id: UserId) -> AppOutcome<Unit> {
        if self.store.delete_user(id).await {
            info!(user_id = %id, "user deleted");
            Outcome::unit()
        } else {
            failure(AppError::not_found("User", id))
        }
    }

    /// Fails with `Duplicate` when another user already owns `email`.
    async fn ensure_email_free(&self, email: String, owner: Option<UserId>) -> AppOutcome<Unit> {
        match self.store.find_user_by_email(&email).await {
            Some(existing) if Some(existing.id) != owner => {
                failure(AppError::duplicate("email", email))
            }
            _ => Outcome::unit(),
        }
    }
}
