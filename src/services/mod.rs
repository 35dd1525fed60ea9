#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Business workflows built on the outcome algebra and the storage
//! collaborator.

mod orders;
mod products;
mod users;

pub use orders::OrderService;
pub use products::ProductService;
pub use users::UserService;

use crate::error::AppError;
use crate::outcome::{Outcome, Unit, UNIT};
use crate::payloads::FieldError;
use itertools::Itertools;

type Check = Outcome<Unit, FieldError<String>>;

/// A single validation rule.
fn require(condition: bool, field: impl Into<String>, message: impl Into<String>) -> Check {
    if condition {
        Outcome::Success(UNIT)
    } else {
        Outcome::Failure(FieldError::new(field, message.into()))
    }
}

/// Folds accumulated field errors into one `Validation` error.
fn into_validation_error(errors: Vec<FieldError<String>>) -> AppError {
    let fields = errors.iter().map(FieldError::field).unique().join(", ");
    let messages = errors.iter().map(|e| e.error().as_str()).join("; ");
    AppError::validation(fields, messages)
}

fn is_valid_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
}
