#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Turns a terminal outcome into an HTTP-style response.

use crate::error::{AppError, AppOutcome};
use crate::outcome::Outcome;
use crate::payloads::RichError;
use serde::Serialize;
use serde_json::{json, Map, Value};

pub const OK: u16 = 200;
pub const CREATED: u16 = 201;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status < 400
    }
}

#[must_use]
pub const fn status_for(error: &AppError) -> u16 {
    error.status_code()
}

fn error_body(error: &AppError) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("code".to_string(), Value::from(error.code()));
    body.insert("message".to_string(), Value::from(error.message()));
    body
}

fn error_response(
    error: &AppError,
    extra: impl IntoIterator<Item = (String, Value)>,
) -> HttpResponse {
    let mut body = error_body(error);
    let metadata: Map<String, Value> = extra.into_iter().collect();
    if !metadata.is_empty() {
        body.insert("metadata".to_string(), Value::Object(metadata));
    }
    HttpResponse {
        status: status_for(error),
        body: json!({ "error": body }),
    }
}

fn serialize<T: Serialize>(value: &T) -> AppOutcome<Value> {
    Outcome::attempt(
        || serde_json::to_value(value),
        |e| AppError::generic("SERIALIZATION_ERROR", e.to_string()),
    )
}

/// Successes serialise into the body with `success_status`; failures map
/// through [`AppError::status_code`]. A payload that cannot be serialised
/// is reported as a 500.
pub fn respond<T: Serialize>(outcome: AppOutcome<T>, success_status: u16) -> HttpResponse {
    outcome.bind(|value| serialize(&value)).match_with(
        |body| HttpResponse {
            status: success_status,
            body,
        },
        |error| error_response(&error, Map::new()),
    )
}

/// Like [`respond`], with the error's metadata copied into the body.
pub fn respond_rich<T: Serialize>(
    outcome: Outcome<T, RichError<AppError>>,
    success_status: u16,
) -> HttpResponse {
    outcome.match_with(
        |value| respond(Outcome::success(value), success_status),
        |rich| {
            let (error, metadata) = rich.into_parts();
            error_response(&error, metadata)
        },
    )
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::outcome::{failure, success};

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refusing to serialize"))
        }
    }

    #[test]
    fn success_uses_requested_status_and_serialised_body() {
        let response = respond(success::<_, AppError>(vec![1, 2]), CREATED);
        assert_eq!(response.status, 201);
        assert_eq!(response.body, json!([1, 2]));
        assert!(response.is_success());
    }

    #[test]
    fn failures_map_to_their_status_and_code() {
        let response = respond(failure::<(), _>(AppError::not_found("User", 9)), OK);
        assert_eq!(response.status, 404);
        assert_eq!(
            response.body,
            json!({"error": {"code": "NOT_FOUND", "message": "User with id 9 was not found"}})
        );

        let conflict = respond(failure::<(), _>(AppError::duplicate("email", "a@b.io")), OK);
        assert_eq!(conflict.status, 409);
        assert!(!conflict.is_success());
    }

    #[test]
    fn unserializable_payload_is_a_server_error() {
        let response = respond(success::<_, AppError>(Unserializable), OK);
        assert_eq!(response.status, 500);
        assert_eq!(response.body["error"]["code"], "SERIALIZATION_ERROR");
    }

    #[test]
    fn rich_errors_carry_metadata() {
        let rich = RichError::new(AppError::insufficient_stock("Laptop", 10, 5))
            .with_meta("product_id", 1)
            .with_meta("retryable", false);
        let response = respond_rich(failure::<(), _>(rich), OK);

        assert_eq!(response.status, 400);
        assert_eq!(response.body["error"]["code"], "INSUFFICIENT_STOCK");
        assert_eq!(
            response.body["error"]["metadata"],
            json!({"product_id": 1, "retryable": false})
        );

        let plain = respond_rich(failure::<(), _>(RichError::new(AppError::generic("X", "y"))), OK);
        assert!(plain.body["error"].get("metadata").is_none());
    }
}
