//! Command handlers: validate against the mirrored snapshot, write to the
//! store, let the next push notification surface the change. No command
//! retries; errors come back exactly once for user-facing messaging.

pub mod applications;
pub mod registration;
pub mod rules;
pub mod teams;

use serde::Serialize;
use serde_json::Value;

use crate::error::{CommandError, Conflict};
use crate::store::StoreError;

pub(crate) fn body_of<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).expect("model serialization is infallible")
}

/// A failed revision guard means someone else won the race; everything else
/// is a plain store failure.
pub(crate) fn map_store_err(e: StoreError) -> CommandError {
    match e {
        StoreError::RevisionMismatch { .. } => CommandError::Conflict(Conflict::Concurrent),
        other => CommandError::Store(other),
    }
}
