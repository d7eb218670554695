//! Error taxonomy shared by every command handler.
//!
//! Four classes: validation (rejected before any write), authorization,
//! state conflict and store failure. Lookup failures never appear here;
//! optional enrichment degrades to sentinel values instead of failing the
//! command. Nothing is retried automatically.

use thiserror::Error;

use crate::images::UploadError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{field} must not be empty")]
    MissingField { field: &'static str },

    #[error("malformed {field}: {reason}")]
    Malformed { field: &'static str, reason: String },

    #[error("not permitted: {0}")]
    Unauthorized(&'static str),

    #[error(transparent)]
    Conflict(#[from] Conflict),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("image upload failed: {0}")]
    Upload(#[from] UploadError),
}

/// A command that was valid in shape but clashes with current state.
#[derive(Debug, Error)]
pub enum Conflict {
    #[error("session already owns a participant")]
    AlreadyRegistered,

    #[error("session does not own a participant")]
    NotRegistered,

    #[error("participant already belongs to a team")]
    AlreadyOnTeam,

    #[error("participant is not on a team")]
    NotOnTeam,

    #[error("session already created a team")]
    AlreadyCreatedTeam,

    #[error("a pending application to this team already exists")]
    DuplicateApplication,

    #[error("team is at full capacity")]
    TeamFull,

    #[error("application has already been decided")]
    AlreadyDecided,

    #[error("no such team")]
    UnknownTeam,

    #[error("no such participant")]
    UnknownParticipant,

    #[error("no such application")]
    UnknownApplication,

    #[error("state changed concurrently, re-check and try again")]
    Concurrent,
}
