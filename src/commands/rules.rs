//! The tournament rules document. Whatever markup the rich-text editor
//! hands over is persisted verbatim and rendered as-is.

use chrono::Utc;
use uuid::Uuid;

use crate::error::CommandError;
use crate::mirror::Mirror;
use crate::model::Rules;
use crate::session::Session;
use crate::store::{Collection, DocumentStore, WriteBatch};

use super::{body_of, map_store_err};

/// Well-known id of the single rules document.
pub const RULES_DOC: Uuid = Uuid::nil();

/// Organizer-only: replace the rules markup.
pub async fn set_rules<S: DocumentStore>(
    store: &S,
    mirror: &Mirror,
    session: &Session,
    html: String,
) -> Result<(), CommandError> {
    if !session.elevated {
        return Err(CommandError::Unauthorized(
            "only an organizer may edit the rules",
        ));
    }

    let rules = Rules {
        html,
        updated_at: Utc::now(),
    };
    let mut batch = WriteBatch::new();
    if mirror.rules().is_some() {
        batch.update(Collection::Settings, RULES_DOC, body_of(&rules));
    } else {
        batch.add(Collection::Settings, RULES_DOC, body_of(&rules));
    }
    store.apply_batch(batch).await.map_err(map_store_err)?;
    Ok(())
}
