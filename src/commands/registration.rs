//! Participant registration and removal.

use chrono::Utc;
use url::Url;
use uuid::Uuid;

use crate::error::{CommandError, Conflict};
use crate::mirror::Mirror;
use crate::model::{ApplicationStatus, Participant, ParticipantStatus, Platform};
use crate::rating::{RatingInfo, RatingLookup};
use crate::session::Session;
use crate::store::{Collection, DocumentStore, WriteBatch};

use super::{body_of, map_store_err, teams};

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub name: String,
    /// The caller's gamertag on the chosen platform.
    pub tag: String,
    pub platform: Platform,
    pub profile_link: Option<String>,
    /// Manual rank label; takes precedence over whatever the tracker says.
    pub rank_override: Option<String>,
}

/// Register the calling session as a participant. The stat lookup is best
/// effort: any failure degrades to the unranked sentinel and the
/// registration still goes through.
pub async fn register<S: DocumentStore, L: RatingLookup>(
    store: &S,
    mirror: &Mirror,
    lookup: &L,
    session: &Session,
    req: RegisterRequest,
) -> Result<Uuid, CommandError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(CommandError::MissingField { field: "name" });
    }
    let tag = req.tag.trim();
    if tag.is_empty() {
        return Err(CommandError::MissingField { field: "platform tag" });
    }
    if mirror.participant_owned_by(&session.user).is_some() {
        return Err(Conflict::AlreadyRegistered.into());
    }

    let link = match req.profile_link.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            Some(Url::parse(raw).map_err(|e| CommandError::Malformed {
                field: "profile link",
                reason: e.to_string(),
            })?)
        }
        _ => None,
    };

    let looked_up = match &link {
        Some(url) => match lookup.lookup(req.platform, url).await {
            Ok(info) => info,
            Err(e) => {
                log::warn!("stat lookup failed for {url}: {e}");
                RatingInfo::unranked()
            }
        },
        None => RatingInfo::unranked(),
    };
    let rank = req
        .rank_override
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_owned)
        .unwrap_or(looked_up.rank);

    let id = Uuid::new_v4();
    let participant = Participant {
        id,
        rev: 0,
        name: name.to_owned(),
        tag: tag.to_owned(),
        platform: req.platform,
        profile_link: link.map(|u| u.to_string()),
        rating: looked_up.rating,
        rank,
        owner: session.user.clone(),
        status: ParticipantStatus::SeekingTeam,
        created_at: Utc::now(),
    };

    let mut batch = WriteBatch::new();
    batch.add(Collection::Participants, id, body_of(&participant));
    store.apply_batch(batch).await.map_err(map_store_err)?;
    log::info!("registered {name} for session {}", session.user);
    Ok(id)
}

/// Delete a participant record. Allowed for the owning session and for an
/// elevated one; cascades over team membership and pending applications in
/// one atomic batch.
pub async fn remove_participant<S: DocumentStore>(
    store: &S,
    mirror: &Mirror,
    session: &Session,
    participant_id: Uuid,
) -> Result<(), CommandError> {
    let target = mirror
        .participant(participant_id)
        .ok_or(Conflict::UnknownParticipant)?;
    if !session.elevated && target.owner != session.user {
        return Err(CommandError::Unauthorized(
            "only the owner or an organizer may remove a participant",
        ));
    }

    let mut batch = WriteBatch::new();
    if let Some(team) = mirror.team_of(target.id) {
        teams::push_departure(&mut batch, mirror, &team, target.id);
    }
    for app in mirror.applications() {
        if app.participant_id == target.id && app.status == ApplicationStatus::Pending {
            batch.delete(Collection::Applications, app.id);
        }
    }
    batch.delete(Collection::Participants, target.id);

    store.apply_batch(batch).await.map_err(map_store_err)?;
    log::info!("removed participant {}", target.name);
    Ok(())
}
