//! Team lifecycle: create, logo upload, leave, organizer removal.

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::error::{CommandError, Conflict};
use crate::images::ImageHost;
use crate::mirror::Mirror;
use crate::model::{ApplicationStatus, ParticipantStatus, Team};
use crate::rating::team_average;
use crate::session::Session;
use crate::store::{Collection, DocumentStore, WriteBatch};

use super::{body_of, map_store_err};

#[derive(Debug, Clone)]
pub struct CreateTeamRequest {
    pub name: String,
    /// Already-hosted logo reference, if the caller uploaded one first.
    pub logo_url: Option<String>,
}

/// Create a team with the calling session's participant as captain and sole
/// member. One team per creator, and the founder must be teamless.
pub async fn create_team<S: DocumentStore>(
    store: &S,
    mirror: &Mirror,
    session: &Session,
    req: CreateTeamRequest,
) -> Result<Uuid, CommandError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(CommandError::MissingField { field: "team name" });
    }
    let founder = mirror
        .participant_owned_by(&session.user)
        .ok_or(Conflict::NotRegistered)?;
    if mirror.team_of(founder.id).is_some() {
        return Err(Conflict::AlreadyOnTeam.into());
    }
    if mirror.teams().iter().any(|t| t.created_by == session.user) {
        return Err(Conflict::AlreadyCreatedTeam.into());
    }

    let id = Uuid::new_v4();
    let team = Team {
        id,
        rev: 0,
        name: name.to_owned(),
        logo_url: req.logo_url,
        members: vec![founder.id],
        captain: founder.id,
        average_rating: founder.rating,
        created_by: session.user.clone(),
        created_at: Utc::now(),
    };

    let mut batch = WriteBatch::new();
    batch.guard_revision(Collection::Participants, founder.id, founder.rev);
    batch.add(Collection::Teams, id, body_of(&team));
    batch.update(
        Collection::Participants,
        founder.id,
        json!({ "status": ParticipantStatus::Captain }),
    );
    store.apply_batch(batch).await.map_err(map_store_err)?;
    log::info!("team {name} created by {}", founder.name);
    Ok(id)
}

/// Upload a logo through the image host and attach the returned URL to the
/// team. Captain or organizer only.
pub async fn set_logo<S: DocumentStore, H: ImageHost>(
    store: &S,
    mirror: &Mirror,
    images: &H,
    session: &Session,
    team_id: Uuid,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<String, CommandError> {
    let team = mirror.team(team_id).ok_or(Conflict::UnknownTeam)?;
    let caller = mirror.participant_owned_by(&session.user);
    let is_captain = caller.map(|c| c.id) == Some(team.captain);
    if !session.elevated && !is_captain {
        return Err(CommandError::Unauthorized(
            "only the captain or an organizer may change the logo",
        ));
    }

    let url = images.upload(filename, bytes).await?;
    store
        .update(Collection::Teams, team.id, json!({ "logo_url": url }))
        .await
        .map_err(map_store_err)?;
    Ok(url)
}

/// Leave the caller's team. The emptied team is deleted; a departing
/// captain hands over to the first remaining member.
pub async fn leave_team<S: DocumentStore>(
    store: &S,
    mirror: &Mirror,
    session: &Session,
) -> Result<(), CommandError> {
    let caller = mirror
        .participant_owned_by(&session.user)
        .ok_or(Conflict::NotRegistered)?;
    let team = mirror.team_of(caller.id).ok_or(Conflict::NotOnTeam)?;

    let mut batch = WriteBatch::new();
    push_departure(&mut batch, mirror, &team, caller.id);
    batch.update(
        Collection::Participants,
        caller.id,
        json!({ "status": ParticipantStatus::SeekingTeam }),
    );
    store.apply_batch(batch).await.map_err(map_store_err)?;
    log::info!("{} left team {}", caller.name, team.name);
    Ok(())
}

/// Organizer-only team deletion: frees every member and drops pending
/// applications to the team, atomically.
pub async fn remove_team<S: DocumentStore>(
    store: &S,
    mirror: &Mirror,
    session: &Session,
    team_id: Uuid,
) -> Result<(), CommandError> {
    if !session.elevated {
        return Err(CommandError::Unauthorized(
            "only an organizer may remove a team",
        ));
    }
    let team = mirror.team(team_id).ok_or(Conflict::UnknownTeam)?;

    let mut batch = WriteBatch::new();
    batch.delete(Collection::Teams, team.id);
    for member in &team.members {
        if mirror.participant(*member).is_some() {
            batch.update(
                Collection::Participants,
                *member,
                json!({ "status": ParticipantStatus::SeekingTeam }),
            );
        }
    }
    for app in mirror.applications() {
        if app.team_id == team.id && app.status == ApplicationStatus::Pending {
            batch.delete(Collection::Applications, app.id);
        }
    }
    store.apply_batch(batch).await.map_err(map_store_err)?;
    log::info!("organizer removed team {}", team.name);
    Ok(())
}

/// Append the ops that take `departing` out of `team`: delete the team when
/// it empties, otherwise fix membership, captaincy and the stored average.
/// Guards on the team revision so concurrent membership changes lose.
pub(crate) fn push_departure(batch: &mut WriteBatch, mirror: &Mirror, team: &Team, departing: Uuid) {
    batch.guard_revision(Collection::Teams, team.id, team.rev);

    let remaining: Vec<Uuid> = team
        .members
        .iter()
        .copied()
        .filter(|m| *m != departing)
        .collect();
    if remaining.is_empty() {
        batch.delete(Collection::Teams, team.id);
        return;
    }

    let mut captain = team.captain;
    if captain == departing {
        captain = remaining[0];
        batch.update(
            Collection::Participants,
            captain,
            json!({ "status": ParticipantStatus::Captain }),
        );
    }
    let average = team_average(&mirror.participants(), &remaining);
    batch.update(
        Collection::Teams,
        team.id,
        json!({ "members": remaining, "captain": captain, "average_rating": average }),
    );
}
