//! Join-application workflow: pending -> approved | rejected, nothing else.

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::config::Settings;
use crate::error::{CommandError, Conflict};
use crate::mirror::Mirror;
use crate::model::{Application, ApplicationStatus, ParticipantStatus, Team};
use crate::rating::team_average;
use crate::session::Session;
use crate::store::{Collection, DocumentStore, WriteBatch};

use super::{body_of, map_store_err};

/// Ask to join a team. Requires a teamless caller and no other pending
/// application to the same team; earlier rejections don't block a new try.
pub async fn apply<S: DocumentStore>(
    store: &S,
    mirror: &Mirror,
    session: &Session,
    team_id: Uuid,
) -> Result<Uuid, CommandError> {
    let caller = mirror
        .participant_owned_by(&session.user)
        .ok_or(Conflict::NotRegistered)?;
    let team = mirror.team(team_id).ok_or(Conflict::UnknownTeam)?;
    if mirror.team_of(caller.id).is_some() {
        return Err(Conflict::AlreadyOnTeam.into());
    }
    let duplicate = mirror.applications().iter().any(|a| {
        a.participant_id == caller.id
            && a.team_id == team.id
            && a.status == ApplicationStatus::Pending
    });
    if duplicate {
        return Err(Conflict::DuplicateApplication.into());
    }

    let id = Uuid::new_v4();
    let application = Application {
        id,
        rev: 0,
        team_id: team.id,
        participant_id: caller.id,
        status: ApplicationStatus::Pending,
        created_at: Utc::now(),
        decided_at: None,
    };
    let mut batch = WriteBatch::new();
    batch.add(Collection::Applications, id, body_of(&application));
    store.apply_batch(batch).await.map_err(map_store_err)?;
    log::info!("{} applied to join {}", caller.name, team.name);
    Ok(id)
}

/// Approve a pending application. Captain only; refused outright when the
/// team is at the cap (the application stays pending, nothing changes).
/// Membership, participant status and application status move in one batch
/// guarded on the team revision the captain validated against.
pub async fn approve<S: DocumentStore>(
    store: &S,
    mirror: &Mirror,
    session: &Session,
    settings: &Settings,
    application_id: Uuid,
) -> Result<(), CommandError> {
    let (app, team) = decidable(mirror, session, application_id)?;
    let applicant = mirror
        .participant(app.participant_id)
        .ok_or(Conflict::UnknownParticipant)?;
    if mirror.team_of(applicant.id).is_some() {
        return Err(Conflict::AlreadyOnTeam.into());
    }
    if team.members.len() >= settings.team_cap {
        return Err(Conflict::TeamFull.into());
    }

    let mut members = team.members.clone();
    members.push(applicant.id);
    let average = team_average(&mirror.participants(), &members);

    let mut batch = WriteBatch::new();
    batch.guard_revision(Collection::Teams, team.id, team.rev);
    batch.update(
        Collection::Teams,
        team.id,
        json!({ "members": members, "average_rating": average }),
    );
    batch.update(
        Collection::Participants,
        applicant.id,
        json!({ "status": ParticipantStatus::InTeam }),
    );
    batch.update(
        Collection::Applications,
        app.id,
        json!({ "status": ApplicationStatus::Approved, "decided_at": Utc::now() }),
    );
    store.apply_batch(batch).await.map_err(map_store_err)?;
    log::info!("{} joined {}", applicant.name, team.name);
    Ok(())
}

/// Reject a pending application. Captain only; terminal, no other change.
pub async fn reject<S: DocumentStore>(
    store: &S,
    mirror: &Mirror,
    session: &Session,
    application_id: Uuid,
) -> Result<(), CommandError> {
    let (app, _team) = decidable(mirror, session, application_id)?;
    store
        .update(
            Collection::Applications,
            app.id,
            json!({ "status": ApplicationStatus::Rejected, "decided_at": Utc::now() }),
        )
        .await
        .map_err(map_store_err)?;
    Ok(())
}

/// Shared approve/reject gate: the application must still be pending and
/// the caller must own the target team's captain.
fn decidable(
    mirror: &Mirror,
    session: &Session,
    application_id: Uuid,
) -> Result<(Application, Team), CommandError> {
    let app = mirror
        .application(application_id)
        .ok_or(Conflict::UnknownApplication)?;
    if app.status != ApplicationStatus::Pending {
        return Err(Conflict::AlreadyDecided.into());
    }
    let team = mirror.team(app.team_id).ok_or(Conflict::UnknownTeam)?;
    let caller = mirror.participant_owned_by(&session.user);
    if caller.map(|c| c.id) != Some(team.captain) {
        return Err(CommandError::Unauthorized(
            "only the team captain may decide applications",
        ));
    }
    Ok((app, team))
}
