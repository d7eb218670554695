mod common;

use common::{player, register_rated, settings, StubLookup};

use nitrocup_core::commands::applications::{apply, approve};
use nitrocup_core::commands::registration::{register, RegisterRequest};
use nitrocup_core::commands::teams::{create_team, leave_team, CreateTeamRequest};
use nitrocup_core::mirror::Mirror;
use nitrocup_core::model::{Platform, UNRANKED};
use nitrocup_core::rating::{average_rating, team_average, RatingInfo, TeamAverages};
use nitrocup_core::store::MemoryStore;
use uuid::Uuid;

#[test]
fn average_is_the_rounded_mean() {
    assert_eq!(average_rating(&[1000, 1500]), 1250);
    assert_eq!(average_rating(&[1000, 1500, 800]), 1100);
    assert_eq!(average_rating(&[1, 2]), 2); // .5 rounds away from zero
    assert_eq!(average_rating(&[]), 0);
}

#[test]
fn unknown_members_count_as_zero() {
    // No participants decoded at all: every member reads as zero.
    assert_eq!(team_average(&[], &[Uuid::new_v4(), Uuid::new_v4()]), 0);
}

#[tokio::test]
async fn lookup_failure_degrades_to_the_unranked_sentinel() {
    let store = MemoryStore::new();
    let mirror = Mirror::attach(&store);

    let lookup = StubLookup(None); // every call fails
    let id = register(
        &store,
        &mirror,
        &lookup,
        &player("a@example.com"),
        RegisterRequest {
            name: "Apex".to_owned(),
            tag: "apex".to_owned(),
            platform: Platform::Steam,
            profile_link: Some("https://tracker.example/profile/steam/apex".to_owned()),
            rank_override: None,
        },
    )
    .await
    .expect("registration must survive a failed lookup");

    let p = mirror.participant(id).unwrap();
    assert_eq!(p.rating, 0);
    assert_eq!(p.rank, UNRANKED);
}

#[tokio::test]
async fn manual_rank_override_beats_the_tracker() {
    let store = MemoryStore::new();
    let mirror = Mirror::attach(&store);

    let lookup = StubLookup(Some(RatingInfo {
        rating: 1430,
        rank: "Diamond III".to_owned(),
    }));
    let id = register(
        &store,
        &mirror,
        &lookup,
        &player("a@example.com"),
        RegisterRequest {
            name: "Apex".to_owned(),
            tag: "apex".to_owned(),
            platform: Platform::Steam,
            profile_link: Some("https://tracker.example/profile/steam/apex".to_owned()),
            rank_override: Some("Champion I".to_owned()),
        },
    )
    .await
    .unwrap();

    let p = mirror.participant(id).unwrap();
    assert_eq!(p.rating, 1430);
    assert_eq!(p.rank, "Champion I");
}

#[tokio::test]
async fn team_averages_follow_membership_changes() {
    let store = MemoryStore::new();
    let mirror = Mirror::attach(&store);
    let averages = TeamAverages::attach(&mirror);
    let cfg = settings();

    register_rated(&store, &mirror, "a@example.com", "Apex", 1000).await;
    let team_id = create_team(
        &store,
        &mirror,
        &player("a@example.com"),
        CreateTeamRequest {
            name: "Night Shift".to_owned(),
            logo_url: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(averages.of(team_id), Some(1000));

    register_rated(&store, &mirror, "b@example.com", "Bolt", 1500).await;
    let app = apply(&store, &mirror, &player("b@example.com"), team_id)
        .await
        .unwrap();
    approve(&store, &mirror, &player("a@example.com"), &cfg, app)
        .await
        .unwrap();
    assert_eq!(averages.of(team_id), Some(1250));

    register_rated(&store, &mirror, "c@example.com", "Comet", 800).await;
    let app = apply(&store, &mirror, &player("c@example.com"), team_id)
        .await
        .unwrap();
    approve(&store, &mirror, &player("a@example.com"), &cfg, app)
        .await
        .unwrap();
    assert_eq!(averages.of(team_id), Some(1100));

    leave_team(&store, &mirror, &player("c@example.com"))
        .await
        .unwrap();
    assert_eq!(averages.of(team_id), Some(1250));
    // The redundantly stored value tracks the same number.
    assert_eq!(mirror.team(team_id).unwrap().average_rating, 1250);
}
