#![allow(dead_code)]

use url::Url;
use uuid::Uuid;

use nitrocup_core::commands::registration::{register, RegisterRequest};
use nitrocup_core::config::Settings;
use nitrocup_core::images::{ImageHost, UploadError};
use nitrocup_core::mirror::Mirror;
use nitrocup_core::model::Platform;
use nitrocup_core::rating::{LookupError, RatingInfo, RatingLookup};
use nitrocup_core::session::Session;
use nitrocup_core::store::MemoryStore;

/// Surface core logs in test output when RUST_LOG is set.
pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Fixed settings so tests never depend on the environment.
pub fn settings() -> Settings {
    Settings {
        team_cap: 3,
        access_codes: vec!["rocket-admin".to_owned()],
        tracker_base: "https://tracker.invalid/api".to_owned(),
        tracker_api_key: None,
        upload_endpoint: "https://img.invalid/upload".to_owned(),
        upload_preset: "team-logo-upload".to_owned(),
        store_url: None,
        store_api_key: None,
    }
}

pub fn player(email: &str) -> Session {
    Session {
        user: email.to_owned(),
        elevated: false,
    }
}

pub fn organizer() -> Session {
    Session::organizer()
}

/// Lookup stub: `Some` answers with that info, `None` fails every call.
pub struct StubLookup(pub Option<RatingInfo>);

impl RatingLookup for StubLookup {
    async fn lookup(&self, _platform: Platform, _profile: &Url) -> Result<RatingInfo, LookupError> {
        match &self.0 {
            Some(info) => Ok(info.clone()),
            None => Err(LookupError::Request("tracker offline".to_owned())),
        }
    }
}

pub struct StubImages;

impl ImageHost for StubImages {
    async fn upload(&self, filename: &str, _bytes: Vec<u8>) -> Result<String, UploadError> {
        Ok(format!("https://img.example/{filename}"))
    }
}

/// Register a participant whose tracker lookup reports the given rating.
pub async fn register_rated(
    store: &MemoryStore,
    mirror: &Mirror,
    email: &str,
    name: &str,
    rating: i32,
) -> Uuid {
    let lookup = StubLookup(Some(RatingInfo {
        rating,
        rank: "Champion I".to_owned(),
    }));
    register(
        store,
        mirror,
        &lookup,
        &player(email),
        RegisterRequest {
            name: name.to_owned(),
            tag: name.to_lowercase(),
            platform: Platform::Steam,
            profile_link: Some(format!("https://tracker.example/profile/steam/{name}")),
            rank_override: None,
        },
    )
    .await
    .expect("registration failed")
}
