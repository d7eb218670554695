//! Skill ratings: the derived team average and the external stat lookup.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};

use serde_json::Value;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::config::Settings;
use crate::mirror::{Change, Mirror, MirrorObserver};
use crate::model::{Participant, Platform, UNRANKED};

/// Tracker playlist id of the ranked standard queue.
const RANKED_STANDARD: i64 = 13;

/// Rounded mean of the given ratings; an empty team averages to zero.
pub fn average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    (sum as f64 / ratings.len() as f64).round() as i32
}

/// Average for a member list resolved against the participant snapshot.
/// Members missing from the snapshot count as zero.
pub fn team_average(participants: &[Participant], members: &[Uuid]) -> i32 {
    let ratings: Vec<i32> = members
        .iter()
        .map(|id| {
            participants
                .iter()
                .find(|p| p.id == *id)
                .map(|p| p.rating)
                .unwrap_or(0)
        })
        .collect();
    average_rating(&ratings)
}

/// Keeps every team's derived average current by subscribing to the
/// mirror's change feed.
pub struct TeamAverages {
    mirror: Weak<Mirror>,
    averages: RwLock<HashMap<Uuid, i32>>,
}

impl TeamAverages {
    pub fn attach(mirror: &Arc<Mirror>) -> Arc<TeamAverages> {
        let tracker = Arc::new(TeamAverages {
            mirror: Arc::downgrade(mirror),
            averages: RwLock::new(HashMap::new()),
        });
        mirror.subscribe(tracker.clone());
        tracker.recompute();
        tracker
    }

    pub fn of(&self, team: Uuid) -> Option<i32> {
        self.averages
            .read()
            .expect("averages poisoned")
            .get(&team)
            .copied()
    }

    fn recompute(&self) {
        let Some(mirror) = self.mirror.upgrade() else {
            return;
        };
        let participants = mirror.participants();
        let next: HashMap<Uuid, i32> = mirror
            .teams()
            .iter()
            .map(|t| (t.id, team_average(&participants, &t.members)))
            .collect();
        *self.averages.write().expect("averages poisoned") = next;
    }
}

impl MirrorObserver for TeamAverages {
    fn mirror_changed(&self, change: Change) {
        if matches!(change, Change::Participants | Change::Teams) {
            self.recompute();
        }
    }
}

/// What the external tracker knows about a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingInfo {
    pub rating: i32,
    pub rank: String,
}

impl RatingInfo {
    /// Sentinel used whenever the lookup is unavailable or fails.
    pub fn unranked() -> Self {
        RatingInfo {
            rating: 0,
            rank: UNRANKED.to_owned(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("lookup request failed: {0}")]
    Request(String),

    #[error("profile not found")]
    NotFound,

    #[error("malformed stats payload")]
    Malformed,
}

/// External stat-lookup collaborator. Callers degrade every error to
/// [`RatingInfo::unranked`]; nothing in registration depends on success.
#[allow(async_fn_in_trait)]
pub trait RatingLookup: Send + Sync {
    async fn lookup(&self, platform: Platform, profile: &Url) -> Result<RatingInfo, LookupError>;
}

/// HTTP client for the hosted stat tracker.
pub struct TrackerClient {
    http: reqwest::Client,
    base: String,
    api_key: Option<String>,
}

impl TrackerClient {
    pub fn new(settings: &Settings) -> Self {
        TrackerClient {
            http: reqwest::Client::new(),
            base: settings.tracker_base.trim_end_matches('/').to_owned(),
            api_key: settings.tracker_api_key.clone(),
        }
    }
}

impl RatingLookup for TrackerClient {
    async fn lookup(&self, platform: Platform, profile: &Url) -> Result<RatingInfo, LookupError> {
        // The profile handle is the last path segment of the tracker link.
        let handle = profile
            .path_segments()
            .and_then(|mut s| s.next_back())
            .filter(|s| !s.is_empty())
            .ok_or(LookupError::Malformed)?;

        let endpoint = format!("{}/standard/profile/{}/{}", self.base, platform, handle);
        let mut req = self.http.get(&endpoint);
        if let Some(key) = &self.api_key {
            req = req.header("TRN-Api-Key", key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| LookupError::Request(e.to_string()))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound);
        }
        if !resp.status().is_success() {
            return Err(LookupError::Request(format!("status {}", resp.status())));
        }

        let payload: Value = resp.json().await.map_err(|_| LookupError::Malformed)?;
        let segments = payload["data"]["segments"]
            .as_array()
            .ok_or(LookupError::Malformed)?;
        let standard = segments
            .iter()
            .find(|s| s["attributes"]["playlistId"].as_i64() == Some(RANKED_STANDARD))
            .ok_or(LookupError::Malformed)?;

        let rating = standard["stats"]["rating"]["value"]
            .as_f64()
            .ok_or(LookupError::Malformed)?
            .round() as i32;
        let rank = standard["stats"]["tier"]["metadata"]["name"]
            .as_str()
            .unwrap_or(UNRANKED)
            .to_owned();

        Ok(RatingInfo { rating, rank })
    }
}
