//! Document shapes for the three mirrored collections plus the rules text.
//!
//! Decoding is deliberately lenient: the store may hold documents written by
//! older revisions of the organizer, so a missing or unparseable rating reads
//! as zero and an unknown status falls back to its default instead of
//! rejecting the whole document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::store::Document;

pub const UNRANKED: &str = "Unranked";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Steam,
    Epic,
    Psn,
    Xbl,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Steam => "steam",
            Platform::Epic => "epic",
            Platform::Psn => "psn",
            Platform::Xbl => "xbl",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ParticipantStatus {
    #[default]
    SeekingTeam,
    Captain,
    InTeam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    #[serde(skip)]
    pub id: Uuid,
    #[serde(skip)]
    pub rev: u64,
    pub name: String,
    pub tag: String,
    #[serde(default, deserialize_with = "de_platform")]
    pub platform: Platform,
    #[serde(default)]
    pub profile_link: Option<String>,
    #[serde(default, deserialize_with = "de_rating")]
    pub rating: i32,
    #[serde(default = "unranked")]
    pub rank: String,
    pub owner: String,
    #[serde(default, deserialize_with = "de_participant_status")]
    pub status: ParticipantStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(skip)]
    pub id: Uuid,
    #[serde(skip)]
    pub rev: u64,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Member participant ids in join order; the first is promoted when the
    /// captain leaves.
    #[serde(default)]
    pub members: Vec<Uuid>,
    pub captain: Uuid,
    #[serde(default, deserialize_with = "de_rating")]
    pub average_rating: i32,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    #[serde(skip)]
    pub id: Uuid,
    #[serde(skip)]
    pub rev: u64,
    pub team_id: Uuid,
    pub participant_id: Uuid,
    #[serde(default, deserialize_with = "de_application_status")]
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
}

/// The single settings document holding the tournament rules markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rules {
    pub html: String,
    pub updated_at: DateTime<Utc>,
}

fn unranked() -> String {
    UNRANKED.to_owned()
}

fn de_rating<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Number(n) => n.as_f64().map(|f| f.round() as i32).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn de_platform<'de, D: Deserializer<'de>>(d: D) -> Result<Platform, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(serde_json::from_value(v).unwrap_or_default())
}

fn de_participant_status<'de, D: Deserializer<'de>>(d: D) -> Result<ParticipantStatus, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(serde_json::from_value(v).unwrap_or_default())
}

fn de_application_status<'de, D: Deserializer<'de>>(d: D) -> Result<ApplicationStatus, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(serde_json::from_value(v).unwrap_or_default())
}

fn decode<T: serde::de::DeserializeOwned>(doc: &Document) -> Option<T> {
    match serde_json::from_value(doc.body.clone()) {
        Ok(t) => Some(t),
        Err(e) => {
            log::warn!("skipping undecodable document {}: {e}", doc.id);
            None
        }
    }
}

impl Participant {
    pub fn from_doc(doc: &Document) -> Option<Self> {
        decode::<Participant>(doc).map(|mut p| {
            p.id = doc.id;
            p.rev = doc.rev;
            p
        })
    }
}

impl Team {
    pub fn from_doc(doc: &Document) -> Option<Self> {
        decode::<Team>(doc).map(|mut t| {
            t.id = doc.id;
            t.rev = doc.rev;
            t
        })
    }
}

impl Application {
    pub fn from_doc(doc: &Document) -> Option<Self> {
        decode::<Application>(doc).map(|mut a| {
            a.id = doc.id;
            a.rev = doc.rev;
            a
        })
    }
}

impl Rules {
    pub fn from_doc(doc: &Document) -> Option<Self> {
        decode(doc)
    }
}
