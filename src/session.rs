//! Session handling: email-or-code login behind a pluggable repository.
//!
//! There is no password and no identity verification; this is a client-side
//! gate. An input matching one of the configured access codes grants an
//! elevated session bound to the fixed organizer identity, anything else
//! must at least look like an email address.

use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::CommandError;

/// Display identity every elevated session is bound to.
pub const ORGANIZER: &str = "organizer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: String,
    pub elevated: bool,
}

impl Session {
    pub fn organizer() -> Self {
        Session {
            user: ORGANIZER.to_owned(),
            elevated: true,
        }
    }
}

/// Durable storage for the current session. The medium (browser storage,
/// file, keychain) is the implementation's business.
pub trait SessionRepository: Send + Sync {
    fn load(&self) -> Option<Session>;
    fn save(&self, session: &Session);
    fn clear(&self);
}

/// Repository that lives and dies with the process; the test default.
#[derive(Default)]
pub struct MemorySessionRepository {
    slot: Mutex<Option<Session>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        MemorySessionRepository::default()
    }
}

impl<T: SessionRepository + ?Sized> SessionRepository for std::sync::Arc<T> {
    fn load(&self) -> Option<Session> {
        (**self).load()
    }

    fn save(&self, session: &Session) {
        (**self).save(session)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

impl SessionRepository for MemorySessionRepository {
    fn load(&self) -> Option<Session> {
        self.slot.lock().expect("session slot poisoned").clone()
    }

    fn save(&self, session: &Session) {
        *self.slot.lock().expect("session slot poisoned") = Some(session.clone());
    }

    fn clear(&self) {
        *self.slot.lock().expect("session slot poisoned") = None;
    }
}

pub struct SessionManager<R: SessionRepository> {
    repo: R,
    access_codes: Vec<String>,
    current: RwLock<Option<Session>>,
}

impl<R: SessionRepository> SessionManager<R> {
    /// Restores any persisted session, so a reload keeps the user signed in.
    pub fn new(repo: R, settings: &Settings) -> Self {
        let restored = repo.load();
        if let Some(s) = &restored {
            log::info!("restored session for {}", s.user);
        }
        SessionManager {
            repo,
            access_codes: settings.access_codes.clone(),
            current: RwLock::new(restored),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().expect("session poisoned").clone()
    }

    /// An access code always wins, whatever else the input looks like.
    pub fn login(&self, input: &str) -> Result<Session, CommandError> {
        let input = input.trim();
        let session = if self.access_codes.iter().any(|c| c == input) {
            Session::organizer()
        } else if is_email_shaped(input) {
            Session {
                user: input.to_owned(),
                elevated: false,
            }
        } else {
            return Err(CommandError::Malformed {
                field: "login",
                reason: "expected an email address or an access code".to_owned(),
            });
        };

        self.repo.save(&session);
        *self.current.write().expect("session poisoned") = Some(session.clone());
        log::info!(
            "login: {} ({})",
            session.user,
            if session.elevated { "organizer" } else { "player" }
        );
        Ok(session)
    }

    pub fn logout(&self) {
        self.repo.clear();
        *self.current.write().expect("session poisoned") = None;
    }
}

/// Basic shape check: one `@`, a non-empty local part and a dotted domain.
fn is_email_shaped(s: &str) -> bool {
    if s.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
}
