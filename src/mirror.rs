//! Read-only mirror of the remote collections.
//!
//! On every push the mirror throws away its previous snapshot of the
//! affected collection and decodes the notified set, then tells its own
//! subscribers which slice changed. All mutations travel through the
//! command handlers and come back around via the store; the mirror never
//! merges and never mutates optimistically.

use std::sync::{Arc, Mutex, RwLock};

use uuid::Uuid;

use crate::model::{Application, Participant, Rules, Team};
use crate::store::{Collection, CollectionUpdate, DocumentStore, StoreObserver};

/// Which mirrored slice a change event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Participants,
    Teams,
    Applications,
    Rules,
}

/// Subscribers of the mirror's change feed (derived-rating tracker, view).
pub trait MirrorObserver: Send + Sync {
    fn mirror_changed(&self, change: Change);
}

#[derive(Debug, Default, Clone)]
struct Snapshot {
    participants: Vec<Participant>,
    teams: Vec<Team>,
    applications: Vec<Application>,
    rules: Option<Rules>,
}

#[derive(Default)]
pub struct Mirror {
    state: RwLock<Snapshot>,
    observers: Mutex<Vec<Arc<dyn MirrorObserver>>>,
}

impl Mirror {
    /// Build a mirror and register it with the store; the store's initial
    /// snapshot delivery populates it before this returns.
    pub fn attach<S: DocumentStore>(store: &S) -> Arc<Mirror> {
        let mirror = Arc::new(Mirror::default());
        store.subscribe(mirror.clone());
        mirror
    }

    pub fn subscribe(&self, observer: Arc<dyn MirrorObserver>) {
        self.observers
            .lock()
            .expect("observer list poisoned")
            .push(observer);
    }

    pub fn participants(&self) -> Vec<Participant> {
        self.state.read().expect("mirror poisoned").participants.clone()
    }

    pub fn teams(&self) -> Vec<Team> {
        self.state.read().expect("mirror poisoned").teams.clone()
    }

    pub fn applications(&self) -> Vec<Application> {
        self.state.read().expect("mirror poisoned").applications.clone()
    }

    pub fn rules(&self) -> Option<Rules> {
        self.state.read().expect("mirror poisoned").rules.clone()
    }

    pub fn participant(&self, id: Uuid) -> Option<Participant> {
        self.state
            .read()
            .expect("mirror poisoned")
            .participants
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// The participant record owned by the given session identifier, if any.
    pub fn participant_owned_by(&self, owner: &str) -> Option<Participant> {
        self.state
            .read()
            .expect("mirror poisoned")
            .participants
            .iter()
            .find(|p| p.owner == owner)
            .cloned()
    }

    pub fn team(&self, id: Uuid) -> Option<Team> {
        self.state
            .read()
            .expect("mirror poisoned")
            .teams
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    /// The team the given participant is a member of, if any.
    pub fn team_of(&self, participant: Uuid) -> Option<Team> {
        self.state
            .read()
            .expect("mirror poisoned")
            .teams
            .iter()
            .find(|t| t.members.contains(&participant))
            .cloned()
    }

    pub fn application(&self, id: Uuid) -> Option<Application> {
        self.state
            .read()
            .expect("mirror poisoned")
            .applications
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    fn notify(&self, change: Change) {
        let observers: Vec<Arc<dyn MirrorObserver>> =
            self.observers.lock().expect("observer list poisoned").clone();
        for obs in observers {
            obs.mirror_changed(change);
        }
    }
}

impl StoreObserver for Mirror {
    fn collection_changed(&self, update: CollectionUpdate) {
        let change = {
            let mut state = self.state.write().expect("mirror poisoned");
            match update.collection {
                Collection::Participants => {
                    let mut decoded: Vec<Participant> =
                        update.docs.iter().filter_map(Participant::from_doc).collect();
                    decoded.sort_by_key(|p| (p.created_at, p.id));
                    state.participants = decoded;
                    Change::Participants
                }
                Collection::Teams => {
                    let mut decoded: Vec<Team> =
                        update.docs.iter().filter_map(Team::from_doc).collect();
                    decoded.sort_by_key(|t| (t.created_at, t.id));
                    state.teams = decoded;
                    Change::Teams
                }
                Collection::Applications => {
                    let mut decoded: Vec<Application> =
                        update.docs.iter().filter_map(Application::from_doc).collect();
                    decoded.sort_by_key(|a| (a.created_at, a.id));
                    state.applications = decoded;
                    Change::Applications
                }
                Collection::Settings => {
                    state.rules = update.docs.first().and_then(Rules::from_doc);
                    Change::Rules
                }
            }
        };
        // Lock released before fan-out so subscribers may read back.
        self.notify(change);
    }
}
