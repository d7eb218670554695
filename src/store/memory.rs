//! In-memory document store for tests and single-process use.
//!
//! Batches are serialized behind one write lock, which is the same guarantee
//! the hosted store gives per document set. Observers are notified inline,
//! so by the time a write future resolves every subscriber has seen the
//! replacement snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use super::{
    Collection, CollectionUpdate, Document, DocumentStore, Precondition, StoreError,
    StoreObserver, WriteBatch, WriteOp,
};

#[derive(Default)]
struct Tables {
    participants: DashMap<Uuid, Document>,
    teams: DashMap<Uuid, Document>,
    applications: DashMap<Uuid, Document>,
    settings: DashMap<Uuid, Document>,
}

impl Tables {
    fn table(&self, collection: Collection) -> &DashMap<Uuid, Document> {
        match collection {
            Collection::Participants => &self.participants,
            Collection::Teams => &self.teams,
            Collection::Applications => &self.applications,
            Collection::Settings => &self.settings,
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Tables,
    observers: Mutex<Vec<Arc<dyn StoreObserver>>>,
    /// Writer lock: one batch commits at a time.
    commit: Mutex<()>,
    next_rev: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn collection_docs(&self, collection: Collection) -> Vec<Document> {
        let mut docs: Vec<Document> = self
            .tables
            .table(collection)
            .iter()
            .map(|e| e.value().clone())
            .collect();
        docs.sort_by_key(|d| d.id);
        docs
    }

    fn notify(&self, collections: &[Collection]) {
        let observers: Vec<Arc<dyn StoreObserver>> =
            self.observers.lock().expect("observer list poisoned").clone();
        for &collection in collections {
            let docs = self.collection_docs(collection);
            for obs in &observers {
                obs.collection_changed(CollectionUpdate { collection, docs: docs.clone() });
            }
        }
    }

    fn check(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        for guard in &batch.guards {
            let Precondition::RevisionIs { collection, id, rev } = guard;
            match self.tables.table(*collection).get(id) {
                Some(doc) if doc.rev == *rev => {}
                _ => {
                    return Err(StoreError::RevisionMismatch {
                        collection: *collection,
                        id: *id,
                    })
                }
            }
        }
        for op in &batch.ops {
            match op {
                WriteOp::Add { collection, id, .. } => {
                    if self.tables.table(*collection).contains_key(id) {
                        return Err(StoreError::AlreadyExists {
                            collection: *collection,
                            id: *id,
                        });
                    }
                }
                WriteOp::Update { collection, id, .. } | WriteOp::Delete { collection, id } => {
                    if !self.tables.table(*collection).contains_key(id) {
                        return Err(StoreError::NotFound {
                            collection: *collection,
                            id: *id,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn apply(&self, op: WriteOp) -> Collection {
        match op {
            WriteOp::Add { collection, id, body } => {
                let rev = self.next_rev.fetch_add(1, Ordering::SeqCst) + 1;
                self.tables
                    .table(collection)
                    .insert(id, Document { id, rev, body });
                collection
            }
            WriteOp::Update { collection, id, patch } => {
                if let Some(mut doc) = self.tables.table(collection).get_mut(&id) {
                    doc.rev = self.next_rev.fetch_add(1, Ordering::SeqCst) + 1;
                    match (&mut doc.body, patch) {
                        (Value::Object(body), Value::Object(patch)) => {
                            for (k, v) in patch {
                                body.insert(k, v);
                            }
                        }
                        (body, patch) => *body = patch,
                    }
                }
                collection
            }
            WriteOp::Delete { collection, id } => {
                self.tables.table(collection).remove(&id);
                collection
            }
        }
    }
}

impl DocumentStore for MemoryStore {
    async fn apply_batch(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let _commit = self.commit.lock().expect("commit lock poisoned");

        // Validate everything up front so a failed batch changes nothing.
        self.check(&batch)?;

        let mut touched = Vec::new();
        for op in batch.ops {
            let collection = self.apply(op);
            if !touched.contains(&collection) {
                touched.push(collection);
            }
        }
        self.notify(&touched);
        Ok(())
    }

    async fn snapshot(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        Ok(self.collection_docs(collection))
    }

    fn subscribe(&self, observer: Arc<dyn StoreObserver>) {
        self.observers
            .lock()
            .expect("observer list poisoned")
            .push(observer.clone());
        // Initial snapshot delivery, matching the hosted store's behaviour.
        for collection in Collection::ALL {
            observer.collection_changed(CollectionUpdate {
                collection,
                docs: self.collection_docs(collection),
            });
        }
    }
}
