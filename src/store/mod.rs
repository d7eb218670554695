//! Remote document store boundary.
//!
//! The store is the single writer of record: commands issue writes through
//! [`DocumentStore`] and observe their effect only through the next push
//! notification. Multi-document changes (join approval, cascading deletes)
//! go through one atomic [`WriteBatch`]; a batch may carry revision guards
//! so that check-and-set sequences lose cleanly instead of overshooting.

pub mod memory;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;

/// The logical collections the organizer works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Participants,
    Teams,
    Applications,
    Settings,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Participants,
        Collection::Teams,
        Collection::Applications,
        Collection::Settings,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Participants => "participants",
            Collection::Teams => "teams",
            Collection::Applications => "applications",
            Collection::Settings => "settings",
        }
    }
}

/// One stored document: identifier, store-assigned revision, JSON body.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub rev: u64,
    pub body: Value,
}

/// Push payload: the full replacement document set of one collection.
#[derive(Debug, Clone)]
pub struct CollectionUpdate {
    pub collection: Collection,
    pub docs: Vec<Document>,
}

/// Push-based subscription interface. Observers receive the current snapshot
/// of every collection on registration and a replacement set after each
/// committed write.
pub trait StoreObserver: Send + Sync {
    fn collection_changed(&self, update: CollectionUpdate);
}

#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Insert a new document under a caller-chosen id.
    Add {
        collection: Collection,
        id: Uuid,
        body: Value,
    },
    /// Merge the top-level keys of `patch` into an existing document.
    Update {
        collection: Collection,
        id: Uuid,
        patch: Value,
    },
    Delete {
        collection: Collection,
        id: Uuid,
    },
}

#[derive(Debug, Clone)]
pub enum Precondition {
    /// The document must still be at exactly this revision.
    RevisionIs {
        collection: Collection,
        id: Uuid,
        rev: u64,
    },
}

/// An atomic group of writes: either every op commits or none does.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    pub guards: Vec<Precondition>,
    pub ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        WriteBatch::default()
    }

    pub fn guard_revision(&mut self, collection: Collection, id: Uuid, rev: u64) {
        self.guards
            .push(Precondition::RevisionIs { collection, id, rev });
    }

    pub fn add(&mut self, collection: Collection, id: Uuid, body: Value) {
        self.ops.push(WriteOp::Add { collection, id, body });
    }

    pub fn update(&mut self, collection: Collection, id: Uuid, patch: Value) {
        self.ops.push(WriteOp::Update { collection, id, patch });
    }

    pub fn delete(&mut self, collection: Collection, id: Uuid) {
        self.ops.push(WriteOp::Delete { collection, id });
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {id} not found in {collection:?}")]
    NotFound { collection: Collection, id: Uuid },

    #[error("document {id} already exists in {collection:?}")]
    AlreadyExists { collection: Collection, id: Uuid },

    #[error("revision guard failed for {id} in {collection:?}")]
    RevisionMismatch { collection: Collection, id: Uuid },

    #[error("store unreachable: {0}")]
    Unavailable(String),
}

/// Subscribe / add / update / delete primitives over the remote store.
///
/// `add`, `update` and `delete` are conveniences over [`apply_batch`]; an
/// implementation only has to provide the batch, snapshot and subscribe
/// entry points.
///
/// [`apply_batch`]: DocumentStore::apply_batch
#[allow(async_fn_in_trait)]
pub trait DocumentStore: Send + Sync {
    async fn apply_batch(&self, batch: WriteBatch) -> Result<(), StoreError>;

    async fn snapshot(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    fn subscribe(&self, observer: Arc<dyn StoreObserver>);

    async fn add(&self, collection: Collection, body: Value) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let mut batch = WriteBatch::new();
        batch.add(collection, id, body);
        self.apply_batch(batch).await?;
        Ok(id)
    }

    async fn update(&self, collection: Collection, id: Uuid, patch: Value) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();
        batch.update(collection, id, patch);
        self.apply_batch(batch).await
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();
        batch.delete(collection, id);
        self.apply_batch(batch).await
    }
}
