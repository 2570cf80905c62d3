use crate::algebra::{DocumentStore, SnapshotCallback, Subscription, WriteBatch};
use async_trait::async_trait;
use entities::{DispatchError, Document, Unit};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error};

/// Document store kept in process memory. Batches are applied to a staged copy that only
/// replaces the visible documents once every update has succeeded.
pub struct InMemoryStore<T> {
    state: Arc<Mutex<State<T>>>,
}

struct State<T> {
    documents: Vec<T>,
    subscribers: Vec<(u64, SnapshotCallback<T>)>,
    next_subscriber: u64,
    commits: usize,
    injected_failure: Option<usize>,
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> InMemoryStore<T> {
    pub fn new(documents: Vec<T>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                documents,
                subscribers: Vec::new(),
                next_subscriber: 0,
                commits: 0,
                injected_failure: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes the next commit fail after `applied` of its updates reached the staged copy.
    pub fn fail_next_commit_after(&self, applied: usize) {
        self.lock().injected_failure = Some(applied);
    }

    pub fn fail_next_commit(&self) {
        self.fail_next_commit_after(0);
    }

    /// Number of batches that were applied.
    pub fn commit_count(&self) -> usize {
        self.lock().commits
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

impl<T> InMemoryStore<T>
where
    T: Document + Clone,
{
    pub fn documents(&self) -> Vec<T> {
        self.lock().documents.clone()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.lock()
            .documents
            .iter()
            .find(|d| d.document_id() == id)
            .cloned()
    }

    /// Inserts or replaces a document and notifies subscribers.
    pub fn upsert(&self, document: T) {
        let (snapshot, subscribers) = {
            let mut state = self.lock();
            match state
                .documents
                .iter_mut()
                .find(|d| d.document_id() == document.document_id())
            {
                Some(existing) => *existing = document,
                None => state.documents.push(document),
            }
            (state.documents.clone(), subscriber_callbacks(&state))
        };

        notify(snapshot, subscribers);
    }
}

fn subscriber_callbacks<T>(state: &State<T>) -> Vec<SnapshotCallback<T>> {
    state.subscribers.iter().map(|(_, cb)| cb.clone()).collect()
}

fn notify<T: Clone>(snapshot: Vec<T>, subscribers: Vec<SnapshotCallback<T>>) {
    subscribers.iter().for_each(|cb| cb(snapshot.clone()));
}

/// Sets `path` (dot separated) inside `target`, creating intermediate objects.
pub fn set_path(target: &mut Value, path: &str, value: Value) -> Result<Unit, DispatchError> {
    let mut segments = path.split('.').peekable();
    let mut current = target;

    while let Some(segment) = segments.next() {
        let object = current.as_object_mut().ok_or_else(|| {
            DispatchError::persistence(&format!("Cannot set {path}: {segment} is not inside an object"))
        })?;

        if segments.peek().is_none() {
            object.insert(segment.to_string(), value);
            return Ok(());
        }

        current = object
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    Err(DispatchError::persistence("Empty field path"))
}

fn apply_batch<T>(
    documents: &[T],
    batch: &WriteBatch,
    fail_after: Option<usize>,
) -> Result<Vec<T>, DispatchError>
where
    T: Document + Clone + Serialize + DeserializeOwned,
{
    let mut staged = documents.to_vec();
    let mut applied = 0;

    for (document_id, updates) in batch.grouped() {
        let position = staged
            .iter()
            .position(|d| d.document_id() == document_id)
            .ok_or_else(|| {
                DispatchError::persistence(&format!("Document {document_id} not found"))
            })?;

        let mut value = serde_json::to_value(&staged[position])?;
        for update in updates {
            if fail_after == Some(applied) {
                return Err(DispatchError::persistence("Injected batch failure"));
            }
            set_path(&mut value, &update.field_path, update.value.clone())?;
            applied += 1;
        }

        staged[position] = serde_json::from_value(value).map_err(|e| {
            DispatchError::persistence(&format!("Update left {document_id} unreadable: {e}"))
        })?;
    }

    if fail_after.is_some_and(|n| n >= applied) {
        return Err(DispatchError::persistence("Injected batch failure"));
    }

    Ok(staged)
}

#[async_trait]
impl<T> DocumentStore<T> for InMemoryStore<T>
where
    T: Document + Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn snapshot(&self) -> Result<Vec<T>, DispatchError> {
        Ok(self.documents())
    }

    async fn subscribe(&self, callback: SnapshotCallback<T>) -> Result<Subscription, DispatchError> {
        let (id, snapshot) = {
            let mut state = self.lock();
            let id = state.next_subscriber;
            state.next_subscriber += 1;
            state.subscribers.push((id, callback.clone()));
            (id, state.documents.clone())
        };

        callback(snapshot);

        let state = self.state.clone();
        Ok(Subscription::new(move || {
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            state.subscribers.retain(|(sid, _)| *sid != id);
        }))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<Unit, DispatchError> {
        if batch.is_empty() {
            return Ok(());
        }

        let (snapshot, subscribers) = {
            let mut state = self.lock();
            let fail_after = state.injected_failure.take();

            let staged = apply_batch(&state.documents, &batch, fail_after).map_err(|e| {
                error!("Rejected batch of {} updates: {e}", batch.len());
                e
            })?;

            state.documents = staged;
            state.commits += 1;
            debug!("Committed batch of {} updates", batch.len());
            (state.documents.clone(), subscriber_callbacks(&state))
        };

        notify(snapshot, subscribers);

        Ok(())
    }
}
