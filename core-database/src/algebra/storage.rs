use async_trait::async_trait;
use entities::{DispatchError, Unit};
use serde_json::Value;
use std::sync::Arc;

/// Callback receiving the full current contents of a collection.
pub type SnapshotCallback<T> = Arc<dyn Fn(Vec<T>) + Send + Sync>;

#[async_trait]
pub trait DocumentStore<T>: Send + Sync
where
    T: Send + 'static,
{
    async fn snapshot(&self) -> Result<Vec<T>, DispatchError>;

    /// Invokes `callback` with the current snapshot right away and again after every change,
    /// until the returned handle is cancelled or dropped.
    async fn subscribe(&self, callback: SnapshotCallback<T>) -> Result<Subscription, DispatchError>;

    /// Applies every update of the batch or none of them.
    async fn commit(&self, batch: WriteBatch) -> Result<Unit, DispatchError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    pub document_id: String,
    pub field_path: String,
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    updates: Vec<FieldUpdate>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        &mut self,
        document_id: impl Into<String>,
        field_path: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.updates.push(FieldUpdate {
            document_id: document_id.into(),
            field_path: field_path.into(),
            value: value.into(),
        });
        self
    }

    pub fn updates(&self) -> &[FieldUpdate] {
        &self.updates
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Last value written to `field_path` of `document_id` in this batch.
    pub fn value_for(&self, document_id: &str, field_path: &str) -> Option<&Value> {
        self.updates
            .iter()
            .rev()
            .find(|u| u.document_id == document_id && u.field_path == field_path)
            .map(|u| &u.value)
    }

    /// Updates grouped per document, documents in first-touched order.
    pub fn grouped(&self) -> Vec<(&str, Vec<&FieldUpdate>)> {
        self.updates
            .iter()
            .fold(Vec::<(&str, Vec<&FieldUpdate>)>::new(), |mut acc, update| {
                match acc
                    .iter_mut()
                    .find(|(id, _)| *id == update.document_id.as_str())
                {
                    Some((_, fields)) => fields.push(update),
                    None => acc.push((update.document_id.as_str(), vec![update])),
                }
                acc
            })
    }
}

/// Handle to an active subscription. Dropping it stops the callbacks.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
