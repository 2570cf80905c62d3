use crate::algebra::{DocumentStore, FieldUpdate, SnapshotCallback, Subscription, WriteBatch};
use async_trait::async_trait;
use bson::{doc, Document as BsonDocument};
use entities::{constant::ID_KEY, DatabaseConfig, DispatchError, Unit};
use futures::{StreamExt, TryStreamExt};
use mongodb::{Client, ClientSession, Collection};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, info, trace, warn};

pub struct MongoStore<T: Send + Sync> {
    client: Client,
    collection: Collection<T>,
}

impl<T: Send + Sync> Clone for MongoStore<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            collection: self.collection.clone(),
        }
    }
}

impl<T> MongoStore<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + 'static,
{
    pub fn new(client: &Client, config: &DatabaseConfig, collection: &str) -> Self {
        let collection = client.database(&config.db_name).collection::<T>(collection);

        Self {
            client: client.clone(),
            collection,
        }
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }
}

pub async fn connect(config: &DatabaseConfig) -> Result<Client, DispatchError> {
    Client::with_uri_str(&config.url).await.map_err(|e| {
        error!("Could not connect to database: {e}");
        DispatchError::persistence(&format!("Could not connect to database: {e}"))
    })
}

async fn read_all<T>(collection: &Collection<T>) -> Result<Vec<T>, DispatchError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    collection
        .find(doc! {})
        .await
        .map_err(|e| DispatchError::persistence(&format!("Failed to read collection: {e}")))?
        .try_collect::<Vec<T>>()
        .await
        .map_err(|e| DispatchError::persistence(&format!("Failed to read documents: {e}")))
}

fn set_document(updates: &[&FieldUpdate]) -> Result<BsonDocument, DispatchError> {
    updates.iter().try_fold(BsonDocument::new(), |mut acc, update| {
        let value = bson::to_bson(&update.value).map_err(|e| {
            DispatchError::serialization(&format!(
                "Could not convert {} to bson: {e}",
                update.field_path
            ))
        })?;
        acc.insert(update.field_path.clone(), value);
        Ok(acc)
    })
}

async fn apply_batch<T>(
    collection: &Collection<T>,
    session: &mut ClientSession,
    batch: &WriteBatch,
) -> Result<Unit, DispatchError>
where
    T: Send + Sync,
{
    for (document_id, updates) in batch.grouped() {
        let set = set_document(&updates)?;

        let result = collection
            .update_one(doc! { ID_KEY: document_id }, doc! { "$set": set })
            .session(&mut *session)
            .await
            .map_err(|e| {
                DispatchError::persistence(&format!("Failed to update {document_id}: {e}"))
            })?;

        if result.matched_count == 0 {
            return Err(DispatchError::persistence(&format!(
                "Document {document_id} not found"
            )));
        }
    }

    Ok(())
}

#[async_trait]
impl<T> DocumentStore<T> for MongoStore<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + 'static,
{
    async fn snapshot(&self) -> Result<Vec<T>, DispatchError> {
        read_all(&self.collection).await
    }

    async fn subscribe(&self, callback: SnapshotCallback<T>) -> Result<Subscription, DispatchError> {
        // Open the stream before the first read so no change falls in between.
        let mut stream = self.collection.watch().await.map_err(|e| {
            error!("Could not watch {}: {e}", self.collection.name());
            DispatchError::persistence(&format!("Could not watch collection: {e}"))
        })?;

        callback(read_all(&self.collection).await?);

        let collection = self.collection.clone();
        let handle = tokio::spawn(async move {
            while let Some(event) = stream.next().await {
                match event {
                    Ok(event) => {
                        trace!("Change on {}: {:?}", collection.name(), event.operation_type);
                        match read_all(&collection).await {
                            Ok(documents) => callback(documents),
                            Err(e) => error!("Could not refresh snapshot: {e}"),
                        }
                    }
                    Err(e) => {
                        error!("Change stream on {} failed: {e}", collection.name());
                        break;
                    }
                }
            }
            debug!("Change stream on {} closed", collection.name());
        });

        Ok(Subscription::new(move || handle.abort()))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<Unit, DispatchError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut session = self.client.start_session().await.map_err(|e| {
            DispatchError::persistence(&format!("Could not start session: {e}"))
        })?;
        session.start_transaction().await.map_err(|e| {
            DispatchError::persistence(&format!("Could not start transaction: {e}"))
        })?;

        match apply_batch(&self.collection, &mut session, &batch).await {
            Ok(()) => {
                session.commit_transaction().await.map_err(|e| {
                    error!("Could not commit batch: {e}");
                    DispatchError::persistence(&format!("Could not commit batch: {e}"))
                })?;
                info!(
                    "Committed {} updates to {}",
                    batch.len(),
                    self.collection.name()
                );
                Ok(())
            }
            Err(e) => {
                error!("Aborting batch on {}: {e}", self.collection.name());
                if let Err(abort) = session.abort_transaction().await {
                    warn!("Could not abort transaction: {abort}");
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_one_set_document_per_order() {
        let mut batch = WriteBatch::new();
        batch
            .set("o1", "pickupTask.orderInRoute", 2)
            .set("o1", "pickupTask.assignedTo", json!(null))
            .set("o2", "deliveryTask.orderInRoute", 0);

        let grouped = batch.grouped();
        let set = set_document(&grouped[0].1).unwrap();

        assert_eq!(set.get_i64("pickupTask.orderInRoute").unwrap(), 2);
        assert!(set.get("pickupTask.assignedTo").unwrap().as_null().is_some());
        assert!(!set.contains_key("deliveryTask.orderInRoute"));
    }
}
