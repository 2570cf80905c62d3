use crate::{
    algebra::RouteOptimizer,
    domain::{plan_move, MoveRequest, RouteBoard},
};
use core_database::{DocumentStore, WriteBatch};
use entities::{constant::STATUS_KEY, DispatchError, Order, TaskRef, TaskStatus, Unit};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Applies board actions to the order store, one atomic batch per action.
#[derive(Clone)]
pub struct ReassignmentEngine {
    pub(crate) orders: Arc<dyn DocumentStore<Order>>,
    pub(crate) optimizer: Arc<dyn RouteOptimizer>,
}

impl ReassignmentEngine {
    pub fn new(orders: Arc<dyn DocumentStore<Order>>, optimizer: Arc<dyn RouteOptimizer>) -> Self {
        Self { orders, optimizer }
    }

    pub(crate) async fn commit(&self, batch: WriteBatch) -> Result<Unit, DispatchError> {
        let updates = batch.len();
        self.orders.commit(batch).await.map_err(|e| {
            error!("Could not persist {updates} updates: {e}");
            match e {
                DispatchError::Persistence { .. } => e,
                other => DispatchError::persistence(&other.to_string()),
            }
        })
    }

    /// Moves one task between (or within) buckets of `board` and persists the new
    /// assignment and positions. `board` must be the latest derivation from the store.
    #[instrument(skip(self, board), fields(task = %request.task))]
    pub async fn move_task(
        &self,
        board: &RouteBoard,
        request: &MoveRequest,
    ) -> Result<Unit, DispatchError> {
        let batch = plan_move(board, request).map_err(|e| {
            if !e.is_no_op() {
                warn!("Rejected move: {e}");
            }
            e
        })?;

        let updates = batch.len();
        self.commit(batch).await?;

        info!(
            "Moved {} from {}[{}] to {}[{}] ({updates} updates)",
            request.task,
            request.source,
            request.source_index,
            request.destination,
            request.destination_index
        );

        Ok(())
    }

    #[instrument(skip(self, task), fields(task = %task))]
    pub async fn set_task_status(
        &self,
        task: &TaskRef,
        status: TaskStatus,
    ) -> Result<Unit, DispatchError> {
        let mut batch = WriteBatch::new();
        batch.set(
            task.order_id.as_str(),
            task.role.field_path(STATUS_KEY),
            serde_json::to_value(status)?,
        );

        self.commit(batch).await?;
        info!("Task {task} is now {status}");

        Ok(())
    }
}
