use super::ReassignmentEngine;
use crate::domain::{plan_reorder, PlanningSession, RouteBoard, RouteGeometry};
use entities::{BucketId, DispatchError, Unit};
use tracing::{info, instrument, warn};

impl ReassignmentEngine {
    /// Asks the optimizer for a visiting order of `bucket` and persists it. The first and last
    /// tasks keep their places. Nothing is written when the optimizer fails.
    #[instrument(skip(self, session, board, bucket), fields(bucket = %bucket))]
    pub async fn optimize_bucket(
        &self,
        session: &PlanningSession,
        board: &RouteBoard,
        bucket: &BucketId,
    ) -> Result<Unit, DispatchError> {
        let tasks = board
            .bucket(bucket)
            .ok_or_else(|| DispatchError::not_found(&format!("Bucket {bucket}")))?
            .tasks();

        let _in_flight = session.begin_optimization(bucket)?;
        let geometry = RouteGeometry::from_tasks(tasks)?;

        let permutation = self
            .optimizer
            .optimize(geometry.origin, geometry.destination, &geometry.waypoints)
            .await
            .map_err(|e| {
                warn!("Optimization of {bucket} failed: {e}");
                match e {
                    DispatchError::OptimizationUnavailable { .. } => e,
                    other => DispatchError::optimization_unavailable(&other.to_string()),
                }
            })?;

        let batch = plan_reorder(tasks, &permutation).map_err(|e| {
            warn!("Discarding optimizer answer for {bucket}: {e}");
            e
        })?;
        self.commit(batch).await?;

        info!("Optimized {bucket} with waypoint order {permutation:?}");
        Ok(())
    }
}
