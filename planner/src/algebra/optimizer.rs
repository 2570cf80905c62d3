use async_trait::async_trait;
use entities::{DispatchError, Geo};

#[async_trait]
pub trait RouteOptimizer: Send + Sync {
    /// Visiting order for `waypoints` between fixed `origin` and `destination`, as indices
    /// into `waypoints`.
    async fn optimize(
        &self,
        origin: Geo,
        destination: Geo,
        waypoints: &[Geo],
    ) -> Result<Vec<usize>, DispatchError>;
}
