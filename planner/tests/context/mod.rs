#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use core_database::{DocumentStore, InMemoryStore};
use entities::{BucketId, DispatchError, Geo, Order, TaskRole, TaskStatus, TaskType, TimeBlock};
use fake::{Fake, Faker};
use planner::{
    BucketDefinition, BucketTable, PlanningSession, ReassignmentEngine, RouteBoard,
    RouteOptimizer, TaskPredicate,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::sync::Notify;

pub const A: &str = "route_a";
pub const B: &str = "route_b";

pub fn bucket_a() -> BucketId {
    BucketId::fixed(A)
}

pub fn bucket_b() -> BucketId {
    BucketId::fixed(B)
}

pub fn selected_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
}

/// Latitude encodes the original position so optimizers can recognise waypoints.
pub fn geo_for(position: u32) -> Geo {
    Geo::new(-19.9 - position as f64 / 100.0, -43.9)
}

/// An order whose pickup is on the board in `bucket` at `position`. Its delivery is
/// scheduled for another day.
pub fn order(id: &str, bucket: Option<&str>, position: u32) -> Order {
    let mut order: Order = Faker.fake();
    order.id = id.to_string();

    order.pickup_task.r#type = TaskType::Pickup;
    order.pickup_task.city = "BH".to_string();
    order.pickup_task.geo = Some(geo_for(position));
    order.pickup_task.scheduled_date = Utc.with_ymd_and_hms(2024, 5, 10, 14, 0, 0).unwrap();
    order.pickup_task.assigned_to = bucket.map(String::from);
    order.pickup_task.order_in_route = position;
    order.pickup_task.status = TaskStatus::Pending;

    order.delivery_task.r#type = TaskType::Delivery;
    order.delivery_task.scheduled_date = Utc.with_ymd_and_hms(2024, 5, 12, 14, 0, 0).unwrap();

    order
}

pub fn table() -> BucketTable {
    BucketTable::new(vec![
        BucketDefinition::new(bucket_a(), "A", TimeBlock::Morning, TaskPredicate::assigned()),
        BucketDefinition::new(bucket_b(), "B", TimeBlock::Morning, TaskPredicate::assigned()),
        BucketDefinition::new(
            BucketId::Unassigned,
            "Unassigned",
            TimeBlock::Afternoon,
            TaskPredicate::assigned(),
        ),
    ])
}

pub struct TestContext {
    pub store: Arc<InMemoryStore<Order>>,
    pub engine: ReassignmentEngine,
    pub session: PlanningSession,
    pub table: BucketTable,
}

impl TestContext {
    pub fn new(orders: Vec<Order>, optimizer: Arc<dyn RouteOptimizer>) -> Self {
        let store = Arc::new(InMemoryStore::new(orders));
        let engine = ReassignmentEngine::new(store.clone(), optimizer);

        Self {
            store,
            engine,
            session: PlanningSession::new(selected_date(), FixedOffset::east_opt(0).unwrap()),
            table: table(),
        }
    }

    pub fn with_orders(orders: Vec<Order>) -> Self {
        Self::new(orders, Arc::new(StubOptimizer::failing()))
    }

    pub async fn board(&self) -> RouteBoard {
        let orders = self.store.snapshot().await.unwrap();
        RouteBoard::partition(&orders, &self.session, &self.table)
    }
}

/// `(order id, orderInRoute)` of a bucket's pickups, in board order.
pub fn positions(board: &RouteBoard, bucket: &BucketId) -> Vec<(String, u32)> {
    board
        .tasks(bucket)
        .iter()
        .map(|t| (t.order().id.clone(), t.task().order_in_route))
        .collect()
}

pub fn ids(board: &RouteBoard, bucket: &BucketId) -> Vec<String> {
    board
        .tasks(bucket)
        .iter()
        .map(|t| t.order().id.clone())
        .collect()
}

pub fn pickup(orders: &[Order], id: &str) -> entities::Task {
    orders
        .iter()
        .find(|o| o.id == id)
        .map(|o| o.task(TaskRole::Pickup).clone())
        .unwrap()
}

pub struct StubOptimizer {
    answer: Result<Vec<usize>, DispatchError>,
    calls: AtomicUsize,
}

impl StubOptimizer {
    pub fn returning(permutation: Vec<usize>) -> Self {
        Self {
            answer: Ok(permutation),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: Err(DispatchError::optimization_unavailable("ZERO_RESULTS")),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RouteOptimizer for StubOptimizer {
    async fn optimize(
        &self,
        _origin: Geo,
        _destination: Geo,
        _waypoints: &[Geo],
    ) -> Result<Vec<usize>, DispatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone()
    }
}

/// Answers with the waypoints' original visiting order, read back from their coordinates.
pub struct OriginalOrderOptimizer;

#[async_trait]
impl RouteOptimizer for OriginalOrderOptimizer {
    async fn optimize(
        &self,
        _origin: Geo,
        _destination: Geo,
        waypoints: &[Geo],
    ) -> Result<Vec<usize>, DispatchError> {
        let mut indices: Vec<usize> = (0..waypoints.len()).collect();
        indices.sort_by(|a, b| waypoints[*b].lat.total_cmp(&waypoints[*a].lat));
        Ok(indices)
    }
}

/// Holds every call until released, so tests can overlap two optimizations.
#[derive(Default)]
pub struct GatedOptimizer {
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait]
impl RouteOptimizer for GatedOptimizer {
    async fn optimize(
        &self,
        _origin: Geo,
        _destination: Geo,
        waypoints: &[Geo],
    ) -> Result<Vec<usize>, DispatchError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok((0..waypoints.len()).collect())
    }
}
