use crate::config::WatcherConfig;
use chrono::FixedOffset;
use core_database::{connect, DocumentStore, MongoStore, Subscription};
use entities::{
    constant::ROUTE_SETTINGS_ID, DispatchError, Driver, Order, RouteSettings, Unit,
};
use planner::{BucketTable, PlanningSession, RouteBoard};
use std::{
    collections::BTreeMap,
    fmt::Display,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Latest contents of the three collections the board is derived from.
struct BoardInputs {
    orders: Vec<Order>,
    drivers: Vec<Driver>,
    settings: RouteSettings,
}

#[derive(Clone)]
struct SharedInputs {
    inputs: Arc<Mutex<BoardInputs>>,
    utc_offset: FixedOffset,
}

impl SharedInputs {
    fn new(utc_offset: FixedOffset) -> Self {
        Self {
            inputs: Arc::new(Mutex::new(BoardInputs {
                orders: Vec::new(),
                drivers: Vec::new(),
                settings: RouteSettings::new(BTreeMap::new()),
            })),
            utc_offset,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BoardInputs> {
        self.inputs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, apply: impl FnOnce(&mut BoardInputs)) {
        let mut inputs = self.lock();
        apply(&mut inputs);
        report(&inputs, self.utc_offset);
    }
}

fn report(inputs: &BoardInputs, utc_offset: FixedOffset) {
    let session = PlanningSession::today(utc_offset);
    let table = BucketTable::standard(&inputs.settings, &inputs.drivers);
    let board = RouteBoard::partition(&inputs.orders, &session, &table);

    info!(
        "Board for {} from {} orders",
        session.selected_date(),
        inputs.orders.len()
    );
    for bucket in board.buckets() {
        info!(
            "  [{}] {} ({}): {} tasks",
            bucket.block(),
            bucket.name(),
            bucket.id(),
            bucket.len()
        );
    }

    for id in board.contiguity_violations() {
        let stored: Vec<u32> = board
            .tasks(id)
            .iter()
            .map(|t| t.task().order_in_route)
            .collect();
        warn!("Bucket {id} has non contiguous orderInRoute values {stored:?}");
    }
}

pub struct WatcherClient {
    config: WatcherConfig,
}

impl Display for WatcherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WatcherClient {{ config: {} }}", self.config)
    }
}

impl WatcherClient {
    pub fn new(config: WatcherConfig) -> Self {
        Self { config }
    }

    pub fn start(self) -> JoinHandle<Result<Unit, DispatchError>> {
        tokio::spawn(self.run())
    }

    /// Follows the board until Ctrl-C.
    pub async fn run(self) -> Result<Unit, DispatchError> {
        info!("Starting board watcher");
        if !self.config.optimizer.has_api_key() {
            warn!("GOOGLE_MAPS_API_KEY is not set, route optimization is unavailable");
        }

        let shared = SharedInputs::new(self.config.utc_offset()?);
        let db = &self.config.db;
        let client = connect(db).await?;

        info!("Initializing subscriptions on {}", db.db_name);

        let drivers = MongoStore::<Driver>::new(&client, db, &db.drivers_collection);
        let settings = MongoStore::<RouteSettings>::new(&client, db, &db.settings_collection);
        let orders = MongoStore::<Order>::new(&client, db, &db.orders_collection);

        let subscriptions: Vec<Subscription> = vec![
            {
                let shared = shared.clone();
                drivers
                    .subscribe(Arc::new(move |drivers: Vec<Driver>| {
                        debug!("Received {} drivers", drivers.len());
                        shared.update(|inputs| inputs.drivers = drivers);
                    }))
                    .await?
            },
            {
                let shared = shared.clone();
                settings
                    .subscribe(Arc::new(move |documents: Vec<RouteSettings>| {
                        let current = documents
                            .into_iter()
                            .find(|s| s.id == ROUTE_SETTINGS_ID)
                            .unwrap_or_else(|| RouteSettings::new(BTreeMap::new()));
                        shared.update(|inputs| inputs.settings = current);
                    }))
                    .await?
            },
            {
                let shared = shared.clone();
                orders
                    .subscribe(Arc::new(move |orders: Vec<Order>| {
                        shared.update(|inputs| inputs.orders = orders);
                    }))
                    .await?
            },
        ];

        tokio::signal::ctrl_c().await.map_err(|e| {
            error!("Could not listen for shutdown: {e}");
            DispatchError::invalid_input(&format!("Could not listen for shutdown: {e}"))
        })?;

        subscriptions.into_iter().for_each(Subscription::cancel);
        info!("Board watcher stopped");

        Ok(())
    }
}
