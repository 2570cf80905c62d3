use super::{
    session::{DayWindow, PlanningSession},
    table::{BucketDefinition, BucketTable},
};
use entities::{BucketId, Geo, Order, Task, TaskRef, TaskRole, TimeBlock};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::trace;

/// A task placed on the board, with its owning order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardTask {
    order: Arc<Order>,
    role: TaskRole,
}

impl BoardTask {
    pub fn new(order: Arc<Order>, role: TaskRole) -> Self {
        Self { order, role }
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn role(&self) -> TaskRole {
        self.role
    }

    pub fn task(&self) -> &Task {
        self.order.task(self.role)
    }

    pub fn task_ref(&self) -> TaskRef {
        TaskRef::new(self.order.id.as_str(), self.role)
    }

    pub fn is(&self, task_ref: &TaskRef) -> bool {
        self.order.id == task_ref.order_id && self.role == task_ref.role
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    definition: BucketDefinition,
    tasks: Vec<BoardTask>,
}

impl Bucket {
    pub fn id(&self) -> &BucketId {
        &self.definition.id
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn block(&self) -> TimeBlock {
        self.definition.block
    }

    pub fn definition(&self) -> &BucketDefinition {
        &self.definition
    }

    pub fn tasks(&self) -> &[BoardTask] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether the stored `orderInRoute` values are exactly `0..len`.
    pub fn is_contiguous(&self) -> bool {
        self.tasks
            .iter()
            .enumerate()
            .all(|(i, t)| t.task().order_in_route as usize == i)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub task: TaskRef,
    pub bucket: BucketId,
    pub geo: Geo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteStop<'a> {
    /// `orderInRoute + 1`. Cancelled stops leave a gap in the numbering.
    pub stop: usize,
    pub task: &'a BoardTask,
}

/// The day's tasks partitioned into buckets, each sorted by `orderInRoute`.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteBoard {
    window: DayWindow,
    table: BucketTable,
    buckets: IndexMap<BucketId, Bucket>,
}

impl RouteBoard {
    pub fn partition(orders: &[Order], session: &PlanningSession, table: &BucketTable) -> Self {
        let window = session.day_window();

        let mut buckets: IndexMap<BucketId, Bucket> = table
            .definitions()
            .iter()
            .map(|d| {
                (
                    d.id.clone(),
                    Bucket {
                        definition: d.clone(),
                        tasks: Vec::new(),
                    },
                )
            })
            .collect();

        for order in orders {
            let order = Arc::new(order.clone());
            for (role, task) in order.tasks() {
                if !window.contains(&task.scheduled_date) {
                    continue;
                }

                match table.classify(task) {
                    Some(definition) => {
                        if let Some(bucket) = buckets.get_mut(&definition.id) {
                            bucket.tasks.push(BoardTask::new(order.clone(), role));
                        }
                    }
                    None => trace!("Task {}|{role} matches no bucket", order.id),
                }
            }
        }

        buckets.values_mut().for_each(|bucket| {
            bucket.tasks.sort_by(|a, b| {
                (a.task().order_in_route, &a.order().id, a.role()).cmp(&(
                    b.task().order_in_route,
                    &b.order().id,
                    b.role(),
                ))
            })
        });

        Self {
            window,
            table: table.clone(),
            buckets,
        }
    }

    pub fn window(&self) -> DayWindow {
        self.window
    }

    /// The definitions this board was partitioned with.
    pub fn table(&self) -> &BucketTable {
        &self.table
    }

    pub fn bucket(&self, id: &BucketId) -> Option<&Bucket> {
        self.buckets.get(id)
    }

    pub fn tasks(&self, id: &BucketId) -> &[BoardTask] {
        self.bucket(id).map(Bucket::tasks).unwrap_or_default()
    }

    pub fn buckets(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.values()
    }

    /// Buckets grouped by time of day, in table order.
    pub fn blocks(&self) -> Vec<(TimeBlock, Vec<&Bucket>)> {
        self.buckets
            .values()
            .fold(Vec::<(TimeBlock, Vec<&Bucket>)>::new(), |mut acc, bucket| {
                match acc.iter_mut().find(|(block, _)| *block == bucket.block()) {
                    Some((_, members)) => members.push(bucket),
                    None => acc.push((bucket.block(), vec![bucket])),
                }
                acc
            })
    }

    pub fn position_of(&self, task: &TaskRef) -> Option<(&BucketId, usize)> {
        self.buckets.iter().find_map(|(id, bucket)| {
            bucket
                .tasks
                .iter()
                .position(|t| t.is(task))
                .map(|index| (id, index))
        })
    }

    /// Tasks with coordinates. Tasks without `geo` stay in their bucket lists.
    pub fn map_markers(&self) -> Vec<MapMarker> {
        self.buckets
            .iter()
            .flat_map(|(id, bucket)| {
                bucket.tasks.iter().filter_map(move |t| {
                    t.task().geo.map(|geo| MapMarker {
                        task: t.task_ref(),
                        bucket: id.clone(),
                        geo,
                    })
                })
            })
            .collect()
    }

    pub fn contiguity_violations(&self) -> Vec<&BucketId> {
        self.buckets
            .values()
            .filter(|b| !b.is_contiguous())
            .map(Bucket::id)
            .collect()
    }

    /// Stops a driver works through on this bucket, cancelled tasks left out.
    pub fn route_sheet(&self, id: &BucketId) -> Vec<RouteStop<'_>> {
        self.tasks(id)
            .iter()
            .filter(|t| !t.task().is_cancelled())
            .map(|task| RouteStop {
                stop: task.task().order_in_route as usize + 1,
                task,
            })
            .collect()
    }
}
