use super::{
    board::{BoardTask, RouteBoard},
    table::AssignmentRule,
};
use core_database::WriteBatch;
use entities::{
    constant::{ASSIGNED_TO_KEY, ORDER_IN_ROUTE_KEY},
    BucketId, DispatchError, Geo, MoveRejection, Task, TaskRef, TaskRole,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One drag-and-drop: the task at `source[source_index]` lands at `destination[destination_index]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub task: TaskRef,
    pub source: BucketId,
    pub source_index: usize,
    pub destination: BucketId,
    pub destination_index: usize,
}

impl MoveRequest {
    pub fn new(
        order_id: impl Into<String>,
        role: TaskRole,
        source: BucketId,
        source_index: usize,
        destination: BucketId,
        destination_index: usize,
    ) -> Self {
        Self {
            task: TaskRef::new(order_id, role),
            source,
            source_index,
            destination,
            destination_index,
        }
    }

    pub fn is_no_op(&self) -> bool {
        self.source == self.destination && self.source_index == self.destination_index
    }
}

/// Writes `orderInRoute = index` for members whose stored value differs.
fn reindex(batch: &mut WriteBatch, tasks: &[&BoardTask]) {
    for (index, task) in tasks.iter().enumerate() {
        if task.task().order_in_route as usize != index {
            batch.set(
                task.order().id.as_str(),
                task.role().field_path(ORDER_IN_ROUTE_KEY),
                index,
            );
        }
    }
}

/// Computes every write a move implies without touching the store.
pub fn plan_move(board: &RouteBoard, request: &MoveRequest) -> Result<WriteBatch, DispatchError> {
    if request.is_no_op() {
        return Err(DispatchError::no_op());
    }

    let source = board.bucket(&request.source).ok_or_else(|| {
        DispatchError::invalid_move(
            MoveRejection::UnknownBucket,
            &format!("source {}", request.source),
        )
    })?;
    let destination = board.bucket(&request.destination).ok_or_else(|| {
        DispatchError::invalid_move(
            MoveRejection::UnknownBucket,
            &format!("destination {}", request.destination),
        )
    })?;

    let moved = source.tasks().get(request.source_index).ok_or_else(|| {
        DispatchError::invalid_move(
            MoveRejection::SourceIndexOutOfRange,
            &format!(
                "index {} in {} holding {} tasks",
                request.source_index,
                request.source,
                source.len()
            ),
        )
    })?;

    if !moved.is(&request.task) {
        return Err(DispatchError::invalid_move(
            MoveRejection::TaskMismatch,
            &format!(
                "expected {} at {}[{}], found {}",
                request.task,
                request.source,
                request.source_index,
                moved.task_ref()
            ),
        ));
    }

    // `Any` buckets take tasks whatever their assignment, so they keep it.
    let assigned_to = match destination.definition().predicate.assignment {
        AssignmentRule::Backing => request.destination.backing_id(),
        AssignmentRule::Any => moved.task().assigned_to.as_deref(),
    };

    let placed = Task {
        assigned_to: assigned_to.map(String::from),
        ..moved.task().clone()
    };
    let lands_in = board.table().classify(&placed).map(|d| &d.id);
    if lands_in != Some(&request.destination) {
        return Err(DispatchError::invalid_move(
            MoveRejection::IneligibleDestination,
            &format!(
                "{} would land in {} instead of {}",
                request.task,
                lands_in.map_or_else(|| "no bucket".to_string(), |id| id.to_string()),
                request.destination
            ),
        ));
    }

    let same_bucket = request.source == request.destination;
    let mut batch = WriteBatch::new();

    let without_moved: Vec<&BoardTask> = source
        .tasks()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != request.source_index)
        .map(|(_, t)| t)
        .collect();

    let mut target = if same_bucket {
        without_moved
    } else {
        reindex(&mut batch, &without_moved);
        destination.tasks().iter().collect()
    };

    let insert_at = request.destination_index.min(target.len());
    target.insert(insert_at, moved);
    reindex(&mut batch, &target);

    if moved.task().assigned_to.as_deref() != assigned_to {
        batch.set(
            moved.order().id.as_str(),
            moved.role().field_path(ASSIGNED_TO_KEY),
            assigned_to.map(Value::from).unwrap_or(Value::Null),
        );
    }

    Ok(batch)
}

/// An optimizable route: fixed endpoints and the waypoints between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    pub origin: Geo,
    pub destination: Geo,
    pub waypoints: Vec<Geo>,
}

impl RouteGeometry {
    pub fn from_tasks(tasks: &[BoardTask]) -> Result<Self, DispatchError> {
        if tasks.len() < 2 {
            return Err(DispatchError::invalid_input(&format!(
                "A route needs at least 2 tasks to optimize, got {}",
                tasks.len()
            )));
        }

        let points = tasks
            .iter()
            .map(|t| {
                t.task().geo.ok_or_else(|| {
                    DispatchError::invalid_input(&format!("Task {} has no coordinates", t.task_ref()))
                })
            })
            .collect::<Result<Vec<Geo>, DispatchError>>()?;

        let (origin, rest) = points
            .split_first()
            .ok_or_else(|| DispatchError::invalid_input("Empty route"))?;
        let (destination, waypoints) = rest
            .split_last()
            .ok_or_else(|| DispatchError::invalid_input("Route without destination"))?;

        Ok(Self {
            origin: *origin,
            destination: *destination,
            waypoints: waypoints.to_vec(),
        })
    }
}

fn check_permutation(permutation: &[usize], len: usize) -> Result<(), DispatchError> {
    let mut seen = vec![false; len];
    let valid = permutation.len() == len
        && permutation.iter().all(|&i| {
            i < len && !std::mem::replace(&mut seen[i], true)
        });

    if valid {
        Ok(())
    } else {
        Err(DispatchError::optimization_unavailable(&format!(
            "Waypoint order {permutation:?} is not a permutation of {len} waypoints"
        )))
    }
}

/// Writes `[origin, ...interior in permutation order, destination]` as `orderInRoute` for
/// every task of the route.
pub fn plan_reorder(tasks: &[BoardTask], permutation: &[usize]) -> Result<WriteBatch, DispatchError> {
    let (origin, rest) = tasks
        .split_first()
        .ok_or_else(|| DispatchError::invalid_input("Empty route"))?;
    let (destination, interior) = rest
        .split_last()
        .ok_or_else(|| DispatchError::invalid_input("Route without destination"))?;

    check_permutation(permutation, interior.len())?;

    let ordered = std::iter::once(origin)
        .chain(permutation.iter().map(|&i| &interior[i]))
        .chain(std::iter::once(destination));

    let mut batch = WriteBatch::new();
    for (index, task) in ordered.enumerate() {
        batch.set(
            task.order().id.as_str(),
            task.role().field_path(ORDER_IN_ROUTE_KEY),
            index,
        );
    }

    Ok(batch)
}
