pub mod task;

use crate::{
    constant::{DELIVERY_TASK_KEY, PICKUP_TASK_KEY, TASK_REF_SEPARATOR},
    DispatchError, Document,
};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use strum::{AsRefStr, EnumIter, EnumString};
use task::Task;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "dummy", derive(fake::Dummy))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub client_name: String,
    #[serde(default)]
    pub cargo_desc: String,
    pub pickup_task: Task,
    pub delivery_task: Task,
}

impl Order {
    pub fn task(&self, role: TaskRole) -> &Task {
        match role {
            TaskRole::Pickup => &self.pickup_task,
            TaskRole::Delivery => &self.delivery_task,
        }
    }

    pub fn task_mut(&mut self, role: TaskRole) -> &mut Task {
        match role {
            TaskRole::Pickup => &mut self.pickup_task,
            TaskRole::Delivery => &mut self.delivery_task,
        }
    }

    pub fn tasks(&self) -> impl Iterator<Item = (TaskRole, &Task)> {
        [
            (TaskRole::Pickup, &self.pickup_task),
            (TaskRole::Delivery, &self.delivery_task),
        ]
        .into_iter()
    }
}

impl Document for Order {
    fn document_id(&self) -> &str {
        &self.id
    }
}

/// The key an embedded task lives under in its order document.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumString,
    EnumIter,
    strum::Display,
)]
pub enum TaskRole {
    #[serde(rename = "pickupTask")]
    #[strum(serialize = "pickupTask")]
    Pickup,
    #[serde(rename = "deliveryTask")]
    #[strum(serialize = "deliveryTask")]
    Delivery,
}

impl TaskRole {
    pub fn field_key(&self) -> &'static str {
        match self {
            TaskRole::Pickup => PICKUP_TASK_KEY,
            TaskRole::Delivery => DELIVERY_TASK_KEY,
        }
    }

    /// Dotted path of a task field inside the order document, e.g. `pickupTask.orderInRoute`.
    pub fn field_path(&self, field: &str) -> String {
        format!("{}.{}", self.field_key(), field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    pub order_id: String,
    pub role: TaskRole,
}

impl TaskRef {
    pub fn new(order_id: impl Into<String>, role: TaskRole) -> Self {
        Self {
            order_id: order_id.into(),
            role,
        }
    }
}

impl Display for TaskRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.order_id, TASK_REF_SEPARATOR, self.role)
    }
}

impl FromStr for TaskRef {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (order_id, role) = s
            .rsplit_once(TASK_REF_SEPARATOR)
            .ok_or_else(|| DispatchError::invalid_input(&format!("Malformed task ref: {s}")))?;

        if order_id.is_empty() {
            return Err(DispatchError::invalid_input(&format!(
                "Task ref without order id: {s}"
            )));
        }

        let role = TaskRole::from_str(role)
            .map_err(|_| DispatchError::invalid_input(&format!("Unknown task role in: {s}")))?;

        Ok(TaskRef::new(order_id, role))
    }
}
