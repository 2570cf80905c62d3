use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "dummy", derive(fake::Dummy))]
pub struct Geo {
    pub lat: f64,
    pub lng: f64,
}

impl Geo {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `lat,lng` as expected by directions services.
    pub fn as_query(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[cfg_attr(feature = "dummy", derive(fake::Dummy))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskType {
    #[serde(alias = "coleta")]
    Pickup,
    #[serde(alias = "entrega")]
    Delivery,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
)]
#[cfg_attr(feature = "dummy", derive(fake::Dummy))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    #[serde(alias = "pendente")]
    Pending,
    #[serde(alias = "concluida", alias = "concluída", alias = "concluido")]
    Completed,
    #[serde(alias = "cancelada")]
    Cancelled,
}

/// A pickup or delivery obligation embedded in an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "dummy", derive(fake::Dummy))]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub r#type: TaskType,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
    pub scheduled_date: DateTime<Utc>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub order_in_route: u32,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    pub fn is_cancelled(&self) -> bool {
        self.status == TaskStatus::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_legacy_stored_values() {
        let task: Task = serde_json::from_value(json!({
            "type": "coleta",
            "city": "Lafaiete",
            "address": "Rua A, 10",
            "scheduledDate": "2024-05-10T13:00:00Z",
            "status": "concluída"
        }))
        .unwrap();

        assert_eq!(task.r#type, TaskType::Pickup);
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.assigned_to, None);
        assert_eq!(task.order_in_route, 0);
        assert!(task.geo.is_none());
    }

    #[test]
    fn writes_canonical_values() {
        let task: Task = serde_json::from_value(json!({
            "type": "entrega",
            "scheduledDate": "2024-05-10T13:00:00Z",
            "assignedTo": "entregas_lafa",
            "orderInRoute": 3,
            "status": "cancelada",
            "geo": { "lat": -20.66, "lng": -43.78 }
        }))
        .unwrap();

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["type"], "delivery");
        assert_eq!(value["status"], "cancelled");
        assert_eq!(value["assignedTo"], "entregas_lafa");
        assert_eq!(value["orderInRoute"], 3);
        assert_eq!(task.geo.map(|g| g.as_query()), Some("-20.66,-43.78".to_string()));
    }
}
