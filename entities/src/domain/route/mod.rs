use crate::{
    constant::{DRIVER_BUCKET_PREFIX, FIXED_BUCKET_PREFIX, ROUTE_SETTINGS_ID, UNASSIGNED_BUCKET},
    DispatchError, Document,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Display, str::FromStr};
use strum::{AsRefStr, EnumIter};

/// A column on the route board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketId {
    Fixed(String),
    Driver(String),
    Unassigned,
}

impl BucketId {
    pub fn fixed(name: impl Into<String>) -> Self {
        BucketId::Fixed(name.into())
    }

    pub fn driver(id: impl Into<String>) -> Self {
        BucketId::Driver(id.into())
    }

    /// Value stored in a member task's `assignedTo`.
    pub fn backing_id(&self) -> Option<&str> {
        match self {
            BucketId::Fixed(name) => Some(name),
            BucketId::Driver(id) => Some(id),
            BucketId::Unassigned => None,
        }
    }
}

impl Display for BucketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BucketId::Fixed(name) => write!(f, "{FIXED_BUCKET_PREFIX}{name}"),
            BucketId::Driver(id) => write!(f, "{DRIVER_BUCKET_PREFIX}{id}"),
            BucketId::Unassigned => write!(f, "{UNASSIGNED_BUCKET}"),
        }
    }
}

impl FromStr for BucketId {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == UNASSIGNED_BUCKET {
            return Ok(BucketId::Unassigned);
        }

        let parsed = if let Some(name) = s.strip_prefix(FIXED_BUCKET_PREFIX) {
            Some(BucketId::fixed(name))
        } else {
            s.strip_prefix(DRIVER_BUCKET_PREFIX).map(BucketId::driver)
        };

        match parsed {
            Some(id) if id.backing_id().is_some_and(|b| !b.is_empty()) => Ok(id),
            _ => Err(DispatchError::invalid_input(&format!(
                "Unknown bucket id: {s}"
            ))),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, AsRefStr, EnumIter, strum::Display,
)]
pub enum TimeBlock {
    Morning,
    Afternoon,
    Night,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "dummy", derive(fake::Dummy))]
pub struct Driver {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

impl Document for Driver {
    fn document_id(&self) -> &str {
        &self.id
    }
}

/// Which drivers work which route keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteSettings {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub assignments: BTreeMap<String, Vec<String>>,
}

impl RouteSettings {
    pub fn new(assignments: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            id: ROUTE_SETTINGS_ID.to_string(),
            assignments,
        }
    }

    pub fn drivers_for(&self, route: &str) -> &[String] {
        self.assignments
            .get(route)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The route's driver list with `driver` appended, or `None` when it is already there.
    pub fn with_driver(&self, route: &str, driver: &str) -> Option<Vec<String>> {
        let current = self.drivers_for(route);
        if current.iter().any(|d| d == driver) {
            return None;
        }

        let mut drivers = current.to_vec();
        drivers.push(driver.to_string());
        Some(drivers)
    }

    /// The route's driver list without `driver`, or `None` when it was not there.
    pub fn without_driver(&self, route: &str, driver: &str) -> Option<Vec<String>> {
        let current = self.drivers_for(route);
        if !current.iter().any(|d| d == driver) {
            return None;
        }

        Some(current.iter().filter(|d| *d != driver).cloned().collect())
    }
}

impl Document for RouteSettings {
    fn document_id(&self) -> &str {
        &self.id
    }
}
