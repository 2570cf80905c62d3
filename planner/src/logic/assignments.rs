use core_database::{DocumentStore, WriteBatch};
use entities::{constant::ASSIGNMENTS_KEY, DispatchError, RouteSettings, Unit};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Maintains which drivers work which route, stored in the route settings document.
#[derive(Clone)]
pub struct RouteAssignments {
    settings: Arc<dyn DocumentStore<RouteSettings>>,
}

impl RouteAssignments {
    pub fn new(settings: Arc<dyn DocumentStore<RouteSettings>>) -> Self {
        Self { settings }
    }

    pub async fn assign_driver(
        &self,
        current: &RouteSettings,
        route: &str,
        driver: &str,
    ) -> Result<Unit, DispatchError> {
        match current.with_driver(route, driver) {
            Some(drivers) => self.write(current, route, drivers).await,
            None => Ok(()),
        }
    }

    pub async fn remove_driver(
        &self,
        current: &RouteSettings,
        route: &str,
        driver: &str,
    ) -> Result<Unit, DispatchError> {
        match current.without_driver(route, driver) {
            Some(drivers) => self.write(current, route, drivers).await,
            None => Ok(()),
        }
    }

    async fn write(
        &self,
        current: &RouteSettings,
        route: &str,
        drivers: Vec<String>,
    ) -> Result<Unit, DispatchError> {
        let mut batch = WriteBatch::new();
        batch.set(
            current.id.as_str(),
            format!("{ASSIGNMENTS_KEY}.{route}"),
            Value::from(drivers.clone()),
        );

        self.settings.commit(batch).await.map_err(|e| {
            error!("Could not save drivers of route {route}: {e}");
            e
        })?;
        info!("Route {route} now has drivers {drivers:?}");

        Ok(())
    }
}
