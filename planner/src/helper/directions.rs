use crate::algebra::RouteOptimizer;
use async_trait::async_trait;
use entities::{
    constant::{DIRECTIONS_OK_STATUS, DIRECTIONS_PATH, OPTIMIZE_WAYPOINTS_PREFIX},
    DispatchError, Geo, OptimizerConfig,
};
use reqwest::{Client, ClientBuilder, Error as ReqwestError, Response};
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;
use tracing::{error, info, instrument};

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    waypoint_order: Vec<usize>,
}

/// Route optimizer backed by the Google Directions API.
#[derive(Clone)]
pub struct GoogleDirections {
    http: Client,
    base_url: String,
    api_key: String,
}

impl GoogleDirections {
    pub fn new(config: &OptimizerConfig) -> Result<Self, DispatchError> {
        let http = ClientBuilder::new()
            .timeout(Duration::from_secs(config.http_client_timeout_secs))
            .connect_timeout(Duration::from_secs(config.http_connect_timeout_secs))
            .build()
            .map_err(|e| DispatchError::invalid_input(&format!("Could not build client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

fn waypoints_param(waypoints: &[Geo]) -> String {
    std::iter::once(OPTIMIZE_WAYPOINTS_PREFIX.to_string())
        .chain(waypoints.iter().map(Geo::as_query))
        .collect::<Vec<_>>()
        .join("|")
}

async fn handle_response<T>(req: Result<Response, ReqwestError>) -> Result<T, DispatchError>
where
    T: DeserializeOwned,
{
    req.map_err(|e| {
        error!("Directions request failed: {e}");
        DispatchError::optimization_unavailable(&format!("{e}"))
    })?
    .error_for_status()
    .map_err(|e| {
        error!("Directions request rejected: {e}");
        DispatchError::optimization_unavailable(&format!("{e}"))
    })?
    .json()
    .await
    .map_err(|e| {
        error!("Unreadable directions response: {e}");
        DispatchError::optimization_unavailable(&format!("{e}"))
    })
}

#[async_trait]
impl RouteOptimizer for GoogleDirections {
    #[instrument(skip(self, waypoints), fields(waypoints = waypoints.len()))]
    async fn optimize(
        &self,
        origin: Geo,
        destination: Geo,
        waypoints: &[Geo],
    ) -> Result<Vec<usize>, DispatchError> {
        let mut query = vec![
            ("origin", origin.as_query()),
            ("destination", destination.as_query()),
            ("key", self.api_key.clone()),
        ];
        if !waypoints.is_empty() {
            query.push(("waypoints", waypoints_param(waypoints)));
        }

        let req = self
            .http
            .get(format!("{}{}", self.base_url, DIRECTIONS_PATH))
            .query(&query)
            .send()
            .await;
        let response: DirectionsResponse = handle_response(req).await?;

        if response.status != DIRECTIONS_OK_STATUS {
            error!(
                "Directions returned {}: {}",
                response.status,
                response.error_message.as_deref().unwrap_or_default()
            );
            return Err(DispatchError::optimization_unavailable(&format!(
                "Directions returned {}",
                response.status
            )));
        }

        let order = response
            .routes
            .into_iter()
            .next()
            .map(|route| route.waypoint_order)
            .ok_or_else(|| DispatchError::optimization_unavailable("Directions returned no routes"))?;

        info!("Directions suggested waypoint order {order:?}");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waypoints_request_optimization() {
        let waypoints = [Geo::new(-20.1, -43.1), Geo::new(-20.25, -43.5)];
        assert_eq!(
            waypoints_param(&waypoints),
            "optimize:true|-20.1,-43.1|-20.25,-43.5"
        );
    }

    #[test]
    fn reads_the_waypoint_order_of_the_first_route() {
        let response: DirectionsResponse = serde_json::from_str(
            r#"{"status":"OK","routes":[{"waypoint_order":[2,0,1],"legs":[]}],"geocoded_waypoints":[]}"#,
        )
        .unwrap();
        assert_eq!(response.routes[0].waypoint_order, vec![2, 0, 1]);

        let denied: DirectionsResponse =
            serde_json::from_str(r#"{"status":"REQUEST_DENIED","error_message":"bad key"}"#)
                .unwrap();
        assert!(denied.routes.is_empty());
        assert_eq!(denied.error_message.as_deref(), Some("bad key"));
    }
}
