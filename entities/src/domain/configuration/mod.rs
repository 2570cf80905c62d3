use envconfig::Envconfig;
use std::fmt::{Display, Formatter};

#[derive(Envconfig, Debug, Clone)]
pub struct DatabaseConfig {
    #[envconfig(
        from = "MONGO_URL",
        default = "mongodb://localhost:27017/?directConnection=true"
    )]
    pub url: String,
    #[envconfig(from = "MONGO_DB_NAME", default = "dispatch")]
    pub db_name: String,
    #[envconfig(from = "ORDERS_COLLECTION", default = "orders")]
    pub orders_collection: String,
    #[envconfig(from = "DRIVERS_COLLECTION", default = "drivers")]
    pub drivers_collection: String,
    #[envconfig(from = "SETTINGS_COLLECTION", default = "settings")]
    pub settings_collection: String,
}

impl Display for DatabaseConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "MONGO_DB_NAME: {}", self.db_name)?;
        writeln!(f, "ORDERS_COLLECTION: {}", self.orders_collection)?;
        writeln!(f, "DRIVERS_COLLECTION: {}", self.drivers_collection)?;
        write!(f, "SETTINGS_COLLECTION: {}", self.settings_collection)
    }
}

#[derive(Envconfig, Clone)] // Intentionally no Debug so the API key is not printed
pub struct OptimizerConfig {
    #[envconfig(from = "DIRECTIONS_BASE_URL", default = "https://maps.googleapis.com")]
    pub base_url: String,
    #[envconfig(from = "GOOGLE_MAPS_API_KEY", default = "")]
    pub api_key: String,
    #[envconfig(from = "HTTP_CLIENT_TIMEOUT_SECS", default = "30")]
    pub http_client_timeout_secs: u64,
    #[envconfig(from = "HTTP_CONNECT_TIMEOUT_SECS", default = "10")]
    pub http_connect_timeout_secs: u64,
}

impl OptimizerConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl Display for OptimizerConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "DIRECTIONS_BASE_URL: {}", self.base_url)?;
        writeln!(f, "GOOGLE_MAPS_API_KEY: ***")?;
        writeln!(
            f,
            "HTTP_CLIENT_TIMEOUT_SECS: {}",
            self.http_client_timeout_secs
        )?;
        write!(
            f,
            "HTTP_CONNECT_TIMEOUT_SECS: {}",
            self.http_connect_timeout_secs
        )
    }
}
