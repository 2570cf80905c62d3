use chrono::FixedOffset;
use entities::{DatabaseConfig, DispatchError, OptimizerConfig};
use envconfig::Envconfig;
use std::fmt::{Display, Formatter};

#[derive(Envconfig, Clone)] // Intentionally no Debug so the API key is not printed
pub struct WatcherConfig {
    #[envconfig(from = "BOARD_UTC_OFFSET_MINUTES", default = "-180")]
    pub board_utc_offset_minutes: i32,
    #[envconfig(nested = true)]
    pub db: DatabaseConfig,
    #[envconfig(nested = true)]
    pub optimizer: OptimizerConfig,
}

impl WatcherConfig {
    /// Offset the board's day boundaries are computed in.
    pub fn utc_offset(&self) -> Result<FixedOffset, DispatchError> {
        FixedOffset::east_opt(self.board_utc_offset_minutes * 60).ok_or_else(|| {
            DispatchError::invalid_input(&format!(
                "BOARD_UTC_OFFSET_MINUTES out of range: {}",
                self.board_utc_offset_minutes
            ))
        })
    }
}

impl Display for WatcherConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "BOARD_UTC_OFFSET_MINUTES: {}",
            self.board_utc_offset_minutes
        )?;
        writeln!(f, "{}", self.db)?;
        write!(f, "{}", self.optimizer)
    }
}
