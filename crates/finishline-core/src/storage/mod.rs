pub mod codec;
mod config;
pub mod session_log;

pub use config::{AnalyticsConfig, Config, LoggingConfig, StorageConfig};
pub use session_log::{parse_log, SessionLog};

use std::path::PathBuf;

use crate::error::{Result, StorageError};

/// Returns the Finishline data directory, creating it if needed.
///
/// `FINISHLINE_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/finishline`, or `~/.config/finishline-dev` when
/// `FINISHLINE_ENV=dev`.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("FINISHLINE_DATA_DIR").filter(|v| !v.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .ok_or(StorageError::DataDirUnavailable)?
                .join(".config");

            let env = std::env::var("FINISHLINE_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("finishline-dev")
            } else {
                base_dir.join("finishline")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
