//! Configuration default values
//!
//! All defaults live here so they can be changed in one place.

use std::time::Duration;

// Refresh defaults
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 2;
pub const DEFAULT_SINGLE_FLIGHT: bool = true;

// HTTP defaults
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(2 * 60);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// Query defaults
pub const DEFAULT_GUIDE_LOOKAHEAD: Duration = Duration::from_secs(4 * 60 * 60);

// Config file
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const CONFIG_FILE_ENV: &str = "CONFIG_FILE";
