//! WiFi station management.
//!
//! A small facade over the ESP-IDF station driver: connect with stored
//! credentials, observe the outcome on a dual-bit event group, scan for
//! nearby networks.
//!
//! # Components
//!
//! - [`EventGroup`] / [`StationEvents`] - event group primitive and the
//!   station bits (host-testable)
//! - [`WifiConfig`] - credential validation and NVS byte format
//!   (host-testable)
//! - [`RetryPolicy`] / [`ConnectionState`] - reconnect policy and connection
//!   state (host-testable)
//! - [`AccessPoint`] - structured scan results (host-testable)
//! - `WifiManager` - the driver facade (ESP32 only)
//! - `CredentialStore` - NVS persistence (ESP32 only)

mod config;
mod events;
mod retry;
mod scan;
mod sync;

#[cfg(feature = "esp32")]
mod manager;
#[cfg(feature = "esp32")]
mod storage;

pub use config::{ConfigError, WifiConfig, MAX_PASSWORD_LEN, MAX_SSID_LEN, MIN_PASSWORD_LEN};
pub use events::{StationEvents, CONNECTED_BIT, FAIL_BIT};
pub use retry::{ConnectionState, RetryPolicy};
pub use scan::{format_scan_table, sort_strongest_first, AccessPoint, AuthKind};
pub use sync::{EventBits, EventGroup};

#[cfg(feature = "esp32")]
pub use manager::{WifiError, WifiManager};
#[cfg(feature = "esp32")]
pub use storage::CredentialStore;
