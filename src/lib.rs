//! WiFi station manager for ESP32.
//!
//! Platform-independent components (event group, credentials, retry policy,
//! scan records) compile and test on the host machine; the driver facade
//! sits behind the `esp32` feature.

pub mod wifi;

// Re-export commonly used items
pub use wifi::{
    AccessPoint, ConnectionState, EventGroup, RetryPolicy, StationEvents, WifiConfig,
    CONNECTED_BIT, FAIL_BIT,
};

#[cfg(feature = "esp32")]
pub use wifi::{WifiError, WifiManager};
