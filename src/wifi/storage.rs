//! NVS persistence for the credential set.
//!
//! One SSID/password pair survives reboots in ESP32 Non-Volatile Storage.
//! Multi-profile storage is out of scope; the record lives under a single
//! fixed key.

use esp_idf_svc::nvs::{EspNvs, EspNvsPartition, NvsDefault};
use esp_idf_sys::EspError;
use log::warn;
use zeroize::Zeroize;

use super::config::{WifiConfig, MAX_PASSWORD_LEN, MAX_SSID_LEN};

/// NVS namespace for the station manager.
const NVS_NAMESPACE: &str = "wifi_config";

/// Key of the single credential record.
const NVS_KEY: &str = "credentials";

/// Read buffer for the stored record.
/// Format: [ssid_len:1][ssid:32][password_len:1][password:64], plus margin.
const MAX_RECORD_LEN: usize = 1 + MAX_SSID_LEN + 1 + MAX_PASSWORD_LEN + 4;

/// Credential persistence over an NVS namespace.
pub struct CredentialStore {
    nvs: EspNvs<NvsDefault>,
}

impl CredentialStore {
    /// Open (creating if needed) the station manager's NVS namespace.
    pub fn open(partition: EspNvsPartition<NvsDefault>) -> Result<Self, EspError> {
        let nvs = EspNvs::new(partition, NVS_NAMESPACE, true)?;
        Ok(Self { nvs })
    }

    /// Load the stored credentials.
    ///
    /// Returns `None` when nothing is stored or the record fails to decode.
    /// A corrupt record is logged and treated as absent rather than wedging
    /// startup.
    pub fn load(&self) -> Option<WifiConfig> {
        let mut buf = [0u8; MAX_RECORD_LEN];
        let bytes = self.nvs.get_raw(NVS_KEY, &mut buf).ok()??;
        let config = match WifiConfig::from_bytes(bytes) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("ignoring corrupt credential record: {}", e);
                None
            }
        };
        buf.zeroize();
        config
    }

    /// Persist a credential set, replacing any previous record.
    pub fn save(&mut self, config: &WifiConfig) -> Result<(), EspError> {
        let mut bytes = config.to_bytes();
        let result = self.nvs.set_raw(NVS_KEY, &bytes);
        bytes.zeroize();
        result?;
        Ok(())
    }

    /// Remove the stored credentials, if any.
    pub fn clear(&mut self) -> Result<(), EspError> {
        self.nvs.remove(NVS_KEY)?;
        Ok(())
    }
}
