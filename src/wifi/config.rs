//! WiFi credentials.
//!
//! Platform-independent credential type with validation and the compact
//! byte format used for NVS persistence. Testable on the host machine.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Maximum SSID length per IEEE 802.11.
pub const MAX_SSID_LEN: usize = 32;

/// Maximum password length for WPA2.
pub const MAX_PASSWORD_LEN: usize = 64;

/// Minimum password length for WPA2.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Credentials for one access point.
///
/// The password is zeroed in memory on drop and redacted from `Debug`
/// output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct WifiConfig {
    /// Network SSID (1-32 bytes).
    pub ssid: String,
    /// Network password (8-64 bytes for WPA2, empty for open networks).
    pub password: String,
}

impl WifiConfig {
    /// Create and validate a credential set.
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Result<Self, ConfigError> {
        let config = Self {
            ssid: ssid.into(),
            password: password.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Credentials for an open network (no password).
    pub fn open(ssid: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(ssid, String::new())
    }

    /// Validate SSID and password lengths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ssid.is_empty() {
            return Err(ConfigError::SsidEmpty);
        }
        if self.ssid.len() > MAX_SSID_LEN {
            return Err(ConfigError::SsidTooLong {
                len: self.ssid.len(),
                max: MAX_SSID_LEN,
            });
        }

        // An empty password means an open network and is valid.
        if !self.password.is_empty() && self.password.len() < MIN_PASSWORD_LEN {
            return Err(ConfigError::PasswordTooShort {
                len: self.password.len(),
                min: MIN_PASSWORD_LEN,
            });
        }
        if self.password.len() > MAX_PASSWORD_LEN {
            return Err(ConfigError::PasswordTooLong {
                len: self.password.len(),
                max: MAX_PASSWORD_LEN,
            });
        }

        Ok(())
    }

    /// Whether this is an open network (no password).
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }

    /// Serialize for NVS storage.
    ///
    /// Format: `[ssid_len:1][ssid:N][password_len:1][password:M]`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(2 + self.ssid.len() + self.password.len());
        bytes.push(self.ssid.len() as u8);
        bytes.extend_from_slice(self.ssid.as_bytes());
        bytes.push(self.password.len() as u8);
        bytes.extend_from_slice(self.password.as_bytes());
        bytes
    }

    /// Deserialize from the NVS byte format. The result is re-validated.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.is_empty() {
            return Err(ConfigError::InvalidFormat("empty record"));
        }

        let ssid_len = bytes[0] as usize;
        if bytes.len() < 1 + ssid_len + 1 {
            return Err(ConfigError::InvalidFormat("truncated SSID"));
        }
        let ssid = std::str::from_utf8(&bytes[1..1 + ssid_len])
            .map_err(|_| ConfigError::InvalidFormat("SSID is not UTF-8"))?;

        let password_len = bytes[1 + ssid_len] as usize;
        let password_start = 2 + ssid_len;
        if bytes.len() < password_start + password_len {
            return Err(ConfigError::InvalidFormat("truncated password"));
        }
        let password = std::str::from_utf8(&bytes[password_start..password_start + password_len])
            .map_err(|_| ConfigError::InvalidFormat("password is not UTF-8"))?;

        Self::new(ssid, password)
    }
}

impl fmt::Debug for WifiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiConfig")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Credential validation and decoding errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// SSID is empty.
    SsidEmpty,
    /// SSID exceeds maximum length.
    SsidTooLong { len: usize, max: usize },
    /// Password is too short for WPA2.
    PasswordTooShort { len: usize, min: usize },
    /// Password exceeds maximum length.
    PasswordTooLong { len: usize, max: usize },
    /// Stored record is malformed.
    InvalidFormat(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SsidEmpty => write!(f, "SSID cannot be empty"),
            Self::SsidTooLong { len, max } => {
                write!(f, "SSID too long: {} bytes (max {})", len, max)
            }
            Self::PasswordTooShort { len, min } => {
                write!(f, "password too short: {} bytes (min {})", len, min)
            }
            Self::PasswordTooLong { len, max } => {
                write!(f, "password too long: {} bytes (max {})", len, max)
            }
            Self::InvalidFormat(msg) => write!(f, "invalid credential record: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = WifiConfig::new("TestNetwork", "password123").unwrap();
        assert_eq!(config.ssid, "TestNetwork");
        assert_eq!(config.password, "password123");
        assert!(!config.is_open());
    }

    #[test]
    fn test_open_network() {
        let config = WifiConfig::open("OpenNetwork").unwrap();
        assert!(config.is_open());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_ssid() {
        assert_eq!(WifiConfig::new("", "password123"), Err(ConfigError::SsidEmpty));
    }

    #[test]
    fn test_ssid_length_bounds() {
        let max_ssid = "a".repeat(32);
        assert!(WifiConfig::new(max_ssid, "password123").is_ok());

        let long_ssid = "a".repeat(33);
        assert!(matches!(
            WifiConfig::new(long_ssid, "password123"),
            Err(ConfigError::SsidTooLong { len: 33, max: 32 })
        ));
    }

    #[test]
    fn test_password_length_bounds() {
        assert!(matches!(
            WifiConfig::new("Net", "1234567"),
            Err(ConfigError::PasswordTooShort { len: 7, min: 8 })
        ));
        assert!(WifiConfig::new("Net", "12345678").is_ok());
        assert!(WifiConfig::new("Net", "a".repeat(64)).is_ok());
        assert!(matches!(
            WifiConfig::new("Net", "a".repeat(65)),
            Err(ConfigError::PasswordTooLong { len: 65, max: 64 })
        ));
    }

    #[test]
    fn test_byte_round_trip() {
        let config = WifiConfig::new("MyNetwork", "MyPassword").unwrap();
        let bytes = config.to_bytes();
        assert_eq!(WifiConfig::from_bytes(&bytes).unwrap(), config);
    }

    #[test]
    fn test_byte_round_trip_open_network() {
        let config = WifiConfig::open("OpenNet").unwrap();
        let restored = WifiConfig::from_bytes(&config.to_bytes()).unwrap();
        assert!(restored.is_open());
        assert_eq!(restored, config);
    }

    #[test]
    fn test_from_bytes_empty() {
        assert!(matches!(
            WifiConfig::from_bytes(&[]),
            Err(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_from_bytes_truncated() {
        // Claims a 5-byte SSID but carries only 4, and no password field.
        assert!(matches!(
            WifiConfig::from_bytes(&[5, b'h', b'e', b'l', b'l']),
            Err(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_from_bytes_revalidates() {
        // Well-formed record, but the password is below the WPA2 minimum.
        let mut bytes = vec![3];
        bytes.extend_from_slice(b"Net");
        bytes.push(5);
        bytes.extend_from_slice(b"short");
        assert!(matches!(
            WifiConfig::from_bytes(&bytes),
            Err(ConfigError::PasswordTooShort { .. })
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = WifiConfig::new("TestNetwork", "password123").unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("TestNetwork"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("password123"));
    }
}
