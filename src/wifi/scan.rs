//! Scan results.
//!
//! Structured access-point records from an active scan, plus a plain-text
//! table formatter for logs and serial consoles.

use std::fmt;

/// Security of a scanned network, reduced to what a user picking a network
/// cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Open,
    Wep,
    Wpa,
    Wpa2Personal,
    Wpa3Personal,
    Enterprise,
    Unknown,
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::Wep => "WEP",
            Self::Wpa => "WPA",
            Self::Wpa2Personal => "WPA2",
            Self::Wpa3Personal => "WPA3",
            Self::Enterprise => "802.1X",
            Self::Unknown => "?",
        };
        write!(f, "{}", s)
    }
}

/// One network seen during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPoint {
    pub ssid: String,
    pub channel: u8,
    /// Received signal strength in dBm (more negative is weaker).
    pub rssi_dbm: i8,
    pub auth: AuthKind,
}

impl fmt::Display for AccessPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (ch {}, {} dBm, {})",
            self.ssid, self.channel, self.rssi_dbm, self.auth
        )
    }
}

/// Order scan results strongest signal first; ties break on SSID so the
/// output is stable.
pub fn sort_strongest_first(aps: &mut [AccessPoint]) {
    aps.sort_by(|a, b| {
        b.rssi_dbm
            .cmp(&a.rssi_dbm)
            .then_with(|| a.ssid.cmp(&b.ssid))
    });
}

/// Render scan results as an aligned text table.
pub fn format_scan_table(aps: &[AccessPoint]) -> String {
    use fmt::Write;

    let mut out = String::new();
    if aps.is_empty() {
        out.push_str("no networks found");
        return out;
    }

    let _ = writeln!(out, "{} network(s):", aps.len());
    let _ = writeln!(out, "{:<32} {:>7} {:>4}  {}", "SSID", "RSSI", "CH", "Auth");
    for ap in aps {
        let _ = writeln!(
            out,
            "{:<32} {:>4}dBm {:>4}  {}",
            ap.ssid, ap.rssi_dbm, ap.channel, ap.auth
        );
    }
    // Drop the trailing newline so callers can log line by line.
    out.truncate(out.trim_end().len());
    out
}

#[cfg(feature = "esp32")]
mod esp {
    use super::{AccessPoint, AuthKind};
    use esp_idf_svc::wifi::{AccessPointInfo, AuthMethod};

    impl From<&AccessPointInfo> for AccessPoint {
        fn from(info: &AccessPointInfo) -> Self {
            Self {
                ssid: info.ssid.as_str().to_string(),
                channel: info.channel,
                rssi_dbm: info.signal_strength,
                auth: info.auth_method.map_or(AuthKind::Open, AuthKind::from),
            }
        }
    }

    impl From<AuthMethod> for AuthKind {
        fn from(method: AuthMethod) -> Self {
            match method {
                AuthMethod::None => Self::Open,
                AuthMethod::WEP => Self::Wep,
                AuthMethod::WPA => Self::Wpa,
                AuthMethod::WPA2Personal | AuthMethod::WPAWPA2Personal => Self::Wpa2Personal,
                AuthMethod::WPA3Personal | AuthMethod::WPA2WPA3Personal => Self::Wpa3Personal,
                AuthMethod::WPA2Enterprise => Self::Enterprise,
                _ => Self::Unknown,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ap(ssid: &str, rssi: i8) -> AccessPoint {
        AccessPoint {
            ssid: ssid.to_string(),
            channel: 6,
            rssi_dbm: rssi,
            auth: AuthKind::Wpa2Personal,
        }
    }

    #[test]
    fn test_sort_strongest_first() {
        let mut aps = vec![ap("weak", -88), ap("strong", -41), ap("mid", -63)];
        sort_strongest_first(&mut aps);
        let order: Vec<&str> = aps.iter().map(|a| a.ssid.as_str()).collect();
        assert_eq!(order, ["strong", "mid", "weak"]);
    }

    #[test]
    fn test_sort_ties_break_on_ssid() {
        let mut aps = vec![ap("bbb", -50), ap("aaa", -50)];
        sort_strongest_first(&mut aps);
        assert_eq!(aps[0].ssid, "aaa");
    }

    #[test]
    fn test_display() {
        let ap = AccessPoint {
            ssid: "HomeNet".to_string(),
            channel: 11,
            rssi_dbm: -52,
            auth: AuthKind::Wpa3Personal,
        };
        assert_eq!(ap.to_string(), "HomeNet (ch 11, -52 dBm, WPA3)");
    }

    #[test]
    fn test_format_table_empty() {
        assert_eq!(format_scan_table(&[]), "no networks found");
    }

    #[test]
    fn test_format_table_rows() {
        let aps = vec![ap("HomeNet", -52), ap("Cafe", -70)];
        let table = format_scan_table(&aps);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "2 network(s):");
        assert!(lines[1].starts_with("SSID"));
        assert!(lines[2].contains("HomeNet"));
        assert!(lines[2].contains("-52dBm"));
        assert!(lines[3].contains("Cafe"));
    }
}
