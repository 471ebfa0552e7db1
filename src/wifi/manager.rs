//! Station manager facade.
//!
//! Wraps the ESP-IDF WiFi driver behind a small connect/status/credential
//! interface. `start` is non-blocking: a supervisor thread runs the connect
//! sequence, publishes the outcome on the station event bits and keeps
//! watching the link, reconnecting when it drops.

use std::fmt;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::{EspNvsPartition, NvsDefault};
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use esp_idf_sys::EspError;
use log::{info, warn};

use super::config::{ConfigError, WifiConfig};
use super::events::StationEvents;
use super::retry::{ConnectionState, RetryPolicy};
use super::scan::{format_scan_table, sort_strongest_first, AccessPoint};
use super::storage::CredentialStore;
use super::sync::EventGroup;

/// How often the supervisor checks an established link.
const LINK_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Stack size for the supervisor thread; driver calls need headroom beyond
/// the ESP-IDF pthread default.
const SUPERVISOR_STACK_BYTES: usize = 8 * 1024;

type SharedWifi = Arc<Mutex<BlockingWifi<EspWifi<'static>>>>;

/// WiFi station manager.
///
/// Constructed once via [`WifiManager::init`]; every operation is a method,
/// so nothing can be called on an uninitialized stack.
pub struct WifiManager {
    wifi: SharedWifi,
    store: Arc<Mutex<CredentialStore>>,
    events: StationEvents,
    state: Arc<Mutex<ConnectionState>>,
    ip: Arc<Mutex<Ipv4Addr>>,
    policy: RetryPolicy,
    started: Arc<AtomicBool>,
}

impl WifiManager {
    /// One-time setup: wrap the modem in the driver, register with the
    /// system event loop and open the credential store.
    ///
    /// Fails if the driver is already owned elsewhere or NVS is unusable.
    pub fn init(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        partition: EspNvsPartition<NvsDefault>,
    ) -> Result<Self, WifiError> {
        Self::init_with_policy(modem, sysloop, partition, RetryPolicy::default())
    }

    /// [`init`](Self::init) with a custom reconnect policy.
    pub fn init_with_policy(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        partition: EspNvsPartition<NvsDefault>,
        policy: RetryPolicy,
    ) -> Result<Self, WifiError> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(partition.clone()))?;
        let wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;
        let store = CredentialStore::open(partition).map_err(WifiError::Storage)?;

        Ok(Self {
            wifi: Arc::new(Mutex::new(wifi)),
            store: Arc::new(Mutex::new(store)),
            events: StationEvents::new(),
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
            ip: Arc::new(Mutex::new(Ipv4Addr::UNSPECIFIED)),
            policy,
            started: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Begin associating with the stored credentials. Non-blocking; the
    /// outcome arrives on the event bits.
    ///
    /// Fails if no credentials are stored or the supervisor is already
    /// running.
    pub fn start(&self) -> Result<(), WifiError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(WifiError::AlreadyStarted);
        }

        let config = match lock(&self.store).load() {
            Some(config) => config,
            None => {
                self.started.store(false, Ordering::SeqCst);
                return Err(WifiError::NotConfigured);
            }
        };

        self.events.connecting();
        *lock(&self.state) = ConnectionState::Connecting;

        let wifi = Arc::clone(&self.wifi);
        let events = self.events.clone();
        let state = Arc::clone(&self.state);
        let ip = Arc::clone(&self.ip);
        let started = Arc::clone(&self.started);
        let policy = self.policy;

        thread::Builder::new()
            .name("wifi-supervisor".into())
            .stack_size(SUPERVISOR_STACK_BYTES)
            .spawn(move || {
                supervise(&wifi, &config, policy, &events, &state, &ip);
                started.store(false, Ordering::SeqCst);
            })
            .map_err(WifiError::Io)?;

        Ok(())
    }

    /// Block until the connection outcome is known or `timeout` elapses.
    ///
    /// `None` waits forever. Returns `Ok` only when connected; a published
    /// failure ends the wait early but still reports [`WifiError::Timeout`].
    pub fn wait_connected(&self, timeout: Option<Duration>) -> Result<(), WifiError> {
        if self.events.wait_connected(timeout) {
            Ok(())
        } else {
            Err(WifiError::Timeout)
        }
    }

    /// Non-blocking snapshot of the CONNECTED bit.
    pub fn is_connected(&self) -> bool {
        self.events.is_connected()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *lock(&self.state)
    }

    /// Cached station IP address. `0.0.0.0` whenever not connected; no
    /// network I/O.
    pub fn ip(&self) -> Ipv4Addr {
        if self.is_connected() {
            *lock(&self.ip)
        } else {
            Ipv4Addr::UNSPECIFIED
        }
    }

    /// Validate and persist a credential set. Takes effect on the next
    /// [`start`](Self::start).
    pub fn set_credentials(&self, ssid: &str, password: &str) -> Result<(), WifiError> {
        let config = WifiConfig::new(ssid, password)?;
        lock(&self.store).save(&config).map_err(WifiError::Storage)?;
        info!("stored credentials for '{}'", config.ssid);
        Ok(())
    }

    /// Remove the stored credential set.
    pub fn clear_credentials(&self) -> Result<(), WifiError> {
        lock(&self.store).clear().map_err(WifiError::Storage)?;
        info!("cleared stored credentials");
        Ok(())
    }

    /// Whether a credential set is stored.
    pub fn is_configured(&self) -> bool {
        lock(&self.store).load().is_some()
    }

    /// The station event group ([`CONNECTED_BIT`](super::CONNECTED_BIT) /
    /// [`FAIL_BIT`](super::FAIL_BIT)), for callers that want to wait on it
    /// alongside bits of their own. Shared ownership.
    pub fn event_group(&self) -> Arc<EventGroup> {
        self.events.group()
    }

    /// Active scan for nearby access points, strongest first.
    ///
    /// Starts the driver if it is not running yet. Contends with a
    /// supervisor connect attempt for the driver, so a scan issued while
    /// associating waits for the attempt to finish.
    pub fn scan(&self) -> Result<Vec<AccessPoint>, WifiError> {
        let mut wifi = lock(&self.wifi);
        if !wifi.is_started()? {
            wifi.start()?;
        }
        let infos = wifi.scan().map_err(WifiError::ScanFailed)?;
        let mut aps: Vec<AccessPoint> = infos.iter().map(AccessPoint::from).collect();
        sort_strongest_first(&mut aps);
        Ok(aps)
    }

    /// [`scan`](Self::scan) and log the result table; errors are logged,
    /// not returned.
    pub fn scan_and_log(&self) {
        match self.scan() {
            Ok(aps) => {
                for line in format_scan_table(&aps).lines() {
                    info!("{}", line);
                }
            }
            Err(e) => warn!("scan failed: {}", e),
        }
    }
}

/// Connect, monitor, reconnect; give up when the retry budget is spent.
fn supervise(
    wifi: &SharedWifi,
    config: &WifiConfig,
    policy: RetryPolicy,
    events: &StationEvents,
    state: &Mutex<ConnectionState>,
    ip: &Mutex<Ipv4Addr>,
) {
    let mut failures = 0u32;
    loop {
        match connect_once(wifi, config) {
            Ok(addr) => {
                failures = 0;
                *lock(ip) = addr;
                *lock(state) = ConnectionState::Connected;
                events.publish_connected();
                info!("connected to '{}', ip {}", config.ssid, addr);

                monitor_link(wifi);

                warn!("link to '{}' lost, reconnecting", config.ssid);
                *lock(ip) = Ipv4Addr::UNSPECIFIED;
                *lock(state) = ConnectionState::Connecting;
                events.connecting();
            }
            Err(e) => {
                failures += 1;
                match policy.delay_after_failure(failures) {
                    Some(delay) => {
                        warn!(
                            "connect attempt {} to '{}' failed: {}; retrying in {:?}",
                            failures, config.ssid, e, delay
                        );
                        thread::sleep(delay);
                    }
                    None => {
                        warn!(
                            "giving up on '{}' after {} attempts: {}",
                            config.ssid, failures, e
                        );
                        *lock(state) = ConnectionState::Disconnected;
                        events.publish_failed();
                        return;
                    }
                }
            }
        }
    }
}

/// One full connect sequence: configure, start, associate, wait for DHCP.
fn connect_once(wifi: &SharedWifi, config: &WifiConfig) -> Result<Ipv4Addr, WifiError> {
    let mut wifi = lock(wifi);

    let auth_method = if config.is_open() {
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    };

    let client = Configuration::Client(ClientConfiguration {
        ssid: config
            .ssid
            .as_str()
            .try_into()
            .map_err(|_| WifiError::InvalidSsid)?,
        password: config
            .password
            .as_str()
            .try_into()
            .map_err(|_| WifiError::InvalidPassword)?,
        auth_method,
        ..Default::default()
    });
    wifi.set_configuration(&client)?;

    if !wifi.is_started()? {
        wifi.start()?;
    }

    if let Err(e) = wifi.connect() {
        // Leave the driver idle so the next attempt starts clean.
        let _ = wifi.disconnect();
        return Err(WifiError::ConnectionFailed(e));
    }
    wifi.wait_netif_up().map_err(WifiError::DhcpFailed)?;

    let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
    Ok(ip_info.ip)
}

/// Block until the established link drops.
fn monitor_link(wifi: &SharedWifi) {
    loop {
        thread::sleep(LINK_POLL_INTERVAL);
        let up = lock(wifi).is_connected().unwrap_or(false);
        if !up {
            return;
        }
    }
}

// State behind these mutexes stays valid even if a holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Errors from station manager operations.
#[derive(Debug)]
pub enum WifiError {
    /// No credentials stored.
    NotConfigured,
    /// The supervisor is already running.
    AlreadyStarted,
    /// SSID does not fit the driver configuration.
    InvalidSsid,
    /// Password does not fit the driver configuration.
    InvalidPassword,
    /// Credentials rejected by validation.
    InvalidCredentials(ConfigError),
    /// Association with the access point failed.
    ConnectionFailed(EspError),
    /// Associated, but no DHCP lease arrived.
    DhcpFailed(EspError),
    /// Active scan failed.
    ScanFailed(EspError),
    /// NVS read or write failed.
    Storage(EspError),
    /// `wait_connected` ran out of time, or the connection was given up on.
    Timeout,
    /// Other ESP-IDF error.
    Esp(EspError),
    /// Thread spawn failed.
    Io(std::io::Error),
}

impl From<EspError> for WifiError {
    fn from(e: EspError) -> Self {
        Self::Esp(e)
    }
}

impl From<ConfigError> for WifiError {
    fn from(e: ConfigError) -> Self {
        Self::InvalidCredentials(e)
    }
}

impl fmt::Display for WifiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "no WiFi credentials stored"),
            Self::AlreadyStarted => write!(f, "WiFi supervisor already running"),
            Self::InvalidSsid => write!(f, "invalid SSID"),
            Self::InvalidPassword => write!(f, "invalid password"),
            Self::InvalidCredentials(e) => write!(f, "invalid credentials: {}", e),
            Self::ConnectionFailed(e) => write!(f, "connection failed: {:?}", e),
            Self::DhcpFailed(e) => write!(f, "DHCP failed: {:?}", e),
            Self::ScanFailed(e) => write!(f, "scan failed: {:?}", e),
            Self::Storage(e) => write!(f, "credential storage failed: {:?}", e),
            Self::Timeout => write!(f, "timed out waiting for connection"),
            Self::Esp(e) => write!(f, "ESP error: {:?}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for WifiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidCredentials(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}
