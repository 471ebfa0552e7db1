//! Station demo binary.
//!
//! Scans, connects with the stored credentials and reports the IP address.
//! Credentials can be baked in at build time via the `WIFI_SSID` /
//! `WIFI_PASSWORD` environment variables.

#[cfg(feature = "esp32")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::time::Duration;

    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use wifi_station_esp32::WifiManager;

    // Link ESP-IDF patches (must be first!)
    esp_idf_sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let partition = EspDefaultNvsPartition::take()?;

    let manager = WifiManager::init(peripherals.modem, sysloop, partition)?;

    if let (Some(ssid), Some(password)) = (option_env!("WIFI_SSID"), option_env!("WIFI_PASSWORD"))
    {
        manager.set_credentials(ssid, password)?;
    }

    manager.scan_and_log();

    if !manager.is_configured() {
        log::warn!("no credentials stored; rebuild with WIFI_SSID/WIFI_PASSWORD set");
        return Ok(());
    }

    manager.start()?;
    match manager.wait_connected(Some(Duration::from_secs(30))) {
        Ok(()) => log::info!("up with ip {}", manager.ip()),
        Err(e) => log::warn!("not connected: {}", e),
    }

    loop {
        std::thread::sleep(Duration::from_secs(10));
        log::info!("state: {}, ip {}", manager.state(), manager.ip());
    }
}

#[cfg(not(feature = "esp32"))]
fn main() {
    env_logger::init();
    log::info!("this binary targets ESP32 hardware");
    println!("Build with --features esp32 for the device binary.");
    println!("Use 'cargo test' to run the host test suite.");
}
