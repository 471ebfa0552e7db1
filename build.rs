fn main() {
    // The ESP-IDF build system only applies when cross-compiling for an
    // ESP-IDF target (Xtensa or RISC-V); build scripts run on the host.
    if std::env::var("TARGET").is_ok_and(|target| target.contains("espidf")) {
        embuild::espidf::sysenv::output();
    }
}
