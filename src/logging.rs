// Logger setup. Debug output is only let through when the allowDebugLogs setting is on.

use std::io::Write;

use env_logger::Env;

use crate::settings::Settings;

/// Installs the logger once; later calls are no-ops.
pub fn init() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("debug"))
        .format(|buf, record| writeln!(buf, "TabList: [{}] {}", record.level(), record.args()))
        .try_init();
    log::set_max_level(log::LevelFilter::Info);
}

pub fn apply_settings(settings: &Settings) {
    log::set_max_level(settings.log_level());
}
