//! `log` backend that writes to the browser console

use std::str::FromStr;
use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;

/// Routes records to the console method matching their level
pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format_record(record.level(), record.target(), &record.args().to_string()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Install the console logger. Safe to call more than once; later calls only
/// change the level.
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("console logger already installed");
    }
    log::set_max_level(level);
}

/// Parse a level name such as "debug" or "WARN"
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    LevelFilter::from_str(name.trim()).ok()
}

/// Change the level at runtime. Unknown names leave it unchanged.
pub fn set_level(name: &str) -> bool {
    match parse_level(name) {
        Some(level) => {
            log::set_max_level(level);
            true
        }
        None => {
            log::warn!("unknown log level '{}'", name);
            false
        }
    }
}

/// `[LEVEL target] message`, with the crate prefix stripped from the target
pub fn format_record(level: Level, target: &str, message: &str) -> String {
    let target = target.strip_prefix("autumn_canopy::").unwrap_or(target);
    format!("[{} {}] {}", level, target, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level(" WARN "), Some(LevelFilter::Warn));
        assert_eq!(parse_level("off"), Some(LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_format_record() {
        assert_eq!(
            format_record(Level::Info, "autumn_canopy::simulation", "scene ready"),
            "[INFO simulation] scene ready"
        );
        assert_eq!(format_record(Level::Warn, "other", "x"), "[WARN other] x");
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let _ = env_logger::builder().is_test(true).try_init();
        assert!(!set_level("chatty"));
    }
}
