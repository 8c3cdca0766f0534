//! One-line notices for the user, mirrored into the event log.

use crate::logging;

pub fn success(message: &str) {
    println!("✔ {message}");
    logging::info_simple("notify.success", message);
}

pub fn error(message: &str) {
    eprintln!("✖ {message}");
    logging::error_simple("notify.error", message);
}
