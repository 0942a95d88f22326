//! Browser console logging

/// Log an info message to the browser console
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => {
        $crate::logging::log(&format_args!($($t)*).to_string())
    }
}

/// Log a warning message to the browser console
#[macro_export]
macro_rules! console_warn {
    ($($t:tt)*) => {
        $crate::logging::warn(&format_args!($($t)*).to_string())
    }
}

/// Log an error message to the browser console
#[macro_export]
macro_rules! console_error {
    ($($t:tt)*) => {
        $crate::logging::error(&format_args!($($t)*).to_string())
    }
}

/// Write to `console.log`.
#[cfg(target_arch = "wasm32")]
pub fn log(message: &str) {
    web_sys::console::log_1(&message.into());
}

/// Write to `console.warn`.
#[cfg(target_arch = "wasm32")]
pub fn warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

/// Write to `console.error`.
#[cfg(target_arch = "wasm32")]
pub fn error(message: &str) {
    web_sys::console::error_1(&message.into());
}

/// Write to stderr when running natively, e.g. under unit tests.
#[cfg(not(target_arch = "wasm32"))]
pub fn log(message: &str) {
    eprintln!("{message}");
}

/// Write to stderr when running natively.
#[cfg(not(target_arch = "wasm32"))]
pub fn warn(message: &str) {
    eprintln!("WARN: {message}");
}

/// Write to stderr when running natively.
#[cfg(not(target_arch = "wasm32"))]
pub fn error(message: &str) {
    eprintln!("ERROR: {message}");
}
