//! Internal constants for PDF generation.

use std::time::Duration;

/// Default wall-clock limit for one browser run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How often a running browser is polled for exit.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A4 paper width in inches.
pub const A4_WIDTH_IN: f64 = 8.27;

/// A4 paper height in inches.
pub const A4_HEIGHT_IN: f64 = 11.7;

/// Browser binaries probed on `PATH`, in order.
pub const CHROME_CANDIDATES: &[&str] = &[
    "google-chrome-stable",
    "google-chrome",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Environment variable naming an explicit browser binary.
pub const CHROME_ENV: &str = "CHROME_BIN";

/// Bytes of browser stderr kept in error messages.
pub const STDERR_TAIL: usize = 2048;
