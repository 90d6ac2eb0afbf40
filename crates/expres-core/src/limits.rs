//! Hard caps. These are fixed at compile time and intentionally absent from
//! `ExpresConfig`.

use std::time::Duration;

/// Maximum length of a voice note.
pub const MAX_RECORDING_DURATION: Duration = Duration::from_secs(30);

/// Interval at which the recorder position is sampled while recording.
pub const RECORDING_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Maximum size of the final media attachment (100 MiB).
pub const MAX_MEDIA_BYTES: u64 = 100 * 1024 * 1024;

/// Format a duration as `mm:ss`, truncating sub-second precision.
pub fn format_mm_ss(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
