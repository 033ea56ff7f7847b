//! Timer helpers shared by every surface that shows an exam clock.

/// Formats a number of seconds as `H:MM:SS`, or `M:SS` when under an hour.
#[must_use]
pub fn format_duration(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Seconds left on an exam of `duration_minutes`, never below zero.
#[must_use]
pub fn remaining_time(elapsed_seconds: u32, duration_minutes: u32) -> u32 {
    duration_minutes
        .saturating_mul(60)
        .saturating_sub(elapsed_seconds)
}
