/// Renders remaining time as `MM:SS`, or `HH:MM:SS` from one hour up.
///
/// Partial seconds round up so `00:00` only shows once time has run out.
pub fn format_remaining(remaining_ms: u64) -> String {
    let total_secs = remaining_ms.div_ceil(1_000);
    let hours = total_secs / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}
