//! Human-readable byte counts.

const SIZE_UNITS: [&str; 9] = ["byte", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Format a byte count, e.g. `1536` → `"1.50 KiB"`.
///
/// With `si` the divisor is 1000 (`KB`), otherwise 1024 with JEDEC/IEC
/// style names (`KiB`).
pub fn format_bytes(size: u64, si: bool) -> String {
    let divisor = if si { 1000.0 } else { 1024.0 };
    let mut value = size as f64;
    let mut order = 0;

    while value > 1000.0 && order < SIZE_UNITS.len() - 1 {
        value /= divisor;
        order += 1;
    }

    if order == 0 {
        let plural = if size == 1 { "" } else { "s" };
        return format!("{:.2} byte{}", value, plural);
    }

    let unit = SIZE_UNITS[order];
    if si {
        format!("{:.2} {}", value, unit)
    } else {
        format!("{:.2} {}", value, unit.replace('B', "iB"))
    }
}
