//! Unit conversions and value normalization shared by metric tasks.

const MIB: f64 = 1024.0 * 1024.0;

/// Bytes to mebibytes
pub fn mb(bytes: f64) -> f64 {
    bytes / MIB
}

/// Bytes to whole mebibytes, floored
pub fn mb_floor(bytes: u64) -> u64 {
    bytes / (1024 * 1024)
}

/// Bytes to megabits
pub fn mbits(bytes: f64) -> f64 {
    bytes * 8.0 / MIB
}

/// Round to a fixed number of decimal places
pub fn decimal(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// Percentage of `part` in `total`, zero when the total is empty
pub fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// Lowercased, trimmed text; empty strings become absent
pub fn text<S: AsRef<str>>(value: S) -> Option<String> {
    let value = value.as_ref().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_lowercase())
    }
}
