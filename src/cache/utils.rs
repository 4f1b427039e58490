//! Utility functions for the cache module

/// Format a byte count with SI units (powers of 1000) and one decimal place.
pub fn human_size(bytes: usize) -> String {
    const UNITS: &[&str] = &["kB", "MB", "GB", "TB", "PB"];
    const THRESHOLD: f64 = 1000.0;

    if (bytes as f64) < THRESHOLD {
        return format!("{bytes} B");
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    loop {
        size /= THRESHOLD;
        // Round first so 999_950 reads as "1.0 MB" rather than "1000.0 kB"
        if (size * 10.0).round() / 10.0 < THRESHOLD || unit == UNITS.len() - 1 {
            break;
        }
        unit += 1;
    }

    format!("{size:.1} {}", UNITS[unit])
}
