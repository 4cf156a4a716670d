//! Human-readable byte sizes in binary units.

const UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Index into the unit list for `bytes`: `floor(log_1024(bytes))`, clamped.
///
/// Computed with integer division so exact powers of 1024 never fall into
/// the unit below.
pub fn unit_index(bytes: u64) -> usize {
    let mut index = 0;
    let mut scaled = bytes;
    while scaled >= 1024 && index < UNITS.len() - 1 {
        scaled /= 1024;
        index += 1;
    }
    index
}

/// Format a byte count, e.g. `1048576` → `"1.0 MB"`.
///
/// Zero is special-cased as `"0B"`. Otherwise the value is divided by
/// `1024^unit_index`, rounded to two decimals and printed with at least one
/// fractional digit.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }

    let index = unit_index(bytes);
    let scaled = bytes as f64 / 1024f64.powi(index as i32);
    let rounded = (scaled * 100.0).round() / 100.0;

    // Debug prints the shortest round-trip form and always keeps ".0"
    format!("{:?} {}", rounded, UNITS[index])
}

/// Format a signed byte delta; negative values get a leading `-`.
pub fn format_signed_bytes(bytes: i64) -> String {
    let magnitude = format_bytes(bytes.unsigned_abs());
    if bytes < 0 {
        format!("-{magnitude}")
    } else {
        magnitude
    }
}
