//! Size label arithmetic
//!
//! Labels look like `"900 MB"` or `"2.5 GB"`; units are binary multiples.

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Parse a size label into megabytes. `None` if the label is not `<number> <unit>`.
pub fn parse_size_mb(label: &str) -> Option<f64> {
    let label = label.trim();
    let split = label
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(label.len());
    let (number, unit) = label.split_at(split);
    let value: f64 = number.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let factor = match unit.trim().to_ascii_uppercase().as_str() {
        "B" => 1.0 / MIB,
        "KB" => 1.0 / KIB,
        "MB" | "" => 1.0,
        "GB" => KIB,
        "TB" => KIB * KIB,
        _ => return None,
    };
    Some(value * factor)
}

/// Byte count for a size label, rounded to the nearest byte.
pub fn parse_size_bytes(label: &str) -> Option<u64> {
    parse_size_mb(label).map(|mb| (mb * MIB).round() as u64)
}

/// Render a total expressed in megabytes: above 1024 MB as one-decimal GB,
/// otherwise as whole MB.
pub fn format_total_mb(total_mb: f64) -> String {
    if total_mb > 1024.0 {
        format!("{:.1} GB", total_mb / 1024.0)
    } else {
        format!("{:.0} MB", total_mb)
    }
}

/// Display label for a byte count, e.g. `"1.5 GB"` or `"900 MB"`.
pub fn format_size(bytes: u64) -> String {
    let value = bytes as f64;
    let (scaled, unit) = if value < KIB {
        return format!("{bytes} B");
    } else if value < MIB {
        (value / KIB, "KB")
    } else if value < MIB * KIB {
        (value / MIB, "MB")
    } else {
        (value / (MIB * KIB), "GB")
    };
    let rendered = format!("{scaled:.1}");
    let rendered = rendered.strip_suffix(".0").unwrap_or(&rendered);
    format!("{rendered} {unit}")
}
