//! Human-readable formatting for document metadata

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Format a byte count with binary units and at most two decimals,
/// e.g. `1536` → `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut scaled = bytes as f64;
    let mut exponent = 0;
    while scaled >= 1024.0 && exponent < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        exponent += 1;
    }

    let rendered = format!("{scaled:.2}");
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{rendered} {}", SIZE_UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1_048_576), "1 MB");
        assert_eq!(format_file_size(5_368_709_120), "5 GB");
    }
}
