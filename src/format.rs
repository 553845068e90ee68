use chrono::{DateTime, Utc};

use crate::packet::PacketRecord;

/// UTC wall-clock rendering of a record, e.g. `2025-10-01 12:00:00.000250`
///
/// The fraction is zero-padded to the number of decimal digits of the
/// record's resolution.
pub fn printable_timestamp(record: &PacketRecord) -> String {
    let (secs, subsec) = record.split();
    let whole = i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string());

    match fraction_digits(record.resolution) {
        0 => whole,
        width => format!("{}.{:0width$}", whole, subsec, width = width),
    }
}

fn fraction_digits(resolution: u32) -> usize {
    if resolution <= 1 {
        0
    } else {
        (resolution - 1).to_string().len()
    }
}

/// Short human-readable duration: `12.5s`, `3.0m`, `1.2h`, `2.0d`
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{:.1}s", seconds)
    } else if seconds < 3_600.0 {
        format!("{:.1}m", seconds / 60.0)
    } else if seconds < 86_400.0 {
        format!("{:.1}h", seconds / 3_600.0)
    } else {
        format!("{:.1}d", seconds / 86_400.0)
    }
}

/// `1234567` -> `1,234,567`
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
