//! Defensive unit normalization.
//!
//! Canonical units are gibibytes for capacities (rounded to 2 decimals) and
//! megahertz for clocks. Conversion never fails a domain: an unparseable
//! magnitude comes back as the original text (the unparsed literal) and an
//! empty input as `Unknown`.

use crate::field::FieldValue;

/// Bytes per gibibyte.
pub const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Round to 2 decimal places; exact multiples stay exact.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Byte count to GiB.
pub fn bytes_to_gib(raw: &str) -> FieldValue {
    scaled(raw, BYTES_PER_GIB)
}

/// kB count (as in `/proc/meminfo`) to GiB.
pub fn kib_to_gib(raw: &str) -> FieldValue {
    scaled(raw, 1024.0 * 1024.0)
}

/// MB count to GiB.
pub fn mib_to_gib(raw: &str) -> FieldValue {
    scaled(raw, 1024.0)
}

/// kHz count (as in sysfs cpufreq) to MHz.
pub fn khz_to_mhz(raw: &str) -> FieldValue {
    scaled(raw, 1000.0)
}

/// Hz count (as in sysctl `hw.cpufrequency`) to MHz.
pub fn hz_to_mhz(raw: &str) -> FieldValue {
    scaled(raw, 1_000_000.0)
}

/// Mixed-unit capacity string ("512 MB", "2 GB", "46G", "16384 kB", plain
/// byte count) to GiB, detecting the unit token before converting.
pub fn capacity_to_gib(raw: &str) -> FieldValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return FieldValue::Unknown;
    }

    let (number, unit) = split_unit(trimmed);
    let Ok(value) = number.parse::<f64>() else {
        return FieldValue::Text(trimmed.to_string());
    };

    let gib = match unit.to_ascii_lowercase().as_str() {
        "" | "b" | "bytes" => value / BYTES_PER_GIB,
        "k" | "kb" | "kib" => value / (1024.0 * 1024.0),
        "m" | "mb" | "mib" => value / 1024.0,
        "g" | "gb" | "gib" => value,
        "t" | "tb" | "tib" => value * 1024.0,
        _ => return FieldValue::Text(trimmed.to_string()),
    };

    FieldValue::Float(round2(gib))
}

/// Integer passthrough (clock speeds in MHz, counts, cache sizes).
pub fn to_int(raw: &str) -> FieldValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return FieldValue::Unknown;
    }
    match trimmed.parse::<i64>() {
        Ok(value) => FieldValue::Integer(value),
        Err(_) => FieldValue::Text(trimmed.to_string()),
    }
}

/// Float passthrough (fractional MHz readings).
pub fn to_float(raw: &str) -> FieldValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return FieldValue::Unknown;
    }
    match trimmed.parse::<f64>() {
        Ok(value) => FieldValue::Float(value),
        Err(_) => FieldValue::Text(trimmed.to_string()),
    }
}

/// Text passthrough; empty input reads as `Unknown`.
pub fn to_text(raw: &str) -> FieldValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        FieldValue::Unknown
    } else {
        FieldValue::Text(trimmed.to_string())
    }
}

fn scaled(raw: &str, divisor: f64) -> FieldValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return FieldValue::Unknown;
    }
    match trimmed.parse::<f64>() {
        Ok(value) => FieldValue::Float(round2(value / divisor)),
        Err(_) => FieldValue::Text(trimmed.to_string()),
    }
}

fn split_unit(raw: &str) -> (&str, &str) {
    let boundary = raw
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(raw.len());
    (raw[..boundary].trim(), raw[boundary..].trim())
}
