//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Convert a u32 counter to f64.
#[must_use]
pub fn u32_to_f64(value: u32) -> f64 {
    f64::from(value)
}

/// Share of `part` in `whole` expressed as 0-100, returning 0.0 for an empty whole.
#[must_use]
pub fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    u32_to_f64(part) / u32_to_f64(whole) * 100.0
}

/// Same as [`percentage`] for `usize` counts.
#[must_use]
pub fn percentage_usize(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    usize_to_f64(part) / usize_to_f64(whole) * 100.0
}

/// Clamp a percentage into `[0, 100]`, mapping NaN to 0.
#[must_use]
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Replace negative or non-finite durations with zero seconds.
#[must_use]
pub fn sanitize_seconds(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Convert a count to u32, saturating at `u32::MAX`.
#[must_use]
pub fn usize_to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Round a f64 and clamp it to the u32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_u32(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(0.0, max).round();
    cast::<f64, u32>(clamped).unwrap_or(0)
}
