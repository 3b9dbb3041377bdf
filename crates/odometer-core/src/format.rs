//! Distance values and the exact text shown on the matrix.

use core::fmt::Write;
use core::net::Ipv4Addr;

use heapless::String as HeaplessString;

pub const DISPLAY_TEXT_BYTES: usize = 32;

/// Text destined for the matrix; long enough for any realistic distance.
pub type DisplayText = HeaplessString<DISPLAY_TEXT_BYTES>;

/// Unit suffix appended to final distance frames.
pub const UNIT: &str = "km";

/// Finite, non-negative distance in kilometres.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct DistanceKm(f64);

impl DistanceKm {
    pub const ZERO: Self = Self(0.0);
    /// Largest distance shown; every text buffer is sized for it.
    pub const MAX: Self = Self(9_999_999.9);

    /// Rejects NaN/infinity; negative readings (and `-0.0`) clamp to zero,
    /// readings past [`DistanceKm::MAX`] clamp to it.
    pub fn new(km: f64) -> Option<Self> {
        if !km.is_finite() {
            return None;
        }
        Some(Self(if km <= 0.0 { 0.0 } else { km.min(Self::MAX.0) }))
    }

    /// The upstream API reports metres.
    pub fn from_meters(meters: f64) -> Option<Self> {
        Self::new(meters / 1000.0)
    }

    pub const fn get(self) -> f64 {
        self.0
    }
}

/// Integer part of a non-negative value, saturating at `u32::MAX`.
pub fn whole_km(value: f64) -> u32 {
    // `as` truncates toward zero and saturates, which is floor for value >= 0.
    if value <= 0.0 { 0 } else { value as u32 }
}

/// Final-frame text: one decimal place plus unit, e.g. `87.3km`.
pub fn format_distance(distance: DistanceKm) -> DisplayText {
    let mut out = DisplayText::new();
    let _ = write!(out, "{:.1}{}", distance.get(), UNIT);
    out
}

/// Intermediate counting frame: zero-padded to four digits, wider values pass through.
pub fn format_counter(value: u32) -> DisplayText {
    let mut out = DisplayText::new();
    let _ = write!(out, "{:04}", value);
    out
}

/// Increase banner shown before an update animation, e.g. `+12`.
pub fn format_delta(whole_delta: u32) -> DisplayText {
    let mut out = DisplayText::new();
    let _ = write!(out, "+{}", whole_delta);
    out
}

pub fn format_ip(ip: Ipv4Addr) -> DisplayText {
    let mut out = DisplayText::new();
    let _ = write!(out, "IP: {}", ip);
    out
}

/// True when `text` is only digits plus `.`, `k`, `m`, with at least one digit.
///
/// Such text is drawn with the large numeric font.
pub fn is_numeric_text(text: &str) -> bool {
    let mut digits = 0usize;
    for c in text.chars() {
        match c {
            '.' | 'k' | 'm' => {}
            c if c.is_ascii_digit() => digits += 1,
            _ => return false,
        }
    }
    digits > 0
}

/// Removes every `km` occurrence; the large font has no letters.
pub fn strip_unit(text: &str) -> DisplayText {
    let mut out = DisplayText::new();
    let mut rest = text;
    while let Some(idx) = rest.find(UNIT) {
        let _ = out.push_str(&rest[..idx]);
        rest = &rest[idx + UNIT.len()..];
    }
    let _ = out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn km(value: f64) -> DistanceKm {
        DistanceKm::new(value).unwrap()
    }

    #[test]
    fn distance_rejects_non_finite_and_clamps_negative() {
        assert_eq!(DistanceKm::new(f64::NAN), None);
        assert_eq!(DistanceKm::new(f64::INFINITY), None);
        assert_eq!(km(-3.0).get(), 0.0);
        assert_eq!(format_distance(km(-0.0)).as_str(), "0.0km");
    }

    #[test]
    fn huge_readings_clamp_and_keep_their_unit() {
        assert_eq!(km(1e30), DistanceKm::MAX);
        assert_eq!(DistanceKm::from_meters(f64::MAX), Some(DistanceKm::MAX));
        assert_eq!(format_distance(km(1e30)).as_str(), "9999999.9km");
        assert_eq!(format_counter(whole_km(DistanceKm::MAX.get())).as_str(), "9999999");
    }

    #[test]
    fn meters_convert_to_kilometres() {
        assert_eq!(DistanceKm::from_meters(87_300.0), Some(km(87.3)));
    }

    #[test]
    fn final_frame_text_has_one_decimal_and_unit() {
        assert_eq!(format_distance(km(87.3)).as_str(), "87.3km");
        assert_eq!(format_distance(km(120.0)).as_str(), "120.0km");
        assert_eq!(format_distance(km(120.44)).as_str(), "120.4km");
        assert_eq!(format_distance(km(0.0)).as_str(), "0.0km");
    }

    #[test]
    fn counter_is_zero_padded_and_widens_past_four_digits() {
        assert_eq!(format_counter(0).as_str(), "0000");
        assert_eq!(format_counter(87).as_str(), "0087");
        assert_eq!(format_counter(9999).as_str(), "9999");
        assert_eq!(format_counter(12345).as_str(), "12345");
    }

    #[test]
    fn whole_km_floors_non_negative_values() {
        assert_eq!(whole_km(0.0), 0);
        assert_eq!(whole_km(-1.5), 0);
        assert_eq!(whole_km(86.999), 86);
        assert_eq!(whole_km(1e12), u32::MAX);
    }

    #[test]
    fn numeric_detection_allows_decimal_and_unit_only() {
        assert!(is_numeric_text("0087"));
        assert!(is_numeric_text("87.3km"));
        assert!(!is_numeric_text("+12"));
        assert!(!is_numeric_text("Error"));
        assert!(!is_numeric_text("km"));
        assert!(!is_numeric_text(""));
    }

    #[test]
    fn unit_is_stripped_everywhere() {
        assert_eq!(strip_unit("87.3km").as_str(), "87.3");
        assert_eq!(strip_unit("1km2km").as_str(), "12");
        assert_eq!(strip_unit("0087").as_str(), "0087");
    }

    #[test]
    fn banners_format_as_shown_on_device() {
        assert_eq!(format_delta(12).as_str(), "+12");
        assert_eq!(
            format_ip(Ipv4Addr::new(192, 168, 1, 42)).as_str(),
            "IP: 192.168.1.42"
        );
    }
}
