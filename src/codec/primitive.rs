//! Scalar conversions between XML text and typed values.
//!
//! Overflow policy differs between definition bounds and value content.
//! Bounds are metadata describing a declared domain, so an out-of-range
//! bound clamps to the nearest representable extreme and parsing
//! continues. Value content is user data, so an out-of-range value is
//! logged and replaced by zero. Text that is not a number at all is a hard
//! failure for both.

use std::num::IntErrorKind;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use tracing::{trace, warn};

use super::Error;

/// Parses an XML boolean (`true` / `false` / `1` / `0`).
///
/// # Errors
///
/// Returns [`Error::InvalidScalar`] for any other text.
pub fn parse_bool(field: &'static str, text: &str) -> Result<bool, Error> {
    match text.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(Error::InvalidScalar {
            field,
            value: other.to_owned(),
        }),
    }
}

/// Formats a boolean in XML lexical space.
#[must_use]
pub const fn format_bool(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Parses a 64-bit integer definition bound.
///
/// Textually out-of-range bounds clamp to the nearest representable
/// extreme.
///
/// # Errors
///
/// Returns [`Error::InvalidScalar`] when the text is not an integer at all.
pub fn parse_i64_bound(field: &'static str, text: &str) -> Result<i64, Error> {
    let trimmed = text.trim();
    match trimmed.parse::<i64>() {
        Ok(value) => Ok(value),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => {
                trace!(field, value = trimmed, "integer bound clamped to i64::MAX");
                Ok(i64::MAX)
            }
            IntErrorKind::NegOverflow => {
                trace!(field, value = trimmed, "integer bound clamped to i64::MIN");
                Ok(i64::MIN)
            }
            _ => Err(Error::InvalidScalar {
                field,
                value: trimmed.to_owned(),
            }),
        },
    }
}

/// Parses a 64-bit integer attribute value.
///
/// Textually out-of-range values are logged and replaced by zero; the
/// precise magnitude cannot be represented, and a neutral substitute is
/// preferable to aborting the whole document.
///
/// # Errors
///
/// Returns [`Error::InvalidScalar`] when the text is not an integer at all.
pub fn parse_i64_value(field: &'static str, text: &str) -> Result<i64, Error> {
    let trimmed = text.trim();
    match trimmed.parse::<i64>() {
        Ok(value) => Ok(value),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                warn!(
                    field,
                    value = trimmed,
                    "integer value out of 64-bit range, substituting 0"
                );
                Ok(0)
            }
            _ => Err(Error::InvalidScalar {
                field,
                value: trimmed.to_owned(),
            }),
        },
    }
}

/// Parses an unsigned integer-like bound (accuracy, maximum length).
///
/// Out-of-range text clamps to `u64::MAX`.
///
/// # Errors
///
/// Returns [`Error::InvalidScalar`] when the text is not an integer at all.
pub fn parse_u64_bound(field: &'static str, text: &str) -> Result<u64, Error> {
    let trimmed = text.trim();
    match trimmed.parse::<u64>() {
        Ok(value) => Ok(value),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => {
                trace!(field, value = trimmed, "bound clamped to u64::MAX");
                Ok(u64::MAX)
            }
            _ => Err(Error::InvalidScalar {
                field,
                value: trimmed.to_owned(),
            }),
        },
    }
}

fn parse_f64_lexical(text: &str) -> Option<f64> {
    // xsd:double spells the specials differently from Rust.
    match text {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        other => other.parse::<f64>().ok(),
    }
}

/// Parses a double-precision definition bound.
///
/// A finite-looking literal whose magnitude overflows the double range
/// clamps to the corresponding infinity.
///
/// # Errors
///
/// Returns [`Error::InvalidScalar`] when the text is not a number at all.
pub fn parse_f64_bound(field: &'static str, text: &str) -> Result<f64, Error> {
    let trimmed = text.trim();
    parse_f64_lexical(trimmed).map_or_else(
        || {
            Err(Error::InvalidScalar {
                field,
                value: trimmed.to_owned(),
            })
        },
        |value| {
            if value.is_infinite() && !matches!(trimmed, "INF" | "+INF" | "-INF") {
                trace!(field, value = trimmed, "real bound clamped to infinity");
            }
            Ok(value)
        },
    )
}

/// Parses a double-precision attribute value.
///
/// Overflowing values are logged and replaced by zero, mirroring the
/// integer value policy.
///
/// # Errors
///
/// Returns [`Error::InvalidScalar`] when the text is not a number at all.
pub fn parse_f64_value(field: &'static str, text: &str) -> Result<f64, Error> {
    let trimmed = text.trim();
    let value = parse_f64_lexical(trimmed).ok_or_else(|| Error::InvalidScalar {
        field,
        value: trimmed.to_owned(),
    })?;
    if value.is_infinite() && !matches!(trimmed, "INF" | "+INF" | "-INF") {
        warn!(
            field,
            value = trimmed,
            "real value out of double range, substituting 0"
        );
        return Ok(0.0);
    }
    Ok(value)
}

/// Formats a 64-bit integer in invariant decimal form.
#[must_use]
pub fn format_i64(value: i64) -> String {
    value.to_string()
}

/// Formats a double in invariant decimal form ('.' decimal point, no
/// thousands separators, xsd spellings for the specials).
#[must_use]
pub fn format_f64(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value == f64::INFINITY {
        "INF".to_owned()
    } else if value == f64::NEG_INFINITY {
        "-INF".to_owned()
    } else {
        value.to_string()
    }
}

/// Parses an ISO-8601 timestamp with explicit offset.
///
/// # Errors
///
/// Returns [`Error::InvalidScalar`] when the text is not a valid timestamp.
pub fn parse_date(field: &'static str, text: &str) -> Result<DateTime<FixedOffset>, Error> {
    let trimmed = text.trim();
    DateTime::parse_from_rfc3339(trimmed).map_err(|_| Error::InvalidScalar {
        field,
        value: trimmed.to_owned(),
    })
}

/// Formats a timestamp with full precision and its explicit offset.
#[must_use]
pub fn format_date(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_lexical_space() {
        assert!(parse_bool("f", "true").unwrap());
        assert!(parse_bool("f", "1").unwrap());
        assert!(!parse_bool("f", "false").unwrap());
        assert!(!parse_bool("f", "0").unwrap());
        assert!(parse_bool("f", "yes").is_err());
        assert_eq!(format_bool(true), "true");
    }

    #[test]
    fn integer_bound_clamps_past_the_extremes() {
        // 2^63, one past i64::MAX.
        assert_eq!(
            parse_i64_bound("MAX", "9223372036854775808").unwrap(),
            i64::MAX
        );
        assert_eq!(
            parse_i64_bound("MIN", "-9223372036854775809").unwrap(),
            i64::MIN
        );
        assert_eq!(parse_i64_bound("MAX", "17").unwrap(), 17);
    }

    #[test]
    fn integer_value_substitutes_zero_past_the_extremes() {
        assert_eq!(
            parse_i64_value("THE-VALUE", "9223372036854775808").unwrap(),
            0
        );
        assert_eq!(parse_i64_value("THE-VALUE", "-17").unwrap(), -17);
    }

    #[test]
    fn garbage_integers_fail_for_bounds_and_values_alike() {
        assert!(parse_i64_bound("MAX", "seventeen").is_err());
        assert!(parse_i64_value("THE-VALUE", "seventeen").is_err());
    }

    #[test]
    fn real_bound_clamps_to_infinity() {
        assert_eq!(parse_f64_bound("MAX", "1e999").unwrap(), f64::INFINITY);
        assert_eq!(parse_f64_bound("MIN", "-1e999").unwrap(), f64::NEG_INFINITY);
        assert_eq!(parse_f64_bound("MAX", "INF").unwrap(), f64::INFINITY);
    }

    #[test]
    fn real_value_substitutes_zero_on_overflow() {
        assert_eq!(parse_f64_value("THE-VALUE", "1e999").unwrap(), 0.0);
        assert_eq!(parse_f64_value("THE-VALUE", "2.5").unwrap(), 2.5);
        assert!(parse_f64_value("THE-VALUE", "two point five").is_err());
    }

    #[test]
    fn accuracy_bound_clamps_to_u64_max() {
        assert_eq!(
            parse_u64_bound("ACCURACY", "99999999999999999999999").unwrap(),
            u64::MAX
        );
        assert!(parse_u64_bound("ACCURACY", "-1").is_err());
    }

    #[test]
    fn dates_round_trip_with_offset_preserved() {
        let parsed = parse_date("LAST-CHANGE", "2026-03-01T12:30:00.5+02:00").unwrap();
        let formatted = format_date(&parsed);
        assert_eq!(parse_date("LAST-CHANGE", &formatted).unwrap(), parsed);
        assert!(formatted.ends_with("+02:00"));
    }

    #[test]
    fn invariant_decimal_forms() {
        assert_eq!(format_i64(-1_234_567), "-1234567");
        assert_eq!(format_f64(2.5), "2.5");
        assert_eq!(format_f64(f64::INFINITY), "INF");
        assert_eq!(format_f64(f64::NEG_INFINITY), "-INF");
    }
}
