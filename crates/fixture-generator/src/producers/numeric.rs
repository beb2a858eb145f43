//! Numeric value producers.
//!
//! Ranges are inclusive and narrowed to what the target scalar kind can hold,
//! so an `int_range` bound to an `i8` field never yields an out-of-range value.

use fixture_core::{GeneratedValue, ScalarKind};
use rand::Rng;

/// Scale of decimals produced without an explicit one.
pub const DEFAULT_DECIMAL_SCALE: u8 = 2;

/// Representable bounds of an integer kind, within `i64`.
pub fn integer_bounds(kind: ScalarKind) -> Option<(i64, i64)> {
    let bounds = match kind {
        ScalarKind::Int8 => (i8::MIN as i64, i8::MAX as i64),
        ScalarKind::Int16 => (i16::MIN as i64, i16::MAX as i64),
        ScalarKind::Int32 => (i32::MIN as i64, i32::MAX as i64),
        ScalarKind::Int64 => (i64::MIN, i64::MAX),
        ScalarKind::UInt8 => (0, u8::MAX as i64),
        ScalarKind::UInt16 => (0, u16::MAX as i64),
        ScalarKind::UInt32 => (0, u32::MAX as i64),
        ScalarKind::UInt64 => (0, i64::MAX),
        _ => return None,
    };
    Some(bounds)
}

/// Random integer in `min..=max` for the given kind.
///
/// Non-integer or missing kinds produce an `Int64`. A range lying entirely
/// outside the kind collapses to the nearest representable value.
pub fn integer_in<R: Rng>(rng: &mut R, kind: Option<ScalarKind>, min: i64, max: i64) -> GeneratedValue {
    let (kind_min, kind_max) = kind.and_then(integer_bounds).unwrap_or((i64::MIN, i64::MAX));
    let lo = min.clamp(kind_min, kind_max);
    let hi = max.clamp(kind_min, kind_max);
    let value = if lo >= hi {
        lo
    } else {
        rng.random_range(lo..=hi)
    };

    match kind {
        Some(ScalarKind::Int8 | ScalarKind::Int16 | ScalarKind::Int32) => {
            GeneratedValue::Int32(value as i32)
        }
        Some(ScalarKind::UInt8 | ScalarKind::UInt16 | ScalarKind::UInt32 | ScalarKind::UInt64) => {
            GeneratedValue::UInt64(value as u64)
        }
        _ => GeneratedValue::Int64(value),
    }
}

/// Random float in `min..=max`, narrowed to `f32` precision for `f32` targets.
pub fn float_in<R: Rng>(rng: &mut R, kind: Option<ScalarKind>, min: f64, max: f64) -> GeneratedValue {
    let value = if min >= max {
        min
    } else {
        rng.random_range(min..=max)
    };
    match kind {
        Some(ScalarKind::Float32) => GeneratedValue::Float64(value as f32 as f64),
        _ => GeneratedValue::Float64(value),
    }
}

/// Random decimal in `min..=max` with exactly `scale` fractional digits.
///
/// The value is drawn as a whole number of `10^-scale` units so the string
/// form never picks up binary rounding noise.
pub fn decimal_in<R: Rng>(rng: &mut R, min: f64, max: f64, scale: u8) -> GeneratedValue {
    let factor = 10f64.powi(scale as i32);
    let lo = (min * factor).ceil() as i64;
    let hi = (max * factor).floor() as i64;
    let units = if lo >= hi {
        lo
    } else {
        rng.random_range(lo..=hi)
    };
    format_units(units, scale)
}

fn format_units(units: i64, scale: u8) -> GeneratedValue {
    let divisor = 10u64.pow(scale as u32);
    let magnitude = units.unsigned_abs();
    let sign = if units < 0 { "-" } else { "" };
    let whole = magnitude / divisor;

    let value = if scale == 0 {
        format!("{sign}{whole}")
    } else {
        let fraction = magnitude % divisor;
        format!("{sign}{whole}.{fraction:0width$}", width = scale as usize)
    };

    let whole_digits = whole.to_string().len() as u8;
    GeneratedValue::Decimal {
        value,
        precision: whole_digits.saturating_add(scale),
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_integer_in_range() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            match integer_in(&mut rng, Some(ScalarKind::Int64), 10, 20) {
                GeneratedValue::Int64(v) => assert!((10..=20).contains(&v)),
                other => panic!("Expected Int64, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_integer_narrowed_to_kind() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            match integer_in(&mut rng, Some(ScalarKind::Int8), -1000, 1000) {
                GeneratedValue::Int32(v) => assert!((-128..=127).contains(&v)),
                other => panic!("Expected Int32, got {other:?}"),
            }
            match integer_in(&mut rng, Some(ScalarKind::UInt16), -50, 50) {
                GeneratedValue::UInt64(v) => assert!(v <= 50),
                other => panic!("Expected UInt64, got {other:?}"),
            }
        }

        assert_eq!(
            integer_in(&mut rng, Some(ScalarKind::UInt8), 300, 400),
            GeneratedValue::UInt64(255)
        );
        assert_eq!(integer_in(&mut rng, None, 5, 5), GeneratedValue::Int64(5));
    }

    #[test]
    fn test_float_in_range() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let v = float_in(&mut rng, None, 0.0, 100.0).as_f64().unwrap();
            assert!((0.0..=100.0).contains(&v));
        }
        assert_eq!(float_in(&mut rng, None, 2.5, 2.5), GeneratedValue::Float64(2.5));

        let narrowed = float_in(&mut rng, Some(ScalarKind::Float32), 0.0, 1.0).as_f64().unwrap();
        assert_eq!(narrowed, narrowed as f32 as f64);
    }

    #[test]
    fn test_decimal_in_range() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            match decimal_in(&mut rng, 1.0, 500.0, DEFAULT_DECIMAL_SCALE) {
                GeneratedValue::Decimal { value, scale, .. } => {
                    assert_eq!(scale, 2);
                    assert_eq!(value.split('.').nth(1).map(str::len), Some(2));
                    let parsed: f64 = value.parse().unwrap();
                    assert!((1.0..=500.0).contains(&parsed));
                }
                other => panic!("Expected Decimal, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_decimal_formatting() {
        assert_eq!(format_units(-5, 2), GeneratedValue::decimal("-0.05", 3, 2));
        assert_eq!(format_units(123456, 3), GeneratedValue::decimal("123.456", 6, 3));
        assert_eq!(format_units(42, 0), GeneratedValue::decimal("42", 2, 0));
    }
}
