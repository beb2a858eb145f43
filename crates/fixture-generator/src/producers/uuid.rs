//! UUID and ULID producers.

use crate::parameters::DateRange;
use fixture_core::GeneratedValue;
use rand::Rng;
use ulid::Ulid;
use uuid::Uuid;

/// Generate a random UUID v4 using the provided RNG.
pub fn generate_uuid_v4<R: Rng>(rng: &mut R) -> GeneratedValue {
    GeneratedValue::Uuid(random_uuid_v4(rng))
}

/// Build a UUID v4 from RNG bytes instead of the thread-local generator.
pub fn random_uuid_v4<R: Rng>(rng: &mut R) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);

    // Set version (4) and variant (RFC 4122) bits
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes)
}

/// Generate a ULID whose timestamp lies within the date range.
pub fn generate_ulid<R: Rng>(rng: &mut R, range: &DateRange) -> GeneratedValue {
    let (start, end) = super::temporal::timestamp_bounds(range);
    let seconds = if start >= end {
        start
    } else {
        rng.random_range(start..=end)
    };
    let millis = (seconds.max(0) as u64) * 1000 + rng.random_range(0..1000u64);
    GeneratedValue::Ulid(Ulid::from_parts(millis, rng.random::<u128>()))
}
