//! Character, string and byte producers.

use crate::parameters::SizeRange;
use fixture_core::GeneratedValue;
use rand::distr::Alphanumeric;
use rand::Rng;

fn length_in<R: Rng>(rng: &mut R, range: &SizeRange) -> usize {
    if range.min >= range.max {
        range.min
    } else {
        rng.random_range(range.min..=range.max)
    }
}

/// Generate a random alphanumeric character.
pub fn generate_char<R: Rng>(rng: &mut R) -> GeneratedValue {
    GeneratedValue::Char(rng.sample(Alphanumeric) as char)
}

/// Generate an alphanumeric string with a length in the range.
pub fn generate_string<R: Rng>(rng: &mut R, range: &SizeRange) -> GeneratedValue {
    let length = length_in(rng, range);
    let value: String = (0..length)
        .map(|_| rng.sample(Alphanumeric) as char)
        .collect();
    GeneratedValue::String(value)
}

/// Generate random bytes with a length in the range.
pub fn generate_bytes<R: Rng>(rng: &mut R, range: &SizeRange) -> GeneratedValue {
    let mut bytes = vec![0u8; length_in(rng, range)];
    rng.fill(bytes.as_mut_slice());
    GeneratedValue::Bytes(bytes)
}
