//! Pattern-based string producer.
//!
//! Supports placeholders:
//! - `{index}` - index of the root object in its stream
//! - `{uuid}` - random UUID drawn from the seeded source
//! - `{rand:N}` - random N-digit number

use super::uuid::random_uuid_v4;
use fixture_core::GeneratedValue;
use rand::Rng;

/// Longest `{rand:N}` expansion; longer placeholders are left in place.
pub const MAX_RANDOM_DIGITS: usize = 64;

/// First `{rand:N}` placeholder whose N exceeds [`MAX_RANDOM_DIGITS`].
pub fn oversized_rand_placeholder(pattern: &str) -> Option<usize> {
    pattern
        .split("{rand:")
        .skip(1)
        .filter_map(|rest| rest.split_once('}'))
        .filter_map(|(digits, _)| digits.parse::<usize>().ok())
        .find(|digits| *digits > MAX_RANDOM_DIGITS)
}

/// Generate a string based on a pattern with placeholders.
pub fn generate_pattern<R: Rng>(pattern: &str, rng: &mut R, index: u64) -> GeneratedValue {
    let mut result = pattern.replace("{index}", &index.to_string());

    while result.contains("{uuid}") {
        result = result.replacen("{uuid}", &random_uuid_v4(rng).to_string(), 1);
    }

    // Replace {rand:N} patterns
    let mut search_from = 0;
    while let Some(offset) = result[search_from..].find("{rand:") {
        let start = search_from + offset;
        let Some(end) = result[start..].find('}').map(|end| start + end) else {
            break;
        };
        match result[start + 6..end].parse::<usize>() {
            Ok(digits) if digits <= MAX_RANDOM_DIGITS => {
                let random_num = generate_random_digits(rng, digits);
                result = format!("{}{}{}", &result[..start], random_num, &result[end + 1..]);
                search_from = start + random_num.len();
            }
            // Invalid or oversized, leave it in place
            _ => search_from = end + 1,
        }
    }

    GeneratedValue::String(result)
}

/// Generate a random number with exactly N digits.
fn generate_random_digits<R: Rng>(rng: &mut R, digits: usize) -> String {
    let mut result = String::with_capacity(digits);

    for position in 0..digits {
        // First digit should be 1-9 to avoid leading zeros
        let low = if position == 0 { 1 } else { 0 };
        let digit: u8 = rng.random_range(low..10);
        result.push(char::from(b'0' + digit));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_pattern_index() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = generate_pattern("user_{index}@example.com", &mut rng, 123);

        assert_eq!(
            value,
            GeneratedValue::String("user_123@example.com".to_string())
        );
    }

    #[test]
    fn test_generate_pattern_uuid_is_seeded() {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        let value = generate_pattern("id-{uuid}", &mut rng1, 0);

        if let GeneratedValue::String(s) = &value {
            assert!(s.starts_with("id-"));
            assert_eq!(s.len(), 3 + 36); // "id-" + UUID
        } else {
            panic!("Expected String value");
        }
        assert_eq!(value, generate_pattern("id-{uuid}", &mut rng2, 0));
    }

    #[test]
    fn test_generate_pattern_random_digits() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = generate_pattern("code-{rand:6}", &mut rng, 0);

        if let GeneratedValue::String(s) = value {
            assert!(s.starts_with("code-"));
            assert_eq!(s.len(), 5 + 6); // "code-" + 6 digits
            let random_part = &s[5..];
            assert!(random_part.chars().all(|c| c.is_ascii_digit()));
            assert!(!random_part.starts_with('0'));
        } else {
            panic!("Expected String value");
        }
    }

    #[test]
    fn test_oversized_rand_placeholder() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = generate_pattern("n-{rand:999999999999}", &mut rng, 0);
        assert_eq!(value, GeneratedValue::String("n-{rand:999999999999}".to_string()));

        assert_eq!(oversized_rand_placeholder("a{rand:4}b{rand:65}"), Some(65));
        assert_eq!(oversized_rand_placeholder("a{rand:64}{rand:x}"), None);
    }

    #[test]
    fn test_generate_pattern_multiple_placeholders() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = generate_pattern("user_{index}_code_{rand:4}_{rand:x}", &mut rng, 42);

        if let GeneratedValue::String(s) = value {
            assert!(s.starts_with("user_42_code_"));
            assert!(s.ends_with("_{rand:x}"));
            assert_eq!(s.len(), 13 + 4 + 9);
        } else {
            panic!("Expected String value");
        }
    }
}
