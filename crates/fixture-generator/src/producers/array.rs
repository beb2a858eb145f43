//! Array producers sampling from a fixed pool.

use super::static_value::coerce;
use fixture_core::{GeneratedValue, Resolver, Shape, TypeDescriptor};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

fn length_in<R: Rng>(rng: &mut R, min_length: usize, max_length: usize) -> usize {
    if min_length >= max_length {
        max_length
    } else {
        rng.random_range(min_length..=max_length)
    }
}

/// Generate an array of strings by sampling from a pool (with repeats).
pub fn generate_sample_array<R: Rng>(
    rng: &mut R,
    pool: &[String],
    min_length: usize,
    max_length: usize,
) -> GeneratedValue {
    if pool.is_empty() || max_length == 0 {
        return GeneratedValue::Array(vec![]);
    }

    let length = length_in(rng, min_length, max_length);
    let items: Vec<GeneratedValue> = (0..length)
        .filter_map(|_| pool.choose(rng))
        .map(|item| GeneratedValue::String(item.clone()))
        .collect();

    GeneratedValue::Array(items)
}

/// Generate a sample array and coerce it to the target container type.
///
/// Set targets sample without repeats so the requested length is kept
/// whenever the pool is large enough.
pub fn generate_sample_array_for<R: Rng>(
    rng: &mut R,
    pool: &[String],
    min_length: usize,
    max_length: usize,
    target: &TypeDescriptor,
    resolver: &Resolver,
) -> GeneratedValue {
    let sampled = match resolver.catalog().shape(target) {
        Shape::Set(_) => generate_unique_sample_array(rng, pool, min_length, max_length),
        _ => generate_sample_array(rng, pool, min_length, max_length),
    };
    coerce(sampled, target, resolver)
}

/// Generate an array by sampling unique items from a pool.
pub fn generate_unique_sample_array<R: Rng>(
    rng: &mut R,
    pool: &[String],
    min_length: usize,
    max_length: usize,
) -> GeneratedValue {
    if pool.is_empty() || max_length == 0 {
        return GeneratedValue::Array(vec![]);
    }

    // Clamp max_length to pool size for unique sampling
    let effective_max = max_length.min(pool.len());
    let effective_min = min_length.min(effective_max);
    let length = length_in(rng, effective_min, effective_max);

    let mut shuffled = pool.to_vec();
    shuffled.shuffle(rng);

    let items: Vec<GeneratedValue> = shuffled
        .into_iter()
        .take(length)
        .map(GeneratedValue::String)
        .collect();

    GeneratedValue::Array(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixture_core::TypeCatalog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn pool(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_generate_sample_array() {
        let mut rng = StdRng::seed_from_u64(42);
        let pool = pool(&["a", "b", "c"]);

        for _ in 0..10 {
            let value = generate_sample_array(&mut rng, &pool, 1, 3);
            let len = value.len().unwrap();
            assert!((1..=3).contains(&len));
        }
    }

    #[test]
    fn test_generate_sample_array_empty_pool() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = generate_sample_array(&mut rng, &[], 0, 3);
        assert_eq!(value, GeneratedValue::Array(vec![]));
    }

    #[test]
    fn test_generate_unique_sample_array() {
        let mut rng = StdRng::seed_from_u64(42);
        let pool = pool(&["a", "b", "c", "d", "e"]);

        let value = generate_unique_sample_array(&mut rng, &pool, 3, 3);
        let items = value.as_elements().unwrap();
        assert_eq!(items.len(), 3);
        for (i, item) in items.iter().enumerate() {
            assert!(!items[i + 1..].contains(item));
        }
    }

    #[test]
    fn test_typed_sample_array() {
        let resolver = Resolver::new(Arc::new(TypeCatalog::new(vec![]).unwrap()));
        let mut rng = StdRng::seed_from_u64(42);
        let pool = pool(&["1", "2", "3"]);

        let target = resolver.resolve_str("Set<Long>").unwrap();
        let value = generate_sample_array_for(&mut rng, &pool, 3, 3, &target, &resolver);
        match value {
            GeneratedValue::Set(items) => {
                assert_eq!(items.len(), 3);
                assert!(items.iter().all(|v| matches!(v, GeneratedValue::Int64(_))));
            }
            other => panic!("Expected Set, got {other:?}"),
        }
    }

    #[test]
    fn test_deterministic_generation() {
        let pool = pool(&["a", "b", "c"]);

        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);

        assert_eq!(
            generate_sample_array(&mut rng1, &pool, 1, 3),
            generate_sample_array(&mut rng2, &pool, 1, 3)
        );
    }
}
