//! Value producers.
//!
//! A producer yields one random value for a target type, reading nothing but
//! the shared random source and the static parameters. Built-in producers
//! cover every scalar kind; config-driven producers ([`ProducerConfig`])
//! override them per type or per field.

pub mod array;
pub mod config;
pub mod numeric;
pub mod pattern;
pub mod static_value;
pub mod temporal;
pub mod text;
pub mod uuid;

pub use config::{ProducerBinding, ProducerConfig};

use crate::error::ProducerError;
use crate::parameters::Parameters;
use crate::random::RandomSource;
use fixture_core::{GeneratedValue, Resolver, ScalarKind, TypeDescriptor};
use rand::Rng;

/// Everything a producer may read.
pub struct ProducerContext<'a> {
    /// Shared random source of the current call
    pub rng: &'a mut RandomSource,
    /// Resolved type the value is produced for
    pub target: &'a TypeDescriptor,
    /// Generation parameters
    pub parameters: &'a Parameters,
    /// Resolver of the generator's catalog
    pub resolver: &'a Resolver,
    /// Index of the root object in its stream
    pub index: u64,
}

/// Trait for producing values.
pub trait ValueProducer: Send + Sync {
    /// Produce one value for `ctx.target`.
    fn produce(&self, ctx: &mut ProducerContext<'_>) -> Result<GeneratedValue, ProducerError>;
}

impl<F> ValueProducer for F
where
    F: Fn(&mut ProducerContext<'_>) -> Result<GeneratedValue, ProducerError> + Send + Sync,
{
    fn produce(&self, ctx: &mut ProducerContext<'_>) -> Result<GeneratedValue, ProducerError> {
        self(ctx)
    }
}

/// Producer that always yields the same value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantProducer(pub GeneratedValue);

impl ValueProducer for ConstantProducer {
    fn produce(&self, _ctx: &mut ProducerContext<'_>) -> Result<GeneratedValue, ProducerError> {
        Ok(self.0.clone())
    }
}

/// Built-in producer for one scalar kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarProducer(pub ScalarKind);

impl ValueProducer for ScalarProducer {
    fn produce(&self, ctx: &mut ProducerContext<'_>) -> Result<GeneratedValue, ProducerError> {
        let rng = &mut *ctx.rng;
        let params = ctx.parameters;

        let value = match self.0 {
            ScalarKind::Bool => GeneratedValue::Bool(rng.random_bool(0.5)),
            ScalarKind::Int8 => GeneratedValue::Int32(rng.random::<i8>() as i32),
            ScalarKind::Int16 => GeneratedValue::Int32(rng.random::<i16>() as i32),
            ScalarKind::Int32 => GeneratedValue::Int32(rng.random()),
            ScalarKind::Int64 => GeneratedValue::Int64(rng.random()),
            ScalarKind::UInt8 => GeneratedValue::UInt64(rng.random::<u8>() as u64),
            ScalarKind::UInt16 => GeneratedValue::UInt64(rng.random::<u16>() as u64),
            ScalarKind::UInt32 => GeneratedValue::UInt64(rng.random::<u32>() as u64),
            ScalarKind::UInt64 => GeneratedValue::UInt64(rng.random()),
            ScalarKind::Float32 => GeneratedValue::Float64(rng.random::<f32>() as f64),
            ScalarKind::Float64 => GeneratedValue::Float64(rng.random()),
            ScalarKind::Decimal => {
                numeric::decimal_in(rng, 0.0, 1_000_000.0, numeric::DEFAULT_DECIMAL_SCALE)
            }
            ScalarKind::Char => text::generate_char(rng),
            ScalarKind::String => text::generate_string(rng, &params.string_length_range),
            ScalarKind::Bytes => text::generate_bytes(rng, &params.string_length_range),
            ScalarKind::Uuid => uuid::generate_uuid_v4(rng),
            ScalarKind::Ulid => uuid::generate_ulid(rng, &params.date_range),
            ScalarKind::Date => temporal::generate_date(rng, &params.date_range),
            ScalarKind::Time => temporal::generate_time(rng),
            ScalarKind::DateTime => temporal::generate_local_date_time(rng, &params.date_range),
            ScalarKind::ZonedDateTime => temporal::generate_date_time(rng, &params.date_range),
            ScalarKind::Duration => temporal::generate_duration(rng, 0, temporal::SECONDS_PER_DAY),
            ScalarKind::ZoneId => temporal::generate_zone_id(rng),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixture_core::{canonical_name, TypeCatalog};
    use std::sync::Arc;

    fn produce(producer: &dyn ValueProducer, target: &TypeDescriptor, seed: u64) -> GeneratedValue {
        let resolver = Resolver::new(Arc::new(TypeCatalog::new(vec![]).unwrap()));
        let mut rng = RandomSource::new(seed);
        let params = Parameters::default();
        let mut ctx = ProducerContext {
            rng: &mut rng,
            target,
            parameters: &params,
            resolver: &resolver,
            index: 0,
        };
        producer.produce(&mut ctx).unwrap()
    }

    #[test]
    fn test_scalar_producers_cover_all_kinds() {
        for kind in ScalarKind::ALL {
            let target = TypeDescriptor::named(canonical_name(kind.name()));
            let value = produce(&ScalarProducer(kind), &target, 42);
            assert!(!value.is_null(), "{kind:?} produced null");
        }
    }

    #[test]
    fn test_scalar_producers_are_deterministic() {
        for kind in ScalarKind::ALL {
            let target = TypeDescriptor::named(kind.name());
            assert_eq!(
                produce(&ScalarProducer(kind), &target, 9),
                produce(&ScalarProducer(kind), &target, 9)
            );
        }
    }

    #[test]
    fn test_closure_and_constant_producers() {
        let target = TypeDescriptor::named("string");
        let constant = ConstantProducer(GeneratedValue::String("fixed".to_string()));
        assert_eq!(
            produce(&constant, &target, 1),
            GeneratedValue::String("fixed".to_string())
        );

        let closure = |ctx: &mut ProducerContext<'_>| -> Result<GeneratedValue, ProducerError> {
            Ok(GeneratedValue::Int64(ctx.index as i64 + 10))
        };
        assert_eq!(produce(&closure, &target, 1), GeneratedValue::Int64(10));
    }
}
