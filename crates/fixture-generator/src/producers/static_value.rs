//! Static values: YAML to GeneratedValue conversion.
//!
//! YAML carries only a handful of scalar shapes, so converted values are
//! coerced towards the resolved target type afterwards: `42` becomes an
//! `Int32` for an `int` field, `"2024-01-01"` a `Date` for a `date` field, a
//! mapping a `Record` for a catalog class. Values that do not fit the target
//! are kept as converted.

use super::temporal::parse_timestamp;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use fixture_core::{GeneratedValue, Resolver, ScalarKind, Shape, TypeDescriptor};
use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;

/// Convert a YAML value to a GeneratedValue.
pub fn yaml_to_generated_value(yaml: &YamlValue) -> GeneratedValue {
    match yaml {
        YamlValue::Null => GeneratedValue::Null,
        YamlValue::Bool(b) => GeneratedValue::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                GeneratedValue::Int64(i)
            } else if let Some(u) = n.as_u64() {
                GeneratedValue::UInt64(u)
            } else if let Some(f) = n.as_f64() {
                GeneratedValue::Float64(f)
            } else {
                GeneratedValue::String(n.to_string())
            }
        }
        YamlValue::String(s) => GeneratedValue::String(s.clone()),
        YamlValue::Sequence(arr) => {
            GeneratedValue::Array(arr.iter().map(yaml_to_generated_value).collect())
        }
        YamlValue::Mapping(map) => {
            let entries = map
                .iter()
                .filter_map(|(k, v)| {
                    let key = match k {
                        YamlValue::String(s) => s.clone(),
                        YamlValue::Number(n) => n.to_string(),
                        YamlValue::Bool(b) => b.to_string(),
                        _ => return None,
                    };
                    Some((GeneratedValue::String(key), yaml_to_generated_value(v)))
                })
                .collect();
            GeneratedValue::Map(entries)
        }
        YamlValue::Tagged(tagged) => yaml_to_generated_value(&tagged.value),
    }
}

/// Convert a YAML value and coerce it to the target type.
pub fn yaml_to_value_for(
    yaml: &YamlValue,
    target: &TypeDescriptor,
    resolver: &Resolver,
) -> GeneratedValue {
    coerce(yaml_to_generated_value(yaml), target, resolver)
}

/// Coerce a converted value towards the target type.
pub fn coerce(value: GeneratedValue, target: &TypeDescriptor, resolver: &Resolver) -> GeneratedValue {
    if value.is_null() {
        return value;
    }

    match resolver.catalog().shape(target) {
        Shape::Scalar(kind) => coerce_scalar(value, kind),
        Shape::Sequence(element) | Shape::Array(element) => match value {
            GeneratedValue::Array(items) | GeneratedValue::Set(items) => GeneratedValue::Array(
                items
                    .into_iter()
                    .map(|item| coerce(item, element, resolver))
                    .collect(),
            ),
            other => other,
        },
        Shape::Set(element) => match value {
            GeneratedValue::Array(items) | GeneratedValue::Set(items) => {
                let mut distinct: Vec<GeneratedValue> = Vec::with_capacity(items.len());
                for item in items {
                    let item = coerce(item, element, resolver);
                    if !distinct.contains(&item) {
                        distinct.push(item);
                    }
                }
                GeneratedValue::Set(distinct)
            }
            other => other,
        },
        Shape::Map(key_type, value_type) => match value {
            GeneratedValue::Map(entries) => GeneratedValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| {
                        (
                            coerce(k, key_type, resolver),
                            coerce(v, value_type, resolver),
                        )
                    })
                    .collect(),
            ),
            other => other,
        },
        Shape::Optional(inner) => coerce(value, inner, resolver),
        Shape::Enum(def) => match value {
            GeneratedValue::String(variant) if def.variants.contains(&variant) => {
                GeneratedValue::Enum {
                    type_name: def.name.clone(),
                    variant,
                }
            }
            other => other,
        },
        Shape::Composite(def) => match value {
            GeneratedValue::Map(entries) => {
                let declared = resolver.fields_of(target);
                let mut fields = BTreeMap::new();
                for (key, field_value) in entries {
                    let name = key.key_string();
                    let field_value = match declared.iter().find(|f| f.name == name) {
                        Some(field) => coerce(field_value, &field.field_type, resolver),
                        None => field_value,
                    };
                    fields.insert(name, field_value);
                }
                GeneratedValue::Record {
                    type_name: def.name.clone(),
                    fields,
                }
            }
            other => other,
        },
        Shape::Object | Shape::Unknown | Shape::Undefined => value,
    }
}

fn coerce_scalar(value: GeneratedValue, kind: ScalarKind) -> GeneratedValue {
    use GeneratedValue as V;

    let value = match value {
        V::String(s) => parse_text(s, kind),
        other => other,
    };

    match (kind, value) {
        (ScalarKind::Int8 | ScalarKind::Int16 | ScalarKind::Int32, V::Int64(i)) => {
            match i32::try_from(i) {
                Ok(i) => V::Int32(i),
                Err(_) => V::Int64(i),
            }
        }
        (ScalarKind::Int64, V::Int32(i)) => V::Int64(i as i64),
        (
            ScalarKind::UInt8 | ScalarKind::UInt16 | ScalarKind::UInt32 | ScalarKind::UInt64,
            V::Int64(i),
        ) => match u64::try_from(i) {
            Ok(u) => V::UInt64(u),
            Err(_) => V::Int64(i),
        },
        (ScalarKind::Float32 | ScalarKind::Float64, V::Int64(i)) => V::Float64(i as f64),
        (ScalarKind::Decimal, V::Int64(i)) => V::decimal(i.to_string(), 10, 0),
        (ScalarKind::Decimal, V::Float64(f)) => decimal_from_text(f.to_string()),
        (ScalarKind::Decimal, V::String(s)) if s.parse::<f64>().is_ok() => decimal_from_text(s),
        (ScalarKind::Char, V::String(s)) if s.chars().count() == 1 => match s.chars().next() {
            Some(c) => V::Char(c),
            None => V::String(s),
        },
        (ScalarKind::Bytes, V::String(s)) => V::Bytes(s.into_bytes()),
        (ScalarKind::Uuid, V::String(s)) => match s.parse() {
            Ok(u) => V::Uuid(u),
            Err(_) => V::String(s),
        },
        (ScalarKind::Ulid, V::String(s)) => match s.parse() {
            Ok(u) => V::Ulid(u),
            Err(_) => V::String(s),
        },
        (ScalarKind::Date, V::String(s)) => match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            Ok(d) => V::Date(d),
            Err(_) => V::String(s),
        },
        (ScalarKind::Time, V::String(s)) => match NaiveTime::parse_from_str(&s, "%H:%M:%S") {
            Ok(t) => V::Time(t),
            Err(_) => V::String(s),
        },
        (ScalarKind::DateTime, V::String(s)) => {
            match NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S") {
                Ok(dt) => V::LocalDateTime(dt),
                Err(_) => V::String(s),
            }
        }
        (ScalarKind::ZonedDateTime, V::String(s)) => match parse_timestamp(&s) {
            Some(dt) => V::DateTime(dt),
            None => V::String(s),
        },
        (ScalarKind::Duration, V::Int64(secs)) => match TimeDelta::try_seconds(secs) {
            Some(d) => V::Duration(d),
            None => V::Int64(secs),
        },
        (_, other) => other,
    }
}

/// Numeric and boolean text, e.g. from a string pool.
fn parse_text(text: String, kind: ScalarKind) -> GeneratedValue {
    match kind {
        ScalarKind::Bool => match text.to_lowercase().as_str() {
            "true" | "1" | "yes" => GeneratedValue::Bool(true),
            "false" | "0" | "no" => GeneratedValue::Bool(false),
            _ => GeneratedValue::String(text),
        },
        ScalarKind::Float32 | ScalarKind::Float64 => match text.parse::<f64>() {
            Ok(f) => GeneratedValue::Float64(f),
            Err(_) => GeneratedValue::String(text),
        },
        kind if kind.is_numeric() && kind != ScalarKind::Decimal => {
            match text.parse::<i64>() {
                Ok(i) => GeneratedValue::Int64(i),
                Err(_) => match text.parse::<u64>() {
                    Ok(u) => GeneratedValue::UInt64(u),
                    Err(_) => GeneratedValue::String(text),
                },
            }
        }
        _ => GeneratedValue::String(text),
    }
}

fn decimal_from_text(text: String) -> GeneratedValue {
    let digits = text.chars().filter(char::is_ascii_digit).count();
    let scale = text
        .split_once('.')
        .map(|(_, fraction)| fraction.len())
        .unwrap_or(0);
    GeneratedValue::decimal(
        text,
        u8::try_from(digits).unwrap_or(u8::MAX),
        u8::try_from(scale).unwrap_or(u8::MAX),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixture_core::TypeCatalog;
    use std::sync::Arc;

    fn resolver() -> Resolver {
        let catalog = TypeCatalog::from_yaml(
            r#"
types:
  - name: Color
    kind: enum
    variants: [Red, Green]
  - name: Address
    fields:
      - name: zip
        type: int
      - name: since
        type: date
"#,
        )
        .unwrap();
        Resolver::new(Arc::new(catalog))
    }

    fn target(text: &str) -> TypeDescriptor {
        resolver().resolve_str(text).unwrap()
    }

    #[test]
    fn test_yaml_scalars() {
        assert_eq!(yaml_to_generated_value(&YamlValue::Null), GeneratedValue::Null);
        assert_eq!(
            yaml_to_generated_value(&YamlValue::Bool(true)),
            GeneratedValue::Bool(true)
        );

        let yaml: YamlValue = serde_yaml::from_str("42").unwrap();
        assert_eq!(yaml_to_generated_value(&yaml), GeneratedValue::Int64(42));

        let yaml: YamlValue = serde_yaml::from_str("1.234").unwrap();
        if let GeneratedValue::Float64(f) = yaml_to_generated_value(&yaml) {
            assert!((f - 1.234).abs() < 0.001);
        } else {
            panic!("Expected Float64");
        }
    }

    #[test]
    fn test_yaml_collections() {
        let yaml: YamlValue = serde_yaml::from_str("[1, 2, 3]").unwrap();
        if let GeneratedValue::Array(arr) = yaml_to_generated_value(&yaml) {
            assert_eq!(arr.len(), 3);
            assert_eq!(arr[0], GeneratedValue::Int64(1));
        } else {
            panic!("Expected Array");
        }

        let yaml: YamlValue = serde_yaml::from_str("{ version: 1, name: test }").unwrap();
        assert_eq!(
            yaml_to_generated_value(&yaml),
            GeneratedValue::Map(vec![
                (
                    GeneratedValue::String("version".to_string()),
                    GeneratedValue::Int64(1)
                ),
                (
                    GeneratedValue::String("name".to_string()),
                    GeneratedValue::String("test".to_string())
                ),
            ])
        );
    }

    #[test]
    fn test_coerce_scalars() {
        let resolver = resolver();
        let yaml: YamlValue = serde_yaml::from_str("7").unwrap();

        assert_eq!(
            yaml_to_value_for(&yaml, &target("int"), &resolver),
            GeneratedValue::Int32(7)
        );
        assert_eq!(
            yaml_to_value_for(&yaml, &target("u16"), &resolver),
            GeneratedValue::UInt64(7)
        );
        assert_eq!(
            yaml_to_value_for(&yaml, &target("double"), &resolver),
            GeneratedValue::Float64(7.0)
        );

        let yaml = YamlValue::String("2024-03-01".to_string());
        assert_eq!(
            yaml_to_value_for(&yaml, &target("LocalDate"), &resolver),
            GeneratedValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );

        let yaml = YamlValue::String("12.50".to_string());
        assert_eq!(
            yaml_to_value_for(&yaml, &target("BigDecimal"), &resolver),
            GeneratedValue::decimal("12.50", 4, 2)
        );

        // Values that do not fit are kept
        let yaml = YamlValue::String("not-a-uuid".to_string());
        assert_eq!(
            yaml_to_value_for(&yaml, &target("uuid"), &resolver),
            GeneratedValue::String("not-a-uuid".to_string())
        );
    }

    #[test]
    fn test_coerce_structures() {
        let resolver = resolver();

        let yaml: YamlValue = serde_yaml::from_str("[1, 1, 2]").unwrap();
        assert_eq!(
            yaml_to_value_for(&yaml, &target("Set<Integer>"), &resolver),
            GeneratedValue::Set(vec![GeneratedValue::Int32(1), GeneratedValue::Int32(2)])
        );

        let yaml = YamlValue::String("Green".to_string());
        assert_eq!(
            yaml_to_value_for(&yaml, &target("Color"), &resolver),
            GeneratedValue::Enum {
                type_name: "Color".to_string(),
                variant: "Green".to_string(),
            }
        );

        let yaml: YamlValue = serde_yaml::from_str("{ zip: 1234, since: 2001-02-03 }").unwrap();
        let record = yaml_to_value_for(&yaml, &target("Optional<Address>"), &resolver);
        assert_eq!(record.type_name(), Some("Address"));
        assert_eq!(record.get_field("zip"), Some(&GeneratedValue::Int32(1234)));
        assert_eq!(
            record.get_field("since"),
            Some(&GeneratedValue::Date(NaiveDate::from_ymd_opt(2001, 2, 3).unwrap()))
        );
    }
}
