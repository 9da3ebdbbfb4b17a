//! JSON argument values to statement parameters.

use cypher_ast::{ast::Literal, ast::Expression, CypherValue, TemporalKind};
use graphql_cypher_schema::{Attribute, ScalarKind};
use indexmap::IndexMap;
use serde_json::Value;

use crate::TranslationError;

/// Converts a value without type information: integers stay integers.
pub(crate) fn from_json(value: &Value) -> CypherValue {
    match value {
        Value::Null => CypherValue::Null,
        Value::Bool(value) => CypherValue::Boolean(*value),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => CypherValue::Integer(integer),
            None => CypherValue::Float(number.as_f64().unwrap_or_default()),
        },
        Value::String(value) => CypherValue::String(value.clone()),
        Value::Array(items) => CypherValue::List(items.iter().map(from_json).collect()),
        Value::Object(entries) => CypherValue::Map(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), from_json(value)))
                .collect::<IndexMap<_, _>>(),
        ),
    }
}

/// Converts an input value of the attribute, list items included.
pub(crate) fn for_attribute(value: &Value, attribute: &Attribute) -> Result<CypherValue, TranslationError> {
    for_scalar(value, attribute.scalar(), attribute.name())
}

pub(crate) fn for_scalar(
    value: &Value,
    scalar: Option<ScalarKind>,
    argument: &str,
) -> Result<CypherValue, TranslationError> {
    let Some(scalar) = scalar else {
        return Ok(from_json(value));
    };

    let converted = match (value, scalar) {
        (Value::Null, _) => CypherValue::Null,
        (Value::Array(items), _) => CypherValue::List(
            items
                .iter()
                .map(|item| for_scalar(item, Some(scalar), argument))
                .collect::<Result<_, _>>()?,
        ),
        (Value::Number(number), ScalarKind::Float) => match number.as_f64() {
            Some(float) => CypherValue::Float(float),
            None => return Err(TranslationError::invalid(argument, "expected a float")),
        },
        (Value::Number(number), ScalarKind::Int | ScalarKind::BigInt) => match number.as_i64() {
            Some(integer) => CypherValue::Integer(integer),
            None => return Err(TranslationError::invalid(argument, "expected a 64-bit integer")),
        },
        (Value::String(text), ScalarKind::BigInt) => match text.parse::<i64>() {
            Ok(integer) => CypherValue::Integer(integer),
            Err(_) => return Err(TranslationError::invalid(argument, format!("{text} is not a BigInt"))),
        },
        (Value::String(text), kind) => match temporal_kind(kind) {
            Some(temporal) => CypherValue::Temporal(temporal, text.clone()),
            None => CypherValue::String(text.clone()),
        },
        (value, _) => from_json(value),
    };

    Ok(converted)
}

pub(crate) fn temporal_kind(scalar: ScalarKind) -> Option<TemporalKind> {
    match scalar {
        ScalarKind::DateTime => Some(TemporalKind::DateTime),
        ScalarKind::LocalDateTime => Some(TemporalKind::LocalDateTime),
        ScalarKind::Date => Some(TemporalKind::Date),
        ScalarKind::Time => Some(TemporalKind::Time),
        ScalarKind::LocalTime => Some(TemporalKind::LocalTime),
        ScalarKind::Duration => Some(TemporalKind::Duration),
        _ => None,
    }
}

/// An inline literal, used for `@coalesce` fallbacks.
pub(crate) fn literal(value: &Value) -> Expression {
    match value {
        Value::Null => Expression::null(),
        Value::Bool(value) => Expression::boolean(*value),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => Expression::integer(integer),
            None => Expression::Literal(Literal::Float(number.as_f64().unwrap_or_default())),
        },
        Value::String(text) => Expression::string(text.as_str()),
        Value::Array(items) => Expression::list(items.iter().map(literal)),
        Value::Object(entries) => Expression::map(entries.iter().map(|(key, value)| (key.clone(), literal(value)))),
    }
}

#[cfg(test)]
mod tests {
    use cypher_ast::{CypherValue, TemporalKind};
    use graphql_cypher_schema::ScalarKind;
    use serde_json::json;

    use super::for_scalar;

    #[test]
    fn big_ints_keep_their_precision() {
        let value = for_scalar(&json!("9223372036854775807"), Some(ScalarKind::BigInt), "count").unwrap();
        assert_eq!(value, CypherValue::Integer(i64::MAX));
    }

    #[test]
    fn temporals_are_typed() {
        let value = for_scalar(&json!(["2024-01-01"]), Some(ScalarKind::Date), "released").unwrap();

        assert_eq!(
            value,
            CypherValue::List(vec![CypherValue::Temporal(TemporalKind::Date, String::from("2024-01-01"))])
        );
    }

    #[test]
    fn integers_are_not_floats_unless_the_field_says_so() {
        assert_eq!(
            for_scalar(&json!(10), Some(ScalarKind::Float), "rating").unwrap(),
            CypherValue::Float(10.0)
        );
        assert_eq!(
            for_scalar(&json!(10), Some(ScalarKind::Int), "rating").unwrap(),
            CypherValue::Integer(10)
        );
        assert!(for_scalar(&json!(1.5), Some(ScalarKind::Int), "rating").is_err());
    }
}
