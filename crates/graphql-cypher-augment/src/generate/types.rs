//! Type references of generated fields.

use graphql_cypher_schema::{
    filter_keys::{update_operators, AggregationKey, AggregationOperator, ComparisonOperator, UpdateOperator},
    Attribute, AttributeKind, FieldArgument, RelationshipWalker, ScalarKind, UserDirective,
};
use serde_json::Value;

use crate::{
    sdl::{Field, InputValue},
    session::BuildSession,
};

/// The named type of an attribute in input positions.
pub(crate) fn input_name(attribute: &Attribute) -> &str {
    match attribute.ty().kind {
        AttributeKind::Scalar(kind) => kind.input_type_name(),
        _ => &attribute.ty().name,
    }
}

/// Records the helper types an attribute needs.
pub(crate) fn note_usage(session: &mut BuildSession, attribute: &Attribute) {
    match attribute.scalar() {
        Some(ScalarKind::Point) => session.uses_point = true,
        Some(ScalarKind::CartesianPoint) => session.uses_cartesian_point = true,
        _ => (),
    }
}

fn distance_name(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::CartesianPoint => "CartesianPointDistance",
        _ => "PointDistance",
    }
}

/// The type of one where key for an attribute.
pub(crate) fn filter_type(attribute: &Attribute, operator: ComparisonOperator) -> String {
    let input = input_name(attribute);
    let spatial = attribute.scalar().filter(|kind| kind.is_spatial());

    match operator {
        ComparisonOperator::Equals if attribute.is_list() => attribute.ty().render_with(input, true),
        ComparisonOperator::In if attribute.is_required() => format!("[{input}!]"),
        ComparisonOperator::In => format!("[{input}]"),
        ComparisonOperator::Lt
        | ComparisonOperator::Lte
        | ComparisonOperator::Gt
        | ComparisonOperator::Gte
        | ComparisonOperator::Distance => match spatial {
            Some(kind) => distance_name(kind).to_string(),
            None => input.to_string(),
        },
        _ => input.to_string(),
    }
}

/// The value type of an aggregation filter key.
pub(crate) fn aggregation_filter_type(attribute: &Attribute, key: AggregationKey) -> &'static str {
    let scalar = attribute.scalar().unwrap_or(ScalarKind::Float);

    let Some(operator) = key.operator else {
        return if key.measures_length { "Int" } else { scalar.name() };
    };

    match operator {
        AggregationOperator::Average if key.measures_length => "Float",
        AggregationOperator::AverageLength => "Float",
        AggregationOperator::ShortestLength
        | AggregationOperator::LongestLength
        | AggregationOperator::Shortest
        | AggregationOperator::Longest => "Int",
        AggregationOperator::Average => match scalar {
            ScalarKind::Int | ScalarKind::Float => "Float",
            other => other.name(),
        },
        AggregationOperator::Min | AggregationOperator::Max | AggregationOperator::Sum => scalar.name(),
    }
}

pub(crate) fn update_operator_type(attribute: &Attribute, operator: UpdateOperator) -> String {
    match operator {
        UpdateOperator::Push => attribute.ty().render_with(input_name(attribute), true),
        UpdateOperator::Pop => String::from("Int"),
        UpdateOperator::Add | UpdateOperator::Subtract | UpdateOperator::Multiply | UpdateOperator::Divide => {
            String::from("Float")
        }
        UpdateOperator::Increment | UpdateOperator::Decrement => input_name(attribute).to_string(),
    }
}

/// The output type of a relationship field with the declared wrappers.
pub(crate) fn relationship_type(relationship: RelationshipWalker<'_>) -> String {
    let target = relationship.target().name();
    let bang = |nullable: bool| if nullable { "" } else { "!" };
    let relationship = relationship.get();

    if relationship.is_list() {
        format!(
            "[{target}{}]{}",
            bang(relationship.list_items_nullable()),
            bang(!relationship.is_required())
        )
    } else {
        format!("{target}{}", bang(!relationship.is_required()))
    }
}

/// The field name of an entity in fulltext results, `movie` for `Movie`.
pub(crate) fn directives(directives: &[UserDirective]) -> impl Iterator<Item = String> + '_ {
    directives.iter().map(ToString::to_string)
}

pub(crate) fn argument(argument: &FieldArgument) -> InputValue {
    let mut value = InputValue::new(&argument.name, argument.ty.to_string())
        .with_description(argument.description.as_deref());

    if let Some(default) = &argument.default_value {
        value = value.with_default(default.to_string());
    }

    value
}

/// The field of an attribute on an object or interface type.
pub(crate) fn attribute_field(attribute: &Attribute) -> Field {
    Field::new(attribute.name(), attribute.ty().to_string())
        .with_description(attribute.description())
        .with_arguments(attribute.arguments().iter().map(argument))
        .with_directives(directives(attribute.annotations().user_directives()))
}

pub(crate) fn deprecations(attribute: &Attribute) -> impl Iterator<Item = String> + '_ {
    attribute
        .annotations()
        .user_directives()
        .iter()
        .filter(|directive| directive.is_deprecated())
        .map(ToString::to_string)
}

/// The create input field of a creatable attribute. A default value makes the
/// field optional.
pub(crate) fn create_input_field(session: &mut BuildSession, attribute: &Attribute) -> InputValue {
    note_usage(session, attribute);

    let default = attribute.default_value();
    let nullable = !attribute.is_required() || default.is_some();
    let mut field = InputValue::new(attribute.name(), attribute.ty().render_with(input_name(attribute), nullable))
        .with_directives(deprecations(attribute));

    if let Some(default) = default {
        field = field.with_default(graphql_literal(default, attribute.ty().kind == AttributeKind::Enum));
    }

    field
}

/// The update input fields of an updatable attribute: the plain assignment
/// followed by its math or list operators.
pub(crate) fn update_input_fields(session: &mut BuildSession, attribute: &Attribute) -> Vec<InputValue> {
    note_usage(session, attribute);

    let mut fields = vec![
        InputValue::new(attribute.name(), attribute.ty().render_with(input_name(attribute), true))
            .with_directives(deprecations(attribute)),
    ];

    for &operator in update_operators(attribute) {
        fields.push(
            InputValue::new(operator.key(attribute.name()), update_operator_type(attribute, operator))
                .with_directives(deprecations(attribute)),
        );
    }

    fields
}

/// A JSON value as a GraphQL literal, with strings as enum values when the
/// attribute is an enum.
pub(crate) fn graphql_literal(value: &Value, enum_value: bool) -> String {
    match value {
        Value::Null => String::from("null"),
        Value::Bool(value) => value.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(value) if enum_value => value.clone(),
        Value::String(value) => crate::sdl::quoted(value),
        Value::Array(values) => {
            let values: Vec<_> = values.iter().map(|value| graphql_literal(value, enum_value)).collect();
            format!("[{}]", values.join(", "))
        }
        Value::Object(fields) => {
            let fields: Vec<_> = fields
                .iter()
                .map(|(name, value)| format!("{name}: {}", graphql_literal(value, enum_value)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals() {
        assert_eq!(graphql_literal(&serde_json::json!("ACTION"), true), "ACTION");
        assert_eq!(graphql_literal(&serde_json::json!("a \"b\""), false), r#""a \"b\"""#);
        assert_eq!(graphql_literal(&serde_json::json!([1, 2]), false), "[1, 2]");
        assert_eq!(graphql_literal(&serde_json::json!({"x": true}), false), "{x: true}");
    }
}
