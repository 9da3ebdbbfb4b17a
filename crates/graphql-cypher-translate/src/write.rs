//! Mutations. Every nested operation runs in its own `CALL` subquery that
//! imports the node it hangs off, so a nested input that matches nothing
//! leaves the rest of the statement alone.

mod connect;
mod create;
mod delete;
mod update;

pub(crate) use create::create;
pub(crate) use delete::delete;
pub(crate) use update::update;

use cypher_ast::ast::{function, Expression, Function, SetItem, Variable};
use graphql_cypher_schema::{
    annotation::WriteOperation, Attribute, AttributeKind, EntityKind, EntityWalker, RelationshipWalker, ScalarKind,
};
use serde_json::{Map, Value};

use crate::{context::TranslationContext, filter::object, value, ResolvedField, TranslationError};

type Visit<'v, 'a> = dyn FnMut(RelationshipWalker<'a>, EntityWalker<'a>, &Map<String, Value>) -> Result<(), TranslationError> + 'v;

/// Walks a `{ relationship: [item] }` input of `entity`, calling `visit` for
/// every item with the entity it targets. Union relationships are keyed by
/// member; `_on` inputs apply when they name `entity`.
fn each_related<'a>(entity: EntityWalker<'a>, input: &Map<String, Value>, visit: &mut Visit<'_, 'a>) -> Result<(), TranslationError> {
    for (key, value) in input {
        if value.is_null() {
            continue;
        }

        if key == "_on" {
            for (implementation, value) in object(key, value)? {
                if implementation == entity.name() {
                    for item in items(value, implementation)? {
                        each_related(entity, item, visit)?;
                    }
                }
            }

            continue;
        }

        let relationship = entity.find_relationship(key).ok_or_else(|| unknown_field(entity, key))?;

        for (target, value) in related_inputs(relationship, value, key)? {
            for item in items(value, key)? {
                visit(relationship, target, item)?;
            }
        }
    }

    Ok(())
}

/// The entity targeted by a nested input, with the input. Inputs of union
/// relationships are keyed by member.
fn related_inputs<'a, 'v>(
    relationship: RelationshipWalker<'a>,
    value: &'v Value,
    argument: &str,
) -> Result<Vec<(EntityWalker<'a>, &'v Value)>, TranslationError> {
    let target = relationship.target();

    if target.kind() != EntityKind::Union {
        return Ok(if value.is_null() { Vec::new() } else { vec![(target, value)] });
    }

    let mut inputs = Vec::new();

    for (name, value) in object(argument, value)? {
        if value.is_null() {
            continue;
        }

        let member = target
            .concrete_entities()
            .into_iter()
            .find(|member| member.name() == name)
            .ok_or_else(|| unknown_field(target, name))?;

        inputs.push((member, value));
    }

    Ok(inputs)
}

/// The objects of a list input. A single object counts as a list of one.
fn items<'v>(value: &'v Value, argument: &str) -> Result<Vec<&'v Map<String, Value>>, TranslationError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.iter().map(|item| object(argument, item)).collect(),
        value => Ok(vec![object(argument, value)?]),
    }
}

/// An optional object member of an input.
fn member<'v>(input: &'v Map<String, Value>, key: &str) -> Result<Option<&'v Map<String, Value>>, TranslationError> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => object(key, value).map(Some),
    }
}

/// The concrete entity a node input creates. Interface inputs name the
/// implementation: `{ Movie: { .. } }`.
fn concrete_input<'a, 'v>(
    target: EntityWalker<'a>,
    input: &'v Map<String, Value>,
) -> Result<(EntityWalker<'a>, &'v Map<String, Value>), TranslationError> {
    if target.kind() == EntityKind::Concrete {
        return Ok((target, input));
    }

    let mut chosen = input.iter().filter(|(_, value)| !value.is_null());

    match (chosen.next(), chosen.next()) {
        (Some((name, value)), None) => {
            let member = target
                .concrete_entities()
                .into_iter()
                .find(|member| member.name() == name)
                .ok_or_else(|| unknown_field(target, name))?;

            Ok((member, object(name, value)?))
        }
        _ => Err(TranslationError::invalid(
            target.name(),
            "exactly one implementation must be given",
        )),
    }
}

/// The property writes of a created node or relationship: the input values,
/// then generated ids, timestamps, `@populatedBy` callbacks and defaults for
/// the attributes the input leaves out.
fn create_sets<'a>(
    ctx: &mut TranslationContext<'_>,
    target: &Variable,
    attributes: impl Iterator<Item = &'a Attribute>,
    input: Option<&Map<String, Value>>,
) -> Result<Vec<SetItem>, TranslationError> {
    let mut sets = Vec::new();

    for attribute in attributes {
        if attribute.is_cypher() || matches!(attribute.ty().kind, AttributeKind::Entity(_)) {
            continue;
        }

        let given = input
            .and_then(|input| input.get(attribute.name()))
            .filter(|value| !value.is_null());

        let value = match given {
            Some(value) => Some(input_value(ctx, attribute, value)?),
            None if attribute.is_autogenerated_id() => Some(function::random_uuid().into()),
            None if attribute.timestamp_on(WriteOperation::Create) => Some(timestamp(attribute).into()),
            None => match attribute.populated_by_on(WriteOperation::Create) {
                Some(callback) => Some(callback_value(ctx, attribute, callback)?),
                None => match attribute.default_value() {
                    Some(default) => Some(input_value(ctx, attribute, default)?),
                    None => None,
                },
            },
        };

        if let Some(value) = value {
            sets.push(SetItem::new(target.property(attribute.database_name()), value));
        }
    }

    Ok(sets)
}

/// Timestamps and callbacks refreshed by every update.
fn managed_update_sets<'a>(
    ctx: &mut TranslationContext<'_>,
    target: &Variable,
    attributes: impl Iterator<Item = &'a Attribute>,
) -> Result<Vec<SetItem>, TranslationError> {
    let mut sets = Vec::new();

    for attribute in attributes {
        let value = if attribute.timestamp_on(WriteOperation::Update) {
            Expression::from(timestamp(attribute))
        } else if let Some(callback) = attribute.populated_by_on(WriteOperation::Update) {
            callback_value(ctx, attribute, callback)?
        } else {
            continue;
        };

        sets.push(SetItem::new(target.property(attribute.database_name()), value));
    }

    Ok(sets)
}

/// A parameter for an input value. Points are built with `point()`.
fn input_value(
    ctx: &mut TranslationContext<'_>,
    attribute: &Attribute,
    value: &Value,
) -> Result<Expression, TranslationError> {
    let param = ctx.param(value::for_attribute(value, attribute)?);

    if !attribute.scalar().is_some_and(ScalarKind::is_spatial) || value.is_null() {
        return Ok(param);
    }

    if attribute.is_list() {
        let item = ctx.value();
        return Ok(Expression::list_comprehension(
            item.clone(),
            param,
            None,
            Some(function::point(item).into()),
        ));
    }

    Ok(function::point(param).into())
}

fn callback_value(
    ctx: &mut TranslationContext<'_>,
    attribute: &Attribute,
    callback: &str,
) -> Result<Expression, TranslationError> {
    let value = ctx.callback(callback).ok_or_else(|| TranslationError::MissingCallback {
        callback: callback.to_string(),
    })?;

    input_value(ctx, attribute, value)
}

/// The current instant in the temporal type of the attribute.
fn timestamp(attribute: &Attribute) -> Function {
    match attribute.scalar() {
        Some(ScalarKind::Date) => Function::new("date", []),
        Some(ScalarKind::Time) => Function::new("time", []),
        Some(ScalarKind::LocalTime) => Function::new("localtime", []),
        Some(ScalarKind::LocalDateTime) => Function::new("localdatetime", []),
        _ => function::datetime(),
    }
}

/// The fields selected under the node list of a mutation response,
/// `createMovies { movies { .. } }`.
fn response_selection(field: &ResolvedField, entity: EntityWalker<'_>) -> Vec<ResolvedField> {
    let plural = entity.names().plural();

    field
        .selection
        .iter()
        .filter(|selected| selected.name == plural)
        .flat_map(|selected| selected.selection.iter().cloned())
        .collect()
}

fn unknown_field(entity: EntityWalker<'_>, field: &str) -> TranslationError {
    TranslationError::UnknownField {
        entity: entity.name().to_string(),
        field: field.to_string(),
    }
}
