use cypher_ast::{
    ast::{function, Expression, MathOp, Projection, ProjectionItem, Query, SetItem, Variable},
    CypherValue,
};
use graphql_cypher_schema::{
    annotation::{AuthorizationOperation, NestedOperation},
    filter_keys::UpdateOperator,
    Attribute, EntityKind, EntityWalker, RelationshipWalker,
};
use serde_json::{Map, Value};

use super::{
    connect, create, delete, each_related, input_value, items, managed_update_sets, member, related_inputs,
    response_selection, unknown_field,
};
use crate::{
    context::TranslationContext,
    filter::{object, Filter},
    pattern,
    projection::ProjectionBuilder,
    ResolvedField, TranslationError,
};

/// The nested operations of an update, in the order they run.
const OPERATIONS: [&str; 6] = ["update", "disconnect", "connect", "connectOrCreate", "delete", "create"];

/// `updateMovies(where:, update:, connect:, disconnect:, create:, delete:, connectOrCreate:)`
pub(crate) fn update<'a>(
    ctx: &mut TranslationContext<'a>,
    entity: EntityWalker<'a>,
    field: &ResolvedField,
) -> Result<Query, TranslationError> {
    if entity.kind() != EntityKind::Concrete {
        return Err(TranslationError::UnknownEntity {
            name: entity.name().to_string(),
        });
    }

    let this = Variable::named("this");
    let mut query = Query::new();

    Filter::build(
        ctx,
        &this,
        entity,
        entity,
        field.object_argument("where"),
        AuthorizationOperation::Update,
    )?
    .push_match(&mut query, pattern::node(&this, entity));

    for operation in OPERATIONS {
        let Some(input) = field.object_argument(operation) else {
            continue;
        };

        if operation == "update" {
            update_node(ctx, &mut query, &this, entity, input)?;
            continue;
        }

        each_related(entity, input, &mut |relationship, target, item| {
            relationship_operation(ctx, &mut query, &this, relationship, target, operation, item, None)
        })?;
    }

    let mut builder = ProjectionBuilder::new(ctx);
    let map = builder.node(&this, entity, &response_selection(field, entity))?;
    builder.push_into(&mut query);

    query.returning(Projection::items([ProjectionItem::aliased(map, this)]));

    Ok(query)
}

/// `SET` of the attributes in the input, followed by the updates of the
/// relationship fields in it.
fn update_node<'a>(
    ctx: &mut TranslationContext<'a>,
    query: &mut Query,
    node: &Variable,
    entity: EntityWalker<'a>,
    input: &Map<String, Value>,
) -> Result<(), TranslationError> {
    let attributes = entity.attributes().collect::<Vec<_>>();
    let mut sets = Vec::new();
    let mut related = Vec::new();

    collect_node_input(ctx, node, entity, &attributes, input, &mut sets, &mut related)?;

    sets.extend(managed_update_sets(ctx, node, attributes.iter().copied())?);
    query.set(sets);

    for (relationship, value) in related {
        for (target, value) in related_inputs(relationship, value, relationship.name())? {
            for item in items(value, relationship.name())? {
                update_relationship(ctx, query, node, relationship, target, item)?;
            }
        }
    }

    Ok(())
}

/// Splits a node update input into property writes and relationship inputs.
/// `_on` applies the input of the implementation being updated.
#[allow(clippy::too_many_arguments)]
fn collect_node_input<'a, 'v>(
    ctx: &mut TranslationContext<'a>,
    node: &Variable,
    entity: EntityWalker<'a>,
    attributes: &[&'a Attribute],
    input: &'v Map<String, Value>,
    sets: &mut Vec<SetItem>,
    related: &mut Vec<(RelationshipWalker<'a>, &'v Value)>,
) -> Result<(), TranslationError> {
    for (key, value) in input {
        if key == "_on" {
            for (implementation, value) in object(key, value)? {
                if implementation == entity.name() && !value.is_null() {
                    collect_node_input(ctx, node, entity, attributes, object(implementation, value)?, sets, related)?;
                }
            }

            continue;
        }

        if let Some(set) = property_set(ctx, node, attributes, key, value)? {
            sets.push(set);
            continue;
        }

        match entity.find_relationship(key) {
            Some(relationship) if !value.is_null() => related.push((relationship, value)),
            Some(_) => (),
            None => return Err(unknown_field(entity, key)),
        }
    }

    Ok(())
}

/// The write of one update key: a plain assignment or a math or list
/// operator. `None` when the key names no attribute.
fn property_set(
    ctx: &mut TranslationContext<'_>,
    target: &Variable,
    attributes: &[&Attribute],
    key: &str,
    value: &Value,
) -> Result<Option<SetItem>, TranslationError> {
    if let Some(attribute) = attributes.iter().find(|attribute| attribute.name() == key) {
        if !attribute.is_updatable() {
            return Err(TranslationError::invalid(key, "the field cannot be updated"));
        }

        let value = input_value(ctx, attribute, value)?;
        return Ok(Some(SetItem::new(target.property(attribute.database_name()), value)));
    }

    let Some((attribute, operator)) = attributes
        .iter()
        .find_map(|attribute| UpdateOperator::parse(key, attribute).map(|operator| (*attribute, operator)))
    else {
        return Ok(None);
    };

    if !attribute.is_updatable() {
        return Err(TranslationError::invalid(key, "the field cannot be updated"));
    }

    if value.is_null() {
        return Err(TranslationError::invalid(key, "operators do not take null"));
    }

    let current = target.property(attribute.database_name());

    let updated = match operator {
        UpdateOperator::Increment | UpdateOperator::Add => current.math(MathOp::Add, input_value(ctx, attribute, value)?),
        UpdateOperator::Decrement | UpdateOperator::Subtract => {
            current.math(MathOp::Subtract, input_value(ctx, attribute, value)?)
        }
        UpdateOperator::Multiply => current.math(MathOp::Multiply, input_value(ctx, attribute, value)?),
        UpdateOperator::Divide => current.math(MathOp::Divide, input_value(ctx, attribute, value)?),
        UpdateOperator::Push => {
            let pushed = match value {
                Value::Array(_) => value.clone(),
                value => Value::Array(vec![value.clone()]),
            };

            Expression::from(function::coalesce(current, Expression::list([])))
                .math(MathOp::Add, input_value(ctx, attribute, &pushed)?)
        }
        UpdateOperator::Pop => {
            let count = value
                .as_i64()
                .filter(|count| *count >= 0)
                .ok_or_else(|| TranslationError::invalid(key, "expected a non-negative integer"))?;

            current.slice(None, Some(ctx.param(CypherValue::Integer(count)).negate()))
        }
    };

    Ok(Some(SetItem::new(target.property(attribute.database_name()), updated)))
}

/// `{ where, update: { node, edge }, connect, disconnect, create, delete,
/// connectOrCreate }` of a relationship field.
fn update_relationship<'a>(
    ctx: &mut TranslationContext<'a>,
    query: &mut Query,
    source: &Variable,
    relationship: RelationshipWalker<'a>,
    target: EntityWalker<'a>,
    input: &Map<String, Value>,
) -> Result<(), TranslationError> {
    if let Some(key) = input.keys().find(|key| *key != "where" && !OPERATIONS.contains(&key.as_str())) {
        return Err(TranslationError::unknown_filter(
            relationship.names().update_field_input(),
            key,
        ));
    }

    let filter = member(input, "where")?;

    for operation in OPERATIONS {
        let Some(value) = input.get(operation).filter(|value| !value.is_null()) else {
            continue;
        };

        for item in items(value, operation)? {
            relationship_operation(ctx, query, source, relationship, target, operation, item, filter)?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn relationship_operation<'a>(
    ctx: &mut TranslationContext<'a>,
    query: &mut Query,
    source: &Variable,
    relationship: RelationshipWalker<'a>,
    target: EntityWalker<'a>,
    operation: &str,
    input: &Map<String, Value>,
    filter: Option<&Map<String, Value>>,
) -> Result<(), TranslationError> {
    match operation {
        "update" => nested_update(ctx, query, source, relationship, target, filter, input),
        "disconnect" => connect::disconnect(ctx, query, source, relationship, target, input),
        "connect" => connect::connect(ctx, query, source, relationship, target, input),
        "connectOrCreate" => connect::connect_or_create(ctx, query, source, relationship, target, input),
        "delete" => delete::nested_delete(ctx, query, source, relationship, target, input),
        _ => create::nested_create(ctx, query, source, relationship, target, input),
    }
}

/// `{ node, edge }` applied to the related nodes matching the connection
/// filter, one subquery per implementation.
///
/// ```cypher
/// CALL {
///     WITH this
///     MATCH (this)<-[this1:ACTED_IN]-(this0:Actor)
///     WHERE this0.name = $param0
///     SET this1.role = $param1
///     SET this0.name = $param2
/// }
/// ```
fn nested_update<'a>(
    ctx: &mut TranslationContext<'a>,
    query: &mut Query,
    source: &Variable,
    relationship: RelationshipWalker<'a>,
    target: EntityWalker<'a>,
    filter: Option<&Map<String, Value>>,
    input: &Map<String, Value>,
) -> Result<(), TranslationError> {
    create::allows(relationship, NestedOperation::Update, "update")?;

    let node_input = member(input, "node")?;
    let edge_input = member(input, "edge")?;

    for concrete in target.concrete_entities() {
        let node = ctx.node();
        let edge = ctx.relationship();
        let mut subquery = Query::new();
        subquery.import([source]);

        Filter::connection(
            ctx,
            &node,
            &edge,
            relationship,
            target,
            concrete,
            filter,
            AuthorizationOperation::Update,
        )?
        .push_match(
            &mut subquery,
            pattern::read(source, relationship, Some(&edge), pattern::node(&node, concrete)),
        );

        if let Some(edge_input) = edge_input {
            let properties = relationship.properties().ok_or_else(|| {
                TranslationError::invalid(
                    format!("{}.update.edge", relationship.name()),
                    "the relationship has no properties",
                )
            })?;

            let attributes = properties.get().attributes().collect::<Vec<_>>();
            let mut sets = Vec::new();

            for (key, value) in edge_input {
                let set = property_set(ctx, &edge, &attributes, key, value)?.ok_or_else(|| {
                    TranslationError::UnknownField {
                        entity: properties.name().to_string(),
                        field: key.clone(),
                    }
                })?;

                sets.push(set);
            }

            sets.extend(managed_update_sets(ctx, &edge, attributes.iter().copied())?);
            subquery.set(sets);
        }

        if let Some(node_input) = node_input {
            update_node(ctx, &mut subquery, &node, concrete, node_input)?;
        }

        query.call(subquery);
    }

    Ok(())
}
