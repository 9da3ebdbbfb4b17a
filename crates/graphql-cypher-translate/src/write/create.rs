use cypher_ast::ast::{Expression, NodePattern, Projection, ProjectionItem, Query, Variable};
use graphql_cypher_schema::{annotation::NestedOperation, EntityWalker, RelationshipWalker};
use serde_json::{Map, Value};

use super::{
    concrete_input, connect, create_sets, items, member, related_inputs, response_selection, unknown_field,
};
use crate::{context::TranslationContext, pattern, projection::ProjectionBuilder, ResolvedField, TranslationError};

/// `createMovies(input: [..])`. Every input creates its node in its own
/// `UNION` branch returning it as `this`.
pub(crate) fn create<'a>(
    ctx: &mut TranslationContext<'a>,
    entity: EntityWalker<'a>,
    field: &ResolvedField,
) -> Result<Query, TranslationError> {
    let this = Variable::named("this");
    let inputs = match field.argument("input") {
        Some(value) => items(value, "input")?,
        None => Vec::new(),
    };

    let mut branches = Vec::with_capacity(inputs.len());

    for input in inputs {
        let node = ctx.node();
        let mut branch = Query::new();

        create_node(ctx, &mut branch, &node, entity, input)?;
        branch.returning(Projection::items([ProjectionItem::aliased(node, this.clone())]));

        branches.push(branch);
    }

    let mut query = Query::new();

    if branches.is_empty() {
        query.unwind(Expression::list([]), this.clone());
    } else {
        query.call_union(branches);
    }

    let mut builder = ProjectionBuilder::new(ctx);
    let map = builder.node(&this, entity, &response_selection(field, entity))?;
    builder.push_into(&mut query);

    query.returning(Projection::items([ProjectionItem::aliased(map, this)]));

    Ok(query)
}

/// `CREATE (node:Label) SET ..` followed by the nested writes of the
/// relationship fields in the input.
pub(super) fn create_node<'a>(
    ctx: &mut TranslationContext<'a>,
    query: &mut Query,
    node: &Variable,
    entity: EntityWalker<'a>,
    input: &Map<String, Value>,
) -> Result<(), TranslationError> {
    let mut related = Vec::new();

    for (key, value) in input {
        if key == "_emptyInput" || value.is_null() {
            continue;
        }

        match entity.find_attribute(key) {
            Some(attribute) if attribute.is_creatable() => continue,
            Some(_) => return Err(unknown_field(entity, key)),
            None => (),
        }

        let relationship = entity.find_relationship(key).ok_or_else(|| unknown_field(entity, key))?;
        related.push((relationship, value));
    }

    query.create(pattern::node(node, entity));

    let sets = create_sets(ctx, node, entity.attributes(), Some(input))?;
    query.set(sets);

    for (relationship, value) in related {
        for (target, value) in related_inputs(relationship, value, relationship.name())? {
            for field_input in items(value, relationship.name())? {
                relationship_field(ctx, query, node, relationship, target, field_input)?;
            }
        }
    }

    Ok(())
}

/// `{ create, connect, connectOrCreate }` of a relationship field of a node
/// being created.
fn relationship_field<'a>(
    ctx: &mut TranslationContext<'a>,
    query: &mut Query,
    source: &Variable,
    relationship: RelationshipWalker<'a>,
    target: EntityWalker<'a>,
    input: &Map<String, Value>,
) -> Result<(), TranslationError> {
    for (key, value) in input {
        if value.is_null() {
            continue;
        }

        match key.as_str() {
            "create" => {
                for item in items(value, key)? {
                    nested_create(ctx, query, source, relationship, target, item)?;
                }
            }
            "connect" => {
                for item in items(value, key)? {
                    connect::connect(ctx, query, source, relationship, target, item)?;
                }
            }
            "connectOrCreate" => {
                for item in items(value, key)? {
                    connect::connect_or_create(ctx, query, source, relationship, target, item)?;
                }
            }
            other => return Err(TranslationError::unknown_filter(relationship.names().field_input(), other)),
        }
    }

    Ok(())
}

/// `{ node, edge }`: creates the node and relates it to `source`.
///
/// ```cypher
/// CALL {
///     WITH this
///     CREATE (this0:Actor)
///     SET this0.name = $param0
///     MERGE (this)<-[this1:ACTED_IN]-(this0)
///     SET this1.role = $param1
/// }
/// ```
pub(super) fn nested_create<'a>(
    ctx: &mut TranslationContext<'a>,
    query: &mut Query,
    source: &Variable,
    relationship: RelationshipWalker<'a>,
    target: EntityWalker<'a>,
    input: &Map<String, Value>,
) -> Result<(), TranslationError> {
    allows(relationship, NestedOperation::Create, "create")?;

    let node_input = member(input, "node")?.ok_or_else(|| TranslationError::MissingArgument {
        argument: format!("{}.create.node", relationship.name()),
    })?;

    let (member_entity, node_input) = concrete_input(target, node_input)?;

    let node = ctx.node();
    let mut subquery = Query::new();
    subquery.import([source]);

    create_node(ctx, &mut subquery, &node, member_entity, node_input)?;

    let edge = ctx.relationship();
    subquery.merge(pattern::write(source, relationship, Some(&edge), NodePattern::new(node)), Vec::new());

    if let Some(properties) = relationship.properties() {
        let sets = create_sets(ctx, &edge, properties.get().attributes(), member(input, "edge")?)?;
        subquery.set(sets);
    }

    query.call(subquery);

    Ok(())
}

pub(super) fn allows(
    relationship: RelationshipWalker<'_>,
    operation: NestedOperation,
    key: &str,
) -> Result<(), TranslationError> {
    if relationship.get().allows(operation) {
        return Ok(());
    }

    Err(TranslationError::invalid(
        format!("{}.{key}", relationship.name()),
        "the operation is disabled on this relationship",
    ))
}
