//! Connecting existing nodes and removing relationships.

use cypher_ast::ast::{NodePattern, Query, Variable};
use graphql_cypher_schema::{
    annotation::{AuthorizationOperation, NestedOperation},
    EntityKind, EntityWalker, RelationshipWalker,
};
use serde_json::{Map, Value};

use super::{create::allows, create_sets, each_related, member, unknown_field};
use crate::{
    context::TranslationContext,
    filter::{object, Filter},
    pattern, value, TranslationError,
};

/// `{ where: { node }, edge, overwrite, connect }`: relates `source` to every
/// node matching the filter, one subquery per implementation.
///
/// ```cypher
/// CALL {
///     WITH this
///     MATCH (this0:Actor)
///     WHERE this0.name = $param0
///     MERGE (this)<-[this1:ACTED_IN]-(this0)
///     SET this1.role = $param1
/// }
/// ```
pub(super) fn connect<'a>(
    ctx: &mut TranslationContext<'a>,
    query: &mut Query,
    source: &Variable,
    relationship: RelationshipWalker<'a>,
    target: EntityWalker<'a>,
    input: &Map<String, Value>,
) -> Result<(), TranslationError> {
    allows(relationship, NestedOperation::Connect, "connect")?;

    let node_filter = member(input, "where")?.map(|filter| member(filter, "node")).transpose()?.flatten();

    let overwrite = match input.get("overwrite") {
        None | Some(Value::Null) => true,
        Some(Value::Bool(overwrite)) => *overwrite,
        Some(_) => return Err(TranslationError::invalid("overwrite", "expected a boolean")),
    };

    for concrete in target.concrete_entities() {
        let node = ctx.node();
        let edge = ctx.relationship();
        let mut subquery = Query::new();
        subquery.import([source]);

        Filter::build(
            ctx,
            &node,
            target,
            concrete,
            node_filter,
            AuthorizationOperation::CreateRelationship,
        )?
        .push_match(&mut subquery, pattern::node(&node, concrete));

        let related = pattern::write(source, relationship, Some(&edge), NodePattern::new(node.clone()));

        let sets = match relationship.properties() {
            Some(properties) => create_sets(ctx, &edge, properties.get().attributes(), member(input, "edge")?)?,
            None => Vec::new(),
        };

        if overwrite {
            subquery.merge(related, Vec::new()).set(sets);
        } else {
            subquery.create(related).set(sets);
        }

        if let Some(nested) = member(input, "connect")? {
            each_related(concrete, nested, &mut |relationship, target, item| {
                connect(ctx, &mut subquery, &node, relationship, target, item)
            })?;
        }

        query.call(subquery);
    }

    Ok(())
}

/// `{ where: { node: { id } }, onCreate: { node, edge } }`: merges the node on
/// its unique key, creating it with the `onCreate` values when missing.
pub(super) fn connect_or_create<'a>(
    ctx: &mut TranslationContext<'a>,
    query: &mut Query,
    source: &Variable,
    relationship: RelationshipWalker<'a>,
    target: EntityWalker<'a>,
    input: &Map<String, Value>,
) -> Result<(), TranslationError> {
    allows(relationship, NestedOperation::ConnectOrCreate, "connectOrCreate")?;

    if target.kind() != EntityKind::Concrete {
        return Err(TranslationError::invalid(
            "connectOrCreate",
            "only concrete types can be connected or created",
        ));
    }

    let unique = member(input, "where")?
        .map(|filter| member(filter, "node"))
        .transpose()?
        .flatten()
        .ok_or_else(|| TranslationError::MissingArgument {
            argument: String::from("connectOrCreate.where.node"),
        })?;

    let on_create = member(input, "onCreate")?;

    let node = ctx.node();
    let edge = ctx.relationship();
    let mut merged = NodePattern::new(node.clone()).labels(target.labels());

    let mut keys = Vec::new();

    for (key, value) in unique.iter().filter(|(_, value)| !value.is_null()) {
        let attribute = target
            .find_attribute(key)
            .filter(|attribute| attribute.is_unique())
            .ok_or_else(|| unknown_field(target, key))?;

        merged = merged.property(attribute.database_name(), ctx.param(value::for_attribute(value, attribute)?));
        keys.push(key.as_str());
    }

    // a MERGE without properties would match every node of the label
    if keys.is_empty() {
        return Err(TranslationError::invalid("connectOrCreate.where.node", "expected a unique field"));
    }

    let node_input = on_create.map(|on_create| member(on_create, "node")).transpose()?.flatten();
    let attributes = target
        .attributes()
        .filter(|attribute| !keys.iter().any(|key| *key == attribute.name()));
    let node_sets = create_sets(ctx, &node, attributes, node_input)?;

    let mut subquery = Query::new();
    subquery.import([source]).merge(merged, node_sets);

    let edge_sets = match relationship.properties() {
        Some(properties) => {
            let edge_input = on_create.map(|on_create| member(on_create, "edge")).transpose()?.flatten();
            create_sets(ctx, &edge, properties.get().attributes(), edge_input)?
        }
        None => Vec::new(),
    };

    subquery.merge(
        pattern::write(source, relationship, Some(&edge), NodePattern::new(node)),
        edge_sets,
    );

    query.call(subquery);

    Ok(())
}

/// `{ where: { node, edge }, disconnect }`: deletes the matching relationships
/// of `source`, after disconnecting below the related nodes.
pub(super) fn disconnect<'a>(
    ctx: &mut TranslationContext<'a>,
    query: &mut Query,
    source: &Variable,
    relationship: RelationshipWalker<'a>,
    target: EntityWalker<'a>,
    input: &Map<String, Value>,
) -> Result<(), TranslationError> {
    allows(relationship, NestedOperation::Disconnect, "disconnect")?;

    let filter = match input.get("where") {
        None | Some(Value::Null) => None,
        Some(value) => Some(object("where", value)?),
    };

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
            AuthorizationOperation::DeleteRelationship,
        )?
        .push_match(
            &mut subquery,
            pattern::write(source, relationship, Some(&edge), pattern::node(&node, concrete)),
        );

        if let Some(nested) = member(input, "disconnect")? {
            each_related(concrete, nested, &mut |relationship, target, item| {
                disconnect(ctx, &mut subquery, &node, relationship, target, item)
            })?;
        }

        subquery.delete(edge);
        query.call(subquery);
    }

    Ok(())
}
