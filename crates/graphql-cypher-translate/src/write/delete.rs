use cypher_ast::ast::{Query, Variable};
use graphql_cypher_schema::{
    annotation::{AuthorizationOperation, NestedOperation},
    EntityKind, EntityWalker, RelationshipWalker,
};
use serde_json::{Map, Value};

use super::{create::allows, each_related, member};
use crate::{
    context::TranslationContext,
    filter::{object, Filter},
    pattern, ResolvedField, TranslationError,
};

/// `deleteMovies(where:, delete:)`. The response counts come from the query
/// statistics, so nothing is returned.
pub(crate) fn delete<'a>(
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
        AuthorizationOperation::Delete,
    )?
    .push_match(&mut query, pattern::node(&this, entity));

    if let Some(nested) = field.object_argument("delete") {
        each_related(entity, nested, &mut |relationship, target, item| {
            nested_delete(ctx, &mut query, &this, relationship, target, item)
        })?;
    }

    query.detach_delete(this);

    Ok(query)
}

/// `{ where: { node, edge }, delete }`: deletes the related nodes matching
/// the filter and, before them, their own nested deletes.
///
/// ```cypher
/// CALL {
///     WITH this
///     MATCH (this)<-[this1:ACTED_IN]-(this0:Actor)
///     WHERE this0.name = $param0
///     DETACH DELETE this0
/// }
/// ```
pub(super) fn nested_delete<'a>(
    ctx: &mut TranslationContext<'a>,
    query: &mut Query,
    source: &Variable,
    relationship: RelationshipWalker<'a>,
    target: EntityWalker<'a>,
    input: &Map<String, Value>,
) -> Result<(), TranslationError> {
    allows(relationship, NestedOperation::Delete, "delete")?;

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
            AuthorizationOperation::Delete,
        )?
        .push_match(
            &mut subquery,
            pattern::read(source, relationship, Some(&edge), pattern::node(&node, concrete)),
        );

        if let Some(nested) = member(input, "delete")? {
            each_related(concrete, nested, &mut |relationship, target, item| {
                nested_delete(ctx, &mut subquery, &node, relationship, target, item)
            })?;
        }

        subquery.detach_delete(node);
        query.call(subquery);
    }

    Ok(())
}
