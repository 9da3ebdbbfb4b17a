//! Root reads: lists, aggregates and connections of an entity.

use cypher_ast::ast::{Projection, ProjectionItem, Query, Variable};
use graphql_cypher_schema::{annotation::AuthorizationOperation, EntityKind, EntityWalker};

use crate::{
    context::TranslationContext,
    filter::Filter,
    options::{projected_order, property_order, Page},
    pattern,
    projection::{aggregate_selection, connection_selection, member_branches, ProjectionBuilder},
    ResolvedField, TranslationError,
};

/// `movies(where:, options:)`, one row per node. Interfaces read every
/// implementation in its own `UNION` branch and sort the merged rows.
pub(crate) fn read<'a>(
    ctx: &mut TranslationContext<'a>,
    entity: EntityWalker<'a>,
    field: &ResolvedField,
) -> Result<Query, TranslationError> {
    let this = Variable::named("this");
    let page = Page::from_options(field.object_argument("options"))?.limited_by(entity);
    let mut query = Query::new();

    if entity.kind() != EntityKind::Concrete {
        let branches = member_branches(ctx, None, entity, field, &page.sort, &this)?;

        query.call_union(branches);
        page.push(ctx, &mut query, projected_order(this.clone().into(), &page.sort));
        query.returning(Projection::items([ProjectionItem::from(&this)]));

        return Ok(query);
    }

    Filter::build(
        ctx,
        &this,
        entity,
        entity,
        field.object_argument("where"),
        AuthorizationOperation::Read,
    )?
    .push_match(&mut query, pattern::node(&this, entity));

    let order = property_order(&this, entity.name(), |name| entity.find_attribute(name), &page.sort)?;
    page.push(ctx, &mut query, order);

    let mut builder = ProjectionBuilder::new(ctx);
    let map = builder.node(&this, entity, &field.selection)?;
    builder.push_into(&mut query);

    query.returning(Projection::items([ProjectionItem::aliased(map, this)]));

    Ok(query)
}

/// `moviesAggregate(where:)`, a single row.
pub(crate) fn aggregate<'a>(
    ctx: &mut TranslationContext<'a>,
    entity: EntityWalker<'a>,
    field: &ResolvedField,
) -> Result<Query, TranslationError> {
    let mut subqueries = Vec::new();
    let selection = aggregate_selection(ctx, &mut subqueries, None, entity, field)?;

    let mut query = Query::new();

    for subquery in subqueries {
        query.call(subquery);
    }

    query.returning(Projection::items([ProjectionItem::aliased(
        selection,
        Variable::named("this"),
    )]));

    Ok(query)
}

/// `moviesConnection(where:, sort:, first:, after:)`, a single row.
pub(crate) fn connection<'a>(
    ctx: &mut TranslationContext<'a>,
    entity: EntityWalker<'a>,
    field: &ResolvedField,
) -> Result<Query, TranslationError> {
    let (mut query, selection) = connection_selection(ctx, None, entity, field)?;

    query.returning(Projection::items([ProjectionItem::aliased(
        selection,
        Variable::named("this"),
    )]));

    Ok(query)
}
