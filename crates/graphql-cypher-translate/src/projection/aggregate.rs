//! Aggregate selections. Every aggregated value gets its own subquery over
//! the same match, so their aggregations do not interfere.

use cypher_ast::ast::{function, Expression, NodePattern, Order, Projection, ProjectionItem, Query, Variable};
use graphql_cypher_schema::{annotation::AuthorizationOperation, Attribute, EntityWalker, RelationshipWalker, ScalarKind};
use itertools::Itertools;

use crate::{context::TranslationContext, filter::Filter, pattern, ResolvedField, TranslationError};

/// The value of an aggregate selection, `{ count: var1, node: { .. } }`.
/// The subqueries computing it are added to `subqueries`. Without a source
/// this is the root aggregate of the entity, which selects attributes
/// directly instead of under `node`.
pub(crate) fn aggregate_selection<'a>(
    ctx: &mut TranslationContext<'a>,
    subqueries: &mut Vec<Query>,
    source: Option<(&Variable, RelationshipWalker<'a>)>,
    entity: EntityWalker<'a>,
    field: &ResolvedField,
) -> Result<Expression, TranslationError> {
    let node = ctx.node();
    let target = NodePattern::new(node.clone()).labels(entity.labels());

    let filter = Filter::build(
        ctx,
        &node,
        entity,
        entity,
        field.object_argument("where"),
        AuthorizationOperation::Aggregate,
    )?
    .and(pattern::members(&node, entity));

    let mut matched = Query::new();
    let mut edge = None;

    match source {
        Some((source, relationship)) => {
            let variable = ctx.relationship();
            let pattern = pattern::read(source, relationship, Some(&variable), target);

            matched.import([source]);
            filter.push_match(&mut matched, pattern);

            edge = relationship.properties().map(|properties| (variable, properties));
        }
        None => filter.push_match(&mut matched, target),
    }

    let mut aggregator = Aggregator {
        ctx,
        subqueries,
        matched,
    };

    let mut entries = Vec::new();

    for selected in field.selection.iter().unique_by(|selected| selected.response_key()) {
        let value = match selected.name.as_str() {
            "__typename" => continue,
            "count" => aggregator.count(&node),
            "node" if source.is_some() => {
                aggregator.attributes(&node, entity.name(), |name| entity.find_attribute(name), selected)?
            }
            "edge" if source.is_some() => match &edge {
                Some((variable, properties)) => aggregator.attributes(
                    variable,
                    properties.name(),
                    |name| properties.get().attribute(name),
                    selected,
                )?,
                None => return Err(unknown_field(entity.name(), &selected.name)),
            },
            name if source.is_none() => match entity.find_attribute(name) {
                Some(attribute) if attribute.is_aggregate_selectable() => {
                    aggregator.attribute(&node, attribute, selected)?
                }
                _ => return Err(unknown_field(entity.name(), name)),
            },
            name => return Err(unknown_field(entity.name(), name)),
        };

        entries.push((selected.response_key().to_string(), value));
    }

    Ok(Expression::map(entries))
}

struct Aggregator<'c, 'a, 's> {
    ctx: &'c mut TranslationContext<'a>,
    subqueries: &'s mut Vec<Query>,
    matched: Query,
}

impl Aggregator<'_, '_, '_> {
    fn count(&mut self, node: &Variable) -> Expression {
        let result = self.ctx.value();
        let mut subquery = self.matched.clone();

        subquery.returning(Projection::items([ProjectionItem::aliased(
            function::count(node.clone()),
            result.clone(),
        )]));

        self.subqueries.push(subquery);
        result.into()
    }

    /// `{ title: var2, released: var3 }` of a `node` or `edge` selection.
    fn attributes<'f>(
        &mut self,
        target: &Variable,
        owner: &str,
        find: impl Fn(&str) -> Option<&'f Attribute>,
        field: &ResolvedField,
    ) -> Result<Expression, TranslationError> {
        let mut entries = Vec::new();

        for selected in field.selection.iter().unique_by(|selected| selected.response_key()) {
            if selected.name == "__typename" {
                continue;
            }

            let attribute = find(&selected.name)
                .filter(|attribute| attribute.is_aggregate_selectable())
                .ok_or_else(|| unknown_field(owner, &selected.name))?;

            entries.push((
                selected.response_key().to_string(),
                self.attribute(target, attribute, selected)?,
            ));
        }

        Ok(Expression::map(entries))
    }

    /// Strings aggregate their longest and shortest value: sorted by length,
    /// those are the head and the last of the collected list.
    fn attribute(
        &mut self,
        target: &Variable,
        attribute: &Attribute,
        field: &ResolvedField,
    ) -> Result<Expression, TranslationError> {
        let result = self.ctx.value();
        let read = target.property(attribute.database_name());
        let mut subquery = self.matched.clone();
        let mut entries = Vec::new();
        let scalar = attribute.scalar().map(ScalarKind::name).unwrap_or_default();

        if attribute.scalar().is_some_and(ScalarKind::is_string_like) {
            let list = self.ctx.value();

            subquery.with(Projection::items([ProjectionItem::from(target)]).order_by(function::size(read.clone()), Order::Desc));
            subquery.with(Projection::items([ProjectionItem::aliased(
                function::collect(read),
                list.clone(),
            )]));

            for selected in field.selection.iter().unique_by(|selected| selected.response_key()) {
                let value = match selected.name.as_str() {
                    "__typename" => continue,
                    "longest" => function::head(list.clone()),
                    "shortest" => function::last(list.clone()),
                    other => return Err(unknown_field(&format!("{scalar}AggregateSelection"), other)),
                };

                entries.push((selected.response_key().to_string(), Expression::from(value)));
            }
        } else {
            for selected in field.selection.iter().unique_by(|selected| selected.response_key()) {
                let value = match selected.name.as_str() {
                    "__typename" => continue,
                    "min" => function::min(read.clone()),
                    "max" => function::max(read.clone()),
                    "average" if attribute.scalar().is_some_and(ScalarKind::is_numeric) => function::avg(read.clone()),
                    "sum" if attribute.scalar().is_some_and(ScalarKind::is_numeric) => function::sum(read.clone()),
                    other => return Err(unknown_field(&format!("{scalar}AggregateSelection"), other)),
                };

                entries.push((selected.response_key().to_string(), Expression::from(value)));
            }
        }

        subquery.returning(Projection::items([ProjectionItem::aliased(
            Expression::map(entries),
            result.clone(),
        )]));

        self.subqueries.push(subquery);

        Ok(result.into())
    }
}

fn unknown_field(entity: &str, field: &str) -> TranslationError {
    TranslationError::UnknownField {
        entity: entity.to_string(),
        field: field.to_string(),
    }
}
