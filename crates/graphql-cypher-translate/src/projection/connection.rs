//! Relay connections. Every matched edge is projected and collected first;
//! `totalCount` is the size of that list and the page is cut from it
//! afterwards. Cursors and `pageInfo` are derived from the offset by the
//! response shaper.

use cypher_ast::ast::{function, Expression, Order, Projection, ProjectionItem, Query, Variable};
use graphql_cypher_schema::{annotation::AuthorizationOperation, EntityKind, EntityWalker, RelationshipWalker};
use serde_json::Value;

use super::{resolve_type, with_sort_keys, ProjectionBuilder};
use crate::{
    context::TranslationContext,
    filter::Filter,
    options::{self, Page, SortKey},
    pattern, ResolvedField, TranslationError,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Side {
    Node,
    Edge,
}

impl Side {
    fn key(self) -> &'static str {
        match self {
            Side::Node => "node",
            Side::Edge => "properties",
        }
    }
}

impl<'a> ProjectionBuilder<'_, 'a> {
    pub(super) fn connection(
        &mut self,
        source: &Variable,
        relationship: RelationshipWalker<'a>,
        field: &ResolvedField,
    ) -> Result<Variable, TranslationError> {
        let result = self.ctx.value();
        let (mut subquery, selection) = connection_selection(self.ctx, Some((source, relationship)), relationship.target(), field)?;

        subquery.returning(Projection::items([ProjectionItem::aliased(selection, result.clone())]));
        self.subqueries.push(subquery);

        Ok(result)
    }
}

/// The clauses computing a connection and the `{ edges, totalCount }` value
/// to return. Without a source this is the root connection of the entity.
pub(crate) fn connection_selection<'a>(
    ctx: &mut TranslationContext<'a>,
    source: Option<(&Variable, RelationshipWalker<'a>)>,
    entity: EntityWalker<'a>,
    field: &ResolvedField,
) -> Result<(Query, Expression), TranslationError> {
    let page = Page::from_connection(&field.arguments)?.limited_by(entity);
    let sort = sort(field.argument("sort"), source.is_some())?;
    let node_sort = side(&sort, Side::Node);
    let edge_sort = side(&sort, Side::Edge);

    let node_selection = edge_selection(field, "node");
    let properties_selection = edge_selection(field, "properties");
    let filter = field.object_argument("where");
    let is_abstract = entity.kind() != EntityKind::Concrete;

    let edges = ctx.value();
    let mut query = Query::new();

    if let Some((source, _)) = source {
        query.import([source]);
    }

    let mut branches = Vec::new();

    for member in entity.concrete_entities() {
        let node = ctx.node();
        let mut branch = Query::new();
        let mut edge = None;

        match source {
            Some((source, relationship)) => {
                let variable = ctx.relationship();
                let pattern = pattern::read(source, relationship, Some(&variable), pattern::node(&node, member));

                if is_abstract {
                    branch.import([source]);
                }

                Filter::connection(
                    ctx,
                    &node,
                    &variable,
                    relationship,
                    entity,
                    member,
                    filter,
                    AuthorizationOperation::Read,
                )?
                .push_match(&mut branch, pattern);

                edge = relationship.properties().map(|properties| (variable, properties));
            }
            None => Filter::build(ctx, &node, entity, member, filter, AuthorizationOperation::Read)?
                .push_match(&mut branch, pattern::node(&node, member)),
        }

        let mut builder = ProjectionBuilder::new(ctx);
        let mut node_map = builder.node(&node, member, &node_selection)?;
        with_sort_keys(&mut node_map, member.name(), |name| member.find_attribute(name), &node_sort)?;

        if is_abstract {
            resolve_type(&mut node_map, member);
        }

        let mut entries = vec![(String::from("node"), Expression::from(node_map))];

        if let Some((variable, properties)) = edge {
            let mut edge_map = builder.properties(&variable, properties, &properties_selection)?;
            with_sort_keys(&mut edge_map, properties.name(), |name| properties.get().attribute(name), &edge_sort)?;
            entries.push((String::from("properties"), Expression::from(edge_map)));
        } else if !edge_sort.is_empty() {
            return Err(TranslationError::invalid("sort", "the relationship has no properties to sort by"));
        }

        builder.push_into(&mut branch);
        branches.push((branch, Expression::map(entries)));
    }

    if is_abstract {
        let item = ctx.value();

        let branches = branches
            .into_iter()
            .map(|(mut branch, value)| {
                branch.returning(Projection::items([ProjectionItem::aliased(value, item.clone())]));
                branch
            })
            .collect();

        query.call_union(branches);
        query.with(Projection::items([ProjectionItem::aliased(
            function::collect(item),
            edges.clone(),
        )]));
    } else {
        for (branch, value) in branches {
            query.extend(branch);
            query.with(Projection::items([ProjectionItem::aliased(
                function::collect(value),
                edges.clone(),
            )]));
        }
    }

    let total = ctx.value();

    query.with(Projection::items([
        ProjectionItem::from(&edges),
        ProjectionItem::aliased(function::size(edges.clone()), total.clone()),
    ]));

    let paged = if sort.is_empty() && page.is_unbounded() {
        edges
    } else {
        let edge = ctx.value();
        let paged = ctx.value();
        let order = sort
            .iter()
            .map(|(side, key)| {
                let read = Expression::from(&edge).property(side.key()).property(key.field.as_str());
                (read, key.order)
            })
            .collect::<Vec<(Expression, Order)>>();

        let mut subquery = Query::new();
        subquery.import([&edges]).unwind(edges.clone(), edge.clone());
        page.push(ctx, &mut subquery, order);
        subquery.returning(Projection::items([ProjectionItem::aliased(
            function::collect(edge),
            paged.clone(),
        )]));

        query.call(subquery);
        paged
    };

    let selection = Expression::map([
        (String::from("edges"), Expression::from(paged)),
        (String::from("totalCount"), Expression::from(total)),
    ]);

    Ok((query, selection))
}

/// The selections of `node` or `properties` under every `edges` selection.
fn edge_selection(field: &ResolvedField, name: &str) -> Vec<ResolvedField> {
    field
        .selection
        .iter()
        .filter(|selected| selected.name == "edges")
        .flat_map(|edges| edges.selection.iter().filter(|selected| selected.name == name))
        .flat_map(|selected| selected.selection.iter().cloned())
        .collect()
}

fn side(sort: &[(Side, SortKey)], wanted: Side) -> Vec<SortKey> {
    sort.iter()
        .filter(|(side, _)| *side == wanted)
        .map(|(_, key)| key.clone())
        .collect()
}

/// Root connections sort like list reads, relationship connections take
/// `[{ node: { .. }, edge: { .. } }]`.
fn sort(value: Option<&Value>, nested: bool) -> Result<Vec<(Side, SortKey)>, TranslationError> {
    if !nested {
        let keys = options::sort_keys(value, "sort")?;
        return Ok(keys.into_iter().map(|key| (Side::Node, key)).collect());
    }

    let entries = match value {
        None => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries.iter().collect::<Vec<_>>(),
        Some(entry) => vec![entry],
    };

    let mut keys = Vec::new();

    for entry in entries {
        let Some(entry) = entry.as_object() else {
            return Err(TranslationError::invalid("sort", "expected a sort object"));
        };

        for (side, value) in entry {
            let side = match side.as_str() {
                "node" => Side::Node,
                "edge" => Side::Edge,
                other => return Err(TranslationError::unknown_filter("ConnectionSort", other)),
            };

            keys.extend(
                options::sort_keys(Some(value), "sort")?
                    .into_iter()
                    .map(|key| (side, key)),
            );
        }
    }

    Ok(keys)
}
