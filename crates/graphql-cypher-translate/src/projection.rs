//! Map projections of matched nodes and the subqueries behind their
//! relationship, aggregate, connection and `@cypher` fields.

mod aggregate;
mod connection;
mod cypher;
mod relationship;

pub(crate) use aggregate::aggregate_selection;
pub(crate) use connection::connection_selection;
pub(crate) use cypher::statement_subquery;

use cypher_ast::ast::{
    function, Comparable, Expression, MapProjection, MapProjectionItem, Projection, ProjectionItem, Query, Variable,
};
use graphql_cypher_schema::{
    annotation::AuthorizationOperation, Attribute, EntityKind, EntityWalker, PropertiesWalker, RelationshipWalker,
};
use itertools::Itertools;

use crate::{
    context::TranslationContext,
    filter::{property, Filter},
    options::SortKey,
    pattern, ResolvedField, TranslationError,
};

/// The key telling the response shaper which member of an interface or union
/// a projected map belongs to.
pub const RESOLVE_TYPE: &str = "__resolveType";

/// Projects selections, collecting the `CALL` subqueries the projection
/// depends on. Push them with [`ProjectionBuilder::push_into`] before the
/// clause using the projection.
pub(crate) struct ProjectionBuilder<'c, 'a> {
    ctx: &'c mut TranslationContext<'a>,
    subqueries: Vec<Query>,
}

impl<'c, 'a> ProjectionBuilder<'c, 'a> {
    pub(crate) fn new(ctx: &'c mut TranslationContext<'a>) -> Self {
        Self {
            ctx,
            subqueries: Vec::new(),
        }
    }

    pub(crate) fn push_into(self, query: &mut Query) {
        for subquery in self.subqueries {
            query.call(subquery);
        }
    }

    /// `node { .title, actors: var1 }` for the fields selected on a concrete
    /// entity. Fields selected through a fragment on another type are skipped.
    pub(crate) fn node(
        &mut self,
        node: &Variable,
        entity: EntityWalker<'a>,
        selection: &[ResolvedField],
    ) -> Result<MapProjection, TranslationError> {
        let mut map = MapProjection::new(node.clone());

        for field in selection
            .iter()
            .filter(|field| field.applies_to(entity))
            .unique_by(|field| field.response_key())
        {
            self.node_field(&mut map, node, entity, field)?;
        }

        Ok(map)
    }

    fn node_field(
        &mut self,
        map: &mut MapProjection,
        node: &Variable,
        entity: EntityWalker<'a>,
        field: &ResolvedField,
    ) -> Result<(), TranslationError> {
        let key = field.response_key();

        if field.name == "__typename" {
            return Ok(());
        }

        if let Some(attribute) = entity.find_attribute(&field.name) {
            match attribute.annotations().cypher() {
                Some(cypher) => {
                    let result = self.cypher_field(node, attribute, cypher, field)?;
                    map.entry(key, result);
                }
                None => self.attribute(map, node, attribute, field),
            }

            return Ok(());
        }

        if let Some(relationship) = entity.find_relationship(&field.name) {
            let result = self.relationship(node, relationship, field)?;
            map.entry(key, result);

            return Ok(());
        }

        if let Some(relationship) = entity
            .relationships()
            .find(|relationship| relationship.names().aggregate_field() == field.name)
        {
            let selection = aggregate_selection(
                self.ctx,
                &mut self.subqueries,
                Some((node, relationship)),
                relationship.target(),
                field,
            )?;
            map.entry(key, selection);

            return Ok(());
        }

        if let Some(relationship) = entity
            .relationships()
            .find(|relationship| relationship.names().connection_field() == field.name)
        {
            let result = self.connection(node, relationship, field)?;
            map.entry(key, result);

            return Ok(());
        }

        // the synthetic `id` of a global node carries the raw key, the
        // response shaper encodes it
        if field.name == "id" {
            if let Some(attribute) = entity.get().global_id_attribute() {
                map.entry(key, node.property(attribute.database_name()));
                return Ok(());
            }
        }

        Err(TranslationError::UnknownField {
            entity: entity.name().to_string(),
            field: field.name.clone(),
        })
    }

    /// The selected properties of a relationship.
    pub(crate) fn properties(
        &mut self,
        edge: &Variable,
        properties: PropertiesWalker<'a>,
        selection: &[ResolvedField],
    ) -> Result<MapProjection, TranslationError> {
        let mut map = MapProjection::new(edge.clone());

        for field in selection.iter().unique_by(|field| field.response_key()) {
            if field.name == "__typename" {
                continue;
            }

            let attribute = properties
                .get()
                .attribute(&field.name)
                .ok_or_else(|| TranslationError::UnknownField {
                    entity: properties.name().to_string(),
                    field: field.name.clone(),
                })?;

            self.attribute(&mut map, edge, attribute, field);
        }

        Ok(map)
    }

    /// The projection of a node typed as any entity. Interface and union
    /// values pick the projection of their member by label.
    pub(crate) fn entity_value(
        &mut self,
        node: &Variable,
        entity: EntityWalker<'a>,
        selection: &[ResolvedField],
    ) -> Result<Expression, TranslationError> {
        if entity.kind() == EntityKind::Concrete {
            return Ok(self.node(node, entity, selection)?.into());
        }

        let mut value = Expression::null();

        for member in entity.concrete_entities().into_iter().rev() {
            let mut map = self.node(node, member, selection)?;
            resolve_type(&mut map, member);

            value = Expression::case(Expression::has_label(node.clone(), member.primary_label()), map, value);
        }

        Ok(value)
    }

    fn attribute(&mut self, map: &mut MapProjection, target: &Variable, attribute: &Attribute, field: &ResolvedField) {
        let key = field.response_key();
        let read = property(target.into(), attribute);

        match attribute.scalar() {
            Some(kind) if kind.is_spatial() => {
                let point = self.point(read, attribute.is_list(), field);
                map.entry(key, point);
            }
            _ if key == attribute.database_name() && attribute.coalesce_value().is_none() => map.property(key),
            _ => map.entry(key, read),
        }
    }

    /// Points are projected field by field, `null` stays `null`.
    fn point(&mut self, read: Expression, is_list: bool, field: &ResolvedField) -> Expression {
        let fields = |point: Expression| {
            Expression::map(
                field
                    .selection
                    .iter()
                    .filter(|selected| selected.name != "__typename")
                    .unique_by(|selected| selected.response_key())
                    .map(|selected| {
                        (
                            selected.response_key().to_string(),
                            point.clone().property(selected.name.as_str()),
                        )
                    }),
            )
        };

        if is_list {
            let item = self.ctx.value();
            return Expression::list_comprehension(item.clone(), read, None, Some(fields(item.into())));
        }

        Expression::case(read.clone().is_null(), Expression::null(), fields(read))
    }
}

/// Puts the member name first in the projection of an interface or union
/// member.
pub(crate) fn resolve_type(map: &mut MapProjection, member: EntityWalker<'_>) {
    map.items.insert(
        0,
        MapProjectionItem::Entry(RESOLVE_TYPE.to_string(), Expression::string(member.name())),
    );
}

/// Projects the sorted fields missing from the selection, so results merged
/// from several branches can be sorted by key.
pub(crate) fn with_sort_keys<'a>(
    map: &mut MapProjection,
    owner: &str,
    find: impl Fn(&str) -> Option<&'a Attribute>,
    sort: &[SortKey],
) -> Result<(), TranslationError> {
    for key in sort {
        let attribute = find(&key.field)
            .filter(|attribute| attribute.is_sortable())
            .ok_or_else(|| TranslationError::UnknownField {
                entity: owner.to_string(),
                field: key.field.clone(),
            })?;

        let projected = map.items.iter().any(|item| match item {
            MapProjectionItem::Property(name) | MapProjectionItem::Entry(name, _) => *name == key.field,
            MapProjectionItem::All => true,
        });

        if !projected {
            let read = property(Expression::from(&map.variable), attribute);
            map.entry(key.field.clone(), read);
        }
    }

    Ok(())
}

/// `collect(x)`, or `head(collect(x))` for a single value.
pub(crate) fn collected(value: impl Into<Expression>, is_list: bool) -> Expression {
    let collect = function::collect(value);

    if is_list {
        collect.into()
    } else {
        function::head(collect).into()
    }
}

/// One `UNION` branch per member of an interface or union, each returning the
/// projection of its member as `item`. With a source the members are read
/// through the relationship.
pub(crate) fn member_branches<'a>(
    ctx: &mut TranslationContext<'a>,
    source: Option<(&Variable, RelationshipWalker<'a>)>,
    entity: EntityWalker<'a>,
    field: &ResolvedField,
    sort: &[SortKey],
    item: &Variable,
) -> Result<Vec<Query>, TranslationError> {
    let filter = field.object_argument("where");
    let mut branches = Vec::new();

    for member in entity.concrete_entities() {
        let node = ctx.node();
        let mut branch = Query::new();
        let matched = Filter::build(ctx, &node, entity, member, filter, AuthorizationOperation::Read)?;

        match source {
            Some((source, relationship)) => {
                let edge = ctx.relationship();
                let pattern = pattern::read(source, relationship, Some(&edge), pattern::node(&node, member));

                branch.import([source]);
                matched.push_match(&mut branch, pattern);
            }
            None => matched.push_match(&mut branch, pattern::node(&node, member)),
        }

        let mut builder = ProjectionBuilder::new(ctx);
        let mut map = builder.node(&node, member, &field.selection)?;
        with_sort_keys(&mut map, member.name(), |name| member.find_attribute(name), sort)?;
        resolve_type(&mut map, member);
        builder.push_into(&mut branch);

        branch.returning(Projection::items([ProjectionItem::aliased(map, item.clone())]));
        branches.push(branch);
    }

    Ok(branches)
}
