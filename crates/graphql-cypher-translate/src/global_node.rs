//! `node(id:)`: the Relay global node lookup.

use cypher_ast::ast::{self, Comparable, Projection, ProjectionItem, Query, Variable};
use graphql_cypher_schema::annotation::AuthorizationOperation;
use serde_json::Value;

use crate::{
    context::TranslationContext,
    filter::{global_id_value, Filter},
    global_id::GlobalId,
    pattern,
    projection::{resolve_type, ProjectionBuilder},
    ResolvedField, TranslationError,
};

/// Decodes the id and matches the node of the named type by its key
/// attribute. The projection carries `__resolveType` for the `Node` interface.
pub(crate) fn global_node(ctx: &mut TranslationContext<'_>, field: &ResolvedField) -> Result<Query, TranslationError> {
    let raw = field
        .argument("id")
        .and_then(Value::as_str)
        .ok_or_else(|| TranslationError::MissingArgument {
            argument: String::from("id"),
        })?;

    let invalid = || TranslationError::InvalidGlobalId { id: raw.to_string() };
    let id = GlobalId::decode(raw)?;

    let entity = ctx
        .model()
        .find_entity(&id.type_name)
        .filter(|entity| entity.is_global_node())
        .ok_or_else(invalid)?;

    let attribute = entity.get().global_id_attribute().ok_or_else(invalid)?;
    let this = Variable::named("this");
    let key = ctx.param(global_id_value(attribute, &id.value));
    let matches_key = this.property(attribute.database_name()).equals(key);

    let Filter { predicate, subqueries } = Filter::build(ctx, &this, entity, entity, None, AuthorizationOperation::Read)?;
    let filter = Filter {
        predicate: ast::and(std::iter::once(matches_key).chain(predicate)),
        subqueries,
    };

    let mut query = Query::new();
    filter.push_match(&mut query, pattern::node(&this, entity));

    let mut builder = ProjectionBuilder::new(ctx);
    let mut map = builder.node(&this, entity, &field.selection)?;
    resolve_type(&mut map, entity);
    builder.push_into(&mut query);

    query.returning(Projection::items([ProjectionItem::aliased(map, this)]));

    Ok(query)
}
