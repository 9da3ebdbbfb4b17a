//! `@cypher` fields of the Query and Mutation types.

use cypher_ast::ast::{Projection, ProjectionItem, Query, Variable};
use graphql_cypher_augment::RootOperation;
use graphql_cypher_schema::AttributeKind;

use crate::{
    context::TranslationContext,
    projection::{statement_subquery, ProjectionBuilder},
    ResolvedField, TranslationError,
};

/// Runs the statement with the field arguments as parameters. Each row
/// returned under the column name becomes one `this` row; node values are
/// projected with the selection.
pub(crate) fn custom_cypher(
    ctx: &mut TranslationContext<'_>,
    operation: RootOperation,
    name: &str,
    field: &ResolvedField,
) -> Result<Query, TranslationError> {
    let operations = ctx.model().operations();
    let root = match operation {
        RootOperation::Query => &operations.query,
        RootOperation::Mutation => &operations.mutation,
    };

    let not_a_root_field = || TranslationError::NotARootField { field: name.to_string() };
    let definition = root.field(name).ok_or_else(not_a_root_field)?;
    let cypher = definition.annotations().cypher().ok_or_else(not_a_root_field)?;

    ctx.statement(&cypher.statement, &field.arguments);

    let this = Variable::named("this");
    let column = Variable::named(cypher.column_name.as_str());

    let mut query = Query::new();
    query.call(statement_subquery(None, &cypher.statement));

    match &definition.ty().kind {
        AttributeKind::Entity(id) => {
            let target = ctx.model().walk(*id);
            query.with(Projection::items([ProjectionItem::aliased(column, this.clone())]));

            let mut builder = ProjectionBuilder::new(ctx);
            let value = builder.entity_value(&this, target, &field.selection)?;
            builder.push_into(&mut query);

            query.returning(Projection::items([ProjectionItem::aliased(value, this)]));
        }
        _ => {
            query.returning(Projection::items([ProjectionItem::aliased(column, this)]));
        }
    }

    Ok(query)
}
