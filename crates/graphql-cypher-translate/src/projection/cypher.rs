use cypher_ast::ast::{Projection, ProjectionItem, Query, Variable};
use graphql_cypher_schema::{annotation::CypherAnnotation, Attribute, AttributeKind};

use super::{collected, ProjectionBuilder};
use crate::{ResolvedField, TranslationError};

/// `CALL { <statement> }`. Inside an entity the statement sees the node as
/// `this`; the import has to stay a plain `WITH node` before the rename.
pub(crate) fn statement_subquery(node: Option<&Variable>, statement: &str) -> Query {
    let mut subquery = Query::new();

    if let Some(node) = node {
        let this = Variable::named("this");
        subquery.import([node]);

        if *node != this {
            subquery.with(Projection::items([ProjectionItem::aliased(node.clone(), this)]));
        }
    }

    subquery.raw(statement.trim());
    subquery
}

impl<'a> ProjectionBuilder<'_, 'a> {
    /// A `@cypher` field of an entity. Rows returned by the statement are
    /// collected, a single-valued field keeps the first.
    pub(super) fn cypher_field(
        &mut self,
        node: &Variable,
        attribute: &'a Attribute,
        cypher: &'a CypherAnnotation,
        field: &ResolvedField,
    ) -> Result<Variable, TranslationError> {
        self.ctx.statement(&cypher.statement, &field.arguments);

        let column = Variable::named(cypher.column_name.as_str());
        let result = self.ctx.value();

        let mut subquery = Query::new();
        subquery.import([node]).call(statement_subquery(Some(node), &cypher.statement));

        let value = match &attribute.ty().kind {
            AttributeKind::Entity(id) => {
                let target = self.ctx.model().walk(*id);
                let projected = self.ctx.node();

                subquery.with(Projection::items([ProjectionItem::aliased(column, projected.clone())]));

                let mut nested = ProjectionBuilder::new(self.ctx);
                let value = nested.entity_value(&projected, target, &field.selection)?;
                nested.push_into(&mut subquery);

                value
            }
            _ => column.into(),
        };

        subquery.returning(Projection::items([ProjectionItem::aliased(
            collected(value, attribute.is_list()),
            result.clone(),
        )]));

        self.subqueries.push(subquery);

        Ok(result)
    }
}
