//! Filters of matched nodes: the user's `where`, authorization rules and the
//! aggregate subqueries they depend on.

mod aggregate;
mod authorization;
mod predicate;

use cypher_ast::ast::{self, Expression, Pattern, Projection, Query, Variable};
use graphql_cypher_schema::{annotation::AuthorizationOperation, EntityWalker, RelationshipWalker};
use serde_json::{Map, Value};

pub(crate) use predicate::{global_id_value, object, property, PredicateBuilder};

use crate::{context::TranslationContext, TranslationError};

/// A predicate and the subqueries to run before it.
#[derive(Debug, Default)]
pub(crate) struct Filter {
    pub predicate: Option<Expression>,
    pub subqueries: Vec<Query>,
}

impl Filter {
    /// The user's `where` on `node` conjoined with the authorization rules of
    /// the operation on the concrete entity.
    pub(crate) fn build<'a>(
        ctx: &mut TranslationContext<'a>,
        node: &Variable,
        filtered: EntityWalker<'a>,
        concrete: EntityWalker<'a>,
        filter: Option<&Map<String, Value>>,
        operation: AuthorizationOperation,
    ) -> Result<Self, TranslationError> {
        let mut builder = PredicateBuilder::new(ctx);

        let user = match filter {
            Some(filter) => builder.entity_where(node, filtered, concrete, filter)?,
            None => None,
        };

        let authorization = builder.authorization(node, concrete, operation)?;

        Ok(Self {
            predicate: ast::and(user.into_iter().chain(authorization)),
            subqueries: builder.finish(),
        })
    }

    /// A `<Rel>ConnectionWhere` on a related node and its relationship.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn connection<'a>(
        ctx: &mut TranslationContext<'a>,
        node: &Variable,
        edge: &Variable,
        relationship: RelationshipWalker<'a>,
        filtered: EntityWalker<'a>,
        concrete: EntityWalker<'a>,
        filter: Option<&Map<String, Value>>,
        operation: AuthorizationOperation,
    ) -> Result<Self, TranslationError> {
        let mut builder = PredicateBuilder::new(ctx);

        let user = match filter {
            Some(filter) => builder.connection_where(node, edge, relationship, filtered, concrete, filter)?,
            None => None,
        };

        let authorization = builder.authorization(node, concrete, operation)?;

        Ok(Self {
            predicate: ast::and(user.into_iter().chain(authorization)),
            subqueries: builder.finish(),
        })
    }

    pub(crate) fn and(mut self, predicate: Option<Expression>) -> Self {
        self.predicate = ast::and(self.predicate.into_iter().chain(predicate));
        self
    }

    /// `MATCH pattern WHERE predicate`, or with subqueries
    /// `MATCH pattern CALL {..} WITH * WHERE predicate`.
    pub(crate) fn push_match(self, query: &mut Query, pattern: impl Into<Pattern>) {
        if self.subqueries.is_empty() {
            query.match_pattern(pattern, self.predicate);
            return;
        }

        query.match_pattern(pattern, None);
        self.push_after(query);
    }

    /// The subqueries followed by `WITH * WHERE predicate`.
    pub(crate) fn push_after(self, query: &mut Query) {
        for subquery in self.subqueries {
            query.call(subquery);
        }

        if self.predicate.is_some() {
            query.with_where(Projection::star(), self.predicate);
        }
    }
}
