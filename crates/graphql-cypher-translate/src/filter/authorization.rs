//! `@authorization(filter:)` rules as extra predicates. A denied read or
//! write matches nothing instead of failing.

use cypher_ast::ast::{self, Comparable, Expression, Variable};
use graphql_cypher_schema::{annotation::AuthorizationOperation, EntityWalker};
use serde_json::{Map, Value};

use super::predicate::{object, PredicateBuilder};
use crate::TranslationError;

impl<'a> PredicateBuilder<'_, 'a> {
    /// The rules of the operation on `entity`, matched as `node`. Rules are
    /// alternatives: one of them passing is enough.
    pub(crate) fn authorization(
        &mut self,
        node: &Variable,
        entity: EntityWalker<'a>,
        operation: AuthorizationOperation,
    ) -> Result<Option<Expression>, TranslationError> {
        let Some(annotation) = entity.get().authorization() else {
            return Ok(None);
        };

        let mut alternatives = Vec::new();

        for rule in annotation.rules_for(operation) {
            let previous = std::mem::replace(&mut self.claims_references, true);
            let predicate = self.rule_where(node, entity, &rule.predicate);
            self.claims_references = previous;

            let guard = rule
                .require_authentication
                .then(|| Expression::named_param("isAuthenticated").equals(Expression::boolean(true)));

            match ast::and(guard.into_iter().chain(predicate?)) {
                Some(predicate) => alternatives.push(predicate),
                // a rule without conditions lets everyone through
                None => return Ok(None),
            }
        }

        Ok(ast::or(alternatives))
    }

    fn rule_where(
        &mut self,
        node: &Variable,
        entity: EntityWalker<'a>,
        filter: &Map<String, Value>,
    ) -> Result<Option<Expression>, TranslationError> {
        let jwt = self.ctx.model().jwt();
        let mut predicates = Vec::new();

        for (key, value) in filter {
            if value.is_null() {
                continue;
            }

            let predicate = match key.as_str() {
                "node" => self.entity_where(node, entity, entity, object(key, value)?)?,
                "jwt" => self.jwt_where(jwt, object(key, value)?)?,
                other => match graphql_cypher_schema::filter_keys::LogicalOperator::parse(other) {
                    Some(operator) => self.logical(operator, key, value, |builder, filter| {
                        builder.rule_where(node, entity, filter)
                    })?,
                    None => return Err(TranslationError::unknown_filter("AuthorizationWhere", key)),
                },
            };

            predicates.extend(predicate);
        }

        Ok(ast::and(predicates))
    }
}
