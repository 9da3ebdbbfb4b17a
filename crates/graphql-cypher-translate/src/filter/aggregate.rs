//! `<rel>Aggregate` filters: a `CALL` subquery aggregates the related nodes
//! into one boolean, and the filter only checks that boolean.

use cypher_ast::ast::{
    self, function, Comparable, CompareOp, Expression, NodePattern, Projection, ProjectionItem, Query,
    QuantifierKind, Variable,
};
use graphql_cypher_schema::{
    filter_keys::{
        AggregateWhereKey, AggregationComparison, AggregationFunction, AggregationKeyTable, AggregationOperator,
        LogicalOperator,
    },
    Attribute, EntityWalker, PropertiesWalker, RelationshipWalker, ScalarKind,
};
use serde_json::{Map, Value};

use super::predicate::{object, PredicateBuilder};
use crate::{pattern, value, TranslationError};

type Predicate = Result<Option<Expression>, TranslationError>;

/// The node or edge side of an aggregate filter.
#[derive(Clone, Copy)]
enum Aggregated<'a> {
    Node(EntityWalker<'a>),
    Edge(PropertiesWalker<'a>),
}

impl<'a> Aggregated<'a> {
    fn keys(self) -> &'a AggregationKeyTable {
        match self {
            Aggregated::Node(entity) => entity.get().aggregation_keys(),
            Aggregated::Edge(properties) => properties.get().aggregation_keys(),
        }
    }

    fn attribute_at(self, index: usize) -> Option<&'a Attribute> {
        match self {
            Aggregated::Node(entity) => entity.get().attribute_at(index),
            Aggregated::Edge(properties) => properties.get().attribute_at(index),
        }
    }

    fn owner(self) -> &'a str {
        match self {
            Aggregated::Node(entity) => entity.name(),
            Aggregated::Edge(properties) => properties.name(),
        }
    }
}

impl<'a> PredicateBuilder<'_, 'a> {
    /// Pushes the aggregating subquery and returns `var = true`.
    pub(super) fn aggregate_predicate(
        &mut self,
        node: &Variable,
        relationship: RelationshipWalker<'a>,
        value: &Value,
    ) -> Predicate {
        if value.is_null() {
            return Ok(None);
        }

        if self.depth > 0 {
            return Err(TranslationError::NestedAggregateFilter {
                relationship: relationship.name().to_string(),
            });
        }

        let filter = object(&relationship.names().aggregate_field(), value)?;
        let target = relationship.target();
        let target_node = self.ctx.node();
        let edge = self.ctx.relationship();

        let Some(predicate) = self.aggregate_where(&target_node, &edge, relationship, filter)? else {
            return Ok(None);
        };

        let pattern = pattern::read(
            node,
            relationship,
            Some(&edge),
            NodePattern::new(target_node.clone()).labels(target.labels()),
        );

        let members = pattern::members(&target_node, target);

        let result = self.ctx.value();
        let mut subquery = Query::new();

        subquery
            .import([node])
            .match_pattern(pattern, members)
            .returning(Projection::items([ProjectionItem::aliased(predicate, result.clone())]));

        self.subqueries.push(subquery);

        Ok(Some(result.equals(Expression::boolean(true))))
    }

    /// A `<Rel>AggregateInput`: `count*`, `node`, `edge` and the logical keys.
    fn aggregate_where(
        &mut self,
        target: &Variable,
        edge: &Variable,
        relationship: RelationshipWalker<'a>,
        filter: &Map<String, Value>,
    ) -> Predicate {
        let mut predicates = Vec::new();

        for (key, value) in filter {
            if value.is_null() {
                continue;
            }

            let predicate = match AggregateWhereKey::parse(key) {
                Some(AggregateWhereKey::Count(comparison)) => {
                    let count = self.ctx.param(value::for_scalar(value, Some(ScalarKind::Int), key)?);
                    Some(Expression::from(function::count(target.clone())).compare(compare_op(comparison), count))
                }
                Some(AggregateWhereKey::Logical(operator)) => self.logical(operator, key, value, |builder, filter| {
                    builder.aggregate_where(target, edge, relationship, filter)
                })?,
                Some(AggregateWhereKey::Node) => {
                    let aggregated = Aggregated::Node(relationship.target());
                    self.aggregation_where(target, aggregated, object(key, value)?)?
                }
                Some(AggregateWhereKey::Edge) => match relationship.properties() {
                    Some(properties) => self.aggregation_where(edge, Aggregated::Edge(properties), object(key, value)?)?,
                    None => return Err(TranslationError::unknown_filter(relationship.names().aggregate_input(), key)),
                },
                None => return Err(TranslationError::unknown_filter(relationship.names().aggregate_input(), key)),
            };

            predicates.extend(predicate);
        }

        Ok(ast::and(predicates))
    }

    /// A node or edge aggregation where input. String attributes aggregate
    /// their length, everything else its value. Keys without an aggregating
    /// function hold when any collected value matches.
    fn aggregation_where(
        &mut self,
        variable: &Variable,
        aggregated: Aggregated<'a>,
        filter: &Map<String, Value>,
    ) -> Predicate {
        let keys = aggregated.keys();
        let mut predicates = Vec::new();

        for (key, value) in filter {
            if value.is_null() {
                continue;
            }

            if let Some(operator) = LogicalOperator::parse(key) {
                predicates.extend(self.logical(operator, key, value, |builder, filter| {
                    builder.aggregation_where(variable, aggregated, filter)
                })?);

                continue;
            }

            if let Some((index, operator)) = keys.unsupported(key) {
                let field = aggregated.attribute_at(index).map(Attribute::name).unwrap_or_default();

                return Err(TranslationError::UnsupportedAggregation {
                    entity: aggregated.owner().to_string(),
                    field: field.to_string(),
                    operator: operator.name(),
                });
            }

            let Some(aggregation) = keys.get(key) else {
                return Err(TranslationError::unknown_filter(
                    format!("{}AggregationWhereInput", aggregated.owner()),
                    key,
                ));
            };

            let Some(attribute) = aggregated.attribute_at(aggregation.attribute) else {
                return Err(TranslationError::unknown_filter(aggregated.owner(), key));
            };

            let mut measured = variable.property(attribute.database_name());

            if aggregation.measures_length {
                measured = function::size(measured).into();
            }

            let compared = match aggregation.operator {
                _ if aggregation.measures_length => value::from_json(value),
                Some(AggregationOperator::Average)
                    if matches!(attribute.scalar(), Some(ScalarKind::Int | ScalarKind::BigInt)) =>
                {
                    value::from_json(value)
                }
                _ => value::for_attribute(value, attribute)?,
            };

            let param = self.ctx.param(compared);
            let op = compare_op(aggregation.comparison);

            let Some(operator) = aggregation.operator else {
                let each = self.ctx.value();
                let collected = function::collect(measured);

                predicates.push(Expression::quantifier(
                    QuantifierKind::Any,
                    each.clone(),
                    collected,
                    Expression::from(each).compare(op, param),
                ));

                continue;
            };

            let aggregate = match operator.function() {
                AggregationFunction::Average => function::avg(measured),
                AggregationFunction::Min => function::min(measured),
                AggregationFunction::Max => function::max(measured),
                AggregationFunction::Sum => function::sum(measured),
            };

            predicates.push(Expression::from(aggregate).compare(op, param));
        }

        Ok(ast::and(predicates))
    }
}

fn compare_op(comparison: AggregationComparison) -> CompareOp {
    match comparison {
        AggregationComparison::Equal => CompareOp::Equals,
        AggregationComparison::Gt => CompareOp::GreaterThan,
        AggregationComparison::Gte => CompareOp::GreaterThanOrEquals,
        AggregationComparison::Lt => CompareOp::LessThan,
        AggregationComparison::Lte => CompareOp::LessThanOrEquals,
    }
}
