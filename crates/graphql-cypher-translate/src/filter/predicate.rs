use cypher_ast::{
    ast::{self, function, Comparable, CompareOp, Expression, MathOp, NodePattern, Query, QuantifierKind, Variable},
    CypherValue,
};
use graphql_cypher_schema::{
    filter_keys::{ComparisonOperator, ConnectionWhereKey, LogicalOperator, Quantifier, WhereKey},
    Attribute, EntityKind, EntityWalker, JwtDefinition, PropertiesWalker, RelationshipWalker, ScalarKind,
};
use serde_json::{Map, Value};

use crate::{context::TranslationContext, global_id::GlobalId, pattern, value, TranslationError};

/// Builds the predicates of `<Type>Where` inputs.
///
/// Aggregate filters need a `CALL` subquery evaluated before the predicate;
/// those are collected here and handed out by [`PredicateBuilder::finish`].
/// They can only be used at the top of a filter, not inside the pattern
/// comprehension of a relationship filter.
pub(crate) struct PredicateBuilder<'c, 'a> {
    pub(super) ctx: &'c mut TranslationContext<'a>,
    pub(super) subqueries: Vec<Query>,
    pub(super) depth: usize,
    /// Strings of the form `$jwt.<claim>` refer to the caller's claims.
    pub(super) claims_references: bool,
}

type Predicate = Result<Option<Expression>, TranslationError>;

impl<'c, 'a> PredicateBuilder<'c, 'a> {
    pub(crate) fn new(ctx: &'c mut TranslationContext<'a>) -> Self {
        Self {
            ctx,
            subqueries: Vec::new(),
            depth: 0,
            claims_references: false,
        }
    }

    pub(crate) fn finish(self) -> Vec<Query> {
        self.subqueries
    }

    /// A `<Type>Where` input applied to `node`. `filtered` owns the input,
    /// `concrete` is the entity actually matched, which differ for interfaces
    /// and unions.
    pub(crate) fn entity_where(
        &mut self,
        node: &Variable,
        filtered: EntityWalker<'a>,
        concrete: EntityWalker<'a>,
        filter: &Map<String, Value>,
    ) -> Predicate {
        let keys = filtered.get().where_keys();
        let mut predicates = Vec::new();

        for (key, value) in filter {
            let Some(where_key) = keys.get(key) else {
                return Err(TranslationError::unknown_filter(filtered.names().where_input(), key));
            };

            let predicate = match where_key {
                WhereKey::Logical(operator) => self.logical(operator, key, value, |builder, filter| {
                    builder.entity_where(node, filtered, concrete, filter)
                })?,
                WhereKey::Attribute { attribute, operator } => {
                    let Some(attribute) = filtered.get().attribute_at(attribute) else {
                        return Err(TranslationError::unknown_filter(filtered.names().where_input(), key));
                    };

                    let attribute = concrete.find_attribute(attribute.name()).unwrap_or(attribute);
                    let target = property(Expression::from(node), attribute);

                    self.attribute_predicate(target, attribute, operator, value)?
                }
                WhereKey::Relationship {
                    relationship,
                    quantifier,
                } => {
                    let relationship = implementation_relationship(filtered.walk(relationship), concrete);
                    self.relationship_predicate(node, relationship, quantifier, value)?
                }
                WhereKey::Connection {
                    relationship,
                    quantifier,
                } => {
                    let relationship = implementation_relationship(filtered.walk(relationship), concrete);
                    self.connection_predicate(node, relationship, quantifier, value)?
                }
                WhereKey::Aggregate { relationship } => {
                    let relationship = implementation_relationship(filtered.walk(relationship), concrete);
                    self.aggregate_predicate(node, relationship, value)?
                }
                WhereKey::GlobalId => self.global_id_predicate(node, concrete, value)?,
                WhereKey::Member(member) if member == concrete.id() => match value {
                    Value::Null => None,
                    value => self.entity_where(node, concrete, concrete, object(key, value)?)?,
                },
                WhereKey::Member(_) => None,
                WhereKey::Implementations => match object(key, value)?.get(concrete.name()) {
                    None | Some(Value::Null) => None,
                    Some(value) => self.entity_where(node, concrete, concrete, object(key, value)?)?,
                },
            };

            predicates.extend(predicate);
        }

        Ok(ast::and(predicates))
    }

    /// `AND`, `OR` and `NOT` of any filter input. An empty `OR` branch
    /// matches everything, so the whole disjunction does.
    pub(crate) fn logical(
        &mut self,
        operator: LogicalOperator,
        key: &str,
        value: &Value,
        mut build: impl FnMut(&mut Self, &Map<String, Value>) -> Predicate,
    ) -> Predicate {
        match (operator, value) {
            (_, Value::Null) => Ok(None),
            (LogicalOperator::Not, value) => Ok(build(self, object(key, value)?)?.map(Expression::not)),
            (operator, value) => {
                let items = match value {
                    Value::Array(items) => items.iter().collect::<Vec<_>>(),
                    value => vec![value],
                };

                let mut predicates = Vec::with_capacity(items.len());

                for item in items {
                    match build(self, object(key, item)?)? {
                        Some(predicate) => predicates.push(predicate),
                        None if operator == LogicalOperator::Or => return Ok(None),
                        None => (),
                    }
                }

                Ok(match operator {
                    LogicalOperator::Or => ast::or(predicates),
                    _ => ast::and(predicates),
                })
            }
        }
    }

    /// A comparison on one attribute. `target` is the (possibly coalesced)
    /// property read.
    pub(crate) fn attribute_predicate(
        &mut self,
        target: Expression,
        attribute: &Attribute,
        operator: ComparisonOperator,
        value: &Value,
    ) -> Predicate {
        let spatial = attribute.scalar().is_some_and(ScalarKind::is_spatial);

        if value.is_null() {
            return Ok(match operator {
                ComparisonOperator::Equals => Some(target.is_null()),
                _ => None,
            });
        }

        let predicate = match operator {
            ComparisonOperator::Equals if spatial => {
                let point = self.ctx.param(value::from_json(value));
                target.equals(function::point(point))
            }
            ComparisonOperator::In if spatial => {
                let points = self.ctx.param(value::from_json(value));
                let item = self.ctx.value();
                let list = Expression::list_comprehension(item.clone(), points, None, Some(function::point(item).into()));

                target.in_list(list)
            }
            ComparisonOperator::Distance => self.distance(target, value, CompareOp::Equals),
            ComparisonOperator::Lt if spatial => self.distance(target, value, CompareOp::LessThan),
            ComparisonOperator::Lte if spatial => self.distance(target, value, CompareOp::LessThanOrEquals),
            ComparisonOperator::Gt if spatial => self.distance(target, value, CompareOp::GreaterThan),
            ComparisonOperator::Gte if spatial => self.distance(target, value, CompareOp::GreaterThanOrEquals),
            ComparisonOperator::Includes => self.input_value(value, attribute)?.in_list(target),
            operator => {
                let value = self.input_value(value, attribute)?;
                target.compare(compare_op(operator), value)
            }
        };

        Ok(Some(predicate))
    }

    /// `point.distance(target, point($p.point)) < $p.distance`
    fn distance(&mut self, target: Expression, value: &Value, op: CompareOp) -> Expression {
        let param = self.ctx.param(value::from_json(value));
        let point = function::point(param.clone().property("point"));

        Expression::from(function::point_distance(target, point)).compare(op, param.property("distance"))
    }

    /// A parameter, or a claim reference inside authorization rules.
    fn input_value(&mut self, value: &Value, attribute: &Attribute) -> Result<Expression, TranslationError> {
        if let Some(claim) = self.claim_reference(value) {
            return Ok(claim);
        }

        Ok(self.ctx.param(value::for_attribute(value, attribute)?))
    }

    fn claim_reference(&self, value: &Value) -> Option<Expression> {
        if !self.claims_references {
            return None;
        }

        let path = value.as_str()?.strip_prefix("$jwt.")?;

        Some(
            path.split('.')
                .fold(Expression::named_param("jwt"), |target, claim| target.property(claim)),
        )
    }

    /// `rel_SOME`, `rel_ALL` and friends, or the single relationship filter.
    ///
    /// Every related node is mapped to the result of the inner filter with a
    /// pattern comprehension and the quantifier runs over those booleans, so
    /// nodes where the filter is `null` never count as a match.
    fn relationship_predicate(
        &mut self,
        node: &Variable,
        relationship: RelationshipWalker<'a>,
        quantifier: Option<Quantifier>,
        value: &Value,
    ) -> Predicate {
        if value.is_null() {
            return Ok(match quantifier {
                None => Some(self.no_related_nodes(node, relationship)),
                Some(_) => None,
            });
        }

        let filter = object(relationship.name(), value)?;
        let target = relationship.target();
        let empty = Map::new();
        let mut lists = Vec::new();

        for branch in target.concrete_entities() {
            let (filtered, branch_filter) = match target.kind() {
                EntityKind::Union => match member_filter(filter, branch, &empty)? {
                    Some(member) => (branch, member),
                    None => continue,
                },
                EntityKind::Concrete | EntityKind::Interface => (target, filter),
            };

            let target_node = self.ctx.node();

            self.depth += 1;
            let predicate = self.entity_where(&target_node, filtered, branch, branch_filter);
            self.depth -= 1;

            let pattern = pattern::read(node, relationship, None, pattern::node(&target_node, branch));
            let predicate = predicate?.unwrap_or(Expression::boolean(true));

            lists.push(Expression::pattern_comprehension(pattern, None, predicate));
        }

        Ok(self.quantified(lists, quantifier))
    }

    /// `relConnection_SOME` and friends: like relationship filters, with the
    /// relationship in scope for `edge` filters.
    fn connection_predicate(
        &mut self,
        node: &Variable,
        relationship: RelationshipWalker<'a>,
        quantifier: Option<Quantifier>,
        value: &Value,
    ) -> Predicate {
        if value.is_null() {
            return Ok(match quantifier {
                None => Some(self.no_related_nodes(node, relationship)),
                Some(_) => None,
            });
        }

        let filter = object(relationship.name(), value)?;
        let target = relationship.target();
        let empty = Map::new();
        let mut lists = Vec::new();

        for branch in target.concrete_entities() {
            let (filtered, branch_filter) = match target.kind() {
                EntityKind::Union => match member_filter(filter, branch, &empty)? {
                    Some(member) => (branch, member),
                    None => continue,
                },
                EntityKind::Concrete | EntityKind::Interface => (target, filter),
            };

            let target_node = self.ctx.node();
            let edge = self.ctx.relationship();

            self.depth += 1;
            let predicate = self.connection_where(&target_node, &edge, relationship, filtered, branch, branch_filter);
            self.depth -= 1;

            let pattern = pattern::read(node, relationship, Some(&edge), pattern::node(&target_node, branch));
            let predicate = predicate?.unwrap_or(Expression::boolean(true));

            lists.push(Expression::pattern_comprehension(pattern, None, predicate));
        }

        Ok(self.quantified(lists, quantifier))
    }

    fn quantified(&mut self, lists: Vec<Expression>, quantifier: Option<Quantifier>) -> Option<Expression> {
        let list = lists.into_iter().reduce(|left, right| left.math(MathOp::Add, right))?;
        let item = self.ctx.value();

        let kind = match quantifier {
            None | Some(Quantifier::Single) => QuantifierKind::Single,
            Some(Quantifier::All) => QuantifierKind::All,
            Some(Quantifier::None) => QuantifierKind::None,
            Some(Quantifier::Some) => QuantifierKind::Any,
        };

        Some(Expression::quantifier(
            kind,
            item.clone(),
            list,
            item.equals(Expression::boolean(true)),
        ))
    }

    /// `size([(node)-[:TYPE]->(:Target) | 1]) = 0`
    fn no_related_nodes(&mut self, node: &Variable, relationship: RelationshipWalker<'a>) -> Expression {
        let pattern = pattern::read(node, relationship, None, NodePattern::anonymous());
        let related = Expression::pattern_comprehension(pattern, None, Expression::integer(1));

        Expression::from(function::size(related)).equals(Expression::integer(0))
    }

    /// A `<Rel>ConnectionWhere` input.
    pub(crate) fn connection_where(
        &mut self,
        node: &Variable,
        edge: &Variable,
        relationship: RelationshipWalker<'a>,
        filtered: EntityWalker<'a>,
        concrete: EntityWalker<'a>,
        filter: &Map<String, Value>,
    ) -> Predicate {
        let mut predicates = Vec::new();

        for (key, value) in filter {
            let predicate = match ConnectionWhereKey::parse(key) {
                Some(ConnectionWhereKey::Logical(operator)) => self.logical(operator, key, value, |builder, filter| {
                    builder.connection_where(node, edge, relationship, filtered, concrete, filter)
                })?,
                Some(ConnectionWhereKey::Node) if value.is_null() => None,
                Some(ConnectionWhereKey::Node) => self.entity_where(node, filtered, concrete, object(key, value)?)?,
                Some(ConnectionWhereKey::Edge) if value.is_null() => None,
                Some(ConnectionWhereKey::Edge) => match relationship.properties() {
                    Some(properties) => self.properties_where(edge, properties, object(key, value)?)?,
                    None => return Err(TranslationError::unknown_filter(relationship.names().connection_where_input(), key)),
                },
                None => return Err(TranslationError::unknown_filter(relationship.names().connection_where_input(), key)),
            };

            predicates.extend(predicate);
        }

        Ok(ast::and(predicates))
    }

    /// A `<Properties>Where` input applied to a relationship.
    pub(crate) fn properties_where(
        &mut self,
        edge: &Variable,
        properties: PropertiesWalker<'a>,
        filter: &Map<String, Value>,
    ) -> Predicate {
        let definition = properties.get();
        let mut predicates = Vec::new();

        for (key, value) in filter {
            let predicate = match definition.where_keys().get(key) {
                Some(WhereKey::Logical(operator)) => self.logical(operator, key, value, |builder, filter| {
                    builder.properties_where(edge, properties, filter)
                })?,
                Some(WhereKey::Attribute { attribute, operator }) => match definition.attribute_at(attribute) {
                    Some(attribute) => {
                        let target = property(Expression::from(edge), attribute);
                        self.attribute_predicate(target, attribute, operator, value)?
                    }
                    None => return Err(TranslationError::unknown_filter(properties.names().where_input(), key)),
                },
                _ => return Err(TranslationError::unknown_filter(properties.names().where_input(), key)),
            };

            predicates.extend(predicate);
        }

        Ok(ast::and(predicates))
    }

    /// The `jwt` part of an authorization rule, on the `$jwt` parameter.
    /// Without a `@jwt` type every key is a plain claim equality.
    pub(crate) fn jwt_where(&mut self, jwt: Option<&'a JwtDefinition>, filter: &Map<String, Value>) -> Predicate {
        let claims = Expression::named_param("jwt");
        let mut predicates = Vec::new();

        for (key, value) in filter {
            let predicate = match (jwt.map(|jwt| jwt.where_keys().get(key)), LogicalOperator::parse(key)) {
                (Some(Some(WhereKey::Logical(operator))), _) | (None, Some(operator)) => {
                    self.logical(operator, key, value, |builder, filter| builder.jwt_where(jwt, filter))?
                }
                (Some(Some(WhereKey::Attribute { attribute, operator })), _) => {
                    match jwt.and_then(|jwt| jwt.attribute_at(attribute)) {
                        Some(attribute) => {
                            let target = claims.clone().property(attribute.database_name());
                            self.attribute_predicate(target, attribute, operator, value)?
                        }
                        None => return Err(TranslationError::unknown_filter("JWTPayloadWhere", key)),
                    }
                }
                (None, None) => {
                    let value = self.ctx.param(value::from_json(value));
                    Some(claims.clone().property(key.as_str()).equals(value))
                }
                (Some(_), _) => return Err(TranslationError::unknown_filter("JWTPayloadWhere", key)),
            };

            predicates.extend(predicate);
        }

        Ok(ast::and(predicates))
    }

    /// `id` of a global node: decodes the id and compares the key attribute.
    fn global_id_predicate(&mut self, node: &Variable, concrete: EntityWalker<'a>, value: &Value) -> Predicate {
        let Some(id) = value.as_str() else {
            return Ok(None);
        };

        let Some(attribute) = concrete.get().global_id_attribute() else {
            return Err(TranslationError::unknown_filter(concrete.names().where_input(), "id"));
        };

        let id = GlobalId::decode(id)?;

        if id.type_name != concrete.name() {
            return Ok(Some(Expression::boolean(false)));
        }

        let value = global_id_value(attribute, &id.value);
        let param = self.ctx.param(value);

        Ok(Some(node.property(attribute.database_name()).equals(param)))
    }
}

/// The implementation's own relationship when filtering through an interface.
fn implementation_relationship<'a>(
    relationship: RelationshipWalker<'a>,
    concrete: EntityWalker<'a>,
) -> RelationshipWalker<'a> {
    concrete
        .find_relationship(relationship.name())
        .unwrap_or(relationship)
}

/// The filter of one union member. Members missing from a non-empty filter
/// are left out.
fn member_filter<'v>(
    filter: &'v Map<String, Value>,
    member: EntityWalker<'_>,
    empty: &'v Map<String, Value>,
) -> Result<Option<&'v Map<String, Value>>, TranslationError> {
    match filter.get(member.name()) {
        Some(Value::Null) | None if filter.is_empty() => Ok(Some(empty)),
        Some(Value::Null) | None => Ok(None),
        Some(value) => object(member.name(), value).map(Some),
    }
}

/// A property read, wrapped in `coalesce` for `@coalesce` attributes.
pub(crate) fn property(target: Expression, attribute: &Attribute) -> Expression {
    let read = target.property(attribute.database_name());

    match attribute.coalesce_value() {
        Some(fallback) => function::coalesce(read, value::literal(fallback)).into(),
        None => read,
    }
}

pub(crate) fn global_id_value(attribute: &Attribute, raw: &str) -> CypherValue {
    match attribute.scalar() {
        Some(ScalarKind::Int | ScalarKind::BigInt) => raw
            .parse::<i64>()
            .map(CypherValue::Integer)
            .unwrap_or_else(|_| CypherValue::String(raw.to_string())),
        _ => CypherValue::String(raw.to_string()),
    }
}

pub(crate) fn object<'v>(key: &str, value: &'v Value) -> Result<&'v Map<String, Value>, TranslationError> {
    value
        .as_object()
        .ok_or_else(|| TranslationError::invalid(key, "expected an input object"))
}

fn compare_op(operator: ComparisonOperator) -> CompareOp {
    match operator {
        ComparisonOperator::Equals | ComparisonOperator::Distance => CompareOp::Equals,
        ComparisonOperator::In | ComparisonOperator::Includes => CompareOp::In,
        ComparisonOperator::Lt => CompareOp::LessThan,
        ComparisonOperator::Lte => CompareOp::LessThanOrEquals,
        ComparisonOperator::Gt => CompareOp::GreaterThan,
        ComparisonOperator::Gte => CompareOp::GreaterThanOrEquals,
        ComparisonOperator::Contains => CompareOp::Contains,
        ComparisonOperator::StartsWith => CompareOp::StartsWith,
        ComparisonOperator::EndsWith => CompareOp::EndsWith,
        ComparisonOperator::Matches => CompareOp::Matches,
    }
}
