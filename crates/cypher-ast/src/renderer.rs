use std::collections::HashMap;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::{
    ast::{
        Clause, Expression, Literal, MapProjectionItem, NodePattern, Param, ParamId, Pattern, PatternDirection,
        Projection, ProjectionItem, Query, RelationshipPattern, SetItem, Variable, VariableId,
    },
    CypherValue,
};

const INDENT: &str = "    ";

/// A rendered statement, ready for the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct CypherStatement {
    pub cypher: String,
    pub params: IndexMap<String, CypherValue>,
}

/// Turns a [`Query`] into Cypher text.
///
/// Generated variables are named `thisN` (nodes and relationships) or `varN`
/// and parameters `paramN`, each counter increasing in order of first
/// appearance in the output.
#[derive(Debug, Default)]
pub struct Renderer {
    variable_names: HashMap<VariableId, String>,
    next_variable: u32,
    param_names: HashMap<ParamId, String>,
    next_param: u32,
    params: IndexMap<String, CypherValue>,
    named_params: IndexMap<String, CypherValue>,
}

impl Renderer {
    pub fn build(query: &Query) -> CypherStatement {
        Self::default().render(query)
    }

    /// Registers the values of named parameters such as `$jwt`. Only the
    /// ones the statement references end up in the parameter map.
    pub fn with_named_params(mut self, named_params: IndexMap<String, CypherValue>) -> Self {
        self.named_params = named_params;
        self
    }

    pub fn render(mut self, query: &Query) -> CypherStatement {
        let cypher = self.query(query);

        CypherStatement {
            cypher,
            params: self.params,
        }
    }

    fn query(&mut self, query: &Query) -> String {
        query.clauses.iter().map(|clause| self.clause(clause)).join("\n")
    }

    fn clause(&mut self, clause: &Clause) -> String {
        match clause {
            Clause::Match(r#match) => {
                let patterns = r#match.patterns.iter().map(|p| self.pattern(p)).join(", ");
                let keyword = if r#match.optional { "OPTIONAL MATCH" } else { "MATCH" };
                let mut out = format!("{keyword} {patterns}");

                if let Some(predicate) = &r#match.predicate {
                    out.push_str("\nWHERE ");
                    out.push_str(&self.expression(predicate));
                }

                out
            }
            Clause::With(with) => {
                let mut out = self.projection("WITH", &with.projection, false);

                if let Some(predicate) = &with.predicate {
                    out.push_str("\nWHERE ");
                    out.push_str(&self.expression(predicate));
                }

                out
            }
            Clause::Return(projection) => self.projection("RETURN", projection, true),
            Clause::Call(queries) => {
                let body = queries.iter().map(|query| self.query(query)).join("\nUNION\n");
                format!("CALL {{\n{}\n}}", indent(&body))
            }
            Clause::CallProcedure(procedure) => {
                let arguments = procedure.arguments.iter().map(|a| self.expression(a)).join(", ");
                let mut out = format!("CALL {}({arguments})", procedure.name);

                if !procedure.yields.is_empty() {
                    let yields = procedure
                        .yields
                        .iter()
                        .map(|(name, variable)| format!("{name} AS {}", self.variable(variable)))
                        .join(", ");

                    out.push_str(" YIELD ");
                    out.push_str(&yields);
                }

                if let Some(predicate) = &procedure.predicate {
                    out.push_str("\nWHERE ");
                    out.push_str(&self.expression(predicate));
                }

                out
            }
            Clause::Unwind(expression, alias) => {
                let expression = self.expression(expression);
                format!("UNWIND {expression} AS {}", self.variable(alias))
            }
            Clause::Create(patterns) => {
                format!("CREATE {}", patterns.iter().map(|p| self.pattern(p)).join(", "))
            }
            Clause::Merge(merge) => {
                let mut out = format!("MERGE {}", self.pattern(&merge.pattern));

                if !merge.on_create.is_empty() {
                    out.push_str("\nON CREATE SET ");
                    out.push_str(&self.set_items(&merge.on_create));
                }

                out
            }
            Clause::Set(items) => format!("SET {}", self.set_items(items)),
            Clause::Delete { detach, targets } => {
                let targets = targets.iter().map(|t| self.expression(t)).join(", ");

                if *detach {
                    format!("DETACH DELETE {targets}")
                } else {
                    format!("DELETE {targets}")
                }
            }
            Clause::Raw(cypher) => cypher.clone(),
        }
    }

    fn set_items(&mut self, items: &[SetItem]) -> String {
        items
            .iter()
            .map(|item| format!("{} = {}", self.expression(&item.target), self.expression(&item.value)))
            .join(", ")
    }

    fn projection(&mut self, keyword: &str, projection: &Projection, allow_empty: bool) -> String {
        let mut out = String::from(keyword);

        if projection.distinct {
            out.push_str(" DISTINCT");
        }

        let mut items = Vec::with_capacity(projection.items.len() + 1);

        if projection.star || (projection.items.is_empty() && !allow_empty) {
            items.push(String::from("*"));
        }

        for item in &projection.items {
            items.push(self.projection_item(item));
        }

        if items.is_empty() {
            items.push(String::from("*"));
        }

        out.push(' ');
        out.push_str(&items.join(", "));

        if !projection.order_by.is_empty() {
            let order_by = projection
                .order_by
                .iter()
                .map(|item| format!("{} {}", self.expression(&item.expression), item.order.as_str()))
                .join(", ");

            out.push_str("\nORDER BY ");
            out.push_str(&order_by);
        }

        if let Some(skip) = &projection.skip {
            out.push_str("\nSKIP ");
            out.push_str(&self.expression(skip));
        }

        if let Some(limit) = &projection.limit {
            out.push_str("\nLIMIT ");
            out.push_str(&self.expression(limit));
        }

        out
    }

    fn projection_item(&mut self, item: &ProjectionItem) -> String {
        let expression = self.expression(&item.expression);

        match &item.alias {
            Some(alias) if item.expression != Expression::Variable(alias.clone()) => {
                format!("{expression} AS {}", self.variable(alias))
            }
            _ => expression,
        }
    }

    fn pattern(&mut self, pattern: &Pattern) -> String {
        let mut out = self.node_pattern(&pattern.start);

        for (relationship, node) in &pattern.hops {
            out.push_str(&self.relationship_pattern(relationship));
            out.push_str(&self.node_pattern(node));
        }

        out
    }

    fn node_pattern(&mut self, node: &NodePattern) -> String {
        let mut out = String::from("(");

        if let Some(variable) = &node.variable {
            out.push_str(&self.variable(variable));
        }

        for label in &node.labels {
            out.push(':');
            out.push_str(&escape(label));
        }

        if !node.properties.is_empty() {
            if node.variable.is_some() || !node.labels.is_empty() {
                out.push(' ');
            }

            out.push_str(&self.map_entries(&node.properties));
        }

        out.push(')');
        out
    }

    fn relationship_pattern(&mut self, relationship: &RelationshipPattern) -> String {
        let mut inner = String::new();

        if let Some(variable) = &relationship.variable {
            inner.push_str(&self.variable(variable));
        }

        if !relationship.types.is_empty() {
            inner.push(':');
            inner.push_str(&relationship.types.iter().map(|ty| escape(ty)).join("|"));
        }

        match relationship.direction {
            PatternDirection::Left => format!("<-[{inner}]-"),
            PatternDirection::Right => format!("-[{inner}]->"),
            PatternDirection::Undirected => format!("-[{inner}]-"),
        }
    }

    fn map_entries(&mut self, entries: &[(String, Expression)]) -> String {
        if entries.is_empty() {
            return String::from("{}");
        }

        let entries = entries
            .iter()
            .map(|(key, value)| format!("{}: {}", escape(key), self.expression(value)))
            .join(", ");

        format!("{{ {entries} }}")
    }

    fn expression(&mut self, expression: &Expression) -> String {
        match expression {
            Expression::Variable(variable) => self.variable(variable),
            Expression::Param(param) => self.param(param),
            Expression::NamedParam(name) => {
                if let Some(value) = self.named_params.get(name) {
                    let value = value.clone();
                    self.params.entry(name.clone()).or_insert(value);
                }

                format!("${name}")
            }
            Expression::Literal(literal) => literal_to_string(literal),
            Expression::Property(target, name) => format!("{}.{}", self.expression(target), escape(name)),
            Expression::Compare(left, op, right) => {
                let left = self.operand(left);
                let right = self.operand(right);
                format!("{left} {} {right}", op.as_str())
            }
            Expression::IsNull(inner) => format!("{} IS NULL", self.operand(inner)),
            Expression::IsNotNull(inner) => format!("{} IS NOT NULL", self.operand(inner)),
            Expression::And(items) => self.junction(items, " AND "),
            Expression::Or(items) => self.junction(items, " OR "),
            Expression::Not(inner) => match inner.as_ref() {
                Expression::And(_) | Expression::Or(_) => format!("NOT {}", self.expression(inner)),
                inner => format!("NOT ({})", self.expression(inner)),
            },
            Expression::Math(left, op, right) => {
                let left = self.operand(left);
                let right = self.operand(right);
                format!("{left} {} {right}", op.as_str())
            }
            Expression::Negate(inner) => format!("-{}", self.operand(inner)),
            Expression::Function(function) => {
                let arguments = function.arguments.iter().map(|a| self.expression(a)).join(", ");
                let distinct = if function.distinct { "DISTINCT " } else { "" };
                format!("{}({distinct}{arguments})", function.name)
            }
            Expression::List(items) => format!("[{}]", items.iter().map(|i| self.expression(i)).join(", ")),
            Expression::Map(entries) => self.map_entries(entries),
            Expression::MapProjection(projection) => {
                let variable = self.variable(&projection.variable);

                if projection.items.is_empty() {
                    return format!("{variable} {{ }}");
                }

                let items = projection
                    .items
                    .iter()
                    .map(|item| match item {
                        MapProjectionItem::Property(name) => format!(".{}", escape(name)),
                        MapProjectionItem::Entry(key, value) => format!("{}: {}", escape(key), self.expression(value)),
                        MapProjectionItem::All => String::from(".*"),
                    })
                    .join(", ");

                format!("{variable} {{ {items} }}")
            }
            Expression::ListComprehension(comprehension) => {
                let mut out = format!(
                    "[{} IN {}",
                    self.variable(&comprehension.variable),
                    self.expression(&comprehension.list)
                );

                if let Some(predicate) = &comprehension.predicate {
                    out.push_str(" WHERE ");
                    out.push_str(&self.expression(predicate));
                }

                if let Some(projection) = &comprehension.projection {
                    out.push_str(" | ");
                    out.push_str(&self.expression(projection));
                }

                out.push(']');
                out
            }
            Expression::PatternComprehension(comprehension) => {
                let mut out = format!("[{}", self.pattern(&comprehension.pattern));

                if let Some(predicate) = &comprehension.predicate {
                    out.push_str(" WHERE ");
                    out.push_str(&self.expression(predicate));
                }

                out.push_str(" | ");
                out.push_str(&self.expression(&comprehension.projection));
                out.push(']');
                out
            }
            Expression::Quantifier(quantifier) => {
                let variable = self.variable(&quantifier.variable);
                let list = self.expression(&quantifier.list);
                let predicate = self.expression(&quantifier.predicate);

                format!("{}({variable} IN {list} WHERE {predicate})", quantifier.kind.as_str())
            }
            Expression::Slice(list, from, to) => {
                let list = self.operand(list);
                let from = from.as_ref().map(|f| self.expression(f)).unwrap_or_default();
                let to = to.as_ref().map(|t| self.expression(t)).unwrap_or_default();
                format!("{list}[{from}..{to}]")
            }
            Expression::HasLabel(variable, label) => format!("{}:{}", self.variable(variable), escape(label)),
            Expression::Case {
                condition,
                then,
                otherwise,
            } => {
                let condition = self.expression(condition);
                let then = self.expression(then);
                let otherwise = self.expression(otherwise);
                format!("CASE WHEN {condition} THEN {then} ELSE {otherwise} END")
            }
            Expression::Raw(cypher) => cypher.clone(),
        }
    }

    /// Operands of binary operators. Nested binary expressions get parentheses.
    fn operand(&mut self, expression: &Expression) -> String {
        match expression {
            Expression::Compare(..)
            | Expression::Math(..)
            | Expression::IsNull(_)
            | Expression::IsNotNull(_)
            | Expression::Not(_) => format!("({})", self.expression(expression)),
            _ => self.expression(expression),
        }
    }

    fn junction(&mut self, items: &[Expression], separator: &str) -> String {
        match items {
            [] => String::from("true"),
            [single] => self.expression(single),
            items => format!("({})", items.iter().map(|i| self.expression(i)).join(separator)),
        }
    }

    fn variable(&mut self, variable: &Variable) -> String {
        match variable {
            Variable::Named(name) => escape(name),
            Variable::Generated(id, kind) => {
                if let Some(name) = self.variable_names.get(id) {
                    return name.clone();
                }

                let name = format!("{}{}", kind.prefix(), self.next_variable);
                self.next_variable += 1;
                self.variable_names.insert(*id, name.clone());

                name
            }
        }
    }

    fn param(&mut self, param: &Param) -> String {
        if let Some(name) = self.param_names.get(&param.id) {
            return format!("${name}");
        }

        let name = format!("param{}", self.next_param);
        self.next_param += 1;

        self.param_names.insert(param.id, name.clone());
        self.params.insert(name.clone(), param.value.clone());

        format!("${name}")
    }
}

fn indent(body: &str) -> String {
    body.lines()
        .map(|line| if line.is_empty() { String::new() } else { format!("{INDENT}{line}") })
        .join("\n")
}

fn literal_to_string(literal: &Literal) -> String {
    match literal {
        Literal::Null => String::from("NULL"),
        Literal::Boolean(value) => value.to_string(),
        Literal::Integer(value) => value.to_string(),
        Literal::Float(value) => format!("{value:?}"),
        Literal::String(value) => {
            let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{escaped}\"")
        }
    }
}

/// Quotes identifiers that are not plain words.
pub fn escape(name: &str) -> String {
    let mut chars = name.chars();

    let plain = chars
        .next()
        .map(|first| first.is_ascii_alphabetic() || first == '_')
        .unwrap_or(false)
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if plain {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "``"))
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use insta::{assert_json_snapshot, assert_snapshot};

    use crate::ast::{
        function, Comparable, Expression, MapProjection, NodePattern, Pattern, PatternDirection, Projection,
        ProjectionItem, Query, QuantifierKind, RelationshipPattern, Variable, VariableAllocator,
    };
    use crate::CypherValue;

    use super::Renderer;

    #[test]
    fn aggregate_subquery_gated_by_a_boolean_variable() {
        let mut vars = VariableAllocator::default();

        let this = Variable::named("this");
        let edge = vars.relationship();
        let target = vars.node();
        let result = vars.value();

        let count = function::count(target.clone());
        let predicate = crate::ast::and([
            Expression::from(count).equals(vars.param(10_i64)),
            Expression::from(function::avg(function::size(target.property("name")))).equals(vars.param(10.0)),
        ])
        .unwrap();

        let mut subquery = Query::new();
        subquery
            .import([&this])
            .match_pattern(
                Pattern::node(this.clone()).related(
                    RelationshipPattern::new(Some(edge), "LIKES", PatternDirection::Left),
                    NodePattern::new(target).label("User"),
                ),
                None,
            )
            .returning(Projection::items([ProjectionItem::aliased(predicate, result.clone())]));

        let mut projection = MapProjection::new(this.clone());
        projection.property("content");

        let mut query = Query::new();
        query
            .match_pattern(NodePattern::new(this.clone()).label("Post"), None)
            .call(subquery)
            .with_where(Projection::star(), Some(result.equals(Expression::boolean(true))))
            .returning(Projection::items([ProjectionItem::aliased(projection, this)]));

        let statement = Renderer::build(&query);

        assert_snapshot!(statement.cypher, @r###"
        MATCH (this:Post)
        CALL {
            WITH this
            MATCH (this)<-[this0:LIKES]-(this1:User)
            RETURN (count(this1) = $param0 AND avg(size(this1.name)) = $param1) AS var2
        }
        WITH *
        WHERE var2 = true
        RETURN this { .content } AS this
        "###);

        assert_json_snapshot!(statement.params, @r###"
        {
          "param0": 10,
          "param1": 10.0
        }
        "###);
    }

    #[test]
    fn quantifier_over_pattern_comprehension() {
        let mut vars = VariableAllocator::default();
        let this = Variable::named("this");
        let target = vars.node();

        let pattern = Pattern::node(this.clone()).related(
            RelationshipPattern::new(None, "ACTED_IN", PatternDirection::Left),
            NodePattern::new(target.clone()).label("Actor"),
        );

        let predicate = target.property("name").equals(vars.param("Keanu"));
        let item = vars.value();
        let comprehension = Expression::pattern_comprehension(pattern, Some(predicate), Expression::integer(1));
        let single = Expression::quantifier(QuantifierKind::Single, item, comprehension, Expression::boolean(true));

        let mut query = Query::new();
        query
            .match_pattern(NodePattern::new(this.clone()).label("Movie"), Some(single))
            .returning(Projection::items([ProjectionItem::from(this)]));

        let statement = Renderer::build(&query);

        assert_snapshot!(statement.cypher, @r###"
        MATCH (this:Movie)
        WHERE single(var0 IN [(this)<-[:ACTED_IN]-(this1:Actor) WHERE this1.name = $param0 | 1] WHERE true)
        RETURN this
        "###);
    }

    #[test]
    fn named_params_are_only_included_when_referenced() {
        let mut named = IndexMap::new();
        named.insert(String::from("isAuthenticated"), CypherValue::Boolean(true));
        named.insert(String::from("jwt"), CypherValue::Map(IndexMap::new()));

        let this = Variable::named("this");
        let guard = Expression::named_param("isAuthenticated").equals(Expression::boolean(true));

        let mut query = Query::new();
        query
            .match_pattern(NodePattern::new(this.clone()).label("Movie"), Some(guard))
            .returning(Projection::items([ProjectionItem::from(this)]));

        let statement = Renderer::default().with_named_params(named).render(&query);

        assert_snapshot!(statement.cypher, @r###"
        MATCH (this:Movie)
        WHERE $isAuthenticated = true
        RETURN this
        "###);

        let params = serde_json::to_string(&statement.params).unwrap();
        assert_eq!(params, r#"{"isAuthenticated":true}"#);
    }

    #[test]
    fn union_subquery_and_escaping() {
        let mut vars = VariableAllocator::default();
        let this = Variable::named("this");
        let result = vars.value();

        let branches = ["Genre", "Has Space"]
            .into_iter()
            .map(|label| {
                let node = vars.node();
                let mut projection = MapProjection::new(node.clone());
                projection.entry("__resolveType", Expression::string(label));

                let mut branch = Query::new();
                branch
                    .with(Projection::star())
                    .match_pattern(
                        Pattern::node(this.clone()).related(
                            RelationshipPattern::new(None, "IN_GENRE", PatternDirection::Right),
                            NodePattern::new(node.clone()).label(label),
                        ),
                        None,
                    )
                    .with(Projection::items([ProjectionItem::aliased(projection, node.clone())]))
                    .returning(Projection::items([ProjectionItem::aliased(node, result.clone())]));

                branch
            })
            .collect();

        let mut query = Query::new();
        query.call_union(branches);

        assert_snapshot!(Renderer::build(&query).cypher, @r###"
        CALL {
            WITH *
            MATCH (this)-[:IN_GENRE]->(this0:Genre)
            WITH this0 { __resolveType: "Genre" } AS this0
            RETURN this0 AS var1
            UNION
            WITH *
            MATCH (this)-[:IN_GENRE]->(this2:`Has Space`)
            WITH this2 { __resolveType: "Has Space" } AS this2
            RETURN this2 AS var1
        }
        "###);
    }
}
