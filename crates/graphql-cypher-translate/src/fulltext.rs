//! Fulltext index queries through `db.index.fulltext.queryNodes`.

use cypher_ast::{
    ast::{self, CallProcedure, Clause, Comparable, Expression, Order, Projection, ProjectionItem, Query, Variable},
    CypherValue,
};
use graphql_cypher_schema::{annotation::AuthorizationOperation, EntityWalker};
use itertools::Itertools;
use serde_json::{Map, Value};

use crate::{
    context::TranslationContext,
    filter::{object, Filter},
    options::{self, property_order, Page},
    projection::ProjectionBuilder,
    ResolvedField, TranslationError,
};

const QUERY_NODES: &str = "db.index.fulltext.queryNodes";

/// One row per matched node: `{ score, movie: this { .. } }`.
pub(crate) fn fulltext<'a>(
    ctx: &mut TranslationContext<'a>,
    entity: EntityWalker<'a>,
    index: &str,
    field: &ResolvedField,
) -> Result<Query, TranslationError> {
    let index = entity.fulltext_index(index)?;
    let phrase = field
        .argument("phrase")
        .and_then(Value::as_str)
        .ok_or_else(|| TranslationError::MissingArgument {
            argument: String::from("phrase"),
        })?;

    let result_field = entity.names().fulltext_result_field();
    let this = Variable::named("this");
    let score = ctx.value();
    let filter = field.object_argument("where");

    let node_filter = match filter.and_then(|filter| filter.get(&result_field)) {
        Some(Value::Null) | None => None,
        Some(value) => Some(object(&result_field, value)?),
    };

    let labels = entity
        .labels()
        .iter()
        .map(|label| Expression::has_label(this.clone(), label.as_str()));

    let score_filter = score_where(ctx, &score, filter)?;

    let Filter { predicate, subqueries } = Filter::build(ctx, &this, entity, entity, node_filter, AuthorizationOperation::Read)?;
    let predicate = ast::and(labels.chain(score_filter).chain(predicate));

    let phrase = ctx.param(CypherValue::String(phrase.to_string()));
    let mut procedure = CallProcedure {
        name: String::from(QUERY_NODES),
        arguments: vec![Expression::string(index.index_name.as_str()), phrase],
        yields: vec![(String::from("node"), this.clone()), (String::from("score"), score.clone())],
        predicate: None,
    };

    let mut query = Query::new();

    if subqueries.is_empty() {
        procedure.predicate = predicate;
        query.push(Clause::CallProcedure(procedure));
    } else {
        query.push(Clause::CallProcedure(procedure));
        Filter { predicate, subqueries }.push_after(&mut query);
    }

    let page = Page {
        sort: Vec::new(),
        offset: options::count(field.argument("offset"), "offset")?,
        limit: options::count(field.argument("limit"), "limit")?,
    }
    .limited_by(entity);

    let order = sort(entity, &this, &score, &result_field, field.argument("sort"))?;
    page.push(ctx, &mut query, order);

    let mut builder = ProjectionBuilder::new(ctx);
    let mut entries = Vec::new();

    for selected in field.selection.iter().unique_by(|selected| selected.response_key()) {
        let value = match selected.name.as_str() {
            "__typename" => continue,
            "score" => Expression::from(&score),
            name if name == result_field => builder.node(&this, entity, &selected.selection)?.into(),
            other => {
                return Err(TranslationError::UnknownField {
                    entity: entity.names().fulltext_result(),
                    field: other.to_string(),
                })
            }
        };

        entries.push((selected.response_key().to_string(), value));
    }

    builder.push_into(&mut query);
    query.returning(Projection::items([ProjectionItem::aliased(Expression::map(entries), this)]));

    Ok(query)
}

/// `score: { min, max }` of the fulltext where input.
fn score_where(
    ctx: &mut TranslationContext<'_>,
    score: &Variable,
    filter: Option<&Map<String, Value>>,
) -> Result<Option<Expression>, TranslationError> {
    let Some(bounds) = filter.and_then(|filter| filter.get("score")).filter(|value| !value.is_null()) else {
        return Ok(None);
    };

    let bounds = object("score", bounds)?;
    let mut predicates = Vec::new();

    for (key, value) in bounds {
        let Some(bound) = value.as_f64() else {
            continue;
        };

        let param = ctx.param(CypherValue::Float(bound));

        match key.as_str() {
            "min" => predicates.push(Expression::from(score).greater_than_or_equals(param)),
            "max" => predicates.push(Expression::from(score).less_than_or_equals(param)),
            other => return Err(TranslationError::unknown_filter("FloatWhere", other)),
        }
    }

    Ok(ast::and(predicates))
}

/// `[{ score: DESC }, { movie: { title: ASC } }]`
fn sort(
    entity: EntityWalker<'_>,
    this: &Variable,
    score: &Variable,
    result_field: &str,
    value: Option<&Value>,
) -> Result<Vec<(Expression, Order)>, TranslationError> {
    let entries = match value {
        None => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries.iter().collect::<Vec<_>>(),
        Some(entry) => vec![entry],
    };

    let mut order = Vec::new();

    for entry in entries {
        for (key, value) in object("sort", entry)? {
            if value.is_null() {
                continue;
            }

            if key == "score" {
                order.push((Expression::from(score), options::order(value, "sort")?));
            } else if key == result_field {
                let keys = options::sort_keys(Some(value), "sort")?;
                order.extend(property_order(this, entity.name(), |name| entity.find_attribute(name), &keys)?);
            } else {
                return Err(TranslationError::unknown_filter(entity.names().fulltext_sort_input(), key));
            }
        }
    }

    Ok(order)
}
