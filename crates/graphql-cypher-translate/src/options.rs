//! Sorting and pagination arguments: `options`, `sort`, `limit`, `offset`,
//! and `first`/`after` of connections.

use cypher_ast::{
    ast::{Expression, Order, Projection, Query, Variable},
    CypherValue,
};
use graphql_cypher_schema::{Attribute, EntityWalker};
use serde_json::{Map, Value};

use crate::{context::TranslationContext, cursor, filter::property, TranslationError};

/// One `{ field: ASC }` entry.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SortKey {
    pub field: String,
    pub order: Order,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Page {
    pub sort: Vec<SortKey>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl Page {
    /// `options: { sort, limit, offset }` of a list read.
    pub(crate) fn from_options(options: Option<&Map<String, Value>>) -> Result<Self, TranslationError> {
        let Some(options) = options else {
            return Ok(Self::default());
        };

        Ok(Self {
            sort: sort_keys(options.get("sort"), "sort")?,
            offset: count(options.get("offset"), "offset")?,
            limit: count(options.get("limit"), "limit")?,
        })
    }

    /// `first` and `after` of a connection. The cursor points at the last
    /// edge already seen.
    pub(crate) fn from_connection(arguments: &Map<String, Value>) -> Result<Self, TranslationError> {
        let offset = match arguments.get("after").and_then(Value::as_str) {
            Some(after) => Some(cursor::decode(after)?.saturating_add(1)),
            None => None,
        };

        Ok(Self {
            sort: Vec::new(),
            offset: offset.map(|offset| u32::try_from(offset).unwrap_or(u32::MAX)),
            limit: count(arguments.get("first"), "first")?,
        })
    }

    /// Applies the `@limit` of the entity to the requested limit.
    pub(crate) fn limited_by(mut self, entity: EntityWalker<'_>) -> Self {
        if let Some(limit) = entity.get().limit() {
            self.limit = limit.apply(self.limit);
        }

        self
    }

    pub(crate) fn is_unbounded(&self) -> bool {
        self.offset.is_none() && self.limit.is_none()
    }

    /// Adds `ORDER BY`, `SKIP` and `LIMIT` to a projection.
    pub(crate) fn apply(
        &self,
        ctx: &mut TranslationContext<'_>,
        mut projection: Projection,
        order: Vec<(Expression, Order)>,
    ) -> Projection {
        for (expression, direction) in order {
            projection = projection.order_by(expression, direction);
        }

        if let Some(offset) = self.offset {
            projection = projection.skip(ctx.param(CypherValue::Integer(i64::from(offset))));
        }

        if let Some(limit) = self.limit {
            projection = projection.limit(ctx.param(CypherValue::Integer(i64::from(limit))));
        }

        projection
    }

    /// `WITH * ORDER BY .. SKIP .. LIMIT ..`, or nothing.
    pub(crate) fn push(&self, ctx: &mut TranslationContext<'_>, query: &mut Query, order: Vec<(Expression, Order)>) {
        if order.is_empty() && self.is_unbounded() {
            return;
        }

        query.with(self.apply(ctx, Projection::star(), order));
    }
}

/// Orders by the properties of a matched node or relationship.
pub(crate) fn property_order<'a>(
    target: &Variable,
    owner: &str,
    find: impl Fn(&str) -> Option<&'a Attribute>,
    sort: &[SortKey],
) -> Result<Vec<(Expression, Order)>, TranslationError> {
    sort.iter()
        .map(|key| {
            let attribute = find(&key.field)
                .filter(|attribute| attribute.is_sortable())
                .ok_or_else(|| TranslationError::UnknownField {
                    entity: owner.to_string(),
                    field: key.field.clone(),
                })?;

            Ok((property(target.into(), attribute), key.order))
        })
        .collect()
}

/// Orders by the keys of maps already projected, `this.title`.
pub(crate) fn projected_order(map: Expression, sort: &[SortKey]) -> Vec<(Expression, Order)> {
    sort.iter()
        .map(|key| (map.clone().property(key.field.as_str()), key.order))
        .collect()
}

/// A list of `{ field: ASC }` objects. A single object counts as a list of one.
pub(crate) fn sort_keys(value: Option<&Value>, argument: &str) -> Result<Vec<SortKey>, TranslationError> {
    let entries = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries.iter().collect::<Vec<_>>(),
        Some(entry @ Value::Object(_)) => vec![entry],
        Some(_) => return Err(TranslationError::invalid(argument, "expected a list of sort objects")),
    };

    let mut keys = Vec::new();

    for entry in entries {
        let Some(entry) = entry.as_object() else {
            return Err(TranslationError::invalid(argument, "expected a sort object"));
        };

        for (field, direction) in entry {
            if direction.is_null() {
                continue;
            }

            keys.push(SortKey {
                field: field.clone(),
                order: order(direction, argument)?,
            });
        }
    }

    Ok(keys)
}

pub(crate) fn order(value: &Value, argument: &str) -> Result<Order, TranslationError> {
    match value.as_str() {
        Some("ASC") => Ok(Order::Asc),
        Some("DESC") => Ok(Order::Desc),
        _ => Err(TranslationError::invalid(argument, "expected ASC or DESC")),
    }
}

pub(crate) fn count(value: Option<&Value>, argument: &str) -> Result<Option<u32>, TranslationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|count| u32::try_from(count).ok())
            .map(Some)
            .ok_or_else(|| TranslationError::invalid(argument, "expected a non-negative integer")),
    }
}

#[cfg(test)]
mod tests {
    use cypher_ast::ast::Order;
    use serde_json::json;

    use super::{sort_keys, Page, SortKey};

    #[test]
    fn sort_entries_keep_their_order() {
        let keys = sort_keys(Some(&json!([{ "title": "DESC" }, { "released": "ASC" }])), "sort").unwrap();

        assert_eq!(
            keys,
            vec![
                SortKey {
                    field: String::from("title"),
                    order: Order::Desc
                },
                SortKey {
                    field: String::from("released"),
                    order: Order::Asc
                },
            ]
        );
    }

    #[test]
    fn negative_limits_are_rejected() {
        let options = json!({ "limit": -1 });
        assert!(Page::from_options(options.as_object()).is_err());
    }

    #[test]
    fn after_skips_past_the_cursor() {
        let arguments = json!({ "first": 10, "after": "YXJyYXljb25uZWN0aW9uOjQ=" });
        let page = Page::from_connection(arguments.as_object().unwrap()).unwrap();

        assert_eq!(page.offset, Some(5));
        assert_eq!(page.limit, Some(10));
    }
}
