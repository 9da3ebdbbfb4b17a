use async_graphql_parser::{types::ConstDirective, Positioned};
use async_graphql_value::ConstValue;

use super::arguments::{single, DirectiveArguments};
use crate::AnnotationError;

/// `@limit(default:, max:)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitAnnotation {
    pub default: Option<u32>,
    pub max: Option<u32>,
}

impl LimitAnnotation {
    /// The limit to apply for a requested one, if any.
    pub fn apply(&self, requested: Option<u32>) -> Option<u32> {
        let limit = requested.or(self.default);

        match (limit, self.max) {
            (Some(limit), Some(max)) => Some(limit.min(max)),
            (None, Some(max)) => Some(max),
            (limit, None) => limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulltextIndex {
    pub index_name: String,
    pub query_name: Option<String>,
    pub fields: Vec<String>,
}

/// `@fulltext(indexes:)`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FulltextAnnotation {
    pub indexes: Vec<FulltextIndex>,
}

impl FulltextAnnotation {
    pub fn find_index(&self, index_name: &str) -> Option<&FulltextIndex> {
        self.indexes.iter().find(|index| index.index_name == index_name)
    }
}

/// `@node(labels:)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAnnotation {
    pub labels: Vec<String>,
}

/// `@plural(value:)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralAnnotation {
    pub value: String,
}

pub(super) fn parse_limit(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<LimitAnnotation, AnnotationError> {
    let directive = single(first, group)?;
    let args = DirectiveArguments::new(directive, &["default", "max"])?;

    let positive = |name: &'static str| -> Result<Option<u32>, AnnotationError> {
        match args.int(name)? {
            None => Ok(None),
            Some(value) if value > 0 && value <= i64::from(u32::MAX) => Ok(Some(value as u32)),
            Some(_) => Err(AnnotationError::InvalidArgument {
                pos: directive.pos,
                directive: String::from("limit"),
                argument: name,
                message: String::from("must be a positive integer"),
            }),
        }
    };

    let default = positive("default")?;
    let max = positive("max")?;

    if let (Some(default), Some(max)) = (default, max) {
        if default > max {
            return Err(AnnotationError::InvalidArgument {
                pos: directive.pos,
                directive: String::from("limit"),
                argument: "default",
                message: String::from("must be smaller than or equal to max"),
            });
        }
    }

    Ok(LimitAnnotation { default, max })
}

pub(super) fn parse_fulltext(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<FulltextAnnotation, AnnotationError> {
    let directive = single(first, group)?;
    let args = DirectiveArguments::new(directive, &["indexes"])?;

    let invalid = |message: &str| AnnotationError::InvalidArgument {
        pos: directive.pos,
        directive: String::from("fulltext"),
        argument: "indexes",
        message: message.to_string(),
    };

    let mut indexes = Vec::new();

    for value in args.list("indexes")?.ok_or_else(|| args.missing("indexes"))? {
        let ConstValue::Object(object) = value else {
            return Err(invalid("expected a list of index objects"));
        };

        let string = |key: &str| match object.get(key) {
            Some(ConstValue::String(value)) => Some(value.clone()),
            _ => None,
        };

        let index_name = string("indexName").ok_or_else(|| invalid("every index needs an indexName"))?;

        let fields = match object.get("fields") {
            Some(ConstValue::List(fields)) => fields
                .iter()
                .map(|field| match field {
                    ConstValue::String(field) => Ok(field.clone()),
                    _ => Err(invalid("fields must be strings")),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(ConstValue::String(field)) => vec![field.clone()],
            _ => return Err(invalid("every index needs a list of fields")),
        };

        if let Some(unknown) = object
            .keys()
            .find(|key| !["indexName", "queryName", "fields"].contains(&key.as_str()))
        {
            return Err(invalid(&format!("unknown index key `{unknown}`")));
        }

        indexes.push(FulltextIndex {
            index_name,
            query_name: string("queryName"),
            fields,
        });
    }

    Ok(FulltextAnnotation { indexes })
}

pub(super) fn parse_node(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<NodeAnnotation, AnnotationError> {
    let args = DirectiveArguments::new(single(first, group)?, &["labels"])?;

    Ok(NodeAnnotation {
        labels: args.string_list("labels")?.unwrap_or_default(),
    })
}

pub(super) fn parse_plural(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<PluralAnnotation, AnnotationError> {
    let args = DirectiveArguments::new(single(first, group)?, &["value"])?;

    Ok(PluralAnnotation {
        value: args.required_string("value")?,
    })
}

pub(super) fn parse_marker(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<(), AnnotationError> {
    DirectiveArguments::new(single(first, group)?, &[])?;
    Ok(())
}
