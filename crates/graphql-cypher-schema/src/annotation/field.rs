use async_graphql_parser::{types::ConstDirective, Positioned};

use super::arguments::{single, DirectiveArguments};
use crate::AnnotationError;

/// `@cypher(statement:, columnName:)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CypherAnnotation {
    pub statement: String,
    pub column_name: String,
}

/// `@id(autogenerate:)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdAnnotation {
    pub autogenerate: bool,
}

/// `@unique(constraintName:)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueAnnotation {
    pub constraint_name: Option<String>,
}

/// `@default(value:)`
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultAnnotation {
    pub value: serde_json::Value,
}

/// `@coalesce(value:)`
#[derive(Debug, Clone, PartialEq)]
pub struct CoalesceAnnotation {
    pub value: serde_json::Value,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum_macros::EnumString, strum_macros::AsRefStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteOperation {
    Create,
    Update,
}

/// `@timestamp(operations:)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampAnnotation {
    pub operations: Vec<WriteOperation>,
}

/// `@populatedBy(callback:, operations:)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulatedByAnnotation {
    pub callback: String,
    pub operations: Vec<WriteOperation>,
}

/// `@alias(property:)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasAnnotation {
    pub property: String,
}

const ALL_WRITES: [WriteOperation; 2] = [WriteOperation::Create, WriteOperation::Update];

pub(super) fn parse_cypher(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<CypherAnnotation, AnnotationError> {
    let args = DirectiveArguments::new(single(first, group)?, &["statement", "columnName"])?;

    Ok(CypherAnnotation {
        statement: args.required_string("statement")?,
        column_name: args.required_string("columnName")?,
    })
}

pub(super) fn parse_id(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<IdAnnotation, AnnotationError> {
    let args = DirectiveArguments::new(single(first, group)?, &["autogenerate"])?;

    Ok(IdAnnotation {
        autogenerate: args.bool("autogenerate")?.unwrap_or(true),
    })
}

pub(super) fn parse_unique(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<UniqueAnnotation, AnnotationError> {
    let args = DirectiveArguments::new(single(first, group)?, &["constraintName"])?;

    Ok(UniqueAnnotation {
        constraint_name: args.string("constraintName")?,
    })
}

pub(super) fn parse_default(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<DefaultAnnotation, AnnotationError> {
    let args = DirectiveArguments::new(single(first, group)?, &["value"])?;
    let value = args.value("value")?.ok_or_else(|| args.missing("value"))?;

    Ok(DefaultAnnotation { value })
}

pub(super) fn parse_coalesce(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<CoalesceAnnotation, AnnotationError> {
    let args = DirectiveArguments::new(single(first, group)?, &["value"])?;
    let value = args.value("value")?.ok_or_else(|| args.missing("value"))?;

    Ok(CoalesceAnnotation { value })
}

pub(super) fn parse_timestamp(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<TimestampAnnotation, AnnotationError> {
    let args = DirectiveArguments::new(single(first, group)?, &["operations"])?;

    Ok(TimestampAnnotation {
        operations: args.enum_list("operations")?.unwrap_or_else(|| ALL_WRITES.to_vec()),
    })
}

pub(super) fn parse_populated_by(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<PopulatedByAnnotation, AnnotationError> {
    let args = DirectiveArguments::new(single(first, group)?, &["callback", "operations"])?;

    Ok(PopulatedByAnnotation {
        callback: args.required_string("callback")?,
        operations: args.enum_list("operations")?.unwrap_or_else(|| ALL_WRITES.to_vec()),
    })
}

pub(super) fn parse_alias(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<AliasAnnotation, AnnotationError> {
    let args = DirectiveArguments::new(single(first, group)?, &["property"])?;

    Ok(AliasAnnotation {
        property: args.required_string("property")?,
    })
}
