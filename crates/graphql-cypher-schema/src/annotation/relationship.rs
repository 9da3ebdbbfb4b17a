use async_graphql_parser::{types::ConstDirective, Positioned};

use super::arguments::{single, DirectiveArguments};
use crate::AnnotationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::EnumString, strum_macros::AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipDirection {
    In,
    Out,
    Undirected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum_macros::EnumString, strum_macros::AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryDirection {
    #[default]
    Directed,
    Undirected,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
    strum_macros::EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NestedOperation {
    Create,
    Connect,
    ConnectOrCreate,
    Update,
    Delete,
    Disconnect,
}

/// `@relationship(type:, direction:, properties:, queryDirection:, nestedOperations:, aggregate:)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipAnnotation {
    pub ty: String,
    pub direction: RelationshipDirection,
    pub properties: Option<String>,
    pub query_direction: QueryDirection,
    pub nested_operations: Vec<NestedOperation>,
    /// `None` when the argument is absent.
    pub aggregate: Option<bool>,
}

pub(super) fn parse_relationship(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<RelationshipAnnotation, AnnotationError> {
    let args = DirectiveArguments::new(
        single(first, group)?,
        &[
            "type",
            "direction",
            "properties",
            "queryDirection",
            "nestedOperations",
            "aggregate",
        ],
    )?;

    let nested_operations = match args.enum_list("nestedOperations")? {
        Some(operations) => operations,
        None => <NestedOperation as strum::IntoEnumIterator>::iter().collect(),
    };

    Ok(RelationshipAnnotation {
        ty: args.required_string("type")?,
        direction: args
            .enum_value("direction")?
            .ok_or_else(|| args.missing("direction"))?,
        properties: args.string("properties")?,
        query_direction: args.enum_value("queryDirection")?.unwrap_or_default(),
        nested_operations,
        aggregate: args.bool("aggregate")?,
    })
}
