use async_graphql_parser::Pos;

/// A failure while turning type definitions into a [`crate::SchemaModel`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BuildError {
    #[error("Could not parse the type definitions: {0}")]
    Parse(String),
    #[error("{0}")]
    Annotation(#[from] AnnotationError),
    #[error("Could not find the {kind} definition `{name}`, referenced from {referenced_from}.")]
    MissingDefinition {
        kind: &'static str,
        name: String,
        referenced_from: String,
    },
    #[error("Field {entity}.{field} returns the type `{target}`, which needs a @relationship or a @cypher directive.")]
    UnboundEntityField {
        entity: String,
        field: String,
        target: String,
    },
    #[error("Field {owner}.{field} declares a @relationship, which is only supported on object and interface types.")]
    RelationshipOutsideEntity { owner: String, field: String },
    #[error("Field {entity}.{field} needs a @relationship directive; @declareRelationship is only supported on interface fields.")]
    DeclaredRelationshipOutsideInterface { entity: String, field: String },
    #[error("Field {implementation}.{field} implements {interface}.{field}, which uses @declareRelationship, and needs its own @relationship directive.")]
    UnimplementedDeclaredRelationship {
        interface: String,
        implementation: String,
        field: String,
    },
    #[error("The implementations of {interface}.{field} must all use the same relationship properties type.")]
    DeclaredRelationshipProperties { interface: String, field: String },
    #[error("Field {entity}.{field} uses a nested list type, which is not supported.")]
    NestedList { entity: String, field: String },
    #[error("Field {entity}.{field} cannot be aggregated: {reason}.")]
    NotAggregable {
        entity: String,
        field: String,
        reason: &'static str,
    },
    #[error(
        "Relationship {entity}.{field} requests aggregations, but aggregate queries are disabled on its target `{target}`."
    )]
    AggregateForbiddenByTarget {
        entity: String,
        field: String,
        target: String,
    },
    #[error("Type {entity} has more than one @relayId field: {fields}.")]
    MultipleGlobalIds { entity: String, fields: String },
    #[error("Type {entity} already has a field `id`. Either remove it or rename the @relayId field.")]
    GlobalIdConflict { entity: String },
    #[error("Fulltext index {index} on node {entity} references the field `{field}`, which is not a String attribute.")]
    FulltextField {
        index: String,
        entity: String,
        field: String,
    },
    #[error("Could not find index {index} on node {entity}")]
    MissingFulltextIndex { index: String, entity: String },
    #[error("Union {union} has the member `{member}`, which is not an object type.")]
    InvalidUnionMember { union: String, member: String },
    #[error("Interface {interface} is the target of {referenced_from} but has no implementations.")]
    InterfaceWithoutImplementations {
        interface: String,
        referenced_from: String,
    },
    #[error("@timestamp on {entity}.{field} requires a DateTime field.")]
    InvalidTimestamp { entity: String, field: String },
}

/// A directive that was written in a way we cannot honor.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AnnotationError {
    #[error("[{pos}] Directive @{directive} does not support the argument `{argument}`.")]
    UnknownArgument {
        pos: Pos,
        directive: String,
        argument: String,
    },
    #[error("[{pos}] Directive @{directive} is missing the required argument `{argument}`.")]
    MissingArgument {
        pos: Pos,
        directive: String,
        argument: &'static str,
    },
    #[error("[{pos}] Invalid value for @{directive}({argument}:): {message}.")]
    InvalidArgument {
        pos: Pos,
        directive: String,
        argument: &'static str,
        message: String,
    },
    #[error("[{pos}] Directive @{directive} can only be used once per location.")]
    Repeated { pos: Pos, directive: String },
    #[error("[{pos}] Directive @{directive} is not supported on {location}.")]
    UnsupportedLocation {
        pos: Pos,
        directive: String,
        location: &'static str,
    },
}
