use graphql_cypher_schema::BuildError;

/// Why one root field could not be translated. Fatal to that field only.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TranslationError {
    #[error("Unknown type {name}")]
    UnknownEntity { name: String },
    #[error("Field {field} does not exist on {entity}")]
    UnknownField { entity: String, field: String },
    #[error("Unknown filter {key} on {input}")]
    UnknownFilter { input: String, key: String },
    #[error("The {operator} aggregation is not supported on {entity}.{field}")]
    UnsupportedAggregation {
        entity: String,
        field: String,
        operator: &'static str,
    },
    #[error("Invalid value for {argument}: {message}")]
    InvalidArgument { argument: String, message: String },
    #[error("Missing required argument {argument}")]
    MissingArgument { argument: String },
    #[error("Aggregate filters on {relationship} cannot be nested inside a relationship filter")]
    NestedAggregateFilter { relationship: String },
    #[error("Invalid global id {id}")]
    InvalidGlobalId { id: String },
    #[error("Invalid cursor {cursor}")]
    InvalidCursor { cursor: String },
    #[error("No value was provided for the populatedBy callback {callback}")]
    MissingCallback { callback: String },
    #[error("{field} is not a root field")]
    NotARootField { field: String },
    #[error(transparent)]
    Build(#[from] BuildError),
}

impl TranslationError {
    pub(crate) fn invalid(argument: impl Into<String>, message: impl Into<String>) -> Self {
        TranslationError::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    pub(crate) fn unknown_filter(input: impl Into<String>, key: &str) -> Self {
        TranslationError::UnknownFilter {
            input: input.into(),
            key: key.to_string(),
        }
    }
}
