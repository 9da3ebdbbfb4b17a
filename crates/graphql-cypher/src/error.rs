use graphql_cypher_augment::SchemaGenerationError;
use graphql_cypher_translate::TranslationError;

use crate::{auth::AuthError, config::ConfigError, driver::DriverError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Schema(#[from] SchemaGenerationError),
    #[error(transparent)]
    Translation(#[from] TranslationError),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("The populatedBy callback {name} failed: {error}")]
    Callback { name: String, error: anyhow::Error },
}

/// Problems with the operation document or its variables, found before any
/// field is translated.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RequestError {
    #[error("{0}")]
    Parse(String),
    #[error(r#"Unknown operation named "{0}""#)]
    UnknownOperation(String),
    #[error("Operation name required in request.")]
    OperationNameRequired,
    #[error("Subscriptions are not supported.")]
    Subscription,
    #[error("Schema is not configured for mutations.")]
    NoMutations,
    #[error(r#"Unknown fragment "{0}""#)]
    UnknownFragment(String),
    #[error(r#"Fragment "{0}" spreads itself"#)]
    FragmentCycle(String),
    #[error("Variable ${name} is invalid: {message}")]
    InvalidVariable { name: String, message: String },
    #[error("Invalid value for {argument}: {message}")]
    InvalidValue { argument: String, message: String },
    #[error("Field {field} does not exist on {type_name}")]
    UnknownField { type_name: String, field: String },
}
