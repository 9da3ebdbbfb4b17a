//! Serves a GraphQL API over a Neo4j database.
//!
//! [`GraphqlCypher::new`] builds the schema model from the type definitions
//! and generates the augmented schema once. Every request is then parsed,
//! each root field is translated into a single Cypher statement, run through
//! the [`Driver`] and shaped into the response. Query root fields run
//! concurrently, mutation root fields one after the other, and a failing root
//! field only nulls its own entry.

#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod auth;
mod callback;
pub mod config;
mod constraints;
mod driver;
mod error;
pub mod logging;
mod operation;
mod request;
mod shape;

use futures::future::join_all;
use graphql_cypher_augment::{AugmentedSchema, FieldResolver, RootOperation, SchemaGenerationError};
use graphql_cypher_schema::SchemaModel;
use graphql_cypher_translate::{Authentication, CallbackValues, ResolvedField, TranslationContext};
use indexmap::IndexMap;
use serde_json::{Map, Value};

pub use auth::{AuthError, Authenticator, JwtAuthenticator};
pub use callback::Callback;
pub use config::Config;
pub use driver::{AccessMode, Counters, Driver, DriverError, QueryResult, Record};
pub use error::{Error, RequestError};
pub use graphql_cypher_translate::{cursor, CypherStatement, GlobalId};
pub use request::{GraphqlError, Request, Response};

use operation::{OperationKind, RootTypes};
use shape::Shaper;

/// The outcome of one root field. A failure only nulls that field.
pub type RootFieldResult = Result<Value, Error>;

const DEFAULT_QUERY: &str = "Query";
const DEFAULT_MUTATION: &str = "Mutation";

pub struct GraphqlCypher {
    model: SchemaModel,
    schema: AugmentedSchema,
    driver: Box<dyn Driver>,
    authenticator: Option<Box<dyn Authenticator>>,
    callbacks: IndexMap<String, Box<dyn Callback>>,
}

impl GraphqlCypher {
    pub fn new(type_defs: &str, config: &Config, driver: impl Driver + 'static) -> Result<Self, Error> {
        let model = SchemaModel::from_sdl(type_defs, &config.model_options()).map_err(SchemaGenerationError::from)?;
        let schema = graphql_cypher_augment::augment(&model)?;

        let authenticator = config
            .authorization
            .as_ref()
            .map(|config| Box::new(JwtAuthenticator::new(config)) as Box<dyn Authenticator>);

        Ok(Self {
            model,
            schema,
            driver: Box::new(driver),
            authenticator,
            callbacks: IndexMap::new(),
        })
    }

    /// Replaces the authenticator built from the configuration.
    pub fn with_authenticator(mut self, authenticator: impl Authenticator + 'static) -> Self {
        self.authenticator = Some(Box::new(authenticator));
        self
    }

    /// Registers the callback `@populatedBy(callback: name)` attributes use.
    pub fn with_callback(mut self, name: impl Into<String>, callback: impl Callback + 'static) -> Self {
        self.callbacks.insert(name.into(), Box::new(callback));
        self
    }

    pub fn model(&self) -> &SchemaModel {
        &self.model
    }

    pub fn schema(&self) -> &AugmentedSchema {
        &self.schema
    }

    /// The printed augmented schema.
    pub fn sdl(&self) -> Result<String, Error> {
        Ok(self.schema.sdl()?)
    }

    #[tracing::instrument(skip_all, fields(operation = request.operation_name.as_deref()))]
    pub async fn execute(&self, request: Request) -> Response {
        match self.try_execute(request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!(%error, "request failed");
                Response::from_error(&error)
            }
        }
    }

    async fn try_execute(&self, request: Request) -> Result<Response, Error> {
        let authentication = self.authenticate(request.token.as_deref()).await?;
        let operation = operation::prepare(&self.schema.document, self.root_types(), &request)?;

        let results = match operation.kind {
            OperationKind::Query => {
                let callbacks = CallbackValues::new();

                join_all(
                    operation
                        .fields
                        .iter()
                        .map(|field| self.resolve_root(&operation.root_type, field, &authentication, &callbacks)),
                )
                .await
            }
            OperationKind::Mutation => {
                let callbacks = self.callback_values().await?;
                let mut results = Vec::with_capacity(operation.fields.len());

                for field in &operation.fields {
                    results.push(
                        self.resolve_root(&operation.root_type, field, &authentication, &callbacks)
                            .await,
                    );
                }

                results
            }
        };

        let mut data = Map::new();
        let mut errors = Vec::new();

        for (field, result) in operation.fields.iter().zip(results) {
            let key = field.response_key().to_string();

            match result {
                Ok(value) => {
                    data.insert(key, value);
                }
                Err(error) => {
                    tracing::warn!(field = %key, %error, "root field failed");
                    errors.push(GraphqlError::new(error.to_string()).with_path([key.clone()]));
                    data.insert(key, Value::Null);
                }
            }
        }

        Ok(Response {
            data: Some(Value::Object(data)),
            errors,
        })
    }

    #[tracing::instrument(skip_all, fields(field = field.response_key()))]
    async fn resolve_root(
        &self,
        root_type: &str,
        field: &ResolvedField,
        authentication: &Authentication,
        callbacks: &CallbackValues,
    ) -> RootFieldResult {
        if field.name == "__typename" {
            return Ok(Value::String(root_type.to_string()));
        }

        let resolver =
            self.schema
                .resolvers
                .field(root_type, &field.name)
                .ok_or_else(|| RequestError::UnknownField {
                    type_name: root_type.to_string(),
                    field: field.name.clone(),
                })?;

        let ctx = TranslationContext::new(&self.model, authentication, callbacks);
        let statement = graphql_cypher_translate::translate(ctx, resolver, field)?;

        let result = self.driver.run(&statement, access_mode(resolver)).await?;

        tracing::debug!(records = result.records.len(), "ran root field statement");

        Ok(Shaper::new(&self.schema).root(resolver, root_type, field, result))
    }

    async fn authenticate(&self, token: Option<&str>) -> Result<Authentication, Error> {
        match (token, &self.authenticator) {
            (Some(token), Some(authenticator)) => {
                let claims = authenticator.authenticate(token).await?;
                Ok(Authentication::with_claims(claims))
            }
            (Some(_), None) => {
                tracing::debug!("no authenticator is configured, ignoring the bearer token");
                Ok(Authentication::anonymous())
            }
            (None, _) => Ok(Authentication::anonymous()),
        }
    }

    async fn callback_values(&self) -> Result<CallbackValues, Error> {
        let mut values = CallbackValues::new();

        for (name, callback) in &self.callbacks {
            let value = callback.call().await.map_err(|error| Error::Callback {
                name: name.clone(),
                error,
            })?;

            values.insert(name.clone(), value);
        }

        Ok(values)
    }

    fn root_types(&self) -> RootTypes<'_> {
        match &self.schema.document.root_names {
            Some(names) => RootTypes {
                query: &names.query,
                mutation: names.mutation.as_deref(),
            },
            None => RootTypes {
                query: DEFAULT_QUERY,
                mutation: self.schema.document.contains(DEFAULT_MUTATION).then_some(DEFAULT_MUTATION),
            },
        }
    }
}

fn access_mode(resolver: &FieldResolver) -> AccessMode {
    match resolver {
        FieldResolver::Create { .. }
        | FieldResolver::Update { .. }
        | FieldResolver::Delete { .. }
        | FieldResolver::CustomCypher {
            operation: RootOperation::Mutation,
            ..
        } => AccessMode::Write,
        _ => AccessMode::Read,
    }
}
