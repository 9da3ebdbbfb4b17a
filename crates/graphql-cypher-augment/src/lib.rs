//! Turns a [`SchemaModel`] into the full GraphQL schema served to clients: the
//! object types, every filter, sort and write input, the root fields, and a
//! map telling which resolver each generated field needs.

#![cfg_attr(test, allow(unused_crate_dependencies))]

mod error;
mod generate;
pub mod resolvers;
pub mod sdl;
mod session;

use graphql_cypher_schema::SchemaModel;

pub use error::SchemaGenerationError;
pub use resolvers::{FieldResolver, ResolverMap, RootOperation};
pub use sdl::Document;

use sdl::RootNames;
use session::BuildSession;

const DEFAULT_QUERY: &str = "Query";
const DEFAULT_MUTATION: &str = "Mutation";

#[derive(Debug, Clone)]
pub struct AugmentedSchema {
    pub document: Document,
    pub resolvers: ResolverMap,
}

impl AugmentedSchema {
    pub fn sdl(&self) -> Result<String, SchemaGenerationError> {
        sdl::render_sdl(&self.document).map_err(|_| SchemaGenerationError::Render)
    }
}

pub fn augment(model: &SchemaModel) -> Result<AugmentedSchema, SchemaGenerationError> {
    let operations = model.operations();
    let query = operations.query.name();
    let mutation = operations.mutation.name();

    let mut session = BuildSession::new(query, mutation);
    generate::generate(&mut session, model);

    let (mut document, resolvers) = session.finish()?;

    if query != DEFAULT_QUERY || mutation != DEFAULT_MUTATION {
        document.root_names = Some(RootNames {
            query: query.to_string(),
            mutation: document.contains(mutation).then(|| mutation.to_string()),
        });
    }

    tracing::info!(
        entities = model.entities().len(),
        types = document.types().len(),
        "generated the augmented schema"
    );

    Ok(AugmentedSchema { document, resolvers })
}
