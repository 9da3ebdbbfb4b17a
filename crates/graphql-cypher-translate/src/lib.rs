//! Translates one resolved root field of the augmented schema into a single
//! parameterized Cypher statement.
//!
//! The statement returns the field value in the `this` column: one row per
//! node for list fields, a single row for aggregates and connections, and no
//! rows at all for deletes, whose counts come from the query statistics.
//! Translation never touches the database; see [`translate`].

#![cfg_attr(test, allow(unused_crate_dependencies))]

mod context;
pub mod cursor;
mod custom_cypher;
mod error;
mod filter;
mod fulltext;
mod global_id;
mod global_node;
mod options;
mod pattern;
mod projection;
mod read;
mod resolve_tree;
mod value;
mod write;

pub use context::{Authentication, CallbackValues, TranslationContext};
pub use cypher_ast::CypherStatement;
pub use error::TranslationError;
pub use global_id::GlobalId;
pub use projection::RESOLVE_TYPE;
pub use resolve_tree::ResolvedField;

use graphql_cypher_augment::FieldResolver;

/// Builds the statement of a root field. Nested resolvers are part of the
/// statement of their root field and cannot be translated alone.
pub fn translate(
    mut ctx: TranslationContext<'_>,
    resolver: &FieldResolver,
    field: &ResolvedField,
) -> Result<CypherStatement, TranslationError> {
    let model = ctx.model();

    let query = match resolver {
        FieldResolver::Read { entity } => read::read(&mut ctx, model.walk(*entity), field)?,
        FieldResolver::Aggregate { entity } => read::aggregate(&mut ctx, model.walk(*entity), field)?,
        FieldResolver::Connection { entity } => read::connection(&mut ctx, model.walk(*entity), field)?,
        FieldResolver::Fulltext { entity, index } => fulltext::fulltext(&mut ctx, model.walk(*entity), index, field)?,
        FieldResolver::Create { entity } => write::create(&mut ctx, model.walk(*entity), field)?,
        FieldResolver::Update { entity } => write::update(&mut ctx, model.walk(*entity), field)?,
        FieldResolver::Delete { entity } => write::delete(&mut ctx, model.walk(*entity), field)?,
        FieldResolver::CustomCypher { operation, field: name } => {
            custom_cypher::custom_cypher(&mut ctx, *operation, name, field)?
        }
        FieldResolver::GlobalNode => global_node::global_node(&mut ctx, field)?,
        FieldResolver::GlobalId { .. }
        | FieldResolver::Numerical
        | FieldResolver::ConnectionField { .. }
        | FieldResolver::CypherField { .. } => {
            return Err(TranslationError::NotARootField {
                field: field.name.clone(),
            })
        }
    };

    let statement = ctx.render(&query);

    tracing::debug!(
        field = field.response_key(),
        params = statement.params.len(),
        cypher = %statement.cypher,
        "translated root field"
    );

    Ok(statement)
}
