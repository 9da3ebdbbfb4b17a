mod capabilities;
mod concrete;
mod filters;
mod finish;
mod fulltext;
mod interfaces;
mod relationships;
mod statics;
mod types;
mod unions;

use graphql_cypher_schema::{EntityKind, SchemaModel};

use crate::session::BuildSession;

/// Generates the types of every entity in declaration order, then runs the
/// passes over the whole document.
pub(crate) fn generate(session: &mut BuildSession, model: &SchemaModel) {
    for entity in model.entities() {
        match entity.kind() {
            EntityKind::Concrete => concrete::generate(session, entity),
            EntityKind::Interface => interfaces::generate(session, entity),
            EntityKind::Union => unions::generate(session, entity),
        }
    }

    finish::finish(session, model);
}
