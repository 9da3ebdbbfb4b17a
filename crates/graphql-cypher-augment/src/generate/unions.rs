use graphql_cypher_schema::EntityWalker;

use super::{filters, types};
use crate::{
    sdl::{TypeDefinition, TypeKind},
    session::BuildSession,
};

pub(crate) fn generate(session: &mut BuildSession, union: EntityWalker<'_>) {
    let members = union
        .concrete_entities()
        .into_iter()
        .map(|member| member.name().to_string())
        .collect();

    let mut definition = TypeDefinition::new(union.name(), TypeKind::Union(members));
    definition.description = union.get().description().map(str::to_string);
    definition.directives = types::directives(union.get().annotations().user_directives()).collect();

    session.add_type(definition);
    session.add_resolve_type(union.name());

    filters::entity_where(session, union);
}
