//! Passes over the whole document once every entity is generated.

use graphql_cypher_schema::{ScalarKind, SchemaModel, UserDirective};

use super::{statics, types};
use crate::{
    resolvers::{FieldResolver, RootOperation},
    sdl::{self, EnumValue, Field, InputObjectType, InputValue, TypeDefinition, TypeKind},
    session::BuildSession,
};

/// (type, field, reason)
const DEPRECATIONS: &[(&str, &str, &str)] = &[
    (
        statics::CREATE_INFO,
        "bookmark",
        "This field has been deprecated because bookmarks are now handled by the driver.",
    ),
    (
        statics::UPDATE_INFO,
        "bookmark",
        "This field has been deprecated because bookmarks are now handled by the driver.",
    ),
    (
        statics::DELETE_INFO,
        "bookmark",
        "This field has been deprecated because bookmarks are now handled by the driver.",
    ),
];

const SHAREABLE_TYPES: &[&str] = &[
    statics::CREATE_INFO,
    statics::UPDATE_INFO,
    statics::DELETE_INFO,
    statics::PAGE_INFO,
];

const TEMPORAL_SCALARS: [ScalarKind; 7] = [
    ScalarKind::BigInt,
    ScalarKind::DateTime,
    ScalarKind::LocalDateTime,
    ScalarKind::Date,
    ScalarKind::Time,
    ScalarKind::LocalTime,
    ScalarKind::Duration,
];

pub(crate) fn finish(session: &mut BuildSession, model: &SchemaModel) {
    user_definitions(session, model);

    // Unreferenced ones are pruned with the other unused types.
    for kind in TEMPORAL_SCALARS {
        if let Some(definition) = statics::scalar_definition(kind) {
            session.get_or_create(kind.name(), || definition);
        }
    }

    custom_root_fields(session, model);
    statics::add_helper_types(session);
    global_nodes(session, model);
    deprecations(session);

    if model.is_federation() {
        shareable(session, model.schema_directives());
    }

    session.document_mut().schema_directives = model.schema_directives().iter().map(ToString::to_string).collect();
}

/// Enums, scalars, inputs and directive definitions copied as written.
fn user_definitions(session: &mut BuildSession, model: &SchemaModel) {
    for definition in model.enums() {
        let values = definition
            .values
            .iter()
            .map(|value| {
                let mut enum_value = EnumValue::new(&value.name);
                enum_value.description = value.description.clone();
                enum_value.directives = types::directives(&value.directives).collect();
                enum_value
            })
            .collect();

        let mut enum_type = TypeDefinition::new(&definition.name, TypeKind::Enum(values));
        enum_type.description = definition.description.clone();
        enum_type.directives = types::directives(&definition.directives).collect();

        session.add_type(enum_type);
    }

    for definition in model.scalars() {
        let mut scalar = TypeDefinition::new(&definition.name, TypeKind::Scalar);
        scalar.description = definition.description.clone();
        scalar.directives = types::directives(&definition.directives).collect();

        session.add_type(scalar);
    }

    for definition in model.inputs() {
        let fields = definition
            .fields
            .iter()
            .map(|field| (field.name.clone(), types::argument(field)))
            .collect();

        let mut input = TypeDefinition::new(&definition.name, TypeKind::InputObject(InputObjectType { fields }));
        input.description = definition.description.clone();
        input.directives = types::directives(&definition.directives).collect();

        session.add_type(input);
    }

    for definition in model.directive_definitions() {
        session.document_mut().directives.push(sdl::DirectiveDefinition {
            name: definition.name.clone(),
            description: definition.description.clone(),
            arguments: definition.arguments.iter().map(types::argument).collect(),
            repeatable: definition.repeatable,
            locations: definition.locations.clone(),
        });
    }
}

/// The `Node` interface and `node(id:)` when any entity has a global id.
fn global_nodes(session: &mut BuildSession, model: &SchemaModel) {
    if model.global_nodes().next().is_none() {
        return;
    }

    session.get_or_create(statics::NODE_INTERFACE, statics::node_interface);
    session.add_resolve_type(statics::NODE_INTERFACE);

    session.add_query_field(
        Field::new("node", statics::NODE_INTERFACE)
            .with_description(Some("Fetches an object given its ID"))
            .with_argument(InputValue::new("id", "ID!").with_description(Some("The ID of an object"))),
        FieldResolver::GlobalNode,
    );
}

fn deprecations(session: &mut BuildSession) {
    for (type_name, field, reason) in DEPRECATIONS {
        session.modify_type(type_name, |definition| {
            if let TypeKind::Object(object) = &mut definition.kind {
                if let Some(field) = object.fields.get_mut(*field) {
                    field.directives.push(format!("@deprecated(reason: {})", sdl::quoted(reason)));
                }
            }
        });
    }
}

/// The name federation resolves `@shareable` to: imported directives keep
/// their own name, the others get the `federation__` prefix.
fn shareable_directive(schema_directives: &[UserDirective]) -> &'static str {
    let imported = schema_directives
        .iter()
        .filter(|directive| directive.name == "link")
        .flat_map(|directive| directive.arguments.iter())
        .any(|(name, value)| name == "import" && value.contains("\"@shareable\""));

    if imported {
        "@shareable"
    } else {
        "@federation__shareable"
    }
}

fn shareable(session: &mut BuildSession, schema_directives: &[UserDirective]) {
    let directive = shareable_directive(schema_directives);

    for type_name in SHAREABLE_TYPES {
        session.modify_type(type_name, |definition| definition.directives.push(directive.to_string()));
    }
}

/// The user's own Query and Mutation fields. `@cypher` ones replace any
/// generated field of the same name, the others keep the caller's resolvers.
fn custom_root_fields(session: &mut BuildSession, model: &SchemaModel) {
    let operations = model.operations();

    for (operation, root) in [
        (RootOperation::Query, &operations.query),
        (RootOperation::Mutation, &operations.mutation),
    ] {
        let root_name = session.root_name(operation).to_string();

        for directive in types::directives(root.directives()) {
            session.modify_type(&root_name, |definition| definition.directives.push(directive));
        }

        for attribute in root.fields() {
            types::note_usage(session, attribute);

            let resolver = attribute.is_cypher().then(|| FieldResolver::CustomCypher {
                operation,
                field: attribute.name().to_string(),
            });

            session.add_root_field(operation, types::attribute_field(attribute), resolver);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shareable_follows_the_link_imports() {
        let link = |import: &str| UserDirective {
            name: String::from("link"),
            arguments: vec![
                (
                    String::from("url"),
                    String::from("\"https://specs.apollo.dev/federation/v2.0\""),
                ),
                (String::from("import"), import.to_string()),
            ],
        };

        assert_eq!(shareable_directive(&[link(r#"["@key", "@shareable"]"#)]), "@shareable");
        assert_eq!(shareable_directive(&[link(r#"["@key"]"#)]), "@federation__shareable");
    }
}
