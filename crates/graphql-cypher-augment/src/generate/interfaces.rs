//! Interfaces expose their attributes only. Relationship fields declared on an
//! interface are read through the implementations, whose argument and result
//! types differ, but the filter and write inputs are generated under the
//! interface's own name.

use graphql_cypher_schema::{EntityField, EntityWalker};

use super::{
    capabilities::{entity_has, NestedInput},
    concrete, filters, relationships, types,
};
use crate::{
    resolvers::FieldResolver,
    sdl::{list_of, required, Field, InputValue},
    session::BuildSession,
};

pub(crate) fn generate(session: &mut BuildSession, interface: EntityWalker<'_>) {
    let names = interface.names();
    let definition = interface.get();

    for attribute in interface.attributes() {
        types::note_usage(session, attribute);
    }

    session.add_interface_type(interface.name(), |object| {
        object.describe(definition.description());

        for directive in types::directives(definition.annotations().user_directives()) {
            object.push_directive(directive);
        }

        for attribute in interface.attributes().filter(|attribute| attribute.is_readable()) {
            object.push_field(types::attribute_field(attribute));
        }
    });

    session.add_resolve_type(interface.name());

    filters::options_input(session, names, interface.attributes());
    filters::entity_where(session, interface);

    session.add_input_type(&names.create_input(), |input| {
        for implementation in interface.concrete_entities() {
            input.push_field(InputValue::new(
                implementation.name(),
                implementation.names().create_input(),
            ));
        }
    });

    update_input(session, interface);
    concrete::connect_where(session, interface);

    let nested = [
        (
            NestedInput::Connect,
            names.connect_input(),
            names.implementations_connect_input(),
        ),
        (
            NestedInput::Disconnect,
            names.disconnect_input(),
            names.implementations_disconnect_input(),
        ),
        (
            NestedInput::Delete,
            names.delete_input(),
            names.implementations_delete_input(),
        ),
    ];

    for (input, name, implementations_name) in nested {
        nested_input(session, interface, input, &name, &implementations_name);
    }

    for relationship in interface.relationships() {
        relationships::generate(session, relationship);
    }

    if definition.is_readable() {
        session.add_query_field(
            Field::new(names.read_field(), required(&list_of(interface.name())))
                .with_argument(InputValue::new("where", names.where_input()))
                .with_argument(InputValue::new("options", names.options_input())),
            FieldResolver::Read { entity: interface.id() },
        );
    }
}

fn update_input(session: &mut BuildSession, interface: EntityWalker<'_>) {
    let names = interface.names();
    let mut fields = Vec::new();

    for field in interface.fields() {
        match field {
            EntityField::Attribute(attribute) if attribute.is_updatable() => {
                fields.extend(types::update_input_fields(session, attribute));
            }
            EntityField::Attribute(_) => (),
            EntityField::Relationship(relationship) => fields.extend(relationships::update_input_field(relationship)),
        }
    }

    let implementations = names.implementations_update_input();

    let has_implementations = session.add_input_type(&implementations, |input| {
        for implementation in interface.concrete_entities() {
            input.push_field(InputValue::new(
                implementation.name(),
                implementation.names().update_input(),
            ));
        }
    });

    if has_implementations {
        fields.push(InputValue::new("_on", implementations));
    }

    session.add_required_input_type(&names.update_input(), |input| {
        for field in fields {
            input.push_field(field);
        }
    });
}

/// `<Interface>ConnectInput` and friends: the interface's own relationships plus
/// `_on` with the implementations that have the input.
fn nested_input(
    session: &mut BuildSession,
    interface: EntityWalker<'_>,
    input: NestedInput,
    name: &str,
    implementations_name: &str,
) {
    let mut fields = concrete::nested_input_fields(interface, input);

    let implementations: Vec<_> = interface
        .concrete_entities()
        .into_iter()
        .filter(|implementation| entity_has(*implementation, input))
        .collect();

    let has_implementations = session.add_input_type(implementations_name, |builder| {
        for implementation in implementations {
            let ty = match input {
                NestedInput::Connect => implementation.names().connect_input(),
                NestedInput::Disconnect => implementation.names().disconnect_input(),
                _ => implementation.names().delete_input(),
            };

            builder.push_field(InputValue::new(implementation.name(), list_of(&ty)));
        }
    });

    if has_implementations {
        fields.push(InputValue::new("_on", implementations_name));
    }

    session.add_input_type(name, |builder| {
        for field in fields {
            builder.push_field(field);
        }
    });
}
