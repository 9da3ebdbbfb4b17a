use graphql_cypher_schema::{Attribute, EntityField, EntityWalker, MutationOperation, ScalarKind};

use super::{
    capabilities::{entity_has, NestedInput},
    filters, fulltext, relationships, statics, types,
};
use crate::{
    resolvers::FieldResolver,
    sdl::{list_of, required, Field, InputValue},
    session::BuildSession,
};

/// Every type and root field of one concrete entity.
pub(crate) fn generate(session: &mut BuildSession, entity: EntityWalker<'_>) {
    object_type(session, entity);

    filters::options_input(session, entity.names(), entity.attributes());
    aggregate_selection(session, entity);
    filters::entity_where(session, entity);
    fulltext::generate(session, entity);
    unique_inputs(session, entity);
    create_input(session, entity);
    update_input(session, entity);
    nested_inputs(session, entity);
    connect_where(session, entity);
    responses(session, entity);

    for relationship in entity.relationships() {
        relationships::generate(session, relationship);
    }

    query_fields(session, entity);
    mutation_fields(session, entity);
}

fn attribute_resolver(entity: EntityWalker<'_>, attribute: &Attribute) -> Option<FieldResolver> {
    if attribute.is_cypher() {
        return Some(FieldResolver::CypherField {
            entity: entity.id(),
            attribute: attribute.name().to_string(),
        });
    }

    matches!(attribute.scalar(), Some(ScalarKind::Int | ScalarKind::BigInt)).then_some(FieldResolver::Numerical)
}

fn object_type(session: &mut BuildSession, entity: EntityWalker<'_>) {
    let mut fields: Vec<(Field, Option<FieldResolver>)> = Vec::new();

    if entity.is_global_node() {
        fields.push((
            Field::new("id", "ID!"),
            Some(FieldResolver::GlobalId { entity: entity.id() }),
        ));
    }

    for field in entity.fields() {
        match field {
            EntityField::Attribute(attribute) if attribute.is_readable() => {
                types::note_usage(session, attribute);
                fields.push((types::attribute_field(attribute), attribute_resolver(entity, attribute)));
            }
            EntityField::Attribute(_) => (),
            EntityField::Relationship(relationship) if relationship.get().is_readable() => {
                fields.extend(relationships::object_fields(session, relationship));
            }
            EntityField::Relationship(_) => (),
        }
    }

    session.add_object_type(entity.name(), |object| {
        object.describe(entity.get().description());

        for directive in types::directives(entity.get().annotations().user_directives()) {
            object.push_directive(directive);
        }

        if entity.is_global_node() {
            object.implements(statics::NODE_INTERFACE);
        }

        for interface in entity.interfaces() {
            object.implements(interface.name());
        }

        for (field, resolver) in fields {
            match resolver {
                Some(resolver) => object.push_resolved_field(field, resolver),
                None => object.push_field(field),
            }
        }
    });
}

fn aggregate_selection(session: &mut BuildSession, entity: EntityWalker<'_>) {
    if !entity.get().is_root_aggregable() {
        return;
    }

    let fields: Vec<_> = entity
        .attributes()
        .filter(|attribute| attribute.is_aggregate_selectable())
        .filter_map(|attribute| {
            let selection = statics::aggregate_selection(session, attribute.scalar()?)?;
            Some(Field::new(attribute.name(), required(&selection)))
        })
        .collect();

    session.add_object_type(&entity.names().aggregate_selection(), |selection| {
        selection.push_field(Field::new("count", "Int!"));

        for field in fields {
            selection.push_field(field);
        }
    });
}

/// The inputs matching one node by a unique attribute, used by connectOrCreate.
fn unique_inputs(session: &mut BuildSession, entity: EntityWalker<'_>) {
    let names = entity.names();
    let unique: Vec<_> = entity.get().unique_attributes().collect();

    if unique.is_empty() {
        return;
    }

    session.add_input_type(&names.unique_where_input(), |input| {
        for attribute in &unique {
            input.push_field(InputValue::new(
                attribute.name(),
                attribute.ty().render_with(types::input_name(attribute), true),
            ));
        }
    });

    session.add_input_type(&names.connect_or_create_where_input(), |input| {
        input.push_field(InputValue::new("node", required(&names.unique_where_input())));
    });

    let fields: Vec<_> = entity
        .attributes()
        .filter(|attribute| attribute.is_creatable())
        .map(|attribute| types::create_input_field(session, attribute))
        .collect();

    session.add_required_input_type(&names.on_create_input(), |input| {
        for field in fields {
            input.push_field(field);
        }
    });
}

fn create_input(session: &mut BuildSession, entity: EntityWalker<'_>) {
    let mut fields = Vec::new();

    for field in entity.fields() {
        match field {
            EntityField::Attribute(attribute) if attribute.is_creatable() => {
                fields.push(types::create_input_field(session, attribute));
            }
            EntityField::Attribute(_) => (),
            EntityField::Relationship(relationship) => fields.extend(relationships::create_input_field(relationship)),
        }
    }

    session.add_required_input_type(&entity.names().create_input(), |input| {
        for field in fields {
            input.push_field(field);
        }
    });
}

fn update_input(session: &mut BuildSession, entity: EntityWalker<'_>) {
    let mut fields = Vec::new();

    for field in entity.fields() {
        match field {
            EntityField::Attribute(attribute) if attribute.is_updatable() => {
                fields.extend(types::update_input_fields(session, attribute));
            }
            EntityField::Attribute(_) => (),
            EntityField::Relationship(relationship) => fields.extend(relationships::update_input_field(relationship)),
        }
    }

    session.add_required_input_type(&entity.names().update_input(), |input| {
        for field in fields {
            input.push_field(field);
        }
    });
}

/// The input of one nested operation: a field per relationship supporting it.
pub(crate) fn nested_input_fields(entity: EntityWalker<'_>, input: NestedInput) -> Vec<InputValue> {
    entity
        .relationships()
        .filter_map(|relationship| relationships::nested_input_field(relationship, input))
        .collect()
}

fn nested_inputs(session: &mut BuildSession, entity: EntityWalker<'_>) {
    let names = entity.names();

    let inputs = [
        (NestedInput::Connect, names.connect_input()),
        (NestedInput::Disconnect, names.disconnect_input()),
        (NestedInput::Delete, names.delete_input()),
        (NestedInput::Create, names.relation_input()),
        (NestedInput::ConnectOrCreate, names.connect_or_create_input()),
    ];

    for (input, name) in inputs {
        let fields = nested_input_fields(entity, input);

        session.add_input_type(&name, |builder| {
            for field in fields {
                builder.push_field(field);
            }
        });
    }
}

/// `<Entity>ConnectWhere`, shared by concrete and interface entities.
pub(crate) fn connect_where(session: &mut BuildSession, entity: EntityWalker<'_>) {
    let names = entity.names();

    session.add_input_type(&names.connect_where_input(), |input| {
        input.push_field(InputValue::new("node", required(&names.where_input())));
    });
}

fn responses(session: &mut BuildSession, entity: EntityWalker<'_>) {
    let names = entity.names();
    let nodes = required(&list_of(entity.name()));

    if entity.get().allows(MutationOperation::Create) {
        let info = statics::create_info(session);

        session.add_object_type(&names.create_response(), |response| {
            response.push_field(Field::new("info", required(info)));
            response.push_field(Field::new(names.plural(), nodes.as_str()));
        });
    }

    if entity.get().allows(MutationOperation::Update) {
        let info = statics::update_info(session);

        session.add_object_type(&names.update_response(), |response| {
            response.push_field(Field::new("info", required(info)));
            response.push_field(Field::new(names.plural(), nodes.as_str()));
        });
    }
}

fn query_fields(session: &mut BuildSession, entity: EntityWalker<'_>) {
    let names = entity.names();
    let definition = entity.get();

    if !definition.is_readable() {
        tracing::warn!(entity = entity.name(), "skipping the root read fields, reads are disabled");
    } else {
        session.add_query_field(
            Field::new(names.read_field(), required(&list_of(entity.name())))
                .with_argument(InputValue::new("where", names.where_input()))
                .with_argument(InputValue::new("options", names.options_input())),
            FieldResolver::Read { entity: entity.id() },
        );

        let page_info = statics::page_info(session);

        session.add_object_type(&names.edge_type(), |edge| {
            edge.push_field(Field::new("cursor", "String!"));
            edge.push_field(Field::new("node", required(entity.name())));
        });

        session.add_object_type(&names.connection_type(), |connection| {
            connection.push_field(Field::new("edges", required(&list_of(&names.edge_type()))));
            connection.push_field(Field::new("totalCount", "Int!"));
            connection.push_field(Field::new("pageInfo", required(page_info)));
        });

        let mut connection = Field::new(names.connection_field(), required(&names.connection_type()))
            .with_argument(InputValue::new("first", "Int"))
            .with_argument(InputValue::new("after", "String"))
            .with_argument(InputValue::new("where", names.where_input()));

        if filters::has_sort(entity.attributes()) {
            connection = connection.with_argument(InputValue::new("sort", list_of(&names.sort_input())));
        }

        session.add_query_field(connection, FieldResolver::Connection { entity: entity.id() });
    }

    if definition.is_root_aggregable() {
        session.add_query_field(
            Field::new(names.aggregate_field(), required(&names.aggregate_selection()))
                .with_argument(InputValue::new("where", names.where_input())),
            FieldResolver::Aggregate { entity: entity.id() },
        );
    }
}

fn mutation_fields(session: &mut BuildSession, entity: EntityWalker<'_>) {
    let names = entity.names();
    let definition = entity.get();

    if definition.allows(MutationOperation::Create) {
        session.add_mutation_field(
            Field::new(names.create_field(), required(&names.create_response()))
                .with_argument(InputValue::new("input", required(&list_of(&names.create_input())))),
            FieldResolver::Create { entity: entity.id() },
        );
    }

    if definition.allows(MutationOperation::Update) {
        let mut field = Field::new(names.update_field(), required(&names.update_response()))
            .with_argument(InputValue::new("where", names.where_input()))
            .with_argument(InputValue::new("update", names.update_input()));

        let nested = [
            ("connect", NestedInput::Connect, names.connect_input()),
            ("disconnect", NestedInput::Disconnect, names.disconnect_input()),
            ("create", NestedInput::Create, names.relation_input()),
            ("delete", NestedInput::Delete, names.delete_input()),
            ("connectOrCreate", NestedInput::ConnectOrCreate, names.connect_or_create_input()),
        ];

        for (argument, input, ty) in nested {
            if entity_has(entity, input) {
                field = field.with_argument(InputValue::new(argument, ty));
            }
        }

        session.add_mutation_field(field, FieldResolver::Update { entity: entity.id() });
    }

    if definition.allows(MutationOperation::Delete) {
        let info = statics::delete_info(session);
        let mut field = Field::new(names.delete_field(), required(info))
            .with_argument(InputValue::new("where", names.where_input()));

        if entity_has(entity, NestedInput::Delete) {
            field = field.with_argument(InputValue::new("delete", names.delete_input()));
        }

        session.add_mutation_field(field, FieldResolver::Delete { entity: entity.id() });
    }
}
