//! The types of one relationship field: its connection output, its filter
//! inputs and the nested write inputs. A union target gets one set of inputs
//! per member, grouped by container inputs keyed by member name.

use graphql_cypher_schema::{
    annotation::NestedOperation,
    filter_keys::{AggregateWhereKey, LogicalOperator},
    EntityKind, EntityWalker, PropertiesWalker, RelationshipNames, RelationshipWalker,
};

use super::{
    capabilities::{
        can_connect_or_create, entity_has, has_field_input, has_update_field_input, relationship_has, NestedInput,
    },
    filters, statics, types,
};
use crate::{
    resolvers::FieldResolver,
    sdl::{list_of, required, Field, InputValue},
    session::{BuildSession, InputTypeBuilder},
};

/// The relationship towards one concrete or interface target.
struct Branch<'a> {
    names: RelationshipNames,
    target: EntityWalker<'a>,
}

fn branches(relationship: RelationshipWalker<'_>) -> Vec<Branch<'_>> {
    let names = relationship.names();
    let target = relationship.target();

    match target.kind() {
        EntityKind::Union => target
            .concrete_entities()
            .into_iter()
            .map(|member| Branch {
                names: names.member(member.name()),
                target: member,
            })
            .collect(),
        EntityKind::Concrete | EntityKind::Interface => vec![Branch { names, target }],
    }
}

fn targets_union(relationship: RelationshipWalker<'_>) -> bool {
    relationship.target().kind() == EntityKind::Union
}

/// The wrapper of nested inputs: a list for list relationships.
fn wrap(relationship: RelationshipWalker<'_>, name: &str) -> String {
    if relationship.get().is_list() {
        list_of(name)
    } else {
        name.to_string()
    }
}

fn has_readable_properties(properties: PropertiesWalker<'_>) -> bool {
    properties.get().attributes().any(|attribute| attribute.is_readable())
}

/// The edge input of creates, required when a required attribute has no default.
fn edge_create_input(properties: PropertiesWalker<'_>) -> Option<String> {
    let mut creatable = properties.get().attributes().filter(|attribute| attribute.is_creatable()).peekable();

    creatable.peek()?;

    let name = properties.names().create_input();
    let needs_value = creatable.any(|attribute| attribute.is_required() && attribute.default_value().is_none());

    Some(if needs_value { required(&name) } else { name })
}

fn edge_update_input(properties: PropertiesWalker<'_>) -> Option<String> {
    properties
        .get()
        .attributes()
        .any(|attribute| attribute.is_updatable())
        .then(|| properties.names().update_input())
}

fn has_connection_sort(relationship: RelationshipWalker<'_>) -> bool {
    !targets_union(relationship)
        && (filters::has_sort(relationship.target().attributes())
            || relationship
                .properties()
                .is_some_and(|properties| filters::has_sort(properties.get().attributes())))
}

fn directives(relationship: RelationshipWalker<'_>) -> impl Iterator<Item = String> + '_ {
    types::directives(relationship.get().annotations().user_directives())
}

/// Generates everything the relationship needs except the fields on its source.
pub(crate) fn generate(session: &mut BuildSession, relationship: RelationshipWalker<'_>) {
    if let Some(properties) = relationship.properties() {
        properties_types(session, properties);
    }

    if relationship.source().kind() == EntityKind::Concrete {
        output_types(session, relationship);
    }

    filter_inputs(session, relationship);

    for branch in branches(relationship) {
        write_inputs(session, relationship, &branch);
    }

    if targets_union(relationship) {
        union_containers(session, relationship);
    }
}

/// The types of a `@relationshipProperties` type, once however many
/// relationships use it.
fn properties_types(session: &mut BuildSession, properties: PropertiesWalker<'_>) {
    if !session.first_use(&format!("properties:{}", properties.name())) {
        return;
    }

    let names = properties.names();
    let definition = properties.get();

    if has_readable_properties(properties) {
        for attribute in definition.attributes() {
            types::note_usage(session, attribute);
        }

        session.add_object_type(properties.name(), |object| {
            object.describe(definition.description());

            for attribute in definition.attributes().filter(|attribute| attribute.is_readable()) {
                object.push_field(types::attribute_field(attribute));
            }
        });
    }

    filters::sort_input(session, &names.sort_input(), definition.attributes());
    filters::properties_where(session, properties);

    let create_fields: Vec<_> = definition
        .attributes()
        .filter(|attribute| attribute.is_creatable())
        .map(|attribute| types::create_input_field(session, attribute))
        .collect();

    session.add_input_type(&names.create_input(), |input| {
        for field in create_fields {
            input.push_field(field);
        }
    });

    let update_fields: Vec<_> = definition
        .attributes()
        .filter(|attribute| attribute.is_updatable())
        .flat_map(|attribute| types::update_input_fields(session, attribute))
        .collect();

    session.add_input_type(&names.update_input(), |input| {
        for field in update_fields {
            input.push_field(field);
        }
    });
}

fn output_types(session: &mut BuildSession, relationship: RelationshipWalker<'_>) {
    let names = relationship.names();
    let target = relationship.target();
    let properties = relationship
        .properties()
        .filter(|properties| has_readable_properties(*properties));

    let page_info = statics::page_info(session);

    session.add_object_type(&names.relationship_type(), |edge| {
        edge.push_field(Field::new("cursor", "String!"));
        edge.push_field(Field::new("node", required(target.name())));

        if let Some(properties) = properties {
            edge.push_field(Field::new("properties", required(properties.name())));
        }
    });

    session.add_object_type(&names.connection_type(), |connection| {
        connection.push_field(Field::new("edges", required(&list_of(&names.relationship_type()))));
        connection.push_field(Field::new("totalCount", "Int!"));
        connection.push_field(Field::new("pageInfo", required(page_info)));
    });

    if !is_aggregate_selectable(relationship) {
        return;
    }

    let node_fields: Vec<_> = target
        .attributes()
        .filter(|attribute| attribute.is_aggregate_selectable())
        .filter_map(|attribute| {
            let selection = statics::aggregate_selection(session, attribute.scalar()?)?;
            Some(Field::new(attribute.name(), required(&selection)))
        })
        .collect();

    let edge_fields: Vec<_> = relationship
        .properties()
        .into_iter()
        .flat_map(|properties| properties.get().attributes())
        .filter(|attribute| attribute.is_aggregate_selectable())
        .filter_map(|attribute| {
            let selection = statics::aggregate_selection(session, attribute.scalar()?)?;
            Some(Field::new(attribute.name(), required(&selection)))
        })
        .collect();

    let has_node = !node_fields.is_empty();
    let has_edge = !edge_fields.is_empty();

    if has_node {
        session.add_object_type(&names.node_aggregate_selection(), |selection| {
            for field in node_fields {
                selection.push_field(field);
            }
        });
    }

    if has_edge {
        session.add_object_type(&names.edge_aggregate_selection(), |selection| {
            for field in edge_fields {
                selection.push_field(field);
            }
        });
    }

    session.add_object_type(&names.aggregation_selection(), |selection| {
        selection.push_field(Field::new("count", "Int!"));

        if has_node {
            selection.push_field(Field::new("node", names.node_aggregate_selection()));
        }

        if has_edge {
            selection.push_field(Field::new("edge", names.edge_aggregate_selection()));
        }
    });
}

fn is_aggregate_selectable(relationship: RelationshipWalker<'_>) -> bool {
    relationship.get().is_aggregable() && relationship.target().kind() == EntityKind::Concrete
}

/// The fields of the relationship on its source object type: the field itself,
/// its aggregate and its connection.
pub(crate) fn object_fields(
    session: &mut BuildSession,
    relationship: RelationshipWalker<'_>,
) -> Vec<(Field, Option<FieldResolver>)> {
    let names = relationship.names();
    let target = relationship.target();
    let definition = relationship.get();

    let options = match target.kind() {
        EntityKind::Union => statics::query_options(session).to_string(),
        EntityKind::Concrete | EntityKind::Interface => target.names().options_input(),
    };

    let mut fields = vec![(
        Field::new(relationship.name(), types::relationship_type(relationship))
            .with_description(definition.description())
            .with_argument(InputValue::new("where", target.names().where_input()))
            .with_argument(InputValue::new("options", options))
            .with_directives(directives(relationship)),
        None,
    )];

    if is_aggregate_selectable(relationship) {
        fields.push((
            Field::new(names.aggregate_field(), names.aggregation_selection())
                .with_argument(InputValue::new("where", target.names().where_input()))
                .with_directives(directives(relationship)),
            None,
        ));
    }

    let mut connection = Field::new(names.connection_field(), required(&names.connection_type()))
        .with_argument(InputValue::new("where", names.connection_where_input()))
        .with_argument(InputValue::new("first", "Int"))
        .with_argument(InputValue::new("after", "String"));

    if has_connection_sort(relationship) {
        connection = connection.with_argument(InputValue::new("sort", list_of(&names.connection_sort_input())));
    }

    fields.push((
        connection.with_directives(directives(relationship)),
        Some(FieldResolver::ConnectionField {
            relationship: relationship.id(),
        }),
    ));

    fields
}

fn push_logical(input: &mut InputTypeBuilder, name: &str) {
    for operator in LogicalOperator::ALL {
        let ty = match operator {
            LogicalOperator::Not => name.to_string(),
            LogicalOperator::And | LogicalOperator::Or => list_of(name),
        };

        input.push_field(InputValue::new(operator.key(), ty));
    }
}

fn filter_inputs(session: &mut BuildSession, relationship: RelationshipWalker<'_>) {
    let names = relationship.names();
    let edge_where = relationship
        .properties()
        .map(|properties| properties.names().where_input());

    for branch in branches(relationship) {
        let name = branch.names.connection_where_input();

        session.add_input_type(&name, |input| {
            push_logical(input, &name);
            input.push_field(InputValue::new("node", branch.target.names().where_input()));

            if let Some(edge_where) = &edge_where {
                input.push_field(InputValue::new("edge", edge_where.as_str()));
            }
        });
    }

    if targets_union(relationship) {
        session.add_input_type(&names.connection_where_input(), |input| {
            for branch in branches(relationship) {
                input.push_field(InputValue::new(
                    branch.target.name(),
                    branch.names.connection_where_input(),
                ));
            }
        });
    }

    if has_connection_sort(relationship) {
        let target = relationship.target();
        let node_sort = filters::has_sort(target.attributes()).then(|| target.names().sort_input());
        let edge_sort = relationship
            .properties()
            .filter(|properties| filters::has_sort(properties.get().attributes()))
            .map(|properties| properties.names().sort_input());

        session.add_input_type(&names.connection_sort_input(), |input| {
            if let Some(node_sort) = node_sort {
                input.push_field(InputValue::new("node", node_sort));
            }

            if let Some(edge_sort) = edge_sort {
                input.push_field(InputValue::new("edge", edge_sort));
            }
        });
    }

    if relationship.get().is_aggregation_filterable() {
        aggregate_input(session, relationship);
    }
}

/// `<Rel>AggregateInput` with the count keys and the node and edge aggregations.
fn aggregate_input(session: &mut BuildSession, relationship: RelationshipWalker<'_>) {
    let names = relationship.names();
    let target = relationship.target().get();

    let has_node = filters::aggregation_where(
        session,
        &names.node_aggregation_where_input(),
        target.aggregation_keys(),
        |index| target.attribute_at(index),
    );

    let has_edge = relationship.properties().is_some_and(|properties| {
        let properties = properties.get();

        filters::aggregation_where(
            session,
            &names.edge_aggregation_where_input(),
            properties.aggregation_keys(),
            |index| properties.attribute_at(index),
        )
    });

    let name = names.aggregate_input();

    session.add_input_type(&name, |input| {
        for (key, _) in AggregateWhereKey::COUNT_KEYS {
            input.push_field(InputValue::new(key, "Int"));
        }

        push_logical(input, &name);

        if has_node {
            input.push_field(InputValue::new("node", names.node_aggregation_where_input()));
        }

        if has_edge {
            input.push_field(InputValue::new("edge", names.edge_aggregation_where_input()));
        }
    });
}

/// connectOrCreate is only available towards concrete targets.
fn branch_connects_or_creates(relationship: RelationshipWalker<'_>) -> bool {
    !targets_union(relationship) && can_connect_or_create(relationship)
}

fn write_inputs(session: &mut BuildSession, relationship: RelationshipWalker<'_>, branch: &Branch<'_>) {
    let definition = relationship.get();
    let names = &branch.names;
    let target = branch.target.names();
    let properties = relationship.properties();
    let edge_create = properties.and_then(edge_create_input);
    let edge_update = properties.and_then(edge_update_input);

    if definition.allows(NestedOperation::Create) {
        session.add_input_type(&names.create_field_input(), |input| {
            input.push_field(InputValue::new("node", required(&target.create_input())));

            if let Some(edge) = &edge_create {
                input.push_field(InputValue::new("edge", edge.as_str()));
            }
        });
    }

    if definition.allows(NestedOperation::Connect) {
        let connect =
            entity_has(branch.target, NestedInput::Connect).then(|| wrap(relationship, &target.connect_input()));

        session.add_input_type(&names.connect_field_input(), |input| {
            input.push_field(InputValue::new("where", target.connect_where_input()));

            if let Some(connect) = connect {
                input.push_field(InputValue::new("connect", connect));
            }

            if let Some(edge) = &edge_create {
                input.push_field(InputValue::new("edge", edge.as_str()));
            }

            if properties.is_some() {
                input.push_field(
                    InputValue::new("overwrite", "Boolean!")
                        .with_default("true")
                        .with_description(Some(
                            "Whether or not to overwrite any matching relationship with the new properties.",
                        )),
                );
            }
        });
    }

    let connect_or_create = branch_connects_or_creates(relationship);

    if connect_or_create {
        let on_create = names.connect_or_create_field_input_on_create();

        session.add_input_type(&on_create, |input| {
            input.push_field(InputValue::new("node", required(&target.on_create_input())));

            if let Some(edge) = &edge_create {
                input.push_field(InputValue::new("edge", edge.as_str()));
            }
        });

        session.add_input_type(&names.connect_or_create_field_input(), |input| {
            input.push_field(InputValue::new("where", required(&target.connect_or_create_where_input())));
            input.push_field(InputValue::new("onCreate", required(&on_create)));
        });
    }

    if has_field_input(relationship) {
        session.add_input_type(&names.field_input(), |input| {
            if relationship_has(relationship, NestedInput::Create) {
                input.push_field(InputValue::new("create", wrap(relationship, &names.create_field_input())));
            }

            if relationship_has(relationship, NestedInput::Connect) {
                input.push_field(InputValue::new("connect", wrap(relationship, &names.connect_field_input())));
            }

            if connect_or_create && relationship_has(relationship, NestedInput::ConnectOrCreate) {
                input.push_field(InputValue::new(
                    "connectOrCreate",
                    wrap(relationship, &names.connect_or_create_field_input()),
                ));
            }
        });
    }

    if definition.allows(NestedOperation::Update) {
        session.add_input_type(&names.update_connection_input(), |input| {
            input.push_field(InputValue::new("node", target.update_input()));

            if let Some(edge) = &edge_update {
                input.push_field(InputValue::new("edge", edge.as_str()));
            }
        });
    }

    if definition.allows(NestedOperation::Delete) {
        let delete = entity_has(branch.target, NestedInput::Delete).then(|| target.delete_input());

        session.add_input_type(&names.delete_field_input(), |input| {
            input.push_field(InputValue::new("where", names.connection_where_input()));

            if let Some(delete) = delete {
                input.push_field(InputValue::new("delete", delete));
            }
        });
    }

    if definition.allows(NestedOperation::Disconnect) {
        let disconnect = entity_has(branch.target, NestedInput::Disconnect).then(|| target.disconnect_input());

        session.add_input_type(&names.disconnect_field_input(), |input| {
            input.push_field(InputValue::new("where", names.connection_where_input()));

            if let Some(disconnect) = disconnect {
                input.push_field(InputValue::new("disconnect", disconnect));
            }
        });
    }

    if has_update_field_input(relationship) {
        session.add_input_type(&names.update_field_input(), |input| {
            input.push_field(InputValue::new("where", names.connection_where_input()));

            if definition.allows(NestedOperation::Update) {
                input.push_field(InputValue::new("update", names.update_connection_input()));
            }

            if definition.allows(NestedOperation::Connect) {
                input.push_field(InputValue::new("connect", wrap(relationship, &names.connect_field_input())));
            }

            if definition.allows(NestedOperation::Disconnect) {
                input.push_field(InputValue::new(
                    "disconnect",
                    wrap(relationship, &names.disconnect_field_input()),
                ));
            }

            if definition.allows(NestedOperation::Create) {
                input.push_field(InputValue::new("create", wrap(relationship, &names.create_field_input())));
            }

            if definition.allows(NestedOperation::Delete) {
                input.push_field(InputValue::new("delete", wrap(relationship, &names.delete_field_input())));
            }

            if connect_or_create {
                input.push_field(InputValue::new(
                    "connectOrCreate",
                    wrap(relationship, &names.connect_or_create_field_input()),
                ));
            }
        });
    }
}

/// The inputs grouping the member inputs of a union target.
fn union_containers(session: &mut BuildSession, relationship: RelationshipWalker<'_>) {
    let names = relationship.names();
    let definition = relationship.get();

    if has_field_input(relationship) {
        union_container(session, relationship, names.create_input(), RelationshipNames::field_input, false);
    }

    let containers: [(NestedOperation, String, fn(&RelationshipNames) -> String); 4] = [
        (
            NestedOperation::Create,
            names.create_field_input(),
            RelationshipNames::create_field_input,
        ),
        (
            NestedOperation::Connect,
            names.connect_input(),
            RelationshipNames::connect_field_input,
        ),
        (
            NestedOperation::Disconnect,
            names.disconnect_input(),
            RelationshipNames::disconnect_field_input,
        ),
        (
            NestedOperation::Delete,
            names.delete_input(),
            RelationshipNames::delete_field_input,
        ),
    ];

    for (operation, name, member_input) in containers {
        if definition.allows(operation) {
            union_container(session, relationship, name, member_input, true);
        }
    }

    if has_update_field_input(relationship) {
        union_container(
            session,
            relationship,
            names.update_input(),
            RelationshipNames::update_field_input,
            true,
        );
    }
}

fn union_container(
    session: &mut BuildSession,
    relationship: RelationshipWalker<'_>,
    name: String,
    member_input: fn(&RelationshipNames) -> String,
    list: bool,
) {
    session.add_input_type(&name, |input| {
        for branch in branches(relationship) {
            let member = member_input(&branch.names);
            let ty = if list { wrap(relationship, &member) } else { member };

            input.push_field(InputValue::new(branch.target.name(), ty));
        }
    });
}

/// The relationship's field in `<Source>CreateInput`.
pub(crate) fn create_input_field(relationship: RelationshipWalker<'_>) -> Option<InputValue> {
    if !has_field_input(relationship) {
        return None;
    }

    let names = relationship.names();
    let ty = if targets_union(relationship) {
        names.create_input()
    } else {
        names.field_input()
    };

    Some(InputValue::new(relationship.name(), ty))
}

/// The relationship's field in `<Source>UpdateInput`.
pub(crate) fn update_input_field(relationship: RelationshipWalker<'_>) -> Option<InputValue> {
    if !has_update_field_input(relationship) {
        return None;
    }

    let names = relationship.names();
    let ty = if targets_union(relationship) {
        names.update_input()
    } else {
        wrap(relationship, &names.update_field_input())
    };

    Some(InputValue::new(relationship.name(), ty))
}

/// The relationship's field in `<Source>ConnectInput`, `DisconnectInput`,
/// `DeleteInput`, `RelationInput` or `ConnectOrCreateInput`.
pub(crate) fn nested_input_field(relationship: RelationshipWalker<'_>, input: NestedInput) -> Option<InputValue> {
    if !relationship_has(relationship, input) {
        return None;
    }

    let names = relationship.names();
    let union = targets_union(relationship);

    let ty = match input {
        NestedInput::Connect if union => names.connect_input(),
        NestedInput::Disconnect if union => names.disconnect_input(),
        NestedInput::Delete if union => names.delete_input(),
        NestedInput::Create if union => names.create_field_input(),
        NestedInput::ConnectOrCreate if union => return None,
        NestedInput::Connect => wrap(relationship, &names.connect_field_input()),
        NestedInput::Disconnect => wrap(relationship, &names.disconnect_field_input()),
        NestedInput::Delete => wrap(relationship, &names.delete_field_input()),
        NestedInput::Create => wrap(relationship, &names.create_field_input()),
        NestedInput::ConnectOrCreate => wrap(relationship, &names.connect_or_create_field_input()),
    };

    Some(InputValue::new(relationship.name(), ty))
}
