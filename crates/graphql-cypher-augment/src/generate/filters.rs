//! Where, sort and aggregation filter inputs. Field names come from the key
//! tables compiled into the model, so the translator finds every generated key.

use graphql_cypher_schema::{
    filter_keys::{AggregationKeyTable, LogicalOperator, WhereKey, WhereKeyTable},
    Attribute, EntityKind, EntityNames, EntityWalker, PropertiesWalker, SchemaModel,
};

use super::types;
use crate::{
    sdl::{self, list_of, InputValue},
    session::BuildSession,
};

fn logical_field(operator: LogicalOperator, self_type: &str) -> InputValue {
    match operator {
        LogicalOperator::Not => InputValue::new(operator.key(), self_type),
        LogicalOperator::And | LogicalOperator::Or => InputValue::new(operator.key(), list_of(self_type)),
    }
}

/// The fields of a where input from its key table. `None` skips the key.
fn where_fields<'a>(
    session: &mut BuildSession,
    model: &'a SchemaModel,
    self_type: &str,
    keys: &'a WhereKeyTable,
    attribute_at: impl Fn(usize) -> Option<&'a Attribute>,
    implementations_where: Option<&str>,
) -> Vec<InputValue> {
    let mut fields = Vec::with_capacity(keys.len());

    for (key, kind) in keys.iter() {
        let ty = match kind {
            WhereKey::Logical(operator) => {
                fields.push(logical_field(operator, self_type));
                continue;
            }
            WhereKey::Attribute { attribute, operator } => {
                let Some(attribute) = attribute_at(attribute).filter(|attribute| !attribute.is_private()) else {
                    continue;
                };

                types::note_usage(session, attribute);

                let field = InputValue::new(key, types::filter_type(attribute, operator))
                    .with_directives(types::deprecations(attribute));

                fields.push(field);
                continue;
            }
            WhereKey::Relationship { relationship, .. } => model.walk(relationship).target().names().where_input(),
            WhereKey::Connection { relationship, .. } => model.walk(relationship).names().connection_where_input(),
            WhereKey::Aggregate { relationship } => model.walk(relationship).names().aggregate_input(),
            WhereKey::GlobalId => String::from("ID"),
            WhereKey::Member(member) => model.walk(member).names().where_input(),
            WhereKey::Implementations => match implementations_where {
                Some(name) => name.to_string(),
                None => continue,
            },
        };

        fields.push(InputValue::new(key, ty));
    }

    fields
}

/// `<Entity>Where`. Interfaces get `_on` when any implementation can be
/// filtered on its own.
pub(crate) fn entity_where(session: &mut BuildSession, entity: EntityWalker<'_>) -> String {
    let names = entity.names();
    let name = names.where_input();

    let implementations_where = match entity.kind() {
        EntityKind::Interface => implementations_where(session, entity),
        _ => None,
    };

    let fields = where_fields(
        session,
        entity.model(),
        &name,
        entity.get().where_keys(),
        |index| entity.get().attribute_at(index),
        implementations_where.as_deref(),
    );

    session.add_required_input_type(&name, |input| {
        for field in fields {
            input.push_field(field);
        }
    });

    name
}

fn implementations_where(session: &mut BuildSession, interface: EntityWalker<'_>) -> Option<String> {
    let name = interface.names().implementations_where_input();

    let added = session.add_input_type(&name, |input| {
        for implementation in interface.concrete_entities() {
            input.push_field(InputValue::new(
                implementation.name(),
                implementation.names().where_input(),
            ));
        }
    });

    added.then_some(name)
}

/// `<Properties>Where`
pub(crate) fn properties_where(session: &mut BuildSession, properties: PropertiesWalker<'_>) -> String {
    let name = properties.names().where_input();

    let fields = where_fields(
        session,
        properties.model(),
        &name,
        properties.get().where_keys(),
        |index| properties.get().attribute_at(index),
        None,
    );

    session.add_required_input_type(&name, |input| {
        for field in fields {
            input.push_field(field);
        }
    });

    name
}

pub(crate) fn has_sort<'a>(mut attributes: impl Iterator<Item = &'a Attribute>) -> bool {
    attributes.any(is_sort_field)
}

fn is_sort_field(attribute: &Attribute) -> bool {
    attribute.is_sortable() && attribute.is_readable()
}

/// `<Entity>Sort` and `<Properties>Sort` with one `SortDirection` per sortable
/// attribute. Returns false when nothing can be sorted.
pub(crate) fn sort_input<'a>(
    session: &mut BuildSession,
    name: &str,
    attributes: impl Iterator<Item = &'a Attribute>,
) -> bool {
    let sortable: Vec<_> = attributes.filter(|attribute| is_sort_field(attribute)).collect();

    if sortable.is_empty() {
        return false;
    }

    let direction = super::statics::sort_direction(session);

    session.add_input_type(name, |input| {
        input.describe(Some(&format!(
            "Fields to sort {} by. The order in which sorts are applied is not guaranteed when specifying many fields in one {name} object.",
            name.trim_end_matches("Sort"),
        )));

        for attribute in sortable {
            input.push_field(
                InputValue::new(attribute.name(), direction).with_directives(types::deprecations(attribute)),
            );
        }
    })
}

/// `<Entity>Options` with the sort, limit and offset of list reads.
pub(crate) fn options_input<'a>(
    session: &mut BuildSession,
    names: EntityNames<'_>,
    attributes: impl Iterator<Item = &'a Attribute>,
) -> String {
    let sort = names.sort_input();
    let sortable = sort_input(session, &sort, attributes);
    let name = names.options_input();

    session.add_required_input_type(&name, |input| {
        if sortable {
            input.push_field(InputValue::new("sort", list_of(&sort)).with_description(Some(format!(
                "Specify one or more {sort} objects to sort {} by. The sorts will be applied in the order in which they are arranged in the array.",
                names.pascal_plural(),
            ))));
        }

        input.push_field(InputValue::new("limit", "Int"));
        input.push_field(InputValue::new("offset", "Int"));
    });

    name
}

/// A node or edge aggregation where input. Returns false when no attribute
/// can be aggregated.
pub(crate) fn aggregation_where<'a>(
    session: &mut BuildSession,
    name: &str,
    keys: &'a AggregationKeyTable,
    attribute_at: impl Fn(usize) -> Option<&'a Attribute>,
) -> bool {
    if keys.is_empty() {
        return false;
    }

    session.add_input_type(name, |input| {
        for operator in LogicalOperator::ALL {
            input.push_field(logical_field(operator, name));
        }

        for (key, aggregation) in keys.iter() {
            let Some(attribute) = attribute_at(aggregation.attribute) else {
                continue;
            };

            let deprecated = aggregation
                .deprecation
                .map(|reason| format!("@deprecated(reason: {})", sdl::quoted(reason)));

            input.push_field(
                InputValue::new(key, types::aggregation_filter_type(attribute, aggregation))
                    .with_directives(deprecated),
            );
        }
    })
}
