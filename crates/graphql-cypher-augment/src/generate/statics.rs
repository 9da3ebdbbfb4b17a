//! Types that do not depend on the user's definitions. Each one is added on
//! first use.

use graphql_cypher_schema::ScalarKind;
use indexmap::IndexMap;

use crate::{
    sdl::{EnumValue, Field, InputObjectType, InputValue, ObjectType, TypeDefinition, TypeKind},
    session::BuildSession,
};

pub(crate) const CREATE_INFO: &str = "CreateInfo";
pub(crate) const UPDATE_INFO: &str = "UpdateInfo";
pub(crate) const DELETE_INFO: &str = "DeleteInfo";
pub(crate) const PAGE_INFO: &str = "PageInfo";
pub(crate) const SORT_DIRECTION: &str = "SortDirection";
pub(crate) const QUERY_OPTIONS: &str = "QueryOptions";
pub(crate) const FLOAT_WHERE: &str = "FloatWhere";
pub(crate) const NODE_INTERFACE: &str = "Node";

fn object(name: &str, fields: &[(&str, &str)]) -> TypeDefinition {
    let fields: IndexMap<_, _> = fields
        .iter()
        .map(|(field, ty)| (field.to_string(), Field::new(*field, *ty)))
        .collect();

    TypeDefinition::new(
        name,
        TypeKind::Object(ObjectType {
            implements: Vec::new(),
            fields,
        }),
    )
}

fn input(name: &str, fields: &[(&str, &str)]) -> TypeDefinition {
    let fields: IndexMap<_, _> = fields
        .iter()
        .map(|(field, ty)| (field.to_string(), InputValue::new(*field, *ty)))
        .collect();

    TypeDefinition::new(name, TypeKind::InputObject(InputObjectType { fields }))
}

pub(crate) fn create_info(session: &mut BuildSession) -> &'static str {
    session.get_or_create(CREATE_INFO, || {
        object(
            CREATE_INFO,
            &[
                ("bookmark", "String"),
                ("nodesCreated", "Int!"),
                ("relationshipsCreated", "Int!"),
            ],
        )
        .with_description("Information about the number of nodes and relationships created during a create mutation")
    });

    CREATE_INFO
}

pub(crate) fn update_info(session: &mut BuildSession) -> &'static str {
    session.get_or_create(UPDATE_INFO, || {
        object(
            UPDATE_INFO,
            &[
                ("bookmark", "String"),
                ("nodesCreated", "Int!"),
                ("nodesDeleted", "Int!"),
                ("relationshipsCreated", "Int!"),
                ("relationshipsDeleted", "Int!"),
            ],
        )
        .with_description("Information about the number of nodes and relationships created and deleted during an update mutation")
    });

    UPDATE_INFO
}

pub(crate) fn delete_info(session: &mut BuildSession) -> &'static str {
    session.get_or_create(DELETE_INFO, || {
        object(
            DELETE_INFO,
            &[
                ("bookmark", "String"),
                ("nodesDeleted", "Int!"),
                ("relationshipsDeleted", "Int!"),
            ],
        )
        .with_description("Information about the number of nodes and relationships deleted during a delete mutation")
    });

    DELETE_INFO
}

pub(crate) fn page_info(session: &mut BuildSession) -> &'static str {
    session.get_or_create(PAGE_INFO, || {
        object(
            PAGE_INFO,
            &[
                ("hasNextPage", "Boolean!"),
                ("hasPreviousPage", "Boolean!"),
                ("startCursor", "String"),
                ("endCursor", "String"),
            ],
        )
        .with_description("Pagination information (Relay)")
    });

    PAGE_INFO
}

pub(crate) fn sort_direction(session: &mut BuildSession) -> &'static str {
    session.get_or_create(SORT_DIRECTION, || {
        let mut ascending = EnumValue::new("ASC");
        ascending.description = Some(String::from("Sort by field values in ascending order."));

        let mut descending = EnumValue::new("DESC");
        descending.description = Some(String::from("Sort by field values in descending order."));

        TypeDefinition::new(SORT_DIRECTION, TypeKind::Enum(vec![ascending, descending]))
    });

    SORT_DIRECTION
}

pub(crate) fn query_options(session: &mut BuildSession) -> &'static str {
    session.get_or_create(QUERY_OPTIONS, || {
        input(QUERY_OPTIONS, &[("limit", "Int"), ("offset", "Int")])
    });

    QUERY_OPTIONS
}

/// `<Scalar>AggregateSelection`, for the scalars that have one.
pub(crate) fn aggregate_selection(session: &mut BuildSession, kind: ScalarKind) -> Option<String> {
    let fields: &[(&str, &str)] = match kind {
        ScalarKind::Id => &[("shortest", "ID"), ("longest", "ID")],
        ScalarKind::String => &[("shortest", "String"), ("longest", "String")],
        ScalarKind::Int => &[("max", "Int"), ("min", "Int"), ("average", "Float"), ("sum", "Int")],
        ScalarKind::Float => &[
            ("max", "Float"),
            ("min", "Float"),
            ("average", "Float"),
            ("sum", "Float"),
        ],
        ScalarKind::BigInt => &[
            ("max", "BigInt"),
            ("min", "BigInt"),
            ("average", "BigInt"),
            ("sum", "BigInt"),
        ],
        ScalarKind::Duration => &[("min", "Duration"), ("max", "Duration"), ("average", "Duration")],
        ScalarKind::DateTime => &[("min", "DateTime"), ("max", "DateTime")],
        ScalarKind::LocalDateTime => &[("min", "LocalDateTime"), ("max", "LocalDateTime")],
        ScalarKind::Time => &[("min", "Time"), ("max", "Time")],
        ScalarKind::LocalTime => &[("min", "LocalTime"), ("max", "LocalTime")],
        ScalarKind::Date | ScalarKind::Boolean | ScalarKind::Point | ScalarKind::CartesianPoint => return None,
    };

    let name = format!("{}AggregateSelection", kind.name());
    session.get_or_create(&name, || object(&name, fields));

    Some(name)
}

pub(crate) fn float_where(session: &mut BuildSession) -> &'static str {
    session.uses_float_where = true;
    FLOAT_WHERE
}

/// The helper types collected during the pass over the entities.
pub(crate) fn add_helper_types(session: &mut BuildSession) {
    if session.uses_point {
        session.get_or_create("Point", || {
            object(
                "Point",
                &[
                    ("longitude", "Float!"),
                    ("latitude", "Float!"),
                    ("height", "Float"),
                    ("crs", "String!"),
                    ("srid", "Int!"),
                ],
            )
            .with_description("A point in a coordinate system.")
        });

        session.get_or_create("PointInput", || {
            input(
                "PointInput",
                &[("longitude", "Float!"), ("latitude", "Float!"), ("height", "Float")],
            )
            .with_description("Input type for a point")
        });

        session.get_or_create("PointDistance", || {
            input("PointDistance", &[("point", "PointInput!"), ("distance", "Float!")])
        });
    }

    if session.uses_cartesian_point {
        session.get_or_create("CartesianPoint", || {
            object(
                "CartesianPoint",
                &[
                    ("x", "Float!"),
                    ("y", "Float!"),
                    ("z", "Float"),
                    ("crs", "String!"),
                    ("srid", "Int!"),
                ],
            )
            .with_description("A point in a two- or three-dimensional Cartesian coordinate system")
        });

        session.get_or_create("CartesianPointInput", || {
            input("CartesianPointInput", &[("x", "Float!"), ("y", "Float!"), ("z", "Float")])
                .with_description("Input type for a cartesian point")
        });

        session.get_or_create("CartesianPointDistance", || {
            input(
                "CartesianPointDistance",
                &[("point", "CartesianPointInput!"), ("distance", "Float!")],
            )
        });
    }

    if session.uses_float_where {
        session.get_or_create(FLOAT_WHERE, || input(FLOAT_WHERE, &[("min", "Float"), ("max", "Float")]));
    }
}

/// The scalar definition of a non-builtin scalar of the model.
pub(crate) fn scalar_definition(kind: ScalarKind) -> Option<TypeDefinition> {
    let description = match kind {
        ScalarKind::BigInt => {
            "A BigInt value up to 64 bits in size, which can be a number or a string if used inline, or a string only if used as a variable. Always returned as a string."
        }
        ScalarKind::DateTime => "A date and time, represented as an ISO-8601 string",
        ScalarKind::LocalDateTime => "A local datetime, represented as 'YYYY-MM-DDTHH:MM:SS'",
        ScalarKind::Date => "A date, represented as a 'yyyy-mm-dd' string",
        ScalarKind::Time => "A time, represented as an RFC3339 time string",
        ScalarKind::LocalTime => "A local time, represented as a time string without timezone information",
        ScalarKind::Duration => "A duration, represented as an ISO 8601 duration string",
        _ => return None,
    };

    Some(TypeDefinition::new(kind.name(), TypeKind::Scalar).with_description(description))
}

/// The `Node` interface of global nodes.
pub(crate) fn node_interface() -> TypeDefinition {
    let mut fields = IndexMap::new();
    fields.insert(String::from("id"), Field::new("id", "ID!"));

    TypeDefinition::new(
        NODE_INTERFACE,
        TypeKind::Interface(ObjectType {
            implements: Vec::new(),
            fields,
        }),
    )
}
