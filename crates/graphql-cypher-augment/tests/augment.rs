#![allow(unused_crate_dependencies)]

use std::collections::BTreeSet;

use graphql_cypher_augment::{augment, AugmentedSchema, FieldResolver, RootOperation};
use graphql_cypher_schema::{ModelOptions, MutationOperation, SchemaModel};
use indoc::indoc;

const MOVIES: &str = indoc! {r#"
    type Movie {
        title: String!
        released: Int
        actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN, properties: "ActedIn")
    }

    type Actor {
        name: String!
        movies: [Movie!]! @relationship(type: "ACTED_IN", direction: OUT, properties: "ActedIn")
    }

    type ActedIn @relationshipProperties {
        role: String
    }
"#};

fn with_mutations() -> ModelOptions {
    ModelOptions {
        default_mutation_operations: BTreeSet::from([
            MutationOperation::Create,
            MutationOperation::Update,
            MutationOperation::Delete,
        ]),
        ..Default::default()
    }
}

fn build(sdl: &str, options: &ModelOptions) -> (SchemaModel, AugmentedSchema) {
    let model = SchemaModel::from_sdl(sdl, options).unwrap();
    let schema = augment(&model).unwrap();

    (model, schema)
}

fn field_names(schema: &AugmentedSchema, type_name: &str) -> Vec<String> {
    schema
        .document
        .fields(type_name)
        .map(|fields| fields.keys().cloned().collect())
        .unwrap_or_default()
}

#[test]
fn root_fields_and_their_resolvers() {
    let (model, schema) = build(MOVIES, &with_mutations());
    let movie = model.find_entity("Movie").unwrap().id();

    let query = field_names(&schema, "Query");

    for name in ["movies", "moviesConnection", "actors"] {
        assert!(query.iter().any(|field| field == name), "missing Query.{name}: {query:?}");
    }

    assert_eq!(
        schema.resolvers.field("Query", "movies"),
        Some(&FieldResolver::Read { entity: movie })
    );
    assert_eq!(
        schema.resolvers.field("Query", "moviesConnection"),
        Some(&FieldResolver::Connection { entity: movie })
    );
    assert_eq!(
        schema.resolvers.field("Mutation", "createMovies"),
        Some(&FieldResolver::Create { entity: movie })
    );
    assert_eq!(
        schema.resolvers.field("Mutation", "updateMovies"),
        Some(&FieldResolver::Update { entity: movie })
    );
    assert_eq!(
        schema.resolvers.field("Mutation", "deleteMovies"),
        Some(&FieldResolver::Delete { entity: movie })
    );

    assert!(schema.resolvers.field("Query", "movies").unwrap().is_root());
}

#[test]
fn root_aggregates_are_opt_in() {
    let (_, schema) = build(MOVIES, &ModelOptions::default());
    assert!(schema.resolvers.field("Query", "moviesAggregate").is_none());

    let (model, schema) = build(
        "type Movie @query(aggregate: true) { title: String! }",
        &ModelOptions::default(),
    );

    assert_eq!(
        schema.resolvers.field("Query", "moviesAggregate"),
        Some(&FieldResolver::Aggregate {
            entity: model.find_entity("Movie").unwrap().id()
        })
    );
    assert!(schema.document.contains("MovieAggregateSelection"));
}

#[test]
fn relationship_fields_on_the_object_type() {
    let (_, schema) = build(MOVIES, &with_mutations());

    let movie = field_names(&schema, "Movie");
    assert_eq!(movie[..2], ["title", "released"]);

    for name in ["actors", "actorsAggregate", "actorsConnection"] {
        assert!(movie.iter().any(|field| field == name), "missing Movie.{name}: {movie:?}");
    }

    let response = field_names(&schema, "CreateMoviesMutationResponse");
    assert_eq!(response, ["info", "movies"]);

    let connection = field_names(&schema, "MoviesConnection");
    assert_eq!(connection, ["edges", "totalCount", "pageInfo"]);
}

#[test]
fn where_inputs_carry_logical_operators() {
    let (_, schema) = build(MOVIES, &with_mutations());

    let filter = schema.document.input_fields("MovieWhere").unwrap();

    for key in ["title", "released_GT", "AND", "OR", "NOT"] {
        assert!(filter.contains_key(key), "missing MovieWhere.{key}");
    }
}

#[test]
fn no_mutations_without_default_operations() {
    let (_, schema) = build(MOVIES, &ModelOptions::default());

    assert!(schema.resolvers.field("Mutation", "createMovies").is_none());
    assert!(!schema.document.contains("CreateMoviesMutationResponse"));
}

#[test]
fn relay_ids_add_the_node_interface() {
    let (_, schema) = build(
        indoc! {r#"
            type Movie {
                dbId: ID! @relayId
                title: String!
            }
        "#},
        &ModelOptions::default(),
    );

    assert_eq!(schema.resolvers.field("Query", "node"), Some(&FieldResolver::GlobalNode));

    let movie = field_names(&schema, "Movie");
    assert!(movie.iter().any(|field| field == "id"), "{movie:?}");
}

#[test]
fn custom_cypher_root_fields() {
    let (_, schema) = build(
        indoc! {r#"
            type Movie {
                title: String!
            }

            type Query {
                topMovies(limit: Int!): [Movie!]!
                    @cypher(statement: "MATCH (m:Movie) RETURN m LIMIT $limit", columnName: "m")
            }
        "#},
        &ModelOptions::default(),
    );

    assert_eq!(
        schema.resolvers.field("Query", "topMovies"),
        Some(&FieldResolver::CustomCypher {
            operation: RootOperation::Query,
            field: String::from("topMovies"),
        })
    );
}

#[test]
fn printed_schema() {
    let (_, schema) = build("type Movie { title: String! }", &ModelOptions::default());

    let sdl = schema.sdl().unwrap();

    assert!(sdl.contains("type Movie {"), "{sdl}");
    assert!(sdl.contains("movies(where: MovieWhere, options: MovieOptions): [Movie!]!"), "{sdl}");
}

#[test]
fn legacy_aggregation_keys_are_deprecated() {
    let (_, schema) = build(MOVIES, &ModelOptions::default());

    let sdl = schema.sdl().unwrap();

    for field in [
        "name_AVERAGE_LENGTH_EQUAL: Float\n",
        "name_SHORTEST_LENGTH_GT: Int\n",
        r#"name_AVERAGE_EQUAL: Float @deprecated(reason: "Please use the explicit _LENGTH version for string aggregation.")"#,
        r#"name_LONGEST_LT: Int @deprecated(reason: "Please use the explicit _LENGTH version for string aggregation.")"#,
        r#"name_EQUAL: String @deprecated(reason: "Aggregation filters that are not relying on an aggregating function will be deprecated.")"#,
        r#"name_GTE: Int @deprecated(reason: "Aggregation filters that are not relying on an aggregating function will be deprecated.")"#,
    ] {
        assert!(sdl.contains(field), "missing {field}: {sdl}");
    }
}

#[test]
fn declared_relationships_filter_through_the_interface() {
    let (_, schema) = build(
        indoc! {r#"
            interface MovieNode {
                id: ID
                movies: [Movie!]! @declareRelationship
            }

            type Movie implements MovieNode {
                id: ID
                movies: [Movie!]! @relationship(type: "HAS_MOVIE", direction: OUT)
            }
        "#},
        &ModelOptions::default(),
    );

    let filter = schema.document.input_fields("MovieNodeWhere").unwrap();

    for key in ["id", "movies_SOME", "moviesConnection_NONE"] {
        assert!(filter.contains_key(key), "missing MovieNodeWhere.{key}");
    }
}
