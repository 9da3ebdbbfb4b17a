use graphql_cypher_translate::TranslationError;
use indoc::indoc;
use insta::{assert_json_snapshot, assert_snapshot};
use serde_json::json;

use super::{field, leaves, params, Fixture};

const MOVIES: &str = indoc! {r#"
    type Movie {
        title: String!
        released: Int
        tags: [String!]
        actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN, properties: "ActedIn")
    }

    type Actor {
        name: String!
    }

    type ActedIn @relationshipProperties {
        role: String
    }
"#};

fn movies_response(fields: &[&'static str]) -> Vec<graphql_cypher_translate::ResolvedField> {
    vec![field("movies").with_selection(leaves(fields.iter().copied()))]
}

#[test]
fn create_with_nested_create() {
    let fixture = Fixture::new(indoc! {r#"
        type Movie {
            id: ID! @id
            title: String!
            actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN, properties: "ActedIn")
        }

        type Actor {
            name: String!
        }

        type ActedIn @relationshipProperties {
            role: String
        }
    "#});

    let statement = fixture
        .mutation(
            field("createMovies")
                .with_argument(
                    "input",
                    json!([{
                        "title": "Dune",
                        "actors": { "create": [{ "node": { "name": "Timothee" }, "edge": { "role": "Paul" } }] }
                    }]),
                )
                .with_selection(movies_response(&["title"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    CALL {
        CREATE (this0:Movie)
        SET this0.id = randomUUID(), this0.title = $param0
        CALL {
            WITH this0
            CREATE (this1:Actor)
            SET this1.name = $param1
            MERGE (this0)<-[this2:ACTED_IN]-(this1)
            SET this2.role = $param2
        }
        RETURN this0 AS this
    }
    RETURN this { .title } AS this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "param0": "Dune",
      "param1": "Timothee",
      "param2": "Paul"
    }
    "#);
}

#[test]
fn create_connecting_existing_nodes() {
    let fixture = Fixture::new(MOVIES);

    let statement = fixture
        .mutation(
            field("createMovies")
                .with_argument(
                    "input",
                    json!([{
                        "title": "Dune",
                        "actors": { "connect": [{ "where": { "node": { "name": "Paul" } }, "edge": { "role": "Lead" } }] }
                    }]),
                )
                .with_selection(movies_response(&["title"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    CALL {
        CREATE (this0:Movie)
        SET this0.title = $param0
        CALL {
            WITH this0
            MATCH (this1:Actor)
            WHERE this1.name = $param1
            MERGE (this0)<-[this2:ACTED_IN]-(this1)
            SET this2.role = $param2
        }
        RETURN this0 AS this
    }
    RETURN this { .title } AS this
    ");
}

#[test]
fn connect_without_overwrite_creates_a_new_relationship() {
    let fixture = Fixture::new(MOVIES);

    let statement = fixture
        .mutation(
            field("createMovies")
                .with_argument(
                    "input",
                    json!([{
                        "title": "Dune",
                        "actors": { "connect": [{
                            "where": { "node": { "name": "Paul" } },
                            "edge": { "role": "Lead" },
                            "overwrite": false
                        }] }
                    }]),
                )
                .with_selection(movies_response(&["title"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    CALL {
        CREATE (this0:Movie)
        SET this0.title = $param0
        CALL {
            WITH this0
            MATCH (this1:Actor)
            WHERE this1.name = $param1
            CREATE (this0)<-[this2:ACTED_IN]-(this1)
            SET this2.role = $param2
        }
        RETURN this0 AS this
    }
    RETURN this { .title } AS this
    ");
}

#[test]
fn create_without_input_returns_nothing() {
    let fixture = Fixture::new(MOVIES);

    let statement = fixture
        .mutation(
            field("createMovies")
                .with_argument("input", json!([]))
                .with_selection(movies_response(&["title"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    UNWIND [] AS this
    RETURN this { .title } AS this
    ");
}

#[test]
fn populated_by_callbacks() {
    let sdl = indoc! {r#"
        type Movie {
            slug: String! @populatedBy(callback: "slug", operations: [CREATE])
            title: String!
        }
    "#};

    let create = || {
        field("createMovies")
            .with_argument("input", json!([{ "title": "Dune" }]))
            .with_selection(movies_response(&["slug"]))
    };

    let statement = Fixture::new(sdl).callback("slug", json!("dune")).mutation(create()).unwrap();

    assert_snapshot!(statement.cypher, @r"
    CALL {
        CREATE (this0:Movie)
        SET this0.slug = $param0, this0.title = $param1
        RETURN this0 AS this
    }
    RETURN this { .slug } AS this
    ");

    let error = Fixture::new(sdl).mutation(create()).unwrap_err();

    assert_eq!(
        error,
        TranslationError::MissingCallback {
            callback: String::from("slug")
        }
    );
}

#[test]
fn update_with_operators() {
    let fixture = Fixture::new(MOVIES);

    let statement = fixture
        .mutation(
            field("updateMovies")
                .with_argument("where", json!({ "title": "Dune" }))
                .with_argument("update", json!({ "released_INCREMENT": 1, "tags_PUSH": "sci-fi" }))
                .with_selection(movies_response(&["title", "released"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Movie)
    WHERE this.title = $param0
    SET this.released = this.released + $param1, this.tags = coalesce(this.tags, []) + $param2
    RETURN this { .title, .released } AS this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "param0": "Dune",
      "param1": 1,
      "param2": [
        "sci-fi"
      ]
    }
    "#);
}

#[test]
fn update_of_relationship_properties() {
    let fixture = Fixture::new(MOVIES);

    let statement = fixture
        .mutation(
            field("updateMovies")
                .with_argument("where", json!({ "title": "Dune" }))
                .with_argument(
                    "update",
                    json!({ "actors": [{ "where": { "node": { "name": "Paul" } }, "update": { "edge": { "role": "Lead" } } }] }),
                )
                .with_selection(movies_response(&["title"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Movie)
    WHERE this.title = $param0
    CALL {
        WITH this
        MATCH (this)<-[this0:ACTED_IN]-(this1:Actor)
        WHERE this1.name = $param1
        SET this0.role = $param2
    }
    RETURN this { .title } AS this
    ");
}

#[test]
fn negative_pop_is_rejected() {
    let fixture = Fixture::new(MOVIES);

    let error = fixture
        .mutation(
            field("updateMovies")
                .with_argument("update", json!({ "tags_POP": -1 }))
                .with_selection(movies_response(&["title"])),
        )
        .unwrap_err();

    assert!(matches!(error, TranslationError::InvalidArgument { ref argument, .. } if argument == "tags_POP"));
}

#[test]
fn pop_removes_from_the_end() {
    let fixture = Fixture::new(MOVIES);

    let statement = fixture
        .mutation(
            field("updateMovies")
                .with_argument("where", json!({ "title": "Dune" }))
                .with_argument("update", json!({ "tags_POP": 2 }))
                .with_selection(movies_response(&["title"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Movie)
    WHERE this.title = $param0
    SET this.tags = this.tags[..-$param1]
    RETURN this { .title } AS this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "param0": "Dune",
      "param1": 2
    }
    "#);
}

#[test]
fn disconnect_deletes_the_relationship() {
    let fixture = Fixture::new(MOVIES);

    let statement = fixture
        .mutation(
            field("updateMovies")
                .with_argument("where", json!({ "title": "Dune" }))
                .with_argument(
                    "disconnect",
                    json!({ "actors": [{ "where": { "node": { "name": "Paul" } } }] }),
                )
                .with_selection(movies_response(&["title"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Movie)
    WHERE this.title = $param0
    CALL {
        WITH this
        MATCH (this)<-[this0:ACTED_IN]-(this1:Actor)
        WHERE this1.name = $param1
        DELETE this0
    }
    RETURN this { .title } AS this
    ");
}

const UNIQUE_ACTORS: &str = indoc! {r#"
    type Movie {
        title: String!
        actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN, properties: "ActedIn")
    }

    type Actor {
        name: String! @unique
        born: Int
    }

    type ActedIn @relationshipProperties {
        role: String
    }
"#};

#[test]
fn connect_or_create_merges_on_the_unique_field() {
    let fixture = Fixture::new(UNIQUE_ACTORS);

    let statement = fixture
        .mutation(
            field("updateMovies")
                .with_argument("where", json!({ "title": "Dune" }))
                .with_argument(
                    "update",
                    json!({ "actors": [{ "connectOrCreate": [{
                        "where": { "node": { "name": "Keanu" } },
                        "onCreate": { "node": { "born": 1964 }, "edge": { "role": "Neo" } }
                    }] }] }),
                )
                .with_selection(movies_response(&["title"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Movie)
    WHERE this.title = $param0
    CALL {
        WITH this
        MERGE (this0:Actor { name: $param1 })
        ON CREATE SET this0.born = $param2
        MERGE (this)<-[this1:ACTED_IN]-(this0)
        ON CREATE SET this1.role = $param3
    }
    RETURN this { .title } AS this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "param0": "Dune",
      "param1": "Keanu",
      "param2": 1964,
      "param3": "Neo"
    }
    "#);
}

#[test]
fn connect_or_create_needs_a_unique_field() {
    let fixture = Fixture::new(UNIQUE_ACTORS);

    let error = fixture
        .mutation(
            field("updateMovies")
                .with_argument(
                    "update",
                    json!({ "actors": [{ "connectOrCreate": [{ "where": { "node": {} } }] }] }),
                )
                .with_selection(movies_response(&["title"])),
        )
        .unwrap_err();

    assert_snapshot!(error.to_string(), @"Invalid value for connectOrCreate.where.node: expected a unique field");
}

#[test]
fn delete_with_nested_delete() {
    let fixture = Fixture::new(MOVIES);

    let statement = fixture
        .mutation(
            field("deleteMovies")
                .with_argument("where", json!({ "title": "Dune" }))
                .with_argument("delete", json!({ "actors": [{ "where": { "node": { "name": "Paul" } } }] })),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Movie)
    WHERE this.title = $param0
    CALL {
        WITH this
        MATCH (this)<-[this0:ACTED_IN]-(this1:Actor)
        WHERE this1.name = $param1
        DETACH DELETE this1
    }
    DETACH DELETE this
    ");
}

#[test]
fn disabled_nested_operations_are_rejected() {
    let fixture = Fixture::new(indoc! {r#"
        type Movie {
            title: String!
            actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN, nestedOperations: [CONNECT])
        }

        type Actor {
            name: String!
        }
    "#});

    let error = fixture
        .mutation(
            field("createMovies")
                .with_argument(
                    "input",
                    json!([{ "title": "Dune", "actors": { "create": [{ "node": { "name": "Paul" } }] } }]),
                )
                .with_selection(movies_response(&["title"])),
        )
        .unwrap_err();

    assert_snapshot!(error.to_string(), @"Invalid value for actors.create: the operation is disabled on this relationship");
}
