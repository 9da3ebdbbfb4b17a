use indoc::indoc;
use insta::{assert_json_snapshot, assert_snapshot};
use serde_json::json;

use super::{field, leaves, params, Fixture};

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

#[test]
fn nested_relationship_with_sort_and_limit() {
    let fixture = Fixture::new(MOVIES);

    let statement = fixture
        .query(
            field("movies")
                .with_argument("where", json!({ "title": "The Matrix" }))
                .with_argument("options", json!({ "sort": [{ "released": "DESC" }], "limit": 2 }))
                .with_selection([
                    field("title"),
                    field("actors")
                        .with_argument("options", json!({ "limit": 1 }))
                        .with_selection(leaves(["name"])),
                ]),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Movie)
    WHERE this.title = $param0
    WITH *
    ORDER BY this.released DESC
    LIMIT $param1
    CALL {
        WITH this
        MATCH (this)<-[this0:ACTED_IN]-(this1:Actor)
        WITH *
        LIMIT $param2
        WITH this1 { .name } AS this1
        RETURN collect(this1) AS var2
    }
    RETURN this { .title, actors: var2 } AS this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "param0": "The Matrix",
      "param1": 2,
      "param2": 1
    }
    "#);
}

#[test]
fn relationship_connection_sorted_by_edge_property() {
    let fixture = Fixture::new(MOVIES);

    let statement = fixture
        .query(
            field("movies").with_selection([
                field("title"),
                field("actorsConnection")
                    .with_argument("first", json!(1))
                    .with_argument("sort", json!([{ "edge": { "role": "ASC" } }]))
                    .with_selection([
                        field("totalCount"),
                        field("edges").with_selection([
                            field("properties").with_selection(leaves(["role"])),
                            field("node").with_selection(leaves(["name"])),
                        ]),
                    ]),
            ]),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Movie)
    CALL {
        WITH this
        MATCH (this)<-[this0:ACTED_IN]-(this1:Actor)
        WITH collect({ node: this1 { .name }, properties: this0 { .role } }) AS var2
        WITH var2, size(var2) AS var3
        CALL {
            WITH var2
            UNWIND var2 AS var4
            WITH *
            ORDER BY var4.properties.role ASC
            LIMIT $param0
            RETURN collect(var4) AS var5
        }
        RETURN { edges: var5, totalCount: var3 } AS var6
    }
    RETURN this { .title, actorsConnection: var6 } AS this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "param0": 1
    }
    "#);
}

#[test]
fn root_aggregate() {
    let fixture = Fixture::new(indoc! {r#"
        type Movie @query(aggregate: true) {
            title: String!
            released: Int
        }
    "#});

    let statement = fixture
        .query(
            field("moviesAggregate")
                .with_argument("where", json!({ "released_GT": 2000 }))
                .with_selection([field("count"), field("title").with_selection(leaves(["longest"]))]),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    CALL {
        MATCH (this0:Movie)
        WHERE this0.released > $param0
        RETURN count(this0) AS var1
    }
    CALL {
        MATCH (this0:Movie)
        WHERE this0.released > $param0
        WITH this0
        ORDER BY size(this0.title) DESC
        WITH collect(this0.title) AS var2
        RETURN { longest: head(var2) } AS var3
    }
    RETURN { count: var1, title: var3 } AS this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "param0": 2000
    }
    "#);
}

#[test]
fn union_relationship() {
    let fixture = Fixture::new(indoc! {r#"
        type Movie {
            title: String!
        }

        type Series {
            name: String!
        }

        union Production = Movie | Series

        type Actor {
            name: String!
            productions: [Production!]! @relationship(type: "ACTED_IN", direction: OUT)
        }
    "#});

    let statement = fixture
        .query(field("actors").with_selection([
            field("name"),
            field("productions").with_selection([
                field("title").on_type("Movie"),
                field("name").on_type("Series"),
            ]),
        ]))
        .unwrap();

    assert_snapshot!(statement.cypher, @r#"
    MATCH (this:Actor)
    CALL {
        WITH this
        CALL {
            WITH this
            MATCH (this)-[this0:ACTED_IN]->(this1:Movie)
            RETURN this1 { __resolveType: "Movie", .title } AS var2
            UNION
            WITH this
            MATCH (this)-[this3:ACTED_IN]->(this4:Series)
            RETURN this4 { __resolveType: "Series", .name } AS var2
        }
        RETURN collect(var2) AS var5
    }
    RETURN this { .name, productions: var5 } AS this
    "#);
}

#[test]
fn interface_root_read_sorts_merged_rows() {
    let fixture = Fixture::new(indoc! {r#"
        interface Production {
            title: String!
        }

        type Movie implements Production {
            title: String!
            runtime: Int
        }

        type Series implements Production {
            title: String!
            episodes: Int
        }
    "#});

    let statement = fixture
        .query(
            field("productions")
                .with_argument("options", json!({ "sort": [{ "title": "ASC" }], "limit": 10 }))
                .with_selection([field("title"), field("runtime").on_type("Movie")]),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r#"
    CALL {
        MATCH (this0:Movie)
        RETURN this0 { __resolveType: "Movie", .title, .runtime } AS this
        UNION
        MATCH (this1:Series)
        RETURN this1 { __resolveType: "Series", .title } AS this
    }
    WITH *
    ORDER BY this.title ASC
    LIMIT $param0
    RETURN this
    "#);
}

#[test]
fn entity_cypher_field() {
    let fixture = Fixture::new(indoc! {r#"
        type Movie {
            title: String!
            similar: [Movie!]!
                @cypher(statement: "MATCH (this)-[:SIMILAR]->(m:Movie) RETURN m", columnName: "m")
        }
    "#});

    let statement = fixture
        .query(field("movies").with_selection([field("title"), field("similar").with_selection(leaves(["title"]))]))
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Movie)
    CALL {
        WITH this
        CALL {
            WITH this
            MATCH (this)-[:SIMILAR]->(m:Movie) RETURN m
        }
        WITH m AS this0
        RETURN collect(this0 { .title }) AS var1
    }
    RETURN this { .title, similar: var1 } AS this
    ");
}

#[test]
fn unknown_selection_is_rejected() {
    let fixture = Fixture::new(MOVIES);

    let error = fixture
        .query(field("movies").with_selection(leaves(["runtime"])))
        .unwrap_err();

    assert_snapshot!(error.to_string(), @"Field runtime does not exist on Movie");
}
