use indoc::indoc;
use insta::{assert_json_snapshot, assert_snapshot};
use serde_json::json;

use super::{field, leaves, params, Fixture};

const LIKES: &str = indoc! {r#"
    type User {
        name: String!
    }

    type Post {
        content: String!
        likes: [User!]! @relationship(type: "LIKES", direction: IN, properties: "Likes")
    }

    type Likes @relationshipProperties {
        someString: String
    }
"#};

#[test]
fn aggregate_count_and_average_length() {
    let fixture = Fixture::new(LIKES);

    let statement = fixture
        .query(
            field("posts")
                .with_argument(
                    "where",
                    json!({ "likesAggregate": { "count": 10, "node": { "name_AVERAGE_LENGTH_EQUAL": 10 } } }),
                )
                .with_selection(leaves(["content"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Post)
    CALL {
        WITH this
        MATCH (this)<-[this0:LIKES]-(this1:User)
        RETURN (count(this1) = $param0 AND avg(size(this1.name)) = $param1) AS var2
    }
    WITH *
    WHERE var2 = true
    RETURN this { .content } AS this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "param0": 10,
      "param1": 10
    }
    "#);
}

#[test]
fn aggregate_logical_groups() {
    let fixture = Fixture::new(LIKES);

    let statement = fixture
        .query(
            field("posts")
                .with_argument(
                    "where",
                    json!({ "likesAggregate": { "AND": [{ "count_GT": 10 }, { "count_LT": 20 }] } }),
                )
                .with_selection(leaves(["content"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Post)
    CALL {
        WITH this
        MATCH (this)<-[this0:LIKES]-(this1:User)
        RETURN (count(this1) > $param0 AND count(this1) < $param1) AS var2
    }
    WITH *
    WHERE var2 = true
    RETURN this { .content } AS this
    ");
}

#[test]
fn relationship_quantifiers() {
    let fixture = Fixture::new(LIKES);

    let statement = fixture
        .query(
            field("posts")
                .with_argument("where", json!({ "likes_ALL": { "name": "Bob" } }))
                .with_selection(leaves(["content"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Post)
    WHERE all(var0 IN [(this)<-[:LIKES]-(this1:User) | this1.name = $param0] WHERE var0 = true)
    RETURN this { .content } AS this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "param0": "Bob"
    }
    "#);

    let cypher = |key: &str| {
        fixture
            .query(
                field("posts")
                    .with_argument("where", json!({ key: { "name": "Bob" } }))
                    .with_selection(leaves(["content"])),
            )
            .unwrap()
            .cypher
    };

    assert_snapshot!(cypher("likes_SOME"), @r"
    MATCH (this:Post)
    WHERE any(var0 IN [(this)<-[:LIKES]-(this1:User) | this1.name = $param0] WHERE var0 = true)
    RETURN this { .content } AS this
    ");

    assert_snapshot!(cypher("likes_NONE"), @r"
    MATCH (this:Post)
    WHERE none(var0 IN [(this)<-[:LIKES]-(this1:User) | this1.name = $param0] WHERE var0 = true)
    RETURN this { .content } AS this
    ");

    assert_snapshot!(cypher("likes_SINGLE"), @r"
    MATCH (this:Post)
    WHERE single(var0 IN [(this)<-[:LIKES]-(this1:User) | this1.name = $param0] WHERE var0 = true)
    RETURN this { .content } AS this
    ");
}

#[test]
fn connection_quantifiers_see_the_edge() {
    let fixture = Fixture::new(LIKES);

    let statement = fixture
        .query(
            field("posts")
                .with_argument(
                    "where",
                    json!({ "likesConnection_SOME": { "node": { "name": "Bob" }, "edge": { "someString": "x" } } }),
                )
                .with_selection(leaves(["content"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Post)
    WHERE any(var0 IN [(this)<-[this1:LIKES]-(this2:User) | (this2.name = $param0 AND this1.someString = $param1)] WHERE var0 = true)
    RETURN this { .content } AS this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "param0": "Bob",
      "param1": "x"
    }
    "#);

    let statement = fixture
        .query(
            field("posts")
                .with_argument("where", json!({ "likesConnection_NONE": { "edge": { "someString": "x" } } }))
                .with_selection(leaves(["content"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Post)
    WHERE none(var0 IN [(this)<-[this1:LIKES]-(this2:User) | this1.someString = $param0] WHERE var0 = true)
    RETURN this { .content } AS this
    ");
}

#[test]
fn single_relationship_filters() {
    let fixture = Fixture::new(indoc! {r#"
        type User {
            name: String!
        }

        type Post {
            content: String!
            author: User @relationship(type: "WROTE", direction: IN)
        }
    "#});

    let statement = fixture
        .query(
            field("posts")
                .with_argument("where", json!({ "author": { "name": "Bob" } }))
                .with_selection(leaves(["content"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Post)
    WHERE single(var0 IN [(this)<-[:WROTE]-(this1:User) | this1.name = $param0] WHERE var0 = true)
    RETURN this { .content } AS this
    ");

    let statement = fixture
        .query(
            field("posts")
                .with_argument("where", json!({ "author": null }))
                .with_selection(leaves(["content"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Post)
    WHERE size([(this)<-[:WROTE]-() | 1]) = 0
    RETURN this { .content } AS this
    ");

    assert_json_snapshot!(params(&statement), @"{}");
}

#[test]
fn aggregate_next_to_sibling_filters() {
    let fixture = Fixture::new(LIKES);

    let statement = fixture
        .query(
            field("posts")
                .with_argument(
                    "where",
                    json!({
                        "OR": [{ "likesAggregate": { "count": 2 } }, { "content": "x" }],
                        "content_CONTAINS": "y"
                    }),
                )
                .with_selection(leaves(["content"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Post)
    CALL {
        WITH this
        MATCH (this)<-[this0:LIKES]-(this1:User)
        RETURN count(this1) = $param0 AS var2
    }
    WITH *
    WHERE ((var2 = true OR this.content = $param1) AND this.content CONTAINS $param2)
    RETURN this { .content } AS this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "param0": 2,
      "param1": "x",
      "param2": "y"
    }
    "#);
}

#[test]
fn translation_is_deterministic() {
    let fixture = Fixture::new(LIKES);

    let translate = || {
        fixture
            .query(
                field("posts")
                    .with_argument(
                        "where",
                        json!({
                            "likes_SOME": { "name_STARTS_WITH": "B" },
                            "likesAggregate": { "node": { "name_LONGEST_LENGTH_LT": 10 } }
                        }),
                    )
                    .with_selection(leaves(["content"])),
            )
            .unwrap()
    };

    let first = translate();
    let second = translate();

    assert_eq!(first.cypher, second.cypher);
    assert_eq!(params(&first), params(&second));
}

#[test]
fn comparisons_of_each_aggregated_value() {
    let fixture = Fixture::new(LIKES);

    let statement = fixture
        .query(
            field("posts")
                .with_argument(
                    "where",
                    json!({
                        "likesAggregate": {
                            "node": { "name_EQUAL": "Bob", "name_GT": 2, "name_AVERAGE_GTE": 3.5 }
                        }
                    }),
                )
                .with_selection(leaves(["content"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Post)
    CALL {
        WITH this
        MATCH (this)<-[this0:LIKES]-(this1:User)
        RETURN (any(var2 IN collect(this1.name) WHERE var2 = $param0) AND any(var3 IN collect(size(this1.name)) WHERE var3 > $param1) AND avg(size(this1.name)) >= $param2) AS var4
    }
    WITH *
    WHERE var4 = true
    RETURN this { .content } AS this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "param0": "Bob",
      "param1": 2,
      "param2": 3.5
    }
    "#);
}

#[test]
fn temporal_averages_keep_their_type() {
    let fixture = Fixture::new(indoc! {r#"
        type Actor {
            name: String!
        }

        type Movie {
            title: String!
            actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN, properties: "ActedIn")
        }

        type ActedIn @relationshipProperties {
            screenTime: Duration
        }
    "#});

    let statement = fixture
        .query(
            field("movies")
                .with_argument(
                    "where",
                    json!({ "actorsAggregate": { "edge": { "screenTime_AVERAGE_GT": "P1D" } } }),
                )
                .with_selection(leaves(["title"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Movie)
    CALL {
        WITH this
        MATCH (this)<-[this0:ACTED_IN]-(this1:Actor)
        RETURN avg(this0.screenTime) > $param0 AS var2
    }
    WITH *
    WHERE var2 = true
    RETURN this { .title } AS this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "param0": {
        "Duration": "P1D"
      }
    }
    "#);
}

#[test]
fn unknown_filter_keys_are_rejected() {
    let fixture = Fixture::new(LIKES);

    let error = fixture
        .query(
            field("posts")
                .with_argument("where", json!({ "content_NOPE": "x" }))
                .with_selection(leaves(["content"])),
        )
        .unwrap_err();

    assert_snapshot!(error.to_string(), @"Unknown filter content_NOPE on PostWhere");
}
