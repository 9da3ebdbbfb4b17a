use graphql_cypher_augment::FieldResolver;
use graphql_cypher_translate::{cursor, translate, GlobalId, TranslationContext, TranslationError};
use indoc::indoc;
use insta::{assert_json_snapshot, assert_snapshot};
use serde_json::json;

use super::{field, leaves, params, Fixture};

#[test]
fn root_connection_pages_after_the_cursor() {
    let fixture = Fixture::new("type Movie { title: String! }");

    let statement = fixture
        .query(
            field("moviesConnection")
                .with_argument("first", json!(2))
                .with_argument("after", json!(cursor::encode(0)))
                .with_argument("sort", json!([{ "title": "ASC" }]))
                .with_selection([
                    field("totalCount"),
                    field("edges").with_selection([field("node").with_selection(leaves(["title"]))]),
                ]),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this0:Movie)
    WITH collect({ node: this0 { .title } }) AS var1
    WITH var1, size(var1) AS var2
    CALL {
        WITH var1
        UNWIND var1 AS var3
        WITH *
        ORDER BY var3.node.title ASC
        SKIP $param0
        LIMIT $param1
        RETURN collect(var3) AS var4
    }
    RETURN { edges: var4, totalCount: var2 } AS this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "param0": 1,
      "param1": 2
    }
    "#);
}

#[test]
fn malformed_cursor() {
    let fixture = Fixture::new("type Movie { title: String! }");

    let error = fixture
        .query(
            field("moviesConnection")
                .with_argument("after", json!("not a cursor"))
                .with_selection([field("totalCount")]),
        )
        .unwrap_err();

    assert_eq!(
        error,
        TranslationError::InvalidCursor {
            cursor: String::from("not a cursor")
        }
    );
}

#[test]
fn fulltext_with_score_filter_and_sort() {
    let fixture = Fixture::new(indoc! {r#"
        type Movie @fulltext(indexes: [{ indexName: "MovieTitle", fields: ["title"] }]) {
            title: String!
            released: Int
        }
    "#});

    let statement = fixture
        .query(
            field("moviesFulltextMovieTitle")
                .with_argument("phrase", json!("matrix"))
                .with_argument("where", json!({ "score": { "min": 0.5 } }))
                .with_argument("sort", json!([{ "score": "DESC" }]))
                .with_selection([field("score"), field("movie").with_selection(leaves(["title"]))]),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r#"
    CALL db.index.fulltext.queryNodes("MovieTitle", $param0) YIELD node AS this, score AS var0
    WHERE (this:Movie AND var0 >= $param1)
    WITH *
    ORDER BY var0 DESC
    RETURN { score: var0, movie: this { .title } } AS this
    "#);

    assert_json_snapshot!(params(&statement), @r#"
    {
      "param0": "matrix",
      "param1": 0.5
    }
    "#);
}

const RELAY: &str = indoc! {r#"
    type Movie {
        dbId: ID! @relayId
        title: String!
    }
"#};

#[test]
fn global_node_lookup() {
    let fixture = Fixture::new(RELAY);
    let id = GlobalId::new("Movie", "1").encode();

    let statement = fixture
        .query(
            field("node")
                .with_argument("id", json!(id))
                .with_selection([field("id"), field("title").on_type("Movie")]),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r#"
    MATCH (this:Movie)
    WHERE this.dbId = $param0
    RETURN this { __resolveType: "Movie", id: this.dbId, .title } AS this
    "#);

    assert_json_snapshot!(params(&statement), @r#"
    {
      "param0": "1"
    }
    "#);
}

#[test]
fn global_node_of_an_unknown_type() {
    let fixture = Fixture::new(RELAY);
    let id = GlobalId::new("Series", "1").encode();

    let error = fixture
        .query(field("node").with_argument("id", json!(id)).with_selection([field("id")]))
        .unwrap_err();

    assert_eq!(error, TranslationError::InvalidGlobalId { id });
}

#[test]
fn custom_cypher_query_field() {
    let fixture = Fixture::new(indoc! {r#"
        type Movie {
            title: String!
        }

        type Query {
            topMovies(limit: Int!): [Movie!]!
                @cypher(statement: "MATCH (m:Movie) RETURN m LIMIT $limit", columnName: "m")
        }
    "#});

    let statement = fixture
        .query(
            field("topMovies")
                .with_argument("limit", json!(3))
                .with_selection(leaves(["title"])),
        )
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    CALL {
        MATCH (m:Movie) RETURN m LIMIT $limit
    }
    WITH m AS this
    RETURN this { .title } AS this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "limit": 3
    }
    "#);
}

#[test]
fn custom_cypher_passes_claims_it_mentions() {
    let fixture = Fixture::new(indoc! {r#"
        type Movie {
            title: String!
        }

        type Query {
            me: String @cypher(statement: "RETURN $jwt.sub AS sub", columnName: "sub")
        }
    "#})
    .authenticated(json!({ "sub": "user-1" }));

    let statement = fixture.query(field("me")).unwrap();

    assert_snapshot!(statement.cypher, @r"
    CALL {
        RETURN $jwt.sub AS sub
    }
    RETURN sub AS this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "jwt": {
        "sub": "user-1"
      }
    }
    "#);
}

#[test]
fn nested_resolvers_are_not_root_fields() {
    let fixture = Fixture::new(RELAY);
    let ctx = TranslationContext::new(&fixture.model, &fixture.authentication, &fixture.callbacks);

    let error = translate(ctx, &FieldResolver::Numerical, &field("average")).unwrap_err();

    assert_eq!(
        error,
        TranslationError::NotARootField {
            field: String::from("average")
        }
    );
}
