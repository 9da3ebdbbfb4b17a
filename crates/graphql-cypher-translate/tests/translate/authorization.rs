use indoc::indoc;
use insta::{assert_json_snapshot, assert_snapshot};
use serde_json::json;

use super::{field, leaves, params, Fixture};

const POSTS: &str = indoc! {r#"
    type Post
        @authorization(
            filter: [
                { operations: [READ], where: { node: { authorId: "$jwt.sub" } } }
                { operations: [DELETE], requireAuthentication: false, where: { node: { authorId: "$jwt.sub" } } }
            ]
        ) {
        content: String!
        authorId: ID!
    }
"#};

#[test]
fn read_rules_filter_by_claims() {
    let fixture = Fixture::new(POSTS).authenticated(json!({ "sub": "user-1" }));

    let statement = fixture.query(field("posts").with_selection(leaves(["content"]))).unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Post)
    WHERE ($isAuthenticated = true AND this.authorId = $jwt.sub)
    RETURN this { .content } AS this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "isAuthenticated": true,
      "jwt": {
        "sub": "user-1"
      }
    }
    "#);
}

#[test]
fn anonymous_requests_get_empty_claims() {
    let fixture = Fixture::new(POSTS);

    let statement = fixture.query(field("posts").with_selection(leaves(["content"]))).unwrap();

    assert_json_snapshot!(params(&statement), @r#"
    {
      "isAuthenticated": false,
      "jwt": {}
    }
    "#);
}

#[test]
fn delete_rules_join_the_user_filter() {
    let fixture = Fixture::new(POSTS).authenticated(json!({ "sub": "user-1" }));

    let statement = fixture
        .mutation(field("deletePosts").with_argument("where", json!({ "content": "spam" })))
        .unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Post)
    WHERE (this.content = $param0 AND this.authorId = $jwt.sub)
    DETACH DELETE this
    ");

    assert_json_snapshot!(params(&statement), @r#"
    {
      "param0": "spam",
      "jwt": {
        "sub": "user-1"
      }
    }
    "#);
}

#[test]
fn entities_without_rules_are_unfiltered() {
    let fixture = Fixture::new("type Movie { title: String! }");

    let statement = fixture.query(field("movies").with_selection(leaves(["title"]))).unwrap();

    assert_snapshot!(statement.cypher, @r"
    MATCH (this:Movie)
    RETURN this { .title } AS this
    ");

    assert_json_snapshot!(params(&statement), @"{}");
}
