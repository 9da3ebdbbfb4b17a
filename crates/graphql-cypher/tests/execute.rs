#![allow(unused_crate_dependencies)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use graphql_cypher::{
    cursor, AccessMode, Config, Counters, CypherStatement, Driver, DriverError, GlobalId, GraphqlCypher, QueryResult,
    Request,
};
use indoc::indoc;
use insta::{assert_json_snapshot, assert_snapshot};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{json, Value};

/// Records every statement and answers with the queued results, or with an
/// empty result once the queue is drained.
#[derive(Clone, Default)]
struct RecordingDriver {
    statements: Arc<Mutex<Vec<(CypherStatement, AccessMode)>>>,
    results: Arc<Mutex<VecDeque<Result<QueryResult, DriverError>>>>,
}

impl RecordingDriver {
    fn returning(self, records: Value) -> Self {
        self.push(Ok(QueryResult {
            records: records
                .as_array()
                .unwrap()
                .iter()
                .map(|record| record.as_object().unwrap().clone())
                .collect(),
            counters: Counters::default(),
        }))
    }

    fn counting(self, counters: Counters, records: Value) -> Self {
        let this = self.returning(records);
        this.results.lock().unwrap().back_mut().unwrap().as_mut().unwrap().counters = counters;
        this
    }

    fn failing(self, error: DriverError) -> Self {
        self.push(Err(error))
    }

    fn push(self, result: Result<QueryResult, DriverError>) -> Self {
        self.results.lock().unwrap().push_back(result);
        self
    }

    fn statements(&self) -> Vec<(CypherStatement, AccessMode)> {
        self.statements.lock().unwrap().clone()
    }

    fn cypher(&self) -> Vec<String> {
        self.statements()
            .into_iter()
            .map(|(statement, _)| statement.cypher)
            .collect()
    }
}

#[async_trait]
impl Driver for RecordingDriver {
    async fn run(&self, statement: &CypherStatement, mode: AccessMode) -> Result<QueryResult, DriverError> {
        self.statements.lock().unwrap().push((statement.clone(), mode));
        self.results.lock().unwrap().pop_front().unwrap_or_else(|| Ok(QueryResult::default()))
    }
}

const MOVIES: &str = indoc! {r#"
    type Movie {
        dbId: ID! @relayId
        title: String!
        released: Int
        actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN, properties: "ActedIn")
    }

    type Actor {
        name: String! @unique
    }

    type ActedIn @relationshipProperties {
        role: String
    }
"#};

fn config() -> Config {
    Config::from_toml_str(indoc! {r#"
        [features]
        default_mutation_operations = ["CREATE", "UPDATE", "DELETE"]
    "#})
    .unwrap()
}

fn server(driver: &RecordingDriver) -> GraphqlCypher {
    GraphqlCypher::new(MOVIES, &config(), driver.clone()).unwrap()
}

fn variables(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn read_with_type_names_and_global_ids() {
    let driver = RecordingDriver::default().returning(json!([
        { "this": { "id": "1", "title": "The Matrix" } },
        { "this": { "id": "2", "title": "Dune" } },
    ]));

    let response = server(&driver)
        .execute(
            Request::new("query ($title: String) { movies(where: { title_CONTAINS: $title }) { __typename id title } }")
                .with_variables(variables(json!({ "title": "a" }))),
        )
        .await;

    assert_snapshot!(driver.cypher().join("\n"), @r"
    MATCH (this:Movie)
    WHERE this.title CONTAINS $param0
    RETURN this { id: this.dbId, .title } AS this
    ");

    assert_eq!(driver.statements()[0].1, AccessMode::Read);

    assert_json_snapshot!(response, @r#"
    {
      "data": {
        "movies": [
          {
            "__typename": "Movie",
            "id": "TW92aWU6MQ==",
            "title": "The Matrix"
          },
          {
            "__typename": "Movie",
            "id": "TW92aWU6Mg==",
            "title": "Dune"
          }
        ]
      }
    }
    "#);

    assert_eq!(GlobalId::decode("TW92aWU6MQ==").unwrap(), GlobalId::new("Movie", "1"));
}

#[tokio::test]
async fn connection_cursors_and_page_info() {
    let driver = RecordingDriver::default().returning(json!([
        {
            "this": {
                "edges": [
                    { "node": { "title": "Alien" } },
                    { "node": { "title": "Blade Runner" } },
                ],
                "totalCount": 5,
            }
        },
    ]));

    let response = server(&driver)
        .execute(
            Request::new(indoc! {r#"
                query ($after: String) {
                    moviesConnection(first: 2, after: $after) {
                        totalCount
                        edges { cursor node { title } }
                        pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                    }
                }
            "#})
            .with_variables(variables(json!({ "after": cursor::encode(0) }))),
        )
        .await;

    assert_json_snapshot!(response, @r#"
    {
      "data": {
        "moviesConnection": {
          "totalCount": 5,
          "edges": [
            {
              "cursor": "YXJyYXljb25uZWN0aW9uOjE=",
              "node": {
                "title": "Alien"
              }
            },
            {
              "cursor": "YXJyYXljb25uZWN0aW9uOjI=",
              "node": {
                "title": "Blade Runner"
              }
            }
          ],
          "pageInfo": {
            "hasNextPage": true,
            "hasPreviousPage": true,
            "startCursor": "YXJyYXljb25uZWN0aW9uOjE=",
            "endCursor": "YXJyYXljb25uZWN0aW9uOjI="
          }
        }
      }
    }
    "#);
}

#[tokio::test]
async fn create_reports_the_query_statistics() {
    let counters = Counters {
        nodes_created: 2,
        relationships_created: 1,
        properties_set: 3,
        ..Default::default()
    };

    let driver = RecordingDriver::default().counting(counters, json!([{ "this": { "title": "Dune" } }]));

    let response = server(&driver)
        .execute(Request::new(indoc! {r#"
            mutation {
                createMovies(input: [{ title: "Dune", actors: { create: [{ node: { name: "Zendaya" } }] } }]) {
                    info { nodesCreated relationshipsCreated }
                    movies { title }
                }
            }
        "#}))
        .await;

    assert_eq!(driver.statements()[0].1, AccessMode::Write);

    assert_json_snapshot!(response, @r#"
    {
      "data": {
        "createMovies": {
          "info": {
            "nodesCreated": 2,
            "relationshipsCreated": 1
          },
          "movies": [
            {
              "title": "Dune"
            }
          ]
        }
      }
    }
    "#);
}

#[tokio::test]
async fn delete_returns_the_counts_only() {
    let counters = Counters {
        nodes_deleted: 1,
        relationships_deleted: 4,
        ..Default::default()
    };

    let driver = RecordingDriver::default().counting(counters, json!([]));

    let response = server(&driver)
        .execute(Request::new(
            r#"mutation { deleteMovies(where: { title: "Dune" }) { nodesDeleted relationshipsDeleted } }"#,
        ))
        .await;

    assert_snapshot!(driver.cypher().join("\n"), @r"
    MATCH (this:Movie)
    WHERE this.title = $param0
    DETACH DELETE this
    ");

    assert_eq!(
        response.data,
        Some(json!({ "deleteMovies": { "nodesDeleted": 1, "relationshipsDeleted": 4 } }))
    );
}

#[tokio::test]
async fn failing_root_fields_do_not_affect_their_siblings() {
    let driver = RecordingDriver::default()
        .returning(json!([{ "this": { "name": "Keanu Reeves" } }]))
        .failing(DriverError::Unavailable(String::from("connection refused")));

    let response = server(&driver)
        .execute(Request::new(indoc! {r#"
            query {
                actors { name }
                broken: movies { runtime }
                movies { title }
            }
        "#}))
        .await;

    assert_json_snapshot!(response, @r#"
    {
      "data": {
        "actors": [
          {
            "name": "Keanu Reeves"
          }
        ],
        "broken": null,
        "movies": null
      },
      "errors": [
        {
          "message": "Field runtime does not exist on Movie",
          "path": [
            "broken"
          ]
        },
        {
          "message": "Could not reach the database: connection refused",
          "path": [
            "movies"
          ]
        }
      ]
    }
    "#);

    assert_eq!(driver.statements().len(), 2);
}

#[tokio::test]
async fn request_errors_have_no_data() {
    let driver = RecordingDriver::default();

    let response = server(&driver)
        .execute(Request::new("query A { movies { title } } query B { actors { name } }"))
        .await;

    assert_eq!(response.data, None);
    assert_eq!(response.errors[0].message, "Operation name required in request.");
    assert!(driver.statements().is_empty());
}

#[tokio::test]
async fn typename_of_the_root_and_of_abstract_members() {
    let driver = RecordingDriver::default().returning(json!([
        { "this": { "__resolveType": "Movie", "title": "Alien", "released": 1979 } },
        { "this": { "__resolveType": "Series", "title": "Dark" } },
    ]));

    let server = GraphqlCypher::new(
        indoc! {r#"
            interface Production {
                title: String!
            }

            type Movie implements Production {
                title: String!
                released: Int
            }

            type Series implements Production {
                title: String!
                episodes: Int
            }
        "#},
        &Config::default(),
        driver.clone(),
    )
    .unwrap();

    let response = server
        .execute(Request::new(
            "{ __typename productions { __typename title ... on Movie { released } } }",
        ))
        .await;

    assert_eq!(
        response.data,
        Some(json!({
            "__typename": "Query",
            "productions": [
                { "__typename": "Movie", "title": "Alien", "released": 1979 },
                { "__typename": "Series", "title": "Dark" },
            ]
        }))
    );
}

const POSTS: &str = indoc! {r#"
    type Post @authorization(filter: [{ operations: [READ], where: { node: { authorId: "$jwt.sub" } } }]) {
        content: String!
        authorId: ID!
    }
"#};

fn token(claims: Value) -> String {
    jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap()
}

fn authorized_config() -> Config {
    Config::from_toml_str(indoc! {r#"
        [authorization]
        key = "secret"
    "#})
    .unwrap()
}

#[tokio::test]
async fn verified_claims_reach_the_authorization_filters() {
    let driver = RecordingDriver::default();
    let server = GraphqlCypher::new(POSTS, &authorized_config(), driver.clone()).unwrap();

    let response = server
        .execute(Request::new("{ posts { content } }").with_token(token(json!({ "sub": "user-1", "exp": 4_102_444_800u64 }))))
        .await;

    assert_eq!(response.data, Some(json!({ "posts": [] })));

    let (statement, _) = driver.statements().remove(0);

    assert_json_snapshot!(serde_json::to_value(&statement.params).unwrap(), @r#"
    {
      "isAuthenticated": true,
      "jwt": {
        "sub": "user-1",
        "exp": 4102444800
      }
    }
    "#);
}

#[tokio::test]
async fn invalid_tokens_fail_the_request() {
    let driver = RecordingDriver::default();
    let server = GraphqlCypher::new(POSTS, &authorized_config(), driver.clone()).unwrap();

    let response = server
        .execute(Request::new("{ posts { content } }").with_token("not a token"))
        .await;

    assert_eq!(response.data, None);
    assert!(response.errors[0].message.starts_with("Unauthenticated"));
    assert!(driver.statements().is_empty());
}

#[tokio::test]
async fn populated_by_callbacks_run_for_mutations() {
    let driver = RecordingDriver::default();

    let server = GraphqlCypher::new(
        indoc! {r#"
            type Movie {
                slug: String! @populatedBy(callback: "slug", operations: [CREATE])
                title: String!
            }
        "#},
        &config(),
        driver.clone(),
    )
    .unwrap()
    .with_callback("slug", || json!("dune"));

    let response = server
        .execute(Request::new(r#"mutation { createMovies(input: [{ title: "Dune" }]) { movies { slug } } }"#))
        .await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let (statement, _) = driver.statements().remove(0);

    assert_json_snapshot!(serde_json::to_value(&statement.params).unwrap(), @r#"
    {
      "param0": "dune",
      "param1": "Dune"
    }
    "#);
}

#[tokio::test]
async fn asserts_constraints_through_the_driver() {
    let driver = RecordingDriver::default();

    server(&driver).assert_constraints().await.unwrap();

    assert_snapshot!(driver.cypher().join("\n"), @r"
    CREATE CONSTRAINT Movie_dbId IF NOT EXISTS FOR (n:Movie) REQUIRE n.dbId IS UNIQUE
    CREATE CONSTRAINT Actor_name IF NOT EXISTS FOR (n:Actor) REQUIRE n.name IS UNIQUE
    ");

    assert!(driver.statements().iter().all(|(_, mode)| *mode == AccessMode::Write));
}

#[test]
fn prints_the_augmented_schema() {
    let server = server(&RecordingDriver::default());
    let sdl = server.sdl().unwrap();

    assert!(sdl.contains("type Actor {"), "{sdl}");
    assert!(sdl.contains("actors(where: ActorWhere, options: ActorOptions): [Actor!]!"), "{sdl}");
    assert!(server.schema().document.contains("CreateMoviesMutationResponse"));
}
