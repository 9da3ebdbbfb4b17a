use indoc::indoc;

use crate::{
    annotation::{NestedOperation, RelationshipDirection},
    filter_keys::WhereKey,
    BuildError, EntityKind, ModelOptions, SchemaModel,
};

fn build(sdl: &str) -> Result<SchemaModel, BuildError> {
    SchemaModel::from_sdl(sdl, &ModelOptions::default())
}

const BLOG: &str = indoc! {r#"
    type User {
        id: ID! @id
        name: String
        posts: [Post!]! @relationship(type: "HAS_POST", direction: OUT)
        liked: [Post!]! @relationship(type: "LIKES", direction: OUT, properties: "Likes")
    }

    type Post @node(labels: ["Post", "Content"]) {
        content: String
        creator: User! @relationship(type: "HAS_POST", direction: IN)
        likes: [User!]! @relationship(type: "LIKES", direction: IN, properties: "Likes", nestedOperations: [CONNECT])
    }

    type Likes @relationshipProperties {
        someString: String
        likedAt: DateTime @timestamp(operations: [CREATE])
    }
"#};

#[test]
fn entities_relationships_and_properties() {
    let model = build(BLOG).unwrap();

    let names: Vec<_> = model.entities().map(|entity| entity.name()).collect();
    assert_eq!(names, vec!["User", "Post"]);

    let post = model.find_entity("Post").unwrap();
    assert_eq!(post.kind(), EntityKind::Concrete);
    assert_eq!(post.labels(), ["Post", "Content"]);
    assert_eq!(post.get().plural(), "posts");

    let creator = post.find_relationship("creator").unwrap();
    assert_eq!(creator.target().name(), "User");
    assert_eq!(creator.get().direction(), RelationshipDirection::In);
    assert!(!creator.get().is_list());

    let likes = post.find_relationship("likes").unwrap();
    assert_eq!(likes.properties().map(|properties| properties.name()), Some("Likes"));
    assert_eq!(likes.get().nested_operations(), [NestedOperation::Connect]);

    let properties = model.find_properties("Likes").unwrap();
    let carriers: Vec<_> = properties.relationships().map(|relationship| relationship.name()).collect();
    assert_eq!(carriers, vec!["liked", "likes"]);
}

#[test]
fn where_keys_are_compiled_per_entity() {
    let model = build(BLOG).unwrap();
    let user = model.find_entity("User").unwrap();

    let keys: Vec<_> = user.get().where_keys().iter().map(|(key, _)| key).collect();

    insta::assert_debug_snapshot!(keys, @r###"
    [
        "AND",
        "OR",
        "NOT",
        "id",
        "id_IN",
        "id_CONTAINS",
        "id_STARTS_WITH",
        "id_ENDS_WITH",
        "name",
        "name_IN",
        "name_CONTAINS",
        "name_STARTS_WITH",
        "name_ENDS_WITH",
        "posts_ALL",
        "posts_NONE",
        "posts_SINGLE",
        "posts_SOME",
        "postsConnection_ALL",
        "postsConnection_NONE",
        "postsConnection_SINGLE",
        "postsConnection_SOME",
        "postsAggregate",
        "liked_ALL",
        "liked_NONE",
        "liked_SINGLE",
        "liked_SOME",
        "likedConnection_ALL",
        "likedConnection_NONE",
        "likedConnection_SINGLE",
        "likedConnection_SOME",
        "likedAggregate",
    ]
    "###);

    assert!(matches!(
        model.find_entity("Post").unwrap().get().where_keys().get("creator"),
        Some(WhereKey::Relationship { quantifier: None, .. })
    ));
}

#[test]
fn extensions_and_interfaces() {
    let model = build(indoc! {r#"
        interface Production {
            title: String! @filterable(byValue: false)
            actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN)
        }

        type Movie implements Production {
            title: String!
            actors: [Actor!]!
        }

        type Actor {
            name: String
        }

        extend type Actor @plural(value: "performers") {
            born: Int
        }

        union Search = Movie | Actor
    "#})
    .unwrap();

    let movie = model.find_entity("Movie").unwrap();
    assert!(!movie.find_attribute("title").unwrap().is_filterable());
    assert_eq!(movie.find_relationship("actors").unwrap().get().ty(), "ACTED_IN");

    let production = model.find_entity("Production").unwrap();
    let implementations: Vec<_> = production.concrete_entities().iter().map(|entity| entity.name()).collect();
    assert_eq!(implementations, vec!["Movie"]);

    let actor = model.find_entity("Actor").unwrap();
    assert_eq!(actor.get().plural(), "performers");
    assert!(actor.find_attribute("born").is_some());

    let search = model.find_entity("Search").unwrap();
    let keys: Vec<_> = search.get().where_keys().iter().map(|(key, _)| key).collect();
    assert_eq!(keys, vec!["Movie", "Actor"]);
}

#[test]
fn declared_relationships_bind_to_implementations() {
    let model = build(indoc! {r#"
        interface MovieNode {
            id: ID
            movies: [Movie!]! @declareRelationship
        }

        type Movie implements MovieNode {
            id: ID
            movies: [Movie!]! @relationship(type: "HAS_MOVIE", direction: OUT)
        }

        type Series implements MovieNode {
            id: ID
            movies: [Movie!]! @relationship(type: "HAS_EPISODE", direction: OUT)
        }
    "#})
    .unwrap();

    let declared = model.find_entity("MovieNode").unwrap().find_relationship("movies").unwrap();
    assert_eq!(declared.target().name(), "Movie");
    assert_eq!(declared.get().ty(), "HAS_MOVIE");
    assert!(declared.get().is_list());

    let series = model.find_entity("Series").unwrap().find_relationship("movies").unwrap();
    assert_eq!(series.get().ty(), "HAS_EPISODE");
    assert_eq!(series.get().direction(), RelationshipDirection::Out);

    let keys: Vec<_> = model
        .find_entity("MovieNode")
        .unwrap()
        .get()
        .where_keys()
        .iter()
        .map(|(key, _)| key)
        .filter(|key| key.starts_with("movies_"))
        .collect();
    assert_eq!(keys, vec!["movies_ALL", "movies_NONE", "movies_SINGLE", "movies_SOME"]);
}

#[test]
fn declared_relationships_need_every_implementation() {
    let error = build(indoc! {r#"
        interface MovieNode {
            movies: [Movie!]! @declareRelationship
        }

        type Movie implements MovieNode {
            movies: [Movie!]! @relationship(type: "HAS_MOVIE", direction: OUT)
        }

        type Series implements MovieNode {
            movies: [Movie!]!
        }
    "#})
    .unwrap_err();

    insta::assert_snapshot!(
        error,
        @"Field Series.movies implements MovieNode.movies, which uses @declareRelationship, and needs its own @relationship directive."
    );

    let error = build(indoc! {r#"
        type Movie {
            sequels: [Movie!]! @declareRelationship
        }
    "#})
    .unwrap_err();

    insta::assert_snapshot!(
        error,
        @"Field Movie.sequels needs a @relationship directive; @declareRelationship is only supported on interface fields."
    );
}

#[test]
fn declared_relationships_share_their_properties() {
    let error = build(indoc! {r#"
        interface Production {
            actors: [Actor!]! @declareRelationship
        }

        type Movie implements Production {
            actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN, properties: "ActedIn")
        }

        type Series implements Production {
            actors: [Actor!]! @relationship(type: "STARRED_IN", direction: IN)
        }

        type Actor {
            name: String
        }

        type ActedIn @relationshipProperties {
            role: String
        }
    "#})
    .unwrap_err();

    assert_eq!(
        error,
        BuildError::DeclaredRelationshipProperties {
            interface: String::from("Production"),
            field: String::from("actors"),
        }
    );
}

#[test]
fn passthrough_definitions_are_kept() {
    let model = build(indoc! {r#"
        directive @cached(ttl: Int) repeatable on FIELD_DEFINITION | OBJECT

        enum Genre { ACTION DRAMA }

        scalar Url

        input Range { from: Int, to: Int }

        type Movie {
            genre: Genre
            homepage: Url @cached(ttl: 10)
        }
    "#})
    .unwrap();

    assert!(model.is_enum("Genre"));
    assert_eq!(model.scalars()[0].name, "Url");
    assert_eq!(model.inputs()[0].fields.len(), 2);

    let cached = &model.directive_definitions()[0];
    assert!(cached.repeatable);
    assert_eq!(cached.locations, ["FIELD_DEFINITION", "OBJECT"]);

    let homepage = model.find_entity("Movie").unwrap().find_attribute("homepage").unwrap();
    assert_eq!(homepage.annotations().user_directives()[0].to_string(), "@cached(ttl: 10)");
}

#[test]
fn entity_fields_without_a_relationship_are_rejected() {
    let error = build("type Movie { director: Person } type Person { name: String }").unwrap_err();

    insta::assert_snapshot!(
        error,
        @"Field Movie.director returns the type `Person`, which needs a @relationship or a @cypher directive."
    );
}

#[test]
fn nested_lists_are_rejected() {
    let error = build("type Movie { ratings: [[Int]] }").unwrap_err();

    assert_eq!(
        error,
        BuildError::NestedList {
            entity: String::from("Movie"),
            field: String::from("ratings"),
        }
    );
}

#[test]
fn missing_types_are_reported() {
    let error = build("type Movie { rating: Rating }").unwrap_err();

    insta::assert_snapshot!(error, @"Could not find the type definition `Rating`, referenced from Movie.rating.");
}

#[test]
fn aggregations_on_booleans_are_rejected() {
    let error = build("type Movie { released: Boolean @filterable(byAggregate: true) }").unwrap_err();

    assert!(matches!(error, BuildError::NotAggregable { ref field, .. } if field == "released"));
}

#[test]
fn explicit_aggregation_needs_an_aggregable_target() {
    let error = build(indoc! {r#"
        type Movie {
            actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN, aggregate: true)
        }

        type Actor @query(read: true, aggregate: false) {
            name: String
        }
    "#})
    .unwrap_err();

    assert!(matches!(error, BuildError::AggregateForbiddenByTarget { ref target, .. } if target == "Actor"));
}

#[test]
fn global_ids_must_be_unique() {
    let error = build("type Movie { id: ID!, dbId: ID! @relayId }").unwrap_err();
    assert_eq!(
        error,
        BuildError::GlobalIdConflict {
            entity: String::from("Movie")
        }
    );

    let error = build("type Movie { a: ID! @relayId, b: ID! @relayId }").unwrap_err();
    insta::assert_snapshot!(error, @"Type Movie has more than one @relayId field: a, b.");
}

#[test]
fn global_nodes_get_the_id_filter() {
    let model = build("type Movie { dbId: ID! @relayId, title: String }").unwrap();
    let movie = model.find_entity("Movie").unwrap();

    assert!(movie.is_global_node());
    assert_eq!(movie.get().where_keys().get("id"), Some(WhereKey::GlobalId));
}

#[test]
fn fulltext_indexes_need_string_fields() {
    let error = build(indoc! {r#"
        type Movie @fulltext(indexes: [{ indexName: "MovieTitle", fields: ["released"] }]) {
            title: String
            released: Int
        }
    "#})
    .unwrap_err();

    assert!(matches!(error, BuildError::FulltextField { ref field, .. } if field == "released"));

    let model = build(indoc! {r#"
        type Movie @fulltext(indexes: [{ indexName: "MovieTitle", fields: ["title"] }]) {
            title: String
        }
    "#})
    .unwrap();

    let movie = model.find_entity("Movie").unwrap();
    assert!(movie.fulltext_index("MovieTitle").is_ok());
    insta::assert_snapshot!(
        movie.fulltext_index("Missing").unwrap_err(),
        @"Could not find index Missing on node Movie"
    );
}

#[test]
fn interfaces_need_implementations_when_targeted() {
    let error = build(indoc! {r#"
        interface Production { title: String }

        type Actor {
            productions: [Production!]! @relationship(type: "ACTED_IN", direction: OUT)
        }
    "#})
    .unwrap_err();

    assert!(matches!(error, BuildError::InterfaceWithoutImplementations { ref interface, .. } if interface == "Production"));
}

#[test]
fn union_members_must_be_objects() {
    let error = build("interface Production { title: String } type Movie { title: String } union Search = Movie | Production")
        .unwrap_err();

    assert!(matches!(error, BuildError::InvalidUnionMember { ref member, .. } if member == "Production"));
}

#[test]
fn timestamps_need_date_times() {
    let error = build("type Movie { createdAt: String @timestamp }").unwrap_err();

    assert!(matches!(error, BuildError::InvalidTimestamp { ref field, .. } if field == "createdAt"));
}

#[test]
fn schema_directives_and_root_fields() {
    let model = build(indoc! {r#"
        schema @link(url: "https://specs.apollo.dev/federation/v2.0", import: ["@key"]) @mutation(operations: [CREATE]) {
            query: Query
        }

        type Movie @key(fields: "title") {
            title: String
        }

        type Query {
            topMovie: Movie @cypher(statement: "MATCH (m:Movie) RETURN m LIMIT 1", columnName: "m")
        }
    "#})
    .unwrap();

    assert!(model.is_federation());

    let movie = model.find_entity("Movie").unwrap();
    assert!(movie.get().allows(crate::MutationOperation::Create));
    assert!(!movie.get().allows(crate::MutationOperation::Delete));

    let top_movie = model.operations().query.field("topMovie").unwrap();
    assert!(top_movie.is_cypher());
}
