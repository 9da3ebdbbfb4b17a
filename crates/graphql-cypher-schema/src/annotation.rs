//! Directive parsing.
//!
//! The directives of one definition are grouped by name and each group goes
//! through the parser registered for that name. Directives outside of our
//! vocabulary are kept verbatim as [`UserDirective`]s and copied to the
//! generated schema.

mod arguments;
mod authorization;
mod capability;
mod entity;
mod field;
mod relationship;

use std::{fmt, str::FromStr};

use async_graphql_parser::{types::ConstDirective, Positioned};
use indexmap::IndexMap;

pub use authorization::{AuthorizationAnnotation, AuthorizationFilterRule, AuthorizationOperation};
pub use capability::{
    FilterableAnnotation, MutationAnnotation, MutationOperation, QueryAnnotation, SelectableAnnotation,
    SettableAnnotation, SubscriptionAnnotation,
};
pub use entity::{FulltextAnnotation, FulltextIndex, LimitAnnotation, NodeAnnotation, PluralAnnotation};
pub use field::{
    AliasAnnotation, CoalesceAnnotation, CypherAnnotation, DefaultAnnotation, IdAnnotation, PopulatedByAnnotation,
    TimestampAnnotation, UniqueAnnotation, WriteOperation,
};
pub use relationship::{NestedOperation, QueryDirection, RelationshipAnnotation, RelationshipDirection};

use crate::AnnotationError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum_macros::EnumString, strum_macros::AsRefStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum AnnotationKind {
    Relationship,
    DeclareRelationship,
    RelationshipProperties,
    Cypher,
    Filterable,
    Selectable,
    Settable,
    Query,
    Mutation,
    Subscription,
    Id,
    RelayId,
    Unique,
    Default,
    Coalesce,
    Limit,
    Fulltext,
    Authorization,
    Authentication,
    Timestamp,
    PopulatedBy,
    Alias,
    Plural,
    Node,
    Private,
    Jwt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationLocation {
    Schema,
    Object,
    Interface,
    Union,
    Field,
}

impl AnnotationLocation {
    fn description(self) -> &'static str {
        match self {
            AnnotationLocation::Schema => "the schema",
            AnnotationLocation::Object => "object types",
            AnnotationLocation::Interface => "interfaces",
            AnnotationLocation::Union => "unions",
            AnnotationLocation::Field => "fields",
        }
    }

    /// The annotations the translator knows how to honor at this location.
    fn supports(self, kind: AnnotationKind) -> bool {
        use AnnotationKind::*;

        match self {
            AnnotationLocation::Schema => matches!(kind, Query | Mutation | Subscription | Authentication),
            AnnotationLocation::Object => matches!(
                kind,
                RelationshipProperties
                    | Query
                    | Mutation
                    | Subscription
                    | Limit
                    | Fulltext
                    | Authorization
                    | Plural
                    | Node
                    | Jwt
            ),
            AnnotationLocation::Interface => matches!(kind, RelationshipProperties | Limit | Plural),
            AnnotationLocation::Union => matches!(kind, Query | Plural),
            AnnotationLocation::Field => matches!(
                kind,
                Relationship
                    | DeclareRelationship
                    | Cypher
                    | Filterable
                    | Selectable
                    | Settable
                    | Id
                    | RelayId
                    | Unique
                    | Default
                    | Coalesce
                    | Timestamp
                    | PopulatedBy
                    | Alias
                    | Private
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Relationship(RelationshipAnnotation),
    DeclareRelationship,
    RelationshipProperties,
    Cypher(CypherAnnotation),
    Filterable(FilterableAnnotation),
    Selectable(SelectableAnnotation),
    Settable(SettableAnnotation),
    Query(QueryAnnotation),
    Mutation(MutationAnnotation),
    Subscription(SubscriptionAnnotation),
    Id(IdAnnotation),
    RelayId,
    Unique(UniqueAnnotation),
    Default(DefaultAnnotation),
    Coalesce(CoalesceAnnotation),
    Limit(LimitAnnotation),
    Fulltext(FulltextAnnotation),
    Authorization(AuthorizationAnnotation),
    Authentication,
    Timestamp(TimestampAnnotation),
    PopulatedBy(PopulatedByAnnotation),
    Alias(AliasAnnotation),
    Plural(PluralAnnotation),
    Node(NodeAnnotation),
    Private,
    Jwt,
}

/// A directive from outside our vocabulary, copied as is to the generated schema.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDirective {
    pub name: String,
    pub arguments: Vec<(String, String)>,
}

impl UserDirective {
    pub(crate) fn new(directive: &ConstDirective) -> Self {
        Self {
            name: directive.name.node.to_string(),
            arguments: directive
                .arguments
                .iter()
                .map(|(name, value)| (name.node.to_string(), value.node.to_string()))
                .collect(),
        }
    }

    pub fn is_deprecated(&self) -> bool {
        self.name == "deprecated"
    }
}

impl fmt::Display for UserDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;

        if !self.arguments.is_empty() {
            f.write_str("(")?;

            for (i, (name, value)) in self.arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }

                write!(f, "{name}: {value}")?;
            }

            f.write_str(")")?;
        }

        Ok(())
    }
}

/// Entity-level defaults coming from schema-level `@query`/`@mutation` or configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityDefaults {
    pub query: QueryAnnotation,
    pub mutation: MutationAnnotation,
}

/// The parsed annotations of one definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    parsed: IndexMap<AnnotationKind, Annotation>,
    /// Kinds that were filled in from defaults rather than written out.
    injected: Vec<AnnotationKind>,
    user_directives: Vec<UserDirective>,
}

/// Parses the directives of one definition.
///
/// Fails on repeated directives, unknown arguments, and vocabulary directives
/// the location cannot honor. Defaults are injected afterwards for the
/// capability annotations that were not written explicitly.
pub fn parse_annotations(
    directives: &[Positioned<ConstDirective>],
    location: AnnotationLocation,
    defaults: &EntityDefaults,
) -> Result<Annotations, AnnotationError> {
    let mut groups: IndexMap<&str, Vec<&Positioned<ConstDirective>>> = IndexMap::new();

    for directive in directives {
        groups.entry(directive.node.name.node.as_str()).or_default().push(directive);
    }

    let mut annotations = Annotations::default();

    for (name, group) in groups {
        let first = group[0];

        let Ok(kind) = AnnotationKind::from_str(name) else {
            annotations
                .user_directives
                .extend(group.iter().map(|directive| UserDirective::new(&directive.node)));

            continue;
        };

        if !location.supports(kind) {
            return Err(AnnotationError::UnsupportedLocation {
                pos: first.pos,
                directive: name.to_string(),
                location: location.description(),
            });
        }

        annotations.parsed.insert(kind, parse_one(kind, first, &group)?);
    }

    annotations.inject_defaults(location, defaults);

    Ok(annotations)
}

fn parse_one(
    kind: AnnotationKind,
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<Annotation, AnnotationError> {
    let annotation = match kind {
        AnnotationKind::Relationship => Annotation::Relationship(relationship::parse_relationship(first, group)?),
        AnnotationKind::DeclareRelationship => {
            entity::parse_marker(first, group)?;
            Annotation::DeclareRelationship
        }
        AnnotationKind::RelationshipProperties => {
            entity::parse_marker(first, group)?;
            Annotation::RelationshipProperties
        }
        AnnotationKind::Cypher => Annotation::Cypher(field::parse_cypher(first, group)?),
        AnnotationKind::Filterable => Annotation::Filterable(capability::parse_filterable(first, group)?),
        AnnotationKind::Selectable => Annotation::Selectable(capability::parse_selectable(first, group)?),
        AnnotationKind::Settable => Annotation::Settable(capability::parse_settable(first, group)?),
        AnnotationKind::Query => Annotation::Query(capability::parse_query(first, group)?),
        AnnotationKind::Mutation => Annotation::Mutation(capability::parse_mutation(first, group)?),
        AnnotationKind::Subscription => Annotation::Subscription(capability::parse_subscription(first, group)?),
        AnnotationKind::Id => Annotation::Id(field::parse_id(first, group)?),
        AnnotationKind::RelayId => {
            entity::parse_marker(first, group)?;
            Annotation::RelayId
        }
        AnnotationKind::Unique => Annotation::Unique(field::parse_unique(first, group)?),
        AnnotationKind::Default => Annotation::Default(field::parse_default(first, group)?),
        AnnotationKind::Coalesce => Annotation::Coalesce(field::parse_coalesce(first, group)?),
        AnnotationKind::Limit => Annotation::Limit(entity::parse_limit(first, group)?),
        AnnotationKind::Fulltext => Annotation::Fulltext(entity::parse_fulltext(first, group)?),
        AnnotationKind::Authorization => Annotation::Authorization(authorization::parse_authorization(first, group)?),
        AnnotationKind::Authentication => Annotation::Authentication,
        AnnotationKind::Timestamp => Annotation::Timestamp(field::parse_timestamp(first, group)?),
        AnnotationKind::PopulatedBy => Annotation::PopulatedBy(field::parse_populated_by(first, group)?),
        AnnotationKind::Alias => Annotation::Alias(field::parse_alias(first, group)?),
        AnnotationKind::Plural => Annotation::Plural(entity::parse_plural(first, group)?),
        AnnotationKind::Node => Annotation::Node(entity::parse_node(first, group)?),
        AnnotationKind::Private => {
            entity::parse_marker(first, group)?;
            Annotation::Private
        }
        AnnotationKind::Jwt => {
            entity::parse_marker(first, group)?;
            Annotation::Jwt
        }
    };

    Ok(annotation)
}

impl Annotations {
    fn inject_defaults(&mut self, location: AnnotationLocation, defaults: &EntityDefaults) {
        match location {
            AnnotationLocation::Field => {
                self.inject(AnnotationKind::Filterable, || {
                    Annotation::Filterable(FilterableAnnotation::default())
                });
                self.inject(AnnotationKind::Selectable, || {
                    Annotation::Selectable(SelectableAnnotation::default())
                });
                self.inject(AnnotationKind::Settable, || Annotation::Settable(SettableAnnotation::default()));
            }
            AnnotationLocation::Object | AnnotationLocation::Union => {
                self.inject(AnnotationKind::Query, || Annotation::Query(defaults.query));
                self.inject(AnnotationKind::Mutation, || Annotation::Mutation(defaults.mutation.clone()));
            }
            AnnotationLocation::Schema | AnnotationLocation::Interface => (),
        }
    }

    fn inject(&mut self, kind: AnnotationKind, default: impl FnOnce() -> Annotation) {
        if !self.parsed.contains_key(&kind) {
            self.parsed.insert(kind, default());
            self.injected.push(kind);
        }
    }

    /// True if the directive was written on the definition.
    pub fn is_explicit(&self, kind: AnnotationKind) -> bool {
        self.parsed.contains_key(&kind) && !self.injected.contains(&kind)
    }

    /// Fills in the kinds missing here from an inherited set, e.g. an
    /// interface field's directives on its implementations.
    pub(crate) fn inherit(&mut self, inherited: &Annotations) {
        for (kind, annotation) in &inherited.parsed {
            if inherited.injected.contains(kind) || self.is_explicit(*kind) {
                continue;
            }

            self.parsed.insert(*kind, annotation.clone());
            self.injected.retain(|injected| injected != kind);
        }

        for directive in &inherited.user_directives {
            if !self.user_directives.iter().any(|existing| existing.name == directive.name) {
                self.user_directives.push(directive.clone());
            }
        }
    }

    pub fn contains(&self, kind: AnnotationKind) -> bool {
        self.parsed.contains_key(&kind)
    }

    pub fn get(&self, kind: AnnotationKind) -> Option<&Annotation> {
        self.parsed.get(&kind)
    }

    pub fn user_directives(&self) -> &[UserDirective] {
        &self.user_directives
    }

    pub fn relationship(&self) -> Option<&RelationshipAnnotation> {
        match self.get(AnnotationKind::Relationship) {
            Some(Annotation::Relationship(annotation)) => Some(annotation),
            _ => None,
        }
    }

    /// An interface field whose relationship each implementation declares
    /// with its own `@relationship`.
    pub fn declares_relationship(&self) -> bool {
        self.contains(AnnotationKind::DeclareRelationship)
    }

    pub fn cypher(&self) -> Option<&CypherAnnotation> {
        match self.get(AnnotationKind::Cypher) {
            Some(Annotation::Cypher(annotation)) => Some(annotation),
            _ => None,
        }
    }

    pub fn filterable(&self) -> FilterableAnnotation {
        match self.get(AnnotationKind::Filterable) {
            Some(Annotation::Filterable(annotation)) => *annotation,
            _ => FilterableAnnotation::default(),
        }
    }

    pub fn selectable(&self) -> SelectableAnnotation {
        match self.get(AnnotationKind::Selectable) {
            Some(Annotation::Selectable(annotation)) => *annotation,
            _ => SelectableAnnotation::default(),
        }
    }

    pub fn settable(&self) -> SettableAnnotation {
        match self.get(AnnotationKind::Settable) {
            Some(Annotation::Settable(annotation)) => *annotation,
            _ => SettableAnnotation::default(),
        }
    }

    pub fn query(&self) -> QueryAnnotation {
        match self.get(AnnotationKind::Query) {
            Some(Annotation::Query(annotation)) => *annotation,
            _ => QueryAnnotation::default(),
        }
    }

    pub fn mutation(&self) -> MutationAnnotation {
        match self.get(AnnotationKind::Mutation) {
            Some(Annotation::Mutation(annotation)) => annotation.clone(),
            _ => MutationAnnotation::default(),
        }
    }

    pub fn subscription(&self) -> Option<&SubscriptionAnnotation> {
        match self.get(AnnotationKind::Subscription) {
            Some(Annotation::Subscription(annotation)) => Some(annotation),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<IdAnnotation> {
        match self.get(AnnotationKind::Id) {
            Some(Annotation::Id(annotation)) => Some(*annotation),
            _ => None,
        }
    }

    pub fn relay_id(&self) -> bool {
        self.contains(AnnotationKind::RelayId)
    }

    pub fn unique(&self) -> Option<&UniqueAnnotation> {
        match self.get(AnnotationKind::Unique) {
            Some(Annotation::Unique(annotation)) => Some(annotation),
            _ => None,
        }
    }

    pub fn default_value(&self) -> Option<&DefaultAnnotation> {
        match self.get(AnnotationKind::Default) {
            Some(Annotation::Default(annotation)) => Some(annotation),
            _ => None,
        }
    }

    pub fn coalesce(&self) -> Option<&CoalesceAnnotation> {
        match self.get(AnnotationKind::Coalesce) {
            Some(Annotation::Coalesce(annotation)) => Some(annotation),
            _ => None,
        }
    }

    pub fn limit(&self) -> Option<LimitAnnotation> {
        match self.get(AnnotationKind::Limit) {
            Some(Annotation::Limit(annotation)) => Some(*annotation),
            _ => None,
        }
    }

    pub fn fulltext(&self) -> Option<&FulltextAnnotation> {
        match self.get(AnnotationKind::Fulltext) {
            Some(Annotation::Fulltext(annotation)) => Some(annotation),
            _ => None,
        }
    }

    pub fn authorization(&self) -> Option<&AuthorizationAnnotation> {
        match self.get(AnnotationKind::Authorization) {
            Some(Annotation::Authorization(annotation)) => Some(annotation),
            _ => None,
        }
    }

    pub fn timestamp(&self) -> Option<&TimestampAnnotation> {
        match self.get(AnnotationKind::Timestamp) {
            Some(Annotation::Timestamp(annotation)) => Some(annotation),
            _ => None,
        }
    }

    pub fn populated_by(&self) -> Option<&PopulatedByAnnotation> {
        match self.get(AnnotationKind::PopulatedBy) {
            Some(Annotation::PopulatedBy(annotation)) => Some(annotation),
            _ => None,
        }
    }

    pub fn alias(&self) -> Option<&AliasAnnotation> {
        match self.get(AnnotationKind::Alias) {
            Some(Annotation::Alias(annotation)) => Some(annotation),
            _ => None,
        }
    }

    pub fn plural(&self) -> Option<&str> {
        match self.get(AnnotationKind::Plural) {
            Some(Annotation::Plural(annotation)) => Some(&annotation.value),
            _ => None,
        }
    }

    pub fn node(&self) -> Option<&NodeAnnotation> {
        match self.get(AnnotationKind::Node) {
            Some(Annotation::Node(annotation)) => Some(annotation),
            _ => None,
        }
    }

    pub fn is_private(&self) -> bool {
        self.contains(AnnotationKind::Private)
    }

    pub fn is_relationship_properties(&self) -> bool {
        self.contains(AnnotationKind::RelationshipProperties)
    }

    pub fn is_jwt(&self) -> bool {
        self.contains(AnnotationKind::Jwt)
    }
}

#[cfg(test)]
mod tests {
    use async_graphql_parser::{parse_schema, types::TypeSystemDefinition};

    use super::*;

    fn annotations_of_first_field(sdl: &str) -> Result<Annotations, AnnotationError> {
        let document = parse_schema(sdl).unwrap();

        let field = document
            .definitions
            .iter()
            .find_map(|definition| match definition {
                TypeSystemDefinition::Type(ty) => match &ty.node.kind {
                    async_graphql_parser::types::TypeKind::Object(object) => object.fields.first().cloned(),
                    _ => None,
                },
                _ => None,
            })
            .unwrap();

        parse_annotations(
            &field.node.directives,
            AnnotationLocation::Field,
            &EntityDefaults::default(),
        )
    }

    #[test]
    fn defaults_are_injected_when_absent() {
        let annotations = annotations_of_first_field("type Movie { title: String }").unwrap();

        assert_eq!(
            annotations.filterable(),
            FilterableAnnotation {
                by_value: true,
                by_aggregate: false,
                aggregate_requested: false,
            }
        );

        assert_eq!(
            annotations.selectable(),
            SelectableAnnotation {
                on_read: true,
                on_aggregate: false,
                aggregate_requested: false,
            }
        );
    }

    #[test]
    fn explicit_values_are_kept() {
        let annotations =
            annotations_of_first_field("type Movie { title: String @filterable(byValue: false) }").unwrap();

        assert_eq!(
            annotations.filterable(),
            FilterableAnnotation {
                by_value: false,
                by_aggregate: true,
                aggregate_requested: false,
            }
        );
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        let error = annotations_of_first_field("type Movie { title: String @filterable(byName: true) }").unwrap_err();

        assert!(matches!(error, AnnotationError::UnknownArgument { ref argument, .. } if argument == "byName"));
        assert!(error
            .to_string()
            .ends_with("Directive @filterable does not support the argument `byName`."));
    }

    #[test]
    fn repeated_cypher_is_rejected() {
        let error = annotations_of_first_field(
            r#"type Movie { score: Int @cypher(statement: "RETURN 1 AS a", columnName: "a") @cypher(statement: "RETURN 2 AS a", columnName: "a") }"#,
        )
        .unwrap_err();

        assert!(matches!(error, AnnotationError::Repeated { ref directive, .. } if directive == "cypher"));
    }

    #[test]
    fn vocabulary_on_the_wrong_location_is_rejected() {
        let error = annotations_of_first_field("type Movie { title: String @fulltext(indexes: []) }").unwrap_err();

        assert!(matches!(error, AnnotationError::UnsupportedLocation { ref directive, .. } if directive == "fulltext"));
    }

    #[test]
    fn user_directives_pass_through() {
        let annotations =
            annotations_of_first_field(r#"type Movie { title: String @deprecated(reason: "gone") }"#).unwrap();

        let rendered: Vec<_> = annotations.user_directives().iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec![r#"@deprecated(reason: "gone")"#]);
    }
}
