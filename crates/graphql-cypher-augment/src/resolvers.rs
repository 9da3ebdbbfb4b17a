//! What each generated field resolves with. The map only describes the
//! resolvers; running them is up to the caller.

use graphql_cypher_schema::{EntityId, RelationshipId};
use indexmap::{IndexMap, IndexSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootOperation {
    Query,
    Mutation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldResolver {
    /// `movies`, and the root read of an interface.
    Read { entity: EntityId },
    /// `moviesAggregate`
    Aggregate { entity: EntityId },
    /// `moviesConnection`
    Connection { entity: EntityId },
    Create { entity: EntityId },
    Update { entity: EntityId },
    Delete { entity: EntityId },
    Fulltext { entity: EntityId, index: String },
    /// A `@cypher` field of the Query or Mutation type.
    CustomCypher { operation: RootOperation, field: String },
    /// `node(id:)`
    GlobalNode,
    /// The synthetic `id` of a global node.
    GlobalId { entity: EntityId },
    /// Reads a numeric value the translator already projected.
    Numerical,
    /// A relationship connection field, shaped by the translator.
    ConnectionField { relationship: RelationshipId },
    /// An entity `@cypher` field, projected by the translator.
    CypherField { entity: EntityId, attribute: String },
}

impl FieldResolver {
    pub fn is_root(&self) -> bool {
        matches!(
            self,
            FieldResolver::Read { .. }
                | FieldResolver::Aggregate { .. }
                | FieldResolver::Connection { .. }
                | FieldResolver::Create { .. }
                | FieldResolver::Update { .. }
                | FieldResolver::Delete { .. }
                | FieldResolver::Fulltext { .. }
                | FieldResolver::CustomCypher { .. }
                | FieldResolver::GlobalNode
        )
    }
}

/// Resolvers keyed by type and field name, plus the abstract types that need
/// `__resolveType`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolverMap {
    fields: IndexMap<String, IndexMap<String, FieldResolver>>,
    resolve_type: IndexSet<String>,
}

impl ResolverMap {
    pub fn field(&self, type_name: &str, field: &str) -> Option<&FieldResolver> {
        self.fields.get(type_name)?.get(field)
    }

    pub fn fields_of(&self, type_name: &str) -> impl Iterator<Item = (&str, &FieldResolver)> + '_ {
        self.fields
            .get(type_name)
            .into_iter()
            .flat_map(|fields| fields.iter().map(|(name, resolver)| (name.as_str(), resolver)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &FieldResolver)> + '_ {
        self.fields.iter().flat_map(|(type_name, fields)| {
            fields
                .iter()
                .map(move |(field, resolver)| (type_name.as_str(), field.as_str(), resolver))
        })
    }

    pub fn resolves_type(&self, type_name: &str) -> bool {
        self.resolve_type.contains(type_name)
    }

    pub fn abstract_types(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.resolve_type.iter().map(String::as_str)
    }

    pub(crate) fn insert(&mut self, type_name: &str, field: &str, resolver: FieldResolver) {
        self.fields
            .entry(type_name.to_string())
            .or_default()
            .insert(field.to_string(), resolver);
    }

    pub(crate) fn insert_resolve_type(&mut self, type_name: &str) {
        self.resolve_type.insert(type_name.to_string());
    }

    pub(crate) fn retain_types(&mut self, keep: impl Fn(&str) -> bool) {
        self.fields.retain(|type_name, _| keep(type_name));
        self.resolve_type.retain(|type_name| keep(type_name));
    }

    pub(crate) fn remove_field(&mut self, type_name: &str, field: &str) {
        if let Some(fields) = self.fields.get_mut(type_name) {
            fields.shift_remove(field);
        }
    }
}
