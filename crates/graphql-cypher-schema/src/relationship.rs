use indexmap::IndexMap;

use crate::{
    annotation::{AnnotationKind, Annotations, NestedOperation, QueryDirection, RelationshipDirection},
    filter_keys::{AggregationKeyTable, WhereKeyTable},
    Attribute, EntityId, PropertiesId,
};

/// A `@relationship` field: a typed edge from the declaring entity to its target.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) source: EntityId,
    pub(crate) target: EntityId,
    pub(crate) ty: String,
    pub(crate) direction: RelationshipDirection,
    pub(crate) query_direction: QueryDirection,
    pub(crate) properties: Option<PropertiesId>,
    pub(crate) nullable: bool,
    /// `Some(item_nullable)` for list relationships.
    pub(crate) list: Option<bool>,
    pub(crate) nested_operations: Vec<NestedOperation>,
    pub(crate) aggregate: bool,
    pub(crate) annotations: Annotations,
}

impl Relationship {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The relationship type in the database.
    pub fn ty(&self) -> &str {
        &self.ty
    }

    pub fn direction(&self) -> RelationshipDirection {
        self.direction
    }

    /// The direction used when matching the relationship for reads and filters.
    pub fn read_direction(&self) -> RelationshipDirection {
        match self.query_direction {
            QueryDirection::Undirected => RelationshipDirection::Undirected,
            QueryDirection::Directed => self.direction,
        }
    }

    /// The direction used when creating the relationship. An undirected
    /// relationship is stored outgoing from its source.
    pub fn write_direction(&self) -> RelationshipDirection {
        match self.direction {
            RelationshipDirection::Undirected => RelationshipDirection::Out,
            direction => direction,
        }
    }

    pub fn is_list(&self) -> bool {
        self.list.is_some()
    }

    pub fn is_required(&self) -> bool {
        !self.nullable
    }

    pub fn list_items_nullable(&self) -> bool {
        self.list.unwrap_or(true)
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn allows(&self, operation: NestedOperation) -> bool {
        self.nested_operations.contains(&operation)
    }

    pub fn nested_operations(&self) -> &[NestedOperation] {
        &self.nested_operations
    }

    /// Exposes `<field>Aggregate` selections.
    pub fn is_aggregable(&self) -> bool {
        self.aggregate
            && (!self.annotations.is_explicit(AnnotationKind::Selectable)
                || self.annotations.selectable().on_aggregate)
    }

    pub fn is_filterable(&self) -> bool {
        self.annotations.filterable().by_value
    }

    /// Exposes a `<field>Aggregate` filter.
    pub fn is_aggregation_filterable(&self) -> bool {
        self.aggregate
            && (!self.annotations.is_explicit(AnnotationKind::Filterable) || self.annotations.filterable().by_aggregate)
    }

    pub fn is_readable(&self) -> bool {
        self.annotations.selectable().on_read
    }

    pub fn is_creatable(&self) -> bool {
        self.annotations.settable().on_create
    }

    pub fn is_updatable(&self) -> bool {
        self.annotations.settable().on_update
    }

    pub fn is_deprecated(&self) -> bool {
        self.annotations.user_directives().iter().any(|directive| directive.is_deprecated())
    }
}

/// The edge attributes of one or more relationships, from a
/// `@relationshipProperties` type.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipProperties {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) attributes: IndexMap<String, Attribute>,
    pub(crate) where_keys: WhereKeyTable,
    pub(crate) aggregation_keys: AggregationKeyTable,
}

impl RelationshipProperties {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn attributes(&self) -> impl ExactSizeIterator<Item = &Attribute> + '_ {
        self.attributes.values()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn attribute_at(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get_index(index).map(|(_, attribute)| attribute)
    }

    pub fn where_keys(&self) -> &WhereKeyTable {
        &self.where_keys
    }

    pub fn aggregation_keys(&self) -> &AggregationKeyTable {
        &self.aggregation_keys
    }
}
