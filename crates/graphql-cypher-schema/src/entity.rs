use indexmap::IndexMap;

use crate::{
    annotation::{Annotations, AuthorizationAnnotation, FulltextAnnotation, LimitAnnotation, MutationOperation},
    filter_keys::{AggregationKeyTable, WhereKeyTable},
    Attribute, EntityId, RelationshipId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Concrete,
    Interface,
    Union,
}

/// An object, interface or union type of the user's type definitions.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Concrete(ConcreteEntity),
    Interface(InterfaceEntity),
    Union(UnionEntity),
}

/// One field of an entity, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef {
    Attribute(usize),
    Relationship(RelationshipId),
}

/// The fields of an object or interface type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityFields {
    pub(crate) attributes: IndexMap<String, Attribute>,
    pub(crate) relationships: IndexMap<String, RelationshipId>,
    pub(crate) order: Vec<FieldRef>,
    pub(crate) where_keys: WhereKeyTable,
    pub(crate) aggregation_keys: AggregationKeyTable,
}

impl EntityFields {
    pub(crate) fn push_attribute(&mut self, attribute: Attribute) {
        let (index, _) = self.attributes.insert_full(attribute.name.clone(), attribute);
        self.order.push(FieldRef::Attribute(index));
    }

    pub(crate) fn push_relationship(&mut self, name: &str, id: RelationshipId) {
        self.relationships.insert(name.to_string(), id);
        self.order.push(FieldRef::Relationship(id));
    }
}

/// A node label of the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcreteEntity {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) labels: Vec<String>,
    pub(crate) plural: String,
    pub(crate) fields: EntityFields,
    pub(crate) interfaces: Vec<EntityId>,
    pub(crate) unions: Vec<EntityId>,
    pub(crate) annotations: Annotations,
}

/// Fields shared by several concrete entities.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceEntity {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) plural: String,
    pub(crate) fields: EntityFields,
    pub(crate) implementations: Vec<EntityId>,
    pub(crate) annotations: Annotations,
}

/// A disjoint set of concrete entities without shared fields.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionEntity {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) plural: String,
    pub(crate) members: Vec<EntityId>,
    /// Only the member filters, unions have no fields of their own.
    pub(crate) fields: EntityFields,
    pub(crate) annotations: Annotations,
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Concrete(_) => EntityKind::Concrete,
            Entity::Interface(_) => EntityKind::Interface,
            Entity::Union(_) => EntityKind::Union,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::Concrete(entity) => &entity.name,
            Entity::Interface(entity) => &entity.name,
            Entity::Union(entity) => &entity.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Entity::Concrete(entity) => entity.description.as_deref(),
            Entity::Interface(entity) => entity.description.as_deref(),
            Entity::Union(entity) => entity.description.as_deref(),
        }
    }

    pub fn plural(&self) -> &str {
        match self {
            Entity::Concrete(entity) => &entity.plural,
            Entity::Interface(entity) => &entity.plural,
            Entity::Union(entity) => &entity.plural,
        }
    }

    pub fn annotations(&self) -> &Annotations {
        match self {
            Entity::Concrete(entity) => &entity.annotations,
            Entity::Interface(entity) => &entity.annotations,
            Entity::Union(entity) => &entity.annotations,
        }
    }

    pub fn fields(&self) -> &EntityFields {
        match self {
            Entity::Concrete(entity) => &entity.fields,
            Entity::Interface(entity) => &entity.fields,
            Entity::Union(entity) => &entity.fields,
        }
    }

    pub(crate) fn fields_mut(&mut self) -> &mut EntityFields {
        match self {
            Entity::Concrete(entity) => &mut entity.fields,
            Entity::Interface(entity) => &mut entity.fields,
            Entity::Union(entity) => &mut entity.fields,
        }
    }

    pub fn where_keys(&self) -> &WhereKeyTable {
        &self.fields().where_keys
    }

    pub fn aggregation_keys(&self) -> &AggregationKeyTable {
        &self.fields().aggregation_keys
    }

    pub fn attributes(&self) -> impl ExactSizeIterator<Item = &Attribute> + '_ {
        self.fields().attributes.values()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.fields().attributes.get(name)
    }

    pub fn attribute_at(&self, index: usize) -> Option<&Attribute> {
        self.fields().attributes.get_index(index).map(|(_, attribute)| attribute)
    }

    pub fn as_concrete(&self) -> Option<&ConcreteEntity> {
        match self {
            Entity::Concrete(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self, Entity::Concrete(_))
    }

    pub fn is_abstract(&self) -> bool {
        !self.is_concrete()
    }

    pub fn is_readable(&self) -> bool {
        self.annotations().query().read
    }

    /// The `<plural>Aggregate` root field is generated.
    pub fn is_root_aggregable(&self) -> bool {
        self.is_concrete() && self.annotations().query().aggregate
    }

    pub fn allows(&self, operation: MutationOperation) -> bool {
        self.is_concrete() && self.annotations().mutation().allows(operation)
    }

    pub fn limit(&self) -> Option<LimitAnnotation> {
        self.annotations().limit()
    }

    pub fn authorization(&self) -> Option<&AuthorizationAnnotation> {
        self.annotations().authorization()
    }

    pub fn fulltext(&self) -> Option<&FulltextAnnotation> {
        self.annotations().fulltext()
    }

    /// The `@relayId` attribute of a global node.
    pub fn global_id_attribute(&self) -> Option<&Attribute> {
        match self {
            Entity::Concrete(_) => self.attributes().find(|attribute| attribute.is_global_id()),
            _ => None,
        }
    }

    pub fn unique_attributes(&self) -> impl Iterator<Item = &Attribute> + '_ {
        self.attributes().filter(|attribute| attribute.is_unique())
    }
}

impl ConcreteEntity {
    /// The first label is the primary one.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
