//! The entity/relationship model of a set of annotated GraphQL type definitions.
//!
//! [`SchemaModel::from_sdl`] parses the user's type definitions, runs every
//! directive through the annotation parser and builds an immutable graph of
//! entities (concrete types, interfaces and unions), their attributes and
//! relationships. Both the schema generator and the translator read from it;
//! nothing mutates the model after the build.

#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod annotation;
mod attribute;
mod builder;
mod definition;
mod entity;
mod error;
pub mod filter_keys;
mod ids;
mod names;
mod relationship;
mod walkers;

use std::collections::{BTreeSet, HashMap};

pub use annotation::{Annotations, MutationOperation, UserDirective};
pub use attribute::{Attribute, AttributeKind, AttributeType, FieldArgument, ScalarKind};
pub use definition::{
    DirectiveDefinition, EnumDefinition, EnumValue, InputDefinition, JwtDefinition, Operation, Operations,
    ScalarDefinition,
};
pub use entity::{ConcreteEntity, Entity, EntityFields, EntityKind, FieldRef, InterfaceEntity, UnionEntity};
pub use error::{AnnotationError, BuildError};
pub use filter_keys::FilterOptions;
pub use ids::{EntityId, PropertiesId, RelationshipId};
pub use names::{plural_of, EntityNames, PropertiesNames, RelationshipNames};
pub use relationship::{Relationship, RelationshipProperties};
pub use walkers::{EntityField, EntityWalker, PropertiesWalker, RelationshipWalker, Walker};

/// Knobs of the model build that do not come from the type definitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelOptions {
    pub filters: FilterOptions,
    /// Used for entities without `@mutation`, unless the schema itself carries one.
    pub default_mutation_operations: BTreeSet<MutationOperation>,
    /// Generates a federation subgraph even without a `@link` to the
    /// federation specification.
    pub subgraph: bool,
}

/// The model built from the user's type definitions.
///
/// Entities, relationships and properties are stored in declaration order and
/// addressed by id. Lookups by name go through the name maps, iteration always
/// goes through the vectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaModel {
    entities: Vec<Entity>,
    relationships: Vec<Relationship>,
    properties: Vec<RelationshipProperties>,
    entity_names: HashMap<String, EntityId>,
    properties_names: HashMap<String, PropertiesId>,
    operations: Operations,
    enums: Vec<EnumDefinition>,
    scalars: Vec<ScalarDefinition>,
    inputs: Vec<InputDefinition>,
    directive_definitions: Vec<DirectiveDefinition>,
    jwt: Option<JwtDefinition>,
    /// User directives of `schema`/`extend schema`, e.g. `@link`.
    schema_directives: Vec<UserDirective>,
    federation: bool,
    filter_options: FilterOptions,
}

impl SchemaModel {
    /// Builds the model from type definitions in SDL.
    pub fn from_sdl(sdl: &str, options: &ModelOptions) -> Result<Self, BuildError> {
        builder::ModelBuilder::build(sdl, options)
    }

    pub fn walk<Id>(&self, id: Id) -> Walker<'_, Id> {
        Walker::new(id, self)
    }

    /// Every entity, in declaration order.
    pub fn entities(&self) -> impl ExactSizeIterator<Item = EntityWalker<'_>> + '_ {
        (0..self.entities.len()).map(move |id| self.walk(EntityId::from(id)))
    }

    pub fn concrete_entities(&self) -> impl Iterator<Item = EntityWalker<'_>> + '_ {
        self.entities_of_kind(EntityKind::Concrete)
    }

    pub fn interface_entities(&self) -> impl Iterator<Item = EntityWalker<'_>> + '_ {
        self.entities_of_kind(EntityKind::Interface)
    }

    pub fn union_entities(&self) -> impl Iterator<Item = EntityWalker<'_>> + '_ {
        self.entities_of_kind(EntityKind::Union)
    }

    fn entities_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = EntityWalker<'_>> + '_ {
        self.entities().filter(move |entity| entity.kind() == kind)
    }

    pub fn find_entity(&self, name: &str) -> Option<EntityWalker<'_>> {
        self.entity_names.get(name).map(|id| self.walk(*id))
    }

    /// Every relationship, in declaration order.
    pub fn relationships(&self) -> impl ExactSizeIterator<Item = RelationshipWalker<'_>> + '_ {
        (0..self.relationships.len()).map(move |id| self.walk(RelationshipId::from(id)))
    }

    pub fn relationship_properties(&self) -> impl ExactSizeIterator<Item = PropertiesWalker<'_>> + '_ {
        (0..self.properties.len()).map(move |id| self.walk(PropertiesId::from(id)))
    }

    pub fn find_properties(&self, name: &str) -> Option<PropertiesWalker<'_>> {
        self.properties_names.get(name).map(|id| self.walk(*id))
    }

    pub fn global_nodes(&self) -> impl Iterator<Item = EntityWalker<'_>> + '_ {
        self.concrete_entities().filter(|entity| entity.is_global_node())
    }

    pub fn operations(&self) -> &Operations {
        &self.operations
    }

    pub fn enums(&self) -> &[EnumDefinition] {
        &self.enums
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.iter().any(|definition| definition.name == name)
    }

    pub fn scalars(&self) -> &[ScalarDefinition] {
        &self.scalars
    }

    pub fn inputs(&self) -> &[InputDefinition] {
        &self.inputs
    }

    pub fn directive_definitions(&self) -> &[DirectiveDefinition] {
        &self.directive_definitions
    }

    pub fn jwt(&self) -> Option<&JwtDefinition> {
        self.jwt.as_ref()
    }

    pub fn schema_directives(&self) -> &[UserDirective] {
        &self.schema_directives
    }

    /// The definitions link the Apollo federation specification.
    pub fn is_federation(&self) -> bool {
        self.federation
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.filter_options
    }
}
