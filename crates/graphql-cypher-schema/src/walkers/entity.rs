use super::{RelationshipWalker, Walker};
use crate::{annotation::FulltextIndex, Attribute, BuildError, Entity, EntityId, EntityKind, EntityNames, FieldRef};

/// An object, interface or union of the model.
pub type EntityWalker<'a> = Walker<'a, EntityId>;

/// A field of an entity in declaration order.
#[derive(Clone, Copy)]
pub enum EntityField<'a> {
    Attribute(&'a Attribute),
    Relationship(RelationshipWalker<'a>),
}

impl<'a> EntityField<'a> {
    pub fn name(self) -> &'a str {
        match self {
            EntityField::Attribute(attribute) => attribute.name(),
            EntityField::Relationship(relationship) => relationship.name(),
        }
    }
}

impl<'a> EntityWalker<'a> {
    pub fn name(self) -> &'a str {
        self.get().name()
    }

    pub fn kind(self) -> EntityKind {
        self.get().kind()
    }

    pub fn names(self) -> EntityNames<'a> {
        let entity = self.get();
        EntityNames::new(entity.name(), entity.plural())
    }

    /// The labels to match: the entity's own for a concrete entity, none for
    /// abstract ones.
    pub fn labels(self) -> &'a [String] {
        match self.get() {
            Entity::Concrete(entity) => entity.labels(),
            _ => &[],
        }
    }

    pub fn primary_label(self) -> &'a str {
        self.labels().first().map(String::as_str).unwrap_or_else(|| self.name())
    }

    pub fn attributes(self) -> impl ExactSizeIterator<Item = &'a Attribute> + 'a {
        self.get().attributes()
    }

    pub fn find_attribute(self, name: &str) -> Option<&'a Attribute> {
        self.get().attribute(name)
    }

    pub fn relationships(self) -> impl ExactSizeIterator<Item = RelationshipWalker<'a>> + 'a {
        self.get()
            .fields()
            .relationships
            .values()
            .map(move |id| self.walk(*id))
    }

    pub fn find_relationship(self, name: &str) -> Option<RelationshipWalker<'a>> {
        self.get().fields().relationships.get(name).map(|id| self.walk(*id))
    }

    pub fn fields(self) -> impl Iterator<Item = EntityField<'a>> + 'a {
        let fields = self.get().fields();

        fields.order.iter().filter_map(move |field| match field {
            FieldRef::Attribute(index) => fields
                .attributes
                .get_index(*index)
                .map(|(_, attribute)| EntityField::Attribute(attribute)),
            FieldRef::Relationship(id) => Some(EntityField::Relationship(self.walk(*id))),
        })
    }

    /// The concrete entities this entity can resolve to: itself, the
    /// implementations of an interface, or the members of a union.
    pub fn concrete_entities(self) -> Vec<EntityWalker<'a>> {
        match self.get() {
            Entity::Concrete(_) => vec![self],
            Entity::Interface(entity) => entity.implementations.iter().map(|id| self.walk(*id)).collect(),
            Entity::Union(entity) => entity.members.iter().map(|id| self.walk(*id)).collect(),
        }
    }

    /// The interfaces a concrete entity implements.
    pub fn interfaces(self) -> impl Iterator<Item = EntityWalker<'a>> + 'a {
        let ids = match self.get() {
            Entity::Concrete(entity) => entity.interfaces.as_slice(),
            _ => &[],
        };

        ids.iter().map(move |id| self.walk(*id))
    }

    pub fn unions(self) -> impl Iterator<Item = EntityWalker<'a>> + 'a {
        let ids = match self.get() {
            Entity::Concrete(entity) => entity.unions.as_slice(),
            _ => &[],
        };

        ids.iter().map(move |id| self.walk(*id))
    }

    pub fn is_global_node(self) -> bool {
        self.get().global_id_attribute().is_some()
    }

    pub fn fulltext_index(self, index_name: &str) -> Result<&'a FulltextIndex, BuildError> {
        self.get()
            .fulltext()
            .and_then(|fulltext| fulltext.find_index(index_name))
            .ok_or_else(|| BuildError::MissingFulltextIndex {
                index: index_name.to_string(),
                entity: self.name().to_string(),
            })
    }

    /// The relationships targeting this entity.
    pub fn incoming_relationships(self) -> impl Iterator<Item = RelationshipWalker<'a>> + 'a {
        self.model
            .relationships()
            .filter(move |relationship| relationship.get().target == self.id)
    }
}

impl std::fmt::Debug for EntityWalker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityWalker")
            .field("id", &usize::from(self.id))
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("fields", &self.fields().map(EntityField::name).collect::<Vec<_>>())
            .finish()
    }
}
