use super::{EntityWalker, PropertiesWalker, Walker};
use crate::{RelationshipId, RelationshipNames};

/// A relationship field of an entity.
pub type RelationshipWalker<'a> = Walker<'a, RelationshipId>;

impl<'a> RelationshipWalker<'a> {
    pub fn name(self) -> &'a str {
        self.get().name()
    }

    /// The entity declaring the field.
    pub fn source(self) -> EntityWalker<'a> {
        self.walk(self.get().source)
    }

    pub fn target(self) -> EntityWalker<'a> {
        self.walk(self.get().target)
    }

    pub fn properties(self) -> Option<PropertiesWalker<'a>> {
        self.get().properties.map(|id| self.walk(id))
    }

    pub fn names(self) -> RelationshipNames {
        RelationshipNames::new(self.source().name(), self.name(), self.target().name())
    }
}

impl std::fmt::Debug for RelationshipWalker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationshipWalker")
            .field("source", &self.source().name())
            .field("name", &self.name())
            .field("target", &self.target().name())
            .field("type", &self.get().ty())
            .field("direction", &self.get().direction())
            .field("properties", &self.properties().map(|properties| properties.name()))
            .finish()
    }
}
