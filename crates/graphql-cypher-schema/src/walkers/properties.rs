use super::{RelationshipWalker, Walker};
use crate::{PropertiesId, PropertiesNames};

/// A `@relationshipProperties` type.
pub type PropertiesWalker<'a> = Walker<'a, PropertiesId>;

impl<'a> PropertiesWalker<'a> {
    pub fn name(self) -> &'a str {
        self.get().name()
    }

    pub fn names(self) -> PropertiesNames<'a> {
        PropertiesNames::new(self.name())
    }

    /// Every relationship carrying these properties.
    pub fn relationships(self) -> impl Iterator<Item = RelationshipWalker<'a>> + 'a {
        self.model
            .relationships()
            .filter(move |relationship| relationship.get().properties == Some(self.id))
    }
}
