mod entity;
mod properties;
mod relationship;

pub use entity::{EntityField, EntityWalker};
pub use properties::PropertiesWalker;
pub use relationship::RelationshipWalker;

use crate::SchemaModel;

/// An id together with the model it belongs to.
#[derive(Clone, Copy)]
pub struct Walker<'a, Id> {
    pub(crate) id: Id,
    pub(crate) model: &'a SchemaModel,
}

impl<'a, Id> Walker<'a, Id> {
    pub fn new(id: Id, model: &'a SchemaModel) -> Self {
        Self { id, model }
    }

    pub fn walk<Other>(self, id: Other) -> Walker<'a, Other> {
        Walker { id, model: self.model }
    }

    pub fn model(self) -> &'a SchemaModel {
        self.model
    }
}

impl<'a, Id: Copy> Walker<'a, Id>
where
    SchemaModel: std::ops::Index<Id>,
{
    pub fn id(self) -> Id {
        self.id
    }

    pub fn get(self) -> &'a <SchemaModel as std::ops::Index<Id>>::Output {
        &self.model[self.id]
    }
}

impl<Id: PartialEq> PartialEq for Walker<'_, Id> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.model, other.model)
    }
}
