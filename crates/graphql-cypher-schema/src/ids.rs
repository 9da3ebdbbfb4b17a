//! Ids are indices into the vectors of the [`SchemaModel`], allocated in
//! declaration order. They can only be created by the builder.

use crate::{Entity, Relationship, RelationshipProperties, SchemaModel};

macro_rules! id_newtypes {
    ($($ty:ident.$field:ident[$name:ident] => $out:ident,)*) => {
        $(
            #[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
            pub struct $name(u32);

            impl std::ops::Index<$name> for $ty {
                type Output = $out;

                fn index(&self, index: $name) -> &$out {
                    &self.$field[index.0 as usize]
                }
            }

            impl std::ops::IndexMut<$name> for $ty {
                fn index_mut(&mut self, index: $name) -> &mut $out {
                    &mut self.$field[index.0 as usize]
                }
            }

            impl From<usize> for $name {
                fn from(index: usize) -> Self {
                    Self(index as u32)
                }
            }

            impl From<$name> for usize {
                fn from(id: $name) -> Self {
                    id.0 as usize
                }
            }
        )*
    }
}

id_newtypes! {
    SchemaModel.entities[EntityId] => Entity,
    SchemaModel.relationships[RelationshipId] => Relationship,
    SchemaModel.properties[PropertiesId] => RelationshipProperties,
}
