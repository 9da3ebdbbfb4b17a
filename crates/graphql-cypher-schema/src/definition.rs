//! User definitions copied to the generated schema without interpretation.

use indexmap::IndexMap;

use crate::{annotation::UserDirective, filter_keys::WhereKeyTable, Attribute, FieldArgument};

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<UserDirective>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDefinition {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValue>,
    pub directives: Vec<UserDirective>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarDefinition {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<UserDirective>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputDefinition {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldArgument>,
    pub directives: Vec<UserDirective>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveDefinition {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<FieldArgument>,
    pub repeatable: bool,
    /// `FIELD_DEFINITION`, `OBJECT`...
    pub locations: Vec<String>,
}

/// The claims of the `@jwt` type, used to type `where.jwt` filters.
#[derive(Debug, Clone, PartialEq)]
pub struct JwtDefinition {
    pub(crate) name: String,
    pub(crate) attributes: IndexMap<String, Attribute>,
    pub(crate) where_keys: WhereKeyTable,
}

impl JwtDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> impl ExactSizeIterator<Item = &Attribute> + '_ {
        self.attributes.values()
    }

    pub fn attribute_at(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get_index(index).map(|(_, attribute)| attribute)
    }

    pub fn where_keys(&self) -> &WhereKeyTable {
        &self.where_keys
    }
}

/// A root operation type. Its fields are the user's custom root fields,
/// usually `@cypher` ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    pub(crate) name: String,
    pub(crate) fields: IndexMap<String, Attribute>,
    pub(crate) directives: Vec<UserDirective>,
}

impl Operation {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> impl ExactSizeIterator<Item = &Attribute> + '_ {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&Attribute> {
        self.fields.get(name)
    }

    pub fn directives(&self) -> &[UserDirective] {
        &self.directives
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operations {
    pub query: Operation,
    pub mutation: Operation,
}

impl Default for Operations {
    fn default() -> Self {
        Self {
            query: Operation::new("Query"),
            mutation: Operation::new("Mutation"),
        }
    }
}
