//! The selection of one root field with its arguments already coerced to JSON.

use graphql_cypher_schema::EntityWalker;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedField {
    pub name: String,
    pub alias: Option<String>,
    pub arguments: Map<String, Value>,
    pub selection: Vec<ResolvedField>,
    /// Set for fields selected through a fragment on an object, interface or
    /// union type.
    pub type_condition: Option<String>,
}

impl ResolvedField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    pub fn with_arguments(mut self, arguments: Map<String, Value>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_selection(mut self, selection: impl IntoIterator<Item = ResolvedField>) -> Self {
        self.selection.extend(selection);
        self
    }

    pub fn on_type(mut self, type_condition: impl Into<String>) -> Self {
        self.type_condition = Some(type_condition.into());
        self
    }

    /// The key of the field in the response: the alias, or the name.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// An argument, treating an explicit `null` as absent.
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name).filter(|value| !value.is_null())
    }

    pub fn object_argument(&self, name: &str) -> Option<&Map<String, Value>> {
        self.argument(name).and_then(Value::as_object)
    }

    /// The first selected field with the given name.
    pub fn find(&self, name: &str) -> Option<&ResolvedField> {
        self.selection.iter().find(|field| field.name == name)
    }

    /// Fields without a type condition apply everywhere, the others only to
    /// the named type and to the entities implementing or belonging to it.
    pub(crate) fn applies_to(&self, entity: EntityWalker<'_>) -> bool {
        let Some(condition) = self.type_condition.as_deref() else {
            return true;
        };

        entity.name() == condition
            || entity.interfaces().any(|interface| interface.name() == condition)
            || entity.unions().any(|union| union.name() == condition)
    }
}
