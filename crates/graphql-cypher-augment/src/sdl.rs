//! A small, printable model of the generated type system.
//!
//! Types are kept in the order they were added, so printing the same model
//! twice gives the same text.

mod render;

use indexmap::IndexMap;

pub use render::render_sdl;
pub(crate) use render::quoted;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// `extend schema` directives, e.g. federation's `@link`.
    pub schema_directives: Vec<String>,
    /// Set when the root types are not named `Query` and `Mutation`.
    pub root_names: Option<RootNames>,
    pub directives: Vec<DirectiveDefinition>,
    pub types: IndexMap<String, TypeDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RootNames {
    pub query: String,
    pub mutation: Option<String>,
}

impl Document {
    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn types(&self) -> impl ExactSizeIterator<Item = &TypeDefinition> + '_ {
        self.types.values()
    }

    /// The fields of an object or interface type.
    pub fn fields(&self, name: &str) -> Option<&IndexMap<String, Field>> {
        match &self.types.get(name)?.kind {
            TypeKind::Object(object) | TypeKind::Interface(object) => Some(&object.fields),
            _ => None,
        }
    }

    pub fn input_fields(&self, name: &str) -> Option<&IndexMap<String, InputValue>> {
        match &self.types.get(name)?.kind {
            TypeKind::InputObject(input) => Some(&input.fields),
            _ => None,
        }
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&render_sdl(self)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveDefinition {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<InputValue>,
    pub repeatable: bool,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<String>,
    pub kind: TypeKind,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            directives: Vec::new(),
            kind,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Object and interface types with fields, input objects with input fields.
    pub fn field_count(&self) -> Option<usize> {
        match &self.kind {
            TypeKind::Object(object) | TypeKind::Interface(object) => Some(object.fields.len()),
            TypeKind::InputObject(input) => Some(input.fields.len()),
            _ => None,
        }
    }

    pub fn is_object_or_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Object(_) | TypeKind::Interface(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Object(ObjectType),
    Interface(ObjectType),
    InputObject(InputObjectType),
    Enum(Vec<EnumValue>),
    /// The member type names.
    Union(Vec<String>),
    Scalar,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectType {
    pub implements: Vec<String>,
    pub fields: IndexMap<String, Field>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputObjectType {
    pub fields: IndexMap<String, InputValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<String>,
}

impl EnumValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            directives: Vec::new(),
        }
    }
}

/// A field of an object or interface type. The type is kept in SDL notation.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<InputValue>,
    pub ty: String,
    pub directives: Vec<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: Vec::new(),
            ty: ty.into(),
            directives: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: Option<impl Into<String>>) -> Self {
        self.description = description.map(Into::into);
        self
    }

    pub fn with_argument(mut self, argument: InputValue) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_arguments(mut self, arguments: impl IntoIterator<Item = InputValue>) -> Self {
        self.arguments.extend(arguments);
        self
    }

    pub fn with_directives(mut self, directives: impl IntoIterator<Item = String>) -> Self {
        self.directives.extend(directives);
        self
    }

    /// The named type without list and non-null wrappers.
    pub fn named_type(&self) -> &str {
        named_type(&self.ty)
    }
}

/// An argument or an input object field.
#[derive(Debug, Clone, PartialEq)]
pub struct InputValue {
    pub name: String,
    pub description: Option<String>,
    pub ty: String,
    pub default_value: Option<String>,
    pub directives: Vec<String>,
}

impl InputValue {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            ty: ty.into(),
            default_value: None,
            directives: Vec::new(),
        }
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn with_description(mut self, description: Option<impl Into<String>>) -> Self {
        self.description = description.map(Into::into);
        self
    }

    pub fn with_directives(mut self, directives: impl IntoIterator<Item = String>) -> Self {
        self.directives.extend(directives);
        self
    }

    pub fn named_type(&self) -> &str {
        named_type(&self.ty)
    }
}

pub(crate) fn named_type(ty: &str) -> &str {
    ty.trim_matches(|c| c == '[' || c == ']' || c == '!')
}

/// `[ty!]`
pub(crate) fn list_of(ty: &str) -> String {
    format!("[{ty}!]")
}

/// `ty!`
pub(crate) fn required(ty: &str) -> String {
    format!("{ty}!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_types_are_unwrapped() {
        assert_eq!(named_type("[Movie!]!"), "Movie");
        assert_eq!(named_type("String"), "String");
        assert_eq!(Field::new("actors", "[Actor]").named_type(), "Actor");
    }
}
