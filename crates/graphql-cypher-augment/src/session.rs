use std::collections::{HashMap, HashSet};

use crate::{
    resolvers::{FieldResolver, ResolverMap, RootOperation},
    sdl::{Document, Field, InputObjectType, InputValue, ObjectType, TypeDefinition, TypeKind},
    SchemaGenerationError,
};

/// The field added to top-level inputs that would otherwise be empty.
pub(crate) const EMPTY_INPUT_FIELD: &str = "_emptyInput";

/// The mutable state of one schema generation. Created by [`crate::augment`],
/// consumed by [`BuildSession::finish`].
pub(crate) struct BuildSession {
    document: Document,
    resolvers: ResolverMap,
    query: String,
    mutation: String,
    duplicates: Vec<String>,
    /// Types generated once per name, e.g. the inputs of relationship properties
    /// shared by several relationships.
    seen: HashSet<String>,
    pub(crate) uses_point: bool,
    pub(crate) uses_cartesian_point: bool,
    pub(crate) uses_float_where: bool,
}

pub(crate) struct ObjectTypeBuilder {
    definition: TypeDefinition,
    object: ObjectType,
    resolvers: Vec<(String, FieldResolver)>,
}

impl ObjectTypeBuilder {
    pub(crate) fn push_field(&mut self, field: Field) {
        self.object.fields.insert(field.name.clone(), field);
    }

    pub(crate) fn push_resolved_field(&mut self, field: Field, resolver: FieldResolver) {
        self.resolvers.push((field.name.clone(), resolver));
        self.push_field(field);
    }

    pub(crate) fn implements(&mut self, interface: &str) {
        if !self.object.implements.iter().any(|name| name == interface) {
            self.object.implements.push(interface.to_string());
        }
    }

    pub(crate) fn push_directive(&mut self, directive: String) {
        self.definition.directives.push(directive);
    }

    pub(crate) fn describe(&mut self, description: Option<&str>) {
        self.definition.description = description.map(str::to_string);
    }
}

pub(crate) struct InputTypeBuilder {
    definition: TypeDefinition,
    input: InputObjectType,
}

impl InputTypeBuilder {
    pub(crate) fn push_field(&mut self, field: InputValue) {
        self.input.fields.insert(field.name.clone(), field);
    }

    pub(crate) fn describe(&mut self, description: Option<&str>) {
        self.definition.description = description.map(str::to_string);
    }
}

impl BuildSession {
    pub(crate) fn new(query: &str, mutation: &str) -> Self {
        let mut session = Self {
            document: Document::default(),
            resolvers: ResolverMap::default(),
            query: query.to_string(),
            mutation: mutation.to_string(),
            duplicates: Vec::new(),
            seen: HashSet::new(),
            uses_point: false,
            uses_cartesian_point: false,
            uses_float_where: false,
        };

        for root in [query, mutation] {
            session.add_type(TypeDefinition::new(root, TypeKind::Object(ObjectType::default())));
        }

        session
    }

    pub(crate) fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub(crate) fn has_type(&self, name: &str) -> bool {
        self.document.contains(name)
    }

    pub(crate) fn add_type(&mut self, definition: TypeDefinition) {
        if self.document.contains(&definition.name) {
            self.duplicates.push(definition.name);
            return;
        }

        self.document.types.insert(definition.name.clone(), definition);
    }

    /// Adds the type unless one with the same name exists already.
    pub(crate) fn get_or_create(&mut self, name: &str, create: impl FnOnce() -> TypeDefinition) {
        if !self.has_type(name) {
            self.add_type(create());
        }
    }

    /// Returns true the first time it is called with a key.
    pub(crate) fn first_use(&mut self, key: &str) -> bool {
        self.seen.insert(key.to_string())
    }

    pub(crate) fn add_object_type(&mut self, name: &str, build: impl FnOnce(&mut ObjectTypeBuilder)) {
        self.add_object_like(name, false, build);
    }

    pub(crate) fn add_interface_type(&mut self, name: &str, build: impl FnOnce(&mut ObjectTypeBuilder)) {
        self.add_object_like(name, true, build);
    }

    fn add_object_like(&mut self, name: &str, interface: bool, build: impl FnOnce(&mut ObjectTypeBuilder)) {
        let mut builder = ObjectTypeBuilder {
            definition: TypeDefinition::new(name, TypeKind::Scalar),
            object: ObjectType::default(),
            resolvers: Vec::new(),
        };

        build(&mut builder);

        for (field, resolver) in builder.resolvers {
            self.resolvers.insert(name, &field, resolver);
        }

        let mut definition = builder.definition;
        definition.kind = if interface {
            TypeKind::Interface(builder.object)
        } else {
            TypeKind::Object(builder.object)
        };

        self.add_type(definition);
    }

    /// Adds the input type only if it ends up with fields. Returns whether it
    /// was added.
    pub(crate) fn add_input_type(&mut self, name: &str, build: impl FnOnce(&mut InputTypeBuilder)) -> bool {
        let builder = self.build_input(name, build);

        if builder.input.fields.is_empty() {
            return false;
        }

        self.insert_input(builder);
        true
    }

    /// Adds the input type, with a placeholder field when nothing else applies.
    pub(crate) fn add_required_input_type(&mut self, name: &str, build: impl FnOnce(&mut InputTypeBuilder)) {
        let mut builder = self.build_input(name, build);

        if builder.input.fields.is_empty() {
            builder.push_field(InputValue::new(EMPTY_INPUT_FIELD, "Boolean"));
        }

        self.insert_input(builder);
    }

    fn build_input(&mut self, name: &str, build: impl FnOnce(&mut InputTypeBuilder)) -> InputTypeBuilder {
        let mut builder = InputTypeBuilder {
            definition: TypeDefinition::new(name, TypeKind::Scalar),
            input: InputObjectType::default(),
        };

        build(&mut builder);
        builder
    }

    fn insert_input(&mut self, builder: InputTypeBuilder) {
        let mut definition = builder.definition;
        definition.kind = TypeKind::InputObject(builder.input);
        self.add_type(definition);
    }

    pub(crate) fn add_query_field(&mut self, field: Field, resolver: FieldResolver) {
        self.add_root_field(RootOperation::Query, field, Some(resolver));
    }

    pub(crate) fn add_mutation_field(&mut self, field: Field, resolver: FieldResolver) {
        self.add_root_field(RootOperation::Mutation, field, Some(resolver));
    }

    /// Replaces a field of the same name together with its resolver. Fields
    /// without a resolver are left to the caller's own resolvers.
    pub(crate) fn add_root_field(&mut self, operation: RootOperation, field: Field, resolver: Option<FieldResolver>) {
        let root = match operation {
            RootOperation::Query => self.query.clone(),
            RootOperation::Mutation => self.mutation.clone(),
        };

        if let Some(TypeKind::Object(object)) = self.document.types.get_mut(&root).map(|root| &mut root.kind) {
            match resolver {
                Some(resolver) => self.resolvers.insert(&root, &field.name, resolver),
                None => self.resolvers.remove_field(&root, &field.name),
            }

            object.fields.insert(field.name.clone(), field);
        }
    }

    pub(crate) fn root_name(&self, operation: RootOperation) -> &str {
        match operation {
            RootOperation::Query => &self.query,
            RootOperation::Mutation => &self.mutation,
        }
    }

    pub(crate) fn add_resolve_type(&mut self, type_name: &str) {
        self.resolvers.insert_resolve_type(type_name);
    }

    /// Changes a type that was already added, if it exists.
    pub(crate) fn modify_type(&mut self, name: &str, modify: impl FnOnce(&mut TypeDefinition)) {
        if let Some(definition) = self.document.types.get_mut(name) {
            modify(definition);
        }
    }

    /// Drops unreachable types, then checks that every remaining type has fields.
    pub(crate) fn finish(mut self) -> Result<(Document, ResolverMap), SchemaGenerationError> {
        if let Some(name) = self.duplicates.first() {
            return Err(SchemaGenerationError::DuplicateType { name: name.clone() });
        }

        let mutation_is_empty = self
            .document
            .fields(&self.mutation)
            .is_some_and(|fields| fields.is_empty());

        if mutation_is_empty {
            self.document.types.shift_remove(&self.mutation);
        }

        let reachable: HashSet<String> =
            reachable_types(&self.document, &[self.query.as_str(), self.mutation.as_str()])
                .into_iter()
                .map(str::to_owned)
                .collect();

        self.document.types.retain(|name, _| reachable.contains(name.as_str()));
        self.resolvers.retain_types(|name| reachable.contains(name));

        let empty: Vec<_> = self
            .document
            .types()
            .filter(|definition| definition.is_object_or_interface() && definition.field_count() == Some(0))
            .map(|definition| definition.name.clone())
            .collect();

        if !empty.is_empty() {
            return Err(SchemaGenerationError::EmptyTypes { names: empty });
        }

        if let Some(definition) = self
            .document
            .types()
            .find(|definition| matches!(definition.kind, TypeKind::InputObject(_)) && definition.field_count() == Some(0))
        {
            return Err(SchemaGenerationError::EmptyInput {
                name: definition.name.clone(),
            });
        }

        Ok((self.document, self.resolvers))
    }
}

/// Every type reachable from the roots and the directive definitions. An
/// interface pulls in its implementations.
fn reachable_types<'a>(document: &'a Document, roots: &[&'a str]) -> HashSet<&'a str> {
    let mut implementations: HashMap<&str, Vec<&str>> = HashMap::new();

    for definition in document.types() {
        if let TypeKind::Object(object) = &definition.kind {
            for interface in &object.implements {
                implementations
                    .entry(interface.as_str())
                    .or_default()
                    .push(definition.name.as_str());
            }
        }
    }

    let mut stack: Vec<&str> = roots.to_vec();

    stack.extend(
        document
            .directives
            .iter()
            .flat_map(|directive| directive.arguments.iter().map(InputValue::named_type)),
    );

    let mut reachable = HashSet::new();

    while let Some(name) = stack.pop() {
        let Some(definition) = document.get(name) else {
            continue;
        };

        if !reachable.insert(definition.name.as_str()) {
            continue;
        }

        match &definition.kind {
            TypeKind::Object(object) | TypeKind::Interface(object) => {
                stack.extend(object.implements.iter().map(String::as_str));

                for field in object.fields.values() {
                    stack.push(field.named_type());
                    stack.extend(field.arguments.iter().map(InputValue::named_type));
                }

                if let TypeKind::Interface(_) = definition.kind {
                    stack.extend(implementations.get(name).into_iter().flatten().copied());
                }
            }
            TypeKind::InputObject(input) => stack.extend(input.fields.values().map(InputValue::named_type)),
            TypeKind::Union(members) => stack.extend(members.iter().map(String::as_str)),
            TypeKind::Enum(_) | TypeKind::Scalar => (),
        }
    }

    reachable
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs_are_not_added() {
        let mut session = BuildSession::new("Query", "Mutation");

        assert!(!session.add_input_type("MovieConnectInput", |_| ()));
        assert!(!session.has_type("MovieConnectInput"));

        session.add_required_input_type("MovieCreateInput", |_| ());
        let fields = session.document.input_fields("MovieCreateInput").unwrap();
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec![EMPTY_INPUT_FIELD]);
    }

    #[test]
    fn unreachable_types_are_dropped() {
        let mut session = BuildSession::new("Query", "Mutation");

        session.add_object_type("Movie", |movie| movie.push_field(Field::new("title", "String")));
        session.add_object_type("Unused", |unused| unused.push_field(Field::new("title", "String")));
        session.add_query_field(Field::new("movies", "[Movie!]!"), FieldResolver::GlobalNode);

        let (document, resolvers) = session.finish().unwrap();

        let names: Vec<_> = document.types().map(|definition| definition.name.as_str()).collect();
        assert_eq!(names, vec!["Query", "Movie"]);
        assert!(resolvers.field("Query", "movies").is_some());
    }

    #[test]
    fn object_types_without_fields_are_rejected() {
        let mut session = BuildSession::new("Query", "Mutation");

        session.add_object_type("Movie", |_| ());
        session.add_query_field(Field::new("movies", "[Movie!]!"), FieldResolver::GlobalNode);

        insta::assert_snapshot!(
            session.finish().unwrap_err(),
            @"Objects and Interfaces must have one or more fields: Movie"
        );
    }

    #[test]
    fn types_are_generated_once() {
        let mut session = BuildSession::new("Query", "Mutation");

        session.add_object_type("Movie", |movie| movie.push_field(Field::new("title", "String")));
        session.add_object_type("Movie", |movie| movie.push_field(Field::new("title", "String")));

        assert_eq!(
            session.finish().unwrap_err(),
            SchemaGenerationError::DuplicateType {
                name: String::from("Movie")
            }
        );
    }
}
