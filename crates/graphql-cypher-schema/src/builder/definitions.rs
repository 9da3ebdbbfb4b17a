use std::collections::HashSet;

use async_graphql_parser::{
    types::{
        ConstDirective, DirectiveDefinition, FieldDefinition, SchemaDefinition, ServiceDocument, TypeDefinition,
        TypeKind, TypeSystemDefinition,
    },
    Positioned,
};
use indexmap::IndexMap;

use crate::BuildError;

/// The type definitions of a document with every `extend` merged into its base.
#[derive(Default)]
pub(super) struct Definitions {
    pub(super) types: IndexMap<String, TypeDefinition>,
    pub(super) schema_directives: Vec<Positioned<ConstDirective>>,
    pub(super) directives: Vec<DirectiveDefinition>,
    pub(super) query: Option<String>,
    pub(super) mutation: Option<String>,
    pub(super) subscription: Option<String>,
}

impl Definitions {
    pub(super) fn collect(document: ServiceDocument) -> Result<Self, BuildError> {
        let mut definitions = Self::default();

        for definition in document.definitions {
            match definition {
                TypeSystemDefinition::Schema(schema) => definitions.merge_schema(schema.node),
                TypeSystemDefinition::Type(ty) => definitions.merge_type(ty.node)?,
                TypeSystemDefinition::Directive(directive) => definitions.directives.push(directive.node),
            }
        }

        Ok(definitions)
    }

    fn merge_schema(&mut self, schema: SchemaDefinition) {
        self.schema_directives.extend(schema.directives);

        if let Some(query) = schema.query {
            self.query = Some(query.node.to_string());
        }

        if let Some(mutation) = schema.mutation {
            self.mutation = Some(mutation.node.to_string());
        }

        if let Some(subscription) = schema.subscription {
            self.subscription = Some(subscription.node.to_string());
        }
    }

    fn merge_type(&mut self, definition: TypeDefinition) -> Result<(), BuildError> {
        let name = definition.name.node.to_string();

        let Some(base) = self.types.get_mut(&name) else {
            self.types.insert(name, definition);
            return Ok(());
        };

        base.directives.extend(definition.directives);

        if base.description.is_none() {
            base.description = definition.description;
        }

        match (&mut base.kind, definition.kind) {
            (TypeKind::Scalar, TypeKind::Scalar) => (),
            (TypeKind::Object(base), TypeKind::Object(extension)) => {
                base.implements.extend(extension.implements);
                base.fields.extend(extension.fields);
            }
            (TypeKind::Interface(base), TypeKind::Interface(extension)) => {
                base.implements.extend(extension.implements);
                base.fields.extend(extension.fields);
            }
            (TypeKind::Union(base), TypeKind::Union(extension)) => base.members.extend(extension.members),
            (TypeKind::Enum(base), TypeKind::Enum(extension)) => base.values.extend(extension.values),
            (TypeKind::InputObject(base), TypeKind::InputObject(extension)) => base.fields.extend(extension.fields),
            _ => return Err(BuildError::Parse(format!("Cannot extend `{name}` with a different kind of type."))),
        }

        Ok(())
    }

    pub(super) fn query_name(&self) -> &str {
        self.query.as_deref().unwrap_or("Query")
    }

    pub(super) fn mutation_name(&self) -> &str {
        self.mutation.as_deref().unwrap_or("Mutation")
    }

    pub(super) fn subscription_name(&self) -> &str {
        self.subscription.as_deref().unwrap_or("Subscription")
    }

    pub(super) fn is_root(&self, name: &str) -> bool {
        name == self.query_name() || name == self.mutation_name() || name == self.subscription_name()
    }

    /// Names used in `@relationship(properties:)`, which may point to interfaces.
    pub(super) fn referenced_properties(&self) -> HashSet<String> {
        self.types
            .values()
            .flat_map(|definition| fields_of(definition).iter())
            .flat_map(|field| field.node.directives.iter())
            .filter(|directive| directive.node.name.node == "relationship")
            .filter_map(|directive| directive.node.get_argument("properties"))
            .filter_map(|value| match &value.node {
                async_graphql_value::ConstValue::String(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

pub(super) fn fields_of(definition: &TypeDefinition) -> &[Positioned<FieldDefinition>] {
    match &definition.kind {
        TypeKind::Object(object) => &object.fields,
        TypeKind::Interface(interface) => &interface.fields,
        _ => &[],
    }
}

pub(super) fn has_directive(definition: &TypeDefinition, name: &str) -> bool {
    definition
        .directives
        .iter()
        .any(|directive| directive.node.name.node == name)
}

#[cfg(test)]
mod tests {
    use async_graphql_parser::parse_schema;

    use super::*;

    #[test]
    fn extensions_are_merged_into_their_base() {
        let document = parse_schema(
            r#"
            type Movie { title: String }
            extend type Movie @node(labels: ["Film"]) { released: Int }
            schema { query: RootQuery }
            "#,
        )
        .unwrap();

        let definitions = Definitions::collect(document).unwrap();
        let movie = &definitions.types["Movie"];

        let fields: Vec<_> = fields_of(movie).iter().map(|field| field.node.name.node.as_str()).collect();
        assert_eq!(fields, vec!["title", "released"]);
        assert!(has_directive(movie, "node"));
        assert!(definitions.is_root("RootQuery"));
        assert!(!definitions.is_root("Query"));
    }

    #[test]
    fn extending_with_another_kind_fails() {
        let document = parse_schema("type Movie { title: String } extend interface Movie { title: String }").unwrap();

        assert!(matches!(Definitions::collect(document), Err(BuildError::Parse(_))));
    }
}
