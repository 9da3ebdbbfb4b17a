mod definitions;
mod fields;

use std::{collections::HashSet, str::FromStr};

use async_graphql_parser::{
    parse_schema,
    types::{DirectiveLocation, TypeDefinition, TypeKind},
};
use indexmap::IndexMap;
use inflector::Inflector;

use self::{
    definitions::{fields_of, has_directive, Definitions},
    fields::{field_argument, validate_relationship, BuiltField, FieldContext, FieldOwner},
};
use crate::{
    annotation::{
        parse_annotations, AnnotationKind, AnnotationLocation, Annotations, EntityDefaults, MutationAnnotation,
        UserDirective,
    },
    filter_keys::{AggregationKeyTable, WhereKeyTable},
    names::plural_of,
    Attribute, BuildError, ConcreteEntity, DirectiveDefinition, Entity, EntityFields, EntityId, EnumDefinition,
    EnumValue, InputDefinition, InterfaceEntity, JwtDefinition, ModelOptions, Operation, PropertiesId,
    RelationshipId, RelationshipProperties, ScalarDefinition, ScalarKind, SchemaModel, UnionEntity,
};

const FEDERATION_SPECIFICATION: &str = "specs.apollo.dev/federation";

/// Builds a [`SchemaModel`] in stages: definitions that reference nothing
/// first, then entities, their memberships, the properties types and finally
/// the fields, which may reference all of the above.
pub(crate) struct ModelBuilder<'a> {
    model: SchemaModel,
    definitions: Definitions,
    options: &'a ModelOptions,
    defaults: EntityDefaults,
}

impl<'a> ModelBuilder<'a> {
    pub(crate) fn build(sdl: &str, options: &'a ModelOptions) -> Result<SchemaModel, BuildError> {
        let document = parse_schema(sdl).map_err(|error| BuildError::Parse(error.to_string()))?;

        let mut builder = ModelBuilder {
            model: SchemaModel {
                filter_options: options.filters.clone(),
                federation: options.subgraph,
                ..Default::default()
            },
            definitions: Definitions::collect(document)?,
            options,
            defaults: EntityDefaults::default(),
        };

        builder.insert_schema_annotations()?;
        builder.insert_passthrough_definitions();
        builder.insert_entities()?;
        builder.insert_memberships()?;
        builder.insert_properties()?;
        builder.insert_jwt()?;
        builder.insert_entity_fields()?;
        builder.insert_operations()?;
        builder.validate()?;
        builder.compile_filter_keys();

        let model = builder.model;

        tracing::debug!(
            entities = model.entities.len(),
            relationships = model.relationships.len(),
            properties = model.properties.len(),
            "built the schema model"
        );

        Ok(model)
    }

    fn insert_schema_annotations(&mut self) -> Result<(), BuildError> {
        let annotations = parse_annotations(
            &self.definitions.schema_directives,
            AnnotationLocation::Schema,
            &EntityDefaults::default(),
        )?;

        self.defaults.query = annotations.query();
        self.defaults.mutation = if annotations.contains(AnnotationKind::Mutation) {
            annotations.mutation()
        } else {
            MutationAnnotation {
                operations: self.options.default_mutation_operations.clone(),
            }
        };

        self.model.federation |= annotations.user_directives().iter().any(|directive| {
            directive.name == "link"
                && directive
                    .arguments
                    .iter()
                    .any(|(name, value)| name == "url" && value.contains(FEDERATION_SPECIFICATION))
        });

        self.model.schema_directives = annotations.user_directives().to_vec();

        Ok(())
    }

    /// Enums, scalars, inputs and directive definitions are copied to the
    /// generated schema as they are.
    fn insert_passthrough_definitions(&mut self) {
        for definition in self.definitions.types.values() {
            let name = definition.name.node.to_string();
            let description = definition.description.as_ref().map(|description| description.node.clone());
            let directives = user_directives(definition);

            match &definition.kind {
                TypeKind::Enum(enum_type) => self.model.enums.push(EnumDefinition {
                    name,
                    description,
                    values: enum_type
                        .values
                        .iter()
                        .map(|value| EnumValue {
                            name: value.node.value.node.to_string(),
                            description: value.node.description.as_ref().map(|description| description.node.clone()),
                            directives: value
                                .node
                                .directives
                                .iter()
                                .map(|directive| UserDirective::new(&directive.node))
                                .collect(),
                        })
                        .collect(),
                    directives,
                }),
                // A redeclared built-in is not a user scalar.
                TypeKind::Scalar if ScalarKind::from_str(&name).is_ok() => (),
                TypeKind::Scalar => self.model.scalars.push(ScalarDefinition {
                    name,
                    description,
                    directives,
                }),
                TypeKind::InputObject(input) => self.model.inputs.push(InputDefinition {
                    name,
                    description,
                    fields: input.fields.iter().map(field_argument).collect(),
                    directives,
                }),
                TypeKind::Object(_) | TypeKind::Interface(_) | TypeKind::Union(_) => (),
            }
        }

        for directive in &self.definitions.directives {
            let name = directive.name.node.to_string();

            // Our own vocabulary, declared for editor tooling.
            if AnnotationKind::from_str(&name).is_ok() {
                continue;
            }

            self.model.directive_definitions.push(DirectiveDefinition {
                name,
                description: directive.description.as_ref().map(|description| description.node.clone()),
                arguments: directive.arguments.iter().map(field_argument).collect(),
                repeatable: directive.is_repeatable,
                locations: directive
                    .locations
                    .iter()
                    .map(|location| directive_location(location.node))
                    .collect(),
            });
        }
    }

    fn insert_entities(&mut self) -> Result<(), BuildError> {
        let properties = self.definitions.referenced_properties();

        for definition in self.definitions.types.values() {
            let name = definition.name.node.to_string();

            if self.definitions.is_root(&name) || is_properties(definition, &properties) {
                continue;
            }

            let description = definition.description.as_ref().map(|description| description.node.clone());

            let entity = match &definition.kind {
                TypeKind::Object(_) if has_directive(definition, "jwt") => continue,
                TypeKind::Object(_) => {
                    let annotations = parse_annotations(&definition.directives, AnnotationLocation::Object, &self.defaults)?;

                    let labels = match annotations.node() {
                        Some(node) if !node.labels.is_empty() => node.labels.clone(),
                        _ => vec![name.clone()],
                    };

                    Entity::Concrete(ConcreteEntity {
                        plural: entity_plural(&name, &annotations),
                        name: name.clone(),
                        description,
                        labels,
                        fields: EntityFields::default(),
                        interfaces: Vec::new(),
                        unions: Vec::new(),
                        annotations,
                    })
                }
                TypeKind::Interface(_) => {
                    let annotations =
                        parse_annotations(&definition.directives, AnnotationLocation::Interface, &self.defaults)?;

                    Entity::Interface(InterfaceEntity {
                        plural: entity_plural(&name, &annotations),
                        name: name.clone(),
                        description,
                        fields: EntityFields::default(),
                        implementations: Vec::new(),
                        annotations,
                    })
                }
                TypeKind::Union(_) => {
                    let annotations = parse_annotations(&definition.directives, AnnotationLocation::Union, &self.defaults)?;

                    Entity::Union(UnionEntity {
                        plural: entity_plural(&name, &annotations),
                        name: name.clone(),
                        description,
                        members: Vec::new(),
                        fields: EntityFields::default(),
                        annotations,
                    })
                }
                TypeKind::Scalar | TypeKind::Enum(_) | TypeKind::InputObject(_) => continue,
            };

            let id = EntityId::from(self.model.entities.len());
            self.model.entities.push(entity);
            self.model.entity_names.insert(name, id);
        }

        Ok(())
    }

    /// Links implementations to their interfaces and members to their unions.
    fn insert_memberships(&mut self) -> Result<(), BuildError> {
        let Self { model, definitions, .. } = self;

        for definition in definitions.types.values() {
            let name = definition.name.node.as_str();

            let Some(&id) = model.entity_names.get(name) else {
                continue;
            };

            match &definition.kind {
                TypeKind::Object(object) => {
                    for interface in &object.implements {
                        let interface = interface.node.as_str();

                        let Some(&interface_id) = model.entity_names.get(interface) else {
                            if definitions.types.contains_key(interface) {
                                continue;
                            }

                            return Err(BuildError::MissingDefinition {
                                kind: "interface",
                                name: interface.to_string(),
                                referenced_from: name.to_string(),
                            });
                        };

                        if let Entity::Interface(entity) = &mut model[interface_id] {
                            entity.implementations.push(id);
                        }

                        if let Entity::Concrete(entity) = &mut model[id] {
                            entity.interfaces.push(interface_id);
                        }
                    }
                }
                TypeKind::Union(union) => {
                    for member in &union.members {
                        let member = member.node.as_str();

                        let member_id = model
                            .entity_names
                            .get(member)
                            .copied()
                            .filter(|member_id| model[*member_id].is_concrete())
                            .ok_or_else(|| BuildError::InvalidUnionMember {
                                union: name.to_string(),
                                member: member.to_string(),
                            })?;

                        if let Entity::Union(entity) = &mut model[id] {
                            entity.members.push(member_id);
                        }

                        if let Entity::Concrete(entity) = &mut model[member_id] {
                            entity.unions.push(id);
                        }
                    }
                }
                _ => (),
            }
        }

        Ok(())
    }

    fn insert_properties(&mut self) -> Result<(), BuildError> {
        let properties = self.definitions.referenced_properties();

        for definition in self.definitions.types.values() {
            let name = definition.name.node.to_string();

            if self.definitions.is_root(&name) || !is_properties(definition, &properties) {
                continue;
            }

            let location = match definition.kind {
                TypeKind::Interface(_) => AnnotationLocation::Interface,
                _ => AnnotationLocation::Object,
            };
            parse_annotations(&definition.directives, location, &self.defaults)?;

            let attributes = self.plain_attributes(definition)?;

            let id = PropertiesId::from(self.model.properties.len());
            self.model.properties.push(RelationshipProperties {
                name: name.clone(),
                description: definition.description.as_ref().map(|description| description.node.clone()),
                attributes,
                where_keys: WhereKeyTable::default(),
                aggregation_keys: AggregationKeyTable::default(),
            });
            self.model.properties_names.insert(name, id);
        }

        Ok(())
    }

    fn insert_jwt(&mut self) -> Result<(), BuildError> {
        let Some(definition) = self
            .definitions
            .types
            .values()
            .find(|definition| matches!(definition.kind, TypeKind::Object(_)) && has_directive(definition, "jwt"))
        else {
            return Ok(());
        };

        parse_annotations(&definition.directives, AnnotationLocation::Object, &self.defaults)?;

        self.model.jwt = Some(JwtDefinition {
            name: definition.name.node.to_string(),
            attributes: self.plain_attributes(definition)?,
            where_keys: WhereKeyTable::default(),
        });

        Ok(())
    }

    /// The attributes of a type that cannot declare relationships.
    fn plain_attributes(&self, definition: &TypeDefinition) -> Result<IndexMap<String, Attribute>, BuildError> {
        let context = FieldContext {
            model: &self.model,
            definitions: &self.definitions,
            owner_name: definition.name.node.as_str(),
            owner: FieldOwner::Plain,
        };

        let mut attributes = IndexMap::new();

        for field in fields_of(definition) {
            let annotations = parse_annotations(&field.node.directives, AnnotationLocation::Field, &self.defaults)?;

            if let BuiltField::Attribute(attribute) = context.build(&field.node, annotations)? {
                attributes.insert(attribute.name.clone(), attribute);
            }
        }

        Ok(attributes)
    }

    fn insert_entity_fields(&mut self) -> Result<(), BuildError> {
        for index in 0..self.model.entities.len() {
            let id = EntityId::from(index);
            let entity = &self.model[id];

            let Some(definition) = self.definitions.types.get(entity.name()) else {
                continue;
            };

            let interfaces: Vec<&TypeDefinition> = match entity {
                Entity::Concrete(entity) => entity
                    .interfaces
                    .iter()
                    .filter_map(|interface| self.definitions.types.get(self.model[*interface].name()))
                    .collect(),
                _ => Vec::new(),
            };

            let context = FieldContext {
                model: &self.model,
                definitions: &self.definitions,
                owner_name: definition.name.node.as_str(),
                owner: FieldOwner::Entity(id),
            };

            let mut built = Vec::new();

            for field in fields_of(definition) {
                let mut annotations =
                    parse_annotations(&field.node.directives, AnnotationLocation::Field, &self.defaults)?;

                for interface in &interfaces {
                    let inherited = fields_of(interface)
                        .iter()
                        .find(|inherited| inherited.node.name.node == field.node.name.node);

                    if let Some(inherited) = inherited {
                        annotations.inherit(&parse_annotations(
                            &inherited.node.directives,
                            AnnotationLocation::Field,
                            &self.defaults,
                        )?);
                    }
                }

                built.push(context.build(&field.node, annotations)?);
            }

            for field in built {
                match field {
                    BuiltField::Attribute(attribute) => self.model[id].fields_mut().push_attribute(attribute),
                    BuiltField::Relationship(relationship) => {
                        let name = relationship.name.clone();
                        let relationship_id = RelationshipId::from(self.model.relationships.len());

                        self.model.relationships.push(relationship);
                        self.model[id].fields_mut().push_relationship(&name, relationship_id);
                    }
                }
            }
        }

        Ok(())
    }

    /// The user's own root fields.
    fn insert_operations(&mut self) -> Result<(), BuildError> {
        let roots = [
            (self.definitions.query_name().to_string(), true),
            (self.definitions.mutation_name().to_string(), false),
        ];

        for (name, is_query) in roots {
            let mut operation = Operation::new(&name);

            if let Some(definition) = self.definitions.types.get(&name) {
                operation.directives = user_directives(definition);

                let context = FieldContext {
                    model: &self.model,
                    definitions: &self.definitions,
                    owner_name: &name,
                    owner: FieldOwner::Root,
                };

                for field in fields_of(definition) {
                    let annotations =
                        parse_annotations(&field.node.directives, AnnotationLocation::Field, &self.defaults)?;

                    if let BuiltField::Attribute(attribute) = context.build(&field.node, annotations)? {
                        operation.fields.insert(attribute.name.clone(), attribute);
                    }
                }
            }

            if is_query {
                self.model.operations.query = operation;
            } else {
                self.model.operations.mutation = operation;
            }
        }

        Ok(())
    }

    fn validate(&self) -> Result<(), BuildError> {
        for relationship in &self.model.relationships {
            validate_relationship(&self.model, relationship)?;
        }

        for entity in self.model.entities.iter().filter_map(Entity::as_concrete) {
            let global_ids: Vec<&str> = entity
                .fields
                .attributes
                .values()
                .filter(|attribute| attribute.is_global_id())
                .map(Attribute::name)
                .collect();

            if global_ids.len() > 1 {
                return Err(BuildError::MultipleGlobalIds {
                    entity: entity.name.clone(),
                    fields: global_ids.join(", "),
                });
            }

            if !global_ids.is_empty() && entity.fields.attributes.contains_key("id") {
                return Err(BuildError::GlobalIdConflict {
                    entity: entity.name.clone(),
                });
            }

            for index in entity.annotations.fulltext().map(|fulltext| fulltext.indexes.as_slice()).unwrap_or_default() {
                for field in &index.fields {
                    let is_string = entity
                        .fields
                        .attributes
                        .get(field)
                        .is_some_and(|attribute| attribute.scalar() == Some(ScalarKind::String) && !attribute.is_list());

                    if !is_string {
                        return Err(BuildError::FulltextField {
                            index: index.index_name.clone(),
                            entity: entity.name.clone(),
                            field: field.clone(),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    fn compile_filter_keys(&mut self) {
        let filters = &self.options.filters;

        for index in 0..self.model.entities.len() {
            let id = EntityId::from(index);
            let entity = &self.model[id];

            let (where_keys, aggregation_keys) = match entity {
                Entity::Union(union) => (
                    WhereKeyTable::for_union(
                        union
                            .members
                            .iter()
                            .map(|member| (*member, self.model[*member].name().to_string())),
                    ),
                    AggregationKeyTable::default(),
                ),
                _ => {
                    let fields = entity.fields();
                    let relationships = fields
                        .relationships
                        .values()
                        .map(|relationship| (*relationship, &self.model[*relationship]));

                    let where_keys = WhereKeyTable::for_entity(
                        fields.attributes.values(),
                        relationships,
                        entity.global_id_attribute().is_some(),
                        filters,
                    );

                    let where_keys = match entity {
                        Entity::Interface(_) => where_keys.with_implementations(),
                        _ => where_keys,
                    };

                    (where_keys, AggregationKeyTable::for_attributes(fields.attributes.values()))
                }
            };

            let fields = self.model[id].fields_mut();
            fields.where_keys = where_keys;
            fields.aggregation_keys = aggregation_keys;
        }

        for properties in &mut self.model.properties {
            properties.where_keys = WhereKeyTable::for_attributes(properties.attributes.values(), filters);
            properties.aggregation_keys = AggregationKeyTable::for_attributes(properties.attributes.values());
        }

        if let Some(jwt) = &mut self.model.jwt {
            jwt.where_keys = WhereKeyTable::for_attributes(jwt.attributes.values(), filters);
        }
    }
}

fn is_properties(definition: &TypeDefinition, referenced: &HashSet<String>) -> bool {
    match definition.kind {
        TypeKind::Object(_) => has_directive(definition, "relationshipProperties"),
        TypeKind::Interface(_) => {
            has_directive(definition, "relationshipProperties") || referenced.contains(definition.name.node.as_str())
        }
        _ => false,
    }
}

fn entity_plural(name: &str, annotations: &Annotations) -> String {
    annotations.plural().map(str::to_string).unwrap_or_else(|| plural_of(name))
}

fn user_directives(definition: &TypeDefinition) -> Vec<UserDirective> {
    definition
        .directives
        .iter()
        .filter(|directive| AnnotationKind::from_str(directive.node.name.node.as_str()).is_err())
        .map(|directive| UserDirective::new(&directive.node))
        .collect()
}

fn directive_location(location: DirectiveLocation) -> String {
    format!("{location:?}").to_screaming_snake_case()
}

#[cfg(test)]
mod tests;
