use std::str::FromStr;

use async_graphql_parser::{
    types::{BaseType, FieldDefinition, InputValueDefinition, Type, TypeKind},
    Positioned,
};

use super::definitions::{fields_of, Definitions};
use crate::{
    annotation::{
        parse_annotations, AnnotationLocation, Annotations, EntityDefaults, RelationshipAnnotation, WriteOperation,
    },
    Attribute, AttributeKind, AttributeType, BuildError, Entity, EntityId, EntityKind, FieldArgument, Relationship,
    ScalarKind, SchemaModel,
};

/// What a field definition turned into.
pub(super) enum BuiltField {
    Attribute(Attribute),
    Relationship(Relationship),
}

/// The type definition a field is declared on.
#[derive(Clone, Copy)]
pub(super) enum FieldOwner {
    Entity(EntityId),
    /// A `@relationshipProperties` or `@jwt` type.
    Plain,
    /// A root operation type, whose fields may return entities without a directive.
    Root,
}

pub(super) struct FieldContext<'a> {
    pub(super) model: &'a SchemaModel,
    pub(super) definitions: &'a Definitions,
    pub(super) owner_name: &'a str,
    pub(super) owner: FieldOwner,
}

impl FieldContext<'_> {
    pub(super) fn build(&self, field: &FieldDefinition, annotations: Annotations) -> Result<BuiltField, BuildError> {
        let name = field.name.node.to_string();
        let (type_name, nullable, list) = self.unwrap_type(&field.ty.node, &name)?;
        let description = field.description.as_ref().map(|description| description.node.clone());

        let relationship = match annotations.relationship() {
            Some(relationship) => Some(relationship.clone()),
            None if annotations.declares_relationship() => Some(self.declared_relationship(&name)?),
            None => None,
        };

        if let Some(relationship) = relationship {
            let FieldOwner::Entity(source) = self.owner else {
                return Err(BuildError::RelationshipOutsideEntity {
                    owner: self.owner_name.to_string(),
                    field: name,
                });
            };

            let target = self
                .model
                .entity_names
                .get(&type_name)
                .copied()
                .ok_or_else(|| BuildError::MissingDefinition {
                    kind: "node",
                    name: type_name.clone(),
                    referenced_from: self.referenced_from(&name),
                })?;

            let properties = match &relationship.properties {
                Some(properties) => Some(self.model.properties_names.get(properties).copied().ok_or_else(|| {
                    BuildError::MissingDefinition {
                        kind: "relationship properties",
                        name: properties.clone(),
                        referenced_from: self.referenced_from(&name),
                    }
                })?),
                None => None,
            };

            return Ok(BuiltField::Relationship(Relationship {
                name,
                description,
                source,
                target,
                ty: relationship.ty,
                direction: relationship.direction,
                query_direction: relationship.query_direction,
                properties,
                nullable,
                list,
                nested_operations: relationship.nested_operations,
                aggregate: relationship.aggregate.unwrap_or(true) && self.model[target].kind() != EntityKind::Union,
                annotations,
            }));
        }

        let kind = self.attribute_kind(&type_name, &name, &annotations)?;

        let attribute = Attribute {
            database_name: annotations
                .alias()
                .map(|alias| alias.property.clone())
                .unwrap_or_else(|| name.clone()),
            name,
            description,
            ty: AttributeType {
                name: type_name,
                kind,
                nullable,
                list,
            },
            annotations,
            arguments: field.arguments.iter().map(field_argument).collect(),
        };

        self.validate_attribute(&attribute)?;

        Ok(BuiltField::Attribute(attribute))
    }

    /// The `@relationship` an interface field with `@declareRelationship`
    /// stands for: the one of its first implementation. Every implementation
    /// declares its own, all with the same properties type.
    fn declared_relationship(&self, field: &str) -> Result<RelationshipAnnotation, BuildError> {
        let interface = match self.owner {
            FieldOwner::Entity(id) => match &self.model[id] {
                Entity::Interface(interface) => Some(interface),
                _ => None,
            },
            _ => None,
        };

        let Some(interface) = interface else {
            return Err(BuildError::DeclaredRelationshipOutsideInterface {
                entity: self.owner_name.to_string(),
                field: field.to_string(),
            });
        };

        let mut declared: Option<RelationshipAnnotation> = None;

        for implementation in &interface.implementations {
            let implementation = self.model[*implementation].name();

            let annotations = self
                .definitions
                .types
                .get(implementation)
                .and_then(|definition| fields_of(definition).iter().find(|other| other.node.name.node == field))
                .map(|other| {
                    parse_annotations(&other.node.directives, AnnotationLocation::Field, &EntityDefaults::default())
                })
                .transpose()?;

            let Some(relationship) = annotations.as_ref().and_then(Annotations::relationship) else {
                return Err(BuildError::UnimplementedDeclaredRelationship {
                    interface: self.owner_name.to_string(),
                    implementation: implementation.to_string(),
                    field: field.to_string(),
                });
            };

            match &declared {
                Some(first) if first.properties != relationship.properties => {
                    return Err(BuildError::DeclaredRelationshipProperties {
                        interface: self.owner_name.to_string(),
                        field: field.to_string(),
                    });
                }
                Some(_) => (),
                None => declared = Some(relationship.clone()),
            }
        }

        declared.ok_or_else(|| BuildError::InterfaceWithoutImplementations {
            interface: self.owner_name.to_string(),
            referenced_from: self.referenced_from(field),
        })
    }

    fn attribute_kind(
        &self,
        type_name: &str,
        field: &str,
        annotations: &Annotations,
    ) -> Result<AttributeKind, BuildError> {
        if let Ok(scalar) = ScalarKind::from_str(type_name) {
            return Ok(AttributeKind::Scalar(scalar));
        }

        if let Some(id) = self.model.entity_names.get(type_name) {
            return match self.owner {
                FieldOwner::Root => Ok(AttributeKind::Entity(*id)),
                _ if annotations.cypher().is_some() => Ok(AttributeKind::Entity(*id)),
                _ => Err(BuildError::UnboundEntityField {
                    entity: self.owner_name.to_string(),
                    field: field.to_string(),
                    target: type_name.to_string(),
                }),
            };
        }

        match self.definitions.types.get(type_name).map(|definition| &definition.kind) {
            Some(TypeKind::Enum(_)) => Ok(AttributeKind::Enum),
            Some(TypeKind::Scalar) => Ok(AttributeKind::UserScalar),
            Some(_) => Err(BuildError::UnboundEntityField {
                entity: self.owner_name.to_string(),
                field: field.to_string(),
                target: type_name.to_string(),
            }),
            None => Err(BuildError::MissingDefinition {
                kind: "type",
                name: type_name.to_string(),
                referenced_from: self.referenced_from(field),
            }),
        }
    }

    fn validate_attribute(&self, attribute: &Attribute) -> Result<(), BuildError> {
        let annotations = attribute.annotations();
        let aggregate_requested =
            annotations.filterable().aggregate_requested || annotations.selectable().aggregate_requested;

        if aggregate_requested && !attribute.is_aggregable() {
            let reason = if attribute.is_list() {
                "list fields cannot be aggregated"
            } else if attribute.is_cypher() {
                "@cypher fields cannot be aggregated"
            } else {
                "only ID, String, numeric and temporal fields other than Date can be aggregated"
            };

            return Err(BuildError::NotAggregable {
                entity: self.owner_name.to_string(),
                field: attribute.name().to_string(),
                reason,
            });
        }

        let timestamped = attribute.timestamp_on(WriteOperation::Create) || attribute.timestamp_on(WriteOperation::Update);

        if timestamped && attribute.scalar() != Some(ScalarKind::DateTime) {
            return Err(BuildError::InvalidTimestamp {
                entity: self.owner_name.to_string(),
                field: attribute.name().to_string(),
            });
        }

        Ok(())
    }

    /// The named type, its nullability and `Some(item_nullable)` for lists.
    fn unwrap_type(&self, ty: &Type, field: &str) -> Result<(String, bool, Option<bool>), BuildError> {
        match &ty.base {
            BaseType::Named(name) => Ok((name.to_string(), ty.nullable, None)),
            BaseType::List(item) => match &item.base {
                BaseType::Named(name) => Ok((name.to_string(), ty.nullable, Some(item.nullable))),
                BaseType::List(_) => Err(BuildError::NestedList {
                    entity: self.owner_name.to_string(),
                    field: field.to_string(),
                }),
            },
        }
    }

    fn referenced_from(&self, field: &str) -> String {
        format!("{}.{field}", self.owner_name)
    }
}

/// Relationship checks that need the whole entity set.
pub(super) fn validate_relationship(model: &SchemaModel, relationship: &Relationship) -> Result<(), BuildError> {
    let source = model[relationship.source].name();
    let target = &model[relationship.target];

    if let Entity::Interface(interface) = target {
        if interface.implementations.is_empty() {
            return Err(BuildError::InterfaceWithoutImplementations {
                interface: interface.name.clone(),
                referenced_from: format!("{source}.{}", relationship.name),
            });
        }
    }

    let explicitly_aggregated = relationship
        .annotations
        .relationship()
        .is_some_and(|annotation| annotation.aggregate == Some(true));

    if explicitly_aggregated && target.is_concrete() && !target.annotations().query().aggregate {
        return Err(BuildError::AggregateForbiddenByTarget {
            entity: source.to_string(),
            field: relationship.name.clone(),
            target: target.name().to_string(),
        });
    }

    Ok(())
}

pub(super) fn field_argument(argument: &Positioned<InputValueDefinition>) -> FieldArgument {
    let argument = &argument.node;

    FieldArgument {
        name: argument.name.node.to_string(),
        description: argument.description.as_ref().map(|description| description.node.clone()),
        ty: argument.ty.node.clone(),
        default_value: argument.default_value.as_ref().map(|value| value.node.clone()),
    }
}
