//! Whether a nested input ends up with fields, decided from the model alone.
//!
//! Inputs reference each other in cycles (`User.posts` and `Post.author`), so
//! emptiness cannot come from the order types are generated in. The type and
//! every field referencing it ask the same predicate instead.

use graphql_cypher_schema::{annotation::NestedOperation, EntityKind, EntityWalker, RelationshipWalker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NestedInput {
    Create,
    Connect,
    ConnectOrCreate,
    Delete,
    Disconnect,
}

impl NestedInput {
    fn operation(self) -> NestedOperation {
        match self {
            NestedInput::Create => NestedOperation::Create,
            NestedInput::Connect => NestedOperation::Connect,
            NestedInput::ConnectOrCreate => NestedOperation::ConnectOrCreate,
            NestedInput::Delete => NestedOperation::Delete,
            NestedInput::Disconnect => NestedOperation::Disconnect,
        }
    }
}

/// `connectOrCreate` needs a concrete target with a unique attribute to merge on.
pub(crate) fn can_connect_or_create(relationship: RelationshipWalker<'_>) -> bool {
    let target = relationship.target();

    relationship.get().allows(NestedOperation::ConnectOrCreate)
        && target.kind() == EntityKind::Concrete
        && target.get().unique_attributes().next().is_some()
}

/// The relationship contributes a field to the entity's `<input>`.
pub(crate) fn relationship_has(relationship: RelationshipWalker<'_>, input: NestedInput) -> bool {
    let settable = match input {
        NestedInput::Create | NestedInput::Connect | NestedInput::ConnectOrCreate => relationship.get().is_creatable(),
        _ => relationship.get().is_updatable(),
    };

    if !settable {
        return false;
    }

    match input {
        NestedInput::ConnectOrCreate => can_connect_or_create(relationship),
        other => relationship.get().allows(other.operation()),
    }
}

/// `<Entity>ConnectInput`, `DisconnectInput`, `DeleteInput`, `RelationInput`
/// and `ConnectOrCreateInput` have at least one field.
pub(crate) fn entity_has(entity: EntityWalker<'_>, input: NestedInput) -> bool {
    if entity.relationships().any(|relationship| relationship_has(relationship, input)) {
        return true;
    }

    let through_implementations = matches!(
        input,
        NestedInput::Connect | NestedInput::Disconnect | NestedInput::Delete
    );

    through_implementations
        && entity.kind() == EntityKind::Interface
        && entity
            .concrete_entities()
            .into_iter()
            .any(|implementation| implementation.relationships().any(|r| relationship_has(r, input)))
}

/// `<Rel>FieldInput` has at least one field.
pub(crate) fn has_field_input(relationship: RelationshipWalker<'_>) -> bool {
    relationship.get().is_creatable()
        && (relationship.get().allows(NestedOperation::Create)
            || relationship.get().allows(NestedOperation::Connect)
            || can_connect_or_create(relationship))
}

/// `<Rel>UpdateFieldInput` has at least one field.
pub(crate) fn has_update_field_input(relationship: RelationshipWalker<'_>) -> bool {
    relationship.get().is_updatable()
        && (relationship.get().nested_operations().iter().any(|operation| {
            !matches!(operation, NestedOperation::ConnectOrCreate)
        }) || can_connect_or_create(relationship))
}
