use cypher_ast::ast::{self, Expression, NodePattern, Pattern, PatternDirection, RelationshipPattern, Variable};
use graphql_cypher_schema::{annotation::RelationshipDirection, EntityKind, EntityWalker, RelationshipWalker};

/// `(variable:Label)` with the labels of a concrete entity.
pub(crate) fn node(variable: &Variable, entity: EntityWalker<'_>) -> NodePattern {
    NodePattern::new(variable.clone()).labels(entity.labels())
}

/// Interfaces and unions have no label of their own: a node belongs to one
/// when it carries the label of one of the members.
pub(crate) fn members(variable: &Variable, entity: EntityWalker<'_>) -> Option<Expression> {
    match entity.kind() {
        EntityKind::Concrete => None,
        EntityKind::Interface | EntityKind::Union => ast::or(
            entity
                .concrete_entities()
                .into_iter()
                .map(|member| Expression::has_label(variable.clone(), member.primary_label())),
        ),
    }
}

/// `(source)-[edge:TYPE]->(target)` in the read direction of the relationship.
pub(crate) fn read(
    source: &Variable,
    relationship: RelationshipWalker<'_>,
    edge: Option<&Variable>,
    target: NodePattern,
) -> Pattern {
    related(source, relationship, edge, target, relationship.get().read_direction())
}

/// The same pattern in the direction new relationships are created with.
pub(crate) fn write(
    source: &Variable,
    relationship: RelationshipWalker<'_>,
    edge: Option<&Variable>,
    target: NodePattern,
) -> Pattern {
    related(source, relationship, edge, target, relationship.get().write_direction())
}

fn related(
    source: &Variable,
    relationship: RelationshipWalker<'_>,
    edge: Option<&Variable>,
    target: NodePattern,
    direction: RelationshipDirection,
) -> Pattern {
    let direction = match direction {
        RelationshipDirection::In => PatternDirection::Left,
        RelationshipDirection::Out => PatternDirection::Right,
        RelationshipDirection::Undirected => PatternDirection::Undirected,
    };

    Pattern::node(source.clone()).related(
        RelationshipPattern::new(edge.cloned(), relationship.get().ty(), direction),
        target,
    )
}
