use std::fmt;

use async_graphql_parser::types::Type;
use async_graphql_value::ConstValue;

use crate::{
    annotation::{AnnotationKind, Annotations, WriteOperation},
    EntityId,
};

/// The built-in scalars the translator knows how to compare, sort and aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::EnumString, strum_macros::IntoStaticStr)]
pub enum ScalarKind {
    #[strum(serialize = "ID")]
    Id,
    String,
    Int,
    Float,
    Boolean,
    BigInt,
    DateTime,
    LocalDateTime,
    Date,
    Time,
    LocalTime,
    Duration,
    Point,
    CartesianPoint,
}

impl ScalarKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ScalarKind::Int | ScalarKind::Float | ScalarKind::BigInt)
    }

    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            ScalarKind::DateTime
                | ScalarKind::LocalDateTime
                | ScalarKind::Date
                | ScalarKind::Time
                | ScalarKind::LocalTime
                | ScalarKind::Duration
        )
    }

    pub fn is_spatial(self) -> bool {
        matches!(self, ScalarKind::Point | ScalarKind::CartesianPoint)
    }

    pub fn is_string_like(self) -> bool {
        matches!(self, ScalarKind::Id | ScalarKind::String)
    }

    /// Scalars with an `<Scalar>AggregateSelection` type.
    pub fn is_aggregable(self) -> bool {
        self.is_string_like() || self.is_numeric() || (self.is_temporal() && self != ScalarKind::Date)
    }

    /// Scalars whose input type differs from their output type.
    pub fn input_type_name(self) -> &'static str {
        match self {
            ScalarKind::Point => "PointInput",
            ScalarKind::CartesianPoint => "CartesianPointInput",
            other => other.name(),
        }
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Built into every GraphQL server; the others need a scalar definition.
    pub fn is_graphql_builtin(self) -> bool {
        matches!(
            self,
            ScalarKind::Id | ScalarKind::String | ScalarKind::Int | ScalarKind::Float | ScalarKind::Boolean
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeKind {
    Scalar(ScalarKind),
    Enum,
    UserScalar,
    /// A `@cypher` field returning a node type.
    Entity(EntityId),
}

/// The named type of an attribute with its wrappers. Nested lists are rejected
/// by the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeType {
    pub name: String,
    pub kind: AttributeKind,
    pub nullable: bool,
    /// `Some(item_nullable)` for list types.
    pub list: Option<bool>,
}

impl AttributeType {
    pub fn scalar(&self) -> Option<ScalarKind> {
        match self.kind {
            AttributeKind::Scalar(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        self.list.is_some()
    }

    pub fn is(&self, kind: ScalarKind) -> bool {
        self.scalar() == Some(kind)
    }

    /// The same wrappers around another named type.
    pub fn render_with(&self, name: &str, nullable: bool) -> String {
        let bang = |nullable: bool| if nullable { "" } else { "!" };

        match self.list {
            Some(item_nullable) => format!("[{name}{}]{}", bang(item_nullable), bang(nullable)),
            None => format!("{name}{}", bang(nullable)),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_with(&self.name, self.nullable))
    }
}

/// An argument declared on a field, kept for `@cypher` fields and root fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldArgument {
    pub name: String,
    pub description: Option<String>,
    pub ty: Type,
    pub default_value: Option<ConstValue>,
}

/// A scalar, enum, temporal, spatial or `@cypher` field.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub(crate) name: String,
    pub(crate) database_name: String,
    pub(crate) description: Option<String>,
    pub(crate) ty: AttributeType,
    pub(crate) annotations: Annotations,
    pub(crate) arguments: Vec<FieldArgument>,
}

impl Attribute {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The property name in the database, `@alias` or the field name.
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn ty(&self) -> &AttributeType {
        &self.ty
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn arguments(&self) -> &[FieldArgument] {
        &self.arguments
    }

    pub fn is_list(&self) -> bool {
        self.ty.is_list()
    }

    pub fn is_required(&self) -> bool {
        !self.ty.nullable
    }

    pub fn scalar(&self) -> Option<ScalarKind> {
        self.ty.scalar()
    }

    pub fn is_cypher(&self) -> bool {
        self.annotations.cypher().is_some()
    }

    pub fn is_private(&self) -> bool {
        self.annotations.is_private()
    }

    pub fn is_global_id(&self) -> bool {
        self.annotations.relay_id()
    }

    pub fn is_unique(&self) -> bool {
        self.annotations.unique().is_some() || self.is_global_id()
    }

    pub fn is_readable(&self) -> bool {
        !self.is_private() && self.annotations.selectable().on_read
    }

    pub fn is_filterable(&self) -> bool {
        !self.is_cypher() && !matches!(self.ty.kind, AttributeKind::Entity(_)) && self.annotations.filterable().by_value
    }

    /// List attributes are never sortable.
    pub fn is_sortable(&self) -> bool {
        !self.is_list() && !self.is_cypher() && !matches!(self.ty.kind, AttributeKind::Entity(_))
    }

    /// The type shape allows aggregations.
    pub fn is_aggregable(&self) -> bool {
        !self.is_list() && !self.is_cypher() && self.scalar().is_some_and(ScalarKind::is_aggregable)
    }

    /// Appears in `<Rel>NodeAggregationWhereInput`. Without a written
    /// `@filterable` the type shape decides.
    pub fn is_aggregation_filterable(&self) -> bool {
        self.is_aggregable()
            && !self.is_private()
            && (!self.annotations.is_explicit(AnnotationKind::Filterable) || self.annotations.filterable().by_aggregate)
    }

    /// Appears in aggregate selections.
    pub fn is_aggregate_selectable(&self) -> bool {
        self.is_aggregable()
            && !self.is_private()
            && (!self.annotations.is_explicit(AnnotationKind::Selectable)
                || self.annotations.selectable().on_aggregate)
    }

    pub fn is_autogenerated_id(&self) -> bool {
        self.annotations.id().is_some_and(|id| id.autogenerate)
    }

    pub fn timestamp_on(&self, operation: WriteOperation) -> bool {
        self.annotations
            .timestamp()
            .is_some_and(|timestamp| timestamp.operations.contains(&operation))
    }

    pub fn populated_by_on(&self, operation: WriteOperation) -> Option<&str> {
        self.annotations
            .populated_by()
            .filter(|populated_by| populated_by.operations.contains(&operation))
            .map(|populated_by| populated_by.callback.as_str())
    }

    /// The database writes it, not the client.
    fn is_managed_on(&self, operation: WriteOperation) -> bool {
        self.is_cypher()
            || self.timestamp_on(operation)
            || self.populated_by_on(operation).is_some()
            || (operation == WriteOperation::Create && self.is_autogenerated_id())
            || (operation == WriteOperation::Update && self.annotations.id().is_some())
    }

    pub fn is_creatable(&self) -> bool {
        !matches!(self.ty.kind, AttributeKind::Entity(_))
            && self.annotations.settable().on_create
            && !self.is_managed_on(WriteOperation::Create)
    }

    pub fn is_updatable(&self) -> bool {
        !matches!(self.ty.kind, AttributeKind::Entity(_))
            && self.annotations.settable().on_update
            && !self.is_managed_on(WriteOperation::Update)
    }

    pub fn default_value(&self) -> Option<&serde_json::Value> {
        self.annotations.default_value().map(|default| &default.value)
    }

    pub fn coalesce_value(&self) -> Option<&serde_json::Value> {
        self.annotations.coalesce().map(|coalesce| &coalesce.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribute(kind: AttributeKind, list: Option<bool>) -> Attribute {
        Attribute {
            name: String::from("field"),
            database_name: String::from("field"),
            description: None,
            ty: AttributeType {
                name: String::from("Whatever"),
                kind,
                nullable: true,
                list,
            },
            annotations: Annotations::default(),
            arguments: Vec::new(),
        }
    }

    #[test]
    fn lists_are_not_sortable_or_aggregable() {
        let list = attribute(AttributeKind::Scalar(ScalarKind::Int), Some(false));

        assert!(!list.is_sortable());
        assert!(!list.is_aggregable());

        let single = attribute(AttributeKind::Scalar(ScalarKind::Int), None);

        assert!(single.is_sortable());
        assert!(single.is_aggregable());
    }

    #[test]
    fn booleans_and_points_are_not_aggregable() {
        assert!(!attribute(AttributeKind::Scalar(ScalarKind::Boolean), None).is_aggregable());
        assert!(!attribute(AttributeKind::Scalar(ScalarKind::Point), None).is_aggregable());
        assert!(!attribute(AttributeKind::Enum, None).is_aggregable());
    }

    #[test]
    fn type_rendering() {
        let ty = AttributeType {
            name: String::from("String"),
            kind: AttributeKind::Scalar(ScalarKind::String),
            nullable: false,
            list: Some(false),
        };

        assert_eq!(ty.to_string(), "[String!]!");
        assert_eq!(ty.render_with("StringInput", true), "[StringInput!]");
    }
}
