use std::collections::BTreeSet;

use async_graphql_parser::{types::ConstDirective, Positioned};

use super::arguments::{single, DirectiveArguments};
use crate::AnnotationError;

/// `@filterable(byValue:, byAggregate:)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterableAnnotation {
    pub by_value: bool,
    pub by_aggregate: bool,
    /// `byAggregate: true` was written out.
    pub aggregate_requested: bool,
}

impl Default for FilterableAnnotation {
    fn default() -> Self {
        Self {
            by_value: true,
            by_aggregate: false,
            aggregate_requested: false,
        }
    }
}

/// `@selectable(onRead:, onAggregate:)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectableAnnotation {
    pub on_read: bool,
    pub on_aggregate: bool,
    /// `onAggregate: true` was written out.
    pub aggregate_requested: bool,
}

impl Default for SelectableAnnotation {
    fn default() -> Self {
        Self {
            on_read: true,
            on_aggregate: false,
            aggregate_requested: false,
        }
    }
}

/// `@settable(onCreate:, onUpdate:)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettableAnnotation {
    pub on_create: bool,
    pub on_update: bool,
}

impl Default for SettableAnnotation {
    fn default() -> Self {
        Self {
            on_create: true,
            on_update: true,
        }
    }
}

/// `@query(read:, aggregate:)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryAnnotation {
    pub read: bool,
    pub aggregate: bool,
}

impl Default for QueryAnnotation {
    fn default() -> Self {
        Self {
            read: true,
            aggregate: false,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum_macros::EnumString, strum_macros::AsRefStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationOperation {
    Create,
    Update,
    Delete,
}

/// `@mutation(operations:)`. Without the directive no mutations are generated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationAnnotation {
    pub operations: BTreeSet<MutationOperation>,
}

impl MutationAnnotation {
    pub fn allows(&self, operation: MutationOperation) -> bool {
        self.operations.contains(&operation)
    }
}

/// `@subscription(events:)`. Parsed and kept, subscriptions are not generated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionAnnotation {
    pub events: Vec<String>,
}

pub(super) fn parse_filterable(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<FilterableAnnotation, AnnotationError> {
    let args = DirectiveArguments::new(single(first, group)?, &["byValue", "byAggregate"])?;

    let by_aggregate = args.bool("byAggregate")?;

    Ok(FilterableAnnotation {
        by_value: args.bool("byValue")?.unwrap_or(true),
        by_aggregate: by_aggregate.unwrap_or(true),
        aggregate_requested: by_aggregate == Some(true),
    })
}

pub(super) fn parse_selectable(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<SelectableAnnotation, AnnotationError> {
    let args = DirectiveArguments::new(single(first, group)?, &["onRead", "onAggregate"])?;

    let on_aggregate = args.bool("onAggregate")?;

    Ok(SelectableAnnotation {
        on_read: args.bool("onRead")?.unwrap_or(true),
        on_aggregate: on_aggregate.unwrap_or(true),
        aggregate_requested: on_aggregate == Some(true),
    })
}

pub(super) fn parse_settable(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<SettableAnnotation, AnnotationError> {
    let args = DirectiveArguments::new(single(first, group)?, &["onCreate", "onUpdate"])?;

    Ok(SettableAnnotation {
        on_create: args.bool("onCreate")?.unwrap_or(true),
        on_update: args.bool("onUpdate")?.unwrap_or(true),
    })
}

pub(super) fn parse_query(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<QueryAnnotation, AnnotationError> {
    let args = DirectiveArguments::new(single(first, group)?, &["read", "aggregate"])?;

    Ok(QueryAnnotation {
        read: args.bool("read")?.unwrap_or(true),
        aggregate: args.bool("aggregate")?.unwrap_or(false),
    })
}

pub(super) fn parse_mutation(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<MutationAnnotation, AnnotationError> {
    let args = DirectiveArguments::new(single(first, group)?, &["operations"])?;

    let operations = match args.enum_list::<MutationOperation>("operations")? {
        Some(operations) => operations.into_iter().collect(),
        None => [
            MutationOperation::Create,
            MutationOperation::Update,
            MutationOperation::Delete,
        ]
        .into_iter()
        .collect(),
    };

    Ok(MutationAnnotation { operations })
}

pub(super) fn parse_subscription(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<SubscriptionAnnotation, AnnotationError> {
    let args = DirectiveArguments::new(single(first, group)?, &["events"])?;

    let events = match args.list("events")? {
        Some(values) => values.into_iter().map(|value| value.to_string()).collect(),
        None => Vec::new(),
    };

    Ok(SubscriptionAnnotation { events })
}
