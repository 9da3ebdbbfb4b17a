use async_graphql_parser::{types::ConstDirective, Positioned};
use serde_json::{Map, Value};

use super::arguments::{single, DirectiveArguments};
use crate::AnnotationError;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
    strum_macros::EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationOperation {
    Read,
    Aggregate,
    Update,
    Delete,
    CreateRelationship,
    DeleteRelationship,
}

/// One entry of `@authorization(filter: [...])`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationFilterRule {
    pub operations: Vec<AuthorizationOperation>,
    pub require_authentication: bool,
    /// The `where` argument: `node`, `jwt` and the logical keys.
    pub predicate: Map<String, Value>,
}

impl AuthorizationFilterRule {
    pub fn applies_to(&self, operation: AuthorizationOperation) -> bool {
        self.operations.contains(&operation)
    }
}

/// `@authorization(filter:)`. Only filter rules exist, a denied operation
/// becomes an empty match rather than an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorizationAnnotation {
    pub filter: Vec<AuthorizationFilterRule>,
}

impl AuthorizationAnnotation {
    pub fn rules_for(&self, operation: AuthorizationOperation) -> impl Iterator<Item = &AuthorizationFilterRule> {
        self.filter.iter().filter(move |rule| rule.applies_to(operation))
    }
}

const WHERE_KEYS: &[&str] = &["node", "jwt", "AND", "OR", "NOT"];

pub(super) fn parse_authorization(
    first: &Positioned<ConstDirective>,
    group: &[&Positioned<ConstDirective>],
) -> Result<AuthorizationAnnotation, AnnotationError> {
    let directive = single(first, group)?;
    let args = DirectiveArguments::new(directive, &["filter"])?;

    let invalid = |message: String| AnnotationError::InvalidArgument {
        pos: directive.pos,
        directive: String::from("authorization"),
        argument: "filter",
        message,
    };

    let rules = match args.value("filter")? {
        Some(Value::Array(rules)) => rules,
        Some(rule @ Value::Object(_)) => vec![rule],
        Some(_) => return Err(invalid(String::from("expected a list of filter rules"))),
        None => return Err(args.missing("filter")),
    };

    let mut filter = Vec::with_capacity(rules.len());

    for rule in rules {
        let Value::Object(mut rule) = rule else {
            return Err(invalid(String::from("expected a list of filter rules")));
        };

        if let Some(key) = rule
            .keys()
            .find(|key| !["operations", "requireAuthentication", "where"].contains(&key.as_str()))
        {
            return Err(invalid(format!("unknown rule key `{key}`")));
        }

        let operations = match rule.remove("operations") {
            None | Some(Value::Null) => {
                <AuthorizationOperation as strum::IntoEnumIterator>::iter().collect::<Vec<_>>()
            }
            Some(Value::Array(operations)) => operations
                .iter()
                .map(|operation| {
                    operation
                        .as_str()
                        .and_then(|operation| operation.parse().ok())
                        .ok_or_else(|| invalid(format!("unknown operation `{operation}`")))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => return Err(invalid(format!("unknown operation `{other}`"))),
        };

        let require_authentication = match rule.remove("requireAuthentication") {
            None | Some(Value::Null) => true,
            Some(Value::Bool(value)) => value,
            Some(_) => return Err(invalid(String::from("requireAuthentication must be a Boolean"))),
        };

        let predicate = match rule.remove("where") {
            Some(Value::Object(predicate)) => predicate,
            None => Map::new(),
            Some(_) => return Err(invalid(String::from("where must be an object"))),
        };

        validate_where(&predicate).map_err(invalid)?;

        filter.push(AuthorizationFilterRule {
            operations,
            require_authentication,
            predicate,
        });
    }

    Ok(AuthorizationAnnotation { filter })
}

fn validate_where(predicate: &Map<String, Value>) -> Result<(), String> {
    for (key, value) in predicate {
        if !WHERE_KEYS.contains(&key.as_str()) {
            return Err(format!("unknown where key `{key}`"));
        }

        match (key.as_str(), value) {
            ("AND" | "OR", Value::Array(items)) => {
                for item in items {
                    match item {
                        Value::Object(item) => validate_where(item)?,
                        _ => return Err(format!("{key} expects a list of objects")),
                    }
                }
            }
            ("NOT", Value::Object(item)) => validate_where(item)?,
            ("node" | "jwt", Value::Object(_)) => (),
            _ => return Err(format!("unexpected value for `{key}`")),
        }
    }

    Ok(())
}
