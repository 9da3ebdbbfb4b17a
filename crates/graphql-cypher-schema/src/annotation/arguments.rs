use async_graphql_parser::{types::ConstDirective, Pos, Positioned};
use async_graphql_value::ConstValue;

use crate::AnnotationError;

/// Typed access to the arguments of one directive. Construction fails on any
/// argument the directive does not know about.
pub(crate) struct DirectiveArguments<'a> {
    directive: &'a Positioned<ConstDirective>,
}

impl<'a> DirectiveArguments<'a> {
    pub(crate) fn new(directive: &'a Positioned<ConstDirective>, allowed: &[&str]) -> Result<Self, AnnotationError> {
        for (name, value) in &directive.node.arguments {
            if !allowed.contains(&name.node.as_str()) {
                return Err(AnnotationError::UnknownArgument {
                    pos: value.pos,
                    directive: directive.node.name.node.to_string(),
                    argument: name.node.to_string(),
                });
            }
        }

        Ok(Self { directive })
    }

    pub(crate) fn pos(&self) -> Pos {
        self.directive.pos
    }

    pub(crate) fn directive_name(&self) -> String {
        self.directive.node.name.node.to_string()
    }

    fn get(&self, name: &str) -> Option<&'a ConstValue> {
        match self.directive.node.get_argument(name).map(|value| &value.node) {
            None | Some(ConstValue::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn invalid(&self, argument: &'static str, message: impl Into<String>) -> AnnotationError {
        AnnotationError::InvalidArgument {
            pos: self.pos(),
            directive: self.directive_name(),
            argument,
            message: message.into(),
        }
    }

    pub(crate) fn missing(&self, argument: &'static str) -> AnnotationError {
        AnnotationError::MissingArgument {
            pos: self.pos(),
            directive: self.directive_name(),
            argument,
        }
    }

    pub(crate) fn bool(&self, name: &'static str) -> Result<Option<bool>, AnnotationError> {
        match self.get(name) {
            None => Ok(None),
            Some(ConstValue::Boolean(value)) => Ok(Some(*value)),
            Some(_) => Err(self.invalid(name, "expected a Boolean")),
        }
    }

    pub(crate) fn int(&self, name: &'static str) -> Result<Option<i64>, AnnotationError> {
        match self.get(name) {
            None => Ok(None),
            Some(ConstValue::Number(number)) => number
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.invalid(name, "expected an Int")),
            Some(_) => Err(self.invalid(name, "expected an Int")),
        }
    }

    pub(crate) fn string(&self, name: &'static str) -> Result<Option<String>, AnnotationError> {
        match self.get(name) {
            None => Ok(None),
            Some(ConstValue::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(self.invalid(name, "expected a String")),
        }
    }

    pub(crate) fn required_string(&self, name: &'static str) -> Result<String, AnnotationError> {
        self.string(name)?.ok_or_else(|| self.missing(name))
    }

    /// Reads an enum argument, accepting its string spelling too.
    pub(crate) fn enum_value<T>(&self, name: &'static str) -> Result<Option<T>, AnnotationError>
    where
        T: std::str::FromStr,
    {
        match self.get(name) {
            None => Ok(None),
            Some(ConstValue::Enum(value)) => self.parse_enum(name, value.as_str()).map(Some),
            Some(ConstValue::String(value)) => self.parse_enum(name, value).map(Some),
            Some(_) => Err(self.invalid(name, "expected an enum value")),
        }
    }

    /// Reads a list of enum values. A single value is coerced into a list of one.
    pub(crate) fn enum_list<T>(&self, name: &'static str) -> Result<Option<Vec<T>>, AnnotationError>
    where
        T: std::str::FromStr,
    {
        let values = match self.get(name) {
            None => return Ok(None),
            Some(ConstValue::List(values)) => values.iter().collect::<Vec<_>>(),
            Some(value) => vec![value],
        };

        values
            .into_iter()
            .map(|value| match value {
                ConstValue::Enum(value) => self.parse_enum(name, value.as_str()),
                ConstValue::String(value) => self.parse_enum(name, value),
                _ => Err(self.invalid(name, "expected a list of enum values")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    pub(crate) fn string_list(&self, name: &'static str) -> Result<Option<Vec<String>>, AnnotationError> {
        let values = match self.get(name) {
            None => return Ok(None),
            Some(ConstValue::List(values)) => values.iter().collect::<Vec<_>>(),
            Some(value) => vec![value],
        };

        values
            .into_iter()
            .map(|value| match value {
                ConstValue::String(value) => Ok(value.clone()),
                _ => Err(self.invalid(name, "expected a list of strings")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// The raw argument value, for arguments that carry arbitrary input such as
    /// defaults or filters.
    pub(crate) fn value(&self, name: &'static str) -> Result<Option<serde_json::Value>, AnnotationError> {
        match self.directive.node.get_argument(name) {
            None => Ok(None),
            Some(value) => value
                .node
                .clone()
                .into_json()
                .map(Some)
                .map_err(|error| self.invalid(name, error.to_string())),
        }
    }

    pub(crate) fn list(&self, name: &'static str) -> Result<Option<Vec<&'a ConstValue>>, AnnotationError> {
        match self.get(name) {
            None => Ok(None),
            Some(ConstValue::List(values)) => Ok(Some(values.iter().collect())),
            Some(value) => Ok(Some(vec![value])),
        }
    }

    fn parse_enum<T>(&self, name: &'static str, value: &str) -> Result<T, AnnotationError>
    where
        T: std::str::FromStr,
    {
        value
            .parse()
            .map_err(|_| self.invalid(name, format!("unknown value `{value}`")))
    }
}

/// Only one directive of a kind is expected per location.
pub(crate) fn single<'a>(
    first: &'a Positioned<ConstDirective>,
    group: &[&'a Positioned<ConstDirective>],
) -> Result<&'a Positioned<ConstDirective>, AnnotationError> {
    match group.get(1) {
        Some(second) => Err(AnnotationError::Repeated {
            pos: second.pos,
            directive: second.node.name.node.to_string(),
        }),
        None => Ok(first),
    }
}
