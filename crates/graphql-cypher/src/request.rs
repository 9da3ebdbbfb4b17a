use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;

/// A GraphQL request, in the shape of the usual JSON body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub query: String,
    #[serde(default)]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: Map<String, Value>,
    /// The bearer token of the caller, without the `Bearer ` prefix.
    #[serde(skip)]
    pub token: Option<String>,
}

impl Request {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
}

impl Response {
    /// A request that failed before any field could run.
    pub(crate) fn from_error(error: &Error) -> Self {
        Self {
            data: None,
            errors: vec![GraphqlError::new(error.to_string())],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

impl GraphqlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: impl IntoIterator<Item = String>) -> Self {
        self.path = path.into_iter().collect();
        self
    }
}
