use cypher_ast::{
    ast::{Expression, Query, Variable, VariableAllocator},
    CypherStatement, CypherValue, Renderer,
};
use graphql_cypher_schema::SchemaModel;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::value;

/// The verified claims of the caller, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Authentication {
    claims: Option<Map<String, Value>>,
}

impl Authentication {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_claims(claims: Map<String, Value>) -> Self {
        Self { claims: Some(claims) }
    }

    pub fn claims(&self) -> Option<&Map<String, Value>> {
        self.claims.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.claims.is_some()
    }
}

/// The values of the `@populatedBy` callbacks, keyed by callback name.
pub type CallbackValues = IndexMap<String, Value>;

/// Per-request state of one translation: the variable and parameter
/// counters, the claims and the callback values. Never shared between
/// statements.
pub struct TranslationContext<'a> {
    model: &'a SchemaModel,
    authentication: &'a Authentication,
    callbacks: &'a CallbackValues,
    vars: VariableAllocator,
    /// Parameters referenced by name from user-written statements.
    statement_params: IndexMap<String, CypherValue>,
}

impl<'a> TranslationContext<'a> {
    pub fn new(model: &'a SchemaModel, authentication: &'a Authentication, callbacks: &'a CallbackValues) -> Self {
        Self {
            model,
            authentication,
            callbacks,
            vars: VariableAllocator::default(),
            statement_params: IndexMap::new(),
        }
    }

    pub fn model(&self) -> &'a SchemaModel {
        self.model
    }

    pub(crate) fn callback(&self, name: &str) -> Option<&'a Value> {
        self.callbacks.get(name)
    }

    pub(crate) fn node(&mut self) -> Variable {
        self.vars.node()
    }

    pub(crate) fn relationship(&mut self) -> Variable {
        self.vars.relationship()
    }

    pub(crate) fn value(&mut self) -> Variable {
        self.vars.value()
    }

    pub(crate) fn param(&mut self, value: impl Into<CypherValue>) -> Expression {
        Expression::from(self.vars.param(value))
    }

    /// Makes a value available as `$name` to a user-written statement.
    pub(crate) fn statement_param(&mut self, name: &str, value: CypherValue) {
        self.statement_params.insert(name.to_string(), value);
    }

    /// Registers the arguments of a user-written statement. The statement is
    /// opaque text, so `$jwt` and `$isAuthenticated` are passed along whenever
    /// it mentions them.
    pub(crate) fn statement(&mut self, statement: &str, arguments: &Map<String, Value>) {
        for (name, argument) in arguments {
            self.statement_param(name, value::from_json(argument));
        }

        for (name, param) in self.named_params() {
            if statement.contains(&format!("${name}")) {
                self.statement_params.entry(name).or_insert(param);
            }
        }
    }

    fn named_params(&self) -> IndexMap<String, CypherValue> {
        let claims = self
            .authentication
            .claims()
            .map(|claims| value::from_json(&Value::Object(claims.clone())))
            .unwrap_or_else(|| CypherValue::Map(IndexMap::new()));

        let mut params = IndexMap::new();
        params.insert(String::from("jwt"), claims);
        params.insert(
            String::from("isAuthenticated"),
            CypherValue::Boolean(self.authentication.is_authenticated()),
        );

        params
    }

    pub(crate) fn render(self, query: &Query) -> CypherStatement {
        let mut statement = Renderer::default().with_named_params(self.named_params()).render(query);

        for (name, value) in self.statement_params {
            statement.params.entry(name).or_insert(value);
        }

        statement
    }
}
