#![allow(unused_crate_dependencies)]

mod authorization;
mod filters;
mod mutations;
mod reads;
mod root_fields;

use std::collections::BTreeSet;

use graphql_cypher_augment::AugmentedSchema;
use graphql_cypher_schema::{ModelOptions, MutationOperation, SchemaModel};
use graphql_cypher_translate::{
    translate, Authentication, CallbackValues, CypherStatement, ResolvedField, TranslationContext, TranslationError,
};
use serde_json::Value;

struct Fixture {
    model: SchemaModel,
    schema: AugmentedSchema,
    authentication: Authentication,
    callbacks: CallbackValues,
}

impl Fixture {
    fn new(sdl: &str) -> Self {
        let options = ModelOptions {
            default_mutation_operations: BTreeSet::from([
                MutationOperation::Create,
                MutationOperation::Update,
                MutationOperation::Delete,
            ]),
            ..Default::default()
        };

        let model = SchemaModel::from_sdl(sdl, &options).unwrap();
        let schema = graphql_cypher_augment::augment(&model).unwrap();

        Self {
            model,
            schema,
            authentication: Authentication::anonymous(),
            callbacks: CallbackValues::default(),
        }
    }

    fn authenticated(mut self, claims: Value) -> Self {
        self.authentication = Authentication::with_claims(claims.as_object().cloned().unwrap_or_default());
        self
    }

    fn callback(mut self, name: &str, value: Value) -> Self {
        self.callbacks.insert(name.to_string(), value);
        self
    }

    fn query(&self, field: ResolvedField) -> Result<CypherStatement, TranslationError> {
        self.translate("Query", field)
    }

    fn mutation(&self, field: ResolvedField) -> Result<CypherStatement, TranslationError> {
        self.translate("Mutation", field)
    }

    fn translate(&self, type_name: &str, field: ResolvedField) -> Result<CypherStatement, TranslationError> {
        let resolver = self.schema.resolvers.field(type_name, &field.name).unwrap();
        let ctx = TranslationContext::new(&self.model, &self.authentication, &self.callbacks);

        translate(ctx, resolver, &field)
    }
}

fn field(name: &str) -> ResolvedField {
    ResolvedField::new(name)
}

/// `{ name }` leaves of a selection.
fn leaves<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<ResolvedField> {
    names.into_iter().map(ResolvedField::new).collect()
}

fn params(statement: &CypherStatement) -> Value {
    serde_json::to_value(&statement.params).unwrap()
}
