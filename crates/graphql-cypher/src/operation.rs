//! Turns an operation document into the resolved root fields the translator
//! takes: variables substituted, `@skip` and `@include` applied, fragments
//! inlined and fields with the same response key merged.

use std::{collections::HashMap, convert::Infallible};

use async_graphql_parser::{
    types::{Directive, DocumentOperations, Field, FragmentDefinition, OperationDefinition, OperationType, Selection, SelectionSet, VariableDefinition},
    Positioned,
};
use async_graphql_value::{ConstValue, Name, Value as GraphqlValue};
use graphql_cypher_augment::Document;
use graphql_cypher_translate::ResolvedField;
use serde_json::{Map, Value};

use crate::{error::RequestError, request::Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperationKind {
    Query,
    Mutation,
}

#[derive(Debug)]
pub(crate) struct Operation {
    pub(crate) kind: OperationKind,
    pub(crate) root_type: String,
    pub(crate) fields: Vec<ResolvedField>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct RootTypes<'a> {
    pub(crate) query: &'a str,
    pub(crate) mutation: Option<&'a str>,
}

pub(crate) fn prepare(document: &Document, roots: RootTypes<'_>, request: &Request) -> Result<Operation, RequestError> {
    let executable =
        async_graphql_parser::parse_query(&request.query).map_err(|error| RequestError::Parse(error.to_string()))?;

    let operation = select(executable.operations, request.operation_name.as_deref())?.node;

    let (kind, root_type) = match operation.ty {
        OperationType::Query => (OperationKind::Query, roots.query),
        OperationType::Mutation => (OperationKind::Mutation, roots.mutation.ok_or(RequestError::NoMutations)?),
        OperationType::Subscription => return Err(RequestError::Subscription),
    };

    let collector = Collector {
        document,
        fragments: &executable.fragments,
        variables: variables(&operation.variable_definitions, &request.variables)?,
    };

    let mut fields = Vec::new();
    collector.collect(&operation.selection_set.node, root_type, None, &mut fields, &mut Vec::new())?;

    Ok(Operation {
        kind,
        root_type: root_type.to_string(),
        fields,
    })
}

fn select(
    operations: DocumentOperations,
    name: Option<&str>,
) -> Result<Positioned<OperationDefinition>, RequestError> {
    match (operations, name) {
        (DocumentOperations::Single(operation), None) => Ok(operation),
        (DocumentOperations::Single(_), Some(name)) => Err(RequestError::UnknownOperation(name.to_string())),
        (DocumentOperations::Multiple(mut operations), Some(name)) => operations
            .remove(name)
            .ok_or_else(|| RequestError::UnknownOperation(name.to_string())),
        (DocumentOperations::Multiple(operations), None) => {
            let mut operations = operations.into_values();

            match (operations.next(), operations.next()) {
                (Some(operation), None) => Ok(operation),
                _ => Err(RequestError::OperationNameRequired),
            }
        }
    }
}

/// The provided variables, falling back to the defaults of the definitions.
/// Variables neither provided nor defaulted read as `null`.
fn variables(
    definitions: &[Positioned<VariableDefinition>],
    values: &Map<String, Value>,
) -> Result<HashMap<Name, ConstValue>, RequestError> {
    let mut variables = HashMap::new();

    for definition in definitions {
        let name = &definition.node.name.node;

        let value = match values.get(name.as_str()) {
            Some(value) => ConstValue::from_json(value.clone()).map_err(|error| RequestError::InvalidVariable {
                name: name.to_string(),
                message: error.to_string(),
            })?,
            None => match &definition.node.default_value {
                Some(default) => default.node.clone(),
                None => continue,
            },
        };

        variables.insert(name.clone(), value);
    }

    Ok(variables)
}

struct Collector<'a> {
    document: &'a Document,
    fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    variables: HashMap<Name, ConstValue>,
}

impl Collector<'_> {
    /// Collects the fields of a selection set on `parent`. Fields under a
    /// fragment on another type than `parent` keep the fragment type as their
    /// type condition.
    fn collect(
        &self,
        selection_set: &SelectionSet,
        parent: &str,
        condition: Option<&str>,
        fields: &mut Vec<ResolvedField>,
        spreads: &mut Vec<String>,
    ) -> Result<(), RequestError> {
        for selection in &selection_set.items {
            if self.is_skipped(selection.node.directives())? {
                continue;
            }

            match &selection.node {
                Selection::Field(field) => {
                    let owner = condition.unwrap_or(parent);
                    let field = self.field(&field.node, owner, spreads)?;

                    let field = match condition {
                        Some(condition) if condition != parent => field.on_type(condition),
                        _ => field,
                    };

                    merge(fields, field);
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();

                    let fragment = self
                        .fragments
                        .get(name)
                        .ok_or_else(|| RequestError::UnknownFragment(name.to_string()))?;

                    if spreads.iter().any(|spread| spread == name) {
                        return Err(RequestError::FragmentCycle(name.to_string()));
                    }

                    spreads.push(name.to_string());

                    let on = fragment.node.type_condition.node.on.node.as_str();
                    self.collect(&fragment.node.selection_set.node, parent, Some(on), fields, spreads)?;

                    spreads.pop();
                }
                Selection::InlineFragment(fragment) => {
                    let on = fragment
                        .node
                        .type_condition
                        .as_ref()
                        .map(|type_condition| type_condition.node.on.node.as_str())
                        .or(condition);

                    self.collect(&fragment.node.selection_set.node, parent, on, fields, spreads)?;
                }
            }
        }

        Ok(())
    }

    fn field(&self, field: &Field, owner: &str, spreads: &mut Vec<String>) -> Result<ResolvedField, RequestError> {
        let name = field.name.node.as_str();
        let mut arguments = Map::new();

        for (argument, value) in &field.arguments {
            let argument = argument.node.to_string();
            let value = self.json(&value.node, &argument)?;
            arguments.insert(argument, value);
        }

        let mut resolved = ResolvedField::new(name).with_arguments(arguments);

        if let Some(alias) = &field.alias {
            resolved = resolved.with_alias(alias.node.as_str());
        }

        let field_type = self
            .document
            .fields(owner)
            .and_then(|fields| fields.get(name))
            .map(|definition| definition.named_type())
            .unwrap_or_default();

        self.collect(&field.selection_set.node, field_type, None, &mut resolved.selection, spreads)?;

        Ok(resolved)
    }

    fn json(&self, value: &GraphqlValue, argument: &str) -> Result<Value, RequestError> {
        let value = value
            .clone()
            .into_const_with(|name| Ok::<_, Infallible>(self.variables.get(&name).cloned().unwrap_or(ConstValue::Null)))
            .unwrap_or_else(|never| match never {});

        value.into_json().map_err(|error| RequestError::InvalidValue {
            argument: argument.to_string(),
            message: error.to_string(),
        })
    }

    fn is_skipped(&self, directives: &[Positioned<Directive>]) -> Result<bool, RequestError> {
        for directive in directives {
            let include = match directive.node.name.node.as_str() {
                "skip" => false,
                "include" => true,
                _ => continue,
            };

            let Some(condition) = directive.node.get_argument("if") else {
                continue;
            };

            match self.json(&condition.node, "if")? {
                Value::Bool(value) if value != include => return Ok(true),
                Value::Bool(_) => (),
                _ => {
                    return Err(RequestError::InvalidValue {
                        argument: format!("@{}(if:)", directive.node.name.node),
                        message: String::from("expected a boolean"),
                    })
                }
            }
        }

        Ok(false)
    }
}

/// Adds a field to a selection, merging its sub-selection into a field
/// already selected under the same response key.
fn merge(fields: &mut Vec<ResolvedField>, field: ResolvedField) {
    let existing = fields.iter_mut().find(|existing| {
        existing.response_key() == field.response_key() && existing.type_condition == field.type_condition
    });

    match existing {
        Some(existing) => {
            for child in field.selection {
                merge(&mut existing.selection, child);
            }
        }
        None => fields.push(field),
    }
}

#[cfg(test)]
mod tests {
    use graphql_cypher_augment::augment;
    use graphql_cypher_schema::{ModelOptions, SchemaModel};
    use indoc::indoc;
    use serde_json::json;

    use super::*;

    const SCHEMA: &str = indoc! {r#"
        interface Production {
            title: String!
        }

        type Movie implements Production {
            title: String!
            released: Int
            actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN)
        }

        type Series implements Production {
            title: String!
            episodes: Int
        }

        type Actor {
            name: String!
        }
    "#};

    fn document() -> Document {
        let model = SchemaModel::from_sdl(SCHEMA, &ModelOptions::default()).unwrap();
        augment(&model).unwrap().document
    }

    const ROOTS: RootTypes<'static> = RootTypes {
        query: "Query",
        mutation: None,
    };

    fn prepare_query(query: &str, variables: Value) -> Result<Operation, RequestError> {
        let variables = variables.as_object().cloned().unwrap_or_default();

        prepare(&document(), ROOTS, &Request::new(query).with_variables(variables))
    }

    #[test]
    fn substitutes_variables_and_defaults() {
        let operation = prepare_query(
            indoc! {r#"
                query Movies($title: String!, $limit: Int = 10) {
                    found: movies(where: { title: $title }, options: { limit: $limit }) {
                        title
                    }
                }
            "#},
            json!({ "title": "The Matrix" }),
        )
        .unwrap();

        assert_eq!(operation.kind, OperationKind::Query);
        assert_eq!(operation.root_type, "Query");
        assert_eq!(
            operation.fields,
            vec![ResolvedField::new("movies")
                .with_alias("found")
                .with_argument("where", json!({ "title": "The Matrix" }))
                .with_argument("options", json!({ "limit": 10 }))
                .with_selection([ResolvedField::new("title")])]
        );
    }

    #[test]
    fn applies_skip_and_include() {
        let operation = prepare_query(
            indoc! {r#"
                query ($withActors: Boolean!) {
                    movies {
                        title @skip(if: true)
                        released @include(if: false)
                        actors @include(if: $withActors) {
                            name
                        }
                    }
                }
            "#},
            json!({ "withActors": true }),
        )
        .unwrap();

        assert_eq!(
            operation.fields[0].selection,
            vec![ResolvedField::new("actors").with_selection([ResolvedField::new("name")])]
        );
    }

    #[test]
    fn inlines_fragments_with_their_type_condition() {
        let operation = prepare_query(
            indoc! {r#"
                query {
                    productions {
                        __typename
                        ...ProductionTitle
                        ... on Movie {
                            released
                            actors { name }
                        }
                        ... on Series {
                            episodes
                        }
                    }
                }

                fragment ProductionTitle on Production {
                    title
                }
            "#},
            json!({}),
        )
        .unwrap();

        assert_eq!(
            operation.fields[0].selection,
            vec![
                ResolvedField::new("__typename"),
                ResolvedField::new("title"),
                ResolvedField::new("released").on_type("Movie"),
                ResolvedField::new("actors")
                    .on_type("Movie")
                    .with_selection([ResolvedField::new("name")]),
                ResolvedField::new("episodes").on_type("Series"),
            ]
        );
    }

    #[test]
    fn merges_fields_with_the_same_response_key() {
        let operation = prepare_query(
            indoc! {r#"
                query {
                    movies { actors { name } }
                    movies { title actors { name } }
                }
            "#},
            json!({}),
        )
        .unwrap();

        assert_eq!(
            operation.fields,
            vec![ResolvedField::new("movies").with_selection([
                ResolvedField::new("actors").with_selection([ResolvedField::new("name")]),
                ResolvedField::new("title"),
            ])]
        );
    }

    #[test]
    fn selects_the_operation_by_name() {
        let query = indoc! {r#"
            query Titles { movies { title } }
            query Names { actors { name } }
        "#};

        let error = prepare_query(query, json!({})).unwrap_err();
        assert_eq!(error, RequestError::OperationNameRequired);

        let request = Request::new(query).with_operation_name("Names");
        let operation = prepare(&document(), ROOTS, &request).unwrap();
        assert_eq!(operation.fields[0].name, "actors");

        let request = Request::new(query).with_operation_name("Ratings");
        let error = prepare(&document(), ROOTS, &request).unwrap_err();
        assert_eq!(error.to_string(), r#"Unknown operation named "Ratings""#);
    }

    #[test]
    fn rejects_mutations_without_a_mutation_type() {
        let error = prepare_query("mutation { deleteMovies { nodesDeleted } }", json!({})).unwrap_err();

        assert_eq!(error, RequestError::NoMutations);
    }

    #[test]
    fn rejects_fragment_cycles() {
        let error = prepare_query(
            indoc! {r#"
                query { movies { ...A } }
                fragment A on Movie { title ...B }
                fragment B on Movie { released ...A }
            "#},
            json!({}),
        )
        .unwrap_err();

        assert_eq!(error, RequestError::FragmentCycle(String::from("A")));
    }

    #[test]
    fn rejects_non_boolean_conditions() {
        let error = prepare_query(r#"query { movies { title @skip(if: "yes") } }"#, json!({})).unwrap_err();

        assert_eq!(error.to_string(), "Invalid value for @skip(if:): expected a boolean");
    }
}
