//! Turns the `this` column of the records into the field values of the
//! response. The translator already projects every selected field under its
//! response key; shaping selects them in order, fills in what only exists
//! outside the database (type names, global ids, cursors, page info and the
//! mutation counters) and drops the helper entries.

use graphql_cypher_augment::{sdl::TypeKind, AugmentedSchema, FieldResolver};
use graphql_cypher_translate::{cursor, GlobalId, ResolvedField, RESOLVE_TYPE};
use serde_json::{Map, Number, Value};

use crate::driver::{Counters, QueryResult};

pub(crate) struct Shaper<'a> {
    schema: &'a AugmentedSchema,
}

impl<'a> Shaper<'a> {
    pub(crate) fn new(schema: &'a AugmentedSchema) -> Self {
        Self { schema }
    }

    /// The value of a root field from the result of its statement.
    pub(crate) fn root(
        &self,
        resolver: &FieldResolver,
        root_type: &str,
        field: &ResolvedField,
        result: QueryResult,
    ) -> Value {
        let definition = self
            .schema
            .document
            .fields(root_type)
            .and_then(|fields| fields.get(&field.name));

        let type_name = definition.map(|definition| definition.named_type()).unwrap_or_default();
        let is_list = definition.is_some_and(|definition| definition.ty.starts_with('['));

        match resolver {
            FieldResolver::Connection { .. } => self.connection(result.single(), type_name, field),
            FieldResolver::Aggregate { .. } | FieldResolver::GlobalNode => {
                self.value(result.single(), type_name, &field.selection)
            }
            FieldResolver::Create { .. } | FieldResolver::Update { .. } => {
                self.mutation_response(result, type_name, field)
            }
            FieldResolver::Delete { .. } => self.info(&result.counters, type_name, &field.selection),
            FieldResolver::CustomCypher { .. } if !is_list => self.value(result.single(), type_name, &field.selection),
            _ => Value::Array(
                result
                    .values()
                    .map(|value| self.value(value, type_name, &field.selection))
                    .collect(),
            ),
        }
    }

    fn value(&self, value: Value, type_name: &str, selection: &[ResolvedField]) -> Value {
        match value {
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.value(item, type_name, selection))
                    .collect(),
            ),
            Value::Object(object) if !selection.is_empty() => Value::Object(self.object(object, type_name, selection)),
            value => value,
        }
    }

    fn object(&self, mut object: Map<String, Value>, type_name: &str, selection: &[ResolvedField]) -> Map<String, Value> {
        let concrete = match object.remove(RESOLVE_TYPE) {
            Some(Value::String(name)) => name,
            _ => type_name.to_string(),
        };

        let mut shaped = Map::new();

        for field in selection {
            let key = field.response_key();

            if shaped.contains_key(key) || !self.applies(field, &concrete) {
                continue;
            }

            let value = self.field(&concrete, &mut object, field);
            shaped.insert(key.to_string(), value);
        }

        shaped
    }

    fn field(&self, owner: &str, object: &mut Map<String, Value>, field: &ResolvedField) -> Value {
        if field.name == "__typename" {
            return Value::String(owner.to_string());
        }

        let raw = object.remove(field.response_key()).unwrap_or(Value::Null);

        match self.schema.resolvers.field(owner, &field.name) {
            Some(FieldResolver::GlobalId { .. }) => global_id(owner, raw),
            Some(FieldResolver::ConnectionField { .. }) => self.connection(raw, self.field_type(owner, &field.name), field),
            Some(FieldResolver::Numerical) => numerical(raw),
            _ => self.value(raw, self.field_type(owner, &field.name), &field.selection),
        }
    }

    /// `{ edges, totalCount, pageInfo }` from the `{ edges, totalCount }` the
    /// translator returns. The page starts right after the `after` cursor.
    fn connection(&self, value: Value, type_name: &str, field: &ResolvedField) -> Value {
        let Value::Object(mut connection) = value else {
            return value;
        };

        let edges = match connection.remove("edges") {
            Some(Value::Array(edges)) => edges,
            _ => Vec::new(),
        };

        let total = connection.remove("totalCount").unwrap_or(Value::from(0));

        let start = field
            .argument("after")
            .and_then(Value::as_str)
            .and_then(|after| cursor::decode(after).ok())
            .map_or(0, |offset| offset + 1);

        let page = Page {
            start,
            len: edges.len(),
            total: total.as_u64().unwrap_or_default() as usize,
        };

        let edge_type = self.field_type(type_name, "edges");
        let mut shaped = Map::new();

        for selected in &field.selection {
            let key = selected.response_key();

            if shaped.contains_key(key) {
                continue;
            }

            let value = match selected.name.as_str() {
                "__typename" => Value::String(type_name.to_string()),
                "totalCount" => total.clone(),
                "pageInfo" => page.info(self.field_type(type_name, "pageInfo"), &selected.selection),
                "edges" => Value::Array(
                    edges
                        .iter()
                        .enumerate()
                        .map(|(index, edge)| self.edge(edge, edge_type, start + index, &selected.selection))
                        .collect(),
                ),
                _ => Value::Null,
            };

            shaped.insert(key.to_string(), value);
        }

        Value::Object(shaped)
    }

    fn edge(&self, edge: &Value, type_name: &str, offset: usize, selection: &[ResolvedField]) -> Value {
        let mut shaped = Map::new();

        for selected in selection {
            let key = selected.response_key();

            if shaped.contains_key(key) {
                continue;
            }

            let value = match selected.name.as_str() {
                "__typename" => Value::String(type_name.to_string()),
                "cursor" => Value::String(cursor::encode(offset)),
                name @ ("node" | "properties") => self.value(
                    edge.get(name).cloned().unwrap_or(Value::Null),
                    self.field_type(type_name, name),
                    &selected.selection,
                ),
                _ => Value::Null,
            };

            shaped.insert(key.to_string(), value);
        }

        Value::Object(shaped)
    }

    /// `{ info, movies }` of a create or update.
    fn mutation_response(&self, result: QueryResult, type_name: &str, field: &ResolvedField) -> Value {
        let counters = result.counters;
        let mut nodes = Some(result.values().collect::<Vec<_>>());
        let mut shaped = Map::new();

        for selected in &field.selection {
            let key = selected.response_key();

            if shaped.contains_key(key) {
                continue;
            }

            let value = match selected.name.as_str() {
                "__typename" => Value::String(type_name.to_string()),
                "info" => self.info(&counters, self.field_type(type_name, "info"), &selected.selection),
                name => {
                    let node_type = self.field_type(type_name, name);
                    let nodes = nodes.take().unwrap_or_default();
                    self.value(Value::Array(nodes), node_type, &selected.selection)
                }
            };

            shaped.insert(key.to_string(), value);
        }

        Value::Object(shaped)
    }

    fn info(&self, counters: &Counters, type_name: &str, selection: &[ResolvedField]) -> Value {
        let mut shaped = Map::new();

        for selected in selection {
            let value = match selected.name.as_str() {
                "__typename" => Value::String(type_name.to_string()),
                "nodesCreated" => Value::from(counters.nodes_created),
                "nodesDeleted" => Value::from(counters.nodes_deleted),
                "relationshipsCreated" => Value::from(counters.relationships_created),
                "relationshipsDeleted" => Value::from(counters.relationships_deleted),
                _ => Value::Null,
            };

            shaped.insert(selected.response_key().to_string(), value);
        }

        Value::Object(shaped)
    }

    fn field_type(&self, owner: &str, field: &str) -> &'a str {
        self.schema
            .document
            .fields(owner)
            .and_then(|fields| fields.get(field))
            .map(|definition| definition.named_type())
            .unwrap_or_default()
    }

    /// Whether a field selected through a fragment applies to the concrete
    /// type of the value.
    fn applies(&self, field: &ResolvedField, concrete: &str) -> bool {
        let Some(condition) = field.type_condition.as_deref() else {
            return true;
        };

        if condition == concrete {
            return true;
        }

        let implements = match self.schema.document.get(concrete).map(|definition| &definition.kind) {
            Some(TypeKind::Object(object)) => object.implements.iter().any(|name| name == condition),
            _ => false,
        };

        let member_of = match self.schema.document.get(condition).map(|definition| &definition.kind) {
            Some(TypeKind::Union(members)) => members.iter().any(|name| name == concrete),
            _ => false,
        };

        implements || member_of
    }
}

struct Page {
    start: usize,
    len: usize,
    total: usize,
}

impl Page {
    fn info(&self, type_name: &str, selection: &[ResolvedField]) -> Value {
        let cursor = |offset: usize| {
            if self.len == 0 {
                Value::Null
            } else {
                Value::String(cursor::encode(offset))
            }
        };

        let mut shaped = Map::new();

        for selected in selection {
            let value = match selected.name.as_str() {
                "__typename" => Value::String(type_name.to_string()),
                "hasNextPage" => Value::Bool(self.start + self.len < self.total),
                "hasPreviousPage" => Value::Bool(self.start > 0),
                "startCursor" => cursor(self.start),
                "endCursor" => cursor((self.start + self.len).saturating_sub(1)),
                _ => Value::Null,
            };

            shaped.insert(selected.response_key().to_string(), value);
        }

        Value::Object(shaped)
    }
}

fn global_id(type_name: &str, raw: Value) -> Value {
    let value = match raw {
        Value::Null => return Value::Null,
        Value::String(value) => value,
        other => other.to_string(),
    };

    Value::String(GlobalId::new(type_name, value).encode())
}

/// Whole floats read back as integers.
fn numerical(raw: Value) -> Value {
    match raw.as_f64() {
        Some(float) if raw.is_f64() && float.fract() == 0.0 && float.abs() < 9_007_199_254_740_992.0 => {
            Value::Number(Number::from(float as i64))
        }
        _ => raw,
    }
}

