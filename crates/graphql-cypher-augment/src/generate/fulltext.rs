use graphql_cypher_schema::EntityWalker;

use super::{filters, statics};
use crate::{
    resolvers::FieldResolver,
    sdl::{list_of, required, Field, InputValue},
    session::BuildSession,
};

/// The result, where and sort types of `@fulltext` and one root field per index.
pub(crate) fn generate(session: &mut BuildSession, entity: EntityWalker<'_>) {
    let Some(fulltext) = entity.get().fulltext().filter(|fulltext| !fulltext.indexes.is_empty()) else {
        return;
    };

    if !entity.get().is_readable() {
        return;
    }

    let names = entity.names();
    let field = names.fulltext_result_field();
    let float_where = statics::float_where(session);
    let direction = statics::sort_direction(session);

    session.add_object_type(&names.fulltext_result(), |result| {
        result.describe(Some(&format!("The result of a fulltext search on an index of {}", entity.name())));
        result.push_field(Field::new("score", "Float!"));
        result.push_field(Field::new(field.as_str(), required(entity.name())));
    });

    session.add_input_type(&names.fulltext_where_input(), |input| {
        input.describe(Some(&format!("The input for filtering a fulltext query on an index of {}", entity.name())));
        input.push_field(InputValue::new("score", float_where));
        input.push_field(InputValue::new(field.as_str(), names.where_input()));
    });

    let sortable = filters::has_sort(entity.attributes());

    session.add_input_type(&names.fulltext_sort_input(), |input| {
        input.describe(Some(&format!("The input for sorting a fulltext query on an index of {}", entity.name())));
        input.push_field(InputValue::new("score", direction));

        if sortable {
            input.push_field(InputValue::new(field.as_str(), names.sort_input()));
        }
    });

    for index in &fulltext.indexes {
        let root_field = index
            .query_name
            .clone()
            .unwrap_or_else(|| names.fulltext_field(&index.index_name));

        session.add_query_field(
            Field::new(root_field, required(&list_of(&names.fulltext_result())))
                .with_description(Some("Query a full-text index. Returns the score of every matching node."))
                .with_argument(InputValue::new("phrase", "String!"))
                .with_argument(InputValue::new("where", names.fulltext_where_input()))
                .with_argument(InputValue::new("sort", list_of(&names.fulltext_sort_input())))
                .with_argument(InputValue::new("limit", "Int"))
                .with_argument(InputValue::new("offset", "Int")),
            FieldResolver::Fulltext {
                entity: entity.id(),
                index: index.index_name.clone(),
            },
        );
    }
}
