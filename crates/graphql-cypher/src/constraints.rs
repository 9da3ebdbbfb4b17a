//! The uniqueness constraints and fulltext indexes the generated schema
//! relies on. `connectOrCreate` merges on unique properties and the fulltext
//! queries name their index, so both must exist before serving.

use cypher_ast::escape;
use graphql_cypher_schema::SchemaModel;
use graphql_cypher_translate::CypherStatement;
use indexmap::IndexMap;

use crate::{driver::AccessMode, Error, GraphqlCypher};

impl GraphqlCypher {
    /// Creates the constraints and indexes that do not exist yet.
    #[tracing::instrument(skip_all)]
    pub async fn assert_constraints(&self) -> Result<(), Error> {
        let statements = statements(&self.model);

        for statement in &statements {
            tracing::debug!(cypher = %statement.cypher, "asserting constraint");
            self.driver.run(statement, AccessMode::Write).await?;
        }

        tracing::info!(count = statements.len(), "asserted constraints and indexes");

        Ok(())
    }
}

fn statements(model: &SchemaModel) -> Vec<CypherStatement> {
    let mut statements = Vec::new();

    for entity in model.concrete_entities() {
        let label = escape(entity.primary_label());

        for attribute in entity.get().unique_attributes() {
            let name = attribute
                .annotations()
                .unique()
                .and_then(|unique| unique.constraint_name.clone())
                .unwrap_or_else(|| format!("{}_{}", entity.name(), attribute.database_name()));

            statements.push(statement(format!(
                "CREATE CONSTRAINT {} IF NOT EXISTS FOR (n:{label}) REQUIRE n.{} IS UNIQUE",
                escape(&name),
                escape(attribute.database_name()),
            )));
        }

        let Some(fulltext) = entity.get().fulltext() else {
            continue;
        };

        for index in &fulltext.indexes {
            let properties = index
                .fields
                .iter()
                .map(|field| {
                    let property = entity
                        .find_attribute(field)
                        .map_or(field.as_str(), |attribute| attribute.database_name());

                    format!("n.{}", escape(property))
                })
                .collect::<Vec<_>>()
                .join(", ");

            statements.push(statement(format!(
                "CREATE FULLTEXT INDEX {} IF NOT EXISTS FOR (n:{label}) ON EACH [{properties}]",
                escape(&index.index_name),
            )));
        }
    }

    statements
}

fn statement(cypher: String) -> CypherStatement {
    CypherStatement {
        cypher,
        params: IndexMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use graphql_cypher_schema::ModelOptions;
    use indoc::indoc;
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn unique_constraints_and_fulltext_indexes() {
        let model = SchemaModel::from_sdl(
            indoc! {r#"
                type Movie @fulltext(indexes: [{ indexName: "MovieTitle", fields: ["title", "tagline"] }]) {
                    id: ID! @id @unique
                    title: String! @unique(constraintName: "movie_title")
                    tagline: String @alias(property: "tag_line")
                }

                type Actor @node(labels: ["Actor", "Person"]) {
                    name: String!
                    email: String! @unique
                }
            "#},
            &ModelOptions::default(),
        )
        .unwrap();

        let cypher = statements(&model)
            .into_iter()
            .map(|statement| statement.cypher)
            .collect::<Vec<_>>()
            .join("\n");

        assert_snapshot!(cypher, @r###"
        CREATE CONSTRAINT Movie_id IF NOT EXISTS FOR (n:Movie) REQUIRE n.id IS UNIQUE
        CREATE CONSTRAINT movie_title IF NOT EXISTS FOR (n:Movie) REQUIRE n.title IS UNIQUE
        CREATE FULLTEXT INDEX MovieTitle IF NOT EXISTS FOR (n:Movie) ON EACH [n.title, n.tag_line]
        CREATE CONSTRAINT Actor_email IF NOT EXISTS FOR (n:Actor) REQUIRE n.email IS UNIQUE
        "###);
    }
}
