use graphql_cypher_schema::BuildError;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SchemaGenerationError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("Objects and Interfaces must have one or more fields: {}", names.join(", "))]
    EmptyTypes { names: Vec<String> },
    #[error("Input type {name} was generated without fields.")]
    EmptyInput { name: String },
    #[error("Type {name} was generated twice.")]
    DuplicateType { name: String },
    #[error("Could not render the generated schema.")]
    Render,
}
