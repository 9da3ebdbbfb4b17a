//! The seam to the database. Statements arrive fully rendered; the driver
//! owns sessions, transactions, retries and the wire protocol.

use async_trait::async_trait;
use graphql_cypher_translate::CypherStatement;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One result row, keyed by column. Every translated statement returns its
/// value in the `this` column.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

/// The query statistics the mutation responses report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Counters {
    pub nodes_created: u64,
    pub nodes_deleted: u64,
    pub relationships_created: u64,
    pub relationships_deleted: u64,
    pub properties_set: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub records: Vec<Record>,
    pub counters: Counters,
}

impl QueryResult {
    /// The `this` column of every record.
    pub(crate) fn values(self) -> impl Iterator<Item = Value> {
        self.records
            .into_iter()
            .map(|mut record| record.remove("this").unwrap_or(Value::Null))
    }

    /// The `this` column of the first record, for statements returning a
    /// single row.
    pub(crate) fn single(self) -> Value {
        self.values().next().unwrap_or(Value::Null)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Could not reach the database: {0}")]
    Unavailable(String),
    #[error("The database rejected the statement ({code}): {message}")]
    Statement { code: String, message: String },
}

#[async_trait]
pub trait Driver: Send + Sync {
    async fn run(&self, statement: &CypherStatement, mode: AccessMode) -> Result<QueryResult, DriverError>;
}
