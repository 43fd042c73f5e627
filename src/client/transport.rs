use super::point::{Point, Precision};
use crate::error::TransportError;
use crate::mapping::Value;
use async_trait::async_trait;
use std::collections::HashMap;

/// One group of query results sharing a series name and tag set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// Series (measurement) name
    pub name: String,
    /// Tags fixed for every tuple in the group
    pub tags: HashMap<String, String>,
    pub columns: Vec<String>,
    /// Value tuples, each aligned with `columns`
    pub values: Vec<Vec<Value>>,
}

/// Connection to a time-series database.
///
/// [`HttpTransport`](super::HttpTransport) talks to a real server; tests
/// plug in their own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Check the server is reachable and return its version.
    async fn ping(&self) -> Result<String, TransportError>;

    /// Run `command` against `database` and return every row group of every statement.
    async fn query(&self, command: &str, database: &str) -> Result<Vec<Row>, TransportError>;

    async fn write(
        &self,
        database: &str,
        precision: Precision,
        points: &[Point],
    ) -> Result<(), TransportError>;
}
