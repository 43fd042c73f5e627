//! Client for writing records and decoding queries

pub mod http;
pub mod point;
pub mod transport;

pub use http::HttpTransport;
pub use point::{Point, Precision};
pub use transport::{Row, Transport};

use crate::clean_query;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::mapping::{decode_with_time_field, encode, Record, Value, DEFAULT_TIME_FIELD};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// A connection to the database plus the write precision
#[derive(Debug, Clone)]
pub struct Client<T = HttpTransport> {
    transport: T,
    precision: Precision,
}

impl Client<HttpTransport> {
    /// Create a client talking HTTP to `config.url`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(config)?,
            precision: config.precision,
        })
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T, precision: Precision) -> Self {
        Self {
            transport,
            precision,
        }
    }

    /// The underlying transport, for calls this client does not wrap
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Start an empty request descriptor.
    pub fn using(&self) -> Using<'_, T> {
        Using {
            client: self,
            database: None,
            measurement: None,
            time_field: DEFAULT_TIME_FIELD.to_string(),
        }
    }

    pub fn select_database(&self, name: impl Into<String>) -> Using<'_, T> {
        self.using().select_database(name)
    }

    /// Returns the server version.
    pub async fn ping(&self) -> Result<String> {
        Ok(self.transport.ping().await?)
    }

    /// Run `command` against `database` and return the raw row groups.
    pub async fn query(&self, command: &str, database: &str) -> Result<Vec<Row>> {
        debug!(database, query = %clean_query(command), "running query");
        Ok(self.transport.query(command, database).await?)
    }

    /// Write points as they are; every point needs at least one field.
    pub async fn write_points(&self, database: &str, points: &[Point]) -> Result<()> {
        if let Some(p) = points
            .iter()
            .find(|p| p.fields.values().all(Value::is_null))
        {
            return Err(Error::NoFields(p.measurement.clone()));
        }

        debug!(database, points = points.len(), "writing points");
        self.transport
            .write(database, self.precision, points)
            .await?;
        Ok(())
    }
}

/// Database, measurement and time field used by one call.
///
/// Every `select_*` call returns a new descriptor; nothing is remembered on
/// the client between calls.
pub struct Using<'a, T> {
    client: &'a Client<T>,
    database: Option<String>,
    measurement: Option<String>,
    time_field: String,
}

impl<T> Clone for Using<'_, T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client,
            database: self.database.clone(),
            measurement: self.measurement.clone(),
            time_field: self.time_field.clone(),
        }
    }
}

impl<T> fmt::Debug for Using<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Using")
            .field("database", &self.database)
            .field("measurement", &self.measurement)
            .field("time_field", &self.time_field)
            .finish()
    }
}

impl<'a, T: Transport> Using<'a, T> {
    pub fn select_database(mut self, name: impl Into<String>) -> Self {
        self.database = Some(name.into());
        self
    }

    /// Write to `name` instead of the measurement a record would pick.
    pub fn select_measurement(mut self, name: impl Into<String>) -> Self {
        self.measurement = Some(name.into());
        self
    }

    /// Use the member resolved to `name` as the point timestamp.
    pub fn select_time_field(mut self, name: impl Into<String>) -> Self {
        self.time_field = name.into();
        self
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn measurement(&self) -> Option<&str> {
        self.measurement.as_deref()
    }

    pub fn time_field(&self) -> &str {
        &self.time_field
    }

    fn require_database(&self) -> Result<&str> {
        self.database.as_deref().ok_or(Error::NoDatabaseSelected)
    }

    fn point_for<R: Record>(&self, record: &R) -> Result<Point> {
        let encoded = encode(record, &self.time_field)?;
        let measurement = match &self.measurement {
            Some(m) => m.clone(),
            None => encoded.measurement.clone(),
        };
        if measurement.is_empty() {
            return Err(Error::NoMeasurementSelected);
        }
        Ok(Point::from_encoded(measurement, encoded))
    }

    /// Encode `record` and write it as one point.
    ///
    /// Without a selected measurement the record's own measurement member,
    /// or else its type name, is used for this call only.
    pub async fn write_record<R: Record>(&self, record: &R) -> Result<()> {
        self.write_records(std::slice::from_ref(record)).await
    }

    /// Encode `records` and write them in one request.
    pub async fn write_records<R: Record>(&self, records: &[R]) -> Result<()> {
        let database = self.require_database()?;
        let points = records
            .iter()
            .map(|r| self.point_for(r))
            .collect::<Result<Vec<_>>>()?;
        self.client.write_points(database, &points).await
    }

    /// Write one point from explicit tags and fields.
    pub async fn write_tags_fields(
        &self,
        tags: BTreeMap<String, String>,
        fields: BTreeMap<String, Value>,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let database = self.require_database()?;
        let measurement = self
            .measurement
            .as_deref()
            .filter(|m| !m.is_empty())
            .ok_or(Error::NoMeasurementSelected)?;

        let point = Point {
            measurement: measurement.to_string(),
            tags,
            fields,
            timestamp: Some(timestamp),
        };
        self.client.write_points(database, &[point]).await
    }

    /// Run `command` and append the decoded records to `out`.
    ///
    /// On a decode error `out` still holds every record that decoded.
    pub async fn decode_query<R: Record>(&self, command: &str, out: &mut Vec<R>) -> Result<()> {
        let database = self.require_database()?;
        let rows = self.client.query(command, database).await?;
        decode_with_time_field(&rows, &self.time_field, out)
    }
}
