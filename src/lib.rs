//! # influxhelper
//!
//! Maps typed records to InfluxDB points and decodes query rows back into
//! records.
//!
//! Record members are annotated `name[,tag][,field]`: the member resolved to
//! `time` becomes the point timestamp, `tag` members become tags, everything
//! else is a field, `-` is skipped and a [`Measurement`] member carries the
//! series name.
//!
//! ```no_run
//! use chrono::{DateTime, Utc};
//! use influxhelper::{record, Client, ClientConfig};
//!
//! record! {
//!     #[derive(Debug, Default)]
//!     struct EnvSample {
//!         #[influx("time")]
//!         time: DateTime<Utc>,
//!         #[influx("location,tag")]
//!         location: String,
//!         #[influx("temperature")]
//!         temperature: f64,
//!     }
//! }
//!
//! # async fn run() -> influxhelper::Result<()> {
//! let client = Client::new(&ClientConfig::default())?;
//! let db = client.select_database("myDb").select_measurement("test");
//!
//! db.write_record(&EnvSample::default()).await?;
//!
//! let mut samples: Vec<EnvSample> = Vec::new();
//! db.decode_query("SELECT * FROM test ORDER BY time DESC LIMIT 10", &mut samples)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod mapping;

mod error;

pub use client::{Client, HttpTransport, Point, Precision, Row, Transport, Using};
pub use config::ClientConfig;
pub use error::{DecodeError, DecodeErrors, Error, Result, TransportError};
pub use mapping::{decode, encode, Encoded, FieldType, Measurement, Record, Value, ValueKind};

/// Collapse newlines and runs of whitespace in `query` into single spaces.
///
/// Only meant for logging; the query sent to the server is unchanged.
pub fn clean_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}
