use super::point::{to_line_protocol, Point, Precision};
use super::transport::{Row, Transport};
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::mapping::Value;
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;

/// Transport for the InfluxDB 1.x HTTP API
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.username {
            Some(user) => request.basic_auth(user, self.password.as_ref()),
            None => request,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip(self), fields(url = %self.url), err)]
    async fn ping(&self) -> Result<String, TransportError> {
        let url = format!("{}/ping", self.url);
        let response = self.authorize(self.client.get(&url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        Ok(response
            .headers()
            .get("X-Influxdb-Version")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string())
    }

    #[tracing::instrument(skip(self, command), err)]
    async fn query(&self, command: &str, database: &str) -> Result<Vec<Row>, TransportError> {
        let url = format!("{}/query", self.url);
        let request = self
            .client
            .post(&url)
            .query(&[("db", database), ("q", command)]);
        let response = self.authorize(request).send().await?;

        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<QueryResponse>(&body) {
            Ok(parsed) => parsed.into_rows(status, body),
            Err(e) if status.is_success() => Err(e.into()),
            Err(_) => Err(status_error(status, body)),
        }
    }

    #[tracing::instrument(skip(self, points), fields(points_count = points.len()), err)]
    async fn write(
        &self,
        database: &str,
        precision: Precision,
        points: &[Point],
    ) -> Result<(), TransportError> {
        if points.is_empty() {
            return Ok(());
        }

        let url = format!("{}/write", self.url);
        let body = to_line_protocol(points, precision)?;
        let request = self
            .client
            .post(&url)
            .header("Content-Type", "text/plain; charset=utf-8")
            .query(&[("db", database), ("precision", precision.as_str())])
            .body(body);
        let response = self.authorize(request).send().await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!("wrote {} points to {}", points.len(), database);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody { error: Some(msg) }) => Err(TransportError::Database(msg)),
            _ => Err(status_error(status, body)),
        }
    }
}

fn status_error(status: StatusCode, body: String) -> TransportError {
    TransportError::Status {
        status: status.as_u16(),
        body,
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Query response from InfluxDB
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    series: Vec<Series>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Series {
    #[serde(default)]
    name: String,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl QueryResponse {
    fn into_rows(self, status: StatusCode, body: String) -> Result<Vec<Row>, TransportError> {
        if let Some(msg) = self.error {
            return Err(TransportError::Database(msg));
        }
        if let Some(msg) = self.results.iter().find_map(|r| r.error.clone()) {
            return Err(TransportError::Database(msg));
        }
        if !status.is_success() {
            return Err(status_error(status, body));
        }

        Ok(self
            .results
            .into_iter()
            .flat_map(|r| r.series)
            .map(|s| Row {
                name: s.name,
                tags: s.tags,
                columns: s.columns,
                values: s
                    .values
                    .into_iter()
                    .map(|tuple| tuple.into_iter().map(Value::from).collect())
                    .collect(),
            })
            .collect())
    }
}
