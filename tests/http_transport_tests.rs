//! HttpTransport against a mock InfluxDB server

use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, TimeZone, Utc};
use influxhelper::{record, Client, ClientConfig, Error, Precision, TransportError};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorded {
    queries: Vec<HashMap<String, String>>,
    writes: Vec<(HashMap<String, String>, String)>,
    auth: Vec<Option<String>>,
}

type Shared = Arc<Mutex<Recorded>>;

async fn ping() -> impl IntoResponse {
    (StatusCode::NO_CONTENT, [("X-Influxdb-Version", "1.8.10")])
}

async fn query(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    {
        let mut state = state.lock().unwrap();
        state.auth.push(
            headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
        state.queries.push(params.clone());
    }

    match params.get("db").map(String::as_str) {
        Some("missing") => Json(json!({
            "results": [{"statement_id": 0, "error": "database not found: missing"}]
        }))
        .into_response(),
        Some("locked") => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "authorization failed"})),
        )
            .into_response(),
        _ => Json(json!({
            "results": [{
                "statement_id": 0,
                "series": [{
                    "name": "test",
                    "columns": ["time", "humidity", "location", "temperature"],
                    "values": [
                        ["2018-06-14T21:47:11Z", 60, "Rm 243", 70.5],
                        ["2018-06-14T21:48:11Z", 59, "Rm 243", 71]
                    ]
                }]
            }]
        }))
        .into_response(),
    }
}

async fn write(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    let db = params.get("db").cloned().unwrap_or_default();
    state.lock().unwrap().writes.push((params, body));

    match db.as_str() {
        "missing" => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "database not found: \"missing\""})),
        )
            .into_response(),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn spawn_server() -> (String, Shared) {
    let state = Shared::default();
    let app = Router::new()
        .route("/ping", get(ping))
        .route("/query", post(query))
        .route("/write", post(write))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    struct EnvSample {
        #[influx("time")]
        time: DateTime<Utc>,
        #[influx("location,tag")]
        location: String,
        #[influx("temperature")]
        temperature: f64,
        #[influx("humidity")]
        humidity: f64,
        #[influx("-")]
        id: String,
    }
}

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2018, 6, 14, 21, minute, 11).unwrap()
}

#[tokio::test]
async fn ping_reports_version() {
    let (url, _) = spawn_server().await;
    let client = Client::new(&ClientConfig::new(url)).unwrap();
    assert_eq!(client.ping().await.unwrap(), "1.8.10");
}

#[tokio::test]
async fn write_record_sends_line_protocol() {
    let (url, state) = spawn_server().await;
    let client = Client::new(&ClientConfig::new(url).with_precision(Precision::Seconds)).unwrap();

    let sample = EnvSample {
        time: at(47),
        location: "Rm 243".to_string(),
        temperature: 70.0,
        humidity: 60.0,
        id: "12432as32".to_string(),
    };
    client
        .select_database("myDb")
        .select_measurement("test")
        .write_record(&sample)
        .await
        .unwrap();

    let state = state.lock().unwrap();
    let (params, body) = &state.writes[0];
    assert_eq!(params.get("db").map(String::as_str), Some("myDb"));
    assert_eq!(params.get("precision").map(String::as_str), Some("s"));
    assert_eq!(body, "test,location=Rm\\ 243 humidity=60,temperature=70 1529012831");
}

#[tokio::test]
async fn decode_query_over_http() {
    let (url, state) = spawn_server().await;
    let client = Client::new(&ClientConfig::new(url)).unwrap();

    let mut samples: Vec<EnvSample> = Vec::new();
    client
        .select_database("myDb")
        .decode_query("SELECT * FROM test\n  LIMIT 2", &mut samples)
        .await
        .unwrap();

    assert_eq!(
        samples,
        vec![
            EnvSample {
                time: at(47),
                location: "Rm 243".to_string(),
                temperature: 70.5,
                humidity: 60.0,
                id: String::new(),
            },
            EnvSample {
                time: at(48),
                location: "Rm 243".to_string(),
                temperature: 71.0,
                humidity: 59.0,
                id: String::new(),
            },
        ]
    );

    let state = state.lock().unwrap();
    assert_eq!(state.queries[0].get("db").map(String::as_str), Some("myDb"));
    assert_eq!(
        state.queries[0].get("q").map(String::as_str),
        Some("SELECT * FROM test\n  LIMIT 2")
    );
    assert_eq!(state.auth[0], None);
}

#[tokio::test]
async fn statement_error_is_reported() {
    let (url, _) = spawn_server().await;
    let client = Client::new(&ClientConfig::new(url)).unwrap();

    let mut samples: Vec<EnvSample> = Vec::new();
    let err = client
        .select_database("missing")
        .decode_query("SELECT * FROM test", &mut samples)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Transport(TransportError::Database(ref m)) if m == "database not found: missing"
    ));
    assert!(samples.is_empty());
}

#[tokio::test]
async fn credentials_sent_as_basic_auth() {
    let (url, state) = spawn_server().await;
    let client =
        Client::new(&ClientConfig::new(url).with_credentials("admin", "secret")).unwrap();

    let err = client.query("SHOW DATABASES", "locked").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Transport(TransportError::Database(ref m)) if m == "authorization failed"
    ));

    let state = state.lock().unwrap();
    assert_eq!(state.auth[0].as_deref(), Some("Basic YWRtaW46c2VjcmV0"));
}

#[tokio::test]
async fn write_errors() {
    let (url, _) = spawn_server().await;
    let client = Client::new(&ClientConfig::new(url)).unwrap();
    let sample = EnvSample {
        time: at(0),
        temperature: 1.0,
        ..Default::default()
    };

    let err = client
        .select_database("missing")
        .write_record(&sample)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Transport(TransportError::Database(ref m)) if m == "database not found: \"missing\""
    ));

    let err = client
        .select_database("broken")
        .write_record(&sample)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Transport(TransportError::Status { status: 500, ref body }) if body == "boom"
    ));
}

#[tokio::test]
async fn line_break_in_tag_is_not_sent() {
    let (url, state) = spawn_server().await;
    let client = Client::new(&ClientConfig::new(url)).unwrap();
    let sample = EnvSample {
        time: at(0),
        location: "Rm 243\nevil v=2i".to_string(),
        temperature: 1.0,
        ..Default::default()
    };

    let err = client
        .select_database("myDb")
        .write_record(&sample)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Transport(TransportError::InvalidPoint { ref measurement, .. }) if measurement == "EnvSample"
    ));
    assert!(state.lock().unwrap().writes.is_empty());
}
