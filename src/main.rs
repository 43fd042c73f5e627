use chrono::{DateTime, Utc};
use influxhelper::{record, Client, ClientConfig};
use tracing::info;

const DB: &str = "dbhelper";

record! {
    #[derive(Debug, Clone, Default)]
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

// Read back with a few more members to show unused ones stay at zero.
record! {
    #[derive(Debug, Default)]
    struct EnvSampleRead {
        #[influx("time")]
        time: DateTime<Utc>,
        #[influx("location,tag")]
        location: String,
        #[influx("city,tag")]
        city: String,
        #[influx("temperature")]
        temperature: f64,
        #[influx("humidity")]
        humidity: f64,
        #[influx("cycles")]
        cycles: f64,
        #[influx("-")]
        id: String,
    }
}

fn generate_samples() -> Vec<EnvSample> {
    (0..10)
        .map(|i| EnvSample {
            time: Utc::now(),
            location: "Rm 243".to_string(),
            temperature: 70.0 + f64::from(i),
            humidity: 60.0 - f64::from(i),
            id: "12432as32".to_string(),
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ClientConfig::from_env()?;
    let client = Client::new(&config)?;

    let version = client.ping().await?;
    info!("connected to InfluxDB {}", version);

    client.query(&format!("CREATE DATABASE {}", DB), "").await?;
    info!("{} db initialized", DB);

    let db = client.select_database(DB).select_measurement("test");
    for sample in generate_samples() {
        db.write_record(&sample).await?;
    }

    let mut samples: Vec<EnvSampleRead> = Vec::new();
    db.decode_query("SELECT * FROM test ORDER BY time DESC LIMIT 10", &mut samples)
        .await?;
    for s in &samples {
        info!(
            "{} {} temperature={} humidity={} city={:?} cycles={} id={:?}",
            s.time, s.location, s.temperature, s.humidity, s.city, s.cycles, s.id
        );
    }
    info!("samples read: {}", samples.len());

    Ok(())
}
