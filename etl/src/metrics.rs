use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder};
use std::path::Path;
use std::sync::Once;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref RUNS_TOTAL: Counter = Counter::with_opts(Opts::new(
        "weather_etl_runs_total",
        "Total pipeline runs started"
    ))
    .unwrap();
    pub static ref RUN_FAILURES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "weather_etl_run_failures_total",
        "Total pipeline runs that failed"
    ))
    .unwrap();
    pub static ref ROWS_INSERTED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "weather_etl_rows_inserted_total",
        "Total weather rows committed"
    ))
    .unwrap();
    pub static ref FETCH_LATENCY_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "weather_etl_fetch_latency_seconds",
            "Time taken to fetch current weather"
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0])
    )
    .unwrap();
    pub static ref PERSIST_LATENCY_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "weather_etl_persist_latency_seconds",
            "Time taken to persist one weather record"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])
    )
    .unwrap();
}

static INIT: Once = Once::new();

pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY.register(Box::new(RUNS_TOTAL.clone())).unwrap();
        REGISTRY
            .register(Box::new(RUN_FAILURES_TOTAL.clone()))
            .unwrap();
        REGISTRY
            .register(Box::new(ROWS_INSERTED_TOTAL.clone()))
            .unwrap();
        REGISTRY
            .register(Box::new(FETCH_LATENCY_SECONDS.clone()))
            .unwrap();
        REGISTRY
            .register(Box::new(PERSIST_LATENCY_SECONDS.clone()))
            .unwrap();
    });
}

pub fn gather_metrics() -> prometheus::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Dump the registry for a node-exporter textfile collector.
pub fn write_metrics_file(path: &Path) -> std::io::Result<()> {
    let text = gather_metrics().map_err(std::io::Error::other)?;
    // Collectors must never see a half-written file
    let tmp = path.with_extension("prom.tmp");
    std::fs::write(&tmp, text)?;
    std::fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_metrics();
        init_metrics();
        RUNS_TOTAL.inc();
        let text = gather_metrics().unwrap();
        assert!(text.contains("weather_etl_runs_total"));
    }

    #[test]
    fn test_write_metrics_file() {
        init_metrics();
        let path = std::env::temp_dir().join(format!("weather-etl-{}.prom", uuid::Uuid::new_v4()));

        write_metrics_file(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("weather_etl_fetch_latency_seconds"));

        std::fs::remove_file(&path).unwrap();
    }
}
