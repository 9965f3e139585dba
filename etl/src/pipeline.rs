use crate::config::EtlConfig;
use crate::db::WeatherSink;
use crate::errors::Result;
use crate::fetch::WeatherSource;
use crate::metrics::{FETCH_LATENCY_SECONDS, RUNS_TOTAL, RUN_FAILURES_TOTAL};
use crate::model::{RawWeatherResponse, RunReport, WeatherRecord};
use crate::transform::reshape;
use tokio::time::Instant;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Extract stage with latency accounting.
pub async fn extract<S>(config: &EtlConfig, source: &S) -> Result<RawWeatherResponse>
where
    S: WeatherSource + ?Sized,
{
    let start = Instant::now();
    let raw = source.fetch_current(config).await;
    FETCH_LATENCY_SECONDS.observe(start.elapsed().as_secs_f64());
    raw
}

/// Runs fetch -> reshape -> persist once.
///
/// The sink is only touched after both earlier stages succeed, so a failed
/// fetch or a malformed response never writes anything.
pub async fn run_pipeline<S, K>(config: &EtlConfig, source: &S, sink: &K) -> Result<RunReport>
where
    S: WeatherSource + ?Sized,
    K: WeatherSink + ?Sized,
{
    let run_id = Uuid::new_v4();
    let span = info_span!("weather_etl", %run_id);

    async move {
        RUNS_TOTAL.inc();
        let result = run_stages(config, source, sink).await;

        match result {
            Ok((row_id, record)) => {
                info!("Run complete, weather row {} inserted", row_id);
                Ok(RunReport {
                    run_id,
                    row_id,
                    record,
                })
            }
            Err(e) => {
                RUN_FAILURES_TOTAL.inc();
                error!("Run failed ({:?}): {}", e.kind(), e);
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}

async fn run_stages<S, K>(
    config: &EtlConfig,
    source: &S,
    sink: &K,
) -> Result<(i32, WeatherRecord)>
where
    S: WeatherSource + ?Sized,
    K: WeatherSink + ?Sized,
{
    config.validate()?;

    info!("Stage 1/3: fetch");
    let raw = extract(config, source).await?;

    info!("Stage 2/3: reshape");
    let record = reshape(&raw, config)?;

    info!(
        "Stage 3/3: persist (temperature={}, windspeed={}, winddirection={}, weathercode={})",
        record.temperature, record.windspeed, record.winddirection, record.weathercode
    );
    let row_id = sink.persist(&record).await?;

    Ok((row_id, record))
}
