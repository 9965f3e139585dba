//! Daily current-weather ETL.
//!
//! Fetches the current conditions for one coordinate from the Open-Meteo
//! forecast API, flattens them into a [`WeatherRecord`] and appends a row to
//! the Postgres `weather` table. Scheduling, retries and alerting belong to
//! whatever invokes the binary.

pub mod config;
pub mod db;
pub mod errors;
pub mod fetch;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod transform;

pub use config::{Connections, EtlConfig};
pub use db::{PgWeatherSink, WeatherSink};
pub use errors::{Error, ErrorKind, Result};
pub use fetch::{OpenMeteoClient, WeatherSource};
pub use model::{RawWeatherResponse, RunReport, StoredWeather, WeatherRecord};
pub use pipeline::{extract, run_pipeline};
pub use transform::reshape;
