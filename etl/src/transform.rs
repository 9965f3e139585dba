use crate::config::EtlConfig;
use crate::errors::{Error, Result};
use crate::model::{RawWeatherResponse, WeatherRecord};
use serde_json::{Map, Value};

pub const CURRENT_WEATHER_KEY: &str = "current_weather";

/// Flattens the `current_weather` object into a [`WeatherRecord`].
///
/// Values are copied as-is; no range checks are applied.
pub fn reshape(raw: &RawWeatherResponse, config: &EtlConfig) -> Result<WeatherRecord> {
    let current = raw
        .as_value()
        .get(CURRENT_WEATHER_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| Error::MalformedResponse(CURRENT_WEATHER_KEY.to_string()))?;

    Ok(WeatherRecord {
        latitude: config.latitude,
        longitude: config.longitude,
        temperature: number(current, "temperature")?,
        windspeed: number(current, "windspeed")?,
        winddirection: number(current, "winddirection")?,
        weathercode: code(current, "weathercode")?,
    })
}

fn field<'a>(current: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    current.get(key).ok_or_else(|| missing(key))
}

fn number(current: &Map<String, Value>, key: &str) -> Result<f64> {
    field(current, key)?.as_f64().ok_or_else(|| missing(key))
}

fn code(current: &Map<String, Value>, key: &str) -> Result<i32> {
    field(current, key)?
        .as_i64()
        .and_then(|c| i32::try_from(c).ok())
        .ok_or_else(|| missing(key))
}

fn missing(key: &str) -> Error {
    Error::MalformedResponse(format!("{}.{}", CURRENT_WEATHER_KEY, key))
}
