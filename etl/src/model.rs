use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Untyped JSON document returned by the forecast endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawWeatherResponse(pub Value);

impl RawWeatherResponse {
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for RawWeatherResponse {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Flat current-weather observation for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: f64,
    pub windspeed: f64,
    pub winddirection: f64,
    pub weathercode: i32,
}

/// Row as stored in the `weather` table
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredWeather {
    pub id: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: f64,
    pub windspeed: f64,
    pub winddirection: f64,
    pub weathercode: i32,
    pub timestamp: NaiveDateTime,
}

impl StoredWeather {
    pub fn record(&self) -> WeatherRecord {
        WeatherRecord {
            latitude: self.latitude,
            longitude: self.longitude,
            temperature: self.temperature,
            windspeed: self.windspeed,
            winddirection: self.winddirection,
            weathercode: self.weathercode,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: uuid::Uuid,
    pub row_id: i32,
    pub record: WeatherRecord,
}
