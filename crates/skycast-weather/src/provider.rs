//! Open-Meteo forecast client.
//!
//! One GET per fetch: current conditions, the hourly temperature series
//! (sampled at the fixed morning/noon/evening hours) and a three-day
//! daily series for tomorrow / day-after outlooks.

use reqwest::Client;
use std::time::Duration;

use crate::types::{Coordinate, DayOutlook, Daypart, IntradaySample, WeatherError, WeatherSnapshot};

const OPEN_METEO_URL: &str = "https://api.open-meteo.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, serde::Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
    hourly: HourlyBlock,
    daily: DailyBlock,
}

#[derive(Debug, serde::Deserialize)]
struct CurrentBlock {
    time: String,
    temperature_2m: f64,
    apparent_temperature: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
    weather_code: i32,
    is_day: i32,
}

#[derive(Debug, serde::Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
}

#[derive(Debug, serde::Deserialize)]
struct DailyBlock {
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    weather_code: Vec<i32>,
}

impl WeatherProvider {
    pub fn new() -> Result<Self, WeatherError> {
        Self::new_with_base_url(OPEN_METEO_URL)
    }

    /// Provider pointed at a custom base URL (used by tests against a mock server).
    pub fn new_with_base_url(base_url: &str) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch current conditions and the short outlook for a coordinate.
    /// Non-2xx responses and undecodable bodies are terminal errors.
    pub async fn fetch(&self, coordinate: Coordinate) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!(
            "{}/v1/forecast?latitude={}&longitude={}\
             &current=temperature_2m,apparent_temperature,relative_humidity_2m,wind_speed_10m,is_day,weather_code\
             &hourly=temperature_2m\
             &daily=temperature_2m_max,temperature_2m_min,weather_code\
             &timezone=auto&forecast_days=3",
            self.base_url, coordinate.latitude, coordinate.longitude
        );

        tracing::debug!(
            "Fetching weather for ({:.4}, {:.4})",
            coordinate.latitude,
            coordinate.longitude
        );

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(format!("Invalid forecast body: {e}")))?;

        Ok(Self::extract_snapshot(body))
    }

    fn extract_snapshot(body: ForecastResponse) -> WeatherSnapshot {
        let intraday = Self::intraday_samples(&body.current.time, &body.hourly);
        let tomorrow = Self::day_outlook(&body.daily, 1);
        let after_tomorrow = Self::day_outlook(&body.daily, 2);

        WeatherSnapshot {
            temperature: body.current.temperature_2m,
            apparent_temperature: body.current.apparent_temperature,
            humidity: body.current.relative_humidity_2m.round().clamp(0.0, 100.0) as u8,
            wind_speed: body.current.wind_speed_10m,
            weather_code: body.current.weather_code,
            is_day: body.current.is_day == 1,
            observed_at: body.current.time,
            intraday,
            tomorrow,
            after_tomorrow,
        }
    }

    /// Sample today's hourly temperatures at the fixed daypart hours.
    /// Hourly timestamps are provider-local, e.g. "2026-08-25T08:00".
    fn intraday_samples(current_time: &str, hourly: &HourlyBlock) -> Vec<IntradaySample> {
        let Some(today) = current_time.get(..10) else {
            return Vec::new();
        };

        Daypart::ALL
            .iter()
            .filter_map(|&daypart| {
                let wanted = format!("{}T{:02}:00", today, daypart.local_hour());
                let index = hourly.time.iter().position(|t| t == &wanted)?;
                let temperature = *hourly.temperature_2m.get(index)?;
                Some(IntradaySample {
                    daypart,
                    temperature,
                })
            })
            .collect()
    }

    fn day_outlook(daily: &DailyBlock, index: usize) -> Option<DayOutlook> {
        Some(DayOutlook {
            min_temp: *daily.temperature_2m_min.get(index)?,
            max_temp: *daily.temperature_2m_max.get(index)?,
            weather_code: *daily.weather_code.get(index)?,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn forecast_body() -> serde_json::Value {
        serde_json::json!({
            "current": {
                "time": "2026-08-25T14:00",
                "temperature_2m": 21.4,
                "apparent_temperature": 20.1,
                "relative_humidity_2m": 58.0,
                "wind_speed_10m": 12.3,
                "weather_code": 3,
                "is_day": 1
            },
            "hourly": {
                "time": [
                    "2026-08-25T07:00", "2026-08-25T08:00", "2026-08-25T13:00",
                    "2026-08-25T19:00", "2026-08-26T08:00"
                ],
                "temperature_2m": [14.0, 15.5, 21.0, 18.2, 16.0]
            },
            "daily": {
                "time": ["2026-08-25", "2026-08-26", "2026-08-27"],
                "temperature_2m_max": [22.0, 24.5, 19.0],
                "temperature_2m_min": [13.0, 14.2, 11.8],
                "weather_code": [3, 0, 61]
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_extracts_snapshot() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "48.1486"))
            .and(query_param("longitude", "17.1077"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&mock_server)
            .await;

        let provider = WeatherProvider::new_with_base_url(&mock_server.uri()).unwrap();
        let snapshot = provider
            .fetch(Coordinate::new(48.1486, 17.1077))
            .await
            .unwrap();

        assert_eq!(snapshot.temperature, 21.4);
        assert_eq!(snapshot.apparent_temperature, 20.1);
        assert_eq!(snapshot.humidity, 58);
        assert_eq!(snapshot.wind_speed, 12.3);
        assert_eq!(snapshot.weather_code, 3);
        assert!(snapshot.is_day);
        assert_eq!(snapshot.observed_at, "2026-08-25T14:00");
    }

    #[tokio::test]
    async fn test_fetch_samples_intraday_hours() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&mock_server)
            .await;

        let provider = WeatherProvider::new_with_base_url(&mock_server.uri()).unwrap();
        let snapshot = provider.fetch(Coordinate::new(48.0, 17.0)).await.unwrap();

        assert_eq!(snapshot.intraday.len(), 3);
        assert_eq!(snapshot.intraday[0].daypart, Daypart::Morning);
        assert_eq!(snapshot.intraday[0].temperature, 15.5);
        assert_eq!(snapshot.intraday[1].daypart, Daypart::Noon);
        assert_eq!(snapshot.intraday[1].temperature, 21.0);
        assert_eq!(snapshot.intraday[2].daypart, Daypart::Evening);
        assert_eq!(snapshot.intraday[2].temperature, 18.2);
    }

    #[tokio::test]
    async fn test_fetch_extracts_two_day_outlook() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&mock_server)
            .await;

        let provider = WeatherProvider::new_with_base_url(&mock_server.uri()).unwrap();
        let snapshot = provider.fetch(Coordinate::new(48.0, 17.0)).await.unwrap();

        let tomorrow = snapshot.tomorrow.unwrap();
        assert_eq!(tomorrow.max_temp, 24.5);
        assert_eq!(tomorrow.min_temp, 14.2);
        assert_eq!(tomorrow.weather_code, 0);

        let after = snapshot.after_tomorrow.unwrap();
        assert_eq!(after.max_temp, 19.0);
        assert_eq!(after.weather_code, 61);
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_terminal() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let provider = WeatherProvider::new_with_base_url(&mock_server.uri()).unwrap();
        let result = provider.fetch(Coordinate::new(48.0, 17.0)).await;

        assert!(matches!(result, Err(WeatherError::Network(_))));
    }

    #[tokio::test]
    async fn test_fetch_undecodable_body_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let provider = WeatherProvider::new_with_base_url(&mock_server.uri()).unwrap();
        let result = provider.fetch(Coordinate::new(48.0, 17.0)).await;

        assert!(matches!(result, Err(WeatherError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_daily_rows_give_no_outlook() {
        let mock_server = MockServer::start().await;

        let mut body = forecast_body();
        body["daily"] = serde_json::json!({
            "time": ["2026-08-25"],
            "temperature_2m_max": [22.0],
            "temperature_2m_min": [13.0],
            "weather_code": [3]
        });

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let provider = WeatherProvider::new_with_base_url(&mock_server.uri()).unwrap();
        let snapshot = provider.fetch(Coordinate::new(48.0, 17.0)).await.unwrap();

        assert!(snapshot.tomorrow.is_none());
        assert!(snapshot.after_tomorrow.is_none());
    }
}
