//! Livedoor forecast API client.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use tracing::instrument;

use crate::types::{Area, CityCode, DailyForecast, WeatherError, WeatherReport};

const WEATHER_API_BASE: &str = "http://weather.livedoor.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Wire document, as served. Converted into [`WeatherReport`] after decode.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    location: ApiLocation,
    title: String,
    link: String,
    #[serde(rename = "publicTime")]
    public_time: DateTime<FixedOffset>,
    description: ApiDescription,
    forecasts: Vec<ApiForecast>,
    copyright: ApiCopyright,
}

#[derive(Debug, Deserialize)]
struct ApiLocation {
    area: String,
    prefecture: String,
    city: String,
}

#[derive(Debug, Deserialize)]
struct ApiDescription {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiForecast {
    date: NaiveDate,
    #[serde(rename = "dateLabel")]
    date_label: String,
    telop: String,
    #[serde(default)]
    temperature: ApiTemperature,
}

#[derive(Debug, Default, Deserialize)]
struct ApiTemperature {
    min: Option<ApiDegrees>,
    max: Option<ApiDegrees>,
}

// Degrees arrive as strings ("17"), and often as null.
#[derive(Debug, Deserialize)]
struct ApiDegrees {
    celsius: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCopyright {
    title: String,
}

fn celsius(degrees: Option<ApiDegrees>) -> Option<f64> {
    degrees
        .and_then(|d| d.celsius)
        .and_then(|c| c.parse().ok())
}

impl WeatherReport {
    fn from_api(raw: ApiResponse) -> Self {
        Self {
            location: Area {
                city: raw.location.city,
                prefecture: raw.location.prefecture,
                area: raw.location.area,
            },
            title: raw.title,
            link: raw.link,
            public_time: raw.public_time,
            description: raw.description.text,
            forecasts: raw
                .forecasts
                .into_iter()
                .map(|f| DailyForecast {
                    date: f.date,
                    label: f.date_label,
                    telop: f.telop,
                    high: celsius(f.temperature.max),
                    low: celsius(f.temperature.min),
                })
                .collect(),
            copyright: raw.copyright.title,
        }
    }
}

/// One-shot forecast fetches. No caching, no retries: the widget asks once
/// at startup and once per location change.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new() -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: WEATHER_API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub fn new_with_base_url(base_url: &str) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Fetch the forecast snapshot for one city code.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, city: CityCode) -> Result<WeatherReport, WeatherError> {
        let url = format!(
            "{}/forecast/webservice/json/v1?city={}",
            self.base_url, city
        );

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        let raw: ApiResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(format!("JSON parse error: {}", e)))?;

        Ok(WeatherReport::from_api(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_body() -> serde_json::Value {
        serde_json::json!({
            "location": {"area": "関東", "prefecture": "千葉県", "city": "銚子"},
            "title": "千葉県 銚子 の天気",
            "link": "http://weather.livedoor.com/area/forecast/120010",
            "publicTime": "2020-03-11T11:00:00+09:00",
            "description": {
                "text": "低気圧が日本の東にあって、関東の東海上は風が強く吹いています。",
                "publicTime": "2020-03-11T10:37:00+09:00"
            },
            "forecasts": [
                {
                    "date": "2020-03-11",
                    "dateLabel": "今日",
                    "telop": "晴のち曇",
                    "temperature": {
                        "min": null,
                        "max": {"celsius": "17", "fahrenheit": "62.6"}
                    },
                    "image": {"title": "晴のち曇", "url": "", "width": 50, "height": 31}
                },
                {
                    "date": "2020-03-12",
                    "dateLabel": "明日",
                    "telop": "雨",
                    "temperature": {
                        "min": {"celsius": "8", "fahrenheit": "46.4"},
                        "max": {"celsius": "11", "fahrenheit": "51.8"}
                    }
                }
            ],
            "copyright": {
                "link": "http://weather.livedoor.com/",
                "title": "(C) LINE Corporation",
                "provider": [{"link": "http://tenki.jp/", "name": "日本気象協会"}]
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_parses_wire_document() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast/webservice/json/v1"))
            .and(query_param("city", "120010"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let client = WeatherClient::new_with_base_url(&server.uri()).unwrap();
        let report = client.fetch(CityCode(120_010)).await.unwrap();

        assert_eq!(report.location.city, "銚子");
        assert_eq!(report.location.prefecture, "千葉県");
        assert_eq!(report.title, "千葉県 銚子 の天気");
        assert!(report.description.starts_with("低気圧"));
        assert_eq!(report.copyright, "(C) LINE Corporation");

        assert_eq!(report.forecasts.len(), 2);
        assert_eq!(report.forecasts[0].label, "今日");
        assert_eq!(report.forecasts[0].telop, "晴のち曇");
        assert_eq!(report.forecasts[0].high, Some(17.0));
        assert_eq!(report.forecasts[0].low, None);
        assert_eq!(report.forecasts[1].low, Some(8.0));
    }

    #[tokio::test]
    async fn test_fetch_zero_pads_the_city_code() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast/webservice/json/v1"))
            .and(query_param("city", "016010"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let client = WeatherClient::new_with_base_url(&server.uri()).unwrap();
        assert!(client.fetch(CityCode(16_010)).await.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_surfaces_http_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast/webservice/json/v1"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = WeatherClient::new_with_base_url(&server.uri()).unwrap();
        let result = client.fetch(CityCode::DEFAULT).await;

        assert!(matches!(result, Err(WeatherError::Status(503))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_malformed_bodies() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast/webservice/json/v1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = WeatherClient::new_with_base_url(&server.uri()).unwrap();
        let result = client.fetch(CityCode::DEFAULT).await;

        assert!(matches!(result, Err(WeatherError::Parse(_))));
    }
}
