use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of days the date rotary button cycles through.
pub const FORECAST_DAYS: usize = 3;

/// Livedoor city code selecting the forecast area.
///
/// Codes are six digits and may carry a leading zero (Hokkaido areas such
/// as 016010), so the numeric value is always rendered zero-padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityCode(pub u32);

impl CityCode {
    /// Code written on first run when no location file exists (Choshi).
    pub const DEFAULT: CityCode = CityCode(120_010);
}

impl fmt::Display for CityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

impl FromStr for CityCode {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(CityCode)
    }
}

/// Area descriptor the API returns alongside the forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub city: String,
    pub prefecture: String,
    pub area: String,
}

/// One per-day forecast entry.
///
/// Temperatures are frequently null upstream and the widget does not
/// display them, but they are carried with the rest of the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// 今日 / 明日 / 明後日
    pub label: String,
    pub telop: String,
    pub high: Option<f64>,
    pub low: Option<f64>,
}

impl DailyForecast {
    /// Short `M/DD` form for the date button: month and day with a single
    /// leading zero stripped ("03/05" becomes "3/05").
    pub fn short_date(&self) -> String {
        let formatted = self.date.format("%m/%d").to_string();
        match formatted.strip_prefix('0') {
            Some(trimmed) => trimmed.to_string(),
            None => formatted,
        }
    }
}

/// Complete weather snapshot for one location.
///
/// Fetched once at startup or on a location change, held in memory for
/// the process lifetime, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: Area,
    pub title: String,
    pub link: String,
    pub public_time: DateTime<FixedOffset>,
    pub description: String,
    pub forecasts: Vec<DailyForecast>,
    pub copyright: String,
}

impl WeatherReport {
    /// Bounds-checked access to the per-day list. The API returns two or
    /// three entries depending on the time of day.
    pub fn forecast(&self, day: usize) -> Option<&DailyForecast> {
        self.forecasts.get(day)
    }

    /// Next index for the date rotary button. Wraps after the day-after
    /// slot and falls back to today when the rotated slot is missing from
    /// the returned list.
    pub fn next_day(&self, day: usize) -> usize {
        let next = (day + 1) % FORECAST_DAYS;
        if self.forecast(next).is_some() {
            next
        } else {
            0
        }
    }
}

/// Weather fetch errors.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Weather service returned status {0}")]
    Status(u16),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    /// User-facing message for the widget's error label.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::Network(_) => "Unable to reach the weather service. Check your connection.",
            WeatherError::Status(status) if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            WeatherError::Status(_) => "The weather service rejected the request.",
            WeatherError::Parse(_) => "Received an unexpected response from the weather service.",
        }
    }
}
