use core::pin::Pin;
use std::sync::Arc;

use cxx_qt::CxxQtType;
use cxx_qt_lib::QString;
use tenki_core::{AppError, ConfigError, Settings};
use tenki_weather::{conditions, CityCode, WeatherClient, WeatherReport};

#[cxx_qt::bridge]
pub mod qobject {
    unsafe extern "C++" {
        include!("cxx-qt-lib/qstring.h");
        type QString = cxx_qt_lib::QString;
    }

    extern "RustQt" {
        #[qobject]
        #[qml_element]
        #[qproperty(bool, loading)]
        #[qproperty(bool, has_data)]
        #[qproperty(QString, error_message)]
        #[qproperty(QString, window_title)]
        // Snapshot-wide fields
        #[qproperty(QString, city_name)]
        #[qproperty(QString, description)]
        #[qproperty(QString, public_time)]
        #[qproperty(QString, copyright)]
        // Active-day fields, updated by the date rotary button
        #[qproperty(QString, condition)]
        #[qproperty(QString, date_label)]
        #[qproperty(QString, icon_source)]
        type WeatherModel = super::WeatherModelRust;

        #[qinvokable]
        fn refresh(self: Pin<&mut WeatherModel>);

        #[qinvokable]
        fn rotate_day(self: Pin<&mut WeatherModel>);

        #[qinvokable]
        fn set_location(self: Pin<&mut WeatherModel>, code: i32);

        #[qinvokable]
        fn location_count(self: &WeatherModel) -> i32;

        #[qinvokable]
        fn location_name(self: &WeatherModel, index: i32) -> QString;

        #[qinvokable]
        fn location_code(self: &WeatherModel, index: i32) -> i32;

        #[qinvokable]
        fn load_style_sheet(self: &WeatherModel) -> QString;

        #[qsignal]
        fn weather_changed(self: Pin<&mut WeatherModel>);
    }
}

const WINDOW_TITLE: &str = "tenki";

/// Livedoor primary-area codes offered in the location menu.
const LOCATIONS: &[(&str, CityCode)] = &[
    ("札幌", CityCode(16_010)),
    ("仙台", CityCode(40_010)),
    ("東京", CityCode(130_010)),
    ("銚子", CityCode(120_010)),
    ("名古屋", CityCode(230_010)),
    ("大阪", CityCode(270_000)),
    ("福岡", CityCode(400_010)),
    ("那覇", CityCode(471_010)),
];

#[derive(Default)]
pub struct WeatherModelRust {
    loading: bool,
    has_data: bool,
    error_message: QString,
    window_title: QString,
    // Snapshot-wide fields
    city_name: QString,
    description: QString,
    public_time: QString,
    copyright: QString,
    // Active-day fields
    condition: QString,
    date_label: QString,
    icon_source: QString,
    // Internal state
    day: usize,
    report: Option<WeatherReport>,
    settings: Option<Settings>,
    client: Option<Arc<WeatherClient>>,
    runtime: Option<tokio::runtime::Handle>,
}

impl WeatherModelRust {
    fn ensure_initialized(&mut self) {
        if self.client.is_some() && self.runtime.is_some() {
            return;
        }

        match crate::bridge::get_weather_services() {
            Some((client, runtime)) => {
                self.client = Some(client);
                self.runtime = Some(runtime);
                tracing::info!("WeatherModel auto-initialized from global services");
            }
            None => {
                tracing::error!("Cannot auto-initialize WeatherModel - global services not ready");
            }
        }
    }

    fn bind_report(&mut self, report: &WeatherReport) {
        self.day = 0;
        self.city_name = QString::from(report.location.city.as_str());
        self.description = QString::from(report.description.as_str());
        self.public_time = QString::from(report.public_time.format("%Y-%m-%d %H:%M").to_string());
        self.copyright = QString::from(report.copyright.as_str());
        self.window_title = QString::from(format!("{} - {}", WINDOW_TITLE, report.location.city));

        self.report = Some(report.clone());
        self.has_data = true;
        self.bind_day();
    }

    fn bind_day(&mut self) {
        let forecast = self
            .report
            .as_ref()
            .and_then(|report| report.forecast(self.day));

        if let Some(forecast) = forecast {
            self.condition = QString::from(forecast.telop.as_str());
            self.date_label = QString::from(forecast.short_date());
            self.icon_source = QString::from(conditions::icon_file(&forecast.telop));
        }
    }
}

impl qobject::WeatherModel {
    /// Fetch the forecast for the configured location and bind it.
    ///
    /// The fetch blocks the UI thread; the widget shows nothing useful
    /// until it has data anyway. A failed fetch is unrecoverable and ends
    /// the process.
    pub fn refresh(mut self: Pin<&mut Self>) {
        self.as_mut().rust_mut().ensure_initialized();

        let client = match &self.as_ref().rust().client {
            Some(c) => c.clone(),
            None => {
                self.as_mut()
                    .set_error_message(QString::from("Weather service not initialized"));
                return;
            }
        };

        let runtime = match &self.as_ref().rust().runtime {
            Some(r) => r.clone(),
            None => return,
        };

        let settings = match self.as_ref().rust().settings.clone() {
            Some(s) => s,
            None => Settings::load(),
        };
        let city = settings.city;
        self.as_mut().rust_mut().settings = Some(settings);

        self.as_mut().set_loading(true);
        self.as_mut().set_error_message(QString::from(""));

        let result = runtime.block_on(async { client.fetch(city).await });

        match result {
            Ok(report) => {
                tracing::info!("Weather data fetched for {}", city);
                self.as_mut().rust_mut().bind_report(&report);
                self.as_mut().set_loading(false);
                self.weather_changed();
            }
            Err(e) => {
                let err = AppError::from(e);
                tracing::error!("Failed to fetch weather for {}: {}", city, err);
                self.as_mut()
                    .set_error_message(QString::from(err.user_message()));
                self.as_mut().set_loading(false);
                std::process::exit(1);
            }
        }
    }

    /// Advance the date button: today, tomorrow, day after, back to today.
    /// Resets to today when the rotated slot is missing from the snapshot.
    pub fn rotate_day(mut self: Pin<&mut Self>) {
        let day = self.as_ref().rust().day;
        let next = match &self.as_ref().rust().report {
            Some(report) => report.next_day(day),
            None => return,
        };

        self.as_mut().rust_mut().day = next;
        self.as_mut().rust_mut().bind_day();
        self.weather_changed();
    }

    /// Switch to a new location code, persist it, and refetch.
    pub fn set_location(mut self: Pin<&mut Self>, code: i32) {
        let city = match u32::try_from(code) {
            Ok(code) => CityCode(code),
            Err(_) => {
                let err = ConfigError::InvalidCode(code.to_string());
                tracing::warn!("Rejected location change: {}", err);
                self.as_mut()
                    .set_error_message(QString::from(err.user_message()));
                return;
            }
        };

        let mut settings = match self.as_ref().rust().settings.clone() {
            Some(s) => s,
            None => Settings::load(),
        };
        if let Err(e) = settings.store(city) {
            tracing::warn!("Failed to persist location {}: {}", city, e);
        }
        self.as_mut().rust_mut().settings = Some(settings);

        self.refresh();
    }

    pub fn location_count(&self) -> i32 {
        LOCATIONS.len() as i32
    }

    pub fn location_name(&self, index: i32) -> QString {
        LOCATIONS
            .get(index as usize)
            .map(|(name, _)| QString::from(*name))
            .unwrap_or_default()
    }

    pub fn location_code(&self, index: i32) -> i32 {
        LOCATIONS
            .get(index as usize)
            .map(|(_, code)| code.0 as i32)
            .unwrap_or(-1)
    }

    /// Stylesheet text for the shell, empty when the file is absent.
    pub fn load_style_sheet(&self) -> QString {
        QString::from(tenki_core::load_stylesheet(
            tenki_core::config::STYLESHEET_FILE,
        ))
    }
}
