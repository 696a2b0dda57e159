//! Weather data for the tenki widget
//!
//! One client, one endpoint: fetches the Livedoor JSON forecast for a
//! city code and maps it into the snapshot the widget binds to.

pub mod client;
pub mod conditions;
pub mod types;

pub use client::WeatherClient;
pub use conditions::icon_file;
pub use types::*;
