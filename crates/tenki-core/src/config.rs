//! Widget settings: the one-line location file and the optional stylesheet.
//!
//! Both files live next to the executable's working directory. The
//! location file holds nothing but a city code; any read or parse failure
//! falls back to the default code and rewrites the file.

use std::path::{Path, PathBuf};

use tenki_weather::CityCode;

use crate::error::ConfigError;

/// Default name of the one-line location file.
pub const LOCATION_FILE: &str = "location.conf";

/// Default name of the optional Qt stylesheet.
pub const STYLESHEET_FILE: &str = "style.qss";

/// The persisted widget settings.
#[derive(Debug, Clone)]
pub struct Settings {
    path: PathBuf,
    pub city: CityCode,
}

impl Settings {
    /// Load the location code from the default file.
    pub fn load() -> Self {
        Self::load_or_default(LOCATION_FILE)
    }

    /// Load the location code from `path`. A missing, unreadable, or
    /// malformed file falls back to [`CityCode::DEFAULT`] and rewrites
    /// the file with it.
    pub fn load_or_default(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let city = match std::fs::read_to_string(&path) {
            Ok(contents) => match contents.parse::<CityCode>() {
                Ok(city) => city,
                Err(e) => {
                    tracing::warn!(
                        "Invalid location code in {}: {}. Resetting to default.",
                        path.display(),
                        e
                    );
                    Self::write_default(&path)
                }
            },
            Err(e) => {
                tracing::info!(
                    "No readable location file at {}: {}. Creating with default.",
                    path.display(),
                    e
                );
                Self::write_default(&path)
            }
        };

        Self { path, city }
    }

    fn write_default(path: &Path) -> CityCode {
        let city = CityCode::DEFAULT;
        if let Err(e) = std::fs::write(path, format!("{city}\n")) {
            tracing::warn!(
                "Failed to write default location file {}: {}",
                path.display(),
                e
            );
        }
        city
    }

    /// Persist a changed location code. The in-memory code changes even
    /// when the write fails, so the widget keeps showing the chosen
    /// location for the rest of the session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Write`] when the file cannot be written.
    pub fn store(&mut self, city: CityCode) -> Result<(), ConfigError> {
        self.city = city;

        std::fs::write(&self.path, format!("{city}\n")).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Read the optional stylesheet, verbatim. Missing or unreadable files
/// yield an empty stylesheet.
pub fn load_stylesheet(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!("No stylesheet at {}: {}", path.display(), e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCATION_FILE);

        let settings = Settings::load_or_default(&path);

        assert_eq!(settings.city, CityCode::DEFAULT);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "120010\n");
    }

    #[test]
    fn test_malformed_file_resets_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCATION_FILE);
        std::fs::write(&path, "not a number\n").unwrap();

        let settings = Settings::load_or_default(&path);

        assert_eq!(settings.city, CityCode::DEFAULT);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "120010\n");
    }

    #[test]
    fn test_valid_file_is_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCATION_FILE);
        std::fs::write(&path, "016010\n").unwrap();

        let settings = Settings::load_or_default(&path);

        assert_eq!(settings.city, CityCode(16_010));
    }

    #[test]
    fn test_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCATION_FILE);

        let mut settings = Settings::load_or_default(&path);
        settings.store(CityCode(130_010)).unwrap();

        assert_eq!(settings.city, CityCode(130_010));
        let reloaded = Settings::load_or_default(&path);
        assert_eq!(reloaded.city, CityCode(130_010));
    }

    #[test]
    fn test_stylesheet_loads_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STYLESHEET_FILE);
        std::fs::write(&path, "QLabel { color: #202020; }\n").unwrap();

        assert_eq!(load_stylesheet(&path), "QLabel { color: #202020; }\n");
    }

    #[test]
    fn test_missing_stylesheet_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_stylesheet(dir.path().join("absent.qss")), "");
    }
}
