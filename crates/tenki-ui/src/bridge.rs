use std::sync::{Arc, OnceLock};

use tenki_weather::WeatherClient;

// Static tokio runtime that lives for the duration of the application
static RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();

// Shared weather client for WeatherModels
static WEATHER_CLIENT: OnceLock<Arc<WeatherClient>> = OnceLock::new();

/// Initialize the tokio runtime (call once at application startup)
fn get_or_init_runtime() -> tokio::runtime::Handle {
    RUNTIME
        .get_or_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .thread_name("tenki-tokio")
                .build()
                .expect("Failed to create tokio runtime")
        })
        .handle()
        .clone()
}

/// Initialize the weather services.
/// Must be called by the Qt shell before QML instantiates WeatherModel.
#[no_mangle]
pub extern "C" fn initialize_weather_services() -> bool {
    // Initialize tracing if not already done
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    // Ensure runtime is initialized
    let _runtime = get_or_init_runtime();

    let client = match WeatherClient::new() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!("Failed to create WeatherClient: {}", e);
            return false;
        }
    };

    if WEATHER_CLIENT.set(client).is_err() {
        tracing::warn!("WeatherClient already initialized");
    }

    tracing::info!("Weather services initialized successfully");
    true
}

/// Get the initialized weather client and runtime for use by WeatherModels
pub fn get_weather_services() -> Option<(Arc<WeatherClient>, tokio::runtime::Handle)> {
    let client = WEATHER_CLIENT.get()?.clone();
    let runtime = RUNTIME.get()?.handle().clone();
    Some((client, runtime))
}

/// Get the runtime handle (always available after initialization)
pub fn get_runtime() -> Option<tokio::runtime::Handle> {
    RUNTIME.get().map(|r| r.handle().clone())
}
