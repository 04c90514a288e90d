//! Runtime configuration for the gift-card site.

use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;

#[derive(Debug)]
pub struct Settings {
    /// Provider credential. `None` selects fallback-only generation.
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    /// Upper bound for one remote generation call (seconds).
    pub generation_timeout: u64,
    /// Durable content cache (JSON), relative to the working directory.
    pub content_cache_path: PathBuf,
    pub catalog_path: PathBuf,
    pub server_addr: String,
    /// Run a full `warm_all` pass in the background when the server starts.
    pub warm_on_start: bool,
}

impl Settings {
    fn from_env() -> Self {
        // A blank key is treated the same as a missing one.
        let openai_api_key = env::var("OPENAI_API_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let openai_model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4.1".into());

        let openai_base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());

        let generation_timeout = env::var("GENERATION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let content_cache_path = env::var("CONTENT_CACHE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".content-cache.json"));

        let catalog_path = env::var("CATALOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/giftcards.json"));

        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into());

        let warm_on_start = env::var("WARM_ON_START")
            .ok()
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Settings {
            openai_api_key,
            openai_model,
            openai_base_url,
            generation_timeout,
            content_cache_path,
            catalog_path,
            server_addr,
            warm_on_start,
        }
    }
}

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

pub fn settings() -> &'static Settings {
    &SETTINGS
}
