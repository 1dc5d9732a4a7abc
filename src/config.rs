use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Headroom the outer request timeout keeps over store and upstream calls, so
/// those fail inside the handler and still get their mapped response.
const BACKSTOP_MARGIN: Duration = Duration::from_secs(2);

/// Clarifai's public face-detection model.
pub const FACE_DETECT_MODEL: &str = "a403429f2ddf4b49b307e318f00e528b";

const ENV_KEYS: &[&str] = &[
    "database_url",
    "database_ssl",
    "database_max_connections",
    "init_schema",
    "clarifai_api_key",
    "clarifai_api_url",
    "face_model_id",
    "port",
    "loglevel",
    "error_log_path",
    "request_timeout_secs",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_url: String,
    /// Require TLS on the store connection.
    pub database_ssl: bool,
    pub database_max_connections: u32,
    /// Run the `CREATE TABLE IF NOT EXISTS` bootstrap at startup.
    pub init_schema: bool,
    pub clarifai_api_key: String,
    pub clarifai_api_url: Url,
    pub face_model_id: String,
    pub port: u16,
    pub loglevel: String,
    pub error_log_path: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/smart-brain".to_string(),
            database_ssl: true,
            database_max_connections: 5,
            init_schema: true,
            clarifai_api_key: String::new(),
            clarifai_api_url: Url::parse("https://api.clarifai.com")
                .expect("invalid default Clarifai url"),
            face_model_id: FACE_DETECT_MODEL.to_string(),
            port: 3001,
            loglevel: "info".to_string(),
            error_log_path: PathBuf::from("./runtimeError.log"),
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Defaults overlaid with process environment (e.g. `DATABASE_URL`, `PORT`).
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::raw().only(ENV_KEYS))
    }

    /// Whole-request limit enforced by the router.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Limit for a single store or Clarifai call. Always strictly shorter than
    /// `request_timeout`.
    pub fn backend_timeout(&self) -> Duration {
        let outer = self.request_timeout();
        outer.saturating_sub(BACKSTOP_MARGIN).max(outer / 2)
    }
}
