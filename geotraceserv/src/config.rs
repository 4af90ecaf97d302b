use std::collections::HashMap;
use std::path::PathBuf;

/// Built-in admin pin for local development only
pub const DEFAULT_ADMIN_PIN: &str = "6162";
pub const DEFAULT_LOG_FILTER: &str = "info,actix_server=warn,actix_http::h1::dispatcher=off";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub admin_pin: String,
    pub static_dir: PathBuf,
    pub use_tls: bool,
    pub tls_cert_path: PathBuf,
    pub tls_key_path: PathBuf,
    pub server_log: bool,
    pub log_dir: PathBuf,
    pub log_filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for StartupError {}

impl ServerConfig {
    pub fn from_env() -> Result<Self, StartupError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_kv(&vars)
    }

    pub fn from_kv(kv: &HashMap<String, String>) -> Result<Self, StartupError> {
        let port = match get(kv, "PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| StartupError {
                code: "ERR_INVALID_CONFIG",
                message: format!("PORT must be a port number, got {:?}", raw),
            })?,
            None => 3000,
        };

        Ok(ServerConfig {
            host: get(kv, "HOST").unwrap_or("0.0.0.0").to_string(),
            port,
            database_url: get(kv, "DATABASE_URL").unwrap_or("data.sqlite").to_string(),
            admin_pin: get(kv, "ADMIN_PIN").unwrap_or(DEFAULT_ADMIN_PIN).to_string(),
            static_dir: PathBuf::from(get(kv, "STATIC_DIR").unwrap_or("public")),
            use_tls: flag(kv, "USE_TLS"),
            tls_cert_path: PathBuf::from(get(kv, "TLS_CERT_PATH").unwrap_or("cert.pem")),
            tls_key_path: PathBuf::from(get(kv, "TLS_KEY_PATH").unwrap_or("key.pem")),
            server_log: flag(kv, "SERVER_LOG"),
            log_dir: PathBuf::from(get(kv, "LOG_DIR").unwrap_or("./logs")),
            log_filter: get(kv, "LOG_FILTER").unwrap_or(DEFAULT_LOG_FILTER).to_string(),
        })
    }

    pub fn uses_default_admin_pin(&self) -> bool {
        self.admin_pin == DEFAULT_ADMIN_PIN
    }
}

// Blank values count as unset. Values are returned as given, since the admin
// pin is compared byte for byte.
fn get<'a>(kv: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    kv.get(key).map(String::as_str).filter(|v| !v.trim().is_empty())
}

fn flag(kv: &HashMap<String, String>, key: &str) -> bool {
    get(kv, key).map(str::trim) == Some("true")
}
