//! Backend configuration.
//!
//! Values come from `MEDICINE_API_DB_*` environment variables with defaults.
//! Fields are public so bootstrap code can override what the environment says.

use std::time::Duration;

use tracing::warn;

/// Collection holding ambulance aggregates.
pub const AMBULANCE_COLLECTION: &str = "ambulance";

/// Collection holding the order status catalog.
pub const STATUS_COLLECTION: &str = "status";

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_USERNAME: &str = "postgres";
const DEFAULT_PASSWORD: &str = "postgres";
const DEFAULT_DATABASE: &str = "ee-medicine";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Clone, PartialEq, Eq)]
pub struct DocumentStoreConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    /// Upper bound for connecting and for every single store operation.
    pub timeout: Duration,
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

// Keep the password out of logs and panics.
impl core::fmt::Debug for DocumentStoreConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DocumentStoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl DocumentStoreConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |name: &str, default: String| lookup(name).unwrap_or(default);

        let port = match lookup("MEDICINE_API_DB_PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "invalid MEDICINE_API_DB_PORT; using default");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let timeout_secs = match lookup("MEDICINE_API_DB_TIMEOUT_SECONDS") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "invalid MEDICINE_API_DB_TIMEOUT_SECONDS; using default");
                DEFAULT_TIMEOUT_SECONDS
            }),
            None => DEFAULT_TIMEOUT_SECONDS,
        };

        Self {
            host: var("MEDICINE_API_DB_HOST", defaults.host),
            port,
            username: var("MEDICINE_API_DB_USERNAME", defaults.username),
            password: var("MEDICINE_API_DB_PASSWORD", defaults.password),
            database: var("MEDICINE_API_DB_DATABASE", defaults.database),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// `postgres://user@host:port/database`, without the password.
    pub fn redacted_url(&self) -> String {
        format!(
            "postgres://{}@{}:{}/{}",
            self.username, self.host, self.port, self.database
        )
    }
}
