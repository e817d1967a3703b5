use std::{env, path::PathBuf};

/// Development-only signing secret. Never accepted in `Env::Production`.
const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";

/// AppConfig
///
/// Holds the gateway's entire configuration state. Loaded once at startup and
/// immutable afterwards; handlers pull it out of the shared state via FromRef.
#[derive(Clone)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and secret fallback.
    pub env: Env,
    // Shared HMAC secret used to verify incoming bearer credentials.
    pub jwt_secret: String,
    // Directory all media paths resolve against. Must not be web-addressable.
    pub storage_root: PathBuf,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
///
/// Defines the runtime context, used to switch between developer conveniences
/// (pretty logs, fallback secret) and production hardening (JSON logs, mandatory secret).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking configuration for test setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            storage_root: PathBuf::from("./storage/private"),
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from environment variables and implements the **fail-fast**
    /// principle for production.
    ///
    /// # Panics
    /// Panics in `Env::Production` when `MEDIA_JWT_SECRET` is not set. A gateway that
    /// cannot verify credentials must not start.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => env::var("MEDIA_JWT_SECRET")
                .expect("FATAL: MEDIA_JWT_SECRET must be set in production."),
            Env::Local => {
                env::var("MEDIA_JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string())
            }
        };

        let storage_root = env::var("MEDIA_STORAGE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./storage/private"));

        let bind_addr = env::var("MEDIA_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Self {
            env,
            jwt_secret,
            storage_root,
            bind_addr,
        }
    }
}
