use std::{env::var, fmt, sync::Arc};

use exam_utils::store::QuestionStore;
use sentry::types::Dsn;
use tracing::{error, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn QuestionStore>,
}

#[derive(Clone, Debug)]
pub struct EnvVars {
    pub client_url: Option<String>,
    pub environment: Environment,
    pub mongodb_uri: String,
    pub port: u16,
    pub request_body_size_limit: usize,
    pub request_timeout_in_ms: u64,
    pub sentry_dsn: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                warn!(
                    "ENVIRONMENT value '{}' is not valid. Defaulting to 'production'.",
                    other
                );
                Environment::Production
            }
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        };
        f.write_str(s)
    }
}

impl EnvVars {
    pub fn new() -> Self {
        let Ok(mongodb_uri) = var("MONGODB_URI") else {
            error!("MONGODB_URI not set");
            panic!("MONGODB_URI required");
        };
        assert!(!mongodb_uri.is_empty(), "MONGODB_URI must not be empty");

        let sentry_dsn = match var("SENTRY_DSN") {
            Ok(dsn_string) => {
                assert!(
                    valid_sentry_dsn(&dsn_string),
                    "SENTRY_DSN is not valid DSN."
                );
                Some(dsn_string)
            }
            Err(_e) => {
                if cfg!(not(debug_assertions)) {
                    panic!("SENTRY_DSN is not allowed to be unset outside of a debug build");
                }
                warn!("SENTRY_DSN not set.");
                None
            }
        };

        let environment = match var("ENVIRONMENT") {
            Ok(v) => v.into(),
            Err(_e) => {
                warn!("ENVIRONMENT not set. Defaulting to 'production'.");
                Environment::Production
            }
        };

        let port = match var("PORT") {
            Ok(port_string) => port_string.parse().expect("PORT to be parseable as u16"),
            Err(_e) => {
                let default_port = 10000;
                warn!("PORT not set. Defaulting to {default_port}");
                default_port
            }
        };

        let client_url = match var("CLIENT_URL") {
            Ok(url) if !url.is_empty() => Some(url),
            _ => {
                warn!("CLIENT_URL not set. Cross-origin requests will be refused.");
                None
            }
        };

        let request_timeout_in_ms = match var("REQUEST_TIMEOUT_IN_MS") {
            Ok(s) => s
                .parse()
                .expect("REQUEST_TIMEOUT_IN_MS to be valid unsigned integer"),
            Err(_e) => {
                let default_request_timeout = 30_000;
                warn!("REQUEST_TIMEOUT_IN_MS not set. Defaulting to {default_request_timeout}");
                default_request_timeout
            }
        };

        let request_body_size_limit = match var("REQUEST_BODY_SIZE_LIMIT") {
            Ok(s) => s
                .parse()
                .expect("REQUEST_BODY_SIZE_LIMIT to be valid unsigned integer"),
            Err(_e) => {
                let default_request_body_size_limit = 5 * 1024 * 1024;
                warn!(
                    "REQUEST_BODY_SIZE_LIMIT not set. Defaulting to {default_request_body_size_limit}"
                );
                default_request_body_size_limit
            }
        };

        Self {
            client_url,
            environment,
            mongodb_uri,
            port,
            request_body_size_limit,
            request_timeout_in_ms,
            sentry_dsn,
        }
    }
}

fn valid_sentry_dsn(url: &str) -> bool {
    url.parse::<Dsn>().is_ok()
}
