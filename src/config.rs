use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub environment: Environment,
    pub cors: CorsConfig,
    pub store: StoreConfig,
    pub max_body_size: usize,
    pub notify_timeout: Duration,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    /// Exact origins accepted in production, in addition to the local dev servers.
    pub allowed_origins: Vec<String>,
    /// Origins ending with any of these are accepted in production.
    pub allowed_suffixes: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum StoreConfig {
    File { path: PathBuf },
    Postgres { database_url: String },
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub tls: TlsMode,
    pub user: String,
    pub pass: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    StartTls,
    Tls,
    None,
}

/// Origins of the local frontend dev servers, always allowed.
pub const DEV_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let env = Env { lookup };

        let host: IpAddr = env.or("CONTACT_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid CONTACT_HOST: {e}"))?;

        let port: u16 = env.or("CONTACT_PORT", "3001")
            .parse()
            .map_err(|e| format!("Invalid CONTACT_PORT: {e}"))?;

        let environment = match env.or("CONTACT_ENV", "development").as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };

        let mut allowed_origins: Vec<String> = DEV_ORIGINS.iter().map(|s| s.to_string()).collect();
        if let Some(frontend) = env.opt("CONTACT_FRONTEND_URL") {
            allowed_origins.push(frontend);
        }
        allowed_origins.extend(split_list(&env.or("CONTACT_CORS_ORIGINS", "")));

        let cors = CorsConfig {
            allowed_origins,
            allowed_suffixes: split_list(&env.or("CONTACT_CORS_ORIGIN_SUFFIXES", ".pages.dev")),
        };

        let store = match env.or("CONTACT_STORE", "file").as_str() {
            "file" => StoreConfig::File {
                path: PathBuf::from(env.or("CONTACT_SUBMISSIONS_FILE", "contact-submissions.json")),
            },
            "postgres" => StoreConfig::Postgres {
                database_url: env.required("DATABASE_URL")?,
            },
            other => return Err(format!("Invalid CONTACT_STORE '{other}': expected 'file' or 'postgres'")),
        };

        let max_body_size: usize = env.or("CONTACT_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid CONTACT_MAX_BODY_SIZE: {e}"))?;

        let notify_timeout_secs: u64 = env.or("CONTACT_NOTIFY_TIMEOUT_SECS", "10")
            .parse()
            .map_err(|e| format!("Invalid CONTACT_NOTIFY_TIMEOUT_SECS: {e}"))?;

        let log_level = env.or("CONTACT_LOG_LEVEL", "info");

        let smtp = match (env.opt("CONTACT_SMTP_USER"), env.opt("CONTACT_SMTP_PASS")) {
            (Some(user), Some(pass)) => {
                let tls = match env.or("CONTACT_SMTP_TLS", "starttls").as_str() {
                    "starttls" => TlsMode::StartTls,
                    "tls" => TlsMode::Tls,
                    "none" => TlsMode::None,
                    other => return Err(format!("Invalid CONTACT_SMTP_TLS '{other}'")),
                };
                Some(SmtpConfig {
                    host: env.or("CONTACT_SMTP_HOST", "smtp.gmail.com"),
                    port: env.or("CONTACT_SMTP_PORT", "587")
                        .parse()
                        .map_err(|e| format!("Invalid CONTACT_SMTP_PORT: {e}"))?,
                    tls,
                    from: env.opt("CONTACT_SMTP_FROM").unwrap_or_else(|| user.clone()),
                    to: env.opt("CONTACT_SMTP_TO").unwrap_or_else(|| user.clone()),
                    user,
                    pass,
                })
            }
            _ => None,
        };

        Ok(Config {
            host,
            port,
            environment,
            cors,
            store,
            max_body_size,
            notify_timeout: Duration::from_secs(notify_timeout_secs),
            log_level,
            smtp,
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn required(&self, key: &str) -> Result<String, String> {
        (self.lookup)(key).ok_or_else(|| format!("Missing required environment variable: {key}"))
    }

    fn or(&self, key: &str, default: &str) -> String {
        (self.lookup)(key).unwrap_or_else(|| default.to_string())
    }

    fn opt(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
