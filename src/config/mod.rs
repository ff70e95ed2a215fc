use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub chapa: ChapaConfig,
    pub smtp: SmtpConfig,
    pub worker: WorkerConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public base URL of this service, used to build the gateway
    /// callback and return URLs (e.g. "https://travel.example.com").
    pub public_base_url: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ChapaConfig {
    pub secret_key: Secret<String>,
    pub api_base_url: String,
    /// Upper bound on any single gateway call. A hung upstream must not
    /// block the calling request indefinitely.
    pub timeout_seconds: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SmtpConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Secret<String>,
    pub from_email: String,
    pub from_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct WorkerConfig {
    pub count: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("TRAVEL_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("TRAVEL_SERVICE_PORT")
            .unwrap_or_else(|_| "3006".to_string())
            .parse()?;
        let public_base_url = env::var("TRAVEL_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));

        let db_url = env::var("TRAVEL_DATABASE_URL").expect("TRAVEL_DATABASE_URL must be set");
        let max_connections = env::var("TRAVEL_DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?;
        let min_connections = env::var("TRAVEL_DATABASE_MIN_CONNECTIONS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()?;

        let chapa_secret =
            env::var("CHAPA_SECRET_KEY").expect("CHAPA_SECRET_KEY must be set");
        let chapa_base_url = env::var("CHAPA_API_URL")
            .unwrap_or_else(|_| "https://api.chapa.co/v1".to_string());
        let chapa_timeout = env::var("CHAPA_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()?;

        let smtp_enabled = env::var("SMTP_ENABLED")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);
        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string());
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()?;
        let smtp_user = env::var("SMTP_USER").unwrap_or_default();
        let smtp_password = env::var("SMTP_PASSWORD").unwrap_or_default();
        let from_email = env::var("SMTP_FROM_EMAIL")
            .unwrap_or_else(|_| "no-reply@travel.local".to_string());
        let from_name =
            env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Travel Booking".to_string());

        let worker_count = env::var("TRAVEL_WORKER_COUNT")
            .unwrap_or_else(|_| "2".to_string())
            .parse()?;

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                public_base_url,
            },
            database: DatabaseConfig {
                url: Secret::new(db_url),
                max_connections,
                min_connections,
            },
            chapa: ChapaConfig {
                secret_key: Secret::new(chapa_secret),
                api_base_url: chapa_base_url,
                timeout_seconds: chapa_timeout,
            },
            smtp: SmtpConfig {
                enabled: smtp_enabled,
                host: smtp_host,
                port: smtp_port,
                user: smtp_user,
                password: Secret::new(smtp_password),
                from_email,
                from_name,
            },
            worker: WorkerConfig {
                count: worker_count,
            },
            service_name: "travel-service".to_string(),
        })
    }
}
