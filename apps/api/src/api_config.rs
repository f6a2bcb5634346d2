use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use vitrine_core::AppError;

/// Engine holding stores and catalog resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::Validation(format!(
                "STORAGE_BACKEND must be either 'postgres' or 'memory', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub identity_header: String,
    pub legacy_status_codes: bool,
    pub frontend_url: String,
    pub storefront_url: Option<String>,
    pub api_host: String,
    pub api_port: u16,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_owned())
            .parse::<StorageBackend>()?;
        let database_url = match storage_backend {
            StorageBackend::Postgres => Some(required_env("DATABASE_URL")?),
            StorageBackend::Memory => optional_env("DATABASE_URL"),
        };
        if migrate_only && database_url.is_none() {
            return Err(AppError::Validation(
                "DATABASE_URL is required to run migrations".to_owned(),
            ));
        }

        let database_max_connections = match optional_env("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value.parse::<u32>().map_err(|error| {
                AppError::Validation(format!("invalid DATABASE_MAX_CONNECTIONS: {error}"))
            })?,
            None => 10,
        };

        let identity_header =
            optional_env("IDENTITY_HEADER").unwrap_or_else(|| "x-principal-id".to_owned());
        let legacy_status_codes = env::var("LEGACY_STATUS_CODES")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let storefront_url = optional_env("STOREFRONT_URL");

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        Ok(Self {
            migrate_only,
            storage_backend,
            database_url,
            database_max_connections,
            identity_header,
            legacy_status_codes,
            frontend_url,
            storefront_url,
            api_host,
            api_port,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    /// Origins allowed to call the API from a browser.
    pub fn cors_origins(&self) -> Vec<&str> {
        std::iter::once(self.frontend_url.as_str())
            .chain(self.storefront_url.as_deref())
            .collect()
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    optional_env(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::StorageBackend;

    #[test]
    fn storage_backend_parses_case_insensitively() {
        assert!(matches!(
            "Memory".parse::<StorageBackend>(),
            Ok(StorageBackend::Memory)
        ));
        assert!(matches!(
            " postgres ".parse::<StorageBackend>(),
            Ok(StorageBackend::Postgres)
        ));
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }
}
