//! Server configuration.

use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// JWT expiration in hours.
    pub jwt_expiration_hours: u64,
    /// Log level.
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("CREWTRACK_JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("CREWTRACK_JWT_SECRET is required"))?;

        Ok(Self {
            host: env::var("CREWTRACK_SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("CREWTRACK_SERVER_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
            jwt_secret,
            jwt_expiration_hours: env::var("CREWTRACK_JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
            log_level: env::var("CREWTRACK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_jwt_secret() {
        // SAFETY: Tests run serially or in isolation
        unsafe {
            env::remove_var("CREWTRACK_JWT_SECRET");
        }
        assert!(Config::from_env().is_err());

        unsafe {
            env::set_var("CREWTRACK_JWT_SECRET", "a-long-enough-test-secret");
        }
        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.jwt_expiration_hours, 24);
    }
}
