use std::env;

use auth::SecretError;
use auth::SigningSecret;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct AuthConfig {
    /// Base64-encoded HMAC signing secret
    pub secret: String,
    #[serde(default = "default_password_iterations")]
    pub password_iterations: u32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_max_connections() -> u32 {
    10
}

fn default_password_iterations() -> u32 {
    auth::password::DEFAULT_ITERATIONS
}

impl AuthConfig {
    /// Decode the configured signing secret.
    ///
    /// # Errors
    /// * `Missing` - Secret is empty
    /// * `InvalidEncoding` - Secret is not valid base64
    pub fn signing_secret(&self) -> Result<SigningSecret, SecretError> {
        SigningSecret::from_base64(&self.secret)
    }

    pub fn password_hasher(&self) -> auth::PasswordHasher {
        auth::PasswordHasher::new(self.password_iterations)
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"[redacted]")
            .field("password_iterations", &self.password_iterations)
            .finish()
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, AUTH__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: AUTH__SECRET=... overrides auth.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_config(secret: &str) -> AuthConfig {
        AuthConfig {
            secret: secret.to_string(),
            password_iterations: 1_000,
        }
    }

    #[test]
    fn test_signing_secret_decodes_base64() {
        let secret = auth_config("c2VjcmV0X2tleV9hdF9sZWFzdF8zMl9ieXRlc19sb25nIQ==")
            .signing_secret()
            .unwrap();
        assert_eq!(secret.as_bytes(), b"secret_key_at_least_32_bytes_long!");
    }

    #[test]
    fn test_signing_secret_rejects_missing_or_malformed() {
        assert_eq!(
            auth_config("").signing_secret().unwrap_err(),
            SecretError::Missing
        );
        assert!(matches!(
            auth_config("not*base64").signing_secret().unwrap_err(),
            SecretError::InvalidEncoding(_)
        ));
    }

    #[test]
    fn test_debug_output_hides_secret() {
        let rendered = format!("{:?}", auth_config("c3VwZXJzZWNyZXQ="));
        assert!(!rendered.contains("c3VwZXJzZWNyZXQ="));
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let configuration = ConfigBuilder::builder()
            .set_override("database.url", "postgresql://localhost/chat")
            .unwrap()
            .set_override("server.http_port", 8080)
            .unwrap()
            .set_override("auth.secret", "c3VwZXJzZWNyZXQ=")
            .unwrap()
            .build()
            .unwrap();

        let config: Config = configuration.try_deserialize().unwrap();
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(
            config.auth.password_iterations,
            auth::password::DEFAULT_ITERATIONS
        );
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_log_format_parses_lowercase() {
        let configuration = ConfigBuilder::builder()
            .set_override("format", "json")
            .unwrap()
            .build()
            .unwrap();
        let logging: LoggingConfig = configuration.try_deserialize().unwrap();
        assert_eq!(logging.format, LogFormat::Json);
    }
}
