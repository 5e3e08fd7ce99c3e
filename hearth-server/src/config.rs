use anyhow::{ensure, Context};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub log: LogConfig,
    /// Only the secure API needs this section
    pub jwt: Option<JwtConfig>,
    #[serde(default)]
    pub password: PasswordPolicy,
}

impl Config {
    /// Load the configuration from a YAML file.
    pub fn load(yml_path: &str) -> anyhow::Result<Self> {
        let yml = std::fs::read_to_string(yml_path)
            .with_context(|| format!("Reading configuration from {}", yml_path))?;
        Self::parse(&yml)
    }

    pub fn parse(yml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yml)?;
        Ok(config)
    }

    /// The JWT settings, with the signing key resolved from the file or the `JWT_KEY` variable.
    pub fn jwt(&self) -> anyhow::Result<JwtConfig> {
        let mut jwt = self
            .jwt
            .clone()
            .context("The `jwt` section is required by the secure API")?;
        if let Ok(key) = dotenvy::var("JWT_KEY") {
            jwt.key = Some(key);
        }
        ensure!(jwt.key.is_some(), "No JWT signing key: set jwt.key or JWT_KEY");
        Ok(jwt)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub address: String,
    pub tls: Option<TLSConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TLSConfig {
    pub cert_path: String,
    pub key_path: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LogConfig {
    /// Write JSON logs to a daily rolling file in this directory instead of stdout
    pub directory: Option<String>,
    #[serde(default = "default_log_file")]
    pub file_name: String,
}

fn default_log_file() -> String {
    "access.log".into()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_name: default_log_file(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct JwtConfig {
    /// Signing key. Prefer the `JWT_KEY` environment variable over committing it to a file.
    pub key: Option<String>,
    pub issuer: String,
    pub audience: String,
    pub duration_in_minutes: i64,
}

/// Rules a password has to satisfy at registration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub required_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            required_length: 6,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_recipe_config() {
        let config = Config::parse(
            "
server:
  address: 127.0.0.1:5000
database:
  path: data/recipes.db
",
        )
        .unwrap();
        assert_eq!(config.server.address, "127.0.0.1:5000");
        assert!(config.server.tls.is_none());
        assert!(config.jwt.is_none());
        assert!(config.log.directory.is_none());
        assert_eq!(config.log.file_name, "access.log");
        assert_eq!(config.password.required_length, 6);
    }

    #[test]
    fn parses_jwt_and_password_sections() {
        let config = Config::parse(
            "
server:
  address: 0.0.0.0:5001
  tls:
    cert_path: cert.pem
    key_path: key.pem
database:
  path: users.db
jwt:
  issuer: hearth
  audience: hearth-clients
  duration_in_minutes: 60
password:
  require_non_alphanumeric: false
",
        )
        .unwrap();
        let jwt = config.jwt.as_ref().unwrap();
        assert_eq!(jwt.issuer, "hearth");
        assert_eq!(jwt.duration_in_minutes, 60);
        assert!(jwt.key.is_none());
        assert_eq!(config.server.tls.unwrap().key_path, "key.pem");
        assert!(!config.password.require_non_alphanumeric);
        assert!(config.password.require_digit);
    }
}
