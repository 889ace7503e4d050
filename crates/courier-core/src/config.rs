//! Relay configuration from the environment

use std::net::SocketAddr;

use courier_crypto::PrivateKeyMaterial;
use secrecy::SecretString;
use thiserror::Error;

use crate::provider::SmtpProvider;

pub const ENV_PROVIDER: &str = "COURIER_PROVIDER";
pub const ENV_SMTP_PORT: &str = "COURIER_SMTP_PORT";
pub const ENV_SENDER: &str = "COURIER_SENDER";
pub const ENV_SENDER_PASSWORD: &str = "COURIER_SENDER_PASSWORD";
pub const ENV_TOKEN: &str = "COURIER_TOKEN";
pub const ENV_BIND: &str = "COURIER_BIND";

/// SMTP submission port (STARTTLS)
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub provider: SmtpProvider,
    pub smtp_port: u16,
    /// From-address and SMTP username
    pub sender: Option<String>,
    pub sender_password: Option<SecretString>,
    /// The relay's private key (PKCS#8 base64)
    pub token: Option<PrivateKeyMaterial>,
    pub bind: SocketAddr,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let provider = SmtpProvider::resolve(get(ENV_PROVIDER).as_deref());

        let smtp_port = match get(ENV_SMTP_PORT) {
            Some(raw) => raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid { var: ENV_SMTP_PORT, reason: e.to_string() }
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        let bind = get(ENV_BIND)
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .trim()
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: ENV_BIND,
                reason: e.to_string(),
            })?;

        Ok(Self {
            provider,
            smtp_port,
            sender: get(ENV_SENDER).map(|s| s.trim().to_string()),
            sender_password: get(ENV_SENDER_PASSWORD).map(SecretString::new),
            token: get(ENV_TOKEN).map(PrivateKeyMaterial::new),
            bind,
        })
    }

    pub fn smtp_host(&self) -> &'static str {
        self.provider.host()
    }

    /// Variables whose absence leaves the relay unable to send
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.token.is_none() {
            missing.push(ENV_TOKEN);
        }
        if self.sender.is_none() {
            missing.push(ENV_SENDER);
        }
        if self.sender_password.is_none() {
            missing.push(ENV_SENDER_PASSWORD);
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<RelayConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RelayConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();

        assert_eq!(cfg.provider, SmtpProvider::Outlook);
        assert_eq!(cfg.smtp_host(), "smtp.office365.com");
        assert_eq!(cfg.smtp_port, 587);
        assert_eq!(cfg.bind, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(
            cfg.missing(),
            vec![ENV_TOKEN, ENV_SENDER, ENV_SENDER_PASSWORD]
        );
    }

    #[test]
    fn test_full_config() {
        let cfg = config(&[
            (ENV_PROVIDER, "Gmail"),
            (ENV_SMTP_PORT, "2525"),
            (ENV_SENDER, "relay@example.com"),
            (ENV_SENDER_PASSWORD, "hunter2"),
            (ENV_TOKEN, "TUlJRQ=="),
            (ENV_BIND, "127.0.0.1:9000"),
        ])
        .unwrap();

        assert_eq!(cfg.smtp_host(), "smtp.gmail.com");
        assert_eq!(cfg.smtp_port, 2525);
        assert_eq!(cfg.sender.as_deref(), Some("relay@example.com"));
        assert_eq!(cfg.bind.port(), 9000);
        assert!(cfg.missing().is_empty());
    }

    #[test]
    fn test_empty_values_are_unset() {
        let cfg = config(&[(ENV_TOKEN, ""), (ENV_SENDER, "  "), (ENV_PROVIDER, "")]).unwrap();

        assert!(cfg.token.is_none());
        assert!(cfg.sender.is_none());
        assert_eq!(cfg.provider, SmtpProvider::DEFAULT);
    }

    #[test]
    fn test_invalid_port_and_bind() {
        assert!(matches!(
            config(&[(ENV_SMTP_PORT, "smtp")]),
            Err(ConfigError::Invalid { var: ENV_SMTP_PORT, .. })
        ));
        assert!(matches!(
            config(&[(ENV_BIND, "localhost")]),
            Err(ConfigError::Invalid { var: ENV_BIND, .. })
        ));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let cfg = config(&[(ENV_SENDER_PASSWORD, "hunter2"), (ENV_TOKEN, "TUlJRQ==")]).unwrap();
        let shown = format!("{:?}", cfg);

        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("TUlJRQ=="));
    }
}
