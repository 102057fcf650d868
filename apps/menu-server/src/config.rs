//! Server configuration: one YAML file plus `MENU_`-prefixed environment
//! overrides (`MENU_SECTION__KEY`).

use std::path::Path;

use api_gateway::ApiGatewayConfig;
use authn_resolver::AuthNResolverConfig;
use authz_resolver::AuthZResolverConfig;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use menu_db::DatabaseConfig;
use openfga_authz_plugin::OpenFgaConfig;
use serde::Deserialize;
use serde_json::{Value, json};
use static_authz_plugin::StaticAuthZPluginConfig;

pub const ENV_PREFIX: &str = "MENU_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ApiGatewayConfig,
    pub authn: AuthNResolverConfig,
    pub authz: AuthZResolverConfig,
    pub policy_store: PolicyStoreConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Policy store backend, selected by `backend`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend")]
pub enum PolicyStoreConfig {
    #[serde(rename = "openfga")]
    OpenFga(OpenFgaConfig),
    #[serde(rename = "static")]
    Static(StaticAuthZPluginConfig),
}

impl Default for PolicyStoreConfig {
    fn default() -> Self {
        Self::Static(StaticAuthZPluginConfig::default())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive. `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Load defaults, then `path` (if any), then environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when the file cannot be read or a value
    /// does not fit its field.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file_exact(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Effective configuration with secrets left out.
    #[must_use]
    pub fn redacted_json(&self) -> Value {
        let jwt = self.authn.jwt.as_ref().map(|jwt| {
            json!({
                "algorithm": jwt.algorithm,
                "secret_configured": jwt.secret.is_some(),
                "public_key_configured": jwt.public_key_pem.is_some(),
                "issuers": jwt.issuers,
                "audiences": jwt.audiences,
                "leeway_secs": jwt.leeway_secs,
            })
        });
        let policy_store = match &self.policy_store {
            PolicyStoreConfig::OpenFga(cfg) => json!({
                "backend": "openfga",
                "api_url": cfg.api_url,
                "store_id": cfg.store_id,
                "authorization_model_id": cfg.authorization_model_id,
                "api_token_configured": cfg.api_token.is_some(),
                "connect_timeout_ms": cfg.connect_timeout_ms,
                "request_timeout_ms": cfg.request_timeout_ms,
            }),
            PolicyStoreConfig::Static(cfg) => json!({
                "backend": "static",
                "tuples": cfg.tuples.len(),
            }),
        };

        json!({
            "server": self.server,
            "authn": {
                "allow_dev_query_identity": self.authn.allow_dev_query_identity,
                "jwt": jwt,
            },
            "authz": { "check_timeout_ms": self.authz.check_timeout_ms },
            "policy_store": policy_store,
            "database": {
                "driver": self.database.driver.as_str(),
                "connection_string": self.database.redacted(),
                "connect_timeout_ms": self.database.connect_timeout_ms,
            },
            "logging": {
                "level": self.logging.level,
                "format": match self.logging.format {
                    LogFormat::Text => "text",
                    LogFormat::Json => "json",
                },
            },
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_without_file() {
        Jail::expect_with(|_jail| {
            let cfg = AppConfig::load(None).unwrap();
            assert!(!cfg.authn.allow_dev_query_identity);
            assert_eq!(cfg.authz.check_timeout_ms, 5_000);
            assert_eq!(cfg.server.menu_cache_max_age_secs, 300);
            assert!(matches!(cfg.policy_store, PolicyStoreConfig::Static(_)));
            Ok(())
        });
    }

    #[test]
    fn yaml_then_env_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "menu.yaml",
                r#"
server:
  bind_addr: "0.0.0.0:9000"
authn:
  allow_dev_query_identity: true
policy_store:
  backend: openfga
  api_url: "http://fga:8080"
  store_id: "01HSTORE"
  api_token: "fga-secret"
"#,
            )?;
            jail.set_env("MENU_SERVER__BIND_ADDR", "127.0.0.1:7000");
            jail.set_env("MENU_AUTHZ__CHECK_TIMEOUT_MS", "250");

            let cfg = AppConfig::load(Some(Path::new("menu.yaml"))).unwrap();
            assert_eq!(cfg.server.bind_addr, "127.0.0.1:7000");
            assert_eq!(cfg.authz.check_timeout_ms, 250);
            assert!(cfg.authn.allow_dev_query_identity);
            let PolicyStoreConfig::OpenFga(fga) = &cfg.policy_store else {
                panic!("expected openfga backend");
            };
            assert_eq!(fga.store_id, "01HSTORE");
            Ok(())
        });
    }

    #[test]
    fn database_driver_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("MENU_DATABASE__DRIVER", "postgres");
            jail.set_env(
                "MENU_DATABASE__CONNECTION_STRING",
                "postgres://menu_admin:hunter2@db:5432/menu",
            );

            let cfg = AppConfig::load(None).unwrap();
            assert_eq!(cfg.database.driver, menu_db::DatabaseDriver::Postgres);
            assert_eq!(cfg.database.connect_timeout_ms, 15_000);

            let rendered = cfg.redacted_json().to_string();
            assert!(rendered.contains("\"driver\":\"postgres\""));
            assert!(!rendered.contains("hunter2"));
            Ok(())
        });
    }

    #[test]
    fn static_backend_tuples() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "menu.yaml",
                r#"
policy_store:
  backend: static
  tuples:
    - { user: "user:a", relation: "assignee", object: "role:admin" }
"#,
            )?;
            let cfg = AppConfig::load(Some(Path::new("menu.yaml"))).unwrap();
            let PolicyStoreConfig::Static(st) = &cfg.policy_store else {
                panic!("expected static backend");
            };
            assert_eq!(st.tuples.len(), 1);
            Ok(())
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("menu.yaml", "server:\n  bind_adress: \"x\"\n")?;
            assert!(AppConfig::load(Some(Path::new("menu.yaml"))).is_err());
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_an_error() {
        Jail::expect_with(|_jail| {
            assert!(AppConfig::load(Some(Path::new("absent.yaml"))).is_err());
            Ok(())
        });
    }

    #[test]
    fn redacted_json_hides_secrets() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "menu.yaml",
                r#"
policy_store:
  backend: openfga
  api_url: "http://fga:8080"
  store_id: "01HSTORE"
  api_token: "fga-secret"
database:
  connection_string: "Server=db;User Id=svc;Password=hunter2"
"#,
            )?;
            let cfg = AppConfig::load(Some(Path::new("menu.yaml"))).unwrap();
            let rendered = cfg.redacted_json().to_string();
            assert!(!rendered.contains("fga-secret"));
            assert!(!rendered.contains("hunter2"));
            assert!(rendered.contains("\"api_token_configured\":true"));
            Ok(())
        });
    }
}
