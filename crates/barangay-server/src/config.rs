//! Layered server configuration.
//!
//! Precedence, lowest first: built-in defaults, the YAML file given with
//! `--config`, then `BARANGAY_*` environment variables. Nested keys use a
//! double underscore, e.g. `BARANGAY_DATABASE__URL=mem://`.

use std::path::Path;

use barangay_auth::{AuthConfig, BootstrapConfig, InvitationConfig};
use barangay_db::DbConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

const REDACTED: &str = "<redacted>";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP listener binds to.
    pub listen_addr: String,
    pub database: DbConfig,
    pub auth: AuthConfig,
    pub invitations: InvitationConfig,
    /// Superadmin created on startup when absent.
    pub bootstrap: Option<BootstrapConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            database: DbConfig::default(),
            auth: AuthConfig::default(),
            invitations: InvitationConfig::default(),
            bootstrap: None,
        }
    }
}

impl ServerConfig {
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(ServerConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed("BARANGAY_").split("__"))
    }

    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(path).extract()
    }

    /// Copy with key material and passwords masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.auth.jwt_private_key_pem.is_empty() {
            config.auth.jwt_private_key_pem = REDACTED.into();
        }
        if config.auth.pepper.is_some() {
            config.auth.pepper = Some(REDACTED.into());
        }
        if config.database.password.is_some() {
            config.database.password = Some(REDACTED.into());
        }
        if let Some(bootstrap) = config.bootstrap.as_mut() {
            bootstrap.password = REDACTED.into();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_sources() {
        figment::Jail::expect_with(|_| {
            let config = ServerConfig::load(None)?;
            assert_eq!(config.listen_addr, "0.0.0.0:8080");
            assert_eq!(config.invitations.code_length, 6);
            assert!(config.bootstrap.is_none());
            Ok(())
        });
    }

    #[test]
    fn env_overrides_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "barangay.yaml",
                r#"
listen_addr: "127.0.0.1:9000"
database:
  url: "ws://db:8000"
invitations:
  ttl_secs: 3600
bootstrap:
  email: "root@barangay.gov"
  password: "bootstrap-secret"
"#,
            )?;
            jail.set_env("BARANGAY_DATABASE__URL", "mem://");

            let config = ServerConfig::load(Some(Path::new("barangay.yaml")))?;
            assert_eq!(config.listen_addr, "127.0.0.1:9000");
            assert_eq!(config.database.url, "mem://");
            assert_eq!(config.invitations.ttl_secs, 3600);
            assert_eq!(config.invitations.code_length, 6);

            let bootstrap = config.bootstrap.as_ref().unwrap();
            assert_eq!(bootstrap.display_name, "Superadmin");
            assert_eq!(config.redacted().bootstrap.unwrap().password, REDACTED);
            Ok(())
        });
    }
}
