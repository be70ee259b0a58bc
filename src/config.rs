//!
//! Declarative security configuration.
//!
//! ```json
//! {
//!   "authentication": { "type": "remote_user", "environ_key": "REMOTE_USER" },
//!   "authorization": { "type": "acl", "walk": "inherit" },
//!   "views": { "edit": "edit" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ConfigError, SecurityError};
use crate::policy::remote_user::DEFAULT_ENVIRON_KEY;
use crate::policy::{AclAuthorizationPolicy, AclWalk, RemoteUserAuthenticationPolicy};
use crate::security::Security;
use crate::types::Permission;
use crate::view::ViewPermissions;

/// Which authentication policy to install.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthenticationConfig {
    RemoteUser {
        #[serde(default = "default_environ_key")]
        environ_key: String,
    },
}

fn default_environ_key() -> String {
    DEFAULT_ENVIRON_KEY.to_string()
}

/// Which authorization policy to install.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthorizationConfig {
    Acl {
        #[serde(default)]
        walk: AclWalk,
    },
}

/// Root of the security configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    #[serde(default)]
    pub authentication: Option<AuthenticationConfig>,
    #[serde(default)]
    pub authorization: Option<AuthorizationConfig>,
    /// View name to the permission that protects it.
    #[serde(default)]
    pub views: BTreeMap<String, Permission>,
}

impl SecurityConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SecurityConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Loading security config");
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Authentication and authorization are configured as a pair or not at all.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.authentication, &self.authorization) {
            (Some(_), None) => Err(ConfigError::Invalid(
                "authentication policy configured without authorization policy".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::Invalid(
                "authorization policy configured without authentication policy".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Instantiates the configured policies.
    pub fn build(&self) -> Result<Security, SecurityError> {
        self.validate()?;
        let mut security = Security::new();

        if let Some(AuthenticationConfig::RemoteUser { environ_key }) = &self.authentication {
            security = security.with_authentication(RemoteUserAuthenticationPolicy::new().with_environ_key(environ_key)?);
        }
        if let Some(AuthorizationConfig::Acl { walk }) = &self.authorization {
            security = security.with_authorization(AclAuthorizationPolicy::new(*walk));
        }
        if !self.views.is_empty() {
            let views = self
                .views
                .iter()
                .fold(ViewPermissions::new(), |views, (name, permission)| views.protect(name.clone(), permission.clone()));
            security = security.with_views(views);
        }

        tracing::debug!(
            authentication = ?self.authentication,
            authorization = ?self.authorization,
            views = self.views.len(),
            "Built security policies"
        );
        Ok(security)
    }
}
