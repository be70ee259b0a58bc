//!
//! Authentication that trusts an identity already established upstream,
//! e.g. by a fronting web server setting `REMOTE_USER`.

use std::fmt;
use std::sync::Arc;

use crate::error::SecurityError;
use crate::policy::{AuthenticationPolicy, Credentials, HeaderDirective};
use crate::resource::{Request, Resource};
use crate::types::{Principal, Principals};

pub const DEFAULT_ENVIRON_KEY: &str = "REMOTE_USER";

/// Maps a userid to its groups. Returning `None` means the user is unknown
/// and must be treated as unauthenticated.
pub type GroupFinder = Arc<dyn Fn(&Principal, &dyn Request) -> Option<Vec<Principal>> + Send + Sync>;

/// Takes the userid from a request environment key as-is.
#[derive(Clone)]
pub struct RemoteUserAuthenticationPolicy {
    environ_key: String,
    callback: Option<GroupFinder>,
}

impl RemoteUserAuthenticationPolicy {
    pub fn new() -> Self {
        RemoteUserAuthenticationPolicy {
            environ_key: DEFAULT_ENVIRON_KEY.to_string(),
            callback: None,
        }
    }

    /// Reads the userid from `environ_key` instead of `REMOTE_USER`.
    pub fn with_environ_key(mut self, environ_key: impl Into<String>) -> Result<Self, SecurityError> {
        let environ_key = environ_key.into();
        if environ_key.trim().is_empty() {
            return Err(SecurityError::InvalidArguments("environ key must not be empty".to_string()));
        }
        self.environ_key = environ_key;
        Ok(self)
    }

    /// Installs a group finder consulted for every authenticated userid.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Principal, &dyn Request) -> Option<Vec<Principal>> + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    pub fn environ_key(&self) -> &str {
        &self.environ_key
    }

    /// Userid as asserted by the request, before any group lookup.
    fn unauthenticated_userid(&self, request: &dyn Request) -> Option<Principal> {
        request
            .environ(&self.environ_key)
            .filter(|userid| !userid.is_empty())
            .map(Principal::from)
    }

    /// Groups of `userid`; `None` when the group finder rejects the user.
    fn groups(&self, userid: &Principal, request: &dyn Request) -> Option<Vec<Principal>> {
        match &self.callback {
            Some(callback) => callback(userid, request),
            None => Some(Vec::new()),
        }
    }
}

impl Default for RemoteUserAuthenticationPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RemoteUserAuthenticationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteUserAuthenticationPolicy")
            .field("environ_key", &self.environ_key)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl AuthenticationPolicy for RemoteUserAuthenticationPolicy {
    fn authenticated_userid(&self, _context: &dyn Resource, request: &dyn Request) -> Option<Principal> {
        let userid = self.unauthenticated_userid(request)?;
        self.groups(&userid, request)?;
        Some(userid)
    }

    fn effective_principals(&self, _context: &dyn Resource, request: &dyn Request) -> Principals {
        let mut principals = Principals::new();
        principals.insert(Principal::EVERYONE);

        let Some(userid) = self.unauthenticated_userid(request) else {
            return principals;
        };
        let Some(groups) = self.groups(&userid, request) else {
            tracing::debug!(userid = %userid, "Group finder rejected userid; treating as anonymous");
            return principals;
        };

        principals.insert(Principal::AUTHENTICATED);
        principals.insert(userid);
        principals.extend(groups);
        principals
    }

    // The identity lives upstream, so there is nothing to set or clear.
    fn remember(
        &self,
        _context: &dyn Resource,
        _request: &dyn Request,
        _principal: &Principal,
        _credentials: &Credentials,
    ) -> Vec<HeaderDirective> {
        Vec::new()
    }

    fn forget(&self, _context: &dyn Resource, _request: &dyn Request) -> Vec<HeaderDirective> {
        Vec::new()
    }
}
