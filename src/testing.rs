//!
//! Fixtures for exercising policies without a real resource tree or web
//! request. Enabled by the `test-utils` feature.

use std::collections::HashMap;
use std::sync::Arc;

use crate::acl::Acl;
use crate::policy::{AuthenticationPolicy, Credentials, HeaderDirective};
use crate::resource::{Request, Resource};
use crate::types::{Principal, Principals};

/// A resource tree node. Parents are shared so siblings can hang off one root.
#[derive(Debug, Clone, Default)]
pub struct DummyResource {
    pub name: String,
    pub acl: Option<Acl>,
    pub parent: Option<Arc<DummyResource>>,
}

impl DummyResource {
    pub fn new(name: impl Into<String>) -> Self {
        DummyResource {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_acl(mut self, acl: Acl) -> Self {
        self.acl = Some(acl);
        self
    }

    pub fn with_parent(mut self, parent: Arc<DummyResource>) -> Self {
        self.parent = Some(parent);
        self
    }
}

impl Resource for DummyResource {
    fn acl(&self) -> Option<&Acl> {
        self.acl.as_ref()
    }

    fn parent(&self) -> Option<&dyn Resource> {
        self.parent.as_deref().map(|p| p as &dyn Resource)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A request that is nothing but an environment map.
#[derive(Debug, Clone, Default)]
pub struct DummyRequest {
    pub environ: HashMap<String, String>,
}

impl DummyRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_environ(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environ.insert(key.into(), value.into());
        self
    }

    pub fn remote_user(userid: impl Into<String>) -> Self {
        Self::new().with_environ("REMOTE_USER", userid)
    }
}

impl Request for DummyRequest {
    fn environ(&self, key: &str) -> Option<&str> {
        self.environ.get(key).map(String::as_str)
    }
}

/// Authentication policy with a fixed identity, whatever the request says.
///
/// `remember` answers `("X-Remember", <principal>)` and `forget` answers
/// `("X-Forget", <userid>)` so tests can see which policy produced them.
#[derive(Debug, Clone, Default)]
pub struct DummyAuthenticationPolicy {
    pub userid: Option<Principal>,
    pub groups: Vec<Principal>,
}

impl DummyAuthenticationPolicy {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(userid: impl Into<Principal>) -> Self {
        DummyAuthenticationPolicy {
            userid: Some(userid.into()),
            groups: Vec::new(),
        }
    }

    pub fn with_groups<I, P>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Principal>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }
}

impl AuthenticationPolicy for DummyAuthenticationPolicy {
    fn authenticated_userid(&self, _context: &dyn Resource, _request: &dyn Request) -> Option<Principal> {
        self.userid.clone()
    }

    fn effective_principals(&self, _context: &dyn Resource, _request: &dyn Request) -> Principals {
        let mut principals = Principals::from([Principal::EVERYONE]);
        if let Some(userid) = &self.userid {
            principals.insert(Principal::AUTHENTICATED);
            principals.insert(userid.clone());
            principals.extend(self.groups.iter().cloned());
        }
        principals
    }

    fn remember(
        &self,
        _context: &dyn Resource,
        _request: &dyn Request,
        principal: &Principal,
        _credentials: &Credentials,
    ) -> Vec<HeaderDirective> {
        vec![("X-Remember".to_string(), principal.to_string())]
    }

    fn forget(&self, _context: &dyn Resource, _request: &dyn Request) -> Vec<HeaderDirective> {
        let userid = self.userid.as_ref().map(Principal::to_string).unwrap_or_default();
        vec![("X-Forget".to_string(), userid)]
    }
}
