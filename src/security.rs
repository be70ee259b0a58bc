//!
//! The security facade.
//!
//! A [`Security`] value holds the active authentication and authorization
//! policies (and optionally a view-permission lookup) and is passed to
//! whoever needs a decision. Every operation is a read over caller-supplied
//! data plus these policies, so a `Security` can be shared across threads.

use std::sync::Arc;

use crate::error::SecurityError;
use crate::policy::{
    AclAuthorizationPolicy, AuthenticationPolicy, AuthorizationPolicy, Credentials, HeaderDirective,
    RemoteUserAuthenticationPolicy,
};
use crate::resource::{Request, Resource};
use crate::result::{Message, PermitsResult, Quoted};
use crate::types::{Principal, Principals};
use crate::view::ViewPermissionLookup;

/// Active security policies, injected explicitly.
#[derive(Debug, Clone, Default)]
pub struct Security {
    authentication: Option<Arc<dyn AuthenticationPolicy>>,
    authorization: Option<Arc<dyn AuthorizationPolicy>>,
    views: Option<Arc<dyn ViewPermissionLookup>>,
}

impl Security {
    /// No policies at all: every permission check is allowed.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_authentication(mut self, policy: impl AuthenticationPolicy + 'static) -> Self {
        self.authentication = Some(Arc::new(policy));
        self
    }

    pub fn with_authorization(mut self, policy: impl AuthorizationPolicy + 'static) -> Self {
        self.authorization = Some(Arc::new(policy));
        self
    }

    pub fn with_views(mut self, views: impl ViewPermissionLookup + 'static) -> Self {
        self.views = Some(Arc::new(views));
        self
    }

    /// Non-inheriting ACL authorization paired with `authentication`.
    pub fn acl(authentication: impl AuthenticationPolicy + 'static) -> Self {
        Self::new()
            .with_authentication(authentication)
            .with_authorization(AclAuthorizationPolicy::local())
    }

    /// Inheriting ACL authorization paired with `authentication`.
    pub fn inheriting_acl(authentication: impl AuthenticationPolicy + 'static) -> Self {
        Self::new()
            .with_authentication(authentication)
            .with_authorization(AclAuthorizationPolicy::inheriting())
    }

    pub fn remote_user_acl() -> Self {
        Self::acl(RemoteUserAuthenticationPolicy::new())
    }

    pub fn remote_user_inheriting_acl() -> Self {
        Self::inheriting_acl(RemoteUserAuthenticationPolicy::new())
    }

    pub fn authentication_policy(&self) -> Option<&dyn AuthenticationPolicy> {
        self.authentication.as_deref()
    }

    pub fn authorization_policy(&self) -> Option<&dyn AuthorizationPolicy> {
        self.authorization.as_deref()
    }

    /// Checks `permission` on `context` for the identity implied by `request`.
    ///
    /// Without an authentication policy everything is allowed. An
    /// authentication policy without an authorization policy is a
    /// [`SecurityError::Configuration`] error.
    pub fn has_permission(
        &self,
        permission: &str,
        context: &dyn Resource,
        request: &dyn Request,
    ) -> Result<PermitsResult, SecurityError> {
        let Some(authn) = &self.authentication else {
            return Ok(PermitsResult::allowed("No authentication policy in use."));
        };
        let Some(authz) = &self.authorization else {
            tracing::warn!(permission, "Authentication policy registered without authorization policy");
            return Err(SecurityError::Configuration(
                "Authentication policy registered without authorization policy".to_string(),
            ));
        };

        let principals = authn.effective_principals(context, request);
        let result = authz.permits(context, &principals, permission);
        tracing::debug!(
            permission,
            context = context.name(),
            allowed = result.is_allowed(),
            "Permission check"
        );
        Ok(result)
    }

    /// Like [`Security::has_permission`], but a denial becomes
    /// [`SecurityError::Unauthorized`].
    pub fn require_permission(
        &self,
        permission: &str,
        context: &dyn Resource,
        request: &dyn Request,
    ) -> Result<PermitsResult, SecurityError> {
        self.has_permission(permission, context, request)?.into_result()
    }

    /// Userid of the authenticated user; `None` without an authentication policy.
    pub fn authenticated_userid(&self, context: &dyn Resource, request: &dyn Request) -> Option<Principal> {
        self.authentication
            .as_ref()
            .and_then(|policy| policy.authenticated_userid(context, request))
    }

    /// Effective principals of the request; empty without an authentication policy.
    pub fn effective_principals(&self, context: &dyn Resource, request: &dyn Request) -> Principals {
        match &self.authentication {
            Some(policy) => policy.effective_principals(context, request),
            None => Principals::new(),
        }
    }

    /// Principals granted `permission` on `context`.
    ///
    /// Without an authorization policy this is just `{Everyone}`. Policies
    /// that cannot enumerate grants return [`SecurityError::NotImplemented`].
    pub fn principals_allowed_by_permission(
        &self,
        context: &dyn Resource,
        permission: &str,
    ) -> Result<Principals, SecurityError> {
        match &self.authorization {
            Some(policy) => policy.principals_allowed_by_permission(context, permission),
            None => Ok(Principals::from([Principal::EVERYONE])),
        }
    }

    /// Headers that remember `principal` on the response; empty without an
    /// authentication policy.
    pub fn remember(
        &self,
        context: &dyn Resource,
        request: &dyn Request,
        principal: &Principal,
        credentials: &Credentials,
    ) -> Vec<HeaderDirective> {
        match &self.authentication {
            Some(policy) => policy.remember(context, request, principal, credentials),
            None => Vec::new(),
        }
    }

    /// Headers that forget the current user; empty without an authentication policy.
    pub fn forget(&self, context: &dyn Resource, request: &dyn Request) -> Vec<HeaderDirective> {
        match &self.authentication {
            Some(policy) => policy.forget(context, request),
            None => Vec::new(),
        }
    }

    /// Checks the permission protecting view `name`, if any.
    pub fn view_execution_permitted(
        &self,
        context: &dyn Resource,
        request: &dyn Request,
        name: &str,
    ) -> Result<PermitsResult, SecurityError> {
        let guard = self
            .views
            .as_ref()
            .and_then(|views| views.lookup(context, request, name));
        match guard {
            Some(guard) => guard.check(self, context, request),
            None => Ok(PermitsResult::Allowed(
                Message::new("Allowed: view name {} in context {} (no permission defined)")
                    .arg(Quoted(name.to_string()))
                    .arg(Quoted(context.name().to_string())),
            )),
        }
    }
}
