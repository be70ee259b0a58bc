//!
//! Pluggable authentication and authorization capabilities.
//!
//! An [`AuthenticationPolicy`] turns a request into principals; an
//! [`AuthorizationPolicy`] turns principals into a [`PermitsResult`]. The
//! [`crate::security::Security`] facade wires one of each together.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::SecurityError;
use crate::resource::{Request, Resource};
use crate::result::PermitsResult;
use crate::types::{Principal, Principals};

pub mod acl;
pub mod remote_user;

pub use acl::{AclAuthorizationPolicy, AclWalk};
pub use remote_user::{GroupFinder, RemoteUserAuthenticationPolicy};

/// Free-form credentials handed to [`AuthenticationPolicy::remember`]. Their
/// meaning is agreed between the caller and the active policy.
pub type Credentials = BTreeMap<String, serde_json::Value>;

/// A `(name, value)` header the caller should apply to its response.
pub type HeaderDirective = (String, String);

/// Resolves requests to identities.
///
/// `remember`/`forget` never mutate anything themselves; they return header
/// directives for the caller to apply to an outgoing response.
pub trait AuthenticationPolicy: Send + Sync + fmt::Debug {
    /// The userid of the authenticated user, or `None`.
    fn authenticated_userid(&self, context: &dyn Resource, request: &dyn Request) -> Option<Principal>;

    /// Every principal the request is considered to hold, including
    /// [`Principal::EVERYONE`] and, when authenticated, [`Principal::AUTHENTICATED`].
    fn effective_principals(&self, context: &dyn Resource, request: &dyn Request) -> Principals;

    fn remember(
        &self,
        context: &dyn Resource,
        request: &dyn Request,
        principal: &Principal,
        credentials: &Credentials,
    ) -> Vec<HeaderDirective>;

    fn forget(&self, context: &dyn Resource, request: &dyn Request) -> Vec<HeaderDirective>;
}

/// Decides whether principals hold a permission on a resource.
pub trait AuthorizationPolicy: Send + Sync + fmt::Debug {
    fn permits(&self, context: &dyn Resource, principals: &Principals, permission: &str) -> PermitsResult;

    /// Principals granted `permission` on `context`.
    ///
    /// Policies that cannot enumerate grants keep the default, which reports
    /// [`SecurityError::NotImplemented`] rather than an empty set.
    fn principals_allowed_by_permission(
        &self,
        _context: &dyn Resource,
        _permission: &str,
    ) -> Result<Principals, SecurityError> {
        Err(SecurityError::NotImplemented {
            policy: std::any::type_name::<Self>(),
            operation: "principals_allowed_by_permission",
        })
    }
}
