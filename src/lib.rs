#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(deprecated)]

//!
//! Warden-Core is an access-control decision engine.
//!
//! Given the principals asserted by a request and a protected resource, it
//! decides whether a named permission is granted and explains why. Policies
//! are pluggable: an [`policy::AuthenticationPolicy`] resolves principals, an
//! [`policy::AuthorizationPolicy`] decides, and the [`security::Security`]
//! facade applies the fallbacks for missing policies.

// Principals, permissions and the reserved markers.
pub mod types;

// Access control entries and lists.
pub mod acl;

// Boolean-like decisions with diagnostics.
pub mod result;

// Resource tree and request interfaces.
pub mod resource;

// Capability traits and the shipped policies.
pub mod policy;

// Facade over the active policies.
pub mod security;

pub mod view;

pub mod config;

pub mod error;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use acl::{Ace, Acl, DENY_ALL};
pub use error::{ConfigError, SecurityError};
pub use resource::{lineage, Request, Resource};
pub use result::{AceMatch, AclTrail, Message, PermitsResult, Quoted};
pub use security::Security;
pub use types::{
    Action, AllPermissions, Permission, PermissionSpec, Principal, Principals, ALL_PERMISSIONS, AUTHENTICATED,
    EVERYONE,
};
