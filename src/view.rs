//!
//! Per-view permission requirements.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::SecurityError;
use crate::resource::{Request, Resource};
use crate::result::PermitsResult;
use crate::security::Security;
use crate::types::Permission;

/// A permission check guarding a view.
pub trait ViewPermission: Send + Sync + fmt::Debug {
    fn check(
        &self,
        security: &Security,
        context: &dyn Resource,
        request: &dyn Request,
    ) -> Result<PermitsResult, SecurityError>;
}

/// Requires a single named permission, checked through [`Security::has_permission`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredPermission {
    pub permission_name: Permission,
}

impl RequiredPermission {
    pub fn new(permission_name: impl Into<Permission>) -> Self {
        RequiredPermission {
            permission_name: permission_name.into(),
        }
    }
}

impl ViewPermission for RequiredPermission {
    fn check(
        &self,
        security: &Security,
        context: &dyn Resource,
        request: &dyn Request,
    ) -> Result<PermitsResult, SecurityError> {
        security.has_permission(self.permission_name.as_str(), context, request)
    }
}

/// Finds the permission requirement of a view, if it has one.
pub trait ViewPermissionLookup: Send + Sync + fmt::Debug {
    fn lookup(&self, context: &dyn Resource, request: &dyn Request, name: &str) -> Option<Arc<dyn ViewPermission>>;
}

/// In-memory registry keyed by view name.
#[derive(Debug, Clone, Default)]
pub struct ViewPermissions {
    by_name: HashMap<String, Arc<dyn ViewPermission>>,
}

impl ViewPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, name: impl Into<String>, permission: impl ViewPermission + 'static) -> Self {
        self.by_name.insert(name.into(), Arc::new(permission));
        self
    }

    /// Shorthand for registering a [`RequiredPermission`].
    pub fn protect(self, name: impl Into<String>, permission: impl Into<Permission>) -> Self {
        self.register(name, RequiredPermission::new(permission))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl ViewPermissionLookup for ViewPermissions {
    fn lookup(&self, _context: &dyn Resource, _request: &dyn Request, name: &str) -> Option<Arc<dyn ViewPermission>> {
        self.by_name.get(name).cloned()
    }
}
