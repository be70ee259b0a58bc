//!
//! Access control entries and lists.
//!
//! An [`Acl`] is an ordered sequence of [`Ace`]s. Order is significant:
//! evaluation is first-match-wins, so a list owner that wants an implicit
//! deny appends [`DENY_ALL`].

use std::fmt;

use crate::types::{Action, AllPermissions, PermissionSpec, Principal, Principals};

/// One `(action, principal, permissions)` rule.
///
/// Serialized as a three element array, e.g. `["Allow", "editors", ["view", "edit"]]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "(Action, Principal, PermissionSpec)", into = "(Action, Principal, PermissionSpec)")]
pub struct Ace {
    pub action: Action,
    pub principal: Principal,
    pub permissions: PermissionSpec,
}

/// The conventional terminator: deny every permission to everyone.
pub const DENY_ALL: Ace = Ace {
    action: Action::Deny,
    principal: Principal::EVERYONE,
    permissions: PermissionSpec::All(AllPermissions),
};

impl Ace {
    pub fn new(action: Action, principal: impl Into<Principal>, permissions: impl Into<PermissionSpec>) -> Self {
        Ace {
            action,
            principal: principal.into(),
            permissions: permissions.into(),
        }
    }

    pub fn allow(principal: impl Into<Principal>, permissions: impl Into<PermissionSpec>) -> Self {
        Self::new(Action::Allow, principal, permissions)
    }

    pub fn deny(principal: impl Into<Principal>, permissions: impl Into<PermissionSpec>) -> Self {
        Self::new(Action::Deny, principal, permissions)
    }

    /// True when the entry's principal is held by the request and the
    /// requested permission falls inside the entry's permission spec.
    #[inline]
    pub fn matches(&self, principals: &Principals, permission: &str) -> bool {
        principals.contains(&self.principal) && self.permissions.contains(permission)
    }

    pub fn is_allow(&self) -> bool {
        self.action == Action::Allow
    }
}

impl From<(Action, Principal, PermissionSpec)> for Ace {
    fn from((action, principal, permissions): (Action, Principal, PermissionSpec)) -> Self {
        Ace { action, principal, permissions }
    }
}

impl From<Ace> for (Action, Principal, PermissionSpec) {
    fn from(ace: Ace) -> Self {
        (ace.action, ace.principal, ace.permissions)
    }
}

impl fmt::Display for Ace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {:?}, {})", self.action, self.principal.as_str(), self.permissions)
    }
}

/// Ordered list of entries attached to a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Acl(Vec<Ace>);

impl Acl {
    pub fn new() -> Self {
        Acl(Vec::new())
    }

    /// Builder-style append.
    pub fn with(mut self, ace: Ace) -> Self {
        self.0.push(ace);
        self
    }

    pub fn push(&mut self, ace: Ace) {
        self.0.push(ace);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ace> {
        self.0.iter()
    }

    pub fn entries(&self) -> &[Ace] {
        &self.0
    }

    /// The first entry matching `principals` and `permission`, in list order.
    pub fn first_match(&self, principals: &Principals, permission: &str) -> Option<&Ace> {
        self.0.iter().find(|ace| ace.matches(principals, permission))
    }
}

impl From<Vec<Ace>> for Acl {
    fn from(entries: Vec<Ace>) -> Self {
        Acl(entries)
    }
}

impl FromIterator<Ace> for Acl {
    fn from_iter<I: IntoIterator<Item = Ace>>(iter: I) -> Self {
        Acl(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Acl {
    type Item = &'a Ace;
    type IntoIter = std::slice::Iter<'a, Ace>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Acl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, ace) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", ace)?;
        }
        f.write_str("]")
    }
}
