//!
//! Shared access-control vocabulary: principals, permissions and the
//! markers every policy and ACL speaks in.

use std::borrow::{Borrow, Cow};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier for a user or group. Opaque to the engine apart from the two
/// reserved values [`Principal::EVERYONE`] and [`Principal::AUTHENTICATED`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Principal(Cow<'static, str>);

impl Principal {
    /// Matches every request, authenticated or not.
    pub const EVERYONE: Principal = Principal(Cow::Borrowed("system.Everyone"));
    /// Matches only requests carrying a resolved user identity.
    pub const AUTHENTICATED: Principal = Principal(Cow::Borrowed("system.Authenticated"));

    pub const fn from_static(id: &'static str) -> Self {
        Principal(Cow::Borrowed(id))
    }

    pub fn new(id: impl Into<String>) -> Self {
        Principal(Cow::Owned(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the two `system.*` identifiers.
    pub fn is_reserved(&self) -> bool {
        *self == Self::EVERYONE || *self == Self::AUTHENTICATED
    }
}

impl Borrow<str> for Principal {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Principal {
    fn from(id: &str) -> Self {
        Principal::new(id)
    }
}

impl From<String> for Principal {
    fn from(id: String) -> Self {
        Principal::new(id)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub const EVERYONE: Principal = Principal::EVERYONE;
pub const AUTHENTICATED: Principal = Principal::AUTHENTICATED;

/// The effective principal set of a request. Ordered so that diagnostics
/// render identically across runs.
pub type Principals = BTreeSet<Principal>;

/// A named capability checked against a resource, e.g. `"view"` or `"edit"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    pub fn new(name: impl Into<String>) -> Self {
        Permission(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Permission {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Permission {
    fn from(name: &str) -> Self {
        Permission::new(name)
    }
}

impl From<String> for Permission {
    fn from(name: String) -> Self {
        Permission(name)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an ACE does when it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Action {
    Allow,
    Deny,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Allow => f.write_str("Allow"),
            Action::Deny => f.write_str("Deny"),
        }
    }
}

/// Stand-in permission list that contains every permission.
///
/// It lists nothing when iterated and is only ever equal to another
/// `AllPermissions`, never to a concrete permission. Serialized as JSON
/// `null`, which no permission name can collide with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AllPermissions;

impl AllPermissions {
    #[inline]
    pub fn contains(&self, _permission: &str) -> bool {
        true
    }

    pub fn iter(&self) -> std::iter::Empty<&Permission> {
        std::iter::empty()
    }
}

impl fmt::Display for AllPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ALL_PERMISSIONS")
    }
}

pub const ALL_PERMISSIONS: AllPermissions = AllPermissions;

/// The permission slot of an ACE.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "RawPermissionSpec", into = "RawPermissionSpec")]
pub enum PermissionSpec {
    One(Permission),
    Many(Vec<Permission>),
    All(AllPermissions),
}

impl PermissionSpec {
    /// Membership test used by ACE matching.
    pub fn contains(&self, permission: &str) -> bool {
        match self {
            PermissionSpec::One(p) => p.as_str() == permission,
            PermissionSpec::Many(ps) => ps.iter().any(|p| p.as_str() == permission),
            PermissionSpec::All(all) => all.contains(permission),
        }
    }

    /// Concrete permissions named by this spec; empty for the all-permissions marker.
    pub fn permissions(&self) -> &[Permission] {
        match self {
            PermissionSpec::One(p) => std::slice::from_ref(p),
            PermissionSpec::Many(ps) => ps,
            PermissionSpec::All(_) => &[],
        }
    }
}

impl fmt::Display for PermissionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionSpec::One(p) => write!(f, "{:?}", p.as_str()),
            PermissionSpec::Many(ps) => {
                let names: Vec<&str> = ps.iter().map(Permission::as_str).collect();
                write!(f, "{:?}", names)
            }
            PermissionSpec::All(all) => write!(f, "{}", all),
        }
    }
}

impl From<&str> for PermissionSpec {
    fn from(name: &str) -> Self {
        PermissionSpec::One(Permission::from(name))
    }
}

impl From<Permission> for PermissionSpec {
    fn from(permission: Permission) -> Self {
        PermissionSpec::One(permission)
    }
}

impl From<Vec<&str>> for PermissionSpec {
    fn from(names: Vec<&str>) -> Self {
        PermissionSpec::Many(names.into_iter().map(Permission::from).collect())
    }
}

impl From<AllPermissions> for PermissionSpec {
    fn from(all: AllPermissions) -> Self {
        PermissionSpec::All(all)
    }
}

/// Wire form: a string, a list of strings, or `null` for the marker. Strings
/// are always concrete permissions.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum RawPermissionSpec {
    Name(Permission),
    List(Vec<Permission>),
    All(AllPermissions),
}

impl From<RawPermissionSpec> for PermissionSpec {
    fn from(raw: RawPermissionSpec) -> Self {
        match raw {
            RawPermissionSpec::Name(name) => PermissionSpec::One(name),
            RawPermissionSpec::List(list) => PermissionSpec::Many(list),
            RawPermissionSpec::All(all) => PermissionSpec::All(all),
        }
    }
}

impl From<PermissionSpec> for RawPermissionSpec {
    fn from(spec: PermissionSpec) -> Self {
        match spec {
            PermissionSpec::One(p) => RawPermissionSpec::Name(p),
            PermissionSpec::Many(ps) => RawPermissionSpec::List(ps),
            PermissionSpec::All(all) => RawPermissionSpec::All(all),
        }
    }
}
