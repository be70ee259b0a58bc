//!
//! Boolean-like permission outcomes that also explain themselves.
//!
//! Every `Allowed`/`AclAllowed` is truthy and every `Denied`/`AclDenied` is
//! falsy, whatever its message says. Callers branch on [`PermitsResult::is_allowed`];
//! diagnostic code reads [`PermitsResult::msg`], which is only rendered on demand.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::acl::{Ace, Acl};
use crate::error::SecurityError;
use crate::types::{Permission, Principals};

type MessageArg = Arc<dyn fmt::Display + Send + Sync>;

/// A message template with positional `{}` holes, rendered lazily.
///
/// Arguments are held as `Display` values; none of them is formatted until
/// [`Message::render`] runs.
#[derive(Clone)]
pub struct Message {
    template: Cow<'static, str>,
    args: Vec<MessageArg>,
}

impl Message {
    pub fn new(template: impl Into<Cow<'static, str>>) -> Self {
        Message {
            template: template.into(),
            args: Vec::new(),
        }
    }

    /// Appends the next positional argument.
    pub fn arg(mut self, arg: impl fmt::Display + Send + Sync + 'static) -> Self {
        self.args.push(Arc::new(arg));
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Substitutes the arguments into the template. Surplus holes are left as `{}`.
    pub fn render(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::with_capacity(self.template.len());
        let mut args = self.args.iter();
        let mut rest: &str = &self.template;
        while let Some(pos) = rest.find("{}") {
            out.push_str(&rest[..pos]);
            match args.next() {
                Some(arg) => {
                    let _ = write!(out, "{}", arg);
                }
                None => out.push_str("{}"),
            }
            rest = &rest[pos + 2..];
        }
        out.push_str(rest);
        out
    }
}

/// Renders `{:?}` of the wrapped value when displayed.
#[derive(Debug, Clone)]
pub struct Quoted<T>(pub T);

impl<T: fmt::Debug> fmt::Display for Quoted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template
            && self.args.len() == other.args.len()
            && self.args.iter().zip(&other.args).all(|(a, b)| a.to_string() == b.to_string())
    }
}

impl Eq for Message {}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("template", &self.template)
            .field("args", &self.args.len())
            .finish()
    }
}

impl From<&'static str> for Message {
    fn from(template: &'static str) -> Self {
        Message::new(template)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Which entry decided an ACL check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AceMatch {
    /// A concrete entry matched.
    Entry(Ace),
    /// ACLs were found but none of their entries matched.
    NoMatchingAce,
    /// No node in the searched lineage carried an ACL.
    NoAcl,
}

impl AceMatch {
    pub fn entry(&self) -> Option<&Ace> {
        match self {
            AceMatch::Entry(ace) => Some(ace),
            _ => None,
        }
    }
}

impl fmt::Display for AceMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AceMatch::Entry(ace) => write!(f, "{}", ace),
            AceMatch::NoMatchingAce => f.write_str("<default deny>"),
            AceMatch::NoAcl => f.write_str("<No ACL found on any object in resource lineage>"),
        }
    }
}

/// Audit trail of an ACL decision: enough to explain it without re-running it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclTrail {
    pub ace: AceMatch,
    /// The ACL the deciding entry came from; the last ACL searched when no
    /// entry matched; empty when no ACL was found.
    pub acl: Acl,
    /// Every ACL consulted, closest first.
    pub searched: Vec<Acl>,
    pub permission: Permission,
    pub principals: Principals,
    /// Name of the context the check was made against.
    pub context: String,
    /// Name of the node whose ACL decided, when an entry matched.
    pub location: Option<String>,
}

impl AclTrail {
    fn describe(&self, kind: &str) -> String {
        let principals: Vec<&str> = self.principals.iter().map(|p| p.as_str()).collect();
        format!(
            "{} permission {:?} via ACE {} in ACL {} on context {:?} for principals {:?}",
            kind,
            self.permission.as_str(),
            self.ace,
            self.acl,
            self.context,
            principals
        )
    }
}

/// Outcome of a permission check.
#[derive(Clone, PartialEq, Eq)]
pub enum PermitsResult {
    /// Allowed for a reason unrelated to an ACL check.
    Allowed(Message),
    /// Denied for a reason unrelated to an ACL check.
    Denied(Message),
    /// Allowed by an ACL entry.
    AclAllowed(Box<AclTrail>),
    /// Denied by an ACL entry, or by the absence of one.
    AclDenied(Box<AclTrail>),
}

impl PermitsResult {
    pub fn allowed(message: impl Into<Message>) -> Self {
        PermitsResult::Allowed(message.into())
    }

    pub fn denied(message: impl Into<Message>) -> Self {
        PermitsResult::Denied(message.into())
    }

    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, PermitsResult::Allowed(_) | PermitsResult::AclAllowed(_))
    }

    #[inline]
    pub fn is_denied(&self) -> bool {
        !self.is_allowed()
    }

    /// Variant name, as used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            PermitsResult::Allowed(_) => "Allowed",
            PermitsResult::Denied(_) => "Denied",
            PermitsResult::AclAllowed(_) => "AclAllowed",
            PermitsResult::AclDenied(_) => "AclDenied",
        }
    }

    pub fn trail(&self) -> Option<&AclTrail> {
        match self {
            PermitsResult::AclAllowed(trail) | PermitsResult::AclDenied(trail) => Some(trail),
            _ => None,
        }
    }

    /// Human-readable justification, computed on each call.
    pub fn msg(&self) -> String {
        match self {
            PermitsResult::Allowed(m) | PermitsResult::Denied(m) => m.render(),
            PermitsResult::AclAllowed(trail) | PermitsResult::AclDenied(trail) => trail.describe(self.kind()),
        }
    }

    /// Turns a denial into [`SecurityError::Unauthorized`] for callers that
    /// want to abort on it.
    pub fn into_result(self) -> Result<Self, SecurityError> {
        if self.is_allowed() {
            Ok(self)
        } else {
            Err(SecurityError::Unauthorized(self.msg()))
        }
    }
}

impl From<PermitsResult> for bool {
    fn from(result: PermitsResult) -> bool {
        result.is_allowed()
    }
}

impl From<&PermitsResult> for bool {
    fn from(result: &PermitsResult) -> bool {
        result.is_allowed()
    }
}

impl fmt::Display for PermitsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg())
    }
}

impl fmt::Debug for PermitsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} instance with msg {:?}>", self.kind(), self.msg())
    }
}
