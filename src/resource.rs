//!
//! Narrow interfaces onto the collaborators this crate only reads from: the
//! resource tree (context objects bearing ACLs) and the incoming request.

use crate::acl::Acl;

/// A node of the application's resource tree.
///
/// The engine never constructs or mutates resources. It only reads the ACL
/// attached to a node and follows parent references upward.
pub trait Resource {
    /// ACL attached to this node, if any.
    fn acl(&self) -> Option<&Acl> {
        None
    }

    /// Parent node; `None` at the root.
    fn parent(&self) -> Option<&dyn Resource> {
        None
    }

    /// Label recorded in audit trails and diagnostic messages, for both the
    /// checked context and the node whose ACL decided.
    fn name(&self) -> &str;
}

/// The request side of a permission check.
pub trait Request {
    /// WSGI-style environment lookup (e.g. `REMOTE_USER`).
    fn environ(&self, key: &str) -> Option<&str>;
}

/// Walks the location chain of `context`, yielding the context itself first
/// and then each ancestor up to the root.
pub fn lineage<'a>(context: &'a dyn Resource) -> Lineage<'a> {
    Lineage { next: Some(context) }
}

pub struct Lineage<'a> {
    next: Option<&'a dyn Resource>,
}

impl<'a> Iterator for Lineage<'a> {
    type Item = &'a dyn Resource;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}
