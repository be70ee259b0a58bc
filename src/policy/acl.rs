//!
//! ACL-walking authorization policy.
//!
//! Entries are evaluated in list order and the first match decides. The
//! [`AclWalk`] setting controls how far up the resource lineage the policy
//! looks when the closest ACL yields no decision.

use std::collections::BTreeSet;

use crate::acl::Acl;
use crate::error::SecurityError;
use crate::policy::AuthorizationPolicy;
use crate::resource::{lineage, Resource};
use crate::result::{AceMatch, AclTrail, PermitsResult};
use crate::types::{Action, Permission, Principal, Principals};

/// How much of the resource lineage an [`AclAuthorizationPolicy`] consults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AclWalk {
    /// Only the ACL attached to the context itself.
    Local,
    /// The first ACL found walking up from the context; no fallthrough past it.
    Nearest,
    /// Every ACL from the context up to the root until an entry matches.
    #[default]
    Inherit,
}

/// Authorization by access control lists attached to resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AclAuthorizationPolicy {
    walk: AclWalk,
}

impl AclAuthorizationPolicy {
    pub fn new(walk: AclWalk) -> Self {
        AclAuthorizationPolicy { walk }
    }

    /// Non-inheriting policy: consults the context's own ACL only.
    pub fn local() -> Self {
        Self::new(AclWalk::Local)
    }

    pub fn inheriting() -> Self {
        Self::new(AclWalk::Inherit)
    }

    pub fn walk(&self) -> AclWalk {
        self.walk
    }

    /// Nodes bearing a non-empty ACL that this policy may consult, closest first.
    fn acl_bearers<'a>(&self, context: &'a dyn Resource) -> Vec<(&'a dyn Resource, &'a Acl)> {
        let bearing = lineage(context).filter_map(|node| match node.acl() {
            Some(acl) if !acl.is_empty() => Some((node, acl)),
            _ => None,
        });
        match self.walk {
            AclWalk::Local => match context.acl() {
                Some(acl) if !acl.is_empty() => vec![(context, acl)],
                _ => Vec::new(),
            },
            AclWalk::Nearest => bearing.take(1).collect(),
            AclWalk::Inherit => bearing.collect(),
        }
    }
}

impl AuthorizationPolicy for AclAuthorizationPolicy {
    fn permits(&self, context: &dyn Resource, principals: &Principals, permission: &str) -> PermitsResult {
        let mut searched: Vec<Acl> = Vec::new();

        for (location, acl) in self.acl_bearers(context) {
            searched.push(acl.clone());
            let Some(ace) = acl.first_match(principals, permission) else {
                continue;
            };
            tracing::debug!(
                permission,
                context = context.name(),
                location = location.name(),
                action = %ace.action,
                principal = %ace.principal,
                "ACL entry matched"
            );
            let trail = Box::new(AclTrail {
                ace: AceMatch::Entry(ace.clone()),
                acl: acl.clone(),
                searched,
                permission: Permission::from(permission),
                principals: principals.clone(),
                context: context.name().to_string(),
                location: Some(location.name().to_string()),
            });
            return match ace.action {
                Action::Allow => PermitsResult::AclAllowed(trail),
                Action::Deny => PermitsResult::AclDenied(trail),
            };
        }

        let ace = if searched.is_empty() { AceMatch::NoAcl } else { AceMatch::NoMatchingAce };
        tracing::debug!(
            permission,
            context = context.name(),
            acls_searched = searched.len(),
            "No ACL entry matched; denying"
        );
        PermitsResult::AclDenied(Box::new(AclTrail {
            ace,
            acl: searched.last().cloned().unwrap_or_default(),
            searched,
            permission: Permission::from(permission),
            principals: principals.clone(),
            context: context.name().to_string(),
            location: None,
        }))
    }

    fn principals_allowed_by_permission(
        &self,
        context: &dyn Resource,
        permission: &str,
    ) -> Result<Principals, SecurityError> {
        let mut allowed: Principals = BTreeSet::new();

        // Root first, so that closer ACLs get the last word.
        for (_, acl) in self.acl_bearers(context).into_iter().rev() {
            let mut allowed_here: Principals = BTreeSet::new();
            let mut denied_here: BTreeSet<&Principal> = BTreeSet::new();

            for ace in acl.iter().filter(|ace| ace.permissions.contains(permission)) {
                match ace.action {
                    Action::Allow => {
                        if !denied_here.contains(&ace.principal) {
                            allowed_here.insert(ace.principal.clone());
                        }
                    }
                    Action::Deny => {
                        denied_here.insert(&ace.principal);
                        if ace.principal == Principal::EVERYONE {
                            // Nothing granted further up survives a deny of Everyone.
                            allowed.clear();
                            break;
                        }
                        allowed.remove(&ace.principal);
                    }
                }
            }
            allowed.extend(allowed_here);
        }

        Ok(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::{Ace, DENY_ALL};
    use crate::types::{ALL_PERMISSIONS, AUTHENTICATED, EVERYONE};

    struct Node {
        name: &'static str,
        acl: Option<Acl>,
        parent: Option<Box<Node>>,
    }

    impl Node {
        fn new(name: &'static str, acl: Option<Acl>) -> Self {
            Node { name, acl, parent: None }
        }

        fn under(mut self, parent: Node) -> Self {
            self.parent = Some(Box::new(parent));
            self
        }
    }

    impl Resource for Node {
        fn acl(&self) -> Option<&Acl> {
            self.acl.as_ref()
        }

        fn parent(&self) -> Option<&dyn Resource> {
            self.parent.as_deref().map(|p| p as &dyn Resource)
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn principals(ids: &[&str]) -> Principals {
        let mut set: Principals = ids.iter().map(|id| Principal::from(*id)).collect();
        set.insert(EVERYONE);
        set
    }

    #[test]
    fn test_first_matching_allow_wins() {
        let acl = Acl::new()
            .with(Ace::allow("bob", "view"))
            .with(Ace::deny("bob", "view"))
            .with(DENY_ALL);
        let ctx = Node::new("doc", Some(acl.clone()));
        let result = AclAuthorizationPolicy::local().permits(&ctx, &principals(&["bob"]), "view");
        assert!(result.is_allowed());
        let trail = result.trail().unwrap();
        assert_eq!(trail.ace, AceMatch::Entry(Ace::allow("bob", "view")));
        assert_eq!(trail.acl, acl);
        assert_eq!(trail.location.as_deref(), Some("doc"));
    }

    #[test]
    fn test_deny_all_terminator() {
        let ctx = Node::new("doc", Some(Acl::new().with(Ace::allow("admin", ALL_PERMISSIONS)).with(DENY_ALL)));
        let result = AclAuthorizationPolicy::inheriting().permits(&ctx, &principals(&["bob"]), "edit");
        assert!(matches!(result, PermitsResult::AclDenied(_)));
        assert_eq!(result.trail().unwrap().ace, AceMatch::Entry(DENY_ALL));
    }

    #[test]
    fn test_local_does_not_consult_parent() {
        let root = Node::new("root", Some(Acl::new().with(Ace::allow(EVERYONE, "view"))));
        let ctx = Node::new("leaf", None).under(root);
        let result = AclAuthorizationPolicy::local().permits(&ctx, &principals(&[]), "view");
        assert!(result.is_denied());
        assert_eq!(result.trail().unwrap().ace, AceMatch::NoAcl);
    }

    #[test]
    fn test_inheriting_falls_through_to_parent() {
        let root = Node::new("root", Some(Acl::new().with(Ace::allow(EVERYONE, "view"))));
        let mid = Node::new("mid", Some(Acl::new().with(Ace::allow("editors", "edit")))).under(root);
        let ctx = Node::new("leaf", None).under(mid);
        let result = AclAuthorizationPolicy::inheriting().permits(&ctx, &principals(&[]), "view");
        assert!(result.is_allowed());
        let trail = result.trail().unwrap();
        assert_eq!(trail.searched.len(), 2);
        assert_eq!(trail.location.as_deref(), Some("root"));
        assert_eq!(trail.context, "leaf");
    }

    #[test]
    fn test_nearest_stops_at_first_acl() {
        let root = Node::new("root", Some(Acl::new().with(Ace::allow(EVERYONE, "view"))));
        let mid = Node::new("mid", Some(Acl::new().with(Ace::allow("editors", "edit")))).under(root);
        let ctx = Node::new("leaf", None).under(mid);
        let result = AclAuthorizationPolicy::new(AclWalk::Nearest).permits(&ctx, &principals(&[]), "view");
        assert!(result.is_denied());
        let trail = result.trail().unwrap();
        assert_eq!(trail.ace, AceMatch::NoMatchingAce);
        assert_eq!(trail.acl, Acl::new().with(Ace::allow("editors", "edit")));
    }

    #[test]
    fn test_inheriting_exhausted_reports_default_deny() {
        let root = Node::new("root", Some(Acl::new().with(Ace::allow(AUTHENTICATED, "view"))));
        let ctx = Node::new("leaf", Some(Acl::new())).under(root);
        let result = AclAuthorizationPolicy::inheriting().permits(&ctx, &principals(&[]), "view");
        assert!(result.is_denied());
        let trail = result.trail().unwrap();
        assert_eq!(trail.ace, AceMatch::NoMatchingAce);
        assert_eq!(trail.searched.len(), 1);
        assert!(result.msg().contains("<default deny>"));
    }

    #[test]
    fn test_no_acl_anywhere() {
        let ctx = Node::new("leaf", None).under(Node::new("root", None));
        let result = AclAuthorizationPolicy::inheriting().permits(&ctx, &principals(&["bob"]), "view");
        assert!(result.is_denied());
        assert_eq!(result.trail().unwrap().ace, AceMatch::NoAcl);
        assert!(result.trail().unwrap().acl.is_empty());
    }

    #[test]
    fn test_principals_allowed_same_node_deny() {
        let ctx = Node::new(
            "doc",
            Some(Acl::new().with(Ace::allow("g1", "view")).with(Ace::deny("bob", "view"))),
        );
        let allowed = AclAuthorizationPolicy::local().principals_allowed_by_permission(&ctx, "view").unwrap();
        assert!(allowed.contains("g1"));
        assert!(!allowed.contains("bob"));
    }

    #[test]
    fn test_principals_allowed_closer_deny_overrides() {
        let root = Node::new(
            "root",
            Some(Acl::new().with(Ace::allow("bob", "view")).with(Ace::allow("alice", "view"))),
        );
        let ctx = Node::new("leaf", Some(Acl::new().with(Ace::deny("bob", "view")))).under(root);
        let allowed = AclAuthorizationPolicy::inheriting()
            .principals_allowed_by_permission(&ctx, "view")
            .unwrap();
        assert_eq!(allowed, Principals::from([Principal::from("alice")]));
    }

    #[test]
    fn test_principals_allowed_deny_everyone_clears_ancestors() {
        let root = Node::new("root", Some(Acl::new().with(Ace::allow("alice", "view"))));
        let ctx = Node::new(
            "leaf",
            Some(Acl::new().with(Ace::allow("admin", ALL_PERMISSIONS)).with(DENY_ALL)),
        )
        .under(root);
        let allowed = AclAuthorizationPolicy::inheriting()
            .principals_allowed_by_permission(&ctx, "view")
            .unwrap();
        assert_eq!(allowed, Principals::from([Principal::from("admin")]));
    }

    #[test]
    fn test_principals_allowed_nearest_stops_at_first_acl() {
        let root = Node::new("root", Some(Acl::new().with(Ace::allow("alice", "view"))));
        let mid = Node::new("mid", Some(Acl::new().with(Ace::allow("editors", "edit")))).under(root);
        let ctx = Node::new("leaf", None).under(mid);
        let nearest = AclAuthorizationPolicy::new(AclWalk::Nearest);
        assert!(nearest.principals_allowed_by_permission(&ctx, "view").unwrap().is_empty());
        assert_eq!(
            nearest.principals_allowed_by_permission(&ctx, "edit").unwrap(),
            Principals::from([Principal::from("editors")])
        );
        assert_eq!(
            AclAuthorizationPolicy::inheriting()
                .principals_allowed_by_permission(&ctx, "view")
                .unwrap(),
            Principals::from([Principal::from("alice")])
        );
    }

    #[test]
    fn test_principals_allowed_local_ignores_parent() {
        let root = Node::new("root", Some(Acl::new().with(Ace::allow("alice", "view"))));
        let ctx = Node::new("leaf", None).under(root);
        let allowed = AclAuthorizationPolicy::local().principals_allowed_by_permission(&ctx, "view").unwrap();
        assert!(allowed.is_empty());
    }
}
