#![no_main]

// Harness: acl_permits
// Focus: first-match-wins agreement between permits() and the raw ACL, and
// consistency of principals_allowed_by_permission() with permits() under
// every walk, and lossless JSON for the ACLs that were consulted.

use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use warden_core::policy::{AclAuthorizationPolicy, AclWalk, AuthorizationPolicy};
use warden_core::testing::DummyResource;
use warden_core::{Ace, AceMatch, Acl, Action, PermissionSpec, Principal, Principals, ALL_PERMISSIONS};

const NAMES: &[&str] = &["system.Everyone", "system.Authenticated", "alice", "bob", "g1"];
const PERMS: &[&str] = &["view", "edit", "", "ALL_PERMISSIONS"];

#[derive(Arbitrary, Debug)]
struct RawAce {
    allow: bool,
    principal: u8,
    perms: Vec<u8>,
    all: bool,
}

#[derive(Arbitrary, Debug)]
struct Frame {
    levels: Vec<Option<Vec<RawAce>>>,
    held: Vec<u8>,
    permission: u8,
    walk: u8,
}

fn name(i: u8) -> &'static str {
    NAMES[i as usize % NAMES.len()]
}

fn perm(i: u8) -> &'static str {
    PERMS[i as usize % PERMS.len()]
}

fn ace(raw: &RawAce) -> Ace {
    let permissions = if raw.all {
        PermissionSpec::from(ALL_PERMISSIONS)
    } else {
        PermissionSpec::from(raw.perms.iter().map(|p| perm(*p)).collect::<Vec<_>>())
    };
    let action = if raw.allow { Action::Allow } else { Action::Deny };
    Ace::new(action, name(raw.principal), permissions)
}

fuzz_target!(|frame: Frame| {
    let mut node: Option<Arc<DummyResource>> = None;
    for (depth, level) in frame.levels.iter().take(16).enumerate() {
        let mut resource = DummyResource::new(format!("n{}", depth));
        if let Some(raw) = level {
            resource = resource.with_acl(raw.iter().map(ace).collect::<Acl>());
        }
        if let Some(parent) = node.take() {
            resource = resource.with_parent(parent);
        }
        node = Some(Arc::new(resource));
    }
    let Some(context) = node else { return };

    let walk = match frame.walk % 3 {
        0 => AclWalk::Local,
        1 => AclWalk::Nearest,
        _ => AclWalk::Inherit,
    };
    let policy = AclAuthorizationPolicy::new(walk);
    let principals: Principals = frame.held.iter().map(|i| Principal::from(name(*i))).collect();
    let permission = perm(frame.permission);

    let result = policy.permits(context.as_ref(), &principals, permission);
    let trail = result.trail().expect("ACL policies always return a trail");
    match &trail.ace {
        AceMatch::Entry(ace) => {
            assert!(ace.matches(&principals, permission));
            assert_eq!(result.is_allowed(), ace.action == Action::Allow);
        }
        AceMatch::NoMatchingAce | AceMatch::NoAcl => assert!(result.is_denied()),
    }
    let _ = result.msg();

    let allowed = policy
        .principals_allowed_by_permission(context.as_ref(), permission)
        .expect("ACL policies enumerate grants");
    for principal in allowed {
        let single = Principals::from([principal]);
        assert!(policy.permits(context.as_ref(), &single, permission).is_allowed());
    }

    for acl in trail.searched.iter() {
        let encoded = serde_json::to_vec(acl).expect("built ACLs serialize");
        let decoded: Acl = serde_json::from_slice(&encoded).expect("serialized ACLs parse");
        assert_eq!(&decoded, acl);
        assert_eq!(decoded.first_match(&principals, permission), acl.first_match(&principals, permission));
    }
});
