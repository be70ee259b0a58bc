use std::sync::{Arc, Once};

use warden_core::policy::{
    AclAuthorizationPolicy, AuthenticationPolicy, AuthorizationPolicy, Credentials, RemoteUserAuthenticationPolicy,
};
use warden_core::testing::{DummyAuthenticationPolicy, DummyRequest, DummyResource};
use warden_core::view::{ViewPermission, ViewPermissions};
use warden_core::{
    Ace, AceMatch, Acl, PermitsResult, Principal, Principals, Request, Resource, Security, SecurityError,
    ALL_PERMISSIONS, DENY_ALL, EVERYONE,
};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// root: editors may edit, everyone may view
///   folder: bob is denied view
///     doc: no ACL of its own
fn site() -> DummyResource {
    let root = Arc::new(
        DummyResource::new("root").with_acl(
            Acl::new()
                .with(Ace::allow("group:editors", vec!["view", "edit"]))
                .with(Ace::allow(EVERYONE, "view")),
        ),
    );
    let folder = Arc::new(
        DummyResource::new("folder")
            .with_acl(Acl::new().with(Ace::deny("bob", "view")))
            .with_parent(root),
    );
    DummyResource::new("doc").with_parent(folder)
}

#[test]
fn test_no_authentication_policy_allows_any_permission() {
    init_tracing();
    let security = Security::new().with_authorization(AclAuthorizationPolicy::local());
    for permission in ["view", "edit", "", "anything"] {
        let result = security.has_permission(permission, &site(), &DummyRequest::new()).unwrap();
        assert!(result.is_allowed());
        assert!(result.msg().contains("No authentication policy"));
    }
}

#[test]
fn test_authentication_without_authorization_is_configuration_error() {
    init_tracing();
    let security = Security::new().with_authentication(DummyAuthenticationPolicy::user("fred"));
    match security.has_permission("view", &site(), &DummyRequest::new()) {
        Err(SecurityError::Configuration(msg)) => assert!(msg.contains("without authorization")),
        other => panic!("expected configuration error, got {:?}", other),
    }
}

#[test]
fn test_inheriting_policy_reaches_root_grant() {
    init_tracing();
    let security = Security::remote_user_inheriting_acl();
    let result = security.has_permission("view", &site(), &DummyRequest::remote_user("fred")).unwrap();
    assert!(matches!(result, PermitsResult::AclAllowed(_)));
    let trail = result.trail().unwrap();
    assert_eq!(trail.ace, AceMatch::Entry(Ace::allow(EVERYONE, "view")));
    assert_eq!(trail.context, "doc");
    assert_eq!(trail.location.as_deref(), Some("root"));
    assert_eq!(trail.searched.len(), 2);
    assert!(trail.principals.contains("fred"));
    assert!(trail.principals.contains("system.Authenticated"));
}

#[test]
fn test_closer_deny_beats_root_allow() {
    init_tracing();
    let security = Security::remote_user_inheriting_acl();
    let result = security.has_permission("view", &site(), &DummyRequest::remote_user("bob")).unwrap();
    assert!(matches!(result, PermitsResult::AclDenied(_)));
    assert_eq!(result.trail().unwrap().ace, AceMatch::Entry(Ace::deny("bob", "view")));
    assert_eq!(result.trail().unwrap().location.as_deref(), Some("folder"));
}

#[test]
fn test_non_inheriting_policy_needs_local_acl() {
    init_tracing();
    let security = Security::remote_user_acl();
    let result = security.has_permission("view", &site(), &DummyRequest::remote_user("fred")).unwrap();
    assert!(matches!(result, PermitsResult::AclDenied(_)));
    assert_eq!(result.trail().unwrap().ace, AceMatch::NoAcl);
    assert!(result.msg().contains("No ACL found"));
}

#[test]
fn test_group_membership_grants_edit() {
    init_tracing();
    let security = Security::inheriting_acl(DummyAuthenticationPolicy::user("wilma").with_groups(["group:editors"]));
    assert!(security.has_permission("edit", &site(), &DummyRequest::new()).unwrap().is_allowed());
    assert!(security.has_permission("delete", &site(), &DummyRequest::new()).unwrap().is_denied());
}

#[test]
fn test_anonymous_dummy_policy_holds_only_everyone() {
    let security = Security::inheriting_acl(DummyAuthenticationPolicy::anonymous());
    assert_eq!(security.authenticated_userid(&site(), &DummyRequest::new()), None);
    assert_eq!(
        security.effective_principals(&site(), &DummyRequest::new()),
        Principals::from([EVERYONE])
    );
}

#[test]
fn test_remember_and_forget_pass_through() {
    let security = Security::inheriting_acl(DummyAuthenticationPolicy::user("fred"));
    let mut credentials = Credentials::new();
    credentials.insert("password".to_string(), serde_json::json!("123"));
    let headers = security.remember(&site(), &DummyRequest::new(), &Principal::from("chrism"), &credentials);
    assert_eq!(headers, vec![("X-Remember".to_string(), "chrism".to_string())]);
    let headers = security.forget(&site(), &DummyRequest::new());
    assert_eq!(headers, vec![("X-Forget".to_string(), "fred".to_string())]);
}

#[test]
fn test_principals_allowed_by_permission_through_facade() {
    let security = Security::remote_user_inheriting_acl();
    let allowed = security.principals_allowed_by_permission(&site(), "view").unwrap();
    assert_eq!(
        allowed,
        Principals::from([Principal::from("group:editors"), EVERYONE])
    );
    let allowed = security.principals_allowed_by_permission(&site(), "edit").unwrap();
    assert_eq!(allowed, Principals::from([Principal::from("group:editors")]));
}

#[derive(Debug)]
struct OpaquePolicy;

impl AuthorizationPolicy for OpaquePolicy {
    fn permits(&self, _context: &dyn Resource, principals: &Principals, _permission: &str) -> PermitsResult {
        if principals.contains("root") {
            PermitsResult::allowed("root may do anything")
        } else {
            PermitsResult::denied("only root")
        }
    }
}

#[test]
fn test_not_implemented_is_distinct_from_empty() {
    let security = Security::new()
        .with_authentication(DummyAuthenticationPolicy::user("root"))
        .with_authorization(OpaquePolicy);
    assert!(matches!(
        security.principals_allowed_by_permission(&site(), "view"),
        Err(SecurityError::NotImplemented { .. })
    ));
    let result = security.has_permission("view", &site(), &DummyRequest::new()).unwrap();
    assert_eq!(result, PermitsResult::allowed("root may do anything"));
}

#[derive(Debug)]
struct ClosedOnSundays;

impl ViewPermission for ClosedOnSundays {
    fn check(
        &self,
        _security: &Security,
        _context: &dyn Resource,
        request: &dyn Request,
    ) -> Result<PermitsResult, SecurityError> {
        Ok(match request.environ("DAY") {
            Some("sunday") => PermitsResult::denied("closed on sundays"),
            _ => PermitsResult::allowed("open"),
        })
    }
}

#[test]
fn test_view_execution_permitted() {
    init_tracing();
    let views = ViewPermissions::new()
        .protect("edit", "edit")
        .register("shop", ClosedOnSundays);
    let security = Security::remote_user_inheriting_acl().with_views(views);

    let result = security
        .view_execution_permitted(&site(), &DummyRequest::remote_user("fred"), "")
        .unwrap();
    assert!(result.is_allowed());
    assert!(result.msg().contains("no permission defined"));

    assert!(security
        .view_execution_permitted(&site(), &DummyRequest::remote_user("fred"), "edit")
        .unwrap()
        .is_denied());

    let sunday = DummyRequest::new().with_environ("DAY", "sunday");
    assert!(security.view_execution_permitted(&site(), &sunday, "shop").unwrap().is_denied());
}

#[test]
fn test_policies_share_across_threads() {
    let security = Arc::new(Security::remote_user_inheriting_acl());
    let doc = Arc::new(
        DummyResource::new("doc").with_acl(Acl::new().with(Ace::allow("admin", ALL_PERMISSIONS)).with(DENY_ALL)),
    );
    let handles: Vec<_> = ["admin", "bob", "admin", "carol"]
        .into_iter()
        .map(|user| {
            let security = Arc::clone(&security);
            let doc = Arc::clone(&doc);
            std::thread::spawn(move || {
                security
                    .has_permission("edit", doc.as_ref(), &DummyRequest::remote_user(user))
                    .map(|r| r.is_allowed())
            })
        })
        .collect();
    let outcomes: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();
    assert_eq!(outcomes, vec![true, false, true, false]);
}

#[test]
fn test_remote_user_policy_trait_object() {
    let policy: Box<dyn AuthenticationPolicy> =
        Box::new(RemoteUserAuthenticationPolicy::new().with_callback(|userid, _| {
            (userid.as_str() == "fred").then(|| vec![Principal::from("group:editors")])
        }));
    let principals = policy.effective_principals(&site(), &DummyRequest::remote_user("fred"));
    assert!(principals.contains("group:editors"));
}
