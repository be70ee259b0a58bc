#![no_main]

// Harness: acl_json
// Focus: ACL deserialization never panics, and accepted ACLs serialize back
// to something that parses to the same list.

use libfuzzer_sys::fuzz_target;
use warden_core::Acl;

fuzz_target!(|data: &[u8]| {
    let Ok(acl) = serde_json::from_slice::<Acl>(data) else { return };
    let encoded = serde_json::to_vec(&acl).expect("parsed ACLs serialize");
    let decoded: Acl = serde_json::from_slice(&encoded).expect("serialized ACLs parse");
    assert_eq!(acl, decoded);
});
