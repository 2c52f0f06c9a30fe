//! Integration tests for the policy pipeline

use super::*;
use crate::error::PolicyError;
use serde_json::json;

const ALICE: &str = "ddff64c5-1c16-4aaf-9d1b-07f2552831b1";
const BOB: &str = "0b6f1c7e-2f1a-4d7e-9c1a-7e7f3c2b9a10";

fn tenant_policy() -> Policy {
    let mut policy = Policy::new();

    // Everyone may list public documents
    policy.add_statement(Statement::new("GET", "/public"));

    // Users manage their own profile
    policy.add_statement(Statement::new("GET", "/user/${id}"));
    policy.add_statement(Statement::new("PUT", "/user/${id}"));

    // Org admins read the org, members only when verified
    policy.add_statement(
        Statement::new("GET", "/org/${org}")
            .with_restriction(Restriction::equals([("role", "admin")])),
    );
    policy.add_statement(
        Statement::new("GET", "/org/${org}")
            .with_restriction(Restriction::equals([
                ("role", AttributeValue::from("member")),
                ("verified", AttributeValue::from(true)),
            ])),
    );

    // Billing is restricted to one specific account
    policy.add_statement(
        Statement::new("DELETE", "/billing")
            .with_restriction(Restriction::equals([("user_id", ALICE)])),
    );

    policy
}

fn alice() -> DataContext {
    DataContext::new()
        .with("id", ALICE)
        .with("user_id", ALICE)
        .with("org", "acme")
        .with("role", "member")
        .with("verified", true)
}

#[test]
fn test_complex_policy_scenario() {
    let engine = PolicyEngine::default();
    let policy = tenant_policy();
    let data = alice();

    // Public
    assert!(engine.evaluate(&policy, &Context::new("GET", "/public"), &data).unwrap());

    // Own profile, not someone else's
    let own = format!("/user/{ALICE}");
    let other = format!("/user/{BOB}");
    assert!(engine.evaluate(&policy, &Context::new("GET", own.as_str()), &data).unwrap());
    assert!(engine.evaluate(&policy, &Context::new("PUT", own.as_str()), &data).unwrap());
    assert!(!engine.evaluate(&policy, &Context::new("GET", other.as_str()), &data).unwrap());
    assert!(!engine.evaluate(&policy, &Context::new("DELETE", own.as_str()), &data).unwrap());

    // Org membership via the second alternative
    assert!(engine.evaluate(&policy, &Context::new("GET", "/org/acme"), &data).unwrap());
    assert!(!engine.evaluate(&policy, &Context::new("GET", "/org/globex"), &data).unwrap());

    // Billing
    assert!(engine.evaluate(&policy, &Context::new("DELETE", "/billing"), &data).unwrap());
}

#[test]
fn test_alternatives_fail_together() {
    let engine = PolicyEngine::default();
    let policy = tenant_policy();

    let unverified = alice().with("verified", false);
    assert_eq!(
        engine
            .authorize(policy.statements(), &Context::new("GET", "/org/acme"), &unverified)
            .unwrap(),
        Decision::Deny(DenyReason::RestrictionFailed)
    );

    let admin = unverified.with("role", "admin");
    assert_eq!(
        engine
            .authorize(policy.statements(), &Context::new("GET", "/org/acme"), &admin)
            .unwrap(),
        Decision::Allow { matched: 2 }
    );
}

#[test]
fn test_stage_by_stage_matches_engine() {
    let policy = tenant_policy();
    let data = DataContext::new()
        .with("id", BOB)
        .with("user_id", BOB)
        .with("org", "acme")
        .with("role", "member")
        .with("verified", true);
    let context = Context::new("DELETE", "/billing");

    let encoded = encode(policy.statements(), &data).unwrap();
    let matched = resource(&encoded, &context).unwrap();
    assert_eq!(matched.len(), 1);
    assert!(!restriction(&matched, &data));

    let engine = PolicyEngine::default();
    assert!(!engine.evaluate(&policy, &context, &data).unwrap());
}

#[test]
fn test_policy_json_roundtrip_with_evaluation() {
    let policy_json = json!({
        "version": "2024-01-01",
        "statements": [
            { "action": "GET", "resource": "/user/${id}" },
            {
                "action": "GET",
                "resource": "/user",
                "restriction": { "equals": { "user_id": ALICE } }
            }
        ]
    });

    let policy = Policy::from_json(&policy_json.to_string()).unwrap();
    assert_eq!(policy.statements.len(), 2);

    let engine = PolicyEngine::default();
    let data = DataContext::from_json(&json!({ "id": ALICE, "user_id": ALICE })).unwrap();

    assert!(engine.evaluate(&policy, &Context::new("GET", "/user"), &data).unwrap());

    let bob = DataContext::from_json(&json!({ "id": BOB, "user_id": BOB })).unwrap();
    assert!(!engine.evaluate(&policy, &Context::new("GET", "/user"), &bob).unwrap());
    assert!(engine
        .evaluate(&policy, &Context::new("GET", format!("/user/{BOB}")), &bob)
        .unwrap());
}

#[test]
fn test_numeric_attribute_in_template_and_restriction() {
    let engine = PolicyEngine::default();
    let policy = Policy::from_statements(vec![Statement::new("GET", "/tier/${tier}/report")
        .with_restriction(Restriction::equals([("tier", 3i64)]))])
    .unwrap();

    let data = DataContext::from_json(&json!({ "tier": 3 })).unwrap();
    assert!(engine
        .evaluate(&policy, &Context::new("GET", "/tier/3/report"), &data)
        .unwrap());

    let stringly = DataContext::from_json(&json!({ "tier": "3" })).unwrap();
    assert!(!engine
        .evaluate(&policy, &Context::new("GET", "/tier/3/report"), &stringly)
        .unwrap());
}

#[test]
fn test_literal_placeholder_request_under_keep() {
    // Keeping unresolved tokens means a request for the literal pattern
    // matches. The strict policy turns the same request into an error.
    let statements = vec![Statement::new("GET", "/user/${id}")];
    let context = Context::new("GET", "/user/${id}");

    let lenient = PolicyEngine::default();
    assert!(lenient
        .authorize(&statements, &context, &DataContext::new())
        .unwrap()
        .is_allowed());

    let strict = PolicyEngine::new(crate::config::EngineConfig {
        unresolved_placeholders: UnresolvedPolicy::Fail,
        ..Default::default()
    });
    let err = strict
        .authorize(&statements, &context, &DataContext::new())
        .unwrap_err();
    assert_eq!(err.category(), crate::error::ErrorCategory::Input);
}

#[test]
fn test_statements_are_not_mutated() {
    let policy = tenant_policy();
    let before = policy.clone();

    let engine = PolicyEngine::default();
    for _ in 0..3 {
        engine
            .evaluate(&policy, &Context::new("GET", format!("/user/{ALICE}")), &alice())
            .unwrap();
    }

    assert_eq!(policy, before);
}

#[test]
fn test_invalid_policy_never_evaluates() {
    let err = Policy::from_json(r#"[{"action": "", "resource": "/x"}]"#).unwrap_err();
    assert!(matches!(err, PolicyError::InvalidStatement { index: 0, .. }));
}
