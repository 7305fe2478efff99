use super::*;
use serde_json::{json, Value as JsonValue};
// Tests for JSON roundtrips of CallRecord and ExprNode plus stable ids.

fn meta(line: usize) -> Meta {
    Meta {
        file: "app/models/user.rb".into(),
        line,
        column: 3,
    }
}

#[test]
fn call_record_serialization_preserves_meta() {
    let record = CallRecord {
        id: 7,
        method: "digest".into(),
        target: Some("Digest::MD5".into()),
        arguments: vec![],
        chain: vec!["Digest".into(), "MD5".into()],
        nested: true,
        meta: meta(12),
    };

    let json = serde_json::to_string(&record).unwrap();
    let v: JsonValue = serde_json::from_str(&json).unwrap();
    assert_eq!(v["meta"]["file"], "app/models/user.rb");
    assert_eq!(v["meta"]["line"], 12);
    assert_eq!(v["meta"]["column"], 3);

    let deser: CallRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(deser.method, "digest");
    assert_eq!(deser.target.as_deref(), Some("Digest::MD5"));
    assert_eq!(deser.chain, vec!["Digest".to_string(), "MD5".to_string()]);
    assert!(deser.nested);
    assert_eq!(deser.meta, record.meta);
}

#[test]
fn call_record_deserialization_fails_without_method() {
    let json = r#"{"target":"Digest::MD5","meta":{"file":"a.rb","line":1,"column":1}}"#;
    assert!(serde_json::from_str::<CallRecord>(json).is_err());
}

#[test]
fn call_record_optional_fields_default() {
    let json = r#"{"method":"open","meta":{"file":"a.rb","line":1,"column":1}}"#;
    let record: CallRecord = serde_json::from_str(json).unwrap();
    assert_eq!(record.id, 0);
    assert!(record.target.is_none());
    assert!(record.arguments.is_empty());
    assert!(record.chain.is_empty());
    assert!(!record.nested);
}

#[test]
fn file_calls_push_assigns_stable_ids() {
    let mut calls = FileCalls::new("app/models/user.rb".into(), "ruby".into());
    for line in [1, 2] {
        calls.push(CallRecord {
            id: 0,
            method: "digest".into(),
            target: None,
            arguments: vec![],
            chain: vec![],
            nested: false,
            meta: meta(line),
        });
    }
    assert_ne!(calls.records[0].id, 0);
    assert_ne!(calls.records[1].id, 0);
    assert_ne!(calls.records[0].id, calls.records[1].id);
}

#[test]
fn file_calls_push_keeps_explicit_ids() {
    let mut calls = FileCalls::new("a.rb".into(), "ruby".into());
    calls.push(CallRecord {
        id: 99,
        method: "open".into(),
        target: None,
        arguments: vec![],
        chain: vec![],
        nested: false,
        meta: meta(1),
    });
    assert_eq!(calls.records[0].id, 99);
}

#[test]
fn stable_id_is_deterministic() {
    let a = stable_id("a.rb", 3, 7, "digest");
    let b = stable_id("a.rb", 3, 7, "digest");
    assert_eq!(a, b);
    assert_ne!(a, stable_id("a.rb", 3, 8, "digest"));
    assert_ne!(a, stable_id("a.rb", 3, 7, "hexdigest"));
}

#[test]
fn expr_node_defaults_and_name() {
    let json = r#"{"kind":"LocalVar","value":"password","meta":{"file":"a.rb","line":1,"column":1}}"#;
    let node: ExprNode = serde_json::from_str(json).unwrap();
    assert_eq!(node.kind, ExprKind::LocalVar);
    assert!(node.children.is_empty());
    assert!(!node.user_input);
    assert_eq!(node.name(), Some("password"));

    let literal = ExprNode::new(ExprKind::Literal, json!(42), vec![], meta(1));
    assert_eq!(literal.name(), None);
}

#[test]
fn expr_node_deserialization_fails_on_unknown_kind() {
    let json = r#"{"kind":"Lambda","value":null,"meta":{"file":"a.rb","line":1,"column":1}}"#;
    assert!(serde_json::from_str::<ExprNode>(json).is_err());
}
