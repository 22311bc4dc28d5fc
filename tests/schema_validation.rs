use anyhow::Result;
use serde_json::json;

use gatewarden::{SchemaDocument, SchemaError, ValidatedSchema};

fn load(raw: serde_json::Value) -> Result<ValidatedSchema, SchemaError> {
    ValidatedSchema::load(SchemaDocument::from_json_value(raw)?)
}

#[test]
fn valid_schema_builds_indices() -> Result<()> {
    let schema = load(json!({
        "permissions": [
            {"name": "readFile", "description": "Read files", "contextDimensions": ["workspace"]},
            {"name": "manageWorkbench", "contextDimensions": ["workspace", "workbench"]}
        ],
        "roles": [
            {"name": "viewer", "permissions": ["readFile"]},
            {
                "name": "workspaceAdmin",
                "permissions": ["manageWorkbench"],
                "inheritsFrom": ["viewer"],
                "attributes": {"tier": "admin"}
            }
        ]
    }))?;

    assert!(schema.permission("readFile").is_some());
    assert!(schema.permission("nope").is_none());
    let admin = schema.role("workspaceAdmin").unwrap();
    assert_eq!(admin.inherits_from, vec!["viewer".to_string()]);
    assert_eq!(admin.attributes["tier"], json!("admin"));
    assert!(schema.has_dimension("workbench"));
    assert!(!schema.has_dimension("user"));
    Ok(())
}

#[test]
fn duplicate_permission_is_rejected() {
    let err = load(json!({
        "permissions": [{"name": "read"}, {"name": "read"}],
        "roles": []
    }))
    .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicatePermission(name) if name == "read"));
}

#[test]
fn duplicate_role_is_rejected() {
    let err = load(json!({
        "permissions": [],
        "roles": [{"name": "viewer"}, {"name": "viewer"}]
    }))
    .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateRole(name) if name == "viewer"));
}

#[test]
fn unknown_permission_reference_is_rejected() {
    let err = load(json!({
        "permissions": [{"name": "read"}],
        "roles": [{"name": "viewer", "permissions": ["read", "write"]}]
    }))
    .unwrap_err();
    match err {
        SchemaError::UnknownPermission { role, permission } => {
            assert_eq!(role, "viewer");
            assert_eq!(permission, "write");
        }
        other => panic!("expected UnknownPermission, got {other:?}"),
    }
}

#[test]
fn unknown_parent_is_rejected() {
    let err = load(json!({
        "permissions": [],
        "roles": [{"name": "editor", "inheritsFrom": ["ghost"]}]
    }))
    .unwrap_err();
    match err {
        SchemaError::UnknownParent { role, parent } => {
            assert_eq!(role, "editor");
            assert_eq!(parent, "ghost");
        }
        other => panic!("expected UnknownParent, got {other:?}"),
    }
}

#[test]
fn two_role_cycle_is_named_deterministically() {
    let raw = json!({
        "permissions": [],
        "roles": [
            {"name": "a", "inheritsFrom": ["b"]},
            {"name": "b", "inheritsFrom": ["a"]}
        ]
    });

    let first = load(raw.clone()).unwrap_err();
    let cycle = first.cycle().expect("cycle error").to_vec();
    assert_eq!(cycle.len(), 2);
    assert!(cycle.contains(&"a".to_string()) && cycle.contains(&"b".to_string()));

    // same schema must report the same cycle every time
    for _ in 0..20 {
        let err = load(raw.clone()).unwrap_err();
        assert_eq!(err.cycle().unwrap(), cycle.as_slice());
    }
}

#[test]
fn self_inheritance_is_a_cycle() {
    let err = load(json!({
        "permissions": [],
        "roles": [{"name": "ouroboros", "inheritsFrom": ["ouroboros"]}]
    }))
    .unwrap_err();
    assert_eq!(err.cycle().unwrap(), ["ouroboros".to_string()]);
}

#[test]
fn longer_cycle_reports_only_loop_members() {
    // entry -> a -> b -> c -> a: the cycle is [a, b, c], entry is not part of it
    let err = load(json!({
        "permissions": [],
        "roles": [
            {"name": "entry", "inheritsFrom": ["a"]},
            {"name": "a", "inheritsFrom": ["b"]},
            {"name": "b", "inheritsFrom": ["c"]},
            {"name": "c", "inheritsFrom": ["a"]}
        ]
    }))
    .unwrap_err();
    let cycle = err.cycle().unwrap();
    assert_eq!(cycle.len(), 3);
    assert!(!cycle.contains(&"entry".to_string()));
}

#[test]
fn parse_error_reports_json_path() {
    let err = SchemaDocument::from_json_str(r#"{"permissions": [{"name": 42}]}"#).unwrap_err();
    match err {
        SchemaError::Parse { path, .. } => assert!(
            path.contains("permissions"),
            "path should point into permissions, got `{path}`"
        ),
        other => panic!("expected Parse, got {other:?}"),
    }
}

#[test]
fn loads_schema_from_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("schema.json");
    std::fs::write(
        &path,
        json!({
            "permissions": [{"name": "read", "contextDimensions": ["workspace"]}],
            "roles": [{"name": "viewer", "permissions": ["read"]}]
        })
        .to_string(),
    )?;

    let schema = ValidatedSchema::load(SchemaDocument::from_json_file(&path)?)?;
    assert!(schema.role("viewer").is_some());
    Ok(())
}

#[test]
fn missing_file_is_a_load_error() {
    let err = SchemaDocument::from_json_file("/nonexistent/schema.json").unwrap_err();
    assert!(matches!(err, SchemaError::Load(_)));
}
