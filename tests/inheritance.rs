use std::sync::Arc;

use anyhow::Result;
use serde_json::json;

use gatewarden::engine::InheritanceResolver;
use gatewarden::{SchemaDocument, ValidatedSchema};

fn resolver(raw: serde_json::Value) -> Result<InheritanceResolver> {
    let schema = ValidatedSchema::load(SchemaDocument::from_json_value(raw)?)?;
    Ok(InheritanceResolver::new(Arc::new(schema)))
}

fn portal_schema() -> serde_json::Value {
    json!({
        "permissions": [
            {"name": "readFile", "contextDimensions": ["workspace"]},
            {"name": "writeFile", "contextDimensions": ["workspace"]},
            {"name": "manageWorkbench", "contextDimensions": ["workspace", "workbench"]},
            {"name": "manageUsers", "contextDimensions": ["user"]}
        ],
        "roles": [
            {"name": "viewer", "permissions": ["readFile"]},
            {"name": "editor", "permissions": ["writeFile"], "inheritsFrom": ["viewer"]},
            {"name": "benchOperator", "permissions": ["manageWorkbench"], "inheritsFrom": ["viewer"]},
            // diamond: admin reaches viewer through both editor and benchOperator
            {"name": "workspaceAdmin", "permissions": [], "inheritsFrom": ["editor", "benchOperator"]},
            {"name": "portalAdmin", "permissions": ["manageUsers"], "inheritsFrom": ["workspaceAdmin"]}
        ]
    })
}

#[test]
fn closure_contains_direct_permissions_and_every_parent_closure() -> Result<()> {
    let resolver = resolver(portal_schema())?;
    let schema = Arc::clone(resolver.schema());

    for name in schema.role_names() {
        let role = schema.role(name).unwrap();
        let resolved = resolver.resolve(name)?;

        for direct in &role.permissions {
            assert!(resolved.contains(direct), "{name} must keep direct grant {direct}");
        }
        for parent in &role.inherits_from {
            let parent_resolved = resolver.resolve(parent)?;
            assert!(
                parent_resolved.is_subset(&resolved),
                "{name} must contain everything {parent} resolves to"
            );
        }
    }
    Ok(())
}

#[test]
fn diamond_inheritance_deduplicates() -> Result<()> {
    let resolver = resolver(portal_schema())?;
    let admin = resolver.resolve("workspaceAdmin")?;
    assert_eq!(admin.len(), 3);
    assert!(admin.contains("readFile"));
    assert!(admin.contains("writeFile"));
    assert!(admin.contains("manageWorkbench"));
    Ok(())
}

#[test]
fn deep_chain_resolves_to_the_root() -> Result<()> {
    let resolver = resolver(portal_schema())?;
    let portal = resolver.resolve("portalAdmin")?;
    assert!(portal.contains("readFile"), "grant four levels down must surface");
    assert!(portal.contains("manageUsers"));
    assert_eq!(portal.len(), 4);
    Ok(())
}

#[test]
fn role_without_parents_resolves_to_direct_grants_only() -> Result<()> {
    let resolver = resolver(portal_schema())?;
    let viewer = resolver.resolve("viewer")?;
    assert_eq!(viewer.iter().collect::<Vec<_>>(), vec!["readFile"]);
    Ok(())
}

#[test]
fn repeated_resolution_is_memoized() -> Result<()> {
    let resolver = resolver(portal_schema())?;
    let first = resolver.resolve("portalAdmin")?;
    let second = resolver.resolve("portalAdmin")?;
    assert!(Arc::ptr_eq(&first, &second), "second lookup must hit the memo");
    Ok(())
}
