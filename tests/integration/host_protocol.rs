//! Host protocol sessions driving a full generation

use serde_json::{json, Value};
use shieldgen::config::GeneratorSettings;
use shieldgen::host::{serve, HostSession, RpcResponse, GENERATION_FAILED, PARSE_ERROR};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::integration::{current_dmmf, legacy_dmmf, project_layout, user_post_shield};

fn generate_request(id: u64, root: &Path, dmmf: Value, client_version: Option<&str>) -> Value {
    let mut config = json!({ "contextPath": "../src/context.ts" });
    if let Some(version) = client_version {
        config["clientVersion"] = json!(version);
    }
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "generate",
        "params": {
            "generator": {
                "name": "trpc_shield",
                "provider": { "value": "shieldgen", "fromEnvVar": null },
                "output": { "value": root.join("prisma/generated"), "fromEnvVar": null },
                "config": config,
                "binaryTargets": [],
                "previewFeatures": []
            },
            "otherGenerators": [
                {
                    "name": "client",
                    "provider": { "value": "prisma-client-js", "fromEnvVar": null },
                    "config": {}
                }
            ],
            "schemaPath": root.join("prisma/schema.prisma"),
            "dmmf": dmmf,
            "datasources": []
        }
    })
}

fn session_output(session: &HostSession, requests: &[Value]) -> Vec<RpcResponse> {
    let input: String = requests.iter().map(|r| format!("{}\n", r)).collect();
    let mut output = Vec::new();
    serve(session, input.as_bytes(), &mut output).unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_manifest_then_generate() {
    let root = TempDir::new().unwrap();
    project_layout(&root);
    let session = HostSession::default();

    let responses = session_output(
        &session,
        &[
            json!({ "jsonrpc": "2.0", "id": 1, "method": "getManifest", "params": {} }),
            generate_request(2, root.path(), current_dmmf(&["User", "Post"]), None),
        ],
    );

    assert_eq!(responses.len(), 2);
    let manifest = &responses[0].result.as_ref().unwrap()["manifest"];
    assert_eq!(manifest["defaultOutput"], "./generated");
    assert_eq!(manifest["prettyName"], "Prisma tRPC Shield Generator");
    assert_eq!(manifest["requiresGenerators"], json!(["prisma-client-js"]));

    assert_eq!(responses[1].id, json!(2));
    assert!(responses[1].error.is_none(), "{:?}", responses[1].error);
    assert_eq!(
        fs::read_to_string(root.path().join("prisma/generated/shield.ts")).unwrap(),
        user_post_shield("../../src/context")
    );
}

#[test]
fn test_client_version_selects_legacy_table() {
    let root = TempDir::new().unwrap();
    project_layout(&root);
    let session = HostSession::default();

    let responses = session_output(
        &session,
        &[generate_request(1, root.path(), legacy_dmmf(&["User"]), Some("4.16.2"))],
    );
    assert!(responses[0].error.is_none());
    let text = fs::read_to_string(root.path().join("prisma/generated/shield.ts")).unwrap();
    assert!(text.contains("    createUser: allow,\n"));
}

#[test]
fn test_installed_client_package_selects_legacy_table() {
    let root = TempDir::new().unwrap();
    project_layout(&root);
    let client = root.path().join("node_modules/@prisma/client");
    fs::create_dir_all(&client).unwrap();
    fs::write(
        client.join("package.json"),
        r#"{"name":"@prisma/client","version":"4.16.2"}"#,
    )
    .unwrap();
    let session = HostSession::default();

    // Both vocabularies appear, so only the installed version can pick the table.
    let dmmf = crate::integration::dmmf_with_kinds(&["User"], &["findMany", "create", "createOne"]);
    let responses = session_output(&session, &[generate_request(1, root.path(), dmmf, None)]);
    assert!(responses[0].error.is_none(), "{:?}", responses[0].error);

    let text = fs::read_to_string(root.path().join("prisma/generated/shield.ts")).unwrap();
    assert!(text.contains("    createUser: allow,\n"));
    assert!(!text.contains("createOneUser"));
}

#[test]
fn test_unversioned_legacy_description_keeps_mutations() {
    let root = TempDir::new().unwrap();
    project_layout(&root);
    let session = HostSession::default();

    let responses = session_output(
        &session,
        &[generate_request(1, root.path(), legacy_dmmf(&["User"]), None)],
    );
    assert!(responses[0].error.is_none(), "{:?}", responses[0].error);
    let text = fs::read_to_string(root.path().join("prisma/generated/shield.ts")).unwrap();
    assert!(text.contains("    upsertUser: allow,\n"));
}

#[test]
fn test_generation_failure_reports_stage() {
    let root = TempDir::new().unwrap();
    project_layout(&root);
    let session = HostSession::default();

    let mut request = generate_request(9, root.path(), current_dmmf(&["User"]), None);
    request["params"]["otherGenerators"] = json!([]);
    let responses = session_output(&session, &[request]);

    let error = responses[0].error.as_ref().unwrap();
    assert_eq!(error.code, GENERATION_FAILED);
    assert_eq!(error.data, Some(json!({ "stage": "configuration" })));
    assert!(error.message.contains("companion client generator"));
    assert!(!root.path().join("prisma/generated").exists());
}

#[test]
fn test_settings_supply_missing_context_path() {
    let root = TempDir::new().unwrap();
    project_layout(&root);
    let session = HostSession::new(GeneratorSettings {
        context_path: Some("../src/context.ts".into()),
        ..GeneratorSettings::default()
    });

    let mut request = generate_request(3, root.path(), current_dmmf(&["User"]), None);
    request["params"]["generator"]["config"] = json!({});
    let responses = session_output(&session, &[request]);
    assert!(responses[0].error.is_none(), "{:?}", responses[0].error);
    assert!(root.path().join("prisma/generated/shield.ts").exists());
}

#[test]
fn test_session_keeps_serving_after_a_bad_line() {
    let session = HostSession::default();
    let input = "garbage\n{\"jsonrpc\":\"2.0\",\"id\":4,\"method\":\"getManifest\"}\n";
    let mut output = Vec::new();
    serve(&session, input.as_bytes(), &mut output).unwrap();

    let responses: Vec<RpcResponse> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].error.as_ref().unwrap().code, PARSE_ERROR);
    assert_eq!(responses[1].id, json!(4));
    assert!(responses[1].result.is_some());
}
