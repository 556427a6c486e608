//! Output directory replacement across runs

use shieldgen::generation::{GenerationConfig, Generator};
use shieldgen::model::{DmmfValueSource, ProviderIdentity};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::integration::{current_dmmf, dmmf_with_kinds, project_layout};

fn run(root: &Path, dmmf: serde_json::Value) -> shieldgen::generation::GenerationReport {
    let generator = Generator::new(GenerationConfig::new(
        "../src/context.ts",
        root.join("prisma/generated"),
        root.join("prisma"),
    ));
    let source = DmmfValueSource::new(
        dmmf,
        Some(ProviderIdentity::new("prisma-client-js", None)),
    );
    generator.run(&source).unwrap()
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_removed_model_leaves_no_operations_behind() {
    let root = TempDir::new().unwrap();
    project_layout(&root);
    let shield = root.path().join("prisma/generated/shield.ts");

    run(root.path(), current_dmmf(&["User", "Post"]));
    assert!(fs::read_to_string(&shield).unwrap().contains("findManyPost"));

    run(root.path(), current_dmmf(&["User"]));
    let text = fs::read_to_string(&shield).unwrap();
    assert!(!text.contains("Post"));
    assert!(text.contains("findManyUser: allow"));
}

#[test]
fn test_stale_artifacts_are_removed() {
    let root = TempDir::new().unwrap();
    project_layout(&root);
    let out = root.path().join("prisma/generated");
    fs::create_dir_all(out.join("nested/deeper")).unwrap();
    fs::write(out.join("old-shield.ts"), "stale").unwrap();
    fs::write(out.join("nested/deeper/file.ts"), "stale").unwrap();

    run(root.path(), current_dmmf(&["User"]));
    assert_eq!(entries(&out), vec!["shield.ts".to_string()]);
}

#[test]
fn test_no_operations_leaves_empty_directory() {
    let root = TempDir::new().unwrap();
    project_layout(&root);
    let out = root.path().join("prisma/generated");

    run(root.path(), current_dmmf(&["User"]));
    assert!(out.join("shield.ts").exists());

    // Only kinds no table knows about.
    let report = run(root.path(), dmmf_with_kinds(&["User"], &["findRaw", "aggregateRaw"]));
    assert!(report.output_path.is_none());
    assert_eq!(report.ignored, 2);
    assert!(out.is_dir());
    assert!(entries(&out).is_empty());
}

#[test]
fn test_empty_model_description_creates_empty_directory() {
    let root = TempDir::new().unwrap();
    project_layout(&root);
    let out = root.path().join("prisma/generated");

    let report = run(root.path(), current_dmmf(&[]));
    assert!(report.output_path.is_none());
    assert_eq!(report.models, 0);
    assert!(out.is_dir());
    assert!(entries(&out).is_empty());
}
