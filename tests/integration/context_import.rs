//! Context type import specifiers for different directory layouts

use shieldgen::error::{ConfigurationError, GeneratorError};
use shieldgen::generation::{resolve_import_specifier, GenerationConfig, Generator};
use shieldgen::model::{DmmfValueSource, ProviderIdentity};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::integration::current_dmmf;

fn generate(context: &str, output: &Path, schema_root: &Path) -> Result<String, GeneratorError> {
    let generator = Generator::new(GenerationConfig::new(context, output, schema_root));
    let source = DmmfValueSource::new(
        current_dmmf(&["User"]),
        Some(ProviderIdentity::new("prisma-client-js", None)),
    );
    generator.run(&source)?;
    Ok(fs::read_to_string(output.join("shield.ts")).unwrap())
}

fn import_line(text: &str) -> &str {
    text.lines().nth(1).unwrap()
}

#[test]
fn test_context_in_parent_of_output() {
    let root = TempDir::new().unwrap();
    let prisma = root.path().join("prisma");
    fs::create_dir_all(&prisma).unwrap();
    fs::write(prisma.join("context.ts"), "").unwrap();

    let text = generate("./context.ts", &prisma.join("generated"), &prisma).unwrap();
    assert_eq!(import_line(&text), "import { Context } from '../context';");
}

#[test]
fn test_context_next_to_output() {
    let root = TempDir::new().unwrap();
    let prisma = root.path().join("prisma");
    fs::create_dir_all(prisma.join("shared")).unwrap();

    // The sibling directory stays untouched by cleanup.
    let text = generate("shared/context.ts", &prisma.join("generated"), &prisma).unwrap();
    assert_eq!(import_line(&text), "import { Context } from '../shared/context';");
}

#[test]
fn test_context_two_levels_up_from_nested_output() {
    let root = TempDir::new().unwrap();
    let prisma = root.path().join("prisma");
    fs::create_dir_all(&prisma).unwrap();

    let text = generate(
        "../context.ts",
        &prisma.join("generated/trpc"),
        &prisma,
    )
    .unwrap();
    assert_eq!(import_line(&text), "import { Context } from '../../../context';");
}

#[test]
fn test_resolver_same_directory() {
    // The pipeline refuses this layout since cleanup would remove the context
    // file, but the resolver itself handles it.
    let specifier = resolve_import_specifier(
        Path::new("/app/src/server"),
        Path::new("context.ts"),
        Path::new("/app/src/server"),
    )
    .unwrap();
    assert_eq!(specifier, "./context");
}

#[test]
fn test_absolute_context_path() {
    let specifier = resolve_import_specifier(
        Path::new("/app/prisma/generated"),
        Path::new("/app/src/context.ts"),
        Path::new("/app/prisma"),
    )
    .unwrap();
    assert_eq!(specifier, "../../src/context");
}

#[test]
fn test_context_inside_output_directory_is_rejected() {
    let root = TempDir::new().unwrap();
    let prisma = root.path().join("prisma");
    let out = prisma.join("generated");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("context.ts"), "").unwrap();

    let err = generate("generated/context.ts", &out, &prisma).unwrap_err();
    assert!(matches!(err, GeneratorError::Configuration(_)));
    // Nothing was removed.
    assert!(out.join("context.ts").exists());
}

#[test]
fn test_missing_context_path_is_rejected() {
    let root = TempDir::new().unwrap();
    let prisma = root.path().join("prisma");
    fs::create_dir_all(&prisma).unwrap();

    let err = generate("", &prisma.join("generated"), &prisma).unwrap_err();
    assert!(matches!(
        err,
        GeneratorError::Configuration(ConfigurationError::MissingContextPath)
    ));
}
