//! Integration tests for layered settings

use shieldgen::config::{global_config_path, ConfigLoader};
use shieldgen::generation::Generator;
use shieldgen::model::DmmfValueSource;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::integration::{current_dmmf, project_layout, user_post_shield, with_isolated_env};

fn write_global(contents: &str) -> PathBuf {
    let path = global_config_path().unwrap();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

#[cfg(target_os = "linux")]
#[test]
fn test_global_config_lives_under_xdg_config_home() {
    let test_dir = TempDir::new().unwrap();
    with_isolated_env(&test_dir, || {
        let path = global_config_path().unwrap();
        assert_eq!(
            path,
            test_dir.path().join("config").join("shieldgen").join("config.toml")
        );
    });
}

#[test]
fn test_workspace_file_overrides_global_file() {
    let test_dir = TempDir::new().unwrap();
    with_isolated_env(&test_dir, || {
        write_global(
            r#"
[generator]
context_path = "global/context.ts"
output = "global-out"

[logging]
level = "warn"
"#,
        );
        let workspace = test_dir.path().join("ws");
        fs::create_dir_all(&workspace).unwrap();
        fs::write(
            workspace.join("shieldgen.toml"),
            "[generator]\ncontext_path = \"../src/context.ts\"\n",
        )
        .unwrap();

        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(
            config.generator.context_path,
            Some(PathBuf::from("../src/context.ts"))
        );
        assert_eq!(config.generator.output, PathBuf::from("global-out"));
        assert_eq!(config.logging.level, "warn");
    });
}

#[test]
fn test_environment_file_overrides_base_file() {
    let test_dir = TempDir::new().unwrap();
    with_isolated_env(&test_dir, || {
        let workspace = test_dir.path().join("ws");
        fs::create_dir_all(&workspace).unwrap();
        fs::write(
            workspace.join("shieldgen.toml"),
            "[generator]\nprovider = \"prisma-client-js\"\n",
        )
        .unwrap();
        fs::write(
            workspace.join("shieldgen.ci.toml"),
            "[generator]\nprovider = \"prisma-client-js@4.16.2\"\n",
        )
        .unwrap();
        std::env::set_var("SHIELDGEN_ENV", "ci");

        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.generator.provider, "prisma-client-js@4.16.2");
    });
}

#[test]
fn test_environment_variable_overrides_files() {
    let test_dir = TempDir::new().unwrap();
    with_isolated_env(&test_dir, || {
        let workspace = test_dir.path().join("ws");
        fs::create_dir_all(&workspace).unwrap();
        fs::write(
            workspace.join("shieldgen.toml"),
            "[generator]\ncontext_path = \"from-file.ts\"\n",
        )
        .unwrap();
        std::env::set_var("SHIELDGEN__GENERATOR__CONTEXT_PATH", "from-env.ts");

        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(
            config.generator.context_path,
            Some(PathBuf::from("from-env.ts"))
        );
    });
}

#[test]
fn test_malformed_settings_file_is_configuration_error() {
    let test_dir = TempDir::new().unwrap();
    with_isolated_env(&test_dir, || {
        let workspace = test_dir.path().join("ws");
        fs::create_dir_all(&workspace).unwrap();
        fs::write(workspace.join("shieldgen.toml"), "[generator\n").unwrap();
        assert!(ConfigLoader::load(&workspace).is_err());
    });
}

#[test]
fn test_settings_drive_a_generation() {
    let test_dir = TempDir::new().unwrap();
    with_isolated_env(&test_dir, || {
        let root = TempDir::new().unwrap();
        project_layout(&root);
        fs::write(
            root.path().join("shieldgen.toml"),
            r#"
[generator]
schema = "prisma/schema.prisma"
context_path = "../src/context.ts"
output = "prisma/generated"
"#,
        )
        .unwrap();

        let config = ConfigLoader::load(root.path()).unwrap();
        let settings = config.generator;
        let generator = Generator::new(settings.to_generation_config(root.path()));
        let source = DmmfValueSource::new(
            current_dmmf(&["User", "Post"]),
            Some(settings.provider_identity().unwrap()),
        );
        generator.run(&source).unwrap();

        assert_eq!(
            fs::read_to_string(root.path().join("prisma/generated/shield.ts")).unwrap(),
            user_post_shield("../../src/context")
        );
    });
}
