//! Runs the `overwrite-validator` binary against a temporary project.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn write(root: &Path, path: &str, text: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn project(platform_class: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "overwrite.toml",
        r#"
output_root = "out"

[common]
name = "common"
sources = ["common/src"]

[[modules]]
name = "forge"
sources = ["forge/src"]

[[modules]]
name = "fabric"
sources = ["fabric/src"]
"#,
    );
    write(
        root,
        "common/src/a/C.java",
        "package a;\n\npublic class C {\n    public void m() {}\n}\n",
    );
    write(root, "forge/src/a/C.java", platform_class);
    dir
}

fn run(root: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_overwrite-validator"))
        .arg("--config")
        .arg(root.join("overwrite.toml"))
        .args(extra)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

#[test]
fn test_invalid_module_fails_with_red_report() {
    let dir = project("package a;\n\npublic class C {}\n");
    let output = run(dir.path(), &[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("\x1b[31m\nMissing members in 'forge' @ a.C\n * m()\x1b[0m"),
        "{stderr}"
    );
    assert!(stderr.contains("Project 'forge' contains invalid overwrites"), "{stderr}");
}

#[test]
fn test_generate_code_writes_output() {
    let dir = project("package a;\n\n@InheritMissingMembers\npublic class C {}\n");
    let output = run(dir.path(), &["--generate-code", "--module", "forge"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let generated = fs::read_to_string(dir.path().join("out/forge/a/C.java")).unwrap();
    assert!(generated.contains("public void m() {}"));
    assert!(!generated.contains("@InheritMissingMembers"));
}

#[test]
fn test_unknown_module_is_rejected() {
    let dir = project("package a;\n\npublic class C { public void m() {} }\n");
    let output = run(dir.path(), &["--module", "quilt"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown module 'quilt'"));
}
