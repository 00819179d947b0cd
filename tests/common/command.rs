use crate::common::file::write_tree;
use crate::common::redirect_temp_dir;
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub const MAIN_C: &str = "int main() {\n    int a = 1;\n    int b = 2;\n    return a + b;\n}\n";
pub const MAIN_C_EDITED: &str = "int main() {\n    int a = 1;\n    int b = 3;\n    return a + b;\n}\n";

#[fixture]
pub fn project_dir() -> TempDir {
    redirect_temp_dir();
    TempDir::new().expect("Failed to create temp dir")
}

/// `base/` and an edited `variant/`: one file modified, one deleted, one added
#[fixture]
pub fn base_and_variant(project_dir: TempDir) -> TempDir {
    write_tree(
        &project_dir.path().join("base"),
        &[("src/main.c", MAIN_C), ("README.md", "hello\n")],
    );
    write_tree(
        &project_dir.path().join("variant"),
        &[("src/main.c", MAIN_C_EDITED), ("NOTES.txt", "note\n")],
    );

    project_dir
}

/// [`base_and_variant`] with the variant's patches already written to `patches/`
#[fixture]
pub fn recorded_patches(base_and_variant: TempDir) -> TempDir {
    run_treepatch_command(base_and_variant.path(), &["diff", "base", "variant", "-o", "patches"])
        .assert()
        .success();

    base_and_variant
}

pub fn run_treepatch_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("treepatch").expect("Failed to find treepatch binary");
    cmd.envs(vec![("NO_PAGER", "1")]);
    for var in ["TREEPATCH_LOG", "TREEPATCH_CONTEXT", "TREEPATCH_RENAME_THRESHOLD", "TREEPATCH_FUZZ", "TREEPATCH_RADIUS"] {
        cmd.env_remove(var);
    }
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("stdout is not UTF-8")
}
