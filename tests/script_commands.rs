use assert_fs::TempDir;
use common::command::{project_dir, run_treepatch_command, stdout_of};
use common::file::{read_tree, write_tree};
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

const ARROWS_SCRIPT: &str = r#"[
    {"type": "replace", "find": "->", "replace": "=>", "lines": ["all"]},
    {"type": "insert_before", "value": "// patched", "lines": [1]}
]"#;

#[rstest]
fn run_scripts_against_their_target_files(project_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = project_dir.path();
    write_tree(
        &dir.join("base"),
        &[("src/app.c", "a -> b;\nc -> d;\n"), ("src/other.c", "x -> y;\n")],
    );
    write_tree(&dir.join("scripts"), &[("src/app.c.json", ARROWS_SCRIPT)]);

    let actual_output = stdout_of(&mut run_treepatch_command(
        dir,
        &["script", "base", "scripts", "-o", "out"],
    ));

    assert_eq!(actual_output, "Applied cleanly, no conflicts.\n");
    let out = read_tree(&dir.join("out"));
    assert_eq!(out["src/app.c"], "// patched\na => b;\nc => d;\n");
    assert_eq!(out["src/other.c"], "x -> y;\n");

    Ok(())
}

#[rstest]
fn regex_selectors_and_offsets(project_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = project_dir.path();
    write_tree(
        &dir.join("base"),
        &[("config.ini", "[server]\nport = 80\n[client]\nport = 81\n")],
    );
    write_tree(
        &dir.join("scripts"),
        &[(
            "config.ini.json",
            r#"[
                {"type": "set", "value": "port = 8080", "lines": [{"find": "[server]", "offset": 1}]},
                {"type": "insert", "value": "timeout = 5", "lines": [{"find_regex": "^\\[client\\]$"}]}
            ]"#,
        )],
    );

    run_treepatch_command(dir, &["script", "base", "scripts", "-o", "out"])
        .assert()
        .success();

    assert_eq!(
        read_tree(&dir.join("out"))["config.ini"],
        "[server]\nport = 8080\n[client]\ntimeout = 5\nport = 81\n"
    );

    Ok(())
}

#[rstest]
fn scripts_for_missing_files_conflict(project_dir: TempDir) {
    let dir = project_dir.path();
    write_tree(&dir.join("base"), &[("present.txt", "here\n")]);
    write_tree(&dir.join("scripts"), &[("missing.txt.json", ARROWS_SCRIPT)]);

    run_treepatch_command(dir, &["script", "base", "scripts", "-o", "out", "--strict"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("  missing.txt\n    not found\n"));
}

#[rstest]
fn malformed_scripts_are_errors(project_dir: TempDir) {
    let dir = project_dir.path();
    write_tree(&dir.join("base"), &[("a.txt", "a\n")]);
    write_tree(&dir.join("scripts"), &[("a.txt.json", "[{\"type\": \"explode\"}]")]);

    run_treepatch_command(dir, &["script", "base", "scripts", "-o", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a.txt.json"));
}
