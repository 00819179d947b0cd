use assert_fs::TempDir;
use common::command::{project_dir, recorded_patches, run_treepatch_command, stdout_of};
use common::file::write_tree;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn list_files_with_content_ids(project_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = project_dir.path();
    write_tree(
        &dir.join("tree"),
        &[("hello.txt", "hello\n"), (".git/config", "ignored\n")],
    );
    std::fs::write(dir.join("tree").join("blob.bin"), [0u8, 159, 146, 150])?;

    run_treepatch_command(dir, &["ls-tree", "tree"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^[0-9a-f]{40} binary blob\.bin\nce013625030ba8dba906f756967f9e9ca394464a text hello\.txt\ntree [0-9a-f]{40}\n$",
        )?);

    Ok(())
}

#[rstest]
fn identical_trees_share_an_id(project_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = project_dir.path();
    write_tree(&dir.join("one"), &[("a/b.txt", "same\n")]);
    write_tree(&dir.join("two"), &[("a/b.txt", "same\n")]);

    let one = stdout_of(&mut run_treepatch_command(dir, &["ls-tree", "one"]));
    let two = stdout_of(&mut run_treepatch_command(dir, &["ls-tree", "two"]));

    assert_eq!(one, two);
    Ok(())
}

#[rstest]
fn verify_prints_per_file_statistics(recorded_patches: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let actual_output = stdout_of(&mut run_treepatch_command(
        recorded_patches.path(),
        &["verify", "patches"],
    ));

    assert_eq!(
        actual_output,
        "A\tNOTES.txt\t1 hunk(s)\t+1\t-0\n\
         D\tREADME.md\t1 hunk(s)\t+0\t-1\n\
         M\tsrc/main.c\t1 hunk(s)\t+1\t-1\n\
         3 file patch(es) OK\n"
    );
    Ok(())
}

#[rstest]
fn verify_rejects_inconsistent_hunks(project_dir: TempDir) {
    let dir = project_dir.path();
    write_tree(
        &dir.join("patches"),
        &[("x.txt.patch", "=== modify x.txt\n@@ -1,3 +1,1 @@\n-a\n+b\n")],
    );

    run_treepatch_command(dir, &["verify", "patches"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed patch x.txt.patch"));
}
