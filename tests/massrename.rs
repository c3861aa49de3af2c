use file_shell::Interpreter;
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tempfile::{TempDir, tempdir};

fn shell_in(dir: &Path) -> Interpreter {
    let mut shell = Interpreter::default();
    shell
        .env_mut()
        .set_current_dir(dir.to_path_buf())
        .unwrap();
    shell
}

fn exec(shell: &mut Interpreter, line: &str) -> (i32, String) {
    let mut out = Vec::new();
    let code = shell
        .execute_line(line, &mut Cursor::new(Vec::new()), &mut out)
        .unwrap();
    (code, String::from_utf8(out).unwrap())
}

fn holiday_photos() -> TempDir {
    let dir = tempdir().unwrap();
    let photos = dir.path().join("holiday photos");
    fs::create_dir(&photos).unwrap();
    for name in [
        "slika1-zagreb.jpg",
        "slika2-zagreb.jpg",
        "slika3-split.jpg",
        "slika11-split.jpg",
        "notes.txt",
    ] {
        fs::write(photos.join(name), name).unwrap();
    }
    dir
}

#[test]
fn filter_then_show_then_execute() {
    let dir = holiday_photos();
    let mut shell = shell_in(dir.path());
    let pattern = r"slika(\d+)-([^.]+)\.jpg";

    let (code, out) = exec(
        &mut shell,
        &format!("massrename \"holiday photos\" sorted filter \"{pattern}\""),
    );
    assert_eq!(code, 0);
    assert_eq!(
        out,
        "slika1-zagreb.jpg\nslika11-split.jpg\nslika2-zagreb.jpg\nslika3-split.jpg\n"
    );

    let (_, out) = exec(
        &mut shell,
        &format!("massrename \"holiday photos\" sorted show \"{pattern}\" gradovi-${{2}}-${{1,03}}.jpg"),
    );
    assert_eq!(
        out,
        "slika1-zagreb.jpg => gradovi-zagreb-001.jpg\n\
         slika11-split.jpg => gradovi-split-011.jpg\n\
         slika2-zagreb.jpg => gradovi-zagreb-002.jpg\n\
         slika3-split.jpg => gradovi-split-003.jpg\n"
    );
    assert!(!dir.path().join("sorted").exists());

    let (code, out) = exec(
        &mut shell,
        &format!("massrename \"holiday photos\" sorted execute \"{pattern}\" gradovi-${{2}}-${{1,03}}.jpg"),
    );
    assert_eq!(code, 0);
    assert!(out.ends_with("renamed 4 of 4 files\n"));

    let sorted = dir.path().join("sorted");
    for name in [
        "gradovi-zagreb-001.jpg",
        "gradovi-zagreb-002.jpg",
        "gradovi-split-003.jpg",
        "gradovi-split-011.jpg",
    ] {
        assert!(sorted.join(name).is_file(), "{name} was not moved");
    }
    assert_eq!(
        fs::read_to_string(sorted.join("gradovi-split-011.jpg")).unwrap(),
        "slika11-split.jpg"
    );
    assert!(dir.path().join("holiday photos/notes.txt").is_file());
}

#[test]
fn collision_does_not_stop_the_batch() {
    let dir = holiday_photos();
    let sorted = dir.path().join("sorted");
    fs::create_dir(&sorted).unwrap();
    fs::write(sorted.join("2.jpg"), "already here").unwrap();
    let mut shell = shell_in(dir.path());

    let (code, out) = exec(
        &mut shell,
        r#"massrename "holiday photos" sorted execute "slika(\d+)-zagreb\.jpg" ${1}.jpg"#,
    );
    assert_eq!(code, 1);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "slika1-zagreb.jpg => 1.jpg");
    assert!(lines[1].starts_with("failed: slika2-zagreb.jpg => 2.jpg: "));
    assert_eq!(lines[2], "renamed 1 of 2 files");

    assert!(sorted.join("1.jpg").is_file());
    assert_eq!(fs::read_to_string(sorted.join("2.jpg")).unwrap(), "already here");
    assert!(dir.path().join("holiday photos/slika2-zagreb.jpg").is_file());
}

#[test]
fn bad_template_touches_nothing() {
    let dir = holiday_photos();
    let mut shell = shell_in(dir.path());

    let (code, out) = exec(
        &mut shell,
        r#"massrename "holiday photos" sorted execute "slika(\d+).*" ${1"#,
    );
    assert_eq!(code, 1);
    assert!(out.starts_with("massrename: "));
    assert!(!dir.path().join("sorted").exists());
}

#[test]
fn missing_group_is_reported() {
    let dir = holiday_photos();
    let mut shell = shell_in(dir.path());

    let (code, out) = exec(
        &mut shell,
        r#"massrename "holiday photos" sorted show "slika(\d+)-(zagreb)?.*\.jpg" ${2}.jpg"#,
    );
    assert_eq!(code, 1);
    assert!(out.starts_with("massrename: "), "{out}");
}

#[test]
fn navigation_and_help() {
    let dir = holiday_photos();
    let mut shell = shell_in(dir.path());

    let (code, _) = exec(&mut shell, "pushd \"holiday photos\"");
    assert_eq!(code, 0);
    let (_, out) = exec(&mut shell, "listd");
    assert_eq!(out, format!("{}\n", dir.path().display()));

    let (_, out) = exec(&mut shell, "help massrename");
    assert!(out.contains("massrename"));

    exec(&mut shell, "popd");
    assert_eq!(shell.env().current_dir, dir.path());
}
