#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn tmcws_cmd(data: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("tmcws"));
    cmd.env("TMCWS_DATA", data.as_os_str())
        .env_remove("TMCWS_EXERCISES_DIR")
        .env_remove("TMCWS_CLOSED_DIR")
        .env_remove("TMCWS_SWEEP_INTERVAL")
        .env_remove("TMCWS_LOG");
    cmd
}

fn source_folder(temp: &TempDir) -> std::path::PathBuf {
    let source = temp.path().join("template");
    fs::create_dir_all(source.join("src")).unwrap();
    fs::write(source.join("src").join("Main.java"), "class Main {}").unwrap();
    source
}

fn download(data: &Path, source: &Path, id: &str, name: &str) {
    tmcws_cmd(data)
        .args([
            "download", "--id", id, "--org", "HY", "--course", "intro", "--name", name, "--from",
        ])
        .arg(source)
        .assert()
        .success()
        .stdout(predicate::str::contains("Downloaded"));
}

#[test]
fn download_open_list_close() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let source = source_folder(&temp);

    download(&data, &source, "1337", "hello");
    assert!(data.join("closed").join("1337").join("src").exists());

    tmcws_cmd(&data)
        .args(["open", "1337"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Opened intro/hello (1337)"));

    let canonical = data.join("exercises").join("HY").join("intro").join("hello");
    assert!(canonical.join("src").join("Main.java").exists());

    tmcws_cmd(&data)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("intro/hello"))
        .stdout(predicate::str::contains("open"));

    tmcws_cmd(&data)
        .args(["close", "1337"])
        .assert()
        .success();
    assert!(!canonical.exists());

    tmcws_cmd(&data)
        .args(["ls", "--status", "closed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("closed"));
}

#[test]
fn sweep_removes_stray_entries() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let source = source_folder(&temp);

    download(&data, &source, "1", "hello");
    tmcws_cmd(&data).args(["open", "1"]).assert().success();

    let root = data.join("exercises");
    let stray = root.join("HY").join("intro").join("scratch");
    fs::create_dir_all(&stray).unwrap();
    fs::write(root.join("notes.txt"), "hi").unwrap();

    tmcws_cmd(&data)
        .args(["sweep"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed unknown entry"));

    assert!(!stray.exists());
    assert!(!root.join("notes.txt").exists());
    assert!(root.join("HY").join("intro").join("hello").exists());
    assert!(root.join(".tmc-root").exists());

    tmcws_cmd(&data)
        .args(["sweep"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Managed root is clean."));
}

#[test]
fn paths_and_which() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let source = source_folder(&temp);

    download(&data, &source, "5", "hello");

    tmcws_cmd(&data)
        .args(["paths"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exercises:"))
        .stdout(predicate::str::contains("closed:"));

    tmcws_cmd(&data)
        .args(["paths", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5"));

    tmcws_cmd(&data).args(["open", "5"]).assert().success();
    let file = data
        .join("exercises")
        .join("HY")
        .join("intro")
        .join("hello")
        .join("src")
        .join("Main.java");

    tmcws_cmd(&data)
        .arg("which")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("intro/hello"));
}

#[test]
fn unknown_exercise_fails() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");

    tmcws_cmd(&data)
        .args(["open", "404"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn data_flag_overrides_environment() {
    let temp = TempDir::new().unwrap();
    let from_env = temp.path().join("env");
    let from_flag = temp.path().join("flag");
    let source = source_folder(&temp);

    tmcws_cmd(&from_env)
        .args([
            "download", "--id", "9", "--org", "HY", "--course", "intro", "--name", "x", "--data",
        ])
        .arg(&from_flag)
        .arg("--from")
        .arg(&source)
        .assert()
        .success();

    assert!(from_flag.join("exercises.json").exists());
    assert!(!from_env.join("exercises.json").exists());
}

#[test]
fn watch_with_duration_exits() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");

    tmcws_cmd(&data)
        .args(["watch", "--duration", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Watching"))
        .stdout(predicate::str::contains("Stopped watching."));

    assert!(data.join("exercises").join(".tmc-root").exists());
}

#[test]
fn watch_stops_on_quit() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");

    tmcws_cmd(&data)
        .args(["watch"])
        .write_stdin("sweep\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stopped watching."));
}


#[test]
fn watch_opens_exercises_typed_into_it() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let source = source_folder(&temp);
    download(&data, &source, "1", "hello");

    tmcws_cmd(&data)
        .args(["watch"])
        .write_stdin("open 1\nopen x\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Opened intro/hello (1)"))
        .stderr(predicate::str::contains("Invalid exercise id"));

    let canonical = data.join("exercises").join("HY").join("intro").join("hello");
    assert!(canonical.join("src").join("Main.java").exists());
    assert!(!data.join("tmcws.lock").exists());

    tmcws_cmd(&data)
        .args(["list", "--status", "open"])
        .assert()
        .success()
        .stdout(predicate::str::contains("intro/hello"));
}

#[test]
fn second_process_is_refused_while_watching() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let source = source_folder(&temp);
    download(&data, &source, "1", "hello");

    let mut watch = std::process::Command::new(cargo_bin("tmcws"))
        .env("TMCWS_DATA", data.as_os_str())
        .env_remove("TMCWS_EXERCISES_DIR")
        .env_remove("TMCWS_CLOSED_DIR")
        .env_remove("TMCWS_SWEEP_INTERVAL")
        .env_remove("TMCWS_LOG")
        .arg("watch")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let lock = data.join("tmcws.lock");
    let deadline = Instant::now() + Duration::from_secs(10);
    while !lock.exists() {
        assert!(Instant::now() < deadline, "watch never took the lock");
        thread::sleep(Duration::from_millis(20));
    }

    tmcws_cmd(&data)
        .args(["open", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked by `tmcws watch`"));
    assert!(data.join("closed").join("1").join("src").exists());

    // Read-only commands still work.
    tmcws_cmd(&data)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("intro/hello"));

    watch
        .stdin
        .take()
        .unwrap()
        .write_all(b"quit\n")
        .unwrap();
    assert!(watch.wait().unwrap().success());
    assert!(!lock.exists());

    tmcws_cmd(&data)
        .args(["open", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Opened intro/hello (1)"));
}

#[test]
fn batch_reports_each_failing_id() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let source = source_folder(&temp);
    download(&data, &source, "1", "hello");
    download(&data, &source, "2", "world");

    tmcws_cmd(&data)
        .args(["open", "1", "404", "2"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Opened intro/hello (1)"))
        .stdout(predicate::str::contains("Opened intro/world (2)"))
        .stderr(predicate::str::contains("Could not open 404"));
}

#[test]
fn remove_course_is_scoped_to_organization() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let source = source_folder(&temp);
    download(&data, &source, "1", "hello");
    tmcws_cmd(&data)
        .args([
            "download", "--id", "2", "--org", "Aalto", "--course", "intro", "--name", "hello",
            "--from",
        ])
        .arg(&source)
        .assert()
        .success();

    tmcws_cmd(&data)
        .args(["remove-course", "intro", "--org", "HY"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed course HY/intro (1 exercise(s))"));

    assert!(!data.join("closed").join("1").exists());
    assert!(data.join("closed").join("2").exists());
}
