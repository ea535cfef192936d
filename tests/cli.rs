//! Command line behaviour that needs no network access

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn create_test_cmd() -> Command {
    let mut cmd = Command::cargo_bin("librespeed-cli").unwrap();
    for var in [
        "LIBRESPEED_SERVER_JSON",
        "LIBRESPEED_CONCURRENT",
        "LIBRESPEED_CHUNKS",
        "LIBRESPEED_DURATION",
        "LIBRESPEED_TELEMETRY_LEVEL",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn write_server_list(dir: &TempDir) -> String {
    let path = dir.path().join("servers.json");
    fs::write(
        &path,
        r#"[
            {"id": 1, "name": "Amsterdam", "server": "//ams.speed.example.net/", "sponsorName": "Example Hosting", "sponsorURL": "example.net"},
            {"id": 2, "name": "Tokyo", "server": "https://tyo.speed.example.net/"}
        ]"#,
    )
    .unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_csv_header_only() {
    create_test_cmd()
        .arg("--csv-header")
        .assert()
        .success()
        .stdout(predicate::eq(
            "Timestamp,Server Name,Address,Ping,Jitter,Download,Upload,Bytes Received,Bytes Sent,Share,IP\n",
        ));
}

#[test]
fn test_csv_header_custom_delimiter() {
    create_test_cmd()
        .args(["--csv-header", "--csv-delimiter", ";"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Timestamp;Server Name;Address;"));
}

#[test]
fn test_list_servers() {
    let dir = TempDir::new().unwrap();
    let list = write_server_list(&dir);

    create_test_cmd()
        .current_dir(dir.path())
        .args(["--server-json", &list, "--list", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "1: Amsterdam (//ams.speed.example.net/) [Example Hosting @ https://example.net]",
        ))
        .stdout(predicate::str::contains("2: Tokyo (https://tyo.speed.example.net/)"));
}

#[test]
fn test_list_with_filter() {
    let dir = TempDir::new().unwrap();
    let list = write_server_list(&dir);

    create_test_cmd()
        .current_dir(dir.path())
        .args(["--server-json", &list, "--exclude", "1", "--list", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tokyo"))
        .stdout(predicate::str::contains("Amsterdam").not());
}

#[test]
fn test_missing_servers_is_validation_error() {
    let dir = TempDir::new().unwrap();
    create_test_cmd()
        .current_dir(dir.path())
        .arg("--no-color")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--server-json"));
}

#[test]
fn test_missing_server_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    create_test_cmd()
        .current_dir(dir.path())
        .args(["--server-json", "does-not-exist.json", "--no-color"])
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("does-not-exist.json"));
}

#[test]
fn test_out_of_range_concurrency() {
    let dir = TempDir::new().unwrap();
    create_test_cmd()
        .current_dir(dir.path())
        .args(["--server-url", "https://speed.example.net/", "--concurrent", "64", "--no-color"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("between 1 and 32"));
}

#[test]
fn test_conflicting_ip_families() {
    create_test_cmd().args(["-4", "-6"]).assert().failure();
}

#[test]
fn test_env_help() {
    create_test_cmd()
        .arg("--env-help")
        .assert()
        .success()
        .stdout(predicate::str::contains("LIBRESPEED_TELEMETRY_LEVEL"));
}
