use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

const CONFIG: &str = "\
global
    maxconn 2000
    daemon

backend web
    balance roundrobin
    server web1 10.0.0.1:80 check
";

fn config_file(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file
}

fn proxycfg(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_proxycfg"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run proxycfg")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_validate() {
    let file = config_file(CONFIG);
    let output = proxycfg(&["validate", file.path().to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("is valid"));
}

#[test]
fn test_validate_reports_bad_line() {
    let file = config_file("global\n  maxconn lots\n");
    let output = proxycfg(&["validate", file.path().to_str().unwrap()]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("maxconn"), "{stderr}");
}

#[test]
fn test_strict_flag() {
    let file = config_file("global\n  frobnicate\n");
    let path = file.path().to_str().unwrap();
    assert!(proxycfg(&["validate", path]).status.success());
    assert!(!proxycfg(&["--strict", "validate", path]).status.success());
}

#[test]
fn test_fmt() {
    let file = config_file(CONFIG);
    let output = proxycfg(&["fmt", file.path().to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "global\n  daemon\n  maxconn 2000\n\nbackend web\n  balance roundrobin\n  server web1 10.0.0.1:80 check\n"
    );
}

#[test]
fn test_fmt_write() {
    let file = config_file("backend b # main\n    server s 1.1.1.1:80 # only\n");
    let path = file.path().to_str().unwrap();
    assert!(proxycfg(&["--no-comments", "fmt", "--write", path]).status.success());
    assert_eq!(std::fs::read_to_string(path).unwrap(), "backend b\n  server s 1.1.1.1:80\n");
}

#[test]
fn test_sections() {
    let file = config_file("backend zeta\nbackend alpha\n");
    let output = proxycfg(&["sections", file.path().to_str().unwrap(), "backend"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "alpha\nzeta\n");
}

#[test]
fn test_get_json() {
    let file = config_file(CONFIG);
    let path = file.path().to_str().unwrap();

    let output = proxycfg(&["get", path, "global", "data", "maxconn"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["value"]["type"], "int");
    assert_eq!(json["value"]["value"], 2000);

    let output = proxycfg(&["get", path, "backend", "web", "server", "--index", "0"]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["value"]["value"]["name"], "web1");

    let output = proxycfg(&["get", path, "global", "data", "nbthread"]);
    assert!(!output.status.success());
}

#[test]
fn test_set_and_insert() {
    let file = config_file(CONFIG);
    let path = file.path().to_str().unwrap();

    assert!(proxycfg(&["set", path, "global", "data", "maxconn", "4096"]).status.success());
    assert!(proxycfg(&["set", path, "backend", "web", "server", "web2", "10.0.0.2:80"]).status.success());
    assert!(proxycfg(&[
        "set", path, "backend", "web", "server", "web0", "10.0.0.9:80", "--insert", "--index", "0"
    ])
    .status
    .success());

    let written = std::fs::read_to_string(path).unwrap();
    assert!(written.contains("  maxconn 4096\n"));
    let web0 = written.find("server web0").unwrap();
    let web1 = written.find("server web1").unwrap();
    let web2 = written.find("server web2").unwrap();
    assert!(web0 < web1 && web1 < web2);

    assert!(!proxycfg(&["set", path, "global", "data", "maxconn", "lots"]).status.success());
    assert_eq!(std::fs::read_to_string(path).unwrap(), written);
}

#[test]
fn test_set_rejects_shadowed_value() {
    let file = config_file(CONFIG);
    let path = file.path().to_str().unwrap();
    let before = std::fs::read_to_string(path).unwrap();

    assert!(!proxycfg(&["set", path, "backend", "web", "option", "redispatch"]).status.success());
    assert!(!proxycfg(&["set", path, "global", "data", "unprocessed", "maxconn", "99"]).status.success());
    assert_eq!(std::fs::read_to_string(path).unwrap(), before);
}

#[test]
fn test_delete() {
    let file = config_file(CONFIG);
    let path = file.path().to_str().unwrap();

    assert!(proxycfg(&["delete", path, "global", "data", "daemon"]).status.success());
    assert!(proxycfg(&["delete", path, "backend", "web", "server", "--index", "0"]).status.success());

    let written = std::fs::read_to_string(path).unwrap();
    assert!(!written.contains("daemon"));
    assert!(!written.contains("server"));
}

#[test]
fn test_create_and_delete_section() {
    let file = config_file(CONFIG);
    let path = file.path().to_str().unwrap();

    assert!(proxycfg(&["create-section", path, "frontend", "www"]).status.success());
    assert!(!std::fs::read_to_string(path).unwrap().contains("frontend www"));
    assert!(!proxycfg(&["create-section", path, "backend", "web"]).status.success());

    assert!(!proxycfg(&["set", path, "frontend", "www", "mode", "http"]).status.success());
    assert!(proxycfg(&["set", path, "frontend", "www", "mode", "http", "--create"]).status.success());
    assert!(std::fs::read_to_string(path).unwrap().contains("\nfrontend www\n  mode http\n"));
    assert!(!proxycfg(&["create-section", path, "frontend", "www"]).status.success());

    assert!(proxycfg(&["delete-section", path, "backend", "web"]).status.success());
    assert!(!proxycfg(&["delete-section", path, "global", "data"]).status.success());

    let written = std::fs::read_to_string(path).unwrap();
    assert!(!written.contains("backend web"));
    assert!(written.contains("maxconn 2000"));
}

#[test]
fn test_version() {
    let output = proxycfg(&["version"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("Proxycfg v"));
}
