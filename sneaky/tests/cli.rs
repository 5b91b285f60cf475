use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

use tempfile::TempDir;
use tools::random::iv::is_weak_iv;

const ENCRYPT: &str = env!("CARGO_BIN_EXE_sneaky-encrypt");
const SOLVE: &str = env!("CARGO_BIN_EXE_sneaky-solve");

fn run(bin: &str, dir: &Path, args: &[&str]) -> Output {
    Command::new(bin)
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn binary")
}

#[test]
fn test_hello_is_32_bytes() {
    let dir = TempDir::new().unwrap();
    let output = run(ENCRYPT, dir.path(), &["hello"]);
    assert!(output.status.success());

    let payload = fs::read(dir.path().join("encrypted.bin")).unwrap();
    assert_eq!(payload.len(), 32);
    assert!(is_weak_iv(&payload[..16]));
}

#[test]
fn test_payload_sizes() {
    let dir = TempDir::new().unwrap();

    for (input, expected) in [("0123456789abcdef", 48), ("", 32), ("a bit longer than a block", 48)] {
        let output = run(ENCRYPT, dir.path(), &[input]);
        assert!(output.status.success(), "failed for {input:?}");
        let payload = fs::read(dir.path().join("encrypted.bin")).unwrap();
        assert_eq!(payload.len(), expected, "wrong size for {input:?}");
    }
}

#[test]
fn test_missing_argument() {
    let dir = TempDir::new().unwrap();
    let output = run(ENCRYPT, dir.path(), &[]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));
    assert!(!dir.path().join("encrypted.bin").exists());
}

#[test]
fn test_failed_write() {
    let dir = TempDir::new().unwrap();
    // a directory in the way makes the final rename fail, even for root
    fs::create_dir(dir.path().join("encrypted.bin")).unwrap();

    let output = run(ENCRYPT, dir.path(), &["hello"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("encrypted.bin"));

    assert!(dir.path().join("encrypted.bin").is_dir());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_hyphen_input() {
    let dir = TempDir::new().unwrap();
    let output = run(ENCRYPT, dir.path(), &["-not-a-flag"]);
    assert!(output.status.success());

    let output = run(SOLVE, dir.path(), &[]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "flag : -not-a-flag\n");
}

#[test]
fn test_solver_roundtrip() {
    let dir = TempDir::new().unwrap();
    let flag = "flag{iv_only_has_four_digits}";
    assert!(run(ENCRYPT, dir.path(), &[flag]).status.success());

    let output = run(SOLVE, dir.path(), &["encrypted.bin"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), format!("flag : {flag}\n"));
}

#[test]
fn test_solver_brute_force() {
    let dir = TempDir::new().unwrap();
    let flag = "flag{iv_only_has_four_digits}";
    assert!(run(ENCRYPT, dir.path(), &[flag]).status.success());
    let payload = fs::read(dir.path().join("encrypted.bin")).unwrap();

    let output = run(SOLVE, dir.path(), &["--known-prefix", "flag{"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let iv = String::from_utf8_lossy(&payload[..16]);
    assert!(stdout.contains(&format!("iv : {iv}")));
    assert!(stdout.contains(&format!("flag : {flag}")));
}

#[test]
fn test_solver_short_prefix() {
    let dir = TempDir::new().unwrap();
    assert!(run(ENCRYPT, dir.path(), &["flag{iv_only_has_four_digits}"]).status.success());

    let output = run(SOLVE, dir.path(), &["--known-prefix", "fl"]);
    assert!(!output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains("flag :"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("100 candidate IVs match"));
}

#[test]
fn test_solver_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("encrypted.bin"), [0u8; 20]).unwrap();
    assert!(!run(SOLVE, dir.path(), &[]).status.success());

    let missing = TempDir::new().unwrap();
    assert!(!run(SOLVE, missing.path(), &[]).status.success());
}
