use std::process::Command;

#[test]
fn short_run_prints_a_summary_without_saving() {
    let dir = tempfile::tempdir().expect("temp dir");
    let save = dir.path().join("save.json");

    let output = Command::new(env!("CARGO_BIN_EXE_pathguard"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["--level", "levels/demo.toml", "--seconds", "2"])
        .args(["--build", "1:archer", "--save"])
        .arg(&save)
        .output()
        .expect("failed to run the pathguard binary");

    assert!(output.status.success(), "pathguard should exit cleanly");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("outcome:       time up"), "{stdout}");
    assert!(stdout.contains("gold:          150"), "{stdout}");
    assert!(stdout.contains("waves cleared: 0/3"), "{stdout}");
    assert!(!save.exists(), "nothing new to record");
}

#[test]
fn unknown_level_file_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_pathguard"))
        .args(["--level", "does-not-exist.toml", "--seconds", "1"])
        .output()
        .expect("failed to run the pathguard binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does-not-exist.toml"), "{stderr}");
}
