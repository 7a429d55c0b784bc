use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "mine-crawl"])
        .status()
        .expect("failed to invoke cargo check for mine-crawl CLI binary");

    assert!(status.success(), "cargo check --bin mine-crawl should succeed");
}

#[test]
fn short_session_runs_to_completion() {
    let output = Command::new(env!("CARGO_BIN_EXE_mine-crawl"))
        .args(["--seed", "4", "--height", "1", "--ticks", "120", "--report-every", "0"])
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run mine-crawl");

    assert!(output.status.success(), "mine-crawl exited with {:?}", output.status);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ticks"), "unexpected output: {stdout}");
    assert!(stdout.contains("loadout: Pickaxe"), "unexpected output: {stdout}");
}

#[test]
fn invalid_height_is_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_mine-crawl"))
        .args(["--height=-1", "--ticks", "1"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run mine-crawl");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to start session"), "stderr: {stderr}");
}
