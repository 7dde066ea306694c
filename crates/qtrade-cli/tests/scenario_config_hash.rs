use std::io::Write;

#[test]
fn config_hash_prints_a_stable_hash_for_identical_layers() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(
        file,
        "session:\n  initial_cash: \"10000000000\"\n  symbols: [\"AAPL\"]\n  base_bar_interval_seconds: 60\n  warmup_bars: 10\nidempotency:\n  ttl_seconds: 60"
    )?;

    let first_out = assert_cmd::Command::cargo_bin("qtrade")?
        .args(["config-hash", file.path().to_str().unwrap()])
        .output()?;
    assert!(first_out.status.success());
    let first_stdout = String::from_utf8(first_out.stdout)?;
    assert!(first_stdout.starts_with("config_hash="));

    let second_out = assert_cmd::Command::cargo_bin("qtrade")?
        .args(["config-hash", file.path().to_str().unwrap()])
        .output()?;
    let second_stdout = String::from_utf8(second_out.stdout)?;

    assert_eq!(first_stdout, second_stdout);
    Ok(())
}

#[test]
fn config_hash_rejects_a_missing_file() -> anyhow::Result<()> {
    assert_cmd::Command::cargo_bin("qtrade")?
        .args(["config-hash", "/no/such/path.yaml"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("config io error"));
    Ok(())
}
