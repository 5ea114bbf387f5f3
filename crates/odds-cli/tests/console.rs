use assert_cmd::Command;
use std::path::Path;

fn odds(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("odds").unwrap();
    cmd.arg("--config").arg(config).arg("--log-level").arg("error");
    cmd
}

fn stdout_of(cmd: &mut Command, input: &str) -> String {
    let output = cmd.write_stdin(input).output().unwrap();
    assert!(output.status.success(), "odds exited with {:?}", output.status);
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn challenge_and_lock_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = stdout_of(
        &mut odds(&dir.path().join("missing.toml")),
        "alice odds bob 10 sing a song\n\
         alice odds alice 10 nope\n\
         carol odds bob 10 again\n\
         quit\n",
    );

    assert!(stdout.contains("[to alice] Challenge sent to @bob."));
    assert!(stdout.contains("[#channel] @alice challenged @bob to **What are the odds?**"));
    assert!(stdout.contains("Prompt: \"sing a song\""));
    assert!(stdout.contains("Timeout: 120s."));
    assert!(stdout.contains("[to alice] You cannot challenge yourself."));
    assert!(stdout.contains("[to carol] That user already has an active odds challenge in this channel."));
}

#[test]
fn config_file_limits_apply() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[game]\ntimeout_ms = 30000\nmax_max = 20\n").unwrap();

    let stdout = stdout_of(
        &mut odds(&path),
        "alice odds bob 50 too big\nalice odds bob 20 fine\n",
    );
    assert!(stdout.contains("[to alice] Max must be between 2 and 20."));
    assert!(stdout.contains("Timeout: 30s."));
}

#[test]
fn unknown_commands_report_errors() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = stdout_of(
        &mut odds(&dir.path().join("missing.toml")),
        "alice dance\nhelp\n",
    );
    assert!(stdout.contains("error: unknown command 'dance'"));
    assert!(stdout.contains("commands:"));
}

#[test]
fn invalid_config_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = odds(&dir.path().join("missing.toml"));
    cmd.arg("--timeout-ms").arg("0");
    cmd.write_stdin("").assert().failure();
}
