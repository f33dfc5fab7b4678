use std::io::Write;
use std::process::{Command, Output, Stdio};

fn run_shell(input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_minish"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn minish");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input.as_bytes())
        .expect("write input");
    child.wait_with_output().expect("wait for minish")
}

#[test]
fn exit_with_code() {
    let output = run_shell("exit 3\n");
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn bare_exit_is_success() {
    let output = run_shell("echo hi\nexit\n");
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hi\n"));
    assert!(stdout.contains("$ "));
}

#[test]
fn malformed_exit_keeps_running() {
    let output = run_shell("exit abc\nexit 4\n");
    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("exit: abc: numeric argument required"));
}

#[test]
fn end_of_input_ends_the_shell() {
    let output = run_shell("nonexistent_command_for_cli_test\n");
    assert_eq!(output.status.code(), Some(127));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nonexistent_command_for_cli_test: command not found"));
}
