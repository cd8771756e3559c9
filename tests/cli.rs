// tests/cli.rs
// Smoke tests for the command-line surface. None of these reach the network:
// they either fail before fetching or point the clients at a closed port.

use std::process::Command;

fn run_repo_lens(args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_repo-lens");
    Command::new(bin)
        .args(args)
        .env_remove("NEXT_PUBLIC_GITHUB_TOKEN")
        .env_remove("GITHUB_TOKEN")
        .env("REPO_LENS_GITHUB_API", "http://127.0.0.1:9")
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run repo-lens binary")
}

#[test]
fn help_lists_subcommands() {
    let output = run_repo_lens(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("tree"));
    assert!(stdout.contains("analyze"));
    assert!(stdout.contains("interactive"));
}

#[test]
fn tree_rejects_non_github_url() {
    let output = run_repo_lens(&["tree", "https://gitlab.com/user/repo"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("not a GitHub URL"));
}

#[test]
fn tree_reports_unreachable_api() {
    let output = run_repo_lens(&["tree", "https://github.com/octocat/Hello-World"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("could not fetch octocat/Hello-World"));
}

#[test]
fn invalid_api_base_is_a_configuration_error() {
    let bin = env!("CARGO_BIN_EXE_repo-lens");
    let output = Command::new(bin)
        .args(["tree", "https://github.com/octocat/Hello-World"])
        .env("REPO_LENS_GITHUB_API", "not a url")
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run repo-lens binary");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("REPO_LENS_GITHUB_API"));
}

#[test]
fn zero_concurrency_is_rejected() {
    let output = run_repo_lens(&["tree", "https://github.com/o/r", "--concurrency", "0"]);
    assert!(!output.status.success());
}
