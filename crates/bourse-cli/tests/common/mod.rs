use std::path::Path;
use std::process::{Command, Output};

/// Variables that would leak the developer's real configuration into a test.
const PLATFORM_VARS: &[&str] = &[
    "CAPITAL_BASE_URL",
    "CAPITAL_API_KEY",
    "CAPITAL_IDENTIFIER",
    "CAPITAL_PASSWORD",
    "CAPITAL_ACCOUNT_TYPE",
    "CAPITAL_ACCOUNT_ID",
    "ETORO_BASE_URL",
    "ETORO_API_KEY",
    "ETORO_USER_KEY",
    "ETORO_ACCOUNT_TYPE",
    "RUST_LOG",
];

/// Run the CLI binary in `dir` with only the given platform variables set.
///
/// Running in an empty directory keeps a developer's `.env` out of the test.
pub fn run_cli_in(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bourse"));
    cmd.current_dir(dir).args(args);
    for var in PLATFORM_VARS {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub fn run_cli_success(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> String {
    let output = run_cli_in(dir, args, env);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}
