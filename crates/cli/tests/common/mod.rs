//! Helpers for running the `hush` binary

use anyhow::{Context, Result};
use std::io::Write;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Builder for one `hush` invocation
pub struct HushCommand {
    args: Vec<String>,
    stdin_data: String,
}

impl HushCommand {
    pub fn new() -> Self {
        Self {
            args: Vec::new(),
            stdin_data: String::new(),
        }
    }

    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn stdin(&mut self, data: &str) -> &mut Self {
        self.stdin_data = data.to_string();
        self
    }

    /// Run to completion, feeding stdin and closing it
    pub fn execute(&self) -> Result<CommandResult> {
        let start = Instant::now();

        let mut child = Command::new(env!("CARGO_BIN_EXE_hush"))
            .args(&self.args)
            .env_remove("RUST_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn hush")?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(self.stdin_data.as_bytes())?;
        }

        let output = child
            .wait_with_output()
            .context("Failed to wait for hush")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: start.elapsed(),
        })
    }

    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;
        if !result.success() {
            anyhow::bail!(
                "hush failed (exit code: {}):\nArgs: {:?}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stderr
            );
        }
        Ok(result)
    }

    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;
        if result.success() {
            anyhow::bail!(
                "hush should have failed:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }
        Ok(result)
    }
}

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
