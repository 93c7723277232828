//! External tool invocation.
//!
//! Package managers and installers are black-box collaborators: the
//! pipeline hands them a fixed argument list and reads back only the
//! exit status. The trait seam lets tests script outcomes without
//! spawning anything.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::process::Command;
use std::sync::{Arc, Mutex};

/// Result of one external tool invocation.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    /// Whether the exit status signaled success.
    pub success: bool,
}

/// Runs external tools on behalf of the pipeline.
pub trait ToolRunner: Send + Sync {
    /// Invoke `program` with `args`, inheriting stdio so the tool can
    /// interact with the user directly.
    ///
    /// A non-zero exit is returned as `Ok` with `success == false`;
    /// `Err` means the program could not be spawned at all.
    fn run(&self, program: &str, args: &[String]) -> Result<RunOutput>;
}

/// Runner that actually spawns processes.
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<RunOutput> {
        log::debug!("running {} {}", program, args.join(" "));

        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| Error::tool(program, format!("failed to execute: {}", e)))?;

        Ok(RunOutput {
            code: status.code(),
            success: status.success(),
        })
    }
}

/// Mock runner for tests: records every invocation and returns scripted
/// exit codes (success by default).
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    invocations: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    failures: Arc<Mutex<HashMap<String, i32>>>,
}

impl MockRunner {
    /// Create a runner that succeeds for every program.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a non-zero exit code for a program name.
    pub fn fail_program(&mut self, program: impl Into<String>, code: i32) {
        self.failures.lock().unwrap().insert(program.into(), code);
    }

    /// All invocations recorded so far, in order.
    #[must_use]
    pub fn invocations(&self) -> Vec<(String, Vec<String>)> {
        self.invocations.lock().unwrap().clone()
    }
}

impl ToolRunner for MockRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<RunOutput> {
        self.invocations
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));

        let failures = self.failures.lock().unwrap();
        match failures.get(program) {
            Some(&code) => Ok(RunOutput {
                code: Some(code),
                success: false,
            }),
            None => Ok(RunOutput {
                code: Some(0),
                success: true,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_records_argv() {
        let runner = MockRunner::new();
        let args = vec!["install".to_string(), "-y".to_string()];
        let output = runner.run("flatpak", &args).unwrap();

        assert!(output.success);
        assert_eq!(
            runner.invocations(),
            vec![("flatpak".to_string(), args)]
        );
    }

    #[test]
    fn test_mock_runner_scripted_failure() {
        let mut runner = MockRunner::new();
        runner.fail_program("pipx", 1);

        let output = runner.run("pipx", &["ensurepath".to_string()]).unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(1));

        let output = runner.run("flatpak", &[]).unwrap();
        assert!(output.success);
    }

    #[test]
    fn test_system_runner_missing_program() {
        let runner = SystemRunner;
        let result = runner.run("nyarchup-no-such-program", &[]);
        assert!(matches!(result, Err(Error::ExternalTool { .. })));
    }

    #[test]
    fn test_system_runner_exit_status() {
        let runner = SystemRunner;
        let ok = runner.run("true", &[]).unwrap();
        assert!(ok.success);

        let bad = runner.run("false", &[]).unwrap();
        assert!(!bad.success);
        assert_eq!(bad.code, Some(1));
    }
}
