//! Host environment probe: container tooling availability and the invoking
//! user's numeric identity.
//!
//! Everything that shells out sits behind [`HostProbe`] so the pipeline can be
//! exercised with a fake in tests.

use std::process::Command;

use crate::error::{Result, SpaceError};

/// Commands that must all exit 0 for the container tooling to count as present.
pub const TOOLING_CHECKS: &[&str] = &["docker -v", "docker-compose -v"];

/// Exit code and captured stdout of a probe command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
}

/// Numeric user and group id of the invoking user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostIdentity {
    pub uid: u32,
    pub gid: u32,
}

pub trait HostProbe: Send + Sync {
    /// Run a whitespace-separated command without a shell.
    fn run(&self, command: &str) -> Result<CommandOutput>;

    /// `true` when every [`TOOLING_CHECKS`] command exits 0. Never errors.
    fn tooling_available(&self) -> bool {
        TOOLING_CHECKS.iter().all(|cmd| match self.run(cmd) {
            Ok(out) if out.exit_code == 0 => true,
            Ok(out) => {
                tracing::debug!("`{}` exited with {}", cmd, out.exit_code);
                false
            }
            Err(e) => {
                tracing::debug!("`{}` failed: {}", cmd, e);
                false
            }
        })
    }

    /// uid/gid from `id -u` / `id -g`.
    fn current_identity(&self) -> Result<HostIdentity> {
        Ok(HostIdentity {
            uid: numeric_id(self, "id -u")?,
            gid: numeric_id(self, "id -g")?,
        })
    }
}

fn numeric_id<P: HostProbe + ?Sized>(probe: &P, command: &str) -> Result<u32> {
    let out = probe.run(command)?;
    if out.exit_code != 0 {
        return Err(SpaceError::Probe(format!(
            "`{}` exited with {}",
            command, out.exit_code
        )));
    }
    out.stdout.trim().parse::<u32>().map_err(|e| {
        SpaceError::Probe(format!(
            "`{}` printed {:?}, expected a number: {}",
            command,
            out.stdout.trim(),
            e
        ))
    })
}

/// Probe backed by real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellHostProbe;

impl HostProbe for ShellHostProbe {
    fn run(&self, command: &str) -> Result<CommandOutput> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| SpaceError::Probe("empty command".to_string()))?;
        let resolved = which::which(program)
            .map_err(|e| SpaceError::Probe(format!("{} not found on PATH: {}", program, e)))?;
        let output = Command::new(resolved)
            .args(parts)
            .output()
            .map_err(|e| SpaceError::Probe(format!("failed to run `{}`: {}", command, e)))?;
        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}
