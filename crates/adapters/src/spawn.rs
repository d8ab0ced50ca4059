// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess spawning: resume/create command construction, the
//! resume-then-create fallback, and the hard-timeout variant used by
//! `ask_agent`.

use crate::error::SpawnError;
use conclave_core::AgentId;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// Stderr substring the dispatcher relies on to distinguish "session doesn't
/// exist" from any other subprocess failure.
pub const SESSION_MISSING_SENTINEL: &str = "No conversation found";

#[derive(Debug, Clone)]
pub struct SpawnOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl SpawnOutput {
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn is_session_missing(&self) -> bool {
        !self.is_success() && self.stderr.contains(SESSION_MISSING_SENTINEL)
    }
}

fn resume_args(agent_bin: &str, session_id: &str, prompt: &str) -> Vec<String> {
    vec![agent_bin.to_string(), "-r".to_string(), session_id.to_string(), prompt.to_string(), "-p".to_string()]
}

fn create_args(agent_bin: &str, session_id: &str, prompt: &str) -> Vec<String> {
    vec![
        agent_bin.to_string(),
        "--session-id".to_string(),
        session_id.to_string(),
        prompt.to_string(),
        "-p".to_string(),
    ]
}

async fn run(args: &[String], env: &[(String, String)]) -> Result<SpawnOutput, SpawnError> {
    let mut cmd = Command::new(&args[0]);
    cmd.args(&args[1..]);
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());

    let output = cmd.output().await.map_err(SpawnError::ExecFailed)?;
    Ok(SpawnOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
    })
}

/// Run the resume command; on a non-zero exit carrying the session-missing
/// sentinel, retry exactly once against the create command with the same
/// session id and prompt. Returns the final output and whether the resume
/// path succeeded (`false` means the create fallback ran).
pub async fn spawn_with_resume_fallback(
    agent_bin: &str,
    agent_id: &AgentId,
    session_id: &str,
    prompt: &str,
    extra_env: &[(String, String)],
) -> Result<(SpawnOutput, bool), SpawnError> {
    let mut env = vec![("AGENT_ID".to_string(), agent_id.as_str().to_string())];
    env.extend(extra_env.iter().cloned());

    let output = run(&resume_args(agent_bin, session_id, prompt), &env).await?;
    if output.is_session_missing() {
        tracing::warn!(agent_id = %agent_id, "resume failed, session missing; retrying create");
        let retry = run(&create_args(agent_bin, session_id, prompt), &env).await?;
        return Ok((retry, false));
    }
    Ok((output, true))
}

/// Spawn the resume command with a hard wall-clock timeout, killing the
/// child if it is exceeded. Used by `ask_agent`; does not perform the
/// resume/create fallback (a timed-out call is a failure, not a retry case).
pub async fn spawn_with_timeout(
    agent_bin: &str,
    agent_id: &AgentId,
    session_id: &str,
    prompt: &str,
    extra_env: &[(String, String)],
    timeout: Duration,
) -> Result<SpawnOutput, SpawnError> {
    let mut env = vec![("AGENT_ID".to_string(), agent_id.as_str().to_string())];
    env.extend(extra_env.iter().cloned());

    let args = resume_args(agent_bin, session_id, prompt);
    let mut cmd = Command::new(&args[0]);
    cmd.args(&args[1..]);
    for (key, value) in &env {
        cmd.env(key, value);
    }
    cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(SpawnError::ExecFailed)?;
    let mut stdout_pipe = child.stdout.take().expect("stdout piped");
    let mut stderr_pipe = child.stderr.take().expect("stderr piped");

    let wait = async {
        let mut stdout = String::new();
        let mut stderr = String::new();
        let _ = stdout_pipe.read_to_string(&mut stdout).await;
        let _ = stderr_pipe.read_to_string(&mut stderr).await;
        let status = child.wait().await?;
        Ok::<_, std::io::Error>(SpawnOutput { stdout, stderr, exit_code: status.code() })
    };

    match tokio::time::timeout(timeout, wait).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(SpawnError::ExecFailed(e)),
        Err(_) => {
            let _ = child.start_kill();
            let _ = child.wait().await;
            Err(SpawnError::Timeout(timeout))
        }
    }
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;
