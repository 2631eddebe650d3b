use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

use crate::application::ports::process_invoker::{
    ProcessInvocation, ProcessInvoker, ProcessInvokerError, ProcessOutcome,
};

/// Runs external programs as child processes of this server.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessInvoker;

impl TokioProcessInvoker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessInvoker for TokioProcessInvoker {
    async fn invoke(
        &self,
        invocation: ProcessInvocation,
    ) -> Result<ProcessOutcome, ProcessInvokerError> {
        let started = Instant::now();

        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(&invocation.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                tracing::error!("Failed to launch {}: {}", invocation.program, e);
                ProcessInvokerError::LaunchFailed {
                    program: invocation.program.clone(),
                    message: e.to_string(),
                }
            })?;

        let pid = child.id();
        tracing::info!(
            "Started {} (pid {:?}) with {} arguments",
            invocation.program,
            pid,
            invocation.args.len()
        );

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ProcessInvokerError::IoError(e.to_string()))?;

        let outcome = ProcessOutcome {
            exit_code: output.status.code(),
            pid,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::info!(
            "{} (pid {:?}) exited with {:?} after {} ms",
            invocation.program,
            pid,
            outcome.exit_code,
            started.elapsed().as_millis()
        );
        if !outcome.stdout.is_empty() {
            tracing::debug!("{} stdout:\n{}", invocation.program, outcome.stdout);
        }
        if !outcome.stderr.is_empty() {
            tracing::debug!("{} stderr:\n{}", invocation.program, outcome.stderr);
        }

        Ok(outcome)
    }
}
