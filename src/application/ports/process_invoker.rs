use async_trait::async_trait;
use std::collections::BTreeMap;

/// Errors a `ProcessInvoker` can surface. A non-zero exit is not one of
/// them: it comes back as a `ProcessOutcome`.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessInvokerError {
    /// The program could not be started at all.
    LaunchFailed { program: String, message: String },
    /// The program started but its output could not be collected.
    IoError(String),
}

impl std::fmt::Display for ProcessInvokerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessInvokerError::LaunchFailed { program, message } => {
                write!(f, "Failed to launch {}: {}", program, message)
            }
            ProcessInvokerError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for ProcessInvokerError {}

/// One external program call: program, ordered arguments and extra
/// environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl ProcessInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// `--flag value`
    pub fn option(self, flag: &str, value: impl Into<String>) -> Self {
        self.arg(flag).arg(value)
    }

    /// `--flag value`, only when a value is present.
    pub fn optional(self, flag: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.option(flag, v),
            None => self,
        }
    }

    /// `--flag v1 v2 ...`, skipped entirely for an empty list.
    pub fn option_list<S: Into<String>>(self, flag: &str, values: Vec<S>) -> Self {
        if values.is_empty() {
            return self;
        }
        self.arg(flag).args(values)
    }

    pub fn switch(self, flag: &str, enabled: bool) -> Self {
        if enabled { self.arg(flag) } else { self }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Value following `flag`, if the flag is present.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

/// What happened once the child exited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessOutcome {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub pid: Option<u32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Last `max_lines` lines of stderr, for failure reports.
    pub fn stderr_tail(&self, max_lines: usize) -> String {
        let lines: Vec<&str> = self.stderr.lines().collect();
        let start = lines.len().saturating_sub(max_lines);
        lines[start..].join("\n")
    }
}

#[async_trait]
pub trait ProcessInvoker: Send + Sync {
    /// Starts exactly one child, feeds it no input and resolves once it has
    /// exited with all of its output collected.
    async fn invoke(
        &self,
        invocation: ProcessInvocation,
    ) -> Result<ProcessOutcome, ProcessInvokerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_skips_absent_values() {
        let invocation = ProcessInvocation::new("python3")
            .arg("extract.py")
            .option("--run-id", "7")
            .optional("--model-name", None::<String>)
            .option_list("--valid-tasks", vec!["text", "figures"])
            .option_list::<String>("--allowed-nodes", Vec::new())
            .switch("--no-pipeline", false)
            .switch("--aura-ds", true);

        assert_eq!(
            invocation.args,
            vec![
                "extract.py",
                "--run-id",
                "7",
                "--valid-tasks",
                "text",
                "figures",
                "--aura-ds"
            ]
        );
        assert_eq!(invocation.value_of("--run-id"), Some("7"));
        assert_eq!(invocation.value_of("--model-name"), None);
    }

    #[test]
    fn test_stderr_tail() {
        let outcome = ProcessOutcome {
            exit_code: Some(1),
            stderr: "one\ntwo\nthree".to_string(),
            ..Default::default()
        };
        assert!(!outcome.success());
        assert_eq!(outcome.stderr_tail(2), "two\nthree");
        assert_eq!(outcome.stderr_tail(10), "one\ntwo\nthree");
    }
}
