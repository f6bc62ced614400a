use crate::backend::traits::CommandResult;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("usage: {0}")]
    Usage(String),

    #[error("no active network adapter with an Ethernet description was found")]
    NoActiveAdapter,

    #[error("{step} failed: {}", describe_failure(.result))]
    Command {
        step: &'static str,
        result: CommandResult,
    },

    #[error("{step}: failed to run {program}: {source}")]
    Spawn {
        step: &'static str,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{step}: unexpected output: {source}")]
    MalformedOutput {
        step: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{step}: unexpected output: {output:?}")]
    UnexpectedOutput { step: &'static str, output: String },

    #[error("{host} did not resolve within {}s", .elapsed.as_secs())]
    Timeout { host: String, elapsed: Duration },
}

fn describe_failure(result: &CommandResult) -> String {
    let detail = if !result.stderr.is_empty() {
        result.stderr.as_str()
    } else if !result.stdout.is_empty() {
        result.stdout.as_str()
    } else {
        "no output"
    };
    format!("{} exited with {}: {detail}", result.program, result.status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_prefers_stderr() {
        let err = SetupError::Command {
            step: "flush resolver cache",
            result: CommandResult {
                program: "ipconfig".to_string(),
                args: vec!["/flushdns".to_string()],
                status: 1,
                stdout: "Windows IP Configuration".to_string(),
                stderr: "The requested operation requires elevation.".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "flush resolver cache failed: ipconfig exited with 1: The requested operation requires elevation."
        );
    }

    #[test]
    fn timeout_reports_seconds() {
        let err = SetupError::Timeout {
            host: "www.microsoft.com".to_string(),
            elapsed: Duration::from_secs(3605),
        };
        assert_eq!(err.to_string(), "www.microsoft.com did not resolve within 3605s");
    }
}
