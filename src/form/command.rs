//! `commonforms` command-line wrapper
//!
//! Runs the conversion as a child process:
//! `<command> <input> <output> --model M --device D --confidence C [--fast] [--keep-existing-fields]`

use super::FormPreparer;
use crate::config::FormOptions;
use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

/// Variable holding the command line used to run the conversion
pub const COMMAND_VAR: &str = "COMMONFORMS_COMMAND";

pub const DEFAULT_COMMAND: &str = "commonforms";

/// Wrapper for the `commonforms` CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPreparer {
    program: String,
    args: Vec<String>,
}

impl Default for CommandPreparer {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND)
    }
}

impl CommandPreparer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Arguments placed before the input/output paths, e.g. `-m commonforms`
    /// for `python3 -m commonforms`
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Split a command line on whitespace. Returns `None` for a blank line.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program).with_args(parts))
    }

    /// Build from `COMMONFORMS_COMMAND`, falling back to `commonforms`
    pub fn from_env() -> Self {
        std::env::var(COMMAND_VAR)
            .ok()
            .and_then(|line| Self::parse(&line))
            .unwrap_or_default()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list for one conversion
    fn conversion_args(&self, input: &Path, output: &Path, options: &FormOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        args.push(input.as_os_str().to_owned());
        args.push(output.as_os_str().to_owned());
        args.push("--model".into());
        args.push(options.model_or_path.clone().into());
        args.push("--device".into());
        args.push(options.device.clone().into());
        args.push("--confidence".into());
        args.push(options.confidence.to_string().into());
        if options.fast {
            args.push("--fast".into());
        }
        if options.keep_existing_fields {
            args.push("--keep-existing-fields".into());
        }
        args
    }
}

/// Last non-empty line of the child's stderr; tracebacks end with the message
fn failure_reason(stderr: &[u8]) -> Option<String> {
    String::from_utf8_lossy(stderr)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(|line| strip_exception_type(line).to_string())
}

/// Drop a leading `SomeError: ` / `pkg.SomeException: ` from a traceback line
fn strip_exception_type(line: &str) -> &str {
    let Some((name, message)) = line.split_once(": ") else {
        return line;
    };

    let is_identifier = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');

    if is_identifier && (name.ends_with("Error") || name.ends_with("Exception")) {
        message
    } else {
        line
    }
}

impl FormPreparer for CommandPreparer {
    fn prepare_form(&self, input: &Path, output: &Path, options: &FormOptions) -> Result<()> {
        let args = self.conversion_args(input, output, options);
        tracing::debug!(program = %self.program, ?args, "Running conversion command");

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::Conversion {
                reason: format!("Failed to run {}: {}", self.program, e),
            })?;

        if !result.stdout.is_empty() {
            tracing::debug!(
                stdout = %String::from_utf8_lossy(&result.stdout),
                "Conversion command output"
            );
        }

        if result.status.success() {
            return Ok(());
        }

        tracing::warn!(
            program = %self.program,
            status = %result.status,
            stderr = %String::from_utf8_lossy(&result.stderr),
            "Conversion command failed"
        );

        Err(Error::Conversion {
            reason: failure_reason(&result.stderr)
                .unwrap_or_else(|| format!("{} exited with {}", self.program, result.status)),
        })
    }
}
