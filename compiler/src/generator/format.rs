use crate::error::CompileError;
use std::{
    io::Write,
    process::{Command, Stdio},
    thread,
};
use tracing::debug;

/// Post-processing applied to rendered source. Formatting is cosmetic; the
/// rendered text is already valid for its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formatter {
    None,
    /// An external program that reads source on stdin and writes the
    /// formatted source to stdout.
    Command { program: String, args: Vec<String> },
}

impl Formatter {
    pub fn rustfmt() -> Formatter {
        Formatter::Command {
            program: "rustfmt".to_string(),
            args: vec!["--edition".to_string(), "2021".to_string()],
        }
    }

    pub fn gofmt() -> Formatter {
        Formatter::Command {
            program: "gofmt".to_string(),
            args: Vec::new(),
        }
    }

    pub fn format(&self, source: String) -> Result<String, CompileError> {
        let (program, args) = match self {
            Formatter::None => return Ok(source),
            Formatter::Command { program, args } => (program, args),
        };
        debug!(program = %program, bytes = source.len(), "formatting generated source");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| CompileError::Generation(format!("failed to run {}: {}", program, err)))?;

        // Feed stdin from another thread so a full stdout pipe cannot stall us.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CompileError::Generation(format!("failed to open stdin of {}", program)))?;
        let writer = thread::spawn(move || stdin.write_all(source.as_bytes()));

        let output = child
            .wait_with_output()
            .map_err(|err| CompileError::Generation(format!("failed to run {}: {}", program, err)))?;
        let written = writer
            .join()
            .map_err(|_| CompileError::Generation(format!("failed to write to {}", program)))?;

        if !output.status.success() {
            return Err(CompileError::Generation(format!(
                "{} failed: {}",
                program,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        written.map_err(|err| CompileError::Generation(format!("failed to write to {}: {}", program, err)))?;

        String::from_utf8(output.stdout)
            .map_err(|err| CompileError::Generation(format!("{} produced invalid UTF-8: {}", program, err)))
    }
}
