//! Process execution of the `git` binary
//!
//! [`GitCli`] is the leaf of every shell-backed operation: it runs one
//! subcommand in a working directory and hands back the combined output.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::{Error, Result};

/// Runs single `git` subcommands against a working directory.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }
}

impl GitCli {
    /// Use a specific `git` executable instead of the one found on `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The executable this runner spawns.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run `git <args>` with `dir` as working directory.
    ///
    /// Returns stdout followed by stderr. A non-zero exit status becomes
    /// [`Error::CommandFailed`] carrying that same combined output.
    pub fn run<S: AsRef<str>>(&self, dir: &Path, args: &[S]) -> Result<String> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        tracing::debug!(
            program = %self.program.display(),
            dir = %dir.display(),
            args = ?args,
            "Running git"
        );

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(dir)
            .output()
            .map_err(|source| Error::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(combined)
        } else {
            let code = output.status.code().unwrap_or(-1);
            tracing::debug!(code, output = %combined, "git exited with failure");
            Err(Error::CommandFailed {
                command: format!("git {}", args.join(" ")),
                code,
                output: combined,
            })
        }
    }
}

/// Refuse user-supplied values that git would parse as an option.
pub(crate) fn reject_option_like(field: &str, value: &str) -> Result<()> {
    if value.starts_with('-') {
        return Err(Error::InvalidArgument {
            message: format!("{field} must not start with '-': {value}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_program_reports_spawn_error() {
        let temp = TempDir::new().unwrap();
        let cli = GitCli::with_program("/definitely/not/a/git/binary");
        let err = cli.run(temp.path(), &["status"]).unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }

    #[test]
    fn failure_embeds_output() {
        let temp = TempDir::new().unwrap();
        let err = GitCli::default()
            .run(temp.path(), &["rev-parse", "--verify", "HEAD"])
            .unwrap_err();
        match err {
            Error::CommandFailed { command, output, .. } => {
                assert!(command.starts_with("git rev-parse"));
                assert!(!output.is_empty());
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn option_like_values_are_rejected() {
        assert!(reject_option_like("target", "--output=/tmp/x").is_err());
        assert!(reject_option_like("target", "main").is_ok());
        assert!(reject_option_like("target", "HEAD~1").is_ok());
    }
}
