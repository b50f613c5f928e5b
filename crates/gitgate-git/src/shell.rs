//! Process-exec backend: one `git` invocation per operation.

use std::io::Write;
use std::path::Path;

use crate::backend::{BackendKind, GitBackend};
use crate::exec::{GitCli, reject_option_like};
use crate::log::{LOG_FORMAT, parse_log_output};
use crate::{Error, Result, UP_TO_DATE_MARKER};

/// Backend that shells out to the `git` binary.
#[derive(Debug, Clone, Default)]
pub struct ShellBackend {
    cli: GitCli,
}

impl ShellBackend {
    pub fn new(cli: GitCli) -> Self {
        Self { cli }
    }

    /// The executor used for every invocation.
    pub fn cli(&self) -> &GitCli {
        &self.cli
    }

    fn current_branch(&self, repo: &Path) -> Option<String> {
        self.cli
            .run(repo, &["rev-parse", "--abbrev-ref", "HEAD"])
            .ok()
            .map(|out| out.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    fn apply(&self, repo: &Path, patch_file: &Path) -> Result<String> {
        let file = patch_file.to_string_lossy();
        let output = self.cli.run(repo, &["apply", "--", file.as_ref()])?;
        let output = output.trim();
        if output.is_empty() {
            Ok("Patch applied successfully".to_string())
        } else {
            Ok(format!("Patch applied successfully\n{output}"))
        }
    }
}

impl GitBackend for ShellBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Shell
    }

    fn status(&self, repo: &Path) -> Result<String> {
        self.cli.run(repo, &["status"])
    }

    fn diff_unstaged(&self, repo: &Path) -> Result<String> {
        self.cli.run(repo, &["diff"])
    }

    fn diff_staged(&self, repo: &Path) -> Result<String> {
        self.cli.run(repo, &["diff", "--cached"])
    }

    fn diff(&self, repo: &Path, target: &str) -> Result<String> {
        reject_option_like("target", target)?;
        self.cli.run(repo, &["diff", target])
    }

    fn commit(&self, repo: &Path, message: &str) -> Result<String> {
        self.cli.run(repo, &["commit", "-m", message])
    }

    fn add(&self, repo: &Path, files: &[String]) -> Result<String> {
        let mut args = vec!["add".to_string(), "--".to_string()];
        args.extend(files.iter().cloned());
        self.cli.run(repo, &args)?;
        Ok("Files staged successfully".to_string())
    }

    fn reset(&self, repo: &Path) -> Result<String> {
        self.cli.run(repo, &["reset"])?;
        Ok("All staged changes reset".to_string())
    }

    fn log(&self, repo: &Path, max_count: usize) -> Result<Vec<String>> {
        let mut args = vec!["log".to_string(), LOG_FORMAT.to_string()];
        if max_count > 0 {
            args.push(format!("-n{max_count}"));
        }
        let output = self.cli.run(repo, &args)?;
        Ok(parse_log_output(&output))
    }

    fn create_branch(&self, repo: &Path, name: &str, base: Option<&str>) -> Result<String> {
        reject_option_like("branch_name", name)?;
        let mut args = vec!["branch", name];
        if let Some(base) = base {
            reject_option_like("base_branch", base)?;
            args.push(base);
        }
        self.cli.run(repo, &args)?;

        let base_ref = match base {
            Some(base) => base.to_string(),
            None => self
                .current_branch(repo)
                .unwrap_or_else(|| "HEAD".to_string()),
        };
        Ok(format!("Created branch '{name}' from '{base_ref}'"))
    }

    fn checkout(&self, repo: &Path, name: &str) -> Result<String> {
        reject_option_like("branch_name", name)?;
        self.cli.run(repo, &["checkout", name])?;
        Ok(format!("Switched to branch '{name}'"))
    }

    fn show(&self, repo: &Path, revision: &str) -> Result<String> {
        reject_option_like("revision", revision)?;
        self.cli.run(repo, &["show", revision])
    }

    fn init(&self, path: &Path) -> Result<String> {
        std::fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
        self.cli.run(path, &["init"])?;
        Ok(format!(
            "Initialized empty Git repository in {}",
            path.join(".git").display()
        ))
    }

    fn push(&self, repo: &Path, remote: Option<&str>, branch: Option<&str>) -> Result<String> {
        let remote = remote.unwrap_or("origin");
        reject_option_like("remote", remote)?;
        let branch = match branch {
            Some(branch) => {
                reject_option_like("branch", branch)?;
                branch.to_string()
            }
            None => self
                .current_branch(repo)
                .filter(|name| name != "HEAD")
                .ok_or(Error::DetachedHead)?,
        };

        let output = self.cli.run(repo, &["push", remote, branch.as_str()])?;
        if output.contains(UP_TO_DATE_MARKER) {
            return Ok(output);
        }
        Ok(format!("Successfully pushed to {remote}/{branch}\n{output}"))
    }

    fn apply_patch_from_string(&self, repo: &Path, patch: &str) -> Result<String> {
        let mut file = tempfile::Builder::new()
            .prefix("gitgate-")
            .suffix(".patch")
            .tempfile()
            .map_err(|e| Error::io(std::env::temp_dir(), e))?;
        let path = file.path().to_path_buf();
        file.write_all(patch.as_bytes())
            .map_err(|e| Error::io(&path, e))?;
        file.flush().map_err(|e| Error::io(&path, e))?;

        self.apply(repo, file.path())
    }

    fn apply_patch_from_file(&self, repo: &Path, patch_file: &Path) -> Result<String> {
        self.apply(repo, patch_file)
    }
}
