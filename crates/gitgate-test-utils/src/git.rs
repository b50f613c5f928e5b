//! Git repository fixtures built with the `git` CLI.
//!
//! Every fixture configures a local identity and disables signing so the
//! tests never depend on the machine's global git configuration.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Run `git <args>` in `dir` and return stdout.
///
/// # Panics
/// Panics if git cannot be spawned or exits with a failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap_or_else(|e| panic!("failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "`git {args:?}` failed in {}:\n{}",
            dir.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Initialise an empty repository whose unborn branch is `main`.
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo(path: &Path) {
    fs::create_dir_all(path)
        .unwrap_or_else(|e| panic!("real_git_repo: failed to create {}: {e}", path.display()));
    git(path, &["init"]);
    // Works on every git version, unlike `init -b`
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(path, &["config", "user.email", "test@test.com"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "commit.gpgsign", "false"]);
}

/// Initialise a repository on `main` with `README.md` committed.
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) {
    real_git_repo(path);
    fs::write(path.join("README.md"), "# Test\n")
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to write README.md: {e}"));
    git(path, &["add", "README.md"]);
    git(path, &["commit", "-m", "Initial commit"]);
}

/// Create a bare repository at `remote`, register it as `origin` of `repo`
/// and push `main` to it, so `repo` starts level with its remote.
///
/// # Panics
/// Panics if any git operation fails.
pub fn bare_remote(repo: &Path, remote: &Path) {
    fs::create_dir_all(remote)
        .unwrap_or_else(|e| panic!("bare_remote: failed to create {}: {e}", remote.display()));
    git(remote, &["init", "--bare"]);
    let remote_str = remote.to_string_lossy();
    git(repo, &["remote", "add", "origin", remote_str.as_ref()]);
    git(repo, &["push", "origin", "main"]);
}

/// Name of the branch currently checked out in `repo`.
pub fn current_branch(repo: &Path) -> String {
    git(repo, &["rev-parse", "--abbrev-ref", "HEAD"])
        .trim()
        .to_string()
}
