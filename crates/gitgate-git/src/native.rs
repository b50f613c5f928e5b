//! libgit2-backed backend
//!
//! Operations libgit2 models directly (status, commit, add, branches, init,
//! push, log) run in-process through `git2`. Everything else is delegated to
//! the owned [`ShellBackend`].

use std::path::{Component, Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{
    Cred, CredentialType, Direction, ErrorCode, Index, IndexAddOption, IndexMatchedPath,
    ObjectType, PushOptions, RemoteCallbacks, Repository, Signature, Sort, Status, StatusOptions,
};

use crate::backend::{BackendKind, CommitAuthor, GitBackend};
use crate::exec::reject_option_like;
use crate::log::render_commit;
use crate::{Error, Result, ShellBackend};

/// Backend that links libgit2 and shells out only where it has to.
#[derive(Debug, Clone)]
pub struct Git2Backend {
    shell: ShellBackend,
    author: CommitAuthor,
}

impl Git2Backend {
    pub fn new(shell: ShellBackend, author: CommitAuthor) -> Self {
        Self { shell, author }
    }

    /// Identity written into commits made by this backend.
    pub fn author(&self) -> &CommitAuthor {
        &self.author
    }
}

fn open(path: &Path) -> Result<Repository> {
    Ok(Repository::discover(path)?)
}

fn workdir(repo: &Repository) -> Result<PathBuf> {
    repo.workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::BareRepository {
            path: repo.path().to_path_buf(),
        })
}

/// Get the current branch name, or `None` when HEAD is detached.
pub fn get_current_branch(repo: &Repository) -> Result<Option<String>> {
    let head = repo.head()?;

    if head.is_branch() {
        Ok(Some(head.shorthand().unwrap_or("HEAD").to_string()))
    } else {
        Ok(None)
    }
}

/// Name of the branch HEAD points to, even before the first commit.
fn head_branch_name(repo: &Repository) -> Option<String> {
    let head = repo.find_reference("HEAD").ok()?;
    let target = head.symbolic_target()?;
    target.strip_prefix("refs/heads/").map(str::to_string)
}

/// Express `file` (relative to the requested directory `base`) as a path
/// relative to the repository's working directory.
fn pathspec_for(workdir: &Path, base: &Path, file: &str) -> Result<String> {
    let workdir = dunce::canonicalize(workdir).map_err(|e| Error::io(workdir, e))?;
    let base = dunce::canonicalize(base).map_err(|e| Error::io(base, e))?;
    let joined = clean_lexically(&base.join(file));
    let relative = joined
        .strip_prefix(&workdir)
        .map_err(|_| Error::OutsideRepository {
            pathspec: file.to_string(),
        })?;
    let spec = relative.to_string_lossy().replace('\\', "/");
    Ok(if spec.is_empty() { ".".to_string() } else { spec })
}

/// Drop `.` segments and fold `..` into its parent without touching disk.
fn clean_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Whether `spec` names a tracked file or a directory holding tracked files.
fn is_tracked(index: &Index, spec: &str) -> bool {
    if spec == "." {
        return !index.is_empty();
    }
    let prefix = format!("{spec}/");
    index.iter().any(|entry| {
        let path = String::from_utf8_lossy(&entry.path);
        path == spec || path.starts_with(&prefix)
    })
}

fn index_code(status: Status) -> char {
    if status.is_index_new() {
        'A'
    } else if status.is_index_modified() {
        'M'
    } else if status.is_index_deleted() {
        'D'
    } else if status.is_index_renamed() {
        'R'
    } else if status.is_index_typechange() {
        'T'
    } else {
        ' '
    }
}

fn worktree_code(status: Status) -> char {
    if status.is_wt_modified() {
        'M'
    } else if status.is_wt_deleted() {
        'D'
    } else if status.is_wt_renamed() {
        'R'
    } else if status.is_wt_typechange() {
        'T'
    } else {
        ' '
    }
}

/// Short two-column code, as in `git status --short`.
pub(crate) fn status_code(status: Status) -> String {
    if status.is_conflicted() {
        return "UU".to_string();
    }
    if status.is_wt_new() && index_code(status) == ' ' {
        return "??".to_string();
    }
    format!("{}{}", index_code(status), worktree_code(status))
}

fn remote_callbacks(config: &git2::Config) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |url, username, allowed| {
        if allowed.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(username.unwrap_or("git"));
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            return Cred::credential_helper(config, url, username);
        }
        Cred::default()
    });
    callbacks
}

impl GitBackend for Git2Backend {
    fn kind(&self) -> BackendKind {
        BackendKind::Libgit2
    }

    fn status(&self, repo_path: &Path) -> Result<String> {
        let repo = open(repo_path)?;

        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .renames_head_to_index(true);
        let statuses = repo.statuses(Some(&mut opts))?;

        let mut out = match head_branch_name(&repo) {
            Some(branch) => format!("On branch {branch}\n"),
            None => "HEAD detached\n".to_string(),
        };

        if statuses.is_empty() {
            out.push_str("nothing to commit, working tree clean\n");
            return Ok(out);
        }

        for entry in statuses.iter() {
            let path = entry.path().unwrap_or("<non-utf8 path>");
            out.push_str(&format!("{} {}\n", status_code(entry.status()), path));
        }
        Ok(out)
    }

    fn diff_unstaged(&self, repo: &Path) -> Result<String> {
        self.shell.diff_unstaged(repo)
    }

    fn diff_staged(&self, repo: &Path) -> Result<String> {
        self.shell.diff_staged(repo)
    }

    fn diff(&self, repo: &Path, target: &str) -> Result<String> {
        self.shell.diff(repo, target)
    }

    fn commit(&self, repo_path: &Path, message: &str) -> Result<String> {
        let repo = open(repo_path)?;
        let mut index = repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => None,
            Err(e) => return Err(e.into()),
        };

        let unchanged = match &parent {
            Some(parent) => parent.tree_id() == tree_id,
            None => tree.is_empty(),
        };
        if unchanged {
            return Err(Error::NothingToCommit);
        }

        let signature = Signature::now(&self.author.name, &self.author.email)?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let oid = repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        tracing::debug!(commit = %oid, "Created commit");
        Ok(format!("Changes committed successfully with hash {oid}"))
    }

    fn add(&self, repo_path: &Path, files: &[String]) -> Result<String> {
        let repo = open(repo_path)?;
        let workdir = workdir(&repo)?;
        let mut index = repo.index()?;

        for file in files {
            let spec = pathspec_for(&workdir, repo_path, file)?;
            let tracked = is_tracked(&index, &spec);
            if workdir.join(&spec).exists() {
                if !tracked && repo.is_path_ignored(Path::new(&spec))? {
                    return Err(Error::PathIgnored {
                        pathspec: file.clone(),
                    });
                }
                let mut matched = 0usize;
                let mut count = |_: &Path, _: &[u8]| {
                    matched += 1;
                    0
                };
                index.add_all(
                    [spec.as_str()],
                    IndexAddOption::DEFAULT,
                    Some(&mut count as &mut IndexMatchedPath<'_>),
                )?;
                if matched == 0 && !tracked {
                    return Err(Error::PathspecNotFound {
                        pathspec: file.clone(),
                    });
                }
            } else if index.get_path(Path::new(&spec), 0).is_some() {
                index.remove_path(Path::new(&spec))?;
            } else {
                return Err(Error::PathspecNotFound {
                    pathspec: file.clone(),
                });
            }
        }

        index.write()?;
        Ok("Files staged successfully".to_string())
    }

    fn reset(&self, repo: &Path) -> Result<String> {
        self.shell.reset(repo)
    }

    fn log(&self, repo_path: &Path, max_count: usize) -> Result<Vec<String>> {
        let repo = open(repo_path)?;
        let head = repo.head()?.peel_to_commit()?;

        let mut revwalk = repo.revwalk()?;
        revwalk.push(head.id())?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        let limit = if max_count == 0 { usize::MAX } else { max_count };
        let mut entries = Vec::new();
        for oid in revwalk.take(limit) {
            let commit = repo.find_commit(oid?)?;
            entries.push(render_commit(&commit));
        }
        Ok(entries)
    }

    fn create_branch(&self, repo_path: &Path, name: &str, base: Option<&str>) -> Result<String> {
        reject_option_like("branch_name", name)?;
        let repo = open(repo_path)?;

        let (base_commit, base_name) = match base {
            Some(base_name) => {
                reject_option_like("base_branch", base_name)?;
                let commit = repo
                    .revparse_single(base_name)
                    .and_then(|object| object.peel_to_commit())
                    .map_err(|_| Error::BranchNotFound {
                        name: base_name.to_string(),
                    })?;
                (commit, base_name.to_string())
            }
            None => {
                let head = repo.head()?;
                let commit = head.peel_to_commit()?;
                let name = if head.is_branch() {
                    head.shorthand().unwrap_or("HEAD").to_string()
                } else {
                    commit.id().to_string()
                };
                (commit, name)
            }
        };

        repo.branch(name, &base_commit, false)?;
        Ok(format!("Created branch '{name}' from '{base_name}'"))
    }

    fn checkout(&self, repo_path: &Path, name: &str) -> Result<String> {
        let repo = open(repo_path)?;
        let refname = format!("refs/heads/{name}");
        let reference = repo
            .find_reference(&refname)
            .map_err(|_| Error::BranchNotFound {
                name: name.to_string(),
            })?;
        let target = reference.peel(ObjectType::Commit)?;

        repo.checkout_tree(&target, Some(CheckoutBuilder::new().safe()))?;
        repo.set_head(&refname)?;
        Ok(format!("Switched to branch '{name}'"))
    }

    fn show(&self, repo: &Path, revision: &str) -> Result<String> {
        self.shell.show(repo, revision)
    }

    fn init(&self, path: &Path) -> Result<String> {
        std::fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
        Repository::init(path)?;
        Ok(format!(
            "Initialized empty Git repository in {}",
            path.join(".git").display()
        ))
    }

    fn push(&self, repo_path: &Path, remote: Option<&str>, branch: Option<&str>) -> Result<String> {
        let repo = open(repo_path)?;
        let remote_name = remote.unwrap_or("origin");
        let branch_name = match branch {
            Some(b) => b.to_string(),
            None => get_current_branch(&repo)?.ok_or(Error::DetachedHead)?,
        };

        let refname = format!("refs/heads/{branch_name}");
        let local_oid = repo
            .refname_to_id(&refname)
            .map_err(|_| Error::BranchNotFound {
                name: branch_name.clone(),
            })?;

        let mut remote = repo
            .find_remote(remote_name)
            .map_err(|_| Error::RemoteNotFound {
                name: remote_name.to_string(),
            })?;
        let config = repo.config()?;

        let up_to_date = {
            let connection =
                remote.connect_auth(Direction::Push, Some(remote_callbacks(&config)), None)?;
            connection
                .list()?
                .iter()
                .any(|head| head.name() == refname && head.oid() == local_oid)
        };
        if up_to_date {
            return Ok("Everything up-to-date".to_string());
        }

        let mut rejection: Option<String> = None;
        {
            let mut callbacks = remote_callbacks(&config);
            callbacks.push_update_reference(|reference, status| {
                if let Some(message) = status {
                    rejection = Some(format!("{reference}: {message}"));
                }
                Ok(())
            });
            let mut opts = PushOptions::new();
            opts.remote_callbacks(callbacks);

            let refspec = format!("{refname}:{refname}");
            remote
                .push(&[refspec.as_str()], Some(&mut opts))
                .map_err(|e| Error::PushFailed {
                    message: e.message().to_string(),
                })?;
        }

        if let Some(message) = rejection {
            return Err(Error::PushFailed { message });
        }
        Ok(format!("Successfully pushed to {remote_name}/{branch_name}"))
    }

    fn apply_patch_from_string(&self, repo: &Path, patch: &str) -> Result<String> {
        self.shell.apply_patch_from_string(repo, patch)
    }

    fn apply_patch_from_file(&self, repo: &Path, patch_file: &Path) -> Result<String> {
        self.shell.apply_patch_from_file(repo, patch_file)
    }
}
