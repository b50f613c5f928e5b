//! The dispatcher: tool name and arguments in, text or [`GatewayError`] out.

use std::path::PathBuf;
use std::sync::Arc;

use gitgate_git::{BackendKind, GitBackend};
use serde_json::Value;

use crate::catalog::{ToolName, advertised_tools};
use crate::guard::PathGuard;
use crate::path::absolutize;
use crate::registry::RepositoryRegistry;
use crate::request::ToolRequest;
use crate::{GatewayError, Result};

/// Routes validated tool requests to the selected git backend.
///
/// Holds no per-call state; the registry is the only thing a call can
/// change, and only by growing it after a successful init.
pub struct Gateway {
    backend: Arc<dyn GitBackend>,
    guard: PathGuard,
    write_access: bool,
}

impl Gateway {
    pub fn new(
        backend: Arc<dyn GitBackend>,
        registry: Arc<RepositoryRegistry>,
        write_access: bool,
    ) -> Self {
        Self {
            backend,
            guard: PathGuard::new(registry),
            write_access,
        }
    }

    pub fn registry(&self) -> &Arc<RepositoryRegistry> {
        self.guard.registry()
    }

    pub fn guard(&self) -> &PathGuard {
        &self.guard
    }

    pub fn write_access(&self) -> bool {
        self.write_access
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Tools callers may see under the current write-access setting.
    pub fn advertised_tools(&self) -> Vec<ToolName> {
        advertised_tools(self.write_access)
    }

    /// Decode `arguments` for the tool called `name` and run it.
    pub fn call(&self, name: &str, arguments: &Value) -> Result<String> {
        let tool: ToolName = name.parse()?;
        if tool == ToolName::Push && !self.write_access {
            return Err(GatewayError::WriteAccessDisabled);
        }
        let request = ToolRequest::decode(tool, arguments)?;
        self.dispatch(request)
    }

    /// Run an already decoded request.
    pub fn dispatch(&self, request: ToolRequest) -> Result<String> {
        let tool = request.tool();
        tracing::debug!(tool = %tool, backend = %self.backend.kind(), "Dispatching tool call");

        let fail = GatewayError::backend(tool.action());
        let backend = self.backend.as_ref();

        match request {
            ToolRequest::ListRepositories => Ok(self.registry().describe()),

            ToolRequest::Init(args) => {
                let path = self.guard.resolve_init_target(args.repo_path.as_deref())?;
                let out = backend.init(&path).map_err(fail)?;
                self.registry().append(path);
                Ok(out)
            }

            ToolRequest::Push(args) => {
                if !self.write_access {
                    return Err(GatewayError::WriteAccessDisabled);
                }
                let repo = self.resolve(&args.repo_path)?;
                backend
                    .push(&repo, non_empty(&args.remote), non_empty(&args.branch))
                    .map_err(fail)
            }

            ToolRequest::Status(args) => {
                let repo = self.resolve(&args.repo_path)?;
                let status = backend.status(&repo).map_err(fail)?;
                Ok(format!("Repository status for {}:\n{status}", repo.display()))
            }

            ToolRequest::DiffUnstaged(args) => {
                let repo = self.resolve(&args.repo_path)?;
                let diff = backend.diff_unstaged(&repo).map_err(fail)?;
                Ok(format!("Unstaged changes for {}:\n{diff}", repo.display()))
            }

            ToolRequest::DiffStaged(args) => {
                let repo = self.resolve(&args.repo_path)?;
                let diff = backend.diff_staged(&repo).map_err(fail)?;
                Ok(format!("Staged changes for {}:\n{diff}", repo.display()))
            }

            ToolRequest::Diff(args) => {
                let repo = self.resolve(&args.repo_path)?;
                let diff = backend.diff(&repo, &args.target).map_err(fail)?;
                Ok(format!(
                    "Diff with {} for {}:\n{diff}",
                    args.target,
                    repo.display()
                ))
            }

            ToolRequest::Commit(args) => {
                let repo = self.resolve(&args.repo_path)?;
                backend.commit(&repo, &args.message).map_err(fail)
            }

            ToolRequest::Add(args) => {
                let repo = self.resolve(&args.repo_path)?;
                backend.add(&repo, &args.files).map_err(fail)
            }

            ToolRequest::Reset(args) => {
                let repo = self.resolve(&args.repo_path)?;
                backend.reset(&repo).map_err(fail)
            }

            ToolRequest::Log(args) => {
                let repo = self.resolve(&args.repo_path)?;
                let entries = backend.log(&repo, args.limit()).map_err(fail)?;
                Ok(format!(
                    "Commit history for {}:\n{}",
                    repo.display(),
                    entries.join("\n")
                ))
            }

            ToolRequest::CreateBranch(args) => {
                let repo = self.resolve(&args.repo_path)?;
                backend
                    .create_branch(&repo, &args.branch_name, non_empty(&args.base_branch))
                    .map_err(fail)
            }

            ToolRequest::Checkout(args) => {
                let repo = self.resolve(&args.repo_path)?;
                backend.checkout(&repo, &args.branch_name).map_err(fail)
            }

            ToolRequest::Show(args) => {
                let repo = self.resolve(&args.repo_path)?;
                backend.show(&repo, &args.revision).map_err(fail)
            }

            ToolRequest::ApplyPatchString(args) => {
                let repo = self.resolve(&args.repo_path)?;
                backend
                    .apply_patch_from_string(&repo, &args.patch_string)
                    .map_err(fail)
            }

            ToolRequest::ApplyPatchFile(args) => {
                let repo = self.resolve(&args.repo_path)?;
                let patch = resolve_patch_file(tool, args.patch_file.trim())?;
                backend.apply_patch_from_file(&repo, &patch).map_err(fail)
            }
        }
    }

    fn resolve(&self, requested: &Option<String>) -> Result<PathBuf> {
        self.guard.resolve(requested.as_deref())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn resolve_patch_file(tool: ToolName, raw: &str) -> Result<PathBuf> {
    let path = absolutize(raw).map_err(|e| {
        GatewayError::invalid_argument(tool.as_str(), format!("Invalid patch file path: {e}"))
    })?;
    if !path.is_file() {
        return Err(GatewayError::invalid_argument(
            tool.as_str(),
            format!("Patch file does not exist: {}", path.display()),
        ));
    }
    Ok(path)
}
