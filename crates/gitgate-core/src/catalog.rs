//! Static catalog of the tools the gateway exposes.
//!
//! Each tool has a stable name, a risk tier and an argument list. The tiers
//! decide which tools are advertised at all and seed the auto-approve lists
//! written by `setup`.

use std::fmt;
use std::str::FromStr;

use crate::GatewayError;

/// How much damage a tool can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskTier {
    /// Inspects a repository without changing it.
    ReadOnly,
    /// Changes the local repository or creates one.
    LocalMutating,
    /// Changes state on a remote. Only offered with write access.
    RemoteMutating,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::ReadOnly => write!(f, "read-only"),
            RiskTier::LocalMutating => write!(f, "local-mutating"),
            RiskTier::RemoteMutating => write!(f, "remote-mutating"),
        }
    }
}

/// Primitive type of a tool argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    String,
    Number,
}

/// One declared argument besides `repo_path`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolArgument {
    pub name: &'static str,
    pub kind: ArgKind,
    pub description: &'static str,
    pub required: bool,
}

const fn required(name: &'static str, description: &'static str) -> ToolArgument {
    ToolArgument {
        name,
        kind: ArgKind::String,
        description,
        required: true,
    }
}

const fn optional(name: &'static str, kind: ArgKind, description: &'static str) -> ToolArgument {
    ToolArgument {
        name,
        kind,
        description,
        required: false,
    }
}

/// How a tool treats the `repo_path` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoPathRule {
    /// No repository involved.
    None,
    /// Optional when the registry has a default, required otherwise.
    Registered,
    /// Always required; the target need not be registered yet.
    Required,
}

/// Every tool the gateway knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    Status,
    DiffUnstaged,
    DiffStaged,
    Diff,
    Commit,
    Add,
    Reset,
    Log,
    CreateBranch,
    Checkout,
    Show,
    Init,
    Push,
    ListRepositories,
    ApplyPatchString,
    ApplyPatchFile,
}

impl ToolName {
    /// Catalog order, which is also the advertised order.
    pub const ALL: [ToolName; 16] = [
        ToolName::Status,
        ToolName::DiffUnstaged,
        ToolName::DiffStaged,
        ToolName::Diff,
        ToolName::Commit,
        ToolName::Add,
        ToolName::Reset,
        ToolName::Log,
        ToolName::CreateBranch,
        ToolName::Checkout,
        ToolName::Show,
        ToolName::Init,
        ToolName::ListRepositories,
        ToolName::ApplyPatchString,
        ToolName::ApplyPatchFile,
        ToolName::Push,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::Status => "git_status",
            ToolName::DiffUnstaged => "git_diff_unstaged",
            ToolName::DiffStaged => "git_diff_staged",
            ToolName::Diff => "git_diff",
            ToolName::Commit => "git_commit",
            ToolName::Add => "git_add",
            ToolName::Reset => "git_reset",
            ToolName::Log => "git_log",
            ToolName::CreateBranch => "git_create_branch",
            ToolName::Checkout => "git_checkout",
            ToolName::Show => "git_show",
            ToolName::Init => "git_init",
            ToolName::Push => "git_push",
            ToolName::ListRepositories => "git_list_repositories",
            ToolName::ApplyPatchString => "git_apply_patch_string",
            ToolName::ApplyPatchFile => "git_apply_patch_file",
        }
    }

    pub fn tier(&self) -> RiskTier {
        match self {
            ToolName::Status
            | ToolName::DiffUnstaged
            | ToolName::DiffStaged
            | ToolName::Diff
            | ToolName::Log
            | ToolName::Show
            | ToolName::ListRepositories => RiskTier::ReadOnly,
            ToolName::Commit
            | ToolName::Add
            | ToolName::Reset
            | ToolName::CreateBranch
            | ToolName::Checkout
            | ToolName::Init
            | ToolName::ApplyPatchString
            | ToolName::ApplyPatchFile => RiskTier::LocalMutating,
            ToolName::Push => RiskTier::RemoteMutating,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolName::Status => "Shows the working tree status",
            ToolName::DiffUnstaged => {
                "Shows changes in the working directory that are not yet staged"
            }
            ToolName::DiffStaged => "Shows changes that are staged for commit",
            ToolName::Diff => "Shows differences between branches or commits",
            ToolName::Commit => "Records changes to the repository",
            ToolName::Add => "Adds file contents to the staging area",
            ToolName::Reset => "Unstages all staged changes",
            ToolName::Log => "Shows the commit logs",
            ToolName::CreateBranch => "Creates a new branch from an optional base branch",
            ToolName::Checkout => "Switches branches",
            ToolName::Show => "Shows the contents of a commit",
            ToolName::Init => "Initialize a new Git repository",
            ToolName::Push => {
                "Pushes local commits to a remote repository (requires --write-access flag)"
            }
            ToolName::ListRepositories => "Lists all available Git repositories",
            ToolName::ApplyPatchString => "Applies a patch from a string to a git repository",
            ToolName::ApplyPatchFile => "Applies a patch from a file to a git repository",
        }
    }

    /// Verb used in `Failed to <verb>: ...` error text.
    pub fn action(&self) -> &'static str {
        match self {
            ToolName::Status => "get status",
            ToolName::DiffUnstaged => "get unstaged diff",
            ToolName::DiffStaged => "get staged diff",
            ToolName::Diff => "get diff",
            ToolName::Commit => "commit",
            ToolName::Add => "add files",
            ToolName::Reset => "reset",
            ToolName::Log => "get log",
            ToolName::CreateBranch => "create branch",
            ToolName::Checkout => "checkout branch",
            ToolName::Show => "show commit",
            ToolName::Init => "initialize repository",
            ToolName::Push => "push changes",
            ToolName::ListRepositories => "list repositories",
            ToolName::ApplyPatchString | ToolName::ApplyPatchFile => "apply patch",
        }
    }

    pub fn repo_path_rule(&self) -> RepoPathRule {
        match self {
            ToolName::ListRepositories => RepoPathRule::None,
            ToolName::Init => RepoPathRule::Required,
            _ => RepoPathRule::Registered,
        }
    }

    /// Arguments other than `repo_path`.
    pub fn arguments(&self) -> &'static [ToolArgument] {
        const DIFF: &[ToolArgument] =
            &[required("target", "Target branch or commit to compare with")];
        const COMMIT: &[ToolArgument] = &[required("message", "Commit message")];
        const ADD: &[ToolArgument] =
            &[required("files", "Comma-separated list of file paths to stage")];
        const LOG: &[ToolArgument] = &[optional(
            "max_count",
            ArgKind::Number,
            "Maximum number of commits to show (default: 10)",
        )];
        const CREATE_BRANCH: &[ToolArgument] = &[
            required("branch_name", "Name of the new branch"),
            optional(
                "base_branch",
                ArgKind::String,
                "Starting point for the new branch",
            ),
        ];
        const CHECKOUT: &[ToolArgument] = &[required("branch_name", "Name of branch to checkout")];
        const SHOW: &[ToolArgument] = &[required(
            "revision",
            "The revision (commit hash, branch name, tag) to show",
        )];
        const PUSH: &[ToolArgument] = &[
            optional("remote", ArgKind::String, "Remote name (default: origin)"),
            optional(
                "branch",
                ArgKind::String,
                "Branch name to push (default: current branch)",
            ),
        ];
        const PATCH_STRING: &[ToolArgument] = &[required("patch_string", "Patch string to apply")];
        const PATCH_FILE: &[ToolArgument] = &[required("patch_file", "Path to the patch file")];

        match self {
            ToolName::Diff => DIFF,
            ToolName::Commit => COMMIT,
            ToolName::Add => ADD,
            ToolName::Log => LOG,
            ToolName::CreateBranch => CREATE_BRANCH,
            ToolName::Checkout => CHECKOUT,
            ToolName::Show => SHOW,
            ToolName::Push => PUSH,
            ToolName::ApplyPatchString => PATCH_STRING,
            ToolName::ApplyPatchFile => PATCH_FILE,
            ToolName::Status
            | ToolName::DiffUnstaged
            | ToolName::DiffStaged
            | ToolName::Reset
            | ToolName::Init
            | ToolName::ListRepositories => &[],
        }
    }

    /// Whether this tool is offered under the given write-access setting.
    pub fn is_advertised(&self, write_access: bool) -> bool {
        write_access || self.tier() != RiskTier::RemoteMutating
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| GatewayError::UnknownTool(s.to_string()))
    }
}

/// Tools offered to callers, in catalog order.
pub fn advertised_tools(write_access: bool) -> Vec<ToolName> {
    ToolName::ALL
        .into_iter()
        .filter(|tool| tool.is_advertised(write_access))
        .collect()
}

/// Names of the read-only tools.
pub fn read_only_tool_names() -> Vec<&'static str> {
    tool_names_up_to(RiskTier::ReadOnly)
}

/// Names of every tool that stays on this machine: read-only plus
/// local-mutating.
pub fn local_only_tool_names() -> Vec<&'static str> {
    tool_names_up_to(RiskTier::LocalMutating)
}

fn tool_names_up_to(tier: RiskTier) -> Vec<&'static str> {
    ToolName::ALL
        .into_iter()
        .filter(|tool| tool.tier() <= tier)
        .map(|tool| tool.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique_and_parse_back() {
        let names: HashSet<_> = ToolName::ALL.iter().map(ToolName::as_str).collect();
        assert_eq!(names.len(), ToolName::ALL.len());

        for tool in ToolName::ALL {
            assert_eq!(tool.as_str().parse::<ToolName>().unwrap(), tool);
        }
        assert!(matches!(
            "git_rebase".parse::<ToolName>(),
            Err(GatewayError::UnknownTool(_))
        ));
    }

    #[test]
    fn push_is_the_only_remote_tool() {
        let remote: Vec<_> = ToolName::ALL
            .into_iter()
            .filter(|t| t.tier() == RiskTier::RemoteMutating)
            .collect();
        assert_eq!(remote, vec![ToolName::Push]);
    }

    #[test]
    fn push_is_advertised_only_with_write_access() {
        assert!(!advertised_tools(false).contains(&ToolName::Push));
        assert!(advertised_tools(true).contains(&ToolName::Push));
        assert_eq!(advertised_tools(true).len(), ToolName::ALL.len());
    }

    #[test]
    fn derived_name_sets_nest() {
        let read_only = read_only_tool_names();
        let local_only = local_only_tool_names();

        assert!(read_only.contains(&"git_status"));
        assert!(read_only.contains(&"git_show"));
        assert!(!read_only.contains(&"git_commit"));
        assert!(read_only.iter().all(|name| local_only.contains(name)));
        assert!(local_only.contains(&"git_apply_patch_file"));
        assert!(!local_only.contains(&"git_push"));
    }

    #[test]
    fn argument_names_are_unique_per_tool() {
        for tool in ToolName::ALL {
            let names: HashSet<_> = tool.arguments().iter().map(|a| a.name).collect();
            assert_eq!(names.len(), tool.arguments().len(), "{tool}");
            assert!(!names.contains("repo_path"), "{tool}");
        }
    }
}
