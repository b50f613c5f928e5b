//! Typed tool requests, decoded once from the protocol's argument map.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::catalog::ToolName;
use crate::{GatewayError, Result};

/// Commits shown by `git_log` when no count is given.
pub const DEFAULT_LOG_COUNT: usize = 10;

/// Arguments shared by every repository-scoped tool.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RepoArgs {
    #[serde(default)]
    pub repo_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiffArgs {
    #[serde(default)]
    pub repo_path: Option<String>,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommitArgs {
    #[serde(default)]
    pub repo_path: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddArgs {
    #[serde(default)]
    pub repo_path: Option<String>,
    /// Either `"a.txt, b.txt"` or `["a.txt", "b.txt"]`.
    #[serde(deserialize_with = "file_list")]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogArgs {
    #[serde(default)]
    pub repo_path: Option<String>,
    #[serde(default)]
    pub max_count: Option<f64>,
}

impl LogArgs {
    /// Requested limit; `0` means no limit.
    pub fn limit(&self) -> usize {
        match self.max_count {
            None => DEFAULT_LOG_COUNT,
            Some(n) if n <= 0.0 => 0,
            Some(n) => n as usize,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateBranchArgs {
    #[serde(default)]
    pub repo_path: Option<String>,
    pub branch_name: String,
    #[serde(default)]
    pub base_branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckoutArgs {
    #[serde(default)]
    pub repo_path: Option<String>,
    pub branch_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShowArgs {
    #[serde(default)]
    pub repo_path: Option<String>,
    pub revision: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PushArgs {
    #[serde(default)]
    pub repo_path: Option<String>,
    #[serde(default)]
    pub remote: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PatchStringArgs {
    #[serde(default)]
    pub repo_path: Option<String>,
    pub patch_string: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PatchFileArgs {
    #[serde(default)]
    pub repo_path: Option<String>,
    pub patch_file: String,
}

/// One variant per tool, each carrying its decoded arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    Status(RepoArgs),
    DiffUnstaged(RepoArgs),
    DiffStaged(RepoArgs),
    Diff(DiffArgs),
    Commit(CommitArgs),
    Add(AddArgs),
    Reset(RepoArgs),
    Log(LogArgs),
    CreateBranch(CreateBranchArgs),
    Checkout(CheckoutArgs),
    Show(ShowArgs),
    Init(RepoArgs),
    Push(PushArgs),
    ListRepositories,
    ApplyPatchString(PatchStringArgs),
    ApplyPatchFile(PatchFileArgs),
}

impl ToolRequest {
    /// Decode and validate the arguments of `tool`.
    ///
    /// A missing or `null` argument map counts as empty.
    pub fn decode(tool: ToolName, arguments: &Value) -> Result<Self> {
        let request = match tool {
            ToolName::Status => ToolRequest::Status(decode_args(tool, arguments)?),
            ToolName::DiffUnstaged => ToolRequest::DiffUnstaged(decode_args(tool, arguments)?),
            ToolName::DiffStaged => ToolRequest::DiffStaged(decode_args(tool, arguments)?),
            ToolName::Diff => ToolRequest::Diff(decode_args(tool, arguments)?),
            ToolName::Commit => ToolRequest::Commit(decode_args(tool, arguments)?),
            ToolName::Add => ToolRequest::Add(decode_args(tool, arguments)?),
            ToolName::Reset => ToolRequest::Reset(decode_args(tool, arguments)?),
            ToolName::Log => ToolRequest::Log(decode_args(tool, arguments)?),
            ToolName::CreateBranch => ToolRequest::CreateBranch(decode_args(tool, arguments)?),
            ToolName::Checkout => ToolRequest::Checkout(decode_args(tool, arguments)?),
            ToolName::Show => ToolRequest::Show(decode_args(tool, arguments)?),
            ToolName::Init => ToolRequest::Init(decode_args(tool, arguments)?),
            ToolName::Push => ToolRequest::Push(decode_args(tool, arguments)?),
            ToolName::ListRepositories => ToolRequest::ListRepositories,
            ToolName::ApplyPatchString => {
                ToolRequest::ApplyPatchString(decode_args(tool, arguments)?)
            }
            ToolName::ApplyPatchFile => ToolRequest::ApplyPatchFile(decode_args(tool, arguments)?),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn tool(&self) -> ToolName {
        match self {
            ToolRequest::Status(_) => ToolName::Status,
            ToolRequest::DiffUnstaged(_) => ToolName::DiffUnstaged,
            ToolRequest::DiffStaged(_) => ToolName::DiffStaged,
            ToolRequest::Diff(_) => ToolName::Diff,
            ToolRequest::Commit(_) => ToolName::Commit,
            ToolRequest::Add(_) => ToolName::Add,
            ToolRequest::Reset(_) => ToolName::Reset,
            ToolRequest::Log(_) => ToolName::Log,
            ToolRequest::CreateBranch(_) => ToolName::CreateBranch,
            ToolRequest::Checkout(_) => ToolName::Checkout,
            ToolRequest::Show(_) => ToolName::Show,
            ToolRequest::Init(_) => ToolName::Init,
            ToolRequest::Push(_) => ToolName::Push,
            ToolRequest::ListRepositories => ToolName::ListRepositories,
            ToolRequest::ApplyPatchString(_) => ToolName::ApplyPatchString,
            ToolRequest::ApplyPatchFile(_) => ToolName::ApplyPatchFile,
        }
    }

    /// The caller-supplied repository path, if any.
    pub fn repo_path(&self) -> Option<&str> {
        let path = match self {
            ToolRequest::Status(a)
            | ToolRequest::DiffUnstaged(a)
            | ToolRequest::DiffStaged(a)
            | ToolRequest::Reset(a)
            | ToolRequest::Init(a) => &a.repo_path,
            ToolRequest::Diff(a) => &a.repo_path,
            ToolRequest::Commit(a) => &a.repo_path,
            ToolRequest::Add(a) => &a.repo_path,
            ToolRequest::Log(a) => &a.repo_path,
            ToolRequest::CreateBranch(a) => &a.repo_path,
            ToolRequest::Checkout(a) => &a.repo_path,
            ToolRequest::Show(a) => &a.repo_path,
            ToolRequest::Push(a) => &a.repo_path,
            ToolRequest::ApplyPatchString(a) => &a.repo_path,
            ToolRequest::ApplyPatchFile(a) => &a.repo_path,
            ToolRequest::ListRepositories => return None,
        };
        path.as_deref().filter(|p| !p.is_empty())
    }

    fn validate(&self) -> Result<()> {
        let tool = self.tool();
        match self {
            ToolRequest::Add(a) if a.files.is_empty() => Err(GatewayError::invalid_argument(
                tool.as_str(),
                "files must name at least one path",
            )),
            ToolRequest::ApplyPatchString(a) if a.patch_string.trim().is_empty() => Err(
                GatewayError::invalid_argument(tool.as_str(), "patch_string cannot be empty"),
            ),
            ToolRequest::ApplyPatchFile(a) if a.patch_file.trim().is_empty() => Err(
                GatewayError::invalid_argument(tool.as_str(), "patch_file cannot be empty"),
            ),
            _ => Ok(()),
        }
    }
}

fn decode_args<T: DeserializeOwned>(tool: ToolName, arguments: &Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(arguments)
        .map_err(|e| GatewayError::invalid_argument(tool.as_str(), e.to_string()))
}

fn file_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Files {
        Delimited(String),
        List(Vec<String>),
    }

    let raw = match Files::deserialize(deserializer) {
        Ok(Files::Delimited(s)) => s.split(',').map(str::to_string).collect::<Vec<_>>(),
        Ok(Files::List(list)) => list,
        Err(_) => {
            return Err(de::Error::custom(
                "files must be a comma-separated string or an array of strings",
            ));
        }
    };

    Ok(raw
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn files_accept_delimited_string() {
        let req = ToolRequest::decode(ToolName::Add, &json!({"files": " a.txt, b.txt ,,"})).unwrap();
        let ToolRequest::Add(args) = req else {
            panic!("expected Add");
        };
        assert_eq!(args.files, vec!["a.txt".to_string(), "b.txt".to_string()]);
    }

    #[test]
    fn files_accept_array() {
        let req = ToolRequest::decode(ToolName::Add, &json!({"files": ["x", "y"]})).unwrap();
        assert!(matches!(req, ToolRequest::Add(AddArgs { ref files, .. }) if files.len() == 2));
    }

    #[test]
    fn empty_file_list_is_rejected() {
        let err = ToolRequest::decode(ToolName::Add, &json!({"files": " , "})).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArgument { .. }));
    }

    #[test]
    fn missing_required_argument_names_tool() {
        let err = ToolRequest::decode(ToolName::Commit, &json!({})).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("git_commit"), "{text}");
        assert!(text.contains("message"), "{text}");
    }

    #[test]
    fn wrong_type_is_rejected() {
        let err = ToolRequest::decode(ToolName::Diff, &json!({"target": 7})).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArgument { .. }));
    }

    #[test]
    fn log_limit_defaults_and_clamps() {
        let limit = |v: Value| match ToolRequest::decode(ToolName::Log, &v).unwrap() {
            ToolRequest::Log(args) => args.limit(),
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(limit(json!({})), DEFAULT_LOG_COUNT);
        assert_eq!(limit(json!({"max_count": 3})), 3);
        assert_eq!(limit(json!({"max_count": 2.9})), 2);
        assert_eq!(limit(json!({"max_count": -1})), 0);
    }

    #[test]
    fn blank_patch_inputs_are_rejected() {
        assert!(ToolRequest::decode(ToolName::ApplyPatchString, &json!({"patch_string": "  \n"})).is_err());
        assert!(ToolRequest::decode(ToolName::ApplyPatchFile, &json!({"patch_file": ""})).is_err());
    }

    #[test]
    fn empty_repo_path_counts_as_absent() {
        let req = ToolRequest::decode(ToolName::Status, &json!({"repo_path": ""})).unwrap();
        assert_eq!(req.repo_path(), None);

        let req = ToolRequest::decode(ToolName::Status, &Value::Null).unwrap();
        assert_eq!(req.repo_path(), None);

        let req = ToolRequest::decode(ToolName::Status, &json!({"repo_path": "/r"})).unwrap();
        assert_eq!(req.repo_path(), Some("/r"));
    }

    #[test]
    fn tool_round_trips_through_request() {
        for tool in ToolName::ALL {
            let args = match tool {
                ToolName::Diff => json!({"target": "main"}),
                ToolName::Commit => json!({"message": "m"}),
                ToolName::Add => json!({"files": "a"}),
                ToolName::CreateBranch | ToolName::Checkout => json!({"branch_name": "b"}),
                ToolName::Show => json!({"revision": "HEAD"}),
                ToolName::ApplyPatchString => json!({"patch_string": "p"}),
                ToolName::ApplyPatchFile => json!({"patch_file": "p.patch"}),
                _ => json!({}),
            };
            assert_eq!(ToolRequest::decode(tool, &args).unwrap().tool(), tool);
        }
    }
}
