//! MCP tool definitions and results
//!
//! Definitions are derived from the gateway's catalog each time they are
//! listed: whether `repo_path` is required, and what its description says,
//! depends on how many repositories are registered at that moment.
//!
//! # Tool Tiers
//!
//! ## Read-only
//! - `git_status`, `git_diff_unstaged`, `git_diff_staged`, `git_diff`
//! - `git_log`, `git_show`, `git_list_repositories`
//!
//! ## Local-mutating
//! - `git_init`, `git_create_branch`, `git_checkout`, `git_commit`
//! - `git_add`, `git_reset`, `git_apply_patch_string`, `git_apply_patch_file`
//!
//! ## Remote-mutating (only with `--write-access`)
//! - `git_push`

use gitgate_core::{ArgKind, RepoPathRule, RepositoryRegistry, ToolName, advertised_tools};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Tool definition for MCP protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Result from a tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Content types for tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    /// Create a successful text result
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: content.into(),
            }],
            is_error: None,
        }
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: Some(true),
        }
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }
}

/// Definitions of every tool currently offered.
pub fn tool_definitions(registry: &RepositoryRegistry, write_access: bool) -> Vec<ToolDefinition> {
    let roots = registry.snapshot();
    advertised_tools(write_access)
        .into_iter()
        .map(|tool| ToolDefinition {
            name: tool.as_str().to_string(),
            description: tool.description().to_string(),
            input_schema: input_schema(tool, &roots),
        })
        .collect()
}

fn repo_path_description(roots: &[std::path::PathBuf]) -> String {
    match roots {
        [] => "Path to Git repository".to_string(),
        [only] => format!("Path to Git repository (default: {})", only.display()),
        [first, ..] => format!(
            "Path to Git repository (default: {}, {} repositories available)",
            first.display(),
            roots.len()
        ),
    }
}

fn input_schema(tool: ToolName, roots: &[std::path::PathBuf]) -> Value {
    let mut properties = Map::new();
    let mut required: Vec<&str> = Vec::new();

    match tool.repo_path_rule() {
        RepoPathRule::None => {}
        RepoPathRule::Required => {
            properties.insert(
                "repo_path".to_string(),
                json!({"type": "string", "description": "Path to directory to initialize git repo"}),
            );
            required.push("repo_path");
        }
        RepoPathRule::Registered => {
            properties.insert(
                "repo_path".to_string(),
                json!({"type": "string", "description": repo_path_description(roots)}),
            );
            if roots.is_empty() {
                required.push("repo_path");
            }
        }
    }

    for arg in tool.arguments() {
        let kind = match arg.kind {
            ArgKind::String => "string",
            ArgKind::Number => "number",
        };
        properties.insert(
            arg.name.to_string(),
            json!({"type": kind, "description": arg.description}),
        );
        if arg.required {
            required.push(arg.name);
        }
    }

    let mut schema = json!({"type": "object", "properties": properties});
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}
