//! `setup` command: install the server binary and register it with an
//! AI assistant's MCP settings.
//!
//! The binary is looked up on `PATH`, then in `~/mcp-servers`. When neither
//! has it, the running executable is copied into `~/mcp-servers`. Each
//! requested assistant then gets a `git` entry merged into its
//! `cline_mcp_settings.json`, leaving other servers untouched.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use gitgate_core::{local_only_tool_names, read_only_tool_names};
use gitgate_git::BackendKind;
use serde_json::{Value, json};

use crate::cli::{ServeArgs, SetupArgs};
use crate::{Error, Result};

/// Name of the installed executable, without platform suffix.
pub const BINARY_NAME: &str = "gitgate-mcp";

/// Key of our entry under `mcpServers`.
pub const SERVER_KEY: &str = "git";

/// Settings file shared by Cline and its forks.
pub const SETTINGS_FILE: &str = "cline_mcp_settings.json";

/// Assistants whose settings layout we know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantTool {
    Cline,
    RooCode,
}

impl AssistantTool {
    pub fn label(&self) -> &'static str {
        match self {
            AssistantTool::Cline => "Cline",
            AssistantTool::RooCode => "Roo Code",
        }
    }

    /// VS Code extension id, which names its global storage directory.
    pub fn extension_id(&self) -> &'static str {
        match self {
            AssistantTool::Cline => "saoudrizwan.claude-dev",
            AssistantTool::RooCode => "rooveterinaryinc.roo-cline",
        }
    }

    /// Directory holding the MCP settings file on operating system `os`
    /// (as reported by [`std::env::consts::OS`]).
    pub fn settings_dir(&self, home: &Path, os: &str) -> Result<PathBuf> {
        let user = match os {
            "macos" => home
                .join("Library")
                .join("Application Support")
                .join("Code")
                .join("User"),
            "linux" => home.join(".vscode-server").join("data").join("User"),
            "windows" => home.join("AppData").join("Roaming").join("Code").join("User"),
            other => return Err(Error::UnsupportedPlatform(other.to_string())),
        };
        Ok(user
            .join("globalStorage")
            .join(self.extension_id())
            .join("settings"))
    }
}

impl FromStr for AssistantTool {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cline" => Ok(AssistantTool::Cline),
            "roo-code" => Ok(AssistantTool::RooCode),
            _ => Err(Error::UnsupportedTool(s.trim().to_string())),
        }
    }
}

impl fmt::Display for AssistantTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Expand `--auto-approve` into tool names.
///
/// `allow-read-only` and `allow-local-only` select catalog tiers; anything
/// else is read as a comma-separated list.
pub fn auto_approve_list(selection: Option<&str>) -> Vec<String> {
    match selection.map(str::trim) {
        None | Some("") => Vec::new(),
        Some("allow-read-only") => read_only_tool_names().into_iter().map(String::from).collect(),
        Some("allow-local-only") => local_only_tool_names()
            .into_iter()
            .map(String::from)
            .collect(),
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect(),
    }
}

/// Arguments the assistant will launch the server with.
pub fn server_args(args: &ServeArgs) -> Vec<String> {
    let mut out = vec!["serve".to_string()];
    for repo in &args.repositories {
        let repo = gitgate_core::path::absolutize(repo).unwrap_or_else(|_| repo.clone());
        out.push(format!("--repository={}", repo.display()));
    }
    if let Some(mode) = args.mode.filter(|mode| *mode != BackendKind::Shell) {
        out.push(format!("--mode={mode}"));
    }
    if args.write_access == Some(true) {
        out.push("--write-access=true".to_string());
    }
    if let Some(git_binary) = &args.git_binary {
        out.push(format!("--git-binary={}", git_binary.display()));
    }
    if let Some(config) = &args.config {
        let config = gitgate_core::path::absolutize(config).unwrap_or_else(|_| config.clone());
        out.push(format!("--config={}", config.display()));
    }
    out
}

fn binary_file_name() -> String {
    if cfg!(windows) {
        format!("{BINARY_NAME}.exe")
    } else {
        BINARY_NAME.to_string()
    }
}

/// Search `PATH` for `binary`.
pub fn find_on_path(binary: &str) -> Option<PathBuf> {
    find_in_search_path(&std::env::var_os("PATH")?, binary)
}

fn find_in_search_path(search_path: &OsStr, binary: &str) -> Option<PathBuf> {
    let exts = if cfg!(windows) {
        vec![".exe", ".cmd", ".bat", ""]
    } else {
        vec![""]
    };

    for dir in std::env::split_paths(search_path) {
        for ext in &exts {
            let candidate = dir.join(format!("{binary}{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Where the server binary lives, and whether it is already there.
///
/// Falls back to `<servers_dir>/gitgate-mcp` as the install destination.
pub fn locate_binary(servers_dir: &Path) -> (PathBuf, bool) {
    locate_binary_in(servers_dir, std::env::var_os("PATH").as_deref())
}

fn locate_binary_in(servers_dir: &Path, search_path: Option<&OsStr>) -> (PathBuf, bool) {
    if let Some(path) = search_path.and_then(|p| find_in_search_path(p, BINARY_NAME)) {
        return (path, true);
    }
    let installed = servers_dir.join(binary_file_name());
    let found = installed.is_file();
    (installed, found)
}

/// Copy the running executable to `dest` and mark it executable.
pub fn install_self(dest: &Path) -> Result<()> {
    let current = std::env::current_exe()?;
    if current == dest {
        return Ok(());
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(&current, dest)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(dest, std::fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}

/// Merge our server entry into the settings file in `settings_dir`.
///
/// Returns the path of the written file.
pub fn write_settings(
    tool: AssistantTool,
    settings_dir: &Path,
    command: &Path,
    args: &[String],
    auto_approve: &[String],
) -> Result<PathBuf> {
    let path = settings_dir.join(SETTINGS_FILE);
    let setup_error = |message: String| Error::Setup {
        tool: tool.label().to_string(),
        message,
    };

    let mut settings = if path.exists() {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| setup_error(format!("Failed to read {}: {e}", path.display())))?;
        if content.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str(&content)
                .map_err(|e| setup_error(format!("Failed to parse {}: {e}", path.display())))?
        }
    } else {
        json!({})
    };

    let entry = json!({
        "command": command.display().to_string(),
        "args": args,
        "disabled": false,
        "autoApprove": auto_approve,
    });

    let Some(root) = settings.as_object_mut() else {
        return Err(setup_error(format!(
            "{} does not contain a JSON object",
            path.display()
        )));
    };
    match root.get_mut("mcpServers").and_then(Value::as_object_mut) {
        Some(servers) => {
            servers.insert(SERVER_KEY.to_string(), entry);
        }
        None => {
            let mut servers = serde_json::Map::new();
            servers.insert(SERVER_KEY.to_string(), entry);
            root.insert("mcpServers".to_string(), Value::Object(servers));
        }
    }

    std::fs::create_dir_all(settings_dir).map_err(|e| {
        setup_error(format!(
            "Failed to create directory {}: {e}",
            settings_dir.display()
        ))
    })?;
    let content = serde_json::to_string_pretty(&settings)?;
    std::fs::write(&path, content.as_bytes())
        .map_err(|e| setup_error(format!("Failed to write {}: {e}", path.display())))?;
    Ok(path)
}

/// Run `setup` for the current user.
pub fn run(args: &SetupArgs) -> Result<()> {
    let home = dirs::home_dir().ok_or(Error::HomeDirNotFound)?;
    run_with_home(args, &home)
}

/// Run `setup` against an explicit home directory.
///
/// Every requested assistant is attempted; the first failure is reported
/// once all have been processed.
pub fn run_with_home(args: &SetupArgs, home: &Path) -> Result<()> {
    let servers_dir = home.join("mcp-servers");
    std::fs::create_dir_all(&servers_dir)?;

    let (binary, found) = locate_binary(&servers_dir);
    if found {
        println!("Found {BINARY_NAME} binary at {}", binary.display());
    } else {
        println!(
            "{BINARY_NAME} binary not found on path, copying current binary to '{}'...",
            binary.display()
        );
        install_self(&binary)?;
        println!("{BINARY_NAME} binary installed successfully at {}", binary.display());
    }

    let server_args = server_args(&args.server);
    let auto_approve = auto_approve_list(args.auto_approve.as_deref());

    let mut first_error = None;
    for name in args.tool.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        println!("Setting up tool: {name}");
        let outcome = name.parse::<AssistantTool>().and_then(|tool| {
            let dir = tool.settings_dir(home, std::env::consts::OS)?;
            let path = write_settings(tool, &dir, &binary, &server_args, &auto_approve)?;
            println!("{tool} MCP settings updated at {}", path.display());
            Ok(tool)
        });

        match outcome {
            Ok(tool) => {
                tracing::info!(tool = %tool, "Assistant configured");
                println!("{BINARY_NAME} binary successfully set up for {name}");
            }
            Err(e) => {
                println!("Error setting up {name}: {e}");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
