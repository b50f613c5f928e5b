//! Server configuration
//!
//! Settings come from an optional TOML file and are then overridden by
//! command-line flags:
//!
//! ```toml
//! repositories = ["~/src/app", "/srv/git/tools"]
//! backend = "libgit2"
//! write_access = false
//! git_binary = "/usr/bin/git"
//!
//! [commit]
//! name = "Git MCP Gateway"
//! email = "gitgate@localhost"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gitgate_core::{Gateway, RepositoryRegistry};
use gitgate_git::{BackendKind, CommitAuthor, GitCli, build_backend};
use serde::Deserialize;

use crate::cli::ServeArgs;
use crate::{Error, Result};

/// Everything needed to build a [`Gateway`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Candidate repository roots. The first valid one is the default.
    pub repositories: Vec<PathBuf>,

    pub backend: BackendKind,

    /// Advertise and allow `git_push`.
    pub write_access: bool,

    /// `git` executable for the shell backend; `PATH` lookup when unset.
    pub git_binary: Option<PathBuf>,

    /// Identity for commits authored by libgit2.
    pub commit: CommitAuthor,
}

impl ServerConfig {
    /// Location used when no file is given explicitly.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gitgate").join("config.toml"))
    }

    /// Parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.repositories = config
            .repositories
            .into_iter()
            .map(|repo| expand_home(&repo))
            .collect();
        Ok(config)
    }

    /// Load `explicit` if given, else the default file if it exists, else
    /// built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "Loading default configuration");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Resolve the configuration for a `serve` or `setup` invocation.
    pub fn from_args(args: &ServeArgs) -> Result<Self> {
        let mut config = Self::load_or_default(args.config.as_deref())?;
        config.apply_overrides(args);
        Ok(config)
    }

    /// Flags win over file values; repositories from flags are appended.
    pub fn apply_overrides(&mut self, args: &ServeArgs) {
        self.repositories.extend(args.repositories.iter().cloned());
        if let Some(mode) = args.mode {
            self.backend = mode;
        }
        if let Some(write_access) = args.write_access {
            self.write_access = write_access;
        }
        if let Some(git_binary) = &args.git_binary {
            self.git_binary = Some(git_binary.clone());
        }
    }

    /// Build the backend and registry and assemble the gateway.
    pub fn build_gateway(&self) -> Gateway {
        let cli = match &self.git_binary {
            Some(program) => GitCli::with_program(program),
            None => GitCli::default(),
        };
        let backend = build_backend(self.backend, cli, self.commit.clone());
        let registry = Arc::new(RepositoryRegistry::new(&self.repositories));
        if registry.is_empty() {
            tracing::warn!("No repositories registered; every call must name repo_path");
        }
        Gateway::new(backend, registry, self.write_access)
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn empty_file_yields_defaults() {
        let config = ServerConfig::parse("", Path::new("config.toml")).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.backend, BackendKind::Shell);
        assert!(!config.write_access);
    }

    #[test]
    fn parses_all_fields() {
        let content = r#"
            repositories = ["/srv/a", "/srv/b"]
            backend = "libgit2"
            write_access = true
            git_binary = "/opt/git/bin/git"

            [commit]
            name = "Bot"
            email = "bot@example.com"
        "#;
        let config = ServerConfig::parse(content, Path::new("config.toml")).unwrap();

        assert_eq!(
            config.repositories,
            vec![PathBuf::from("/srv/a"), PathBuf::from("/srv/b")]
        );
        assert_eq!(config.backend, BackendKind::Libgit2);
        assert!(config.write_access);
        assert_eq!(config.git_binary, Some(PathBuf::from("/opt/git/bin/git")));
        assert_eq!(config.commit.name, "Bot");
        assert_eq!(config.commit.email, "bot@example.com");
    }

    #[test]
    fn partial_commit_table_keeps_default_email() {
        let content = "[commit]\nname = \"Bot\"\n";
        let config = ServerConfig::parse(content, Path::new("config.toml")).unwrap();
        assert_eq!(config.commit.name, "Bot");
        assert_eq!(config.commit.email, CommitAuthor::default().email);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ServerConfig::parse("repos = []", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = ServerConfig::parse("backend = \"svn\"", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        let err = ServerConfig::load_or_default(Some(&missing)).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "write_access = true\n").unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert!(config.write_access);
    }

    #[test]
    fn flags_override_file_values() {
        let mut config = ServerConfig {
            repositories: vec![PathBuf::from("/from/file")],
            write_access: true,
            ..Default::default()
        };
        let args = ServeArgs {
            repositories: vec![PathBuf::from("/from/flag")],
            mode: Some(BackendKind::Libgit2),
            write_access: Some(false),
            git_binary: Some(PathBuf::from("/usr/local/bin/git")),
            config: None,
        };

        config.apply_overrides(&args);

        assert_eq!(
            config.repositories,
            vec![PathBuf::from("/from/file"), PathBuf::from("/from/flag")]
        );
        assert_eq!(config.backend, BackendKind::Libgit2);
        assert!(!config.write_access);
        assert_eq!(config.git_binary, Some(PathBuf::from("/usr/local/bin/git")));
    }

    #[test]
    fn absent_flags_leave_file_values() {
        let mut config = ServerConfig {
            write_access: true,
            backend: BackendKind::Libgit2,
            ..Default::default()
        };
        config.apply_overrides(&ServeArgs::default());
        assert!(config.write_access);
        assert_eq!(config.backend, BackendKind::Libgit2);
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_home(Path::new("~/src/app")), home.join("src/app"));
        assert_eq!(expand_home(Path::new("/abs")), PathBuf::from("/abs"));
    }

    #[test]
    fn build_gateway_registers_valid_repositories_only() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();
        let plain = temp.path().join("plain");
        fs::create_dir_all(&plain).unwrap();

        let config = ServerConfig {
            repositories: vec![repo.clone(), plain],
            backend: BackendKind::Libgit2,
            write_access: true,
            ..Default::default()
        };
        let gateway = config.build_gateway();

        assert_eq!(gateway.registry().snapshot(), vec![repo]);
        assert_eq!(gateway.backend_kind(), BackendKind::Libgit2);
        assert!(gateway.write_access());
    }
}
