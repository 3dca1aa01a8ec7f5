//! External tool detection and management.
//!
//! The [`ToolRegistry`] discovers and caches the locations of `ffmpeg` and
//! `ffprobe` and hands out [`ToolCommand`]s preconfigured with the run's
//! timeout.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vidmend_core::config::ToolsConfig;
use vidmend_core::{Error, Result};

use crate::command::ToolCommand;

/// Tools every run needs.
pub const REQUIRED_TOOLS: &[&str] = &["ffmpeg", "ffprobe"];

/// Configuration for a single external tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Human-readable tool name (e.g. "ffmpeg").
    pub name: String,
    /// Resolved path to the executable.
    pub path: PathBuf,
    /// Maximum execution time before the tool is killed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

/// Availability information for a tool, returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Whether the tool was found.
    pub available: bool,
    /// Version string (first line of `-version` output), if available.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Registry holding discovered tool configurations.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolConfig>,
}

impl ToolRegistry {
    /// Discover tools by searching `PATH` (or using overrides from config).
    ///
    /// A configured path is used when it exists; otherwise [`which::which`]
    /// locates the tool. Tools that are not found are omitted and reported by
    /// [`ToolRegistry::require`].
    pub fn discover(tools_config: &ToolsConfig) -> Self {
        let mut tools = HashMap::new();
        let timeout = tools_config.timeout();

        for &name in REQUIRED_TOOLS {
            let custom_path = match name {
                "ffmpeg" => tools_config.ffmpeg_path.as_deref(),
                "ffprobe" => tools_config.ffprobe_path.as_deref(),
                _ => None,
            };

            let resolved = match custom_path {
                Some(p) if p.exists() => Some(p.to_path_buf()),
                Some(p) => {
                    tracing::warn!(
                        "configured {name} path {} does not exist, searching PATH",
                        p.display()
                    );
                    which::which(name).ok()
                }
                None => which::which(name).ok(),
            };

            if let Some(path) = resolved {
                tracing::debug!("found {name} at {}", path.display());
                tools.insert(
                    name.to_string(),
                    ToolConfig {
                        name: name.to_string(),
                        path,
                        timeout,
                    },
                );
            }
        }

        Self { tools }
    }

    /// Build a registry from already-resolved tool configurations.
    pub fn from_configs(configs: impl IntoIterator<Item = ToolConfig>) -> Self {
        Self {
            tools: configs
                .into_iter()
                .map(|cfg| (cfg.name.clone(), cfg))
                .collect(),
        }
    }

    /// Override the timeout of every registered tool.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        for cfg in self.tools.values_mut() {
            cfg.timeout = timeout;
        }
    }

    /// Return the [`ToolConfig`] for the given tool, or [`Error::ToolMissing`]
    /// if it was not found during discovery.
    pub fn require(&self, name: &str) -> Result<&ToolConfig> {
        self.tools.get(name).ok_or_else(|| Error::tool_missing(name))
    }

    /// Fail with [`Error::ToolMissing`] unless every required tool was found.
    pub fn require_all(&self) -> Result<()> {
        for &name in REQUIRED_TOOLS {
            self.require(name)?;
        }
        Ok(())
    }

    /// Start a command for `name` with the configured timeout applied.
    pub fn command(&self, name: &str) -> Result<ToolCommand> {
        let cfg = self.require(name)?;
        let mut cmd = ToolCommand::new(cfg.path.clone());
        cmd.timeout(cfg.timeout);
        Ok(cmd)
    }

    /// Check all required tools and return availability information.
    pub fn check_all(&self) -> Vec<ToolInfo> {
        REQUIRED_TOOLS
            .iter()
            .map(|&name| match self.tools.get(name) {
                Some(cfg) => ToolInfo {
                    name: name.to_string(),
                    available: true,
                    version: detect_version(&cfg.path),
                    path: Some(cfg.path.clone()),
                },
                None => ToolInfo {
                    name: name.to_string(),
                    available: false,
                    version: None,
                    path: None,
                },
            })
            .collect()
    }
}

/// Run `<tool> -version` and return the first line of stdout.
fn detect_version(path: &Path) -> Option<String> {
    let output = std::process::Command::new(path)
        .arg("-version")
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_config() -> ToolsConfig {
        ToolsConfig {
            ffmpeg_path: Some(PathBuf::from("/nonexistent/ffmpeg_xyz")),
            ffprobe_path: Some(PathBuf::from("/nonexistent/ffprobe_xyz")),
            ..ToolsConfig::default()
        }
    }

    #[test]
    fn discover_with_default_config() {
        let registry = ToolRegistry::discover(&ToolsConfig::default());
        // We cannot guarantee any tool is installed in CI,
        // but the call itself must not panic.
        let _ = registry.check_all();
    }

    #[test]
    fn require_unknown_tool_returns_tool_missing() {
        let registry = ToolRegistry::discover(&empty_config());
        let result = registry.require("nonexistent_tool_xyz");
        assert!(matches!(result, Err(Error::ToolMissing { .. })));
    }

    #[test]
    fn check_all_reports_required_tools() {
        let registry = ToolRegistry::discover(&ToolsConfig::default());
        let infos = registry.check_all();
        let names: Vec<&str> = infos.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["ffmpeg", "ffprobe"]);
    }

    #[test]
    fn configured_path_is_used_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("ffprobe");
        std::fs::write(&fake, b"").unwrap();
        let cfg = ToolsConfig {
            ffprobe_path: Some(fake.clone()),
            timeout_secs: 7,
            ..ToolsConfig::default()
        };
        let registry = ToolRegistry::discover(&cfg);
        let tool = registry.require("ffprobe").unwrap();
        assert_eq!(tool.path, fake);
        assert_eq!(tool.timeout, Some(Duration::from_secs(7)));
    }

    #[test]
    fn tool_config_serialization() {
        let cfg = ToolConfig {
            name: "ffmpeg".to_string(),
            path: PathBuf::from("/usr/bin/ffmpeg"),
            timeout: None,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("ffmpeg"));
        let back: ToolConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "ffmpeg");
    }
}
