//! TOML configuration loading.

pub use vidmend_core::config::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Locations searched, in order, when no `--config` is given.
const DEFAULT_PATHS: &[&str] = &[
    "./vidmend.toml",
    "~/.config/vidmend/config.toml",
    "/etc/vidmend/config.toml",
];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for path_str in DEFAULT_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("using config file {}", path.display());
            return load_config(path);
        }
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn empty_file_is_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vidmend.toml");
        fs::write(&path, "").unwrap();
        assert_eq!(load_config(&path).unwrap(), Config::default());
    }

    #[test]
    fn sections_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vidmend.toml");
        fs::write(
            &path,
            r#"
[tools]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
timeout_secs = 0

[diagnosis]
tolerance = 0.05

[repair]
frame_rates = [15, 25]
prefer_mkv = true
crf = 23

[scan]
extensions = [".dav", "mp4"]
jobs = 4
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(
            config.tools.ffmpeg_path.as_deref(),
            Some(Path::new("/opt/ffmpeg/bin/ffmpeg"))
        );
        assert_eq!(config.tools.timeout(), None);
        assert_eq!(config.diagnosis.tolerance, 0.05);
        assert_eq!(config.repair.frame_rates, vec![15, 25]);
        assert!(config.repair.prefer_mkv);
        assert_eq!(config.repair.crf, 23);
        assert_eq!(config.repair.preset, "veryfast");
        assert_eq!(config.scan.jobs, 4);
        assert!(config.scan.matches_extension("DAV"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vidmend.toml");
        fs::write(&path, "[scan]\njobs = 0\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("jobs"));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vidmend.toml");
        fs::write(&path, "[repair\nprefer_mkv = ").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        assert!(load_config_or_default(Some(Path::new("/nonexistent/vidmend.toml"))).is_err());
    }
}
