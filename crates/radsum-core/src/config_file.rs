use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Config;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub classifier: Option<ClassifierConfig>,
    pub paths: Option<PathsConfig>,
    pub extraction: Option<ExtractionConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassifierConfig {
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    pub input_dir: Option<String>,
    pub output_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionConfig {
    pub fall_through_on_long_name: Option<bool>,
}

/// Platform config directory path: `<config_dir>/radsum/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("radsum").join("config.toml"))
}

/// Load config by cascading CWD `.radsum.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".radsum.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_cls = base.classifier.unwrap_or_default();
    let over_cls = overlay.classifier.unwrap_or_default();
    let base_paths = base.paths.unwrap_or_default();
    let over_paths = overlay.paths.unwrap_or_default();
    let base_ext = base.extraction.unwrap_or_default();
    let over_ext = overlay.extraction.unwrap_or_default();

    ConfigFile {
        classifier: Some(ClassifierConfig {
            model: over_cls.model.or(base_cls.model),
            api_key: over_cls.api_key.or(base_cls.api_key),
            base_url: over_cls.base_url.or(base_cls.base_url),
            timeout_secs: over_cls.timeout_secs.or(base_cls.timeout_secs),
        }),
        paths: Some(PathsConfig {
            input_dir: over_paths.input_dir.or(base_paths.input_dir),
            output_dir: over_paths.output_dir.or(base_paths.output_dir),
        }),
        extraction: Some(ExtractionConfig {
            fall_through_on_long_name: over_ext
                .fall_through_on_long_name
                .or(base_ext.fall_through_on_long_name),
        }),
    }
}

impl ConfigFile {
    /// Apply file values over the built-in defaults.
    pub fn to_config(&self) -> Config {
        let defaults = Config::default();
        let cls = self.classifier.clone().unwrap_or_default();
        Config {
            model: cls.model.unwrap_or(defaults.model),
            api_key: cls.api_key.or(defaults.api_key),
            base_url: cls.base_url.unwrap_or(defaults.base_url),
            timeout_secs: cls.timeout_secs.unwrap_or(defaults.timeout_secs),
            fall_through_on_long_name: self
                .extraction
                .as_ref()
                .and_then(|e| e.fall_through_on_long_name)
                .unwrap_or(defaults.fall_through_on_long_name),
        }
    }

    pub fn input_dir(&self) -> Option<PathBuf> {
        self.paths
            .as_ref()
            .and_then(|p| p.input_dir.as_deref())
            .map(expand_home)
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        self.paths
            .as_ref()
            .and_then(|p| p.output_dir.as_deref())
            .map(expand_home)
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_parses() {
        let toml_str = "[classifier]\nmodel = \"gpt-4o-mini\"\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let config = parsed.to_config();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout_secs, crate::DEFAULT_TIMEOUT_SECS);
        assert!(parsed.paths.is_none());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            classifier: Some(ClassifierConfig {
                model: Some("base-model".into()),
                timeout_secs: Some(30),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            classifier: Some(ClassifierConfig {
                model: Some("overlay-model".into()),
                ..Default::default()
            }),
            extraction: Some(ExtractionConfig {
                fall_through_on_long_name: Some(true),
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay).to_config();
        assert_eq!(merged.model, "overlay-model");
        assert_eq!(merged.timeout_secs, 30);
        assert!(merged.fall_through_on_long_name);
    }

    #[test]
    fn paths_expand_home() {
        let toml_str = "[paths]\ninput_dir = \"/data/reports\"\noutput_dir = \"~/out\"\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(parsed.input_dir(), Some(PathBuf::from("/data/reports")));
        let out = parsed.output_dir().unwrap();
        assert!(out.ends_with("out"));
    }

    #[test]
    fn load_from_missing_path_is_none() {
        assert!(load_from_path(Path::new("/definitely/not/here/radsum.toml")).is_none());
    }
}
