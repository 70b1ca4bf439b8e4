use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Json, Toml, Yaml},
};
use std::path::{Path, PathBuf};

use super::PickaxeConfig;

// Embed the default config at compile time
pub const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

impl PickaxeConfig {
    pub fn load() -> Result<Self> {
        Self::load_with_custom_config(None)
    }

    /// Load the layered configuration and validate it
    ///
    /// A custom config file replaces the user and working-directory layers.
    /// Environment variables always have the highest priority.
    pub fn load_with_custom_config(custom_config: Option<&Path>) -> Result<Self> {
        if let Some(path) = custom_config.filter(|path| !path.is_file()) {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let figment = Self::figment(custom_config);
        let config = Self::from_figment(&figment)?;
        config.validate()?;
        Ok(config)
    }

    /// Embedded defaults only
    pub fn defaults() -> Result<Self> {
        Self::from_figment(&Figment::new().merge(Toml::string(DEFAULT_CONFIG)))
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        figment
            .extract()
            .context("Failed to parse pickaxe configuration")
    }

    fn figment(custom_config: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(custom_path) = custom_config {
            figment = match custom_path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => figment.merge(Json::file(custom_path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(custom_path)),
                _ => figment.merge(Toml::file(custom_path)),
            };
        } else {
            let user_config = Self::user_config_path();
            figment = figment
                .merge(Toml::file(user_config.with_extension("toml")))
                .merge(Json::file(user_config.with_extension("json")))
                .merge(Yaml::file(user_config.with_extension("yaml")))
                .merge(Yaml::file(user_config.with_extension("yml")))
                .merge(Toml::file("pickaxe.toml"))
                .merge(Json::file("pickaxe.json"))
                .merge(Yaml::file("pickaxe.yaml"))
                .merge(Yaml::file("pickaxe.yml"));
        }

        figment.merge(Env::prefixed("PICKAXE_").split("__"))
    }

    fn user_config_path() -> PathBuf {
        match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home).join(".config/pickaxe/config"),
            Err(_) => PathBuf::from("~/.config/pickaxe/config"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = PickaxeConfig::defaults().unwrap();
        assert!(config.validate().is_ok());
        assert!(config.search.keywords.iter().any(|k| k == "password"));
        assert!(config.search.important_files.iter().any(|f| f == ".env"));
        assert!(config.search.excluded_extensions.iter().any(|e| e == ".png"));
        assert_eq!(config.parallel.thread_percentage, 75);
    }

    #[test]
    fn test_later_layers_override_defaults() {
        let figment = Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG))
            .merge(Toml::string("[search]\nkeywords = [\"hunter2\"]\n"));

        let config = PickaxeConfig::from_figment(&figment).unwrap();
        assert_eq!(config.search.keywords, vec!["hunter2"]);
        // Untouched keys keep their defaults
        assert!(!config.search.important_files.is_empty());
    }

    #[test]
    fn test_custom_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.yaml");
        fs::write(&path, "search:\n  keywords:\n    - letmein\n").unwrap();

        let config = PickaxeConfig::load_with_custom_config(Some(&path)).unwrap();
        assert_eq!(config.search.keywords, vec!["letmein"]);
    }

    #[test]
    fn test_missing_custom_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.toml");
        assert!(PickaxeConfig::load_with_custom_config(Some(&path)).is_err());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let figment = Figment::new().merge(Toml::string("[search]\nkeywords = 5\n"));
        assert!(PickaxeConfig::from_figment(&figment).is_err());
    }
}
