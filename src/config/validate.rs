// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{HotrunError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::HotrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_extensions("watch.extensions", &cfg.watch.extensions)?;
    validate_extensions("watch.static_extensions", &cfg.watch.static_extensions)?;
    validate_build(cfg)?;
    validate_envs(cfg)?;
    Ok(())
}

fn validate_extensions(field: &str, exts: &[String]) -> Result<()> {
    for ext in exts {
        if ext.len() < 2 || !ext.starts_with('.') {
            return Err(HotrunError::ConfigError(format!(
                "[{field}] entries must look like \".ext\" (got {ext:?})"
            )));
        }
    }
    Ok(())
}

fn validate_build(cfg: &RawConfigFile) -> Result<()> {
    if cfg.build.tool.trim().is_empty() {
        return Err(HotrunError::ConfigError(
            "[build].tool must not be empty".to_string(),
        ));
    }
    if cfg.build.doc_command.is_empty() {
        return Err(HotrunError::ConfigError(
            "[build].doc_command must name a program".to_string(),
        ));
    }
    Ok(())
}

fn validate_envs(cfg: &RawConfigFile) -> Result<()> {
    for entry in cfg.run.envs.iter() {
        match entry.split_once('=') {
            Some((key, _)) if !key.is_empty() => {}
            _ => {
                return Err(HotrunError::ConfigError(format!(
                    "[run].envs entry {entry:?} must be KEY=VALUE"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(src)?;
        ConfigFile::try_from(raw)
    }

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.watch.extensions, vec![".go"]);
        assert_eq!(cfg.watch.static_extensions.len(), 4);
        assert!(cfg.build.pre_install);
        assert!(!cfg.reload.enabled);
        assert!(cfg.notify.enabled);
    }

    #[test]
    fn extension_without_dot_is_rejected() {
        let err = parse("[watch]\nextensions = [\"go\"]").unwrap_err();
        assert!(matches!(err, HotrunError::ConfigError(_)));
    }

    #[test]
    fn env_without_equals_is_rejected() {
        let err = parse("[run]\nenvs = [\"JUSTKEY\"]").unwrap_err();
        assert!(err.to_string().contains("KEY=VALUE"));
    }

    #[test]
    fn env_pairs_split_on_first_equals() {
        let cfg = parse("[run]\nenvs = [\"A=1\", \"DSN=user=x\"]").unwrap();
        assert_eq!(
            cfg.env_pairs(),
            vec![
                ("A".to_string(), "1".to_string()),
                ("DSN".to_string(), "user=x".to_string()),
            ]
        );
    }

    #[test]
    fn empty_tool_is_rejected() {
        assert!(parse("[build]\ntool = \" \"").is_err());
    }
}
