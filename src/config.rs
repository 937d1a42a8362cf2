use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};
use thiserror::Error;

use crate::analyzer::core::DEFAULT_SNIPPET_WIDTH;
use crate::analyzer::prelude::EolPolicy;

/// Settings applied when a grammar is built and run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Whether an end-of-line may be matched by the end of the input.
    #[serde(default)]
    pub eol: EolPolicy,

    /// Marker that starts a comment running to the end of the line.
    #[serde(default = "default_comment_marker")]
    pub comment_marker: String,

    /// Characters of input quoted back in a grammar error.
    #[serde(default = "default_snippet_width")]
    pub snippet_width: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            eol: EolPolicy::default(),
            comment_marker: default_comment_marker(),
            snippet_width: default_snippet_width(),
        }
    }
}

impl ParserConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: Self = from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // an empty marker would match everywhere and swallow every line
        if self.comment_marker.is_empty() {
            return Err(ConfigError::Invalid(
                "comment_marker must not be empty".to_string(),
            ));
        }
        if self.comment_marker.contains(['\n', '\r']) {
            return Err(ConfigError::Invalid(
                "comment_marker must not contain a line break".to_string(),
            ));
        }
        if self.snippet_width == 0 {
            return Err(ConfigError::Invalid(
                "snippet_width must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub fn from_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, ConfigError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)?;
    Ok(config)
}

pub fn from_str<T: DeserializeOwned>(s: &str) -> Result<T, ConfigError> {
    let config = serde_json::from_str(s)?;
    Ok(config)
}

fn default_comment_marker() -> String {
    "#".to_string()
}

fn default_snippet_width() -> usize {
    DEFAULT_SNIPPET_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_object() {
        let config: ParserConfig = from_str("{}").unwrap();
        assert_eq!(config, ParserConfig::default());
        assert_eq!(config.eol, EolPolicy::NewlineOnly);
        assert_eq!(config.comment_marker, "#");
        assert_eq!(config.snippet_width, DEFAULT_SNIPPET_WIDTH);
    }

    #[test]
    fn test_partial_config() {
        let config: ParserConfig =
            from_str(r#"{"eol": "allow_end_of_input", "snippet_width": 8}"#).unwrap();
        assert_eq!(config.eol, EolPolicy::AllowEndOfInput);
        assert_eq!(config.comment_marker, "#");
        assert_eq!(config.snippet_width, 8);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result: Result<ParserConfig, _> = from_str(r#"{"eol": "sometimes"}"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate() {
        let empty_marker = ParserConfig {
            comment_marker: String::new(),
            ..ParserConfig::default()
        };
        assert!(matches!(
            empty_marker.validate(),
            Err(ConfigError::Invalid(_))
        ));
        let no_snippet = ParserConfig {
            snippet_width: 0,
            ..ParserConfig::default()
        };
        assert!(no_snippet.validate().is_err());
        assert!(ParserConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("sysdoc-config-{}.json", std::process::id()));
        let mut file = File::create(&path).unwrap();
        write!(file, r#"{{"comment_marker": ";"}}"#).unwrap();
        drop(file);

        let config = ParserConfig::from_file(&path).unwrap();
        assert_eq!(config.comment_marker, ";");
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            ParserConfig::from_file(&path),
            Err(ConfigError::Io(_))
        ));
    }
}
