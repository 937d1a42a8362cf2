use thiserror::Error;

use crate::analyzer::{DefinitionError, GrammarError};
use crate::config::ConfigError;
use crate::document::DocumentError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Grammar error: {0}")]
    Grammar(#[from] GrammarError),
    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type InternalResult<T> = Result<T, Error>;

impl Error {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(path: &str) -> InternalResult<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    #[test]
    fn test_io_error_converts() {
        let error = read("/nonexistent/sysdoc/pmlogger.config").unwrap_err();
        assert!(matches!(error, Error::Io(_)));
        assert!(error.to_string().starts_with("I/O error: "));
    }
}
