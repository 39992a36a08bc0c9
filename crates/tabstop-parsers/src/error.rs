//! Parser error types and results

use thiserror::Error;

/// Parser operation errors
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("Unsupported language: {language}")]
    UnsupportedLanguage { language: String },

    #[error("Failed to load grammar for {language}: {message}")]
    GrammarError { language: String, message: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },
}

/// Result type for parser operations
pub type ParserResult<T> = std::result::Result<T, ParserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ParserError::UnsupportedLanguage {
            language: "cobol".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported language: cobol");

        let err = ParserError::ParseError {
            message: "timeout".to_string(),
        };
        assert_eq!(err.to_string(), "Parse error: timeout");
    }
}
