use thiserror::Error;

use crate::span::Span;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Lex error at {span}: {message}")]
    LexError { span: Span, message: String },

    #[error("Syntax error at {span}: {message}")]
    SyntaxError { span: Span, message: String },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            Self::LexError { span, .. } | Self::SyntaxError { span, .. } => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::LexError { message, .. } | Self::SyntaxError { message, .. } => message,
        }
    }

    pub fn is_lex_error(&self) -> bool {
        matches!(self, Self::LexError { .. })
    }

    pub fn is_syntax_error(&self) -> bool {
        matches!(self, Self::SyntaxError { .. })
    }
}
