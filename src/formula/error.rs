// Error definitions for formula conversion

use serde::Serialize;
use thiserror::Error;

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Structural problems found while parsing LaTeX.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input ended inside a group, environment or command argument
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),

    /// A matrix row does not have the same number of cells as the first row
    #[error("column count mismatch in matrix row {row}: expected {expected}, found {found}")]
    ColumnCountMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// `\end{found}` closed an environment opened as `\begin{expected}`
    #[error("environment mismatch: \\begin{{{expected}}} closed by \\end{{{found}}}")]
    EnvironmentMismatch { expected: String, found: String },

    /// Groups nested beyond the parser's recursion limit
    #[error("maximum nesting depth exceeded: {0}")]
    NestingTooDeep(usize),

    /// Repair discarded the whole input as OCR garbage, or it was blank
    #[error("no usable formula in input")]
    EmptyInput,
}

/// Errors surfaced by the conversion pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// The LaTeX input could not be parsed
    #[error("cannot parse input: {0}")]
    Parse(#[from] ParseError),

    /// A recognized but unsupported command, environment or MathML element
    #[error("unsupported symbol: {0}")]
    UnsupportedSymbol(String),

    /// Unparseable XML handed to the pretty-printer or MathML reader
    #[error("XML format error: {0}")]
    XmlFormat(String),
}

impl ConvertError {
    /// The offending command or element text, for unsupported-symbol failures.
    pub fn unsupported_symbol(&self) -> Option<&str> {
        match self {
            ConvertError::UnsupportedSymbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// Whether the caller should fall back to copying plain LaTeX.
    #[inline]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ConvertError::UnsupportedSymbol(_))
    }
}

impl From<quick_xml::Error> for ConvertError {
    fn from(err: quick_xml::Error) -> Self {
        ConvertError::XmlFormat(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ConvertError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        ConvertError::XmlFormat(format!("invalid attribute: {}", err))
    }
}

impl Serialize for ConvertError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message_contains_symbol() {
        let err = ConvertError::UnsupportedSymbol("\\xyzcommand".to_string());
        assert!(err.to_string().contains("xyzcommand"));
        assert_eq!(err.unsupported_symbol(), Some("\\xyzcommand"));
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_parse_error_reports_row() {
        let err: ConvertError = ParseError::ColumnCountMismatch {
            row: 1,
            expected: 2,
            found: 3,
        }
        .into();
        assert!(err.to_string().contains("row 1"));
        assert!(!err.is_unsupported());
    }
}
