use thiserror::Error;

/// Error type for text format decoding and encoding.
#[derive(Error, Debug)]
pub enum FormatError {
    /// A character that fits no production at this position
    #[error("line {line}: unexpected character {ch:?}")]
    UnexpectedChar { line: usize, ch: char },

    /// Input ended inside a string, message, or list
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A required token was missing
    #[error("line {line}: expected {expected}")]
    Expected { line: usize, expected: &'static str },

    /// A numeric literal that does not parse
    #[error("line {line}: invalid number {text:?}")]
    InvalidNumber { line: usize, text: String },

    /// A value with no text format representation
    #[error("cannot encode value: {reason}")]
    Unencodable { reason: String },
}
