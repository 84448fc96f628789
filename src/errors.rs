use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    // A mutating call was made on a form that was frozen at construction.
    #[error("attempted to modify an unmodifiable normal form")]
    Unmodifiable,
    // Malformed text.  `fragment` is the input from the offending token onwards.
    #[error("{message} at offset {offset}: {fragment:?}")]
    Parse {
        message: &'static str,
        fragment: String,
        offset: usize,
    },
    #[error("invalid token pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl FormError {
    pub(crate) fn parse(message: &'static str, input: &str, offset: usize) -> FormError {
        FormError::Parse {
            message,
            fragment: input.get(offset..).unwrap_or_default().to_string(),
            offset,
        }
    }
}
