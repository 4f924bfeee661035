#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MbalError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not enough admissible rows: got {admissible}, need at least {required}")]
    InsufficientData { admissible: usize, required: usize },
    #[error("degenerate fit: {distinct_x} distinct x value(s) in fit subset")]
    DegenerateFit { distinct_x: usize },
}

impl MbalError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

pub type MbalResult<T> = Result<T, MbalError>;
