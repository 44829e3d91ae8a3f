#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("division by zero: height must be nonzero")]
    DivisionByZero,
}

pub type Result<T> = std::result::Result<T, Error>;
