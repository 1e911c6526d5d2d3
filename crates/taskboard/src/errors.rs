use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid comment target: {0}")]
    InvalidCommentTarget(String),

    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    #[error("Failed to hash password: {0}")]
    PasswordHash(String),

    #[error("Invalid password hash: {0}")]
    InvalidPasswordHash(String),
}
