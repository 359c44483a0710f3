use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArmatureError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Fit error: {0}")]
    Fit(String),

    #[error("Command error: {0}")]
    Command(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ArmatureError>;
