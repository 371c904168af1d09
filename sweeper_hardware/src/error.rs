use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("motor fault: {0}")]
    Motor(String),
    #[error("sensor timeout")]
    Timeout,
    #[error("sensor disconnected: {0}")]
    Disconnected(&'static str),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
