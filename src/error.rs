use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpyError {
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),

    #[error("Window not found: {0}")]
    WindowNotFound(String),

    #[error("Process not found: {0}")]
    ProcessNotFound(u32),

    #[error("UI Automation error: {0}")]
    Uia(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SpyError>;
