use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("{} does not exist", .0.display())]
    MissingRoot(PathBuf),

    #[error("failed to walk log directory: {0}")]
    Walk(#[from] walkdir::Error),
}

impl ScanError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ScanError::MissingRoot(_) | ScanError::Walk(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
