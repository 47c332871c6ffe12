use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid board configuration")]
    InvalidConfiguration,
    #[error("Coordinates out of bounds")]
    OutOfBounds,
    #[error("Unknown action code {0}")]
    InvalidAction(u8),
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("No saved game found")]
    SaveNotFound,
    #[error("Save data is corrupt: {0}")]
    CorruptSave(&'static str),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type SaveResult<T> = core::result::Result<T, SaveError>;
