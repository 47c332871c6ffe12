use serde::{Deserialize, Serialize};

pub use board::*;
pub use error::*;
pub use session::*;
pub use tile::*;
pub use types::*;

mod board;
pub mod codec;
mod error;
mod session;
mod tile;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub rows: Coord,
    pub columns: Coord,
    pub bombs: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(rows: Coord, columns: Coord, bombs: CellCount) -> Self {
        Self {
            rows,
            columns,
            bombs,
        }
    }

    pub fn new(rows: Coord, columns: Coord, bombs: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(rows, columns, bombs);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.columns == 0 || self.bombs > self.total_cells() {
            Err(GameError::InvalidConfiguration)
        } else {
            Ok(())
        }
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.columns)
    }
}

/// Fixed difficulty presets; custom boards go through [`GameConfig::new`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const fn config(self) -> GameConfig {
        match self {
            Self::Easy => GameConfig::new_unchecked(5, 5, 5),
            Self::Medium => GameConfig::new_unchecked(10, 10, 10),
            Self::Hard => GameConfig::new_unchecked(15, 15, 15),
        }
    }
}
