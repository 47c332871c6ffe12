use serde::{Deserialize, Serialize};

/// Underlying per-cell reveal state. Flags live on a separate grid and are
/// never folded into this enum.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Closed,
    Opened,
    Bomb,
    Blown,
}

impl CellState {
    pub const fn is_bomb(self) -> bool {
        matches!(self, Self::Bomb | Self::Blown)
    }

    /// Integer code used by the save-file format. Code 2 is reserved for the
    /// legacy flag marker and is never produced.
    pub const fn code(self) -> u8 {
        match self {
            Self::Closed => 0,
            Self::Opened => 1,
            Self::Bomb => 3,
            Self::Blown => 4,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Closed),
            1 => Some(Self::Opened),
            3 => Some(Self::Bomb),
            4 => Some(Self::Blown),
            _ => None,
        }
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Closed
    }
}
