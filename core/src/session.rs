use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::*;

/// Player action applied to a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Open,
    Flag,
}

impl Action {
    pub const fn code(self) -> u8 {
        match self {
            Self::Open => 1,
            Self::Flag => 2,
        }
    }

    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            1 => Ok(Self::Open),
            2 => Ok(Self::Flag),
            other => Err(GameError::InvalidAction(other)),
        }
    }
}

impl TryFrom<u8> for Action {
    type Error = GameError;

    fn try_from(code: u8) -> Result<Self> {
        Self::from_code(code)
    }
}

/// Control signal returned from a move. `Victory` and `Defeat` are terminal:
/// the session stops accepting moves once either has been returned.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Continue,
    Victory,
    Defeat,
}

impl MoveOutcome {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Active,
    Won,
    Lost,
}

impl SessionState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// One interactive game from the first move to a terminal state.
///
/// The session validates raw moves, applies them to its board, and reports
/// terminal conditions back to the caller. It never loops or reads input;
/// that belongs to the presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    board: Board,
    state: SessionState,
}

impl Session {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            state: SessionState::Active,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Applies one move at **1-based** coordinates.
    ///
    /// Detonation reports `Defeat`; otherwise the win predicate is checked
    /// after either action kind, so the final move may be a flag placement.
    pub fn apply_move(&mut self, x: Coord, y: Coord, action: Action) -> Result<MoveOutcome> {
        if self.state.is_finished() {
            return Err(GameError::AlreadyEnded);
        }

        let coords = self.to_internal(x, y)?;
        match action {
            Action::Open => {
                if self.board.open(coords)? == OpenOutcome::Exploded {
                    self.state = SessionState::Lost;
                    return Ok(MoveOutcome::Defeat);
                }
            }
            Action::Flag => {
                self.board.toggle_flag(coords)?;
            }
        }

        if self.board.check_win() {
            self.state = SessionState::Won;
            Ok(MoveOutcome::Victory)
        } else {
            Ok(MoveOutcome::Continue)
        }
    }

    /// Same as [`Session::apply_move`], taking the raw wire action code.
    pub fn apply_raw_move(&mut self, x: Coord, y: Coord, action_code: u8) -> Result<MoveOutcome> {
        self.apply_move(x, y, Action::from_code(action_code)?)
    }

    fn to_internal(&self, x: Coord, y: Coord) -> Result<Coord2> {
        if x == 0 || y == 0 {
            return Err(GameError::OutOfBounds);
        }
        self.board.validate_coords((x - 1, y - 1))
    }

    pub fn save(&self) -> SaveResult<()> {
        codec::save(&self.board)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> SaveResult<()> {
        codec::save_to(&self.board, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(rows: Coord, columns: Coord, bombs: &[Coord2]) -> Session {
        Session::new(Board::with_bombs_at(rows, columns, bombs).unwrap())
    }

    #[test]
    fn action_codes_map_to_actions() {
        assert_eq!(Action::from_code(1).unwrap(), Action::Open);
        assert_eq!(Action::from_code(2).unwrap(), Action::Flag);
        assert_eq!(Action::from_code(7), Err(GameError::InvalidAction(7)));
        assert_eq!(Action::Open.code(), 1);
        assert_eq!(Action::Flag.code(), 2);
    }

    #[test]
    fn detonation_is_defeat_and_locks_the_session() {
        let mut s = session(2, 2, &[(0, 0)]);

        assert_eq!(s.apply_move(1, 1, Action::Open).unwrap(), MoveOutcome::Defeat);
        assert_eq!(s.state(), SessionState::Lost);
        assert_eq!(
            s.apply_move(2, 2, Action::Open),
            Err(GameError::AlreadyEnded)
        );
    }

    #[test]
    fn flagging_the_last_bomb_is_victory() {
        let mut s = session(2, 2, &[(0, 0)]);

        assert_eq!(s.apply_move(1, 2, Action::Open).unwrap(), MoveOutcome::Continue);
        assert_eq!(s.apply_move(2, 1, Action::Open).unwrap(), MoveOutcome::Continue);
        assert_eq!(s.apply_move(2, 2, Action::Open).unwrap(), MoveOutcome::Continue);
        assert_eq!(s.apply_move(1, 1, Action::Flag).unwrap(), MoveOutcome::Victory);
        assert_eq!(s.state(), SessionState::Won);
    }

    #[test]
    fn opening_the_last_safe_cell_is_victory() {
        let mut s = session(2, 2, &[(0, 0)]);

        s.apply_move(1, 1, Action::Flag).unwrap();
        s.apply_move(1, 2, Action::Open).unwrap();
        s.apply_move(2, 1, Action::Open).unwrap();
        assert_eq!(s.apply_move(2, 2, Action::Open).unwrap(), MoveOutcome::Victory);
    }

    #[test]
    fn no_further_moves_after_victory() {
        let mut s = session(2, 1, &[(0, 0)]);

        s.apply_move(1, 1, Action::Flag).unwrap();
        assert_eq!(s.apply_move(2, 1, Action::Open).unwrap(), MoveOutcome::Victory);
        assert_eq!(
            s.apply_move(1, 1, Action::Flag),
            Err(GameError::AlreadyEnded)
        );
    }

    #[test]
    fn one_based_bounds_are_enforced() {
        let mut s = session(2, 2, &[(0, 0)]);

        assert_eq!(
            s.apply_move(0, 1, Action::Open),
            Err(GameError::OutOfBounds)
        );
        assert_eq!(
            s.apply_move(1, 3, Action::Open),
            Err(GameError::OutOfBounds)
        );
        assert_eq!(
            s.apply_move(3, 1, Action::Flag),
            Err(GameError::OutOfBounds)
        );
    }

    #[test]
    fn raw_move_rejects_unknown_action_codes() {
        let mut s = session(2, 2, &[(0, 0)]);

        assert_eq!(
            s.apply_raw_move(1, 1, 3),
            Err(GameError::InvalidAction(3))
        );
        assert_eq!(
            s.apply_raw_move(2, 2, 1).unwrap(),
            MoveOutcome::Continue
        );
    }

    #[test]
    fn rejected_moves_do_not_mutate_state() {
        let mut s = session(2, 2, &[(0, 0)]);

        let before = s.board().clone();
        let _ = s.apply_move(9, 9, Action::Open);
        let _ = s.apply_raw_move(1, 1, 0);

        assert_eq!(s.board(), &before);
        assert_eq!(s.state(), SessionState::Active);
    }
}
