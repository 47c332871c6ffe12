use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

use crate::*;

/// Outcome of opening a cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OpenOutcome {
    NoChange,
    Opened,
    Exploded,
}

impl OpenOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Opened => true,
            Self::Exploded => true,
        }
    }
}

/// Outcome of toggling a flag.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlagOutcome {
    NoChange,
    Changed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

/// One minefield from construction to the end of a game.
///
/// Reveal state and flag state are independent axes: `cells` holds the
/// four-valued reveal state (bombs included), `flagged` holds the player's
/// markers. A flagged cell keeps its underlying state and cannot be opened
/// while the flag is set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<CellState>,
    flagged: Array2<bool>,
    bomb_count: CellCount,
    flags_placed: CellCount,
    moves_count: u32,
}

impl Board {
    /// Generates a board with bombs placed by the thread rng.
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::generate(config, &mut rand::rng())
    }

    /// Generates a board with bombs placed by the given rng. Placement
    /// rejection-samples uniform cells until each bomb lands on a free one.
    pub fn generate<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let mut board = Self::empty(config.rows, config.columns, config.bombs);

        if config.bombs == config.total_cells() {
            log::warn!("Board is all bombs, skipping placement sampling");
            board.cells.fill(CellState::Bomb);
            return Ok(board);
        }

        let mut placed: CellCount = 0;
        while placed < config.bombs {
            let x = rng.random_range(0..config.rows);
            let y = rng.random_range(0..config.columns);
            if board.cells[(x, y).to_nd_index()] == CellState::Closed {
                board.cells[(x, y).to_nd_index()] = CellState::Bomb;
                placed += 1;
            }
        }
        log::debug!(
            "Placed {} bombs on a {}x{} board",
            placed,
            config.rows,
            config.columns
        );

        Ok(board)
    }

    /// Builds a board with bombs at the given 0-based coordinates. Duplicate
    /// coordinates collapse into a single bomb.
    pub fn with_bombs_at(rows: Coord, columns: Coord, bombs: &[Coord2]) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(GameError::InvalidConfiguration);
        }

        let mut cells: Array2<CellState> =
            Array2::default((usize::from(rows), usize::from(columns)));
        for &coords in bombs {
            if coords.0 >= rows || coords.1 >= columns {
                return Err(GameError::OutOfBounds);
            }
            cells[coords.to_nd_index()] = CellState::Bomb;
        }

        let bomb_count = cells
            .iter()
            .filter(|state| state.is_bomb())
            .count()
            .try_into()
            .unwrap();

        Ok(Self::from_cells(cells, bomb_count))
    }

    /// Reconstructs a board from an already-populated cell grid. Flag state
    /// always starts empty (it is not part of the save format).
    pub(crate) fn from_cells(cells: Array2<CellState>, bomb_count: CellCount) -> Self {
        let flagged = Array2::default(cells.dim());
        Self {
            cells,
            flagged,
            bomb_count,
            flags_placed: 0,
            moves_count: 0,
        }
    }

    fn empty(rows: Coord, columns: Coord, bomb_count: CellCount) -> Self {
        let dim = (usize::from(rows), usize::from(columns));
        Self {
            cells: Array2::default(dim),
            flagged: Array2::default(dim),
            bomb_count,
            flags_placed: 0,
            moves_count: 0,
        }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn columns(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len().try_into().unwrap()
    }

    pub fn bomb_count(&self) -> CellCount {
        self.bomb_count
    }

    pub fn flags_placed(&self) -> CellCount {
        self.flags_placed
    }

    /// How many bombs have not been flagged yet.
    pub fn flags_remaining(&self) -> CellCount {
        self.bomb_count - self.flags_placed
    }

    /// Reserved move counter; exposed but not updated by the move path.
    pub fn moves_count(&self) -> u32 {
        self.moves_count
    }

    pub fn state_at(&self, coords: Coord2) -> CellState {
        self.cells[coords.to_nd_index()]
    }

    pub fn is_flagged(&self, coords: Coord2) -> bool {
        self.flagged[coords.to_nd_index()]
    }

    pub(crate) fn cells(&self) -> &Array2<CellState> {
        &self.cells
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (rows, columns) = self.size();
        if coords.0 < rows && coords.1 < columns {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    /// Counts bombs (blown ones included) in the 8-connected neighborhood.
    /// This is the hint digit shown to the player on opened cells.
    pub fn neighbor_bomb_count(&self, coords: Coord2) -> u8 {
        self.cells
            .iter_adjacent(coords)
            .filter(|&pos| self.cells[pos.to_nd_index()].is_bomb())
            .count()
            .try_into()
            .unwrap()
    }

    /// Opens a cell at 0-based coordinates.
    ///
    /// A flagged cell refuses to open. Opening a bomb leaves it `Blown` and
    /// returns [`OpenOutcome::Exploded`] without touching any other cell.
    /// Opening a cell with no adjacent bombs flood-opens the surrounding
    /// zero region.
    pub fn open(&mut self, coords: Coord2) -> Result<OpenOutcome> {
        use CellState::*;

        let coords = self.validate_coords(coords)?;

        if self.flagged[coords.to_nd_index()] {
            return Ok(OpenOutcome::NoChange);
        }

        match self.cells[coords.to_nd_index()] {
            Bomb => {
                self.cells[coords.to_nd_index()] = Blown;
                log::debug!("Bomb detonated at {:?}", coords);
                Ok(OpenOutcome::Exploded)
            }
            Blown => Ok(OpenOutcome::NoChange),
            state @ (Closed | Opened) => {
                let mut opened_any = false;

                if state == Closed {
                    self.cells[coords.to_nd_index()] = Opened;
                    opened_any = true;
                    log::trace!(
                        "Opened cell at {:?}, bomb count: {}",
                        coords,
                        self.neighbor_bomb_count(coords)
                    );
                }

                if self.neighbor_bomb_count(coords) == 0 {
                    opened_any |= self.flood_open(coords);
                }

                Ok(if opened_any {
                    OpenOutcome::Opened
                } else {
                    OpenOutcome::NoChange
                })
            }
        }
    }

    /// Flood-opens from a zero-count cell. Propagation is 4-connected and
    /// passes only through cells that themselves have no adjacent bombs;
    /// their non-zero border cells get opened without propagating. Flagged
    /// cells block the flood entirely. Iterative, fixed visit order.
    fn flood_open(&mut self, start: Coord2) -> bool {
        let mut opened_any = false;
        let mut visited = BTreeSet::from([start]);
        let mut to_visit: VecDeque<_> = self
            .cells
            .iter_orthogonal(start)
            .filter(|&pos| self.can_flood_into(pos))
            .collect();
        log::trace!(
            "Starting flood fill from {:?}, initial neighbors: {:?}",
            start,
            to_visit
        );

        while let Some(visit_coords) = to_visit.pop_front() {
            if !visited.insert(visit_coords) {
                continue;
            }

            // skip flagged or already opened cells
            if !self.can_flood_into(visit_coords) {
                continue;
            }

            self.cells[visit_coords.to_nd_index()] = CellState::Opened;
            opened_any = true;

            let visit_count = self.neighbor_bomb_count(visit_coords);
            log::trace!(
                "Flood opened cell at {:?}, bomb count: {}",
                visit_coords,
                visit_count
            );

            if visit_count == 0 {
                to_visit.extend(
                    self.cells
                        .iter_orthogonal(visit_coords)
                        .filter(|&pos| self.can_flood_into(pos))
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }

        opened_any
    }

    fn can_flood_into(&self, coords: Coord2) -> bool {
        self.cells[coords.to_nd_index()] == CellState::Closed
            && !self.flagged[coords.to_nd_index()]
    }

    /// Toggles the flag on a cell at 0-based coordinates. Opened cells are
    /// left alone; placing a new flag is silently refused once every bomb
    /// has a flag budgeted for it.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.validate_coords(coords)?;

        if self.cells[coords.to_nd_index()] == CellState::Opened {
            return Ok(FlagOutcome::NoChange);
        }

        if self.flagged[coords.to_nd_index()] {
            self.flagged[coords.to_nd_index()] = false;
            self.flags_placed -= 1;
            Ok(FlagOutcome::Changed)
        } else if self.flags_placed < self.bomb_count {
            self.flagged[coords.to_nd_index()] = true;
            self.flags_placed += 1;
            Ok(FlagOutcome::Changed)
        } else {
            Ok(FlagOutcome::NoChange)
        }
    }

    /// Win predicate: every cell is either opened or flagged. Pure query.
    pub fn check_win(&self) -> bool {
        let satisfied = self
            .cells
            .iter()
            .zip(self.flagged.iter())
            .filter(|&(&state, &flag)| state == CellState::Opened || flag)
            .count();
        satisfied == usize::from(self.total_cells())
    }
}
