//! Plain-text save-file codec.
//!
//! Format: a header line `rows columns bomb_count` followed by `rows` lines
//! of `columns` space-separated cell-state codes. Flag placements are not
//! part of the format and reset to empty on load.

use ndarray::Array2;
use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

use crate::{Board, CellCount, CellState, Coord, SaveError, SaveResult, ToNdIndex, mult};

/// Fixed save-file name, resolved against the working directory.
pub const SAVE_FILE_NAME: &str = "sapper.dat";

pub fn encode(board: &Board) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} {}",
        board.rows(),
        board.columns(),
        board.bomb_count()
    );
    for row in board.cells().rows() {
        let mut first = true;
        for state in row {
            if !first {
                out.push(' ');
            }
            let _ = write!(out, "{}", state.code());
            first = false;
        }
        out.push('\n');
    }
    out
}

pub fn decode(text: &str) -> SaveResult<Board> {
    let mut lines = text.lines();
    let header = lines.next().ok_or(SaveError::CorruptSave("missing header"))?;

    let mut fields = header.split_whitespace();
    let rows: Coord = parse_field(fields.next())?;
    let columns: Coord = parse_field(fields.next())?;
    let bomb_count: CellCount = parse_field(fields.next())?;
    if fields.next().is_some() {
        return Err(SaveError::CorruptSave("trailing header fields"));
    }
    if rows == 0 || columns == 0 || bomb_count > mult(rows, columns) {
        return Err(SaveError::CorruptSave("impossible board dimensions"));
    }

    let mut cells: Array2<CellState> = Array2::default((usize::from(rows), usize::from(columns)));
    for x in 0..rows {
        let line = lines
            .next()
            .ok_or(SaveError::CorruptSave("missing grid row"))?;
        let mut tokens = line.split_whitespace();
        for y in 0..columns {
            let token = tokens
                .next()
                .ok_or(SaveError::CorruptSave("missing cell code"))?;
            let code: u8 = token
                .parse()
                .map_err(|_| SaveError::CorruptSave("non-integer cell code"))?;
            let state = CellState::from_code(code)
                .ok_or(SaveError::CorruptSave("unknown cell code"))?;
            cells[(x, y).to_nd_index()] = state;
        }
        if tokens.next().is_some() {
            return Err(SaveError::CorruptSave("trailing cell codes"));
        }
    }
    if lines.any(|line| !line.trim().is_empty()) {
        return Err(SaveError::CorruptSave("trailing data after grid"));
    }

    let bombs_in_grid = cells.iter().filter(|state| state.is_bomb()).count();
    if bombs_in_grid != usize::from(bomb_count) {
        return Err(SaveError::CorruptSave("bomb count does not match grid"));
    }

    Ok(Board::from_cells(cells, bomb_count))
}

fn parse_field<T: FromStr>(field: Option<&str>) -> SaveResult<T> {
    field
        .ok_or(SaveError::CorruptSave("short header"))?
        .parse()
        .map_err(|_| SaveError::CorruptSave("non-integer header field"))
}

pub fn save_to(board: &Board, path: impl AsRef<Path>) -> SaveResult<()> {
    fs::write(path, encode(board))?;
    Ok(())
}

pub fn load_from(path: impl AsRef<Path>) -> SaveResult<Board> {
    let text = fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => SaveError::SaveNotFound,
        _ => SaveError::Io(err),
    })?;
    decode(&text)
}

pub fn save(board: &Board) -> SaveResult<()> {
    save_to(board, SAVE_FILE_NAME)
}

pub fn load() -> SaveResult<Board> {
    load_from(SAVE_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Coord2;

    fn board(rows: Coord, columns: Coord, bombs: &[Coord2]) -> Board {
        Board::with_bombs_at(rows, columns, bombs).unwrap()
    }

    #[test]
    fn encode_writes_header_and_state_codes() {
        let mut b = board(2, 2, &[(0, 0)]);
        b.open((1, 1)).unwrap();

        assert_eq!(encode(&b), "2 2 1\n3 0\n0 1\n");
    }

    #[test]
    fn round_trip_preserves_cells_but_not_flags() {
        let mut b = board(3, 3, &[(2, 2)]);
        b.open((0, 0)).unwrap();
        b.toggle_flag((2, 2)).unwrap();

        let restored = decode(&encode(&b)).unwrap();

        assert_eq!(restored.size(), b.size());
        assert_eq!(restored.bomb_count(), b.bomb_count());
        for x in 0..3 {
            for y in 0..3 {
                assert_eq!(restored.state_at((x, y)), b.state_at((x, y)));
                assert!(!restored.is_flagged((x, y)));
            }
        }
        assert_eq!(restored.flags_placed(), 0);
    }

    #[test]
    fn blown_cell_round_trips() {
        let mut b = board(2, 2, &[(0, 0)]);
        b.open((0, 0)).unwrap();

        let restored = decode(&encode(&b)).unwrap();

        assert_eq!(restored.state_at((0, 0)), CellState::Blown);
        assert_eq!(restored.bomb_count(), 1);
    }

    #[test]
    fn decode_rejects_short_header() {
        assert!(matches!(
            decode("2 2\n0 0\n0 0\n"),
            Err(SaveError::CorruptSave(_))
        ));
        assert!(matches!(decode(""), Err(SaveError::CorruptSave(_))));
    }

    #[test]
    fn decode_rejects_non_integer_tokens() {
        assert!(matches!(
            decode("2 two 1\n3 0\n0 0\n"),
            Err(SaveError::CorruptSave(_))
        ));
        assert!(matches!(
            decode("2 2 1\n3 x\n0 0\n"),
            Err(SaveError::CorruptSave(_))
        ));
    }

    #[test]
    fn decode_rejects_wrong_grid_shape() {
        // missing row
        assert!(matches!(
            decode("2 2 1\n3 0\n"),
            Err(SaveError::CorruptSave(_))
        ));
        // short row
        assert!(matches!(
            decode("2 2 1\n3\n0 0\n"),
            Err(SaveError::CorruptSave(_))
        ));
        // long row
        assert!(matches!(
            decode("2 2 1\n3 0 0\n0 0\n"),
            Err(SaveError::CorruptSave(_))
        ));
    }

    #[test]
    fn decode_rejects_unknown_state_codes() {
        // code 2 is the legacy flag marker, never valid in the grid
        assert!(matches!(
            decode("2 2 1\n3 2\n0 0\n"),
            Err(SaveError::CorruptSave(_))
        ));
        assert!(matches!(
            decode("2 2 1\n3 9\n0 0\n"),
            Err(SaveError::CorruptSave(_))
        ));
    }

    #[test]
    fn decode_rejects_bomb_count_mismatch() {
        assert!(matches!(
            decode("2 2 2\n3 0\n0 0\n"),
            Err(SaveError::CorruptSave(_))
        ));
    }

    #[test]
    fn load_without_save_file_is_save_not_found() {
        let path = std::env::temp_dir().join("sapper-test-no-such-save.dat");

        assert!(matches!(load_from(&path), Err(SaveError::SaveNotFound)));
    }

    #[test]
    fn save_and_load_file_round_trip() {
        let path = std::env::temp_dir().join(format!("sapper-test-{}.dat", std::process::id()));
        let mut b = board(2, 3, &[(0, 1), (1, 2)]);
        b.open((1, 0)).unwrap();

        save_to(&b, &path).unwrap();
        let restored = load_from(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(restored.bomb_count(), 2);
        assert_eq!(restored.state_at((1, 0)), CellState::Opened);
        assert_eq!(restored.state_at((0, 1)), CellState::Bomb);
    }
}
