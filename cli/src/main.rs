use anyhow::{Context, Result};
use clap::Parser;
use sapper_core::{Board, CellState, Coord, Difficulty, GameConfig, MoveOutcome, Session, codec};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "sapper", version, about = "Terminal minesweeper")]
struct Cli {
    /// Save-file path
    #[arg(long, default_value = codec::SAVE_FILE_NAME)]
    save_file: PathBuf,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbosity.log_level_filter())
        .init();

    let stdin = io::stdin();
    let mut input = stdin.lock();

    println!("Welcome to sapper");
    let board = main_menu(&mut input, &cli.save_file)?;
    run_session(&mut input, Session::new(board), &cli.save_file)
}

fn main_menu(input: &mut impl BufRead, save_file: &Path) -> Result<Board> {
    println!("    1. New game");
    println!("    2. Load last saved game");
    loop {
        let line = prompt(input, "Enter: ")?;
        match line.trim() {
            "1" => return new_game(input),
            "2" => match codec::load_from(save_file) {
                Ok(board) => return Ok(board),
                Err(err) => {
                    println!("{err}");
                    log::debug!("Load from {} failed: {err}", save_file.display());
                }
            },
            _ => {}
        }
    }
}

fn new_game(input: &mut impl BufRead) -> Result<Board> {
    println!("Choose difficulty:");
    println!("    1. Easy");
    println!("    2. Medium");
    println!("    3. Hard");
    println!("    4. Custom");
    loop {
        let line = prompt(input, "Enter: ")?;
        let config = match line.trim() {
            "1" => Difficulty::Easy.config(),
            "2" => Difficulty::Medium.config(),
            "3" => Difficulty::Hard.config(),
            "4" => custom_config(input)?,
            _ => continue,
        };
        return Board::new(config).context("failed to generate board");
    }
}

fn custom_config(input: &mut impl BufRead) -> Result<GameConfig> {
    println!("Enter rows, columns and bomb count separated by spaces:");
    loop {
        let line = prompt(input, "Enter: ")?;
        let mut fields = line.split_whitespace();
        let parsed = (
            fields.next().and_then(|f| f.parse().ok()),
            fields.next().and_then(|f| f.parse().ok()),
            fields.next().and_then(|f| f.parse().ok()),
        );
        if let (Some(rows), Some(columns), Some(bombs)) = parsed
            && fields.next().is_none()
            && let Ok(config) = GameConfig::new(rows, columns, bombs)
        {
            return Ok(config);
        }
        println!("Invalid input, expected e.g. \"10 10 10\"");
    }
}

fn run_session(input: &mut impl BufRead, mut session: Session, save_file: &Path) -> Result<()> {
    loop {
        render(session.board());
        println!("Moves: \"x y 1\" opens, \"x y 2\" flags; \"save\" or \"quit\"");
        let line = prompt(input, "Enter: ")?;
        match line.trim() {
            "quit" => return Ok(()),
            "save" => match session.save_to(save_file) {
                Ok(()) => println!("Saved to {}", save_file.display()),
                Err(err) => println!("{err}"),
            },
            raw => match parse_move(raw) {
                Some((x, y, code)) => match session.apply_raw_move(x, y, code) {
                    Ok(MoveOutcome::Continue) => {}
                    Ok(MoveOutcome::Victory) => {
                        render(session.board());
                        println!("You won!");
                        return Ok(());
                    }
                    Ok(MoveOutcome::Defeat) => {
                        render(session.board());
                        println!("GAME OVER");
                        return Ok(());
                    }
                    Err(err) => println!("{err}"),
                },
                None => println!("Invalid input, expected \"x y action\""),
            },
        }
    }
}

fn parse_move(line: &str) -> Option<(Coord, Coord, u8)> {
    let mut fields = line.split_whitespace();
    let x = fields.next()?.parse().ok()?;
    let y = fields.next()?.parse().ok()?;
    let code = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some((x, y, code))
}

fn render(board: &Board) {
    print!("   ");
    for y in 0..board.columns() {
        print!("{:>2} ", y + 1);
    }
    println!();
    for x in 0..board.rows() {
        print!("{:>2} ", x + 1);
        for y in 0..board.columns() {
            print!(" {} ", cell_glyph(board, (x, y)));
        }
        println!();
    }
    println!(
        "Bombs: {}  Flags left: {}",
        board.bomb_count(),
        board.flags_remaining()
    );
}

fn cell_glyph(board: &Board, coords: (Coord, Coord)) -> char {
    if board.is_flagged(coords) {
        return 'F';
    }
    match board.state_at(coords) {
        CellState::Closed | CellState::Bomb => '#',
        CellState::Blown => '*',
        CellState::Opened => match board.neighbor_bomb_count(coords) {
            0 => '.',
            count => char::from(b'0' + count),
        },
    }
}

fn prompt(input: &mut impl BufRead, text: &str) -> Result<String> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read input")?;
    anyhow::ensure!(read > 0, "input closed");
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_move_accepts_exactly_three_fields() {
        assert_eq!(parse_move("3 2 1"), Some((3, 2, 1)));
        assert_eq!(parse_move("3 2"), None);
        assert_eq!(parse_move("3 2 1 4"), None);
        assert_eq!(parse_move("a b c"), None);
    }

    #[test]
    fn glyphs_reflect_board_state() {
        let mut b = Board::with_bombs_at(2, 2, &[(0, 0)]).unwrap();
        b.open((1, 1)).unwrap();
        b.toggle_flag((0, 0)).unwrap();

        assert_eq!(cell_glyph(&b, (0, 0)), 'F');
        assert_eq!(cell_glyph(&b, (0, 1)), '#');
        assert_eq!(cell_glyph(&b, (1, 1)), '1');
    }
}
