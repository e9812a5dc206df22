use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::SolverError;
use crate::rack::Rack;
use crate::util::{Anchor, Position};

/// Premium squares of the standard 15x15 layout. Uppercase letters
/// multiply a single tile, lowercase multiply the whole word.
static MULTIPLIERS: [&str; 15] = [
    "---t--T-T--t---",
    "--D--d---d--D--",
    "-D--D-----D--D-",
    "t--T---d---T--t",
    "--D---D-D---D--",
    "-d---T---T---d-",
    "T---D-----D---T",
    "---d-------d---",
    "T---D-----D---T",
    "-d---T---T---d-",
    "--D---D-D---D--",
    "t--T---d---T--t",
    "-D--D-----D--D-",
    "--D--d---d--D--",
    "---t--T-T--t---",
];

/// The played tiles plus the rack to solve with. Fixed while solving;
/// the generator never writes to it.
#[derive(Debug, Clone)]
pub struct Board {
    cells: Vec<Vec<Option<char>>>,
    rack: Rack,
}

impl Board {
    /// Loads a board file: the rack on the first line, then one line per
    /// row where '-' is an empty square and a lowercase letter is a
    /// played tile.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SolverError> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| SolverError::io(path, e))?;
        let mut data = String::new();
        file.read_to_string(&mut data)
            .map_err(|e| SolverError::io(path, e))?;
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self, SolverError> {
        let mut lines = data.lines();
        let rack_line = lines.next().unwrap_or("").trim();
        for ch in rack_line.chars() {
            if !ch.is_ascii_lowercase() && ch != '*' {
                return Err(SolverError::BadRackTile { ch });
            }
        }
        let rack: Rack = rack_line.chars().collect();

        let mut cells: Vec<Vec<Option<char>>> = Vec::new();
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let row = cells.len();
            let mut parsed = Vec::with_capacity(line.len());
            for (col, ch) in line.chars().enumerate() {
                match ch {
                    '-' => parsed.push(None),
                    c if c.is_ascii_lowercase() => parsed.push(Some(c)),
                    c => return Err(SolverError::UnknownCell { ch: c, row, col }),
                }
            }
            if let Some(first) = cells.first() {
                if parsed.len() != first.len() {
                    return Err(SolverError::RaggedRow {
                        row,
                        found: parsed.len(),
                        expected: first.len(),
                    });
                }
            }
            cells.push(parsed);
        }
        if cells.is_empty() || cells[0].is_empty() {
            return Err(SolverError::EmptyBoard);
        }

        Ok(Self { cells, rack })
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells[0].len()
    }

    pub fn rack(&self) -> &Rack {
        &self.rack
    }

    pub fn get_letter(&self, row: usize, col: usize) -> Option<char> {
        self.cells[row][col]
    }

    pub fn contains(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows() && (col as usize) < self.cols()
    }

    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_none()))
    }

    pub fn center(&self) -> Position {
        Position {
            row: self.rows() / 2,
            col: self.cols() / 2,
        }
    }

    pub fn word_multiplier(&self, row: usize, col: usize) -> i32 {
        match Self::premium(row, col) {
            b'd' => 2,
            b't' => 3,
            _ => 1,
        }
    }

    pub fn letter_multiplier(&self, row: usize, col: usize) -> i32 {
        match Self::premium(row, col) {
            b'D' => 2,
            b'T' => 3,
            _ => 1,
        }
    }

    /// WWF letter values; the blank is worth nothing.
    pub fn letter_points(letter: char) -> i32 {
        match letter {
            's' | 'r' | 't' | 'i' | 'o' | 'a' | 'e' => 1,
            'l' | 'u' | 'd' | 'n' => 2,
            'y' | 'g' | 'h' => 3,
            'b' | 'c' | 'f' | 'm' | 'p' | 'w' => 4,
            'k' | 'v' => 5,
            'x' => 8,
            'j' | 'q' | 'z' => 10,
            _ => 0,
        }
    }

    /// The grid with `word` overlaid from `start`, newly placed letters
    /// uppercased, rows rendered as space-separated cells
    pub fn render_with_word(&self, start: &Anchor, word: &str) -> String {
        let mut cells = self.cells.clone();
        let mut at = *start;
        for ch in word.chars() {
            let Position { row, col } = at.pos;
            if cells[row][col].is_none() {
                cells[row][col] = Some(ch.to_ascii_uppercase());
            }
            at = at.add(1);
        }

        let mut out = String::new();
        for row in &cells {
            for cell in row {
                out.push(cell.unwrap_or('-'));
                out.push(' ');
            }
            out.push('\n');
        }
        out
    }

    fn premium(row: usize, col: usize) -> u8 {
        MULTIPLIERS
            .get(row)
            .and_then(|r| r.as_bytes().get(col))
            .copied()
            .unwrap_or(b'-')
    }
}

#[cfg(test)]
mod tests {
    use super::Board;
    use crate::util::{Anchor, Direction};

    fn empty_15() -> String {
        let mut data = String::from("abc\n");
        for _ in 0..15 {
            data.push_str(&"-".repeat(15));
            data.push('\n');
        }
        data
    }

    #[test]
    fn test_parse() {
        let board = Board::parse(&empty_15()).unwrap();
        assert_eq!(board.rows(), 15);
        assert_eq!(board.cols(), 15);
        assert!(board.is_empty());
        assert_eq!(board.get_letter(7, 7), None);
        let center = board.center();
        assert_eq!((center.row, center.col), (7, 7));
    }

    #[test]
    fn test_parse_played_tiles() {
        let board = Board::parse("ct\n---\n-a-\n---\n").unwrap();
        assert_eq!(board.get_letter(1, 1), Some('a'));
        assert_eq!(board.get_letter(0, 0), None);
        assert!(!board.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Board::parse("ab\n---\n--\n"),
            Err(crate::error::SolverError::RaggedRow { row: 1, .. })
        ));
        assert!(matches!(
            Board::parse("ab\n-X-\n"),
            Err(crate::error::SolverError::UnknownCell { ch: 'X', .. })
        ));
        assert!(matches!(
            Board::parse("aB\n---\n"),
            Err(crate::error::SolverError::BadRackTile { ch: 'B' })
        ));
        assert!(matches!(
            Board::parse("ab\n"),
            Err(crate::error::SolverError::EmptyBoard)
        ));
    }

    #[test]
    fn test_multipliers() {
        let board = Board::parse(&empty_15()).unwrap();
        // corners of the pattern
        assert_eq!(board.word_multiplier(0, 3), 3);
        assert_eq!(board.word_multiplier(1, 5), 2);
        assert_eq!(board.letter_multiplier(0, 6), 3);
        assert_eq!(board.letter_multiplier(1, 2), 2);
        // the center square carries no premium in this layout
        assert_eq!(board.word_multiplier(7, 7), 1);
        assert_eq!(board.letter_multiplier(7, 7), 1);
        // outside the fixed pattern everything is face value
        assert_eq!(board.word_multiplier(20, 20), 1);
        assert_eq!(board.letter_multiplier(20, 20), 1);
    }

    #[test]
    fn test_letter_points() {
        assert_eq!(Board::letter_points('e'), 1);
        assert_eq!(Board::letter_points('d'), 2);
        assert_eq!(Board::letter_points('b'), 4);
        assert_eq!(Board::letter_points('x'), 8);
        assert_eq!(Board::letter_points('q'), 10);
        assert_eq!(Board::letter_points('*'), 0);
    }

    #[test]
    fn test_render_with_word() {
        let board = Board::parse("bd\n----\n-ea-\n----\n").unwrap();
        let out = board.render_with_word(&Anchor::new(1, 0, Direction::Across), "bead");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "- - - - ");
        // existing tiles stay lowercase, new ones are uppercased
        assert_eq!(lines[1], "B e a D ");
        assert_eq!(lines[2], "- - - - ");
    }
}
