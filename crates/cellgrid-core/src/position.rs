//! Grid positions and bounding boxes

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

const LETTERS: i32 = 26;
const MAX_POSITION_LETTERS: usize = 3;
const MAX_POSITION_DIGITS: usize = 5;

/// A cell position (e.g. "A1" is row 0, col 0)
///
/// Positions order column-major: first by `col`, then by `row`. Iteration over sorted
/// positions therefore walks a column top to bottom before moving right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Row index (0-based internally, 1-based in display)
    pub row: i32,
    /// Column index (0-based, A=0, B=1, ..., Z=25, AA=26)
    pub col: i32,
}

impl Position {
    /// The "no position" sentinel; never valid
    pub const NONE: Position = Position { row: -1, col: -1 };

    /// Create a new position
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Check whether the position lies inside the grid
    pub fn is_valid(&self) -> bool {
        self.row >= 0 && self.col >= 0 && self.row < MAX_ROWS && self.col < MAX_COLS
    }

    /// Parse a position from A1-style notation
    ///
    /// Returns [`Position::NONE`] on any malformed input instead of failing, so callers
    /// check [`is_valid`](Self::is_valid). Column letters must be uppercase.
    ///
    /// # Examples
    /// ```
    /// use cellgrid_core::Position;
    ///
    /// assert_eq!(Position::from_a1("A1"), Position::new(0, 0));
    /// assert_eq!(Position::from_a1("AB12"), Position::new(11, 27));
    /// assert_eq!(Position::from_a1("1A"), Position::NONE);
    /// assert_eq!(Position::from_a1("a1"), Position::NONE);
    /// ```
    pub fn from_a1(s: &str) -> Self {
        let letter_count = s.bytes().take_while(u8::is_ascii_uppercase).count();
        let (letters, digits) = s.split_at(letter_count);

        if letters.is_empty()
            || letters.len() > MAX_POSITION_LETTERS
            || digits.is_empty()
            || digits.len() > MAX_POSITION_DIGITS
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Self::NONE;
        }

        let row = match digits.parse::<i32>() {
            Ok(row) => row - 1,
            Err(_) => return Self::NONE,
        };
        let col = Self::letters_to_column(letters);

        let pos = Self::new(row, col);
        if pos.is_valid() {
            pos
        } else {
            Self::NONE
        }
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: i32) -> String {
        let mut result = String::new();
        let mut n = col + 1; // 1-based for calculation

        while n > 0 {
            n -= 1;
            let c = ((n % LETTERS) as u8 + b'A') as char;
            result.insert(0, c);
            n /= LETTERS;
        }

        result
    }

    /// Convert uppercase column letters to an index (A = 0, Z = 25, AA = 26, etc.)
    fn letters_to_column(letters: &str) -> i32 {
        letters
            .bytes()
            .fold(0, |col, c| col * LETTERS + i32::from(c - b'A') + 1)
            - 1
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.col
            .cmp(&other.col)
            .then_with(|| self.row.cmp(&other.row))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Renders A1 notation; invalid positions render as an empty string.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return Ok(());
        }
        write!(f, "{}{}", Self::column_to_letters(self.col), self.row + 1)
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let pos = Self::from_a1(s);
        if pos.is_valid() {
            Ok(pos)
        } else {
            Err(Error::InvalidPosition(pos))
        }
    }
}

/// The size of a bounding box, in rows and columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub rows: i32,
    pub cols: i32,
}

impl Size {
    /// Create a new size
    pub const fn new(rows: i32, cols: i32) -> Self {
        Self { rows, cols }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(Position::column_to_letters(0), "A");
        assert_eq!(Position::column_to_letters(25), "Z");
        assert_eq!(Position::column_to_letters(26), "AA");
        assert_eq!(Position::column_to_letters(27), "AB");
        assert_eq!(Position::column_to_letters(701), "ZZ");
        assert_eq!(Position::column_to_letters(702), "AAA");
        assert_eq!(Position::column_to_letters(MAX_COLS - 1), "XFD");
    }

    #[test]
    fn test_from_a1() {
        assert_eq!(Position::from_a1("A1"), Position::new(0, 0));
        assert_eq!(Position::from_a1("B2"), Position::new(1, 1));
        assert_eq!(Position::from_a1("Z1"), Position::new(0, 25));
        assert_eq!(Position::from_a1("AA1"), Position::new(0, 26));
        assert_eq!(Position::from_a1("C100"), Position::new(99, 2));
        assert_eq!(
            Position::from_a1("XFD16384"),
            Position::new(MAX_ROWS - 1, MAX_COLS - 1)
        );
    }

    #[test]
    fn test_from_a1_malformed() {
        for s in [
            "", "A", "1", "1A", "a1", "aA1", "A0", "A-1", "A 1", "A1B", "$A$1", "XFE1", "A16385",
            "ABCD1", "A123456", "A99999",
        ] {
            assert_eq!(Position::from_a1(s), Position::NONE, "input {s:?}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Position::new(0, 0).to_string(), "A1");
        assert_eq!(Position::new(9, 3).to_string(), "D10");
        assert_eq!(Position::NONE.to_string(), "");
        assert_eq!(Position::new(MAX_ROWS, 0).to_string(), "");
    }

    #[test]
    fn test_validity() {
        assert!(Position::new(0, 0).is_valid());
        assert!(Position::new(MAX_ROWS - 1, MAX_COLS - 1).is_valid());
        assert!(!Position::NONE.is_valid());
        assert!(!Position::new(MAX_ROWS, 0).is_valid());
        assert!(!Position::new(0, MAX_COLS).is_valid());
        assert!(!Position::new(-1, 0).is_valid());
    }

    #[test]
    fn test_column_major_order() {
        let mut positions = vec![
            Position::new(0, 1), // B1
            Position::new(1, 0), // A2
            Position::new(0, 0), // A1
        ];
        positions.sort();
        assert_eq!(
            positions,
            vec![Position::new(0, 0), Position::new(1, 0), Position::new(0, 1)]
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!("C3".parse::<Position>().unwrap(), Position::new(2, 2));
        assert_eq!(
            "3C".parse::<Position>(),
            Err(Error::InvalidPosition(Position::NONE))
        );
    }

    proptest! {
        #[test]
        fn prop_a1_round_trip(row in 0..MAX_ROWS, col in 0..MAX_COLS) {
            let pos = Position::new(row, col);
            prop_assert_eq!(Position::from_a1(&pos.to_string()), pos);
        }

        #[test]
        fn prop_lowercase_is_rejected(row in 0..MAX_ROWS, col in 0..MAX_COLS) {
            let text = Position::new(row, col).to_string().to_lowercase();
            prop_assert_eq!(Position::from_a1(&text), Position::NONE);
        }
    }
}
