use crate::board::{Board, Tile};
use crate::error::BoardParseError;

/// Parses an array of string slices into a `Board`.
///
/// Each string slice represents one row, starting from row 0. The board is
/// square: its side is the number of rows, and every row must contain
/// exactly that many characters.
///
/// Valid characters for tiles are:
/// - 'R': `Tile::Red`
/// - 'G': `Tile::Green`
/// - 'B': `Tile::Blue`
/// - 'Y': `Tile::Yellow`
/// - 'P': `Tile::Purple`
/// - 'C': `Tile::Cyan`
/// - '.': `Tile::Empty`
///
/// # Returns
/// * `Ok(Board)` if parsing is successful.
/// * `Err(BoardParseError)` if `s` is empty, a row has the wrong length, or
///   an unrecognized character is encountered.
///
/// # Examples
/// ```
/// use candy_cascade::utils::board_from_str_array;
/// use candy_cascade::board::Tile;
///
/// let board = board_from_str_array(&["RGY", "B.P", "CCR"]).unwrap();
/// assert_eq!(board.side(), 3);
/// assert_eq!(board.get(0), Tile::Red);
/// assert_eq!(board.get(4), Tile::Empty);
/// assert_eq!(board.get(6), Tile::Cyan);
///
/// assert!(board_from_str_array(&["RXB", "RRR", "GGG"]).is_err());
/// assert!(board_from_str_array(&["RGB", "RG"]).is_err());
/// ```
pub fn board_from_str_array(s: &[&str]) -> Result<Board, BoardParseError> {
    let side = s.len();
    if side == 0 {
        return Err(BoardParseError::NoRows);
    }

    let mut cells = Vec::with_capacity(side * side);
    for (r, row_str) in s.iter().enumerate() {
        let found = row_str.chars().count();
        if found != side {
            return Err(BoardParseError::RowLength {
                row: r,
                expected: side,
                found,
            });
        }

        for (c, ch) in row_str.chars().enumerate() {
            let tile =
                Tile::from_char(ch).ok_or(BoardParseError::UnknownTile { ch, row: r, col: c })?;
            cells.push(tile);
        }
    }

    Ok(Board::from_cells(side, cells).expect("rows were checked to form a square"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_from_str_array_valid() {
        let board = board_from_str_array(&["RGYB", "....", "PCRG", "...."]).unwrap();
        assert_eq!(board.side(), 4);
        assert_eq!(board.get(0), Tile::Red);
        assert_eq!(board.get(4), Tile::Empty);
        assert_eq!(board.get(9), Tile::Cyan);
        assert_eq!(board.to_plain_string(), "RGYB\n....\nPCRG\n....");
    }

    #[test]
    fn test_board_from_str_array_invalid_char() {
        let result = board_from_str_array(&["RGX", "RRR", "GGG"]);
        assert_eq!(
            result.unwrap_err(),
            BoardParseError::UnknownTile {
                ch: 'X',
                row: 0,
                col: 2
            }
        );
    }

    #[test]
    fn test_board_from_str_array_with_spaces() {
        let result = board_from_str_array(&["R G", "RRR", "GGG"]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unrecognized character ' '"));
    }

    #[test]
    fn test_board_from_str_array_row_length_mismatch() {
        let result = board_from_str_array(&["RGB", "RGBY", "RGB"]);
        assert_eq!(
            result.unwrap_err(),
            BoardParseError::RowLength {
                row: 1,
                expected: 3,
                found: 4
            }
        );
    }

    #[test]
    fn test_board_from_str_array_empty_input() {
        let board_str: [&str; 0] = [];
        assert_eq!(
            board_from_str_array(&board_str).unwrap_err(),
            BoardParseError::NoRows
        );
    }
}
