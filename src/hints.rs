use crate::board::Board;

/// Lists every valid swap on the board.
///
/// Each pair `(a, b)` appears once with `a < b`: `b` is either the right-hand
/// or the lower neighbour of `a`. Pairs are ordered by `a`, then `b`.
///
/// # Arguments
/// * `board`: A reference to the `Board` to analyze.
///
/// # Returns
/// A `Vec<(usize, usize)>` of valid moves, empty if the board is stuck.
pub fn find_valid_moves(board: &Board) -> Vec<(usize, usize)> {
    let side = board.side();
    let mut moves = Vec::new();
    for a in 0..board.len() {
        let (_, col) = board.row_col(a);
        if col + 1 < side && swap_matches(board, a, a + 1) {
            moves.push((a, a + 1));
        }
        if a + side < board.len() && swap_matches(board, a, a + side) {
            moves.push((a, a + side));
        }
    }
    moves
}

/// True if at least one valid swap exists.
pub fn has_valid_move(board: &Board) -> bool {
    !find_valid_moves(board).is_empty()
}

/// Chooses the first valid move in board order.
pub fn choose_move_first(board: &Board) -> Option<(usize, usize)> {
    find_valid_moves(board).into_iter().next()
}

/// Chooses a move based on the Maximize Immediate Clear (MIC) strategy.
///
/// Simulates each valid swap and selects the one that matches the most cells
/// on the first clearing step. Ties keep the earliest move.
///
/// # Returns
/// An `Option` containing a tuple:
///   - `usize`: The number of cells the move clears immediately.
///   - `(usize, usize)`: The move itself.
/// Returns `None` if no valid move exists.
pub fn choose_move_max_clear(board: &Board) -> Option<(usize, (usize, usize))> {
    let mut best: Option<(usize, (usize, usize))> = None;
    for mv in find_valid_moves(board) {
        let cleared = simulate(board, mv).find_matches().len();
        if best.map_or(true, |(best_cleared, _)| cleared > best_cleared) {
            best = Some((cleared, mv));
        }
    }
    best
}

/// Chooses a move based on the Lowest Match Priority (LMP) strategy.
///
/// Prefers the move whose matched cells reach furthest down the board: the
/// more tiles sit above a clear, the more fall and the better the odds of a
/// cascade. Ties are broken by the larger immediate clear, then by order.
///
/// # Returns
/// An `Option` containing a tuple:
///   - `usize`: The lowest row touched by the move's matches.
///   - `(usize, usize)`: The move itself.
/// Returns `None` if no valid move exists.
pub fn choose_move_lowest(board: &Board) -> Option<(usize, (usize, usize))> {
    let mut best: Option<(usize, usize, (usize, usize))> = None;
    for mv in find_valid_moves(board) {
        let matches = simulate(board, mv).find_matches();
        let lowest_row = matches
            .iter()
            .map(|&i| board.row_col(i).0)
            .max()
            .unwrap_or(0);
        let better = match best {
            None => true,
            Some((row, cleared, _)) => {
                lowest_row > row || (lowest_row == row && matches.len() > cleared)
            }
        };
        if better {
            best = Some((lowest_row, matches.len(), mv));
        }
    }
    best.map(|(row, _, mv)| (row, mv))
}

fn simulate(board: &Board, (a, b): (usize, usize)) -> Board {
    let mut scratch = board.clone();
    scratch.swap(a, b);
    scratch
}

fn swap_matches(board: &Board, a: usize, b: usize) -> bool {
    matches!(board.is_valid_move(a, b), Ok(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Palette;
    use crate::utils::board_from_str_array;

    #[test]
    fn test_find_valid_moves_matches_is_valid_move() {
        let palette = Palette::first(4).unwrap();
        for seed in 0..10 {
            let board = Board::new_random_with_seed(6, &palette, seed);
            if !board.find_matches().is_empty() {
                continue;
            }
            let moves = find_valid_moves(&board);
            for a in 0..board.len() {
                for b in (a + 1)..board.len() {
                    assert_eq!(
                        moves.contains(&(a, b)),
                        board.is_valid_move(a, b).unwrap(),
                        "seed {} move {:?}",
                        seed,
                        (a, b)
                    );
                }
            }
        }
    }

    #[test]
    fn test_known_moves_on_small_board() {
        let board = board_from_str_array(&["RGRB", "GBGR", "BRBG", "GBRB"]).unwrap();
        let moves = find_valid_moves(&board);
        assert!(moves.contains(&(1, 5)));
        assert!(moves.contains(&(9, 10)));
        assert!(!moves.contains(&(4, 5)));
        assert!(has_valid_move(&board));
        assert_eq!(choose_move_first(&board), moves.first().copied());
    }

    #[test]
    fn test_stuck_board_has_no_moves() {
        let board = board_from_str_array(&["RGB", "GBR", "BRG"]).unwrap();
        assert!(find_valid_moves(&board).is_empty());
        assert!(!has_valid_move(&board));
        assert_eq!(choose_move_first(&board), None);
        assert_eq!(choose_move_max_clear(&board), None);
        assert_eq!(choose_move_lowest(&board), None);
    }

    #[test]
    fn test_max_clear_prefers_bigger_match() {
        // 12 <-> 17 drops Y into row 3 for a run of five; every other move clears three.
        let board = board_from_str_array(&[
            "RGBGY", // 0..5
            "BRGRB", // 5..10
            "RBYBR", // 10..15
            "YYGYY", // 15..20
            "GRBRG", // 20..25
        ])
        .unwrap();
        assert!(board.find_matches().is_empty());
        let (cleared, mv) = choose_move_max_clear(&board).unwrap();
        assert_eq!(mv, (12, 17));
        assert_eq!(cleared, 5);
    }

    #[test]
    fn test_lowest_prefers_deeper_match() {
        let board = board_from_str_array(&[
            "RGBGY", // 0..5
            "BRGRB", // 5..10
            "RBYBR", // 10..15
            "YYGYY", // 15..20
            "GRBRG", // 20..25
        ])
        .unwrap();
        // 5 <-> 6 only reaches row 2.
        let (row, mv) = choose_move_lowest(&board).unwrap();
        assert_eq!(row, 3);
        assert_eq!(mv, (12, 17));
    }
}
