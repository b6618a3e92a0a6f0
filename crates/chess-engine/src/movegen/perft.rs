//! Perft (performance test) for move generator validation.
//!
//! Perft counts the number of leaf nodes at a given depth, which can be
//! compared against known-correct values to validate the move generator.
//! Every move is made and unmade on the one board, so a successful run also
//! exercises the undo path at every node.

use crate::Board;

/// Counts the number of leaf nodes at the given depth.
///
/// The board is restored before returning.
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = board.generate_all_moves();

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for m in moves.iter() {
        let Ok(undo) = board.make_move(m, false) else {
            debug_assert!(false, "generated move {m} rejected");
            continue;
        };
        nodes += perft(board, depth - 1);
        if board.unmake_move(m, undo).is_err() {
            debug_assert!(false, "unmake of {m} failed");
        }
    }
    nodes
}

/// Perft with divide - shows node count for each move at depth-1.
/// Useful for debugging to identify which moves have incorrect counts.
pub fn perft_divide(board: &mut Board, depth: u32) -> Vec<(String, u64)> {
    let moves = board.generate_all_moves();
    let mut results = Vec::with_capacity(moves.len());

    for m in moves.iter() {
        let Ok(undo) = board.make_move(m, false) else {
            debug_assert!(false, "generated move {m} rejected");
            continue;
        };
        let nodes = if depth > 1 {
            perft(board, depth - 1)
        } else {
            1
        };
        if board.unmake_move(m, undo).is_err() {
            debug_assert!(false, "unmake of {m} failed");
        }
        results.push((m.to_uci(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 0 1";

    /// Checks published counts for depths 1, 2, ... in order.
    fn check(fen: &str, expected: &[u64]) {
        let mut board = Board::from_fen(fen).unwrap();
        for (depth, &nodes) in (1..).zip(expected) {
            assert_eq!(perft(&mut board, depth), nodes, "{fen} at depth {depth}");
        }
        assert_eq!(board.to_fen(), fen);
    }

    #[test]
    fn perft_startpos() {
        check(chess_core::FenFields::STARTPOS, &[20, 400, 8902, 197281]);
    }

    #[test]
    #[ignore]
    fn perft_startpos_depth_5() {
        let mut board = Board::startpos();
        assert_eq!(perft(&mut board, 5), 4865609);
    }

    // Castling through attacked squares, en passant, promotions.
    #[test]
    fn perft_kiwipete() {
        check(KIWIPETE, &[48, 2039, 97862]);
    }

    // En passant that would expose the king along the rank.
    #[test]
    fn perft_position3() {
        check(POSITION_3, &[14, 191, 2812]);
    }

    #[test]
    fn perft_position4() {
        check(POSITION_4, &[6, 264, 9467]);
    }

    #[test]
    fn perft_position5() {
        check(POSITION_5, &[44, 1486, 62379]);
    }

    #[test]
    fn perft_divide_sums_to_perft() {
        let mut board = Board::from_fen(POSITION_3).unwrap();
        let results = perft_divide(&mut board, 3);
        assert_eq!(results.len(), 14);
        let total: u64 = results.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 2812);
        board.validate().unwrap();
    }

    #[test]
    fn perft_divide_lists_every_root_move() {
        // Both castles are legal at the root here.
        let mut board = Board::from_fen(KIWIPETE).unwrap();
        let mut expected: Vec<String> = board.generate_all_moves().iter().map(|m| m.to_uci()).collect();
        expected.sort();
        let results = perft_divide(&mut board, 1);
        let listed: Vec<String> = results.iter().map(|(m, _)| m.clone()).collect();
        assert_eq!(listed, expected);
        assert!(results.iter().all(|&(_, n)| n == 1));
        assert_eq!(board.to_fen(), KIWIPETE);
    }
}
